//! Inbound frame decoding.

use std::io::{Cursor, Read};

use byteorder::{BigEndian, ReadBytesExt};

use fastpass_core::{
    constants::{MIN_DGRAM_SIZE, PTYPE_ACK, PTYPE_ALLOC, PTYPE_RESET},
    error::{DecodingErrorKind, Result},
};

use crate::payload::Payload;

/// An inbound datagram split into its header and payload sequence.
#[derive(Debug)]
pub struct Frame {
    /// Low 16 bits of the sender's sequence number.
    pub seq_low16: u16,
    /// Header checksum as received.
    pub checksum: u16,
    /// Payloads that parsed cleanly, in wire order.
    pub payloads: Vec<Payload>,
    /// Set when parsing stopped before the end of the datagram; the
    /// payloads decoded before the bad tail are still valid.
    pub truncation: Option<DecodingErrorKind>,
}

/// Splits inbound datagrams into typed payloads.
pub struct FrameDecoder;

impl FrameDecoder {
    /// Decodes a datagram. Fails only when the datagram cannot carry the
    /// header and at least one payload byte; payload-level problems are
    /// reported through [`Frame::truncation`] so that everything decoded
    /// up to that point can still be dispatched.
    pub fn decode(data: &[u8]) -> Result<Frame> {
        if data.len() < MIN_DGRAM_SIZE {
            return Err(DecodingErrorKind::PacketTooShort.into());
        }

        let mut cursor = Cursor::new(data);
        let seq_low16 = cursor.read_u16::<BigEndian>()?;
        let checksum = cursor.read_u16::<BigEndian>()?;

        let mut payloads = Vec::new();
        let mut truncation = None;

        while (cursor.position() as usize) < data.len() {
            let offset = cursor.position() as usize;
            let remaining = data.len() - offset;
            let ptype = data[offset] >> 4;

            match ptype {
                PTYPE_RESET => {
                    if remaining < 8 {
                        truncation = Some(DecodingErrorKind::IncompleteReset);
                        break;
                    }
                    let hi_word = cursor.read_u32::<BigEndian>()?;
                    let lo_word = cursor.read_u32::<BigEndian>()?;
                    let partial_epoch =
                        (u64::from(hi_word & 0x00FF_FFFF) << 32) | u64::from(lo_word);
                    payloads.push(Payload::Reset { partial_epoch });
                }
                PTYPE_ALLOC => {
                    if remaining < 2 {
                        truncation = Some(DecodingErrorKind::IncompleteAlloc);
                        break;
                    }
                    let hword = cursor.read_u16::<BigEndian>()?;
                    let n_dst = usize::from((hword >> 8) & 0xF);
                    let n_slot_bytes = 2 * usize::from(hword & 0x3F);

                    if remaining - 2 < 2 + 2 * n_dst + n_slot_bytes {
                        truncation = Some(DecodingErrorKind::IncompleteAlloc);
                        break;
                    }
                    let base_tslot = u32::from(cursor.read_u16::<BigEndian>()?) << 4;
                    let mut dsts = Vec::with_capacity(n_dst);
                    for _ in 0..n_dst {
                        dsts.push(cursor.read_u16::<BigEndian>()?);
                    }
                    let mut slots = vec![0u8; n_slot_bytes];
                    cursor.read_exact(&mut slots)?;
                    payloads.push(Payload::Alloc { base_tslot, dsts, slots });
                }
                PTYPE_ACK => {
                    if remaining < 6 {
                        truncation = Some(DecodingErrorKind::IncompleteAck);
                        break;
                    }
                    let runlen = cursor.read_u32::<BigEndian>()?;
                    let seq = cursor.read_u16::<BigEndian>()?;
                    payloads.push(Payload::Ack { runlen, seq });
                }
                other => {
                    truncation = Some(DecodingErrorKind::UnknownPayloadType(other));
                    break;
                }
            }
        }

        Ok(Frame { seq_low16, checksum, payloads, truncation })
    }
}
