//! Outbound frame encoding.

use std::io;

use byteorder::{BigEndian, WriteBytesExt};

use fastpass_core::constants::{PTYPE_AREQ, PTYPE_RESET};

use crate::pktdesc::PacketDesc;

/// Serializes outbound datagrams.
pub struct FrameEncoder;

impl FrameEncoder {
    /// Encodes the header and payloads of `pd` into the provided buffer
    /// (appends bytes). The checksum field is written as zero; sealing it
    /// is the last step of the send path (see [`super::checksum::seal`]).
    pub fn encode_into(buffer: &mut Vec<u8>, pd: &PacketDesc) -> io::Result<()> {
        buffer.write_u16::<BigEndian>(pd.seqno as u16)?;
        buffer.write_u16::<BigEndian>(0)?; // checksum, sealed later

        if pd.send_reset {
            let hi_word = (u32::from(PTYPE_RESET) << 28)
                | (((pd.reset_timestamp >> 32) as u32) & 0x00FF_FFFF);
            buffer.write_u32::<BigEndian>(hi_word)?;
            buffer.write_u32::<BigEndian>(pd.reset_timestamp as u32)?;
        }

        let areq = pd.areq();
        buffer
            .write_u16::<BigEndian>((u16::from(PTYPE_AREQ) << 12) | (areq.len() as u16 & 0x3F))?;
        for entry in areq {
            buffer.write_u16::<BigEndian>(entry.src_dst_key)?;
            buffer.write_u16::<BigEndian>(entry.tslots)?;
        }

        Ok(())
    }

    /// Encodes `pd` into a fresh buffer sized for the frame.
    pub fn encode(pd: &PacketDesc) -> io::Result<Vec<u8>> {
        let mut buffer = Vec::with_capacity(pd.encoded_len());
        Self::encode_into(&mut buffer, pd)?;
        Ok(buffer)
    }
}
