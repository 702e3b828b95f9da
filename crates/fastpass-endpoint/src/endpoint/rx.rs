//! Receive path: datagram dispatch and ACK decoding.

use tracing::debug;

use fastpass_core::{error::DecodingErrorKind, transport::DatagramTransport};
use fastpass_protocol::{
    frame_codec::FrameDecoder,
    payload::Payload,
    sequence::{reconstruct_ack_seqno, seq_after, seq_before},
};

use super::Endpoint;

impl<T: DatagramTransport> Endpoint<T> {
    /// Receive-path entry point: decodes one inbound datagram and
    /// dispatches its payloads in wire order. Malformed input lands in the
    /// statistics and never fails the engine.
    pub fn handle_datagram(&mut self, data: &[u8], now: u64) {
        self.stats.rx_packets += 1;

        let frame = match FrameDecoder::decode(data) {
            Ok(frame) => frame,
            Err(_) => {
                debug!("datagram below minimal size (len={})", data.len());
                self.stats.rx_too_short += 1;
                return;
            }
        };

        for payload in frame.payloads {
            match payload {
                Payload::Reset { partial_epoch } => self.process_reset(partial_epoch, now),
                Payload::Alloc { base_tslot, dsts, slots } => {
                    if let Some(handler) = self.handler.as_mut() {
                        handler.handle_alloc(base_tslot, &dsts, &slots);
                    }
                }
                Payload::Ack { runlen, seq } => self.process_ack(seq, runlen),
            }
        }

        if let Some(kind) = frame.truncation {
            match kind {
                DecodingErrorKind::UnknownPayloadType(ptype) => {
                    debug!("got unknown payload type {}", ptype);
                    self.stats.rx_unknown_payload += 1;
                }
                DecodingErrorKind::IncompleteReset => self.stats.rx_incomplete_reset += 1,
                DecodingErrorKind::IncompleteAlloc => self.stats.rx_incomplete_alloc += 1,
                DecodingErrorKind::IncompleteAck => self.stats.rx_incomplete_ack += 1,
                DecodingErrorKind::PacketTooShort => self.stats.rx_too_short += 1,
            }
        }
    }

    /// Applies one compressed acknowledgment run to the window.
    ///
    /// `runlen` is consumed as 4-bit nibbles, high first: the type nibble,
    /// then alternating positive-run (acknowledged) and negative-run
    /// (skipped) lengths, the first positive run extending downward from
    /// the sequence named by `ack_seq`.
    pub(crate) fn process_ack(&mut self, ack_seq: u16, mut runlen: u32) {
        let next_seqno = self.window.next_seqno();
        let window_len = u64::from(self.window.window_len());

        let mut cur = reconstruct_ack_seqno(next_seqno, ack_seq);
        if seq_before(cur, next_seqno.wrapping_sub(window_len)) {
            debug!(
                "too early ack: earliest {:#x}, got {:#x}",
                next_seqno.wrapping_sub(window_len),
                cur
            );
            self.stats.too_early_ack += 1;
            return;
        }

        let mut n_acked = 0u32;
        if self.window.is_unacked(cur) {
            self.ack_seqno(cur);
            n_acked += 1;
        }
        let mut end = cur.wrapping_sub(1);

        // drop the type nibble; the first positive-run nibble is now on top
        runlen <<= 4;

        'runs: loop {
            // the positive run covers (end, cur]
            cur = end;
            end = end.wrapping_sub(u64::from(runlen >> 28));
            runlen <<= 4;

            loop {
                let Some(gap) = self.window.at_or_before(cur) else {
                    break 'runs;
                };
                cur = cur.wrapping_sub(u64::from(gap));
                if !seq_after(cur, end) {
                    break;
                }
                self.ack_seqno(cur);
                n_acked += 1;
            }

            if runlen == 0 {
                break;
            }
            // skip the negative run
            end = end.wrapping_sub(u64::from(runlen >> 28));
            runlen <<= 4;
        }

        if n_acked > 0 {
            self.rearm_retrans_timer();
        }
    }
}
