/// A single payload decoded from an inbound datagram.
///
/// Datagrams concatenate payloads back to back; each starts with a 4-bit
/// type nibble in the high bits of its first byte. The endpoint receives
/// RESET, ALLOC and ACK payloads; allocation requests only travel in the
/// other direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Epoch announcement carrying the low 56 bits of the peer's reset
    /// timestamp.
    Reset {
        /// Truncated epoch timestamp, nanoseconds.
        partial_epoch: u64,
    },
    /// Timeslot allocations for previously requested flows. The slot codes
    /// are opaque to the reliability layer and handed to the upper layer
    /// verbatim.
    Alloc {
        /// First timeslot the allocation codes apply to.
        base_tslot: u32,
        /// Destinations the codes refer to.
        dsts: Vec<u16>,
        /// Per-slot allocation codes.
        slots: Vec<u8>,
    },
    /// Compressed acknowledgment run over the sender's outstanding window.
    Ack {
        /// Run-length nibbles as read from the wire; the top nibble is the
        /// payload type and is discarded by the decoder walk.
        runlen: u32,
        /// Low 16 bits of the most recent acknowledged sequence number.
        seq: u16,
    },
}
