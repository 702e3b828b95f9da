use fastpass_core::constants::{HEADER_SIZE, MAX_AREQ};

/// One allocation request carried by an outbound datagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AreqEntry {
    /// Flow key naming the source/destination pair the request is for.
    pub src_dst_key: u16,
    /// Number of timeslots requested for that flow.
    pub tslots: u16,
}

/// Descriptor of one transmitted datagram.
///
/// The upper layer fills in the allocation requests and hands the
/// descriptor to the engine, which assigns the sequencing fields at commit
/// time and keeps the descriptor in the outstanding window until it is
/// acknowledged or presumed lost.
#[derive(Debug, Clone, Default)]
pub struct PacketDesc {
    /// Sequence number, assigned at commit.
    pub seqno: u64,
    /// Nanosecond timestamp of the commit.
    pub sent_timestamp: u64,
    /// Whether this datagram must carry a RESET payload.
    pub send_reset: bool,
    /// The epoch to carry in that RESET.
    pub reset_timestamp: u64,
    areq: Vec<AreqEntry>,
}

impl PacketDesc {
    /// Creates an empty descriptor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an allocation request. Returns `false` when the datagram
    /// already carries the maximum number of requests.
    pub fn push_areq(&mut self, src_dst_key: u16, tslots: u16) -> bool {
        if self.areq.len() >= MAX_AREQ {
            return false;
        }
        self.areq.push(AreqEntry { src_dst_key, tslots });
        true
    }

    /// The allocation requests carried by this datagram.
    pub fn areq(&self) -> &[AreqEntry] {
        &self.areq
    }

    /// Size of the encoded frame: header, optional RESET, A-REQ header and
    /// entries.
    pub fn encoded_len(&self) -> usize {
        HEADER_SIZE + if self.send_reset { 8 } else { 0 } + 2 + 4 * self.areq.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn areq_capped_at_wire_limit() {
        let mut pd = PacketDesc::new();
        for i in 0..MAX_AREQ {
            assert!(pd.push_areq(i as u16, 1));
        }
        assert!(!pd.push_areq(999, 1));
        assert_eq!(pd.areq().len(), MAX_AREQ);
    }

    #[test]
    fn encoded_len_counts_reset_and_entries() {
        let mut pd = PacketDesc::new();
        assert_eq!(pd.encoded_len(), 4 + 2);
        pd.push_areq(7, 2);
        pd.push_areq(9, 1);
        assert_eq!(pd.encoded_len(), 4 + 2 + 8);
        pd.send_reset = true;
        assert_eq!(pd.encoded_len(), 4 + 8 + 2 + 8);
    }
}
