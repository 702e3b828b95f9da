//! Circular record of in-flight sequence numbers.
//!
//! A fixed window of the last `W` assigned sequence numbers is kept as a
//! ring of descriptor bins plus a presence bitmap of `2W` bits. The bitmap
//! stores every bit twice, at `pos` and `pos + W`, so that a single linear
//! scan over a `W`-bit span always sees the window as contiguous no matter
//! where the ring currently wraps.

use crate::pktdesc::PacketDesc;
use crate::sequence::seq_before;

/// The outstanding window: in-flight descriptors indexed by sequence number.
#[derive(Debug)]
pub struct OutstandingWindow {
    win_len: u32,
    next_seqno: u64,
    num_unacked: u32,
    bins: Box<[Option<PacketDesc>]>,
    mask: Box<[u64]>,
}

impl OutstandingWindow {
    /// Creates an empty window of capacity `window_len`, which must be a
    /// power of two no smaller than 4.
    pub fn new(window_len: u32) -> Self {
        debug_assert!(window_len >= 4 && window_len.is_power_of_two());
        let bits = 2 * window_len as usize;
        let words = (bits + 63) / 64;
        Self {
            win_len: window_len,
            next_seqno: 0,
            num_unacked: 0,
            bins: (0..window_len).map(|_| None).collect(),
            mask: vec![0u64; words].into_boxed_slice(),
        }
    }

    /// The next sequence number to be assigned.
    pub fn next_seqno(&self) -> u64 {
        self.next_seqno
    }

    /// Re-anchors the sequence space. The window must be empty.
    pub fn set_next_seqno(&mut self, seqno: u64) {
        debug_assert_eq!(self.num_unacked, 0);
        self.next_seqno = seqno;
    }

    /// Window capacity.
    pub fn window_len(&self) -> u32 {
        self.win_len
    }

    /// Number of unacknowledged descriptors currently held.
    pub fn len(&self) -> u32 {
        self.num_unacked
    }

    /// Whether every assigned sequence number has been resolved.
    pub fn is_empty(&self) -> bool {
        self.num_unacked == 0
    }

    fn pos(&self, seqno: u64) -> u32 {
        (seqno.wrapping_neg() as u32) & (self.win_len - 1)
    }

    fn window_edge(&self) -> u64 {
        self.next_seqno.wrapping_sub(u64::from(self.win_len))
    }

    fn test_bit(&self, index: u32) -> bool {
        self.mask[(index / 64) as usize] & (1u64 << (index % 64)) != 0
    }

    fn set_bit(&mut self, index: u32) {
        self.mask[(index / 64) as usize] |= 1u64 << (index % 64);
    }

    fn clear_bit(&mut self, index: u32) {
        self.mask[(index / 64) as usize] &= !(1u64 << (index % 64));
    }

    /// Index of the first set bit in `[start, limit)`, or `limit` when none.
    fn find_next_bit(&self, start: u32, limit: u32) -> u32 {
        let mut index = start;
        while index < limit {
            let word = (index / 64) as usize;
            let masked = self.mask[word] & (!0u64 << (index % 64));
            if masked != 0 {
                let found = word as u32 * 64 + masked.trailing_zeros();
                return found.min(limit);
            }
            index = (word as u32 + 1) * 64;
        }
        limit
    }

    /// Index of the last set bit in `[0, limit)`, or `limit` when none.
    fn find_last_bit(&self, limit: u32) -> u32 {
        if limit == 0 {
            return 0;
        }
        let top_word = ((limit - 1) / 64) as usize;
        for word in (0..=top_word).rev() {
            let mut masked = self.mask[word];
            if word == top_word {
                masked &= !0u64 >> (63 - (limit - 1) % 64);
            }
            if masked != 0 {
                return word as u32 * 64 + 63 - masked.leading_zeros();
            }
        }
        limit
    }

    /// Whether `seqno` is still awaiting acknowledgment. Requires `seqno`
    /// within `[next_seqno - W, next_seqno)`.
    pub fn is_unacked(&self, seqno: u64) -> bool {
        self.test_bit(self.pos(seqno))
    }

    /// Stores `pd` as the next assigned sequence number. The slot being
    /// reused must have been vacated first (see the engine's send
    /// preparation step).
    pub fn add(&mut self, pd: PacketDesc) {
        let index = self.pos(self.next_seqno);
        debug_assert!(!self.is_unacked(self.window_edge()));
        debug_assert_eq!(pd.seqno, self.next_seqno);

        self.set_bit(index);
        self.set_bit(index + self.win_len);
        self.bins[index as usize] = Some(pd);
        self.num_unacked += 1;
        self.next_seqno = self.next_seqno.wrapping_add(1);
    }

    /// Removes and returns the descriptor for `seqno`, which must be
    /// unacked and within the window.
    pub fn pop(&mut self, seqno: u64) -> PacketDesc {
        debug_assert!(self.is_unacked(seqno));
        let index = self.pos(seqno);
        self.clear_bit(index);
        self.clear_bit(index + self.win_len);
        self.num_unacked -= 1;
        self.bins[index as usize]
            .take()
            .expect("bitmap marked an empty bin as unacked")
    }

    /// The descriptor for `seqno`, when it is within the window and still
    /// unacked.
    pub fn get(&self, seqno: u64) -> Option<&PacketDesc> {
        if seq_before(seqno, self.window_edge())
            || !seq_before(seqno, self.next_seqno)
            || !self.is_unacked(seqno)
        {
            return None;
        }
        self.bins[self.pos(seqno) as usize].as_ref()
    }

    /// Send timestamp of the descriptor for `seqno`, which must be unacked
    /// and within the window.
    pub fn sent_timestamp(&self, seqno: u64) -> u64 {
        debug_assert!(self.is_unacked(seqno));
        self.bins[self.pos(seqno) as usize]
            .as_ref()
            .expect("bitmap marked an empty bin as unacked")
            .sent_timestamp
    }

    /// Distance from `seqno` down to the closest unacked sequence number at
    /// or before it, or `None` when no such sequence remains in the window.
    /// `seqno` must be strictly before `next_seqno`.
    pub fn at_or_before(&self, seqno: u64) -> Option<u32> {
        debug_assert!(seq_before(seqno, self.next_seqno));

        if seq_before(seqno, self.window_edge()) {
            return None;
        }

        let head = self.pos(self.next_seqno.wrapping_sub(1));
        // two bit indices can name this seqno; take the first one not
        // smaller than the head
        let seqno_index = head + self.pos(seqno.wrapping_sub(self.next_seqno.wrapping_sub(1)));
        let limit = head + self.win_len;

        let found = self.find_next_bit(seqno_index, limit);
        if found == limit {
            None
        } else {
            Some(found - seqno_index)
        }
    }

    /// The earliest unacked sequence number at or after `hint`. At least
    /// one unacked entry at or after `hint` must exist, and `hint` must be
    /// within the window.
    pub fn earliest_unacked_hint(&self, hint: u64) -> u64 {
        debug_assert!(self.num_unacked > 0);
        let hint_pos = self.pos(hint);
        let found = self.find_last_bit(hint_pos + self.win_len + 1);
        debug_assert!(found <= hint_pos + self.win_len);
        // found runs from hint_pos + W (the hint itself) downward as the
        // sought seqno moves later
        hint.wrapping_add(u64::from(hint_pos + self.win_len - found))
    }

    /// The earliest unacked sequence number. The window must be non-empty.
    pub fn earliest_unacked(&self) -> u64 {
        self.earliest_unacked_hint(self.window_edge())
    }

    /// Drops every descriptor still held, leaving the window empty.
    pub fn clear(&mut self) {
        // start at the last assigned seqno and hop backwards over the
        // unacked entries
        let mut seqno = self.next_seqno.wrapping_sub(1);
        while let Some(gap) = self.at_or_before(seqno) {
            seqno = seqno.wrapping_sub(u64::from(gap));
            drop(self.pop(seqno));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: u64 = 10007;
    const WIN: u32 = 128;

    fn desc(seqno: u64, sent_timestamp: u64) -> PacketDesc {
        let mut pd = PacketDesc::new();
        pd.seqno = seqno;
        pd.sent_timestamp = sent_timestamp;
        pd
    }

    fn filled_window(window_len: u32) -> OutstandingWindow {
        let mut wnd = OutstandingWindow::new(window_len);
        wnd.set_next_seqno(BASE);
        for i in 0..u64::from(window_len) {
            wnd.add(desc(BASE + i, 1_000_000 + i));
        }
        wnd
    }

    fn assert_mirror_invariant(wnd: &OutstandingWindow) {
        let mut set_bits = 0;
        for i in 0..wnd.win_len {
            assert_eq!(wnd.test_bit(i), wnd.test_bit(i + wnd.win_len), "bit {}", i);
            assert_eq!(wnd.test_bit(i), wnd.bins[i as usize].is_some(), "bin {}", i);
            if wnd.test_bit(i) {
                set_bits += 1;
            }
        }
        assert_eq!(wnd.len(), set_bits);
    }

    #[test]
    fn empty_window_has_no_unacked() {
        let mut wnd = OutstandingWindow::new(WIN);
        wnd.set_next_seqno(BASE);
        for seqno in BASE - u64::from(WIN)..BASE {
            assert_eq!(wnd.at_or_before(seqno), None);
            assert!(!wnd.is_unacked(seqno));
        }
        assert!(wnd.is_empty());
    }

    #[test]
    fn basic_window_cycle() {
        let mut wnd = filled_window(WIN);
        assert_eq!(wnd.len(), WIN);
        assert_mirror_invariant(&wnd);

        for seqno in BASE..BASE + u64::from(WIN) {
            assert!(wnd.is_unacked(seqno));
            assert_eq!(wnd.at_or_before(seqno), Some(0));
        }
        assert_eq!(wnd.earliest_unacked(), BASE);

        assert_eq!(wnd.pop(BASE).sent_timestamp, 1_000_000);
        assert_eq!(wnd.earliest_unacked(), BASE + 1);
        assert_eq!(wnd.at_or_before(BASE), None);
        assert_eq!(wnd.at_or_before(BASE + 1), Some(0));

        assert_eq!(wnd.pop(BASE + 2).seqno, BASE + 2);
        assert_eq!(wnd.earliest_unacked(), BASE + 1);
        assert_eq!(wnd.at_or_before(BASE + 2), Some(1));
        assert_mirror_invariant(&wnd);
    }

    #[test]
    fn long_pop_run_keeps_scans_consistent() {
        let mut wnd = filled_window(256);
        wnd.pop(BASE);
        wnd.pop(BASE + 2);

        for seqno in BASE + 3..BASE + 152 {
            assert_eq!(wnd.pop(seqno).seqno, seqno);
            assert!(!wnd.is_unacked(seqno));
            assert_eq!(wnd.at_or_before(seqno), Some((seqno - BASE - 1) as u32));
            assert_eq!(wnd.at_or_before(seqno + 1), Some(0));
            assert_eq!(wnd.earliest_unacked(), BASE + 1);
        }
        for seqno in BASE + 152..BASE + 256 {
            assert!(wnd.is_unacked(seqno));
            assert_eq!(wnd.at_or_before(seqno), Some(0));
        }

        assert_eq!(wnd.pop(BASE + 1).seqno, BASE + 1);
        assert_eq!(wnd.earliest_unacked(), BASE + 152);
        assert_mirror_invariant(&wnd);
    }

    #[test]
    fn earliest_jumps_over_a_popped_gap() {
        let mut wnd = filled_window(WIN);
        wnd.pop(BASE);
        for seqno in BASE + 2..BASE + u64::from(WIN) {
            wnd.pop(seqno);
        }
        assert_eq!(wnd.len(), 1);
        assert_eq!(wnd.earliest_unacked(), BASE + 1);
        assert_eq!(wnd.earliest_unacked_hint(BASE + 1), BASE + 1);

        wnd.pop(BASE + 1);
        assert!(wnd.is_empty());
        assert_mirror_invariant(&wnd);
    }

    #[test]
    fn clear_walks_every_descriptor_out() {
        let mut wnd = filled_window(WIN);
        wnd.pop(BASE + 17);
        wnd.pop(BASE + 90);
        wnd.clear();
        assert!(wnd.is_empty());
        assert_mirror_invariant(&wnd);
        for bin in wnd.bins.iter() {
            assert!(bin.is_none());
        }
    }

    #[test]
    fn add_pop_round_trip_restores_state() {
        let mut wnd = OutstandingWindow::new(WIN);
        wnd.set_next_seqno(BASE);
        for i in 0..10u64 {
            wnd.add(desc(BASE + i, i));
        }
        // pop out of order
        for seqno in [BASE + 5, BASE + 9, BASE, BASE + 7, BASE + 1] {
            assert_eq!(wnd.pop(seqno).seqno, seqno);
        }
        for seqno in [BASE + 2, BASE + 3, BASE + 4, BASE + 6, BASE + 8] {
            assert_eq!(wnd.pop(seqno).seqno, seqno);
        }
        assert!(wnd.is_empty());
        assert_eq!(wnd.next_seqno(), BASE + 10);
        assert_mirror_invariant(&wnd);
    }

    #[test]
    fn tiny_window_wraps() {
        let mut wnd = OutstandingWindow::new(4);
        for i in 0..4u64 {
            wnd.add(desc(i, i));
        }
        assert_eq!(wnd.len(), 4);
        assert_eq!(wnd.earliest_unacked(), 0);
        assert!(wnd.is_unacked(0));

        wnd.pop(0);
        wnd.add(desc(4, 4));
        assert_eq!(wnd.earliest_unacked(), 1);
        assert_eq!(wnd.at_or_before(4), Some(0));
        assert_mirror_invariant(&wnd);
    }

    #[test]
    fn get_rejects_out_of_window_seqnos() {
        let mut wnd = filled_window(WIN);
        assert!(wnd.get(BASE).is_some());
        assert!(wnd.get(BASE - 1).is_none());
        wnd.pop(BASE + 3);
        assert!(wnd.get(BASE + 3).is_none());
    }
}
