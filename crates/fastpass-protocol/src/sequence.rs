//! Sequence number and epoch arithmetic.
//!
//! Sequence numbers are full 64-bit values locally but travel truncated on
//! the wire: RESET payloads carry the low 56 bits of the epoch timestamp and
//! ACK payloads carry the low 16 bits of a sequence number. The helpers here
//! recover the full values and anchor the sequence space on an epoch.

const JHASH_INITVAL: u32 = 0xdead_beef;

fn jhash_final(mut a: u32, mut b: u32, mut c: u32) -> u32 {
    c ^= b;
    c = c.wrapping_sub(b.rotate_left(14));
    a ^= c;
    a = a.wrapping_sub(c.rotate_left(11));
    b ^= a;
    b = b.wrapping_sub(a.rotate_left(25));
    c ^= b;
    c = c.wrapping_sub(b.rotate_left(16));
    a ^= c;
    a = a.wrapping_sub(c.rotate_left(4));
    b ^= a;
    b = b.wrapping_sub(a.rotate_left(14));
    c ^= b;
    c = c.wrapping_sub(b.rotate_left(24));
    c
}

/// Jenkins one-word hash of a 64-bit value: the low half hashed with the
/// high half as the key. Keys the header checksum and derives the sequence
/// anchor from an epoch; not security-sensitive.
pub fn hash64(value: u64) -> u32 {
    let initval = ((value >> 32) as u32)
        .wrapping_add(JHASH_INITVAL)
        .wrapping_add(1 << 2);
    let a = (value as u32).wrapping_add(initval);
    jhash_final(a, initval, initval)
}

/// Derives the first sequence number of an epoch.
pub fn derive_seqno(epoch: u64) -> u64 {
    let h = u64::from(hash64(epoch));
    epoch.wrapping_add(h).wrapping_add(h << 32)
}

/// Recovers a full epoch timestamp from its low 56 bits, placing the result
/// within `[now - 2^55, now + 2^55)`, the widest unambiguous range.
pub fn reconstruct_epoch(partial: u64, now: u64) -> u64 {
    let candidate = now.wrapping_sub(1 << 55);
    candidate.wrapping_add(partial.wrapping_sub(candidate) & ((1 << 56) - 1))
}

/// Recovers the full sequence number named by a 16-bit ACK field. The named
/// sequence is strictly before `next_seqno`, so the result lands in
/// `[next_seqno - 2^16, next_seqno)`.
pub fn reconstruct_ack_seqno(next_seqno: u64, ack_seq: u16) -> u64 {
    let base = next_seqno.wrapping_sub(1 << 16);
    base.wrapping_add(u64::from(ack_seq).wrapping_sub(base) & 0xFFFF)
}

/// Wrapping sequence comparison: `a` precedes `b`.
pub fn seq_before(a: u64, b: u64) -> bool {
    (a.wrapping_sub(b) as i64) < 0
}

/// Wrapping sequence comparison: `a` follows `b`.
pub fn seq_after(a: u64, b: u64) -> bool {
    seq_before(b, a)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_stable_and_spreads() {
        assert_eq!(hash64(0x1234_5678_9abc_def0), hash64(0x1234_5678_9abc_def0));
        assert_ne!(hash64(0), hash64(1));
        // high half participates
        assert_ne!(hash64(0x5), hash64(0x1_0000_0005));
    }

    #[test]
    fn derived_seqno_depends_on_both_halves_of_epoch() {
        let a = derive_seqno(1_000_000_000_000);
        let b = derive_seqno(1_000_000_000_001);
        assert_ne!(a, b);
        assert_ne!(derive_seqno(0), 0);
    }

    #[test]
    fn epoch_recovery_within_half_range() {
        let now = 1_000_000_000_000u64;
        for offset in [0i64, 1, -1, 400_000_000, -400_000_000, 1 << 54, -(1 << 54)] {
            let actual = now.wrapping_add(offset as u64);
            let partial = actual & ((1 << 56) - 1);
            assert_eq!(reconstruct_epoch(partial, now), actual, "offset {}", offset);
        }
    }

    #[test]
    fn epoch_recovery_strips_high_bits() {
        let now = 1u64 << 60;
        let actual = now + 5;
        let partial = actual & ((1 << 56) - 1);
        assert_eq!(reconstruct_epoch(partial, now), actual);
    }

    #[test]
    fn ack_seqno_recovery_crosses_16_bit_cycles() {
        // an ack naming a seqno in the current cycle
        assert_eq!(reconstruct_ack_seqno(0x0001_0005, 0x0001), 0x0001_0001);
        // an ack naming a seqno in the previous cycle
        assert_eq!(reconstruct_ack_seqno(0x0001_0005, 0xFFFF), 0x0000_FFFF);
        // result is always strictly before next_seqno
        assert_eq!(reconstruct_ack_seqno(0x0001_0005, 0x0004), 0x0001_0004);
        // the oldest representable seqno is exactly next_seqno - 2^16
        assert_eq!(reconstruct_ack_seqno(0x0001_0005, 0x0005), 0x0000_0005);
    }

    #[test]
    fn wrapping_comparisons() {
        assert!(seq_before(1, 2));
        assert!(!seq_before(2, 2));
        assert!(seq_before(u64::MAX, 0));
        assert!(seq_after(0, u64::MAX));
        assert!(!seq_after(2, 2));
    }
}
