use std::time::{SystemTime, UNIX_EPOCH};

/// Abstraction over a time source to improve testability.
///
/// FastPass timestamps are nanoseconds of wall-clock time: the reset
/// handshake anchors both endpoints on an epoch timestamp, so the two
/// machines must draw from comparable clocks.
pub trait Clock: Send + Sync + 'static {
    /// The current time in nanoseconds.
    fn now_ns(&self) -> u64;
}

/// System wall clock.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now_ns(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_nanos() as u64)
            .unwrap_or(0)
    }
}
