//! Deadline timer abstraction driven by the engine.

/// A single re-armable deadline.
///
/// The engine keeps at most one retransmission deadline scheduled at any
/// moment. Implementations deliver expiry to the engine out of band (the
/// host runs the expiry handler under the engine lock); `try_cancel` must
/// report when an expiry is already in flight so the caller can leave
/// re-arming to the expiry handler itself.
pub trait TimerDriver: Send {
    /// Arms the deadline at an absolute nanosecond timestamp, replacing any
    /// previously scheduled deadline.
    fn schedule(&mut self, deadline_ns: u64);

    /// Attempts to disarm the deadline. Returns `false` when the expiry is
    /// already running or queued; the caller must not re-arm in that case.
    fn try_cancel(&mut self) -> bool;
}
