#![warn(missing_docs)]

//! fastpass-endpoint: the per-peer reliability engine.
//!
//! One [`Endpoint`] serves one peer. It assigns sequence numbers to
//! outbound datagrams, tracks the unacknowledged ones in the outstanding
//! window, consumes compressed acknowledgment runs, drives the
//! retransmission deadline, and keeps both ends agreed on a shared epoch.

mod endpoint;
/// Upper-layer callback interface.
pub mod ops;
/// Engine statistics counters.
pub mod statistics;

pub use endpoint::Endpoint;
pub use ops::SchedulerOps;
pub use statistics::EndpointStatistics;
