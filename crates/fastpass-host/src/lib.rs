#![warn(missing_docs)]

//! fastpass-host: socket and timer glue around the endpoint engine.
//!
//! The engine itself is a sans-io state machine; this crate supplies the
//! pieces that tie it to the outside world: a connected single-peer UDP
//! socket, a wall-clock time source, the two-step retransmission timer,
//! and the [`Host`] poll loop that serializes all three entry points
//! behind the engine lock.

mod host;
/// Single-peer UDP socket.
pub mod socket;
/// Wall-clock time source.
pub mod time;
/// Two-step retransmission timer.
pub mod timer;

pub use host::Host;
pub use socket::{PeerSocket, UdpSender};
pub use time::{Clock, SystemClock};
