#![warn(missing_docs)]

//! fastpass-protocol: wire types, framing, and reliability bookkeeping
//! primitives.

/// Wire framing of FastPass datagrams.
pub mod frame_codec;
/// Circular record of in-flight sequence numbers.
pub mod outwnd;
/// Inbound payload types.
pub mod payload;
/// Per-datagram packet descriptors.
pub mod pktdesc;
/// Sequence number and epoch arithmetic.
pub mod sequence;

pub use outwnd::OutstandingWindow;
pub use payload::Payload;
pub use pktdesc::{AreqEntry, PacketDesc};
