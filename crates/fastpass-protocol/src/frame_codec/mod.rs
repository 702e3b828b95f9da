//! Wire framing of FastPass datagrams.
//!
//! A frame is a 4-byte header (16-bit sequence tail, 16-bit seq-keyed
//! checksum) followed by concatenated payloads. The encoder builds outbound
//! frames from a packet descriptor; the decoder splits inbound frames into
//! typed payloads for the engine to dispatch.

/// Seq-keyed one's-complement header checksum.
pub mod checksum;
mod decoder;
mod encoder;

#[cfg(test)]
mod tests;

pub use decoder::{Frame, FrameDecoder};
pub use encoder::FrameEncoder;
