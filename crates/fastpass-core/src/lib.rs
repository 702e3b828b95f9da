#![warn(missing_docs)]

//! fastpass-core: foundational types and traits.
//!
//! This crate provides the minimal set of core definitions shared across all
//! layers:
//! - Configuration types
//! - Error handling
//! - Protocol constants
//! - The transport and timer seams the engine is driven through
//!
//! Protocol logic lives in the specialized crates:
//! - `fastpass-protocol`: wire codec, outstanding window, sequence arithmetic
//! - `fastpass-endpoint`: the per-peer reliability engine
//! - `fastpass-host`: socket and timer glue around the engine

/// Protocol constants shared across layers.
pub mod constants {
    /// Size of the FastPass header (16-bit sequence + 16-bit checksum).
    pub const HEADER_SIZE: usize = 4;
    /// A datagram must carry the header plus at least one payload byte.
    pub const MIN_DGRAM_SIZE: usize = 5;
    /// Payload type nibble for RESET, both directions.
    pub const PTYPE_RESET: u8 = 0x0;
    /// Payload type nibble for allocation requests (outbound only).
    pub const PTYPE_AREQ: u8 = 0x1;
    /// Payload type nibble for allocations (inbound only).
    pub const PTYPE_ALLOC: u8 = 0x2;
    /// Payload type nibble for compressed acknowledgment runs.
    pub const PTYPE_ACK: u8 = 0x3;
    /// Maximum allocation-request entries per datagram (6-bit count field).
    pub const MAX_AREQ: usize = 63;
    /// IP protocol number used in the checksum pseudo-header.
    pub const IPPROTO_FASTPASS: u8 = 222;
    /// Endpoints bind a fixed port; the arbiter tells hosts apart by address.
    pub const DEFAULT_PORT: u16 = 1;
}

/// Configuration options for the engine and host.
pub mod config;
/// Error types and results.
pub mod error;
/// Deadline timer abstraction driven by the engine.
pub mod timer;
/// Transport abstraction for pluggable I/O.
pub mod transport;
