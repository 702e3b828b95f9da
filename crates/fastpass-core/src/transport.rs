//! Transport abstraction for pluggable I/O.

use std::io::Result;

/// Low-level datagram sender abstraction.
///
/// The engine is bound to a single peer, so the destination is fixed when
/// the transport is constructed. Various transports (connected UDP socket,
/// in-memory pipe for tests) can be plugged into the engine without
/// coupling to a concrete implementation. The receive direction goes the
/// other way: the transport hands inbound datagrams to the engine.
pub trait DatagramTransport: Send {
    /// Sends a single datagram to the configured peer.
    fn send_datagram(&mut self, payload: &[u8]) -> Result<usize>;
}
