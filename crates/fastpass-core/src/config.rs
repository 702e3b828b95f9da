use std::{
    net::{Ipv4Addr, SocketAddr, SocketAddrV4},
    time::Duration,
};

use crate::constants::DEFAULT_PORT;

#[derive(Clone, Debug)]
/// Configuration options to tune engine and socket behavior.
///
/// All values are fixed once the engine is constructed.
pub struct Config {
    /// Address the local socket binds to.
    pub local_address: SocketAddr,
    /// Address of the single peer (the arbiter) this engine talks to.
    pub peer_address: SocketAddr,
    /// Time after a packet is committed before it is presumed lost.
    pub send_timeout: Duration,
    /// Width of the acceptance window for inbound RESET timestamps,
    /// centered on the current time.
    pub reset_window: Duration,
    /// Capacity of the outstanding window. Must be a power of two, at
    /// least 4.
    pub window_len: u32,
    /// Make the underlying UDP socket block when true, otherwise
    /// non-blocking.
    pub blocking_mode: bool,
    /// How long a blocking receive waits before the poll loop gets to run
    /// timers. Ignored in non-blocking mode.
    pub socket_polling_timeout: Option<Duration>,
    /// Socket receive buffer size in bytes (None = use system default).
    /// Corresponds to SO_RCVBUF.
    pub socket_recv_buffer_size: Option<usize>,
    /// Socket send buffer size in bytes (None = use system default).
    /// Corresponds to SO_SNDBUF.
    pub socket_send_buffer_size: Option<usize>,
    /// Time-to-live for outgoing packets (None = use system default).
    /// Corresponds to IP_TTL.
    pub socket_ttl: Option<u32>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            local_address: SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0)),
            peer_address: SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, DEFAULT_PORT)),
            send_timeout: Duration::from_millis(1),
            reset_window: Duration::from_secs(1),
            window_len: 256,
            blocking_mode: false,
            socket_polling_timeout: Some(Duration::from_millis(1)),
            socket_recv_buffer_size: None,
            socket_send_buffer_size: None,
            socket_ttl: None,
        }
    }
}
