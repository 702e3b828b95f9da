use std::{
    io,
    sync::{Arc, Mutex},
};

use crossbeam_channel::Receiver;
use tracing::warn;

use fastpass_core::{config::Config, error::Result};
use fastpass_endpoint::{Endpoint, SchedulerOps};
use fastpass_protocol::pktdesc::PacketDesc;

use crate::{
    socket::{PeerSocket, UdpSender},
    time::{Clock, SystemClock},
    timer::RetransTimer,
};

const RECV_BUFFER_SIZE: usize = 2048;

/// Runs one endpoint engine against a connected UDP socket.
///
/// The host owns the engine lock and the three entry points: inbound
/// datagrams and timer expirations are drained by
/// [`manual_poll`](Host::manual_poll), the send path goes through
/// [`transmit`](Host::transmit). The upper layer's callbacks run on
/// whichever thread is polling, with the lock held.
pub struct Host {
    endpoint: Arc<Mutex<Endpoint<UdpSender>>>,
    socket: PeerSocket,
    timer: RetransTimer,
    fired_rx: Receiver<()>,
    clock: Arc<dyn Clock>,
    recv_buffer: Vec<u8>,
}

impl Host {
    /// Binds and connects the socket, spawns the timer thread, and builds
    /// the engine around them.
    pub fn connect(config: Config, handler: Box<dyn SchedulerOps>) -> Result<Self> {
        Self::connect_with_clock(config, handler, Arc::new(SystemClock))
    }

    /// Like [`connect`](Host::connect) with a caller-supplied clock.
    pub fn connect_with_clock(
        config: Config,
        handler: Box<dyn SchedulerOps>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let socket = PeerSocket::connect(&config)?;
        let (timer, timer_handle, fired_rx) = RetransTimer::spawn(clock.clone())?;

        let endpoint = Endpoint::new(
            &config,
            socket.sender()?,
            Box::new(timer_handle),
            handler,
            clock.now_ns(),
        )?;

        Ok(Host {
            endpoint: Arc::new(Mutex::new(endpoint)),
            socket,
            timer,
            fired_rx,
            clock,
            recv_buffer: vec![0; RECV_BUFFER_SIZE],
        })
    }

    /// Drains pending timer expirations and inbound datagrams into the
    /// engine. Call this in a loop; in blocking mode each call waits up to
    /// the configured polling timeout for traffic.
    pub fn manual_poll(&mut self) {
        while self.fired_rx.try_recv().is_ok() {
            let now = self.clock.now_ns();
            if let Ok(mut endpoint) = self.endpoint.lock() {
                endpoint.handle_timer_expiry(now);
            }
            self.timer.firing_handled();
        }

        loop {
            match self.socket.receive(&mut self.recv_buffer) {
                Ok(payload) => {
                    let now = self.clock.now_ns();
                    if let Ok(mut endpoint) = self.endpoint.lock() {
                        endpoint.handle_datagram(payload, now);
                    }
                }
                Err(e) if would_block(&e) => break,
                Err(e) => {
                    warn!("receive error: {}", e);
                    break;
                }
            }
        }
    }

    /// Runs the send path for one descriptor and returns its assigned
    /// sequence number, or `None` when the engine lock is poisoned.
    pub fn transmit(&self, pd: PacketDesc) -> Option<u64> {
        let now = self.clock.now_ns();
        let mut endpoint = self.endpoint.lock().ok()?;
        Some(endpoint.transmit(pd, now))
    }

    /// Shared handle to the engine, for direct use of the granular send
    /// path or the statistics.
    pub fn endpoint(&self) -> Arc<Mutex<Endpoint<UdpSender>>> {
        self.endpoint.clone()
    }

    /// The address the local socket is bound to.
    pub fn local_addr(&self) -> Result<std::net::SocketAddr> {
        self.socket.local_addr()
    }

    /// Tears the engine down: detaches the upper layer, stops the timer
    /// thread, and releases every outstanding descriptor.
    pub fn shutdown(self) {
        if let Ok(mut endpoint) = self.endpoint.lock() {
            endpoint.teardown();
        }
        self.timer.shutdown();
    }
}

fn would_block(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}
