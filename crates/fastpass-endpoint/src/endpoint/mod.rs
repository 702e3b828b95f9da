use std::net::{Ipv4Addr, SocketAddr};

use tracing::{debug, warn};

use fastpass_core::{
    config::Config,
    error::{ErrorKind, Result},
    timer::TimerDriver,
    transport::DatagramTransport,
};
use fastpass_protocol::{
    frame_codec::{checksum, FrameEncoder},
    outwnd::OutstandingWindow,
    pktdesc::PacketDesc,
    sequence::{derive_seqno, reconstruct_epoch, seq_before},
};

use crate::{ops::SchedulerOps, statistics::EndpointStatistics};

mod rx;
mod timer;

/// The endpoint-side protocol engine, bound to exactly one peer.
///
/// The engine is a plain state machine: the host serializes all entry
/// points (receive path, send path, timer expiry) behind one lock and
/// passes the current time in explicitly.
pub struct Endpoint<T: DatagramTransport> {
    window: OutstandingWindow,

    /// Epoch timestamp both ends are currently anchored on.
    last_reset_time: u64,
    /// Whether the peer has acknowledged this epoch.
    in_sync: bool,
    /// Lower bound on the earliest unacked seqno, maintained for the timer
    /// walk.
    earliest_unacked: u64,

    send_timeout_ns: u64,
    reset_window_ns: u64,
    local_ip: Ipv4Addr,
    peer_ip: Ipv4Addr,

    handler: Option<Box<dyn SchedulerOps>>,
    transport: T,
    retrans_timer: Box<dyn TimerDriver>,
    stats: EndpointStatistics,
}

fn ipv4_of(addr: SocketAddr) -> Result<Ipv4Addr> {
    match addr {
        SocketAddr::V4(v4) => Ok(*v4.ip()),
        SocketAddr::V6(_) => Err(ErrorKind::InvalidConfig("FastPass runs over IPv4")),
    }
}

fn tstamp_in_window(tstamp: u64, win_middle: u64, win_size: u64) -> bool {
    tstamp >= win_middle - win_size / 2 && tstamp < win_middle + (win_size + 1) / 2
}

impl<T: DatagramTransport> Endpoint<T> {
    /// Creates an engine anchored on the current time. The engine starts
    /// out of sync: the first committed packet carries a RESET announcing
    /// the chosen epoch to the peer.
    pub fn new(
        config: &Config,
        transport: T,
        retrans_timer: Box<dyn TimerDriver>,
        handler: Box<dyn SchedulerOps>,
        now: u64,
    ) -> Result<Self> {
        if config.window_len < 4 || !config.window_len.is_power_of_two() {
            return Err(ErrorKind::InvalidConfig(
                "window_len must be a power of two, at least 4",
            ));
        }

        let mut endpoint = Self {
            window: OutstandingWindow::new(config.window_len),
            last_reset_time: 0,
            in_sync: false,
            earliest_unacked: 0,
            send_timeout_ns: config.send_timeout.as_nanos() as u64,
            reset_window_ns: config.reset_window.as_nanos() as u64,
            local_ip: ipv4_of(config.local_address)?,
            peer_ip: ipv4_of(config.peer_address)?,
            handler: Some(handler),
            transport,
            retrans_timer,
            stats: EndpointStatistics::default(),
        };
        endpoint.do_proto_reset(now);
        Ok(endpoint)
    }

    /// Ensures the engine can accept a new packet: if the bin the next
    /// sequence number will land in still holds an unacked descriptor, the
    /// window has slid past it and it is treated as lost.
    pub fn prepare_to_send(&mut self) {
        let window_edge = self
            .window
            .next_seqno()
            .wrapping_sub(u64::from(self.window.window_len()));

        if self.window.is_unacked(window_edge) {
            self.stats.fall_off_window += 1;
            self.neg_ack_seqno(window_edge);
            self.rearm_retrans_timer();
        }
    }

    /// Commits to delivering `pd`: assigns the next sequence number,
    /// stamps the send time and reset fields, and stores the descriptor in
    /// the outstanding window. Returns the assigned sequence number.
    pub fn commit_packet(&mut self, mut pd: PacketDesc, now: u64) -> u64 {
        pd.sent_timestamp = now;
        pd.seqno = self.window.next_seqno();
        pd.send_reset = !self.in_sync;
        pd.reset_timestamp = self.last_reset_time;

        let seqno = pd.seqno;
        self.window.add(pd);

        // first packet in the window arms the timer
        if self.window.len() == 1 {
            self.earliest_unacked = seqno;
            self.retrans_timer.schedule(now + self.send_timeout_ns);
        }
        seqno
    }

    /// Encodes and transmits the committed descriptor. A descriptor that
    /// was acknowledged between commit and send is skipped; a transport
    /// error leaves it in the window to time out normally.
    pub fn send_packet(&mut self, seqno: u64) {
        let Some(pd) = self.window.get(seqno) else {
            return;
        };

        let mut frame = match FrameEncoder::encode(pd) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("could not build frame for seq {:#x}: {}", seqno, e);
                self.stats.alloc_errors += 1;
                return;
            }
        };
        checksum::seal(&mut frame, self.local_ip, self.peer_ip, seqno);

        if let Err(e) = self.transport.send_datagram(&frame) {
            self.stats.xmit_errors += 1;
            warn!("transmit failed for seq {:#x}: {}", seqno, e);
        }
    }

    /// Runs the whole send path for one descriptor:
    /// [`prepare_to_send`](Self::prepare_to_send),
    /// [`commit_packet`](Self::commit_packet),
    /// [`send_packet`](Self::send_packet). Returns the assigned sequence
    /// number.
    pub fn transmit(&mut self, pd: PacketDesc, now: u64) -> u64 {
        self.prepare_to_send();
        let seqno = self.commit_packet(pd, now);
        self.send_packet(seqno);
        seqno
    }

    /// Detaches the upper layer: callbacks become plain descriptor drops.
    pub fn detach(&mut self) {
        self.handler = None;
    }

    /// Teardown: detach the upper layer, disarm the timer, release every
    /// descriptor still outstanding.
    pub fn teardown(&mut self) {
        self.detach();
        let _ = self.retrans_timer.try_cancel();
        self.window.clear();
    }

    pub(crate) fn process_reset(&mut self, partial_epoch: u64, now: u64) {
        let full_tstamp = reconstruct_epoch(partial_epoch, now);

        debug!(
            "got RESET {:#x}, last is {:#x}, full {}, now {}",
            partial_epoch, self.last_reset_time, full_tstamp, now
        );

        if full_tstamp == self.last_reset_time {
            if !self.in_sync {
                self.in_sync = true;
                debug!("now in sync");
            } else {
                self.stats.redundant_reset += 1;
            }
            return;
        }

        // reject resets outside the acceptance window
        if !tstamp_in_window(full_tstamp, now, self.reset_window_ns) {
            debug!(
                "reset out of window (diff={})",
                full_tstamp as i64 - now as i64
            );
            self.stats.reset_out_of_window += 1;
            return;
        }

        // a newer reset was already processed within the window
        if tstamp_in_window(self.last_reset_time, now, self.reset_window_ns)
            && full_tstamp < self.last_reset_time
        {
            self.stats.outdated_reset += 1;
            return;
        }

        self.do_proto_reset(full_tstamp);
        self.in_sync = true;
        if let Some(handler) = self.handler.as_mut() {
            handler.handle_reset();
        }
    }

    /// Re-anchors the sequence space on `reset_time`, releasing every
    /// outstanding descriptor without callbacks.
    fn do_proto_reset(&mut self, reset_time: u64) {
        self.window.clear();
        self.last_reset_time = reset_time;
        self.window.set_next_seqno(derive_seqno(reset_time));
    }

    pub(crate) fn ack_seqno(&mut self, seqno: u64) {
        debug_assert!(seq_before(seqno, self.window.next_seqno()));
        debug!("ack seqno {:#x}", seqno);

        let pd = self.window.pop(seqno);
        self.stats.acked_packets += 1;
        match self.handler.as_mut() {
            Some(handler) => handler.handle_ack(pd),
            None => drop(pd),
        }
    }

    pub(crate) fn neg_ack_seqno(&mut self, seqno: u64) {
        debug!("giving up on seq {:#x}", seqno);

        let pd = self.window.pop(seqno);
        self.stats.neg_acked_packets += 1;
        match self.handler.as_mut() {
            Some(handler) => handler.handle_neg_ack(pd),
            None => drop(pd),
        }
    }

    /// The outstanding window, for timestamp and occupancy queries.
    pub fn window(&self) -> &OutstandingWindow {
        &self.window
    }

    /// Number of committed but unresolved descriptors.
    pub fn num_unacked(&self) -> u32 {
        self.window.len()
    }

    /// The next sequence number to be assigned.
    pub fn next_seqno(&self) -> u64 {
        self.window.next_seqno()
    }

    /// Whether the peer has acknowledged the current epoch.
    pub fn in_sync(&self) -> bool {
        self.in_sync
    }

    /// The epoch timestamp currently anchoring the sequence space.
    pub fn last_reset_time(&self) -> u64 {
        self.last_reset_time
    }

    /// The engine's counters.
    pub fn stats(&self) -> &EndpointStatistics {
        &self.stats
    }
}
