//! Retransmission timer discipline.
//!
//! A single deadline covers the whole window: it always tracks the
//! earliest unacked descriptor. Expiry is delivered as deferred work
//! under the engine lock; the handler negatively acknowledges everything
//! whose timeout has passed and re-arms for the next survivor.

use tracing::debug;

use fastpass_core::transport::DatagramTransport;

use super::Endpoint;

impl<T: DatagramTransport> Endpoint<T> {
    /// Cancels and re-arms the deadline for the current earliest unacked
    /// descriptor. When the cancel fails because the expiry handler is
    /// already running or queued, nothing is done here: that handler
    /// re-arms on its way out.
    pub(crate) fn rearm_retrans_timer(&mut self) {
        if !self.retrans_timer.try_cancel() {
            debug!("could not cancel timer, expiry handler will rearm");
            return;
        }

        if self.window.is_empty() {
            debug!("all packets acked, no need to set timer");
            return;
        }

        let seqno = self.window.earliest_unacked();
        let deadline = self.window.sent_timestamp(seqno) + self.send_timeout_ns;
        self.earliest_unacked = seqno;
        self.retrans_timer.schedule(deadline);
        debug!("setting timer to {} for seq {:#x}", deadline, seqno);
    }

    /// Timer-path entry point: the deferred expiry work. Walks the window
    /// from the earliest unacked descriptor upward, giving up on every one
    /// whose timeout has passed, then re-arms for the first survivor.
    ///
    /// A no-op while the engine is being torn down.
    pub fn handle_timer_expiry(&mut self, now: u64) {
        if self.handler.is_none() {
            return;
        }

        let mut seqno = self.earliest_unacked;
        while !self.window.is_empty() {
            seqno = self.window.earliest_unacked_hint(seqno);
            let deadline = self.window.sent_timestamp(seqno) + self.send_timeout_ns;

            if deadline > now {
                self.earliest_unacked = seqno;
                self.retrans_timer.schedule(deadline);
                debug!("setting timer to {} for seq {:#x}", deadline, seqno);
                return;
            }

            self.neg_ack_seqno(seqno);
        }
        debug!("window empty, not setting timer");
    }
}
