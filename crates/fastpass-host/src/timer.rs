//! Two-step retransmission timer.
//!
//! The timer thread plays the part of the hardware timer: it waits for the
//! scheduled deadline but never touches the engine lock. On expiry it sets
//! the `firing` flag and pushes a notification into the fired channel; the
//! host's poll loop picks that up and runs the engine's expiry handler
//! under the lock (the deferred work). While the flag is set,
//! `try_cancel` fails, telling the arming path to leave re-arming to the
//! expiry handler.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use tracing::debug;

use fastpass_core::{error::Result, timer::TimerDriver};

use crate::time::Clock;

enum TimerCmd {
    Schedule(u64),
    Cancel,
    Shutdown,
}

/// Handle the engine arms and cancels the deadline through.
pub struct TimerHandle {
    cmd_tx: Sender<TimerCmd>,
    firing: Arc<AtomicBool>,
}

impl TimerDriver for TimerHandle {
    fn schedule(&mut self, deadline_ns: u64) {
        let _ = self.cmd_tx.send(TimerCmd::Schedule(deadline_ns));
    }

    fn try_cancel(&mut self) -> bool {
        if self.firing.load(Ordering::Acquire) {
            return false;
        }
        let _ = self.cmd_tx.send(TimerCmd::Cancel);
        true
    }
}

/// Owns the timer thread and the fired-notification side.
pub struct RetransTimer {
    cmd_tx: Sender<TimerCmd>,
    firing: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl RetransTimer {
    /// Spawns the timer thread. Returns the timer, the handle to give the
    /// engine, and the channel the poll loop drains for expiry
    /// notifications.
    pub fn spawn(clock: Arc<dyn Clock>) -> Result<(RetransTimer, TimerHandle, Receiver<()>)> {
        let (cmd_tx, cmd_rx) = unbounded::<TimerCmd>();
        // one pending firing at a time
        let (fired_tx, fired_rx) = bounded::<()>(1);
        let firing = Arc::new(AtomicBool::new(false));

        let thread_firing = firing.clone();
        let thread = thread::Builder::new()
            .name("fastpass-retrans-timer".into())
            .spawn(move || run_timer(clock, cmd_rx, fired_tx, thread_firing))?;

        let handle = TimerHandle { cmd_tx: cmd_tx.clone(), firing: firing.clone() };
        Ok((RetransTimer { cmd_tx, firing, thread: Some(thread) }, handle, fired_rx))
    }

    /// Marks the pending firing as handled. The poll loop calls this after
    /// running the engine's expiry handler.
    pub fn firing_handled(&self) {
        self.firing.store(false, Ordering::Release);
    }

    /// Stops the timer thread and waits for it to exit.
    pub fn shutdown(mut self) {
        let _ = self.cmd_tx.send(TimerCmd::Shutdown);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

fn run_timer(
    clock: Arc<dyn Clock>,
    cmd_rx: Receiver<TimerCmd>,
    fired_tx: Sender<()>,
    firing: Arc<AtomicBool>,
) {
    let mut deadline: Option<u64> = None;

    loop {
        let cmd = match deadline {
            None => match cmd_rx.recv() {
                Ok(cmd) => Some(cmd),
                Err(_) => return,
            },
            Some(deadline_ns) => {
                let now = clock.now_ns();
                if deadline_ns <= now {
                    // expiry: flag first, then notify, then forget the
                    // deadline; the expiry handler re-arms if needed. A
                    // notification already pending covers this expiry too.
                    firing.store(true, Ordering::Release);
                    debug!("retransmission deadline expired");
                    if let Err(TrySendError::Disconnected(_)) = fired_tx.try_send(()) {
                        return;
                    }
                    deadline = None;
                    continue;
                }
                match cmd_rx.recv_timeout(Duration::from_nanos(deadline_ns - now)) {
                    Ok(cmd) => Some(cmd),
                    Err(RecvTimeoutError::Timeout) => None,
                    Err(RecvTimeoutError::Disconnected) => return,
                }
            }
        };

        match cmd {
            Some(TimerCmd::Schedule(deadline_ns)) => deadline = Some(deadline_ns),
            Some(TimerCmd::Cancel) => deadline = None,
            Some(TimerCmd::Shutdown) => return,
            None => {} // timed out; loop to expire
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::SystemClock;

    #[test]
    fn past_deadline_fires_promptly() {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let (timer, mut handle, fired_rx) = RetransTimer::spawn(clock.clone()).unwrap();

        handle.schedule(clock.now_ns().saturating_sub(1));
        fired_rx
            .recv_timeout(Duration::from_secs(2))
            .expect("timer did not fire");
        assert!(!handle.try_cancel(), "cancel must fail while a firing is pending");

        timer.firing_handled();
        assert!(handle.try_cancel());
        timer.shutdown();
    }

    #[test]
    fn cancelled_deadline_does_not_fire() {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let (timer, mut handle, fired_rx) = RetransTimer::spawn(clock).unwrap();

        handle.schedule(SystemClock.now_ns() + 50_000_000);
        assert!(handle.try_cancel());
        assert!(fired_rx.recv_timeout(Duration::from_millis(200)).is_err());
        timer.shutdown();
    }
}
