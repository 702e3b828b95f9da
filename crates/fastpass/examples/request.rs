//! Sends allocation requests to a FastPass arbiter and prints what comes
//! back.
//!
//! - cargo run -p fastpass --example request -- 10.0.0.1:1
//! - cargo run -p fastpass --example request -- 10.0.0.1:1 8 100
//!   (8 requests, 100ms apart)

use std::{
    env,
    net::SocketAddr,
    thread,
    time::{Duration, Instant},
};

use fastpass::{Config, Host, PacketDesc, SchedulerOps};

struct PrintingScheduler;

impl SchedulerOps for PrintingScheduler {
    fn handle_ack(&mut self, pd: PacketDesc) {
        println!("[ack] seq {:#x}", pd.seqno);
    }

    fn handle_neg_ack(&mut self, pd: PacketDesc) {
        println!("[lost] seq {:#x} ({} requests)", pd.seqno, pd.areq().len());
    }

    fn handle_reset(&mut self) {
        println!("[reset] epoch changed, in-flight requests discarded");
    }

    fn handle_alloc(&mut self, base_tslot: u32, dsts: &[u16], slots: &[u8]) {
        println!(
            "[alloc] base_tslot={} dsts={:?} slot_codes={} bytes",
            base_tslot,
            dsts,
            slots.len()
        );
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Args: <arbiter_addr> [count] [interval_ms]
    let mut args = env::args().skip(1);
    let arbiter_addr: SocketAddr = args
        .next()
        .unwrap_or_else(|| "127.0.0.1:1".to_string())
        .parse()?;
    let count: u16 = args.next().unwrap_or_else(|| "5".into()).parse().unwrap_or(5);
    let interval_ms: u64 = args
        .next()
        .unwrap_or_else(|| "300".into())
        .parse()
        .unwrap_or(300);

    let config = Config {
        peer_address: arbiter_addr,
        ..Config::default()
    };
    let mut host = Host::connect(config, Box::new(PrintingScheduler))?;
    let local = host.local_addr()?;
    println!(
        "FastPass endpoint bound to {} -> sending {} requests to {} (every {}ms)",
        local, count, arbiter_addr, interval_ms
    );

    for i in 0..count {
        let mut pd = PacketDesc::new();
        pd.push_areq(i, 1);
        if let Some(seqno) = host.transmit(pd) {
            println!("[sent] seq {:#x}", seqno);
        }

        let start = Instant::now();
        let wait = Duration::from_millis(interval_ms);
        while start.elapsed() < wait {
            host.manual_poll();
            thread::sleep(Duration::from_millis(10));
        }
    }

    host.shutdown();
    println!("done");
    Ok(())
}
