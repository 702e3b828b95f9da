#![warn(missing_docs)]

//! FastPass: a small public API facade for the workspace.
//!
//! FastPass is a lightweight datagram protocol carrying allocation
//! requests from an end host to a central arbiter and allocation results
//! back. This crate re-exports the surface needed to run the
//! endpoint-side engine:
//!
//! - Host and configuration (`Host`, `Config`)
//! - Packet descriptors and requests (`PacketDesc`)
//! - The upper-layer callback interface (`SchedulerOps`)
//!
//! Example
//! ```ignore
//! use fastpass::{Config, Host, PacketDesc, SchedulerOps};
//!
//! struct Scheduler;
//! impl SchedulerOps for Scheduler {
//!     fn handle_ack(&mut self, _pd: PacketDesc) {}
//!     fn handle_neg_ack(&mut self, pd: PacketDesc) {
//!         // re-request what the lost datagram asked for
//!         let _ = pd.areq();
//!     }
//!     fn handle_reset(&mut self) {}
//!     fn handle_alloc(&mut self, _base: u32, _dsts: &[u16], _slots: &[u8]) {}
//! }
//!
//! let mut config = Config::default();
//! config.peer_address = "10.0.0.1:1".parse().unwrap();
//! let mut host = Host::connect(config, Box::new(Scheduler)).unwrap();
//!
//! let mut pd = PacketDesc::new();
//! pd.push_areq(42, 2);
//! host.transmit(pd);
//! host.manual_poll();
//! ```

// Core config and errors
pub use fastpass_core::config::Config;
pub use fastpass_core::error::{DecodingErrorKind, ErrorKind, Result};
// Engine: the per-peer state machine and its callback seam
pub use fastpass_endpoint::{Endpoint, EndpointStatistics, SchedulerOps};
// Host: socket, clock, and timer glue
pub use fastpass_host::{Clock, Host, SystemClock};
// Protocol: descriptors and wire payloads
pub use fastpass_protocol::{AreqEntry, PacketDesc, Payload};

/// Convenience prelude with the most commonly used items.
pub mod prelude {
    pub use crate::{
        AreqEntry, Config, Endpoint, EndpointStatistics, ErrorKind, Host, PacketDesc, Result,
        SchedulerOps,
    };
}
