//! Engine statistics counters.
//!
//! Nothing the engine encounters at runtime is fatal; malformed input and
//! transmission trouble land in these counters and the datagram (or its
//! remainder) is dropped.

/// Counters kept by one engine instance.
#[derive(Debug, Clone, Default)]
pub struct EndpointStatistics {
    /// Datagrams handed to the receive path.
    pub rx_packets: u64,
    /// Datagrams below the minimal size.
    pub rx_too_short: u64,
    /// Datagrams whose remainder was discarded at an unknown payload type.
    pub rx_unknown_payload: u64,
    /// RESET payloads cut off before their 8 bytes.
    pub rx_incomplete_reset: u64,
    /// ALLOC payloads shorter than their own length fields claim.
    pub rx_incomplete_alloc: u64,
    /// ACK payloads cut off before their 6 bytes.
    pub rx_incomplete_ack: u64,
    /// ACKs naming a sequence number already below the window.
    pub too_early_ack: u64,
    /// RESETs repeating the current epoch while already in sync.
    pub redundant_reset: u64,
    /// RESETs outside the acceptance window around the current time.
    pub reset_out_of_window: u64,
    /// RESETs older than an epoch already accepted within the window.
    pub outdated_reset: u64,
    /// Descriptors evicted because the window slid past them unacked.
    pub fall_off_window: u64,
    /// Datagrams the transport refused to send.
    pub xmit_errors: u64,
    /// Outbound frames that could not be built.
    pub alloc_errors: u64,
    /// Descriptors positively acknowledged.
    pub acked_packets: u64,
    /// Descriptors given up on (timeout or fall-off).
    pub neg_acked_packets: u64,
}

impl EndpointStatistics {
    /// Resets all counters.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
