use fastpass_protocol::pktdesc::PacketDesc;

/// Callbacks into the upper layer (the packet scheduler that produces
/// allocation requests and consumes allocation results).
///
/// All callbacks run with the engine lock held; implementations must not
/// re-enter the engine or block on locks the send path can hold.
pub trait SchedulerOps: Send {
    /// The peer positively acknowledged this descriptor. Ownership moves
    /// to the callee.
    fn handle_ack(&mut self, pd: PacketDesc);

    /// The descriptor is presumed lost, either by timeout or by falling
    /// off the window edge. Ownership moves to the callee.
    fn handle_neg_ack(&mut self, pd: PacketDesc);

    /// A new epoch was accepted; drop any state staked on the previous
    /// one.
    fn handle_reset(&mut self);

    /// A received allocation: `slots` carries one 4-bit code per timeslot,
    /// packed verbatim from the wire, for the destinations in `dsts`
    /// starting at `base_tslot`.
    fn handle_alloc(&mut self, base_tslot: u32, dsts: &[u16], slots: &[u8]);
}
