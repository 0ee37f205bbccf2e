//! Transport-neutral inbound events and the outbound delivery seam.

pub mod channel;
pub mod channel_adapter;
