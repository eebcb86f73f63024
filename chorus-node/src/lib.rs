//! Node core for the chorus broadcast traffic simulation: packet
//! generation, paced transmission, bounded receiving, the rolling traffic
//! window, per-source reporting, and the round scheduler that drives them.

mod analyzer;
mod config;
mod factory;
mod node;
mod recv;
mod stats;
mod transmit;
mod window;

pub use analyzer::SourceCounters;
pub use config::NodeConfig;
pub use factory::PacketFactory;
pub use node::{Node, NodeError};
pub use recv::{Receiver, RecvError};
pub use stats::NodeStats;
pub use transmit::{TransmitError, Transmitter};
pub use window::TrafficWindow;

pub use chorus_wire::Packet;
