#![doc(issue_tracker_base_url = "https://github.com/chainbound/chorus/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

pub use chorus_node::*;
pub use chorus_transport::{broadcast_addr, BroadcastUdp, Datagram, DRIVER_PORT};
pub use chorus_wire::{Codec, Packet, PACKET_SIZE};
