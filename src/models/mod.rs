//! Domain models for the Neutron and Blazar resources the commands work with.
//!
//! - [`Network`] - Neutron network with provider (VLAN) attributes
//! - [`Port`] and [`DeviceOwner`] - Neutron port and what consumes it
//! - [`Subnet`] and [`AllocationPool`] - Neutron subnet
//! - [`Router`] - Neutron router
//! - [`FloatingIpReservation`] - Blazar reservable floating IP
//! - [`Ipv4`] - IPv4 CIDR block and range helpers

mod ipv4;
mod network;
mod port;
mod reservation;
mod router;
mod subnet;

pub use ipv4::{
    broadcast_addr, cut_addr, expand_range, get_cidr_mask, lo_mask, summarize_range, Ipv4,
    MAX_LENGTH,
};
pub use network::Network;
pub use port::{DeviceOwner, FixedIp, Port};
pub use reservation::FloatingIpReservation;
pub use router::Router;
pub use subnet::{AllocationPool, Subnet};
