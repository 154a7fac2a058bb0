//! Neutron subnet data model.

use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// Inclusive `start..=end` range of addresses Neutron hands out from a subnet.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocationPool {
    pub start: IpAddr,
    pub end: IpAddr,
}

/// A Neutron subnet.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Subnet {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub network_id: String,
    #[serde(default)]
    pub cidr: Option<String>,
    #[serde(default)]
    pub allocation_pools: Vec<AllocationPool>,
}
