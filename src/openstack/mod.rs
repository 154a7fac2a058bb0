//! Cloud API clients.
//!
//! The commands only see the [`NetworkClient`] and [`ReservationClient`]
//! traits. Implementations:
//! - [`neutron::NeutronClient`] / [`blazar::BlazarClient`] - live REST clients
//!   authenticated through [`auth::authenticate`]
//! - [`memory::MemoryCloud`] - in-memory backend loaded from a JSON snapshot

pub mod auth;
pub mod blazar;
pub mod memory;
pub mod neutron;
mod resource;
mod rest;

use crate::error::ApiError;
use crate::models::{DeviceOwner, FloatingIpReservation, Network, Port, Router, Subnet};
use async_trait::async_trait;

pub use blazar::BlazarClient;
pub use memory::MemoryCloud;
pub use neutron::NeutronClient;
pub use resource::ResourceKind;
pub use rest::RestClient;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Filter for listing networks. Unset fields do not filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NetworkQuery {
    pub name: Option<String>,
    pub segmentation_id: Option<u32>,
}

impl NetworkQuery {
    pub fn by_name(name: &str) -> Self {
        NetworkQuery {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    pub fn by_segment(segmentation_id: u32) -> Self {
        NetworkQuery {
            segmentation_id: Some(segmentation_id),
            ..Default::default()
        }
    }

    /// Query string pairs in Neutron's filter syntax.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(name) = &self.name {
            params.push(("name", name.clone()));
        }
        if let Some(segment) = self.segmentation_id {
            params.push(("provider:segmentation_id", segment.to_string()));
        }
        params
    }

    pub fn matches(&self, network: &Network) -> bool {
        self.name.as_ref().map_or(true, |n| *n == network.name)
            && self
                .segmentation_id
                .map_or(true, |s| network.segmentation_id == Some(s))
    }
}

/// Filter for listing ports. Unset fields do not filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PortQuery {
    pub network_id: Option<String>,
    pub device_id: Option<String>,
    pub device_owner: Option<DeviceOwner>,
}

impl PortQuery {
    pub fn on_network(network_id: &str) -> Self {
        PortQuery {
            network_id: Some(network_id.to_string()),
            ..Default::default()
        }
    }

    pub fn on_device(device_id: &str, device_owner: DeviceOwner) -> Self {
        PortQuery {
            device_id: Some(device_id.to_string()),
            device_owner: Some(device_owner),
            ..Default::default()
        }
    }

    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(network_id) = &self.network_id {
            params.push(("network_id", network_id.clone()));
        }
        if let Some(device_id) = &self.device_id {
            params.push(("device_id", device_id.clone()));
        }
        if let Some(owner) = &self.device_owner {
            params.push(("device_owner", owner.to_string()));
        }
        params
    }

    pub fn matches(&self, port: &Port) -> bool {
        self.network_id.as_ref().map_or(true, |n| *n == port.network_id)
            && self.device_id.as_ref().map_or(true, |d| *d == port.device_id)
            && self
                .device_owner
                .as_ref()
                .map_or(true, |o| *o == port.device_owner)
    }
}

/// Filter for listing subnets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubnetQuery {
    pub network_id: Option<String>,
}

impl SubnetQuery {
    pub fn on_network(network_id: &str) -> Self {
        SubnetQuery {
            network_id: Some(network_id.to_string()),
        }
    }

    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        self.network_id
            .iter()
            .map(|n| ("network_id", n.clone()))
            .collect()
    }

    pub fn matches(&self, subnet: &Subnet) -> bool {
        self.network_id
            .as_ref()
            .map_or(true, |n| *n == subnet.network_id)
    }
}

/// Neutron operations the commands depend on.
#[async_trait]
pub trait NetworkClient: Send + Sync {
    async fn list_networks(&self, query: &NetworkQuery) -> ApiResult<Vec<Network>>;
    async fn get_network(&self, network_id: &str) -> ApiResult<Network>;
    async fn delete_network(&self, network_id: &str) -> ApiResult<()>;

    async fn list_subnets(&self, query: &SubnetQuery) -> ApiResult<Vec<Subnet>>;
    async fn get_subnet(&self, subnet_id: &str) -> ApiResult<Subnet>;
    async fn delete_subnet(&self, subnet_id: &str) -> ApiResult<()>;

    async fn list_ports(&self, query: &PortQuery) -> ApiResult<Vec<Port>>;

    async fn get_router(&self, router_id: &str) -> ApiResult<Router>;
    /// Detach the interface `port_id` from the router; Neutron deletes the port.
    async fn remove_router_interface(&self, router_id: &str, port_id: &str) -> ApiResult<()>;
    /// Clear the router's external gateway.
    async fn remove_router_gateway(&self, router_id: &str) -> ApiResult<()>;
    async fn delete_router(&self, router_id: &str) -> ApiResult<()>;
}

/// Blazar operations the commands depend on.
#[async_trait]
pub trait ReservationClient: Send + Sync {
    async fn list_floating_ips(&self) -> ApiResult<Vec<FloatingIpReservation>>;
}
