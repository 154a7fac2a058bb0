//! In-memory cloud backend.
//!
//! Holds a [`Snapshot`] of Neutron and Blazar state and applies mutations to
//! it the way Neutron would, including its in-use conflicts. Used for offline
//! runs against a JSON snapshot (`--snapshot`) and by the tests.

use super::{
    ApiResult, NetworkClient, NetworkQuery, PortQuery, ReservationClient, ResourceKind,
    SubnetQuery,
};
use crate::error::{ApiError, OperatorError};
use crate::models::{DeviceOwner, FloatingIpReservation, Network, Port, Router, Subnet};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

const DHCP_OWNER: &str = "network:dhcp";

/// Point-in-time copy of the resources the commands read.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    #[serde(default)]
    pub networks: Vec<Network>,
    #[serde(default)]
    pub subnets: Vec<Subnet>,
    #[serde(default)]
    pub ports: Vec<Port>,
    #[serde(default)]
    pub routers: Vec<Router>,
    #[serde(default)]
    pub floatingips: Vec<FloatingIpReservation>,
}

/// A state change applied to the backend, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    RemoveRouterInterface { router_id: String, port_id: String },
    RemoveRouterGateway(String),
    DeleteSubnet(String),
    DeleteNetwork(String),
    DeleteRouter(String),
}

#[derive(Debug, Default)]
struct State {
    snapshot: Snapshot,
    mutations: Vec<Mutation>,
    router_lookups: usize,
}

#[derive(Debug, Default)]
pub struct MemoryCloud {
    state: Mutex<State>,
}

impl MemoryCloud {
    pub fn new(snapshot: Snapshot) -> Self {
        MemoryCloud {
            state: Mutex::new(State {
                snapshot,
                ..Default::default()
            }),
        }
    }

    /// Load a snapshot file written as `{"networks": [...], "ports": [...], ...}`.
    pub fn from_snapshot_file(file: &str) -> Result<Self, OperatorError> {
        if !Path::new(file).exists() {
            return Err(OperatorError::Config(format!(
                "Snapshot file does not exist: {file}"
            )));
        }
        log::info!("Reading from snapshot file: {file}");
        let json = std::fs::read_to_string(file)
            .map_err(|e| OperatorError::Config(format!("Error reading snapshot {file}: {e}")))?;
        let snapshot: Snapshot = super::rest::decode(file, &json)?;
        log::info!(
            "Snapshot has {} networks, {} subnets, {} ports, {} routers, {} floating IPs",
            snapshot.networks.len(),
            snapshot.subnets.len(),
            snapshot.ports.len(),
            snapshot.routers.len(),
            snapshot.floatingips.len()
        );
        Ok(Self::new(snapshot))
    }

    /// Current state, with every mutation so far applied.
    pub fn snapshot(&self) -> Snapshot {
        self.lock().snapshot.clone()
    }

    pub fn mutations(&self) -> Vec<Mutation> {
        self.lock().mutations.clone()
    }

    /// Number of `get_router` calls served.
    pub fn router_lookups(&self) -> usize {
        self.lock().router_lookups
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn missing(kind: ResourceKind, id: &str) -> ApiError {
    ApiError::Missing {
        kind: kind.member(),
        id: id.to_string(),
    }
}

fn in_use(kind: ResourceKind, id: &str, message: String) -> ApiError {
    ApiError::Http {
        url: format!("memory://{}/{}", kind.collection(), id),
        status: StatusCode::CONFLICT,
        body: message,
    }
}

fn is_dhcp(port: &Port) -> bool {
    port.device_owner.as_str() == DHCP_OWNER
}

#[async_trait]
impl NetworkClient for MemoryCloud {
    async fn list_networks(&self, query: &NetworkQuery) -> ApiResult<Vec<Network>> {
        let state = self.lock();
        Ok(state
            .snapshot
            .networks
            .iter()
            .filter(|n| query.matches(n))
            .cloned()
            .collect())
    }

    async fn get_network(&self, network_id: &str) -> ApiResult<Network> {
        let state = self.lock();
        state
            .snapshot
            .networks
            .iter()
            .find(|n| n.id == network_id)
            .cloned()
            .ok_or_else(|| missing(ResourceKind::Networks, network_id))
    }

    async fn delete_network(&self, network_id: &str) -> ApiResult<()> {
        let mut state = self.lock();
        let snapshot = &mut state.snapshot;
        if !snapshot.networks.iter().any(|n| n.id == network_id) {
            return Err(missing(ResourceKind::Networks, network_id));
        }
        let busy = snapshot
            .ports
            .iter()
            .filter(|p| p.network_id == network_id && !is_dhcp(p))
            .count();
        if busy > 0 {
            return Err(in_use(
                ResourceKind::Networks,
                network_id,
                format!("Unable to complete operation on network {network_id}. There are {busy} ports in use."),
            ));
        }

        snapshot.ports.retain(|p| p.network_id != network_id);
        snapshot.subnets.retain(|s| s.network_id != network_id);
        snapshot.networks.retain(|n| n.id != network_id);
        state
            .mutations
            .push(Mutation::DeleteNetwork(network_id.to_string()));
        Ok(())
    }

    async fn list_subnets(&self, query: &SubnetQuery) -> ApiResult<Vec<Subnet>> {
        let state = self.lock();
        Ok(state
            .snapshot
            .subnets
            .iter()
            .filter(|s| query.matches(s))
            .cloned()
            .collect())
    }

    async fn get_subnet(&self, subnet_id: &str) -> ApiResult<Subnet> {
        let state = self.lock();
        state
            .snapshot
            .subnets
            .iter()
            .find(|s| s.id == subnet_id)
            .cloned()
            .ok_or_else(|| missing(ResourceKind::Subnets, subnet_id))
    }

    async fn delete_subnet(&self, subnet_id: &str) -> ApiResult<()> {
        let mut state = self.lock();
        let snapshot = &mut state.snapshot;
        if !snapshot.subnets.iter().any(|s| s.id == subnet_id) {
            return Err(missing(ResourceKind::Subnets, subnet_id));
        }
        let on_subnet = |p: &Port| p.fixed_ips.iter().any(|ip| ip.subnet_id == subnet_id);
        if snapshot.ports.iter().any(|p| on_subnet(p) && !is_dhcp(p)) {
            return Err(in_use(
                ResourceKind::Subnets,
                subnet_id,
                format!("Unable to complete operation on subnet {subnet_id}: One or more ports have an IP allocation from this subnet."),
            ));
        }

        for port in snapshot.ports.iter_mut() {
            port.fixed_ips.retain(|ip| ip.subnet_id != subnet_id);
        }
        snapshot.subnets.retain(|s| s.id != subnet_id);
        for network in snapshot.networks.iter_mut() {
            network.subnets.retain(|s| s != subnet_id);
        }
        state
            .mutations
            .push(Mutation::DeleteSubnet(subnet_id.to_string()));
        Ok(())
    }

    async fn list_ports(&self, query: &PortQuery) -> ApiResult<Vec<Port>> {
        let state = self.lock();
        Ok(state
            .snapshot
            .ports
            .iter()
            .filter(|p| query.matches(p))
            .cloned()
            .collect())
    }

    async fn get_router(&self, router_id: &str) -> ApiResult<Router> {
        let mut state = self.lock();
        state.router_lookups += 1;
        state
            .snapshot
            .routers
            .iter()
            .find(|r| r.id == router_id)
            .cloned()
            .ok_or_else(|| missing(ResourceKind::Routers, router_id))
    }

    async fn remove_router_interface(&self, router_id: &str, port_id: &str) -> ApiResult<()> {
        let mut state = self.lock();
        let snapshot = &mut state.snapshot;
        if !snapshot.routers.iter().any(|r| r.id == router_id) {
            return Err(missing(ResourceKind::Routers, router_id));
        }
        let position = snapshot
            .ports
            .iter()
            .position(|p| {
                p.id == port_id
                    && p.device_id == router_id
                    && p.device_owner == DeviceOwner::RouterInterface
            })
            .ok_or_else(|| missing(ResourceKind::Ports, port_id))?;
        snapshot.ports.remove(position);
        state.mutations.push(Mutation::RemoveRouterInterface {
            router_id: router_id.to_string(),
            port_id: port_id.to_string(),
        });
        Ok(())
    }

    async fn remove_router_gateway(&self, router_id: &str) -> ApiResult<()> {
        let mut state = self.lock();
        let snapshot = &mut state.snapshot;
        let router = snapshot
            .routers
            .iter_mut()
            .find(|r| r.id == router_id)
            .ok_or_else(|| missing(ResourceKind::Routers, router_id))?;
        router.external_gateway_info = None;
        snapshot
            .ports
            .retain(|p| !(p.device_id == router_id && p.device_owner == DeviceOwner::RouterGateway));
        state
            .mutations
            .push(Mutation::RemoveRouterGateway(router_id.to_string()));
        Ok(())
    }

    async fn delete_router(&self, router_id: &str) -> ApiResult<()> {
        let mut state = self.lock();
        let snapshot = &mut state.snapshot;
        if !snapshot.routers.iter().any(|r| r.id == router_id) {
            return Err(missing(ResourceKind::Routers, router_id));
        }
        if snapshot
            .ports
            .iter()
            .any(|p| p.device_id == router_id && p.device_owner == DeviceOwner::RouterInterface)
        {
            return Err(in_use(
                ResourceKind::Routers,
                router_id,
                format!("Router {router_id} still has ports"),
            ));
        }
        snapshot.ports.retain(|p| p.device_id != router_id);
        snapshot.routers.retain(|r| r.id != router_id);
        state
            .mutations
            .push(Mutation::DeleteRouter(router_id.to_string()));
        Ok(())
    }
}

#[async_trait]
impl ReservationClient for MemoryCloud {
    async fn list_floating_ips(&self) -> ApiResult<Vec<FloatingIpReservation>> {
        Ok(self.lock().snapshot.floatingips.clone())
    }
}
