//! Public IP audit.
//!
//! Walks every address of the public network's allocation pools plus every
//! address Blazar has registered as reservable, and reports who holds it.

use crate::config::PUBLIC_NETWORK_NAME;
use crate::error::{OperatorError, Result};
use crate::models::{expand_range, AllocationPool, DeviceOwner, Network, Port, Router};
use crate::openstack::{NetworkClient, NetworkQuery, PortQuery, ReservationClient};
use crate::output::Progress;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocationType {
    Unallocated,
    FloatingIp,
    Gateway,
}

impl fmt::Display for AllocationType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            AllocationType::Unallocated => "unallocated",
            AllocationType::FloatingIp => "floating_ip",
            AllocationType::Gateway => "gateway",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PublicIpRow {
    pub public_ip: Ipv4Addr,
    pub allocation_type: AllocationType,
    /// Registered with Blazar, whatever its current allocation.
    pub reservable: bool,
    /// Holder's project, `none` when unallocated.
    pub project_id: String,
}

impl PublicIpRow {
    pub const HEADERS: [&'static str; 4] =
        ["public_ip", "allocation_type", "reservable", "project_id"];

    pub fn cells(&self) -> Vec<String> {
        vec![
            self.public_ip.to_string(),
            self.allocation_type.to_string(),
            if self.reservable { "True" } else { "False" }.to_string(),
            self.project_id.clone(),
        ]
    }
}

async fn public_network<C>(client: &C) -> Result<Network>
where
    C: NetworkClient + ?Sized,
{
    let network = client
        .list_networks(&NetworkQuery::by_name(PUBLIC_NETWORK_NAME))
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| OperatorError::NotFound("Could not find public network".to_string()))?;
    if network.subnets.is_empty() {
        return Err(OperatorError::NotFound(
            "No subnets defined on public network".to_string(),
        ));
    }
    Ok(network)
}

/// Allocation pools of every subnet on the public network, in subnet order.
pub async fn public_allocation_pools<C>(client: &C) -> Result<Vec<AllocationPool>>
where
    C: NetworkClient + ?Sized,
{
    let network = public_network(client).await?;
    let mut pools = Vec::new();
    for subnet_id in &network.subnets {
        let subnet = client.get_subnet(subnet_id).await?;
        log::debug!(
            "subnet {} has {} allocation pools",
            subnet.id,
            subnet.allocation_pools.len()
        );
        pools.extend(subnet.allocation_pools);
    }
    Ok(pools)
}

/// Every IPv4 address in `pools`. IPv6 pools are skipped.
pub fn pool_addresses(pools: &[AllocationPool]) -> Result<Vec<Ipv4Addr>> {
    let mut addresses = Vec::new();
    for pool in pools {
        match (pool.start, pool.end) {
            (IpAddr::V4(start), IpAddr::V4(end)) => {
                let expanded = expand_range(start, end).map_err(|e| {
                    OperatorError::InvalidData(format!("allocation pool {start}-{end}: {e}"))
                })?;
                addresses.extend(expanded);
            }
            (start, end) => log::warn!("Skipping non-IPv4 allocation pool {start}-{end}"),
        }
    }
    Ok(addresses)
}

/// Index floating IP and router gateway ports by their first fixed IP.
///
/// If two ports share an address the later one wins; this is logged since
/// Neutron should never hand out the same address twice.
pub fn index_public_ports(ports: Vec<Port>) -> HashMap<Ipv4Addr, Port> {
    let mut by_ip = HashMap::new();
    for port in ports.into_iter().filter(|p| p.device_owner.is_public()) {
        let Some(ip) = port.first_ip().and_then(|ip| ip.parse::<Ipv4Addr>().ok()) else {
            continue;
        };
        if let Some(previous) = by_ip.insert(ip, port) {
            log::warn!("Address {ip} is held by more than one port, ignoring {}", previous.id);
        }
    }
    by_ip
}

/// Classify every public and reservable address, ascending by address.
pub async fn audit_public_ips<N, R>(
    network: &N,
    reservations: &R,
    progress: &Progress,
) -> Result<Vec<PublicIpRow>>
where
    N: NetworkClient + ?Sized,
    R: ReservationClient + ?Sized,
{
    progress.step("Retrieving all public allocation pools");
    let pools = public_allocation_pools(network).await?;
    let pool_ips = pool_addresses(&pools)?;

    progress.step("Retrieving reservable floating IPs");
    let reservable: HashSet<Ipv4Addr> = reservations
        .list_floating_ips()
        .await?
        .into_iter()
        .map(|fip| fip.floating_ip_address)
        .collect();

    progress.step("Retrieving all active Neutron ports");
    let ports_by_ip = index_public_ports(network.list_ports(&PortQuery::default()).await?);

    let candidates: BTreeSet<Ipv4Addr> = pool_ips
        .into_iter()
        .chain(reservable.iter().copied())
        .collect();
    progress.step(&format!("Processing {} addresses", candidates.len()));

    let mut routers: HashMap<String, Router> = HashMap::new();
    let mut rows = Vec::with_capacity(candidates.len());

    for public_ip in candidates {
        let (allocation_type, project_id) = match ports_by_ip.get(&public_ip) {
            Some(port) if port.device_owner == DeviceOwner::RouterGateway => {
                if !routers.contains_key(&port.device_id) {
                    let router = network.get_router(&port.device_id).await?;
                    routers.insert(port.device_id.clone(), router);
                }
                let project_id = routers
                    .get(&port.device_id)
                    .map(|r| r.project_id.clone())
                    .unwrap_or_default();
                (AllocationType::Gateway, project_id)
            }
            Some(port) => (AllocationType::FloatingIp, port.project_id.clone()),
            None => (AllocationType::Unallocated, "none".to_string()),
        };

        rows.push(PublicIpRow {
            public_ip,
            allocation_type,
            reservable: reservable.contains(&public_ip),
            project_id,
        });
    }

    log::info!(
        "Audited {} addresses, {} routers looked up",
        rows.len(),
        routers.len()
    );
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FixedIp, FloatingIpReservation, Subnet};
    use crate::openstack::memory::{MemoryCloud, Snapshot};

    fn port(id: &str, owner: &str, device_id: &str, ip: &str, project_id: &str) -> Port {
        Port {
            id: id.to_string(),
            network_id: "public-net".to_string(),
            device_id: device_id.to_string(),
            device_owner: DeviceOwner::from(owner),
            fixed_ips: vec![FixedIp {
                subnet_id: "subnet-public".to_string(),
                ip_address: ip.to_string(),
            }],
            project_id: project_id.to_string(),
        }
    }

    fn public_snapshot(pools: &[(&str, &str)]) -> Snapshot {
        Snapshot {
            networks: vec![Network {
                id: "public-net".to_string(),
                name: "public".to_string(),
                subnets: vec!["subnet-public".to_string()],
                ..Default::default()
            }],
            subnets: vec![Subnet {
                id: "subnet-public".to_string(),
                network_id: "public-net".to_string(),
                allocation_pools: pools
                    .iter()
                    .map(|(start, end)| AllocationPool {
                        start: start.parse().unwrap(),
                        end: end.parse().unwrap(),
                    })
                    .collect(),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_reserved_address_outside_pool() {
        let mut snapshot = public_snapshot(&[("10.0.0.2", "10.0.0.4")]);
        snapshot.ports = vec![port("p-1", "network:floatingip", "fip-1", "10.0.0.3", "proj-x")];
        snapshot.floatingips = vec![FloatingIpReservation::new(Ipv4Addr::new(10, 0, 0, 5))];
        let cloud = MemoryCloud::new(snapshot);

        let rows = audit_public_ips(&cloud, &cloud, &Progress::quiet())
            .await
            .unwrap();
        let cells: Vec<Vec<String>> = rows.iter().map(PublicIpRow::cells).collect();
        assert_eq!(
            cells,
            vec![
                vec!["10.0.0.2", "unallocated", "False", "none"],
                vec!["10.0.0.3", "floating_ip", "False", "proj-x"],
                vec!["10.0.0.4", "unallocated", "False", "none"],
                vec!["10.0.0.5", "unallocated", "True", "none"],
            ]
        );
    }

    #[tokio::test]
    async fn test_gateway_project_from_router_lookup_cached() {
        let mut snapshot = public_snapshot(&[("192.0.2.1", "192.0.2.3")]);
        snapshot.ports = vec![
            port("gw-1", "network:router_gateway", "router-1", "192.0.2.1", ""),
            port("gw-2", "network:router_gateway", "router-1", "192.0.2.2", ""),
            port("dhcp", "network:dhcp", "dhcp-1", "192.0.2.3", "admin"),
        ];
        snapshot.routers = vec![Router {
            id: "router-1".to_string(),
            project_id: "proj-r".to_string(),
            ..Default::default()
        }];
        // reserved and inside the pool: listed once
        snapshot.floatingips = vec![FloatingIpReservation::new(Ipv4Addr::new(192, 0, 2, 2))];
        let cloud = MemoryCloud::new(snapshot);

        let rows = audit_public_ips(&cloud, &cloud, &Progress::quiet())
            .await
            .unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].allocation_type, AllocationType::Gateway);
        assert_eq!(rows[0].project_id, "proj-r");
        assert_eq!(rows[1].allocation_type, AllocationType::Gateway);
        assert!(rows[1].reservable);
        // DHCP ports do not count as public allocations
        assert_eq!(rows[2].allocation_type, AllocationType::Unallocated);
        assert_eq!(cloud.router_lookups(), 1);
    }

    #[tokio::test]
    async fn test_missing_public_network() {
        let cloud = MemoryCloud::new(Snapshot::default());
        let err = audit_public_ips(&cloud, &cloud, &Progress::quiet())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Not found: Could not find public network");
    }

    #[tokio::test]
    async fn test_public_network_without_subnets() {
        let mut snapshot = public_snapshot(&[]);
        snapshot.networks[0].subnets.clear();
        let cloud = MemoryCloud::new(snapshot);
        let err = audit_public_ips(&cloud, &cloud, &Progress::quiet())
            .await
            .unwrap_err();
        assert!(matches!(err, OperatorError::NotFound(_)));
    }

    #[test]
    fn test_pool_addresses_skips_ipv6_and_rejects_reversed() {
        let pools = vec![
            AllocationPool {
                start: "2001:db8::2".parse().unwrap(),
                end: "2001:db8::ff".parse().unwrap(),
            },
            AllocationPool {
                start: "10.0.0.9".parse().unwrap(),
                end: "10.0.0.10".parse().unwrap(),
            },
        ];
        assert_eq!(
            pool_addresses(&pools).unwrap(),
            vec![Ipv4Addr::new(10, 0, 0, 9), Ipv4Addr::new(10, 0, 0, 10)]
        );

        let reversed = vec![AllocationPool {
            start: "10.0.0.10".parse().unwrap(),
            end: "10.0.0.9".parse().unwrap(),
        }];
        assert!(matches!(
            pool_addresses(&reversed),
            Err(OperatorError::InvalidData(_))
        ));
    }

    #[test]
    fn test_index_public_ports_last_write_wins() {
        let ports = vec![
            port("first", "network:floatingip", "fip-1", "10.0.0.3", "proj-1"),
            port("second", "network:floatingip", "fip-2", "10.0.0.3", "proj-2"),
            port("vm", "compute:nova", "i-1", "10.0.0.4", "proj-3"),
        ];
        let index = index_public_ports(ports);
        assert_eq!(index.len(), 1);
        assert_eq!(index[&Ipv4Addr::new(10, 0, 0, 3)].id, "second");
    }
}
