//! Network teardown.
//!
//! Deletes a network together with its subnets and router interfaces, then
//! removes any router left with no interfaces. Nothing is rolled back if a
//! step fails half way: re-run the command or clean up by hand.

use crate::error::{ApiError, OperatorError, Result};
use crate::models::{DeviceOwner, Network, Port};
use crate::openstack::{NetworkClient, NetworkQuery, PortQuery, SubnetQuery};
use itertools::Itertools;
use reqwest::StatusCode;
use std::fmt;

/// Which network to tear down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TeardownTarget {
    /// VLAN segmentation ID; the first matching network is used.
    Segment(u32),
    Network(String),
}

impl TeardownTarget {
    /// Build the target from the two mutually exclusive selectors.
    pub fn from_selectors(segment: Option<u32>, network: Option<String>) -> Result<Self> {
        match (segment, network) {
            (Some(segment), None) => Ok(TeardownTarget::Segment(segment)),
            (None, Some(network)) => Ok(TeardownTarget::Network(network)),
            (Some(_), Some(_)) => Err(OperatorError::Input(
                "Specify only one of segment ID or network ID".to_string(),
            )),
            (None, None) => Err(OperatorError::Input(
                "Missing either segment ID or network ID".to_string(),
            )),
        }
    }
}

impl fmt::Display for TeardownTarget {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TeardownTarget::Segment(segment) => write!(f, "segment {segment}"),
            TeardownTarget::Network(id) => write!(f, "network {id}"),
        }
    }
}

/// What a successful teardown removed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeardownReport {
    pub network_id: String,
    pub detached_interfaces: Vec<String>,
    pub deleted_subnets: Vec<String>,
    pub deleted_routers: Vec<String>,
    /// Routers that still serve other networks.
    pub kept_routers: Vec<String>,
}

async fn resolve<C>(client: &C, target: &TeardownTarget) -> Result<Network>
where
    C: NetworkClient + ?Sized,
{
    match target {
        TeardownTarget::Segment(segment) => client
            .list_networks(&NetworkQuery::by_segment(*segment))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                OperatorError::NotFound(format!("Could not find network for segment {segment}"))
            }),
        TeardownTarget::Network(id) => client
            .get_network(id)
            .await
            .map_err(|e| network_lookup_error(id, e)),
    }
}

/// An absent network is `NotFound`, whether the backend says so directly or with a 404.
fn network_lookup_error(id: &str, e: ApiError) -> OperatorError {
    match e {
        ApiError::Missing { .. }
        | ApiError::Http {
            status: StatusCode::NOT_FOUND,
            ..
        } => OperatorError::NotFound(format!("Could not find network {id}")),
        e => OperatorError::Api(e),
    }
}

/// Tear down the network identified by `target`.
///
/// Fails with [`OperatorError::Conflict`] before touching anything if an
/// instance port is still attached.
pub async fn teardown<C>(client: &C, target: &TeardownTarget) -> Result<TeardownReport>
where
    C: NetworkClient + ?Sized,
{
    let network = resolve(client, target).await?;
    log::info!(
        "Tearing down network {} ({}) for {target}",
        network.id,
        network.name
    );

    let ports = client
        .list_ports(&PortQuery::on_network(&network.id))
        .await?;

    let instance_ports = ports.iter().filter(|p| p.device_owner.is_compute()).count();
    if instance_ports > 0 {
        return Err(OperatorError::Conflict(format!(
            "Network {} has running instances ({instance_ports} instance ports)",
            network.id
        )));
    }

    let (router_ports, _other_ports): (Vec<Port>, Vec<Port>) = ports
        .into_iter()
        .partition(|p| p.device_owner == DeviceOwner::RouterInterface);

    let mut report = TeardownReport {
        network_id: network.id.clone(),
        ..Default::default()
    };

    for port in &router_ports {
        log::info!("Deleting router interface {}", port.id);
        client
            .remove_router_interface(&port.device_id, &port.id)
            .await?;
        report.detached_interfaces.push(port.id.clone());
    }

    let subnets = client
        .list_subnets(&SubnetQuery::on_network(&network.id))
        .await?;
    for subnet in &subnets {
        log::info!("Deleting subnet {}", subnet.id);
        client.delete_subnet(&subnet.id).await?;
        report.deleted_subnets.push(subnet.id.clone());
    }

    log::info!("Deleting network {}", network.id);
    client.delete_network(&network.id).await?;

    // A router with several interfaces on this network is only checked once.
    let routers = router_ports.iter().map(|p| p.device_id.clone()).unique();
    for router_id in routers {
        let remaining = client
            .list_ports(&PortQuery::on_device(&router_id, DeviceOwner::RouterInterface))
            .await?;
        if remaining.is_empty() {
            log::info!("Removing router gateway {router_id}");
            client.remove_router_gateway(&router_id).await?;
            log::info!("Removing router {router_id}");
            client.delete_router(&router_id).await?;
            report.deleted_routers.push(router_id);
        } else {
            log::info!(
                "Keeping router {router_id}, {} interfaces remain",
                remaining.len()
            );
            report.kept_routers.push(router_id);
        }
    }

    log::info!(
        "Network {} removed: {} interfaces detached, {} subnets, {} routers deleted",
        report.network_id,
        report.detached_interfaces.len(),
        report.deleted_subnets.len(),
        report.deleted_routers.len()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openstack::memory::{MemoryCloud, Mutation};

    const TEST_SNAPSHOT: &str = "src/tests/test_data/snapshot_teardown.json";

    fn cloud() -> MemoryCloud {
        MemoryCloud::from_snapshot_file(TEST_SNAPSHOT).expect("Error reading snapshot")
    }

    #[test]
    fn test_target_selectors() {
        assert_eq!(
            TeardownTarget::from_selectors(Some(3001), None).unwrap(),
            TeardownTarget::Segment(3001)
        );
        assert_eq!(
            TeardownTarget::from_selectors(None, Some("net-a".to_string())).unwrap(),
            TeardownTarget::Network("net-a".to_string())
        );
        assert!(matches!(
            TeardownTarget::from_selectors(Some(3001), Some("net-a".to_string())),
            Err(OperatorError::Input(_))
        ));
        assert!(matches!(
            TeardownTarget::from_selectors(None, None),
            Err(OperatorError::Input(_))
        ));
    }

    #[tokio::test]
    async fn test_teardown_by_segment() {
        let cloud = cloud();
        let report = teardown(&cloud, &TeardownTarget::Segment(3001))
            .await
            .expect("teardown failed");

        assert_eq!(report.network_id, "net-a");
        assert_eq!(report.detached_interfaces, vec!["port-a-ri"]);
        assert_eq!(report.deleted_subnets, vec!["subnet-a"]);
        assert_eq!(report.deleted_routers, vec!["router-a"]);
        assert!(report.kept_routers.is_empty());

        assert_eq!(
            cloud.mutations(),
            vec![
                Mutation::RemoveRouterInterface {
                    router_id: "router-a".to_string(),
                    port_id: "port-a-ri".to_string(),
                },
                Mutation::DeleteSubnet("subnet-a".to_string()),
                Mutation::DeleteNetwork("net-a".to_string()),
                Mutation::RemoveRouterGateway("router-a".to_string()),
                Mutation::DeleteRouter("router-a".to_string()),
            ]
        );

        let after = cloud.snapshot();
        assert!(!after.networks.iter().any(|n| n.id == "net-a"));
        assert!(!after.subnets.iter().any(|s| s.network_id == "net-a"));
        assert!(!after.routers.iter().any(|r| r.id == "router-a"));
    }

    #[tokio::test]
    async fn test_teardown_unknown_segment() {
        let cloud = cloud();
        let err = teardown(&cloud, &TeardownTarget::Segment(9))
            .await
            .unwrap_err();
        assert!(matches!(err, OperatorError::NotFound(_)));
        assert!(cloud.mutations().is_empty());
    }

    #[tokio::test]
    async fn test_teardown_unknown_network() {
        let cloud = cloud();
        let err = teardown(&cloud, &TeardownTarget::Network("nope".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, OperatorError::NotFound(_)));
        assert_eq!(err.to_string(), "Not found: Could not find network nope");
        assert!(cloud.mutations().is_empty());
    }

    #[test]
    fn test_network_lookup_404_is_not_found() {
        let err = network_lookup_error(
            "nope",
            ApiError::Http {
                url: "https://uc:9696/v2.0/networks/nope".to_string(),
                status: StatusCode::NOT_FOUND,
                body: "{}".to_string(),
            },
        );
        assert!(matches!(err, OperatorError::NotFound(_)));

        let err = network_lookup_error(
            "net-a",
            ApiError::Http {
                url: "https://uc:9696/v2.0/networks/net-a".to_string(),
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: "{}".to_string(),
            },
        );
        assert!(matches!(err, OperatorError::Api(ApiError::Http { .. })));
    }

    #[tokio::test]
    async fn test_teardown_refuses_running_instances() {
        let cloud = cloud();
        let before = cloud.snapshot();
        let err = teardown(&cloud, &TeardownTarget::Network("net-busy".to_string()))
            .await
            .unwrap_err();

        assert!(matches!(err, OperatorError::Conflict(_)));
        assert!(cloud.mutations().is_empty());
        assert_eq!(cloud.snapshot(), before);
    }

    #[tokio::test]
    async fn test_shared_router_survives_until_last_network() {
        let cloud = cloud();

        let report = teardown(&cloud, &TeardownTarget::Segment(3002)).await.unwrap();
        assert_eq!(report.kept_routers, vec!["router-shared"]);
        assert!(report.deleted_routers.is_empty());
        let after = cloud.snapshot();
        assert!(after.routers.iter().any(|r| r.id == "router-shared"));
        assert!(after.ports.iter().any(|p| p.id == "port-c-ri"));

        let report = teardown(&cloud, &TeardownTarget::Segment(3003)).await.unwrap();
        assert_eq!(report.deleted_routers, vec!["router-shared"]);
        assert!(!cloud
            .snapshot()
            .routers
            .iter()
            .any(|r| r.id == "router-shared"));
    }

    #[tokio::test]
    async fn test_router_with_two_interfaces_on_one_network_deleted_once() {
        let cloud = cloud();
        let report = teardown(&cloud, &TeardownTarget::Network("net-dual".to_string()))
            .await
            .unwrap();

        assert_eq!(report.detached_interfaces.len(), 2);
        assert_eq!(report.deleted_subnets.len(), 2);
        assert_eq!(report.deleted_routers, vec!["router-dual"]);
    }
}
