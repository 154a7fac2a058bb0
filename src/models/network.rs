//! Neutron network data model.

use serde::{Deserialize, Serialize};

/// A Neutron network as returned by `GET /v2.0/networks`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Network {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Owning project. Older deployments only report `tenant_id`.
    #[serde(default, alias = "tenant_id")]
    pub project_id: String,
    /// IDs of the subnets on this network.
    #[serde(default)]
    pub subnets: Vec<String>,
    /// VLAN tag, absent for flat and tunnelled networks.
    #[serde(rename = "provider:segmentation_id", default)]
    pub segmentation_id: Option<u32>,
    #[serde(rename = "provider:physical_network", default)]
    pub physical_network: Option<String>,
}
