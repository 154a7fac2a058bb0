//! Neutron router data model.

use serde::{Deserialize, Serialize};

/// A Neutron router as returned by `GET /v2.0/routers/{id}`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Router {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "tenant_id")]
    pub project_id: String,
    /// Uplink to the external network; `None` once the gateway is cleared.
    #[serde(default)]
    pub external_gateway_info: Option<serde_json::Value>,
}
