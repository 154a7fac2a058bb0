//! Neutron (networking) REST client.

use super::auth::{Session, NETWORK_SERVICE};
use super::{
    ApiResult, NetworkClient, NetworkQuery, PortQuery, ResourceKind, RestClient, SubnetQuery,
};
use crate::models::{Network, Port, Router, Subnet};
use async_trait::async_trait;
use serde_json::json;

pub const API_VERSION_PATH: &str = "v2.0";

#[derive(Debug, Clone)]
pub struct NeutronClient {
    rest: RestClient,
}

impl NeutronClient {
    /// Build a client against the session's `network` endpoint.
    pub fn new(session: &Session) -> ApiResult<Self> {
        let endpoint = session.endpoint(NETWORK_SERVICE)?;
        Ok(Self::with_endpoint(session.http.clone(), &endpoint, &session.token))
    }

    /// Build a client against an explicit endpoint. The `/v2.0` suffix is
    /// added when the catalog URL lacks it.
    pub fn with_endpoint(http: reqwest::Client, endpoint: &str, token: &str) -> Self {
        let endpoint = endpoint.trim_end_matches('/');
        let base = if endpoint.ends_with(API_VERSION_PATH) {
            endpoint.to_string()
        } else {
            format!("{endpoint}/{API_VERSION_PATH}")
        };
        log::debug!("Neutron endpoint {base}");
        NeutronClient {
            rest: RestClient::new(http, &base, token),
        }
    }

    pub fn base_url(&self) -> &str {
        self.rest.base_url()
    }

    fn member_path(kind: ResourceKind, id: &str) -> String {
        format!("{}/{}", kind.collection(), id)
    }
}

#[async_trait]
impl NetworkClient for NeutronClient {
    async fn list_networks(&self, query: &NetworkQuery) -> ApiResult<Vec<Network>> {
        self.rest
            .list(ResourceKind::Networks, &query.to_params())
            .await
    }

    async fn get_network(&self, network_id: &str) -> ApiResult<Network> {
        self.rest.show(ResourceKind::Networks, network_id).await
    }

    async fn delete_network(&self, network_id: &str) -> ApiResult<()> {
        self.rest
            .delete(&Self::member_path(ResourceKind::Networks, network_id))
            .await
    }

    async fn list_subnets(&self, query: &SubnetQuery) -> ApiResult<Vec<Subnet>> {
        self.rest
            .list(ResourceKind::Subnets, &query.to_params())
            .await
    }

    async fn get_subnet(&self, subnet_id: &str) -> ApiResult<Subnet> {
        self.rest.show(ResourceKind::Subnets, subnet_id).await
    }

    async fn delete_subnet(&self, subnet_id: &str) -> ApiResult<()> {
        self.rest
            .delete(&Self::member_path(ResourceKind::Subnets, subnet_id))
            .await
    }

    async fn list_ports(&self, query: &PortQuery) -> ApiResult<Vec<Port>> {
        self.rest.list(ResourceKind::Ports, &query.to_params()).await
    }

    async fn get_router(&self, router_id: &str) -> ApiResult<Router> {
        self.rest.show(ResourceKind::Routers, router_id).await
    }

    async fn remove_router_interface(&self, router_id: &str, port_id: &str) -> ApiResult<()> {
        let path = format!(
            "{}/remove_router_interface",
            Self::member_path(ResourceKind::Routers, router_id)
        );
        self.rest.put(&path, &json!({ "port_id": port_id })).await
    }

    async fn remove_router_gateway(&self, router_id: &str) -> ApiResult<()> {
        self.rest
            .put(
                &Self::member_path(ResourceKind::Routers, router_id),
                &json!({ "router": { "external_gateway_info": {} } }),
            )
            .await
    }

    async fn delete_router(&self, router_id: &str) -> ApiResult<()> {
        self.rest
            .delete(&Self::member_path(ResourceKind::Routers, router_id))
            .await
    }
}
