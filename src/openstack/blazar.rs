//! Blazar (reservation) REST client.

use super::auth::{Session, RESERVATION_SERVICE};
use super::{ApiResult, ReservationClient, ResourceKind, RestClient};
use crate::models::FloatingIpReservation;
use async_trait::async_trait;

#[derive(Debug, Clone)]
pub struct BlazarClient {
    rest: RestClient,
}

impl BlazarClient {
    /// Build a client against the session's `reservation` endpoint. The
    /// catalog URL already carries the `/v1` prefix.
    pub fn new(session: &Session) -> ApiResult<Self> {
        let endpoint = session.endpoint(RESERVATION_SERVICE)?;
        log::debug!("Blazar endpoint {endpoint}");
        Ok(BlazarClient {
            rest: RestClient::new(session.http.clone(), &endpoint, &session.token),
        })
    }
}

#[async_trait]
impl ReservationClient for BlazarClient {
    async fn list_floating_ips(&self) -> ApiResult<Vec<FloatingIpReservation>> {
        self.rest.list(ResourceKind::FloatingIps, &[]).await
    }
}
