//! Blazar floating IP data model.

use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

/// A floating IP registered with Blazar, as returned by `GET /v1/floatingips`.
///
/// Only the address is kept. Registration is what makes an address
/// reservable in the audit; Blazar's own `reservable` flag (free to lease
/// right now) is not read.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FloatingIpReservation {
    pub floating_ip_address: Ipv4Addr,
}

impl FloatingIpReservation {
    pub fn new(floating_ip_address: Ipv4Addr) -> Self {
        FloatingIpReservation {
            floating_ip_address,
        }
    }
}
