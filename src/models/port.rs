//! Neutron port data model.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What kind of entity consumes a port, parsed from Neutron's `device_owner`.
///
/// Nova reports instance ports as `compute:<availability zone>`, so every
/// `compute:` prefix classifies as [`DeviceOwner::ComputeInstance`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(from = "String", into = "String")]
pub enum DeviceOwner {
    ComputeInstance(String),
    RouterInterface,
    RouterGateway,
    FloatingIp,
    Other(String),
}

impl DeviceOwner {
    pub const ROUTER_INTERFACE: &'static str = "network:router_interface";
    pub const ROUTER_GATEWAY: &'static str = "network:router_gateway";
    pub const FLOATING_IP: &'static str = "network:floatingip";
    pub const COMPUTE_PREFIX: &'static str = "compute:";

    /// The `device_owner` string as Neutron spells it.
    pub fn as_str(&self) -> &str {
        match self {
            DeviceOwner::ComputeInstance(owner) | DeviceOwner::Other(owner) => owner,
            DeviceOwner::RouterInterface => Self::ROUTER_INTERFACE,
            DeviceOwner::RouterGateway => Self::ROUTER_GATEWAY,
            DeviceOwner::FloatingIp => Self::FLOATING_IP,
        }
    }

    pub fn is_compute(&self) -> bool {
        matches!(self, DeviceOwner::ComputeInstance(_))
    }

    /// Ports that hold an address on the public network.
    pub fn is_public(&self) -> bool {
        matches!(self, DeviceOwner::FloatingIp | DeviceOwner::RouterGateway)
    }
}

impl From<String> for DeviceOwner {
    fn from(owner: String) -> Self {
        let known = match owner.as_str() {
            Self::ROUTER_INTERFACE => Some(DeviceOwner::RouterInterface),
            Self::ROUTER_GATEWAY => Some(DeviceOwner::RouterGateway),
            Self::FLOATING_IP => Some(DeviceOwner::FloatingIp),
            _ => None,
        };
        match known {
            Some(known) => known,
            None if owner.starts_with(Self::COMPUTE_PREFIX) => DeviceOwner::ComputeInstance(owner),
            None => DeviceOwner::Other(owner),
        }
    }
}

impl From<&str> for DeviceOwner {
    fn from(owner: &str) -> Self {
        DeviceOwner::from(owner.to_string())
    }
}

impl From<DeviceOwner> for String {
    fn from(owner: DeviceOwner) -> Self {
        owner.as_str().to_string()
    }
}

impl Default for DeviceOwner {
    fn default() -> Self {
        DeviceOwner::Other(String::new())
    }
}

impl fmt::Display for DeviceOwner {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a port's `fixed_ips`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct FixedIp {
    #[serde(default)]
    pub subnet_id: String,
    pub ip_address: String,
}

/// A Neutron port.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Port {
    pub id: String,
    #[serde(default)]
    pub network_id: String,
    /// ID of the instance, router or floating IP that owns the port.
    #[serde(default)]
    pub device_id: String,
    #[serde(default)]
    pub device_owner: DeviceOwner,
    #[serde(default)]
    pub fixed_ips: Vec<FixedIp>,
    #[serde(default, alias = "tenant_id")]
    pub project_id: String,
}

impl Port {
    /// First fixed IP address, which is the one lookups are keyed on.
    pub fn first_ip(&self) -> Option<&str> {
        self.fixed_ips.first().map(|ip| ip.ip_address.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_owner_classification() {
        assert!(DeviceOwner::from("compute:nova").is_compute());
        assert!(DeviceOwner::from("compute:az-2").is_compute());
        assert_eq!(
            DeviceOwner::from("network:router_interface"),
            DeviceOwner::RouterInterface
        );
        assert_eq!(
            DeviceOwner::from("network:router_gateway"),
            DeviceOwner::RouterGateway
        );
        assert_eq!(DeviceOwner::from("network:floatingip"), DeviceOwner::FloatingIp);
        assert_eq!(
            DeviceOwner::from("network:dhcp"),
            DeviceOwner::Other("network:dhcp".to_string())
        );
        assert!(!DeviceOwner::from("network:dhcp").is_public());
        assert!(DeviceOwner::RouterGateway.is_public());
    }

    #[test]
    fn test_device_owner_round_trips_neutron_spelling() {
        for owner in ["compute:nova", "network:router_interface", "network:dhcp", ""] {
            assert_eq!(DeviceOwner::from(owner).as_str(), owner);
        }
    }

    #[test]
    fn test_port_from_json() {
        let json = r#"{
            "id": "port-1",
            "network_id": "net-1",
            "device_id": "router-1",
            "device_owner": "network:router_gateway",
            "fixed_ips": [
                {"subnet_id": "sub-1", "ip_address": "192.0.2.5"},
                {"subnet_id": "sub-6", "ip_address": "2001:db8::5"}
            ],
            "tenant_id": "proj-a"
        }"#;
        let port: Port = serde_json::from_str(json).unwrap();
        assert_eq!(port.device_owner, DeviceOwner::RouterGateway);
        assert_eq!(port.first_ip(), Some("192.0.2.5"));
        assert_eq!(port.project_id, "proj-a");
    }

    #[test]
    fn test_port_without_fixed_ips() {
        let port: Port = serde_json::from_str(r#"{"id": "port-2", "device_owner": ""}"#).unwrap();
        assert_eq!(port.first_ip(), None);
        assert_eq!(port.device_owner, DeviceOwner::default());
    }
}
