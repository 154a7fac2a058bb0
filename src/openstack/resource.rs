//! The closed set of collections the clients read and write.

use std::fmt;

/// API collection, mapping to its URL path and JSON envelope keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Networks,
    Subnets,
    Ports,
    Routers,
    /// Blazar `floatingips`.
    FloatingIps,
}

impl ResourceKind {
    /// Collection path segment, also the key of the list response envelope.
    pub fn collection(self) -> &'static str {
        match self {
            ResourceKind::Networks => "networks",
            ResourceKind::Subnets => "subnets",
            ResourceKind::Ports => "ports",
            ResourceKind::Routers => "routers",
            ResourceKind::FloatingIps => "floatingips",
        }
    }

    /// Key of the single-resource response envelope.
    pub fn member(self) -> &'static str {
        match self {
            ResourceKind::Networks => "network",
            ResourceKind::Subnets => "subnet",
            ResourceKind::Ports => "port",
            ResourceKind::Routers => "router",
            ResourceKind::FloatingIps => "floatingip",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.member())
    }
}
