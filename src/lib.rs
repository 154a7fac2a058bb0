//! Operator commands for an OpenStack cloud's Neutron networking, with
//! Blazar reservations taken into account.
//!
//! - `network delete` - tear down a network and its routers ([`processing::teardown`])
//! - `network segments` - VLAN segment report ([`processing::list_segments`])
//! - `network ips` - public IP allocation audit ([`processing::audit_public_ips`])

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod openstack;
pub mod output;
pub mod processing;

pub use error::{ApiError, OperatorError, Result};
