//! Operator commands.
//!
//! - [`teardown`] - delete a network with its subnets and orphaned routers
//! - [`segments`] - VLAN segment report
//! - [`public_ips`] - public IP allocation audit

pub mod public_ips;
pub mod segments;
pub mod teardown;

pub use public_ips::{audit_public_ips, AllocationType, PublicIpRow};
pub use segments::{list_segments, SegmentRow};
pub use teardown::{teardown, TeardownReport, TeardownTarget};
