//! VLAN segment report.

use crate::error::Result;
use crate::models::Network;
use crate::openstack::{NetworkClient, NetworkQuery};

/// One network and the VLAN it occupies.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentRow {
    pub physical_network: Option<String>,
    pub segmentation_id: Option<u32>,
    pub name: String,
    pub project_id: String,
}

impl SegmentRow {
    pub const HEADERS: [&'static str; 4] =
        ["physical_network", "segmentation_id", "name", "project_id"];

    /// Display cells, `None` for unset provider attributes.
    pub fn cells(&self) -> Vec<String> {
        vec![
            self.physical_network
                .clone()
                .unwrap_or_else(|| "None".to_string()),
            self.segmentation_id
                .map_or_else(|| "None".to_string(), |s| s.to_string()),
            self.name.clone(),
            self.project_id.clone(),
        ]
    }
}

impl From<Network> for SegmentRow {
    fn from(network: Network) -> Self {
        SegmentRow {
            physical_network: network.physical_network,
            segmentation_id: network.segmentation_id,
            name: network.name,
            project_id: network.project_id,
        }
    }
}

/// Sort key: networks without a VLAN tag count as -1 and come first.
pub fn segment_sort_key(network: &Network) -> i64 {
    network.segmentation_id.map_or(-1, i64::from)
}

/// Every network with its segment, ascending by segmentation ID.
pub async fn list_segments<C>(client: &C) -> Result<Vec<SegmentRow>>
where
    C: NetworkClient + ?Sized,
{
    let mut networks = client.list_networks(&NetworkQuery::default()).await?;
    log::info!("Got {} networks", networks.len());
    // stable, so ties keep API order
    networks.sort_by_key(segment_sort_key);
    Ok(networks.into_iter().map(SegmentRow::from).collect())
}
