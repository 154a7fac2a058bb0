//! Command line surface and dispatch.
//!
//! The command table is the closed set of clap subcommands below. Parsed
//! arguments become an [`Action`] (validated without touching the cloud),
//! the [`Clients`] it needs are built, then [`run`] executes it.

use crate::config::CloudConfig;
use crate::error::{OperatorError, Result};
use crate::logging::DEFAULT_LOG_CONFIG;
use crate::openstack::auth::authenticate;
use crate::openstack::{
    BlazarClient, MemoryCloud, NetworkClient, NeutronClient, ReservationClient,
};
use crate::output::{render_columns, render_table, Progress};
use crate::processing::{
    audit_public_ips, list_segments, teardown, PublicIpRow, SegmentRow, TeardownTarget,
};
use clap::{Parser, Subcommand};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "chi-network-ops", version, about = "Operator tools for OpenStack networking")]
pub struct Cli {
    /// Use a JSON snapshot instead of the live cloud; changes stay in memory
    #[arg(long, global = true, env = "CHI_SNAPSHOT")]
    pub snapshot: Option<String>,

    /// log4rs configuration file
    #[arg(long, global = true, default_value = DEFAULT_LOG_CONFIG)]
    pub log_config: String,

    /// Debug logging when no log4rs configuration file is found
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Neutron network management
    #[command(subcommand)]
    Network(NetworkCommand),
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum NetworkCommand {
    /// Tear down a network, including routers and ports
    Delete {
        /// Network segment (VLAN) ID
        #[arg(long)]
        segment: Option<u32>,
        /// Network ID
        #[arg(long)]
        network: Option<String>,
    },
    /// Display the Neutron networks assigned to each VLAN, with name and owning project
    Segments,
    /// Check the allocation status of every address in the 'public' network's pools
    Ips,
}

/// A validated command, ready to run.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Teardown(TeardownTarget),
    Segments,
    PublicIps,
}

impl Action {
    pub fn from_command(command: &Command) -> Result<Action> {
        match command {
            Command::Network(NetworkCommand::Delete { segment, network }) => Ok(
                Action::Teardown(TeardownTarget::from_selectors(*segment, network.clone())?),
            ),
            Command::Network(NetworkCommand::Segments) => Ok(Action::Segments),
            Command::Network(NetworkCommand::Ips) => Ok(Action::PublicIps),
        }
    }

    /// Only the IP audit talks to Blazar.
    pub fn needs_reservations(&self) -> bool {
        matches!(self, Action::PublicIps)
    }
}

/// API clients for one run.
#[derive(Clone)]
pub struct Clients {
    pub network: Arc<dyn NetworkClient>,
    pub reservation: Option<Arc<dyn ReservationClient>>,
}

impl Clients {
    /// Both roles served by one in-memory backend.
    pub fn memory(cloud: MemoryCloud) -> Self {
        let cloud = Arc::new(cloud);
        let reservation: Arc<dyn ReservationClient> = cloud.clone();
        Clients {
            network: cloud,
            reservation: Some(reservation),
        }
    }

    /// Authenticate and build the live clients `action` needs.
    pub async fn connect(config: &CloudConfig, action: &Action) -> Result<Self> {
        let session = authenticate(config).await?;
        let network: Arc<dyn NetworkClient> = Arc::new(NeutronClient::new(&session)?);
        let reservation = if action.needs_reservations() {
            let blazar: Arc<dyn ReservationClient> = Arc::new(BlazarClient::new(&session)?);
            Some(blazar)
        } else {
            None
        };
        Ok(Clients {
            network,
            reservation,
        })
    }
}

/// Run `action`, returning the report text for stdout (empty for teardown).
pub async fn run(action: &Action, clients: &Clients, progress: &Progress) -> Result<String> {
    match action {
        Action::Teardown(target) => {
            teardown(clients.network.as_ref(), target).await?;
            Ok(String::new())
        }
        Action::Segments => {
            let rows = list_segments(clients.network.as_ref()).await?;
            let cells: Vec<Vec<String>> = rows.iter().map(SegmentRow::cells).collect();
            Ok(render_columns(&SegmentRow::HEADERS, &cells))
        }
        Action::PublicIps => {
            let reservation = clients.reservation.as_ref().ok_or_else(|| {
                OperatorError::Config("reservation client not configured".to_string())
            })?;
            let rows =
                audit_public_ips(clients.network.as_ref(), reservation.as_ref(), progress).await?;
            let cells: Vec<Vec<String>> = rows.iter().map(PublicIpRow::cells).collect();
            Ok(render_table(&PublicIpRow::HEADERS, &cells))
        }
    }
}

/// Validate, connect and run the parsed command line.
pub async fn execute(cli: &Cli) -> Result<String> {
    let action = Action::from_command(&cli.command)?;
    log::debug!("action={action:?}");

    let clients = match &cli.snapshot {
        Some(file) => {
            log::warn!("Using snapshot {file}, changes are not sent to the cloud");
            Clients::memory(MemoryCloud::from_snapshot_file(file)?)
        }
        None => Clients::connect(&CloudConfig::from_env()?, &action).await?,
    };

    run(&action, &clients, &Progress::stderr()).await
}
