//! Cloud configuration, read from the standard `OS_*` environment variables.
//!
//! `main` loads an optional `.env` file with dotenv before this runs, so an
//! openrc can be dropped next to the binary.

use crate::error::{OperatorError, Result};
use std::time::Duration;

/// Name of the Neutron network holding the public address space.
pub const PUBLIC_NETWORK_NAME: &str = "public";

/// Default HTTP timeout for a single API request.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// How the client authenticates against Keystone.
#[derive(Debug, Clone, PartialEq)]
pub enum Credentials {
    Password {
        username: String,
        password: String,
        user_domain_name: String,
        project: ProjectScope,
    },
    ApplicationCredential { id: String, secret: String },
}

/// Project the password token is scoped to.
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectScope {
    Id(String),
    Name { name: String, domain_name: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CloudConfig {
    /// Keystone v3 endpoint, e.g. `https://kvm.tacc.chameleoncloud.org:5000/v3`.
    pub auth_url: String,
    pub credentials: Credentials,
    /// Catalog region; the first endpoint of the right interface wins when unset.
    pub region_name: Option<String>,
    /// Catalog interface (`public`, `internal` or `admin`).
    pub interface: String,
    pub timeout: Duration,
}

impl CloudConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<CloudConfig> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through `lookup`, treating empty values as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<CloudConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| {
            get(key).ok_or_else(|| OperatorError::Config(format!("{key} is not set")))
        };

        let auth_url = require("OS_AUTH_URL")?
            .trim_end_matches('/')
            .to_string();

        let credentials = match get("OS_APPLICATION_CREDENTIAL_ID") {
            Some(id) => Credentials::ApplicationCredential {
                id,
                secret: require("OS_APPLICATION_CREDENTIAL_SECRET")?,
            },
            None => {
                let project = match get("OS_PROJECT_ID") {
                    Some(id) => ProjectScope::Id(id),
                    None => ProjectScope::Name {
                        name: get("OS_PROJECT_NAME")
                            .or_else(|| get("OS_TENANT_NAME"))
                            .ok_or_else(|| {
                                OperatorError::Config(
                                    "OS_PROJECT_NAME or OS_PROJECT_ID is not set".to_string(),
                                )
                            })?,
                        domain_name: get("OS_PROJECT_DOMAIN_NAME")
                            .unwrap_or_else(|| "Default".to_string()),
                    },
                };
                Credentials::Password {
                    username: require("OS_USERNAME")?,
                    password: require("OS_PASSWORD")?,
                    user_domain_name: get("OS_USER_DOMAIN_NAME")
                        .unwrap_or_else(|| "Default".to_string()),
                    project,
                }
            }
        };

        let timeout_secs = match get("CHI_HTTP_TIMEOUT_SECS") {
            Some(v) => v.trim().parse::<u64>().map_err(|e| {
                OperatorError::Config(format!("CHI_HTTP_TIMEOUT_SECS={v} is not a number: {e}"))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(CloudConfig {
            auth_url,
            credentials,
            region_name: get("OS_REGION_NAME"),
            interface: get("OS_INTERFACE").unwrap_or_else(|| "public".to_string()),
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}
