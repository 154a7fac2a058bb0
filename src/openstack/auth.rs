//! Keystone v3 authentication and service catalog lookup.

use super::ApiResult;
use crate::config::{CloudConfig, Credentials, ProjectScope};
use crate::error::ApiError;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const SUBJECT_TOKEN_HEADER: &str = "X-Subject-Token";

/// Service type of Neutron in the catalog.
/// Keystone API version path of `OS_AUTH_URL`.
pub const KEYSTONE_VERSION_PATH: &str = "v3";

pub const NETWORK_SERVICE: &str = "network";
/// Service type of Blazar in the catalog.
pub const RESERVATION_SERVICE: &str = "reservation";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CatalogEndpoint {
    pub interface: String,
    #[serde(default)]
    pub region_id: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    pub url: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    #[serde(rename = "type")]
    pub service_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub endpoints: Vec<CatalogEndpoint>,
}

#[derive(Deserialize, Debug)]
struct TokenBody {
    token: TokenInfo,
}

#[derive(Deserialize, Debug)]
struct TokenInfo {
    #[serde(default)]
    expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    catalog: Vec<CatalogEntry>,
}

/// Authenticated token plus the catalog it was issued with.
#[derive(Debug, Clone)]
pub struct Session {
    pub http: Client,
    pub token: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub catalog: Vec<CatalogEntry>,
    interface: String,
    region_name: Option<String>,
}

impl Session {
    /// URL of `service_type` for the configured interface and region.
    pub fn endpoint(&self, service_type: &str) -> ApiResult<String> {
        find_endpoint(
            &self.catalog,
            service_type,
            &self.interface,
            self.region_name.as_deref(),
        )
    }
}

/// Pick the first catalog endpoint matching service type, interface and (if given) region.
pub fn find_endpoint(
    catalog: &[CatalogEntry],
    service_type: &str,
    interface: &str,
    region: Option<&str>,
) -> ApiResult<String> {
    catalog
        .iter()
        .filter(|entry| entry.service_type == service_type)
        .flat_map(|entry| entry.endpoints.iter())
        .find(|ep| {
            ep.interface == interface
                && region.map_or(true, |r| {
                    ep.region_id.as_deref() == Some(r) || ep.region.as_deref() == Some(r)
                })
        })
        .map(|ep| ep.url.trim_end_matches('/').to_string())
        .ok_or_else(|| ApiError::MissingEndpoint {
            service_type: service_type.to_string(),
            interface: interface.to_string(),
        })
}

/// Keystone `POST /auth/tokens` request body.
pub fn token_request(credentials: &Credentials) -> Value {
    match credentials {
        Credentials::ApplicationCredential { id, secret } => json!({
            "auth": {
                "identity": {
                    "methods": ["application_credential"],
                    "application_credential": { "id": id, "secret": secret }
                }
            }
        }),
        Credentials::Password {
            username,
            password,
            user_domain_name,
            project,
        } => {
            let project = match project {
                ProjectScope::Id(id) => json!({ "id": id }),
                ProjectScope::Name { name, domain_name } => {
                    json!({ "name": name, "domain": { "name": domain_name } })
                }
            };
            json!({
                "auth": {
                    "identity": {
                        "methods": ["password"],
                        "password": {
                            "user": {
                                "name": username,
                                "password": password,
                                "domain": { "name": user_domain_name }
                            }
                        }
                    },
                    "scope": { "project": project }
                }
            })
        }
    }
}

/// Token endpoint for `auth_url`, adding the `/v3` suffix when it is missing.
pub fn tokens_url(auth_url: &str) -> String {
    let auth_url = auth_url.trim_end_matches('/');
    if auth_url.ends_with(KEYSTONE_VERSION_PATH) {
        format!("{auth_url}/auth/tokens")
    } else {
        format!("{auth_url}/{KEYSTONE_VERSION_PATH}/auth/tokens")
    }
}

/// Issue a token against Keystone.
pub async fn authenticate(config: &CloudConfig) -> ApiResult<Session> {
    let http = Client::builder()
        .user_agent(concat!("chi-network-ops/", env!("CARGO_PKG_VERSION")))
        .timeout(config.timeout)
        .build()
        .map_err(|source| ApiError::Network {
            url: config.auth_url.clone(),
            source,
        })?;

    let url = tokens_url(&config.auth_url);
    log::debug!("Authenticating against {url}");

    let response = http
        .post(&url)
        .json(&token_request(&config.credentials))
        .send()
        .await
        .map_err(|source| ApiError::Network {
            url: url.clone(),
            source,
        })?;

    let status = response.status();
    let token = response
        .headers()
        .get(SUBJECT_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = response.text().await.map_err(|source| ApiError::Network {
        url: url.clone(),
        source,
    })?;

    if !status.is_success() {
        return Err(ApiError::Http { url, status, body });
    }
    let token = token.ok_or_else(|| ApiError::Auth {
        url: url.clone(),
        message: format!("response has no {SUBJECT_TOKEN_HEADER} header"),
    })?;

    let parsed: TokenBody = super::rest::decode(&url, &body)?;
    match parsed.token.expires_at {
        Some(expires_at) => log::info!("Authenticated, token expires at {expires_at}"),
        None => log::info!("Authenticated"),
    }

    Ok(Session {
        http,
        token,
        expires_at: parsed.token.expires_at,
        catalog: parsed.token.catalog,
        interface: config.interface.clone(),
        region_name: config.region_name.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<CatalogEntry> {
        serde_json::from_str(
            r#"[
            {"type": "network", "name": "neutron", "endpoints": [
                {"interface": "internal", "region_id": "CHI@UC", "url": "http://10.0.0.1:9696"},
                {"interface": "public", "region_id": "CHI@TACC", "url": "https://tacc:9696/"},
                {"interface": "public", "region_id": "CHI@UC", "url": "https://uc:9696/"}
            ]},
            {"type": "reservation", "name": "blazar", "endpoints": [
                {"interface": "public", "region": "CHI@UC", "url": "https://uc:1234/v1"}
            ]}
        ]"#,
        )
        .unwrap()
    }

    #[test]
    fn test_find_endpoint_by_interface_and_region() {
        let catalog = catalog();
        assert_eq!(
            find_endpoint(&catalog, NETWORK_SERVICE, "public", Some("CHI@UC")).unwrap(),
            "https://uc:9696"
        );
        assert_eq!(
            find_endpoint(&catalog, NETWORK_SERVICE, "public", None).unwrap(),
            "https://tacc:9696"
        );
        assert_eq!(
            find_endpoint(&catalog, RESERVATION_SERVICE, "public", Some("CHI@UC")).unwrap(),
            "https://uc:1234/v1"
        );
    }

    #[test]
    fn test_find_endpoint_missing() {
        let err = find_endpoint(&catalog(), "compute", "public", None).unwrap_err();
        assert!(matches!(err, ApiError::MissingEndpoint { .. }));
        assert!(find_endpoint(&catalog(), RESERVATION_SERVICE, "admin", None).is_err());
    }

    #[test]
    fn test_tokens_url_adds_version() {
        assert_eq!(
            tokens_url("https://kvm:5000"),
            "https://kvm:5000/v3/auth/tokens"
        );
        assert_eq!(
            tokens_url("https://kvm:5000/v3/"),
            "https://kvm:5000/v3/auth/tokens"
        );
    }

    #[test]
    fn test_token_request_shapes() {
        let body = token_request(&Credentials::ApplicationCredential {
            id: "ac".to_string(),
            secret: "s".to_string(),
        });
        assert_eq!(
            body["auth"]["identity"]["methods"][0],
            json!("application_credential")
        );
        assert!(body["auth"].get("scope").is_none());

        let body = token_request(&Credentials::Password {
            username: "u".to_string(),
            password: "p".to_string(),
            user_domain_name: "Default".to_string(),
            project: ProjectScope::Id("p-1".to_string()),
        });
        assert_eq!(body["auth"]["scope"]["project"]["id"], json!("p-1"));
        assert_eq!(
            body["auth"]["identity"]["password"]["user"]["name"],
            json!("u")
        );
    }
}
