//! Token-authenticated JSON REST calls shared by the Neutron and Blazar clients.

use super::{ApiResult, ResourceKind};
use crate::error::ApiError;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;

pub const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

#[derive(Debug, Clone)]
pub struct RestClient {
    http: Client,
    base_url: String,
    token: String,
}

impl RestClient {
    pub fn new(http: Client, base_url: &str, token: &str) -> Self {
        RestClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// List a collection, following `<collection>_links` "next" pages.
    pub async fn list<T: DeserializeOwned>(
        &self,
        kind: ResourceKind,
        params: &[(&'static str, String)],
    ) -> ApiResult<Vec<T>> {
        let mut items = Vec::new();
        let mut next = Some(self.url(kind.collection()));
        let mut page = 0;

        while let Some(url) = next.take() {
            let request = if page == 0 {
                self.http.get(&url).query(params)
            } else {
                self.http.get(&url)
            };
            let body = self.send(request, &url).await?;
            let mut envelope: Value = decode(&url, &body)?;

            let batch = envelope
                .get_mut(kind.collection())
                .map(Value::take)
                .ok_or_else(|| ApiError::Decode {
                    url: url.clone(),
                    path: kind.collection().to_string(),
                    message: "missing collection in response".to_string(),
                })?;
            let batch: Vec<T> = decode_value(&url, kind.collection(), batch)?;
            log::debug!(
                "got {kind} page#{page} record_count=+{count} url={url}",
                count = batch.len()
            );
            items.extend(batch);

            next = next_link(&envelope, kind);
            if next.as_deref() == Some(url.as_str()) {
                return Err(ApiError::Decode {
                    url,
                    path: format!("{}_links", kind.collection()),
                    message: "next link repeats the current page".to_string(),
                });
            }
            page += 1;
        }

        Ok(items)
    }

    /// Fetch one resource by ID.
    pub async fn show<T: DeserializeOwned>(&self, kind: ResourceKind, id: &str) -> ApiResult<T> {
        let url = self.url(&format!("{}/{}", kind.collection(), id));
        let body = self.send(self.http.get(&url), &url).await?;
        let mut envelope: Value = decode(&url, &body)?;
        let member = envelope
            .get_mut(kind.member())
            .map(Value::take)
            .ok_or_else(|| ApiError::Decode {
                url: url.clone(),
                path: kind.member().to_string(),
                message: "missing resource in response".to_string(),
            })?;
        decode_value(&url, kind.member(), member)
    }

    pub async fn put(&self, path: &str, body: &Value) -> ApiResult<()> {
        let url = self.url(path);
        self.send(self.http.put(&url).json(body), &url).await?;
        Ok(())
    }

    pub async fn delete(&self, path: &str) -> ApiResult<()> {
        let url = self.url(path);
        self.send(self.http.delete(&url), &url).await?;
        Ok(())
    }

    async fn send(&self, request: RequestBuilder, url: &str) -> ApiResult<String> {
        let response = request
            .header(AUTH_TOKEN_HEADER, &self.token)
            .send()
            .await
            .map_err(|source| ApiError::Network {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|source| ApiError::Network {
            url: url.to_string(),
            source,
        })?;

        if !status.is_success() {
            log::warn!("HTTP {status} from {url}");
            return Err(ApiError::Http {
                url: url.to_string(),
                status,
                body,
            });
        }
        log::trace!("HTTP {status} from {url} len={}", body.len());
        Ok(body)
    }
}

/// Decode a JSON body, reporting the path of the first field that failed.
pub fn decode<T: DeserializeOwned>(url: &str, body: &str) -> ApiResult<T> {
    let mut deserializer = serde_json::Deserializer::from_str(body);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
        log::error!("OUTPUT START:\n\n{body}\n\nOUTPUT END\n");
        ApiError::Decode {
            url: url.to_string(),
            path: e.path().to_string(),
            message: e.inner().to_string(),
        }
    })
}

fn decode_value<T: DeserializeOwned>(url: &str, key: &str, value: Value) -> ApiResult<T> {
    serde_path_to_error::deserialize(value).map_err(|e| ApiError::Decode {
        url: url.to_string(),
        path: format!("{key}.{}", e.path()),
        message: e.inner().to_string(),
    })
}

fn next_link(envelope: &Value, kind: ResourceKind) -> Option<String> {
    envelope
        .get(format!("{}_links", kind.collection()))?
        .as_array()?
        .iter()
        .find(|link| link.get("rel").and_then(Value::as_str) == Some("next"))?
        .get("href")?
        .as_str()
        .map(str::to_string)
}
