//! HTTP implementation of the Kestra API

use super::envelope::{KeyItem, Listing};
use super::{ApiError, ApiResult, Credentials, RemoteApi};
use crate::models::{
    FileMeta, Flow, FlowRef, Group, KvEntry, Namespace, Role, ServiceAccount, User,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Connection settings for `HttpRemoteApi`
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub credentials: Credentials,
    pub verify_ssl: bool,
    /// Per-request timeout; transport defaults apply when unset
    pub timeout: Option<Duration>,
}

/// Kestra REST client
pub struct HttpRemoteApi {
    client: reqwest::Client,
    base_url: Url,
    credentials: Credentials,
}

impl HttpRemoteApi {
    /// Create a new client
    pub fn new(settings: &ClientSettings) -> Result<Self> {
        let base_url = Url::parse(settings.base_url.trim_end_matches('/'))
            .with_context(|| format!("Invalid base URL: {}", settings.base_url))?;

        if base_url.cannot_be_a_base() {
            anyhow::bail!("Base URL cannot carry a path: {}", settings.base_url);
        }

        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("kestra-export/", env!("CARGO_PKG_VERSION")))
            .danger_accept_invalid_certs(!settings.verify_ssl);

        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().context("Failed to create HTTP client")?;

        tracing::debug!(
            "Created Kestra client for: {} (auth: {})",
            base_url,
            settings.credentials.scheme()
        );

        Ok(Self {
            client,
            base_url,
            credentials: settings.credentials.clone(),
        })
    }

    /// Build `<base>/api/v1/<segments...>`, percent-encoding each segment
    fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidRequest(format!("bad base URL: {}", self.base_url)))?
            .pop_if_empty()
            .extend(["api", "v1"])
            .extend(segments);
        Ok(url)
    }

    /// Apply authentication to a request
    fn apply_auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.credentials {
            Credentials::Anonymous => req,
            Credentials::Bearer(token) => req.bearer_auth(token),
            Credentials::Basic { username, password } => req.basic_auth(username, Some(password)),
        }
    }

    /// Send a request and turn non-success statuses into errors
    async fn send(&self, req: reqwest::RequestBuilder, url: &Url) -> ApiResult<reqwest::Response> {
        tracing::debug!("Requesting: {}", url);

        let resp = self
            .apply_auth(req)
            .send()
            .await
            .map_err(|e| ApiError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        tracing::debug!("Request failed: {} (status: {})", url, status);

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            Err(ApiError::Forbidden {
                url: url.to_string(),
                status: status.as_u16(),
            })
        } else {
            Err(ApiError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            })
        }
    }

    async fn read_bytes(resp: reqwest::Response, url: &Url) -> ApiResult<Vec<u8>> {
        resp.bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| ApiError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> ApiResult<T> {
        let url = self.endpoint(segments)?;
        let resp = self.send(self.client.get(url.clone()).query(query), &url).await?;
        let body = Self::read_bytes(resp, &url).await?;

        serde_json::from_slice(&body).map_err(|e| ApiError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    async fn get_listing<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> ApiResult<Vec<T>> {
        let listing: Listing<T> = self.get_json(segments, query).await?;
        if let Some(total) = listing.total() {
            tracing::trace!("{} reports {} records in total", segments.join("/"), total);
        }
        Ok(listing.into_items())
    }

    async fn get_bytes(&self, segments: &[&str], query: &[(&str, String)]) -> ApiResult<Vec<u8>> {
        let url = self.endpoint(segments)?;
        let resp = self.send(self.client.get(url.clone()).query(query), &url).await?;
        Self::read_bytes(resp, &url).await
    }
}

fn page_query(page: u32, size: u32) -> Vec<(&'static str, String)> {
    vec![("page", page.to_string()), ("size", size.to_string())]
}

#[async_trait]
impl RemoteApi for HttpRemoteApi {
    async fn list_namespaces(
        &self,
        tenant: &str,
        page: u32,
        size: u32,
        existing: bool,
    ) -> ApiResult<Vec<Namespace>> {
        let mut query = page_query(page, size);
        query.push(("existing", existing.to_string()));
        self.get_listing(&[tenant, "namespaces", "search"], &query)
            .await
    }

    async fn list_flows(&self, tenant: &str, namespace: &str) -> ApiResult<Vec<Flow>> {
        self.get_listing(&[tenant, "flows", namespace], &[]).await
    }

    async fn export_flows_bundle(&self, tenant: &str) -> ApiResult<Vec<u8>> {
        self.get_bytes(&[tenant, "flows", "export", "by-query"], &[])
            .await
    }

    async fn export_flows_by_ids(&self, tenant: &str, ids: &[FlowRef]) -> ApiResult<Vec<u8>> {
        let url = self.endpoint(&[tenant, "flows", "export", "by-ids"])?;
        let resp = self
            .send(self.client.post(url.clone()).json(ids), &url)
            .await?;
        Self::read_bytes(resp, &url).await
    }

    async fn list_users(&self, page: u32, size: u32) -> ApiResult<Vec<User>> {
        self.get_listing(&["users"], &page_query(page, size)).await
    }

    async fn list_groups(&self, tenant: &str, page: u32, size: u32) -> ApiResult<Vec<Group>> {
        self.get_listing(&[tenant, "groups", "search"], &page_query(page, size))
            .await
    }

    async fn list_roles(&self, tenant: &str, page: u32, size: u32) -> ApiResult<Vec<Role>> {
        self.get_listing(&[tenant, "roles", "search"], &page_query(page, size))
            .await
    }

    async fn list_service_accounts(&self) -> ApiResult<Vec<ServiceAccount>> {
        self.get_listing(&["service-accounts"], &[]).await
    }

    async fn list_kv_keys(&self, tenant: &str, namespace: &str) -> ApiResult<Vec<String>> {
        let items: Vec<KeyItem> = self
            .get_listing(&[tenant, "namespaces", namespace, "kv"], &[])
            .await?;
        Ok(items.into_iter().map(KeyItem::into_key).collect())
    }

    async fn get_kv_value(
        &self,
        tenant: &str,
        namespace: &str,
        key: &str,
    ) -> ApiResult<KvEntry> {
        let value: Value = self
            .get_json(&[tenant, "namespaces", namespace, "kv", key], &[])
            .await?;
        Ok(KvEntry {
            key: key.to_string(),
            value,
        })
    }

    async fn list_namespace_files(
        &self,
        tenant: &str,
        namespace: &str,
    ) -> ApiResult<Vec<FileMeta>> {
        self.get_listing(&[tenant, "namespaces", namespace, "files", "directory"], &[])
            .await
    }

    async fn get_namespace_file(
        &self,
        tenant: &str,
        namespace: &str,
        path: &str,
    ) -> ApiResult<Vec<u8>> {
        self.get_bytes(
            &[tenant, "namespaces", namespace, "files"],
            &[("path", path.to_string())],
        )
        .await
    }
}

/// Parse duration string (e.g., "30s", "1m", "5s")
pub fn parse_duration(s: &str) -> Result<Duration> {
    if let Some(secs) = s.strip_suffix("ms") {
        let ms: u64 = secs.parse().context("Invalid duration")?;
        Ok(Duration::from_millis(ms))
    } else if let Some(secs) = s.strip_suffix('s') {
        let secs: u64 = secs.parse().context("Invalid duration")?;
        Ok(Duration::from_secs(secs))
    } else if let Some(mins) = s.strip_suffix('m') {
        let mins: u64 = mins.parse().context("Invalid duration")?;
        Ok(Duration::from_secs(mins * 60))
    } else if let Some(hours) = s.strip_suffix('h') {
        let hours: u64 = hours.parse().context("Invalid duration")?;
        Ok(Duration::from_secs(hours * 3600))
    } else {
        anyhow::bail!("Invalid duration format: {}", s)
    }
}
