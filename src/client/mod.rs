//! Kestra API access
//!
//! `RemoteApi` is the capability the export engine consumes: list a
//! resource page by page, fetch one dependent sub-resource, or pull a bulk
//! export blob. `HttpRemoteApi` implements it over the Kestra REST API.
//!
//! Authentication is fixed when the client is built and applied to every
//! request; it is never renegotiated during a run.

mod envelope;
mod http;

pub use envelope::{KeyItem, Listing};
pub use http::{parse_duration, ClientSettings, HttpRemoteApi};

use crate::models::{
    FileMeta, Flow, FlowRef, Group, KvEntry, Namespace, Role, ServiceAccount, User,
};
use async_trait::async_trait;

/// Credentials presented to the Kestra API
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// No authentication header
    Anonymous,
    /// `Authorization: Bearer <token>`
    Bearer(String),
    /// HTTP basic authentication
    Basic { username: String, password: String },
}

impl Credentials {
    /// Pick credentials from the configured values; a token wins over basic auth
    pub fn from_parts(
        api_token: Option<&str>,
        username: Option<&str>,
        password: Option<&str>,
    ) -> Self {
        match (api_token, username, password) {
            (Some(token), _, _) if !token.is_empty() => Credentials::Bearer(token.to_string()),
            (_, Some(user), Some(pass)) if !user.is_empty() => Credentials::Basic {
                username: user.to_string(),
                password: pass.to_string(),
            },
            _ => Credentials::Anonymous,
        }
    }

    pub fn scheme(&self) -> &'static str {
        match self {
            Credentials::Anonymous => "none",
            Credentials::Bearer(_) => "bearer",
            Credentials::Basic { .. } => "basic",
        }
    }
}

// Secrets never reach logs through Debug.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::Anonymous => write!(f, "Anonymous"),
            Credentials::Bearer(_) => write!(f, "Bearer(****)"),
            Credentials::Basic { username, .. } => write!(f, "Basic({username}:****)"),
        }
    }
}

/// Errors raised by the remote API
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("access denied to {url} (HTTP {status})")]
    Forbidden { url: String, status: u16 },

    #[error("unexpected response shape from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    /// True when the server refused the caller rather than failing
    pub fn is_forbidden(&self) -> bool {
        matches!(self, ApiError::Forbidden { .. })
    }
}

/// Result type for remote API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Remote access capability consumed by the export engine
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RemoteApi: Send + Sync {
    /// Search namespaces of a tenant, one page at a time
    async fn list_namespaces(
        &self,
        tenant: &str,
        page: u32,
        size: u32,
        existing: bool,
    ) -> ApiResult<Vec<Namespace>>;

    /// List every flow of one namespace (single call, not paginated)
    async fn list_flows(&self, tenant: &str, namespace: &str) -> ApiResult<Vec<Flow>>;

    /// Export all flow sources of a tenant as one ZIP archive
    async fn export_flows_bundle(&self, tenant: &str) -> ApiResult<Vec<u8>>;

    /// Export the given flows as one ZIP archive
    async fn export_flows_by_ids(&self, tenant: &str, ids: &[FlowRef]) -> ApiResult<Vec<u8>>;

    async fn list_users(&self, page: u32, size: u32) -> ApiResult<Vec<User>>;

    async fn list_groups(&self, tenant: &str, page: u32, size: u32) -> ApiResult<Vec<Group>>;

    async fn list_roles(&self, tenant: &str, page: u32, size: u32) -> ApiResult<Vec<Role>>;

    /// List service accounts (superadmin only)
    async fn list_service_accounts(&self) -> ApiResult<Vec<ServiceAccount>>;

    async fn list_kv_keys(&self, tenant: &str, namespace: &str) -> ApiResult<Vec<String>>;

    async fn get_kv_value(&self, tenant: &str, namespace: &str, key: &str)
    -> ApiResult<KvEntry>;

    async fn list_namespace_files(&self, tenant: &str, namespace: &str)
    -> ApiResult<Vec<FileMeta>>;

    async fn get_namespace_file(
        &self,
        tenant: &str,
        namespace: &str,
        path: &str,
    ) -> ApiResult<Vec<u8>>;

    /// Connectivity check (default: fetch the first namespace)
    async fn health_check(&self, tenant: &str) -> ApiResult<()> {
        self.list_namespaces(tenant, 1, 1, false).await?;
        Ok(())
    }
}
