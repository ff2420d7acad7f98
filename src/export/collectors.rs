//! Per-kind resource collectors
//!
//! Each collector specializes the paginator (or a single call) for one
//! resource kind and applies that kind's failure policy.

use super::paginate::Paginator;
use super::report::ExportReport;
use super::ExportError;
use crate::client::{ApiResult, RemoteApi};
use crate::models::{
    FileMeta, Flow, Group, KvEntry, Namespace, ResourceKind, Role, ServiceAccount, User,
};
use std::path::{Path, PathBuf};

/// Collectors bound to one API handle and tenant
pub struct Collector<'a> {
    api: &'a dyn RemoteApi,
    tenant: &'a str,
    paginator: Paginator,
}

impl<'a> Collector<'a> {
    pub fn new(api: &'a dyn RemoteApi, tenant: &'a str, paginator: Paginator) -> Self {
        Self {
            api,
            tenant,
            paginator,
        }
    }

    /// Every namespace of the tenant
    ///
    /// Namespaces with secret isolation enabled raise one warning each so
    /// the operator handles their secrets by hand; the returned collection
    /// is not affected.
    pub async fn namespaces(
        &self,
        report: &mut ExportReport,
    ) -> Result<Vec<Namespace>, ExportError> {
        let (api, tenant) = (self.api, self.tenant);
        let namespaces = self
            .paginator
            .fetch_all(move |req| api.list_namespaces(tenant, req.page, req.size, false))
            .await?;

        for ns in namespaces.iter().filter(|ns| ns.secret_isolation_enabled()) {
            report.warn(
                ResourceKind::Namespace,
                &ns.id,
                format!(
                    "Namespace '{}' has secret isolation enabled; ensure to handle secrets appropriately during migration.",
                    ns.id
                ),
            );
        }

        Ok(namespaces)
    }

    /// Flows of one namespace (single call)
    pub async fn flows_by_namespace(&self, namespace: &str) -> ApiResult<Vec<Flow>> {
        self.api.list_flows(self.tenant, namespace).await
    }

    /// Download the ZIP bundle of every flow source to `target`
    ///
    /// Any failure propagates; nothing is written unless the whole bundle
    /// arrived.
    pub async fn export_flows_bundle(&self, target: &Path) -> Result<PathBuf, ExportError> {
        let bundle = self.api.export_flows_bundle(self.tenant).await?;

        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ExportError::io(parent, e))?;
        }
        std::fs::write(target, &bundle).map_err(|e| ExportError::io(target, e))?;

        tracing::debug!("Wrote {} byte flow bundle to {}", bundle.len(), target.display());

        Ok(target.to_path_buf())
    }

    pub async fn users(&self) -> Result<Vec<User>, ExportError> {
        let api = self.api;
        self.paginator
            .fetch_all(move |req| api.list_users(req.page, req.size))
            .await
    }

    pub async fn groups(&self) -> Result<Vec<Group>, ExportError> {
        let (api, tenant) = (self.api, self.tenant);
        self.paginator
            .fetch_all(move |req| api.list_groups(tenant, req.page, req.size))
            .await
    }

    pub async fn roles(&self) -> Result<Vec<Role>, ExportError> {
        let (api, tenant) = (self.api, self.tenant);
        self.paginator
            .fetch_all(move |req| api.list_roles(tenant, req.page, req.size))
            .await
    }

    /// Service accounts, or nothing when the endpoint is unavailable
    ///
    /// The endpoint is superadmin-only, so a failure degrades to an empty
    /// collection with a warning instead of failing the run.
    pub async fn service_accounts(&self, report: &mut ExportReport) -> Vec<ServiceAccount> {
        match self.api.list_service_accounts().await {
            Ok(accounts) => accounts,
            Err(e) if e.is_forbidden() => {
                report.warn(
                    ResourceKind::ServiceAccount,
                    "*",
                    format!("Skipping, listing requires superadmin privileges: {}", e),
                );
                Vec::new()
            }
            Err(e) => {
                report.warn(
                    ResourceKind::ServiceAccount,
                    "*",
                    format!("Skipping, failed to list: {}", e),
                );
                Vec::new()
            }
        }
    }

    pub async fn kv_keys(&self, namespace: &str) -> ApiResult<Vec<String>> {
        self.api.list_kv_keys(self.tenant, namespace).await
    }

    pub async fn kv_value(&self, namespace: &str, key: &str) -> ApiResult<KvEntry> {
        self.api.get_kv_value(self.tenant, namespace, key).await
    }

    pub async fn namespace_files(&self, namespace: &str) -> ApiResult<Vec<FileMeta>> {
        self.api.list_namespace_files(self.tenant, namespace).await
    }

    pub async fn namespace_file_content(&self, namespace: &str, path: &str) -> ApiResult<Vec<u8>> {
        self.api.get_namespace_file(self.tenant, namespace, path).await
    }
}
