//! In-memory Kestra API for integration tests
//!
//! Serves canned data page by page and records every call so tests can
//! assert on request order and counts.

#![allow(dead_code)]

use async_trait::async_trait;
use kestra_export::client::{ApiError, ApiResult, RemoteApi};
use kestra_export::models::{
    FileMeta, Flow, FlowRef, Group, KvEntry, Namespace, Role, ServiceAccount, User,
};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// Canned instance behind the `RemoteApi` interface
#[derive(Default)]
pub struct FakeApi {
    pub namespaces: Vec<Namespace>,
    /// Namespace search fails outright
    pub namespaces_down: bool,
    pub flows: HashMap<String, Vec<Flow>>,
    /// Namespaces whose flow listing fails
    pub failing_flows: HashSet<String>,
    pub bundle: Option<Vec<u8>>,
    /// Keys per namespace, in listing order
    pub kv: HashMap<String, Vec<KvEntry>>,
    /// `"ns/key"` entries whose value fetch fails
    pub failing_kv: HashSet<String>,
    /// Namespaces whose KV key listing fails
    pub failing_kv_keys: HashSet<String>,
    pub files: HashMap<String, Vec<FileMeta>>,
    /// Namespaces whose file listing fails
    pub failing_files: HashSet<String>,
    pub file_contents: HashMap<String, Vec<u8>>,
    pub users: Vec<User>,
    pub groups: Vec<Group>,
    pub roles: Vec<Role>,
    /// `None` answers 403
    pub service_accounts: Option<Vec<ServiceAccount>>,
    /// Service account listing fails with a transport error
    pub service_accounts_down: bool,
    /// Every call made, in order
    pub calls: Mutex<Vec<String>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call made so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Calls whose description starts with `prefix`
    pub fn calls_to(&self, prefix: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with(prefix))
            .collect()
    }

    fn record(&self, call: String) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

fn page_of<T: Clone>(items: &[T], page: u32, size: u32) -> Vec<T> {
    let start = (page.saturating_sub(1) as usize).saturating_mul(size as usize);
    items
        .iter()
        .skip(start)
        .take(size as usize)
        .cloned()
        .collect()
}

fn url(path: &str) -> String {
    format!("http://localhost:8080/api/v1/{}", path)
}

fn server_error(path: &str) -> ApiError {
    ApiError::Status {
        url: url(path),
        status: 500,
    }
}

#[async_trait]
impl RemoteApi for FakeApi {
    async fn list_namespaces(
        &self,
        tenant: &str,
        page: u32,
        size: u32,
        _existing: bool,
    ) -> ApiResult<Vec<Namespace>> {
        self.record(format!("namespaces page={} size={}", page, size));
        if self.namespaces_down {
            return Err(server_error(&format!("{}/namespaces/search", tenant)));
        }
        Ok(page_of(&self.namespaces, page, size))
    }

    async fn list_flows(&self, tenant: &str, namespace: &str) -> ApiResult<Vec<Flow>> {
        self.record(format!("flows {}", namespace));
        if self.failing_flows.contains(namespace) {
            return Err(server_error(&format!("{}/flows/{}", tenant, namespace)));
        }
        Ok(self.flows.get(namespace).cloned().unwrap_or_default())
    }

    async fn export_flows_bundle(&self, tenant: &str) -> ApiResult<Vec<u8>> {
        self.record("bundle".to_string());
        self.bundle
            .clone()
            .ok_or_else(|| server_error(&format!("{}/flows/export/by-query", tenant)))
    }

    async fn export_flows_by_ids(&self, _tenant: &str, ids: &[FlowRef]) -> ApiResult<Vec<u8>> {
        self.record(format!("bundle ids={}", ids.len()));
        Ok(b"PK".to_vec())
    }

    async fn list_users(&self, page: u32, size: u32) -> ApiResult<Vec<User>> {
        self.record(format!("users page={}", page));
        Ok(page_of(&self.users, page, size))
    }

    async fn list_groups(&self, _tenant: &str, page: u32, size: u32) -> ApiResult<Vec<Group>> {
        self.record(format!("groups page={}", page));
        Ok(page_of(&self.groups, page, size))
    }

    async fn list_roles(&self, _tenant: &str, page: u32, size: u32) -> ApiResult<Vec<Role>> {
        self.record(format!("roles page={}", page));
        Ok(page_of(&self.roles, page, size))
    }

    async fn list_service_accounts(&self) -> ApiResult<Vec<ServiceAccount>> {
        self.record("service-accounts".to_string());
        if self.service_accounts_down {
            return Err(ApiError::Transport {
                url: url("service-accounts"),
                message: "connection reset by peer".to_string(),
            });
        }
        self.service_accounts.clone().ok_or_else(|| ApiError::Forbidden {
            url: url("service-accounts"),
            status: 403,
        })
    }

    async fn list_kv_keys(&self, tenant: &str, namespace: &str) -> ApiResult<Vec<String>> {
        self.record(format!("kv-keys {}", namespace));
        if self.failing_kv_keys.contains(namespace) {
            return Err(server_error(&format!("{}/namespaces/{}/kv", tenant, namespace)));
        }
        Ok(self
            .kv
            .get(namespace)
            .map(|entries| entries.iter().map(|e| e.key.clone()).collect())
            .unwrap_or_default())
    }

    async fn get_kv_value(&self, tenant: &str, namespace: &str, key: &str) -> ApiResult<KvEntry> {
        self.record(format!("kv {}/{}", namespace, key));
        if self.failing_kv.contains(&format!("{}/{}", namespace, key)) {
            return Err(server_error(&format!(
                "{}/namespaces/{}/kv/{}",
                tenant, namespace, key
            )));
        }
        self.kv
            .get(namespace)
            .and_then(|entries| entries.iter().find(|e| e.key == key))
            .cloned()
            .ok_or_else(|| ApiError::Status {
                url: url(&format!("{}/namespaces/{}/kv/{}", tenant, namespace, key)),
                status: 404,
            })
    }

    async fn list_namespace_files(
        &self,
        tenant: &str,
        namespace: &str,
    ) -> ApiResult<Vec<FileMeta>> {
        self.record(format!("files {}", namespace));
        if self.failing_files.contains(namespace) {
            return Err(server_error(&format!(
                "{}/namespaces/{}/files/directory",
                tenant, namespace
            )));
        }
        Ok(self.files.get(namespace).cloned().unwrap_or_default())
    }

    async fn get_namespace_file(
        &self,
        tenant: &str,
        namespace: &str,
        path: &str,
    ) -> ApiResult<Vec<u8>> {
        self.record(format!("file {}/{}", namespace, path));
        self.file_contents
            .get(&format!("{}/{}", namespace, path))
            .cloned()
            .ok_or_else(|| server_error(&format!("{}/namespaces/{}/files", tenant, namespace)))
    }
}

pub fn kv(key: &str, value: Value) -> KvEntry {
    KvEntry {
        key: key.to_string(),
        value,
    }
}

pub fn file(name: &str) -> FileMeta {
    FileMeta {
        file_name: name.to_string(),
        entry_type: Some("File".to_string()),
        size: Some(1),
        extra: Map::new(),
    }
}

pub fn directory(name: &str) -> FileMeta {
    FileMeta {
        entry_type: Some("Directory".to_string()),
        size: None,
        ..file(name)
    }
}

pub fn user(username: &str) -> User {
    User {
        id: None,
        username: Some(username.to_string()),
        display_name: None,
        extra: Map::new(),
    }
}

pub fn group(name: &str) -> Group {
    Group {
        id: None,
        name: name.to_string(),
        extra: Map::new(),
    }
}

pub fn role(id: &str) -> Role {
    Role {
        id: id.to_string(),
        name: None,
        extra: Map::new(),
    }
}

/// Flows `ids` of namespace `ns`
pub fn flows(ns: &str, ids: &[&str]) -> Vec<Flow> {
    ids.iter().map(|id| Flow::new(ns, *id)).collect()
}
