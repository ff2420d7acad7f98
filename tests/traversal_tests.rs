//! Namespace fan-out and failure isolation tests

mod common;

use common::{FakeApi, directory, file, flows, kv};
use kestra_export::export::{Collector, ExportReport, PageTermination, Paginator, Traversal};
use kestra_export::models::{Namespace, ResourceKind};
use serde_json::json;

fn collector(api: &FakeApi) -> Collector<'_> {
    Collector::new(api, "main", Paginator::new(50, PageTermination::ShortPage))
}

fn abc() -> Vec<Namespace> {
    vec![Namespace::new("A"), Namespace::new("B"), Namespace::new("C")]
}

#[tokio::test]
async fn test_failing_namespace_is_isolated() {
    let mut api = FakeApi::new();
    api.flows.insert("A".into(), flows("A", &["a1", "a2"]));
    api.flows.insert("C".into(), flows("C", &["c1"]));
    api.failing_flows.insert("B".into());

    let collector = collector(&api);
    let mut report = ExportReport::quiet();
    let result = Traversal::new(&collector)
        .flows_by_namespace(&abc(), &mut report)
        .await;

    assert_eq!(result.namespaces().collect::<Vec<_>>(), vec!["A", "C"]);
    assert_eq!(result.get("A").map(Vec::len), Some(2));
    assert!(!result.contains("B"));

    let warnings: Vec<_> = report.warnings_for(ResourceKind::Flow).collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].key, "B");
    assert!(warnings[0].message.starts_with("Failed to list flows for B"));

    assert_eq!(api.calls(), vec!["flows A", "flows B", "flows C"]);
}

#[tokio::test]
async fn test_empty_namespace_keeps_its_entry() {
    let mut api = FakeApi::new();
    api.flows.insert("A".into(), flows("A", &["a1"]));

    let collector = collector(&api);
    let mut report = ExportReport::quiet();
    let result = Traversal::new(&collector)
        .flows_by_namespace(&[Namespace::new("A"), Namespace::new("B")], &mut report)
        .await;

    assert_eq!(result.get("B"), Some(&Vec::new()));
    assert!(report.is_clean());
    assert_eq!(report.count(ResourceKind::Flow), 1);
}

#[tokio::test]
async fn test_kv_value_failure_skips_only_that_key() {
    let mut api = FakeApi::new();
    api.kv.insert(
        "A".into(),
        vec![kv("k1", json!("v1")), kv("k2", json!(2)), kv("k3", json!({"x": true}))],
    );
    api.failing_kv.insert("A/k2".into());

    let collector = collector(&api);
    let mut report = ExportReport::quiet();
    let snapshots = Traversal::new(&collector)
        .kv_by_namespace(&[Namespace::new("A")], &mut report)
        .await;

    let keys: Vec<_> = snapshots
        .get("A")
        .map(|entries| entries.iter().map(|e| e.key.as_str()).collect())
        .unwrap_or_default();
    assert_eq!(keys, vec!["k1", "k3"]);

    assert_eq!(report.warnings().len(), 1);
    assert_eq!(report.warnings()[0].key, "A/k2");
    assert_eq!(
        api.calls(),
        vec!["kv-keys A", "kv A/k1", "kv A/k2", "kv A/k3"]
    );
}

#[tokio::test]
async fn test_file_contents_skip_directories() {
    let mut api = FakeApi::new();
    api.files.insert(
        "A".into(),
        vec![directory("scripts"), file("scripts/run.py"), file("missing.txt")],
    );
    api.file_contents
        .insert("A/scripts/run.py".into(), b"print(1)".to_vec());

    let collector = collector(&api);
    let mut report = ExportReport::quiet();
    let files = Traversal::new(&collector)
        .files_by_namespace(&[Namespace::new("A")], true, &mut report)
        .await;

    let a = files.get("A").unwrap();
    assert_eq!(a.entries.len(), 3);
    assert_eq!(
        a.contents,
        vec![("scripts/run.py".to_string(), b"print(1)".to_vec())]
    );
    assert_eq!(report.warnings_for(ResourceKind::NamespaceFile).count(), 1);
    assert_eq!(
        api.calls(),
        vec!["files A", "file A/scripts/run.py", "file A/missing.txt"]
    );
}

#[tokio::test]
async fn test_listing_only_fetches_no_content() {
    let mut api = FakeApi::new();
    api.files.insert("A".into(), vec![file("a.txt")]);

    let collector = collector(&api);
    let files = Traversal::new(&collector)
        .files_by_namespace(&[Namespace::new("A")], false, &mut ExportReport::quiet())
        .await;

    assert!(files.get("A").unwrap().contents.is_empty());
    assert_eq!(api.calls(), vec!["files A"]);
}

#[tokio::test]
async fn test_secret_isolation_warns_once_per_namespace() {
    let api = FakeApi {
        namespaces: vec![
            Namespace::new("A").with_secret_isolation(true),
            Namespace::new("B"),
            Namespace::new("C").with_secret_isolation(true),
        ],
        ..FakeApi::new()
    };

    let mut report = ExportReport::quiet();
    let namespaces = collector(&api).namespaces(&mut report).await.unwrap();

    assert_eq!(namespaces.len(), 3);
    let keys: Vec<_> = report
        .warnings_for(ResourceKind::Namespace)
        .map(|w| w.key.as_str())
        .collect();
    assert_eq!(keys, vec!["A", "C"]);
    assert_eq!(
        report.warnings()[0].message,
        "Namespace 'A' has secret isolation enabled; ensure to handle secrets appropriately during migration."
    );
}

#[tokio::test]
async fn test_forbidden_service_accounts_degrade() {
    let api = FakeApi::new();

    let mut report = ExportReport::quiet();
    let accounts = collector(&api).service_accounts(&mut report).await;

    assert!(accounts.is_empty());
    assert!(report.failures().is_empty());
    assert_eq!(report.warnings_for(ResourceKind::ServiceAccount).count(), 1);
}

#[tokio::test]
async fn test_kv_key_listing_failure_skips_namespace() {
    let mut api = FakeApi::new();
    api.kv.insert("A".into(), vec![kv("a", json!(1))]);
    api.kv.insert("C".into(), vec![kv("c", json!(3))]);
    api.failing_kv_keys.insert("B".into());

    let collector = collector(&api);
    let mut report = ExportReport::quiet();
    let snapshots = Traversal::new(&collector)
        .kv_by_namespace(&abc(), &mut report)
        .await;

    assert_eq!(snapshots.namespaces().collect::<Vec<_>>(), vec!["A", "C"]);
    assert_eq!(snapshots.get("C").map(Vec::len), Some(1));

    let warnings: Vec<_> = report.warnings_for(ResourceKind::KvEntry).collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].key, "B");
    assert!(warnings[0].message.starts_with("Failed to list KV keys for B"));
    assert_eq!(report.count(ResourceKind::KvEntry), 2);
    assert_eq!(
        api.calls(),
        vec!["kv-keys A", "kv A/a", "kv-keys B", "kv-keys C", "kv C/c"]
    );
}

#[tokio::test]
async fn test_file_listing_failure_skips_namespace() {
    let mut api = FakeApi::new();
    api.files.insert("A".into(), vec![file("a.txt")]);
    api.files.insert("C".into(), vec![file("c.txt")]);
    api.file_contents.insert("C/c.txt".into(), b"c".to_vec());
    api.failing_files.insert("B".into());

    let collector = collector(&api);
    let mut report = ExportReport::quiet();
    let files = Traversal::new(&collector)
        .files_by_namespace(&abc(), true, &mut report)
        .await;

    assert_eq!(files.namespaces().collect::<Vec<_>>(), vec!["A", "C"]);
    assert_eq!(
        files.get("C").unwrap().contents,
        vec![("c.txt".to_string(), b"c".to_vec())]
    );

    let warnings: Vec<_> = report.warnings_for(ResourceKind::NamespaceFile).collect();
    // a.txt has no content in the fake instance
    assert_eq!(warnings.len(), 2);
    assert_eq!(warnings[0].key, "A/a.txt");
    assert_eq!(warnings[1].key, "B");
    assert!(warnings[1].message.starts_with("Failed to list files for B"));
    assert!(!api.calls().iter().any(|c| c.starts_with("file B/")));
}

#[tokio::test]
async fn test_unreachable_service_accounts_degrade() {
    let api = FakeApi {
        service_accounts_down: true,
        ..FakeApi::new()
    };

    let mut report = ExportReport::quiet();
    let accounts = collector(&api).service_accounts(&mut report).await;

    assert!(accounts.is_empty());
    assert!(report.failures().is_empty());
    assert_eq!(report.warnings().len(), 1);
    assert!(report.warnings()[0].message.contains("connection reset by peer"));
}
