//! Pagination tests against the in-memory API

mod common;

use common::{FakeApi, user};
use kestra_export::ExportError;
use kestra_export::export::{Collector, ExportReport, PageTermination, Paginator};
use kestra_export::models::Namespace;

fn namespaces(n: usize) -> Vec<Namespace> {
    (0..n).map(|i| Namespace::new(format!("ns{:02}", i))).collect()
}

#[tokio::test]
async fn test_short_page_ends_traversal() {
    let api = FakeApi {
        namespaces: namespaces(11),
        ..FakeApi::new()
    };
    let collector = Collector::new(&api, "main", Paginator::new(3, PageTermination::ShortPage));

    let mut report = ExportReport::quiet();
    let result = collector.namespaces(&mut report).await.unwrap();

    assert_eq!(result.len(), 11);
    assert_eq!(result[0].id, "ns00");
    assert_eq!(result[10].id, "ns10");
    assert_eq!(
        api.calls(),
        vec![
            "namespaces page=1 size=3",
            "namespaces page=2 size=3",
            "namespaces page=3 size=3",
            "namespaces page=4 size=3",
        ]
    );
}

#[tokio::test]
async fn test_full_last_page_costs_one_extra_call() {
    let api = FakeApi {
        namespaces: namespaces(6),
        ..FakeApi::new()
    };
    let collector = Collector::new(&api, "main", Paginator::new(3, PageTermination::ShortPage));

    let result = collector
        .namespaces(&mut ExportReport::quiet())
        .await
        .unwrap();

    assert_eq!(result.len(), 6);
    assert_eq!(api.calls_to("namespaces").len(), 3);
}

#[tokio::test]
async fn test_until_empty_ignores_short_pages() {
    let api = FakeApi {
        namespaces: namespaces(5),
        ..FakeApi::new()
    };
    let collector = Collector::new(&api, "main", Paginator::new(3, PageTermination::UntilEmpty));

    let result = collector
        .namespaces(&mut ExportReport::quiet())
        .await
        .unwrap();

    assert_eq!(result.len(), 5);
    assert_eq!(api.calls_to("namespaces").len(), 3);
}

#[tokio::test]
async fn test_empty_collection_makes_one_call() {
    let api = FakeApi::new();
    let collector = Collector::new(&api, "main", Paginator::new(100, PageTermination::ShortPage));

    assert!(collector.users().await.unwrap().is_empty());
    assert_eq!(api.calls(), vec!["users page=1"]);
}

#[tokio::test]
async fn test_users_keep_server_order_across_pages() {
    let api = FakeApi {
        users: vec![user("c@x"), user("a@x"), user("b@x")],
        ..FakeApi::new()
    };
    let collector = Collector::new(&api, "main", Paginator::new(2, PageTermination::ShortPage));

    let users = collector.users().await.unwrap();
    let names: Vec<_> = users.iter().filter_map(|u| u.username.as_deref()).collect();
    assert_eq!(names, vec!["c@x", "a@x", "b@x"]);
}

#[tokio::test]
async fn test_namespace_search_failure_propagates() {
    let api = FakeApi {
        namespaces_down: true,
        ..FakeApi::new()
    };
    let collector = Collector::new(&api, "main", Paginator::new(3, PageTermination::ShortPage));

    let result = collector.namespaces(&mut ExportReport::quiet()).await;
    assert!(matches!(result, Err(ExportError::Api(_))));
}

#[tokio::test]
async fn test_zero_page_size_is_rejected_before_any_call() {
    let api = FakeApi {
        namespaces: namespaces(2),
        ..FakeApi::new()
    };
    let collector = Collector::new(&api, "main", Paginator::new(0, PageTermination::ShortPage));

    let result = collector.namespaces(&mut ExportReport::quiet()).await;
    assert!(matches!(result, Err(ExportError::InvalidPageSize)));
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn test_health_check_requests_a_single_namespace() {
    use kestra_export::client::RemoteApi;

    let api = FakeApi {
        namespaces: namespaces(5),
        ..FakeApi::new()
    };
    api.health_check("main").await.unwrap();
    assert_eq!(api.calls(), vec!["namespaces page=1 size=1"]);

    let down = FakeApi {
        namespaces_down: true,
        ..FakeApi::new()
    };
    assert!(down.health_check("main").await.is_err());
}
