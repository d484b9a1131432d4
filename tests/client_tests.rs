// Integration tests for the HTTP source adapter, against a mock provider.
use async_trait::async_trait;
use chrono::NaiveDate;
use dayslip::client::{AgendaClient, CredentialError, EventSource, TaskSource, TokenProvider};
use dayslip::model::EventStart;
use mockito::Server;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Token provider with a fixed bearer and a counted, token-rotating refresh.
struct StaticTokens {
    refreshed: AtomicUsize,
}

impl StaticTokens {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            refreshed: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl TokenProvider for StaticTokens {
    async fn bearer(&self) -> Result<String, CredentialError> {
        if self.refreshed.load(Ordering::SeqCst) > 0 {
            Ok("fresh-token".to_string())
        } else {
            Ok("stale-token".to_string())
        }
    }

    async fn refresh(&self) -> Result<String, CredentialError> {
        self.refreshed.fetch_add(1, Ordering::SeqCst);
        Ok("fresh-token".to_string())
    }
}

fn client_for(server: &Server, tokens: Arc<StaticTokens>) -> AgendaClient {
    AgendaClient::new(&server.url(), &server.url(), tokens, 5)
}

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 7).unwrap()
}

#[tokio::test]
async fn parses_timed_and_all_day_events_in_provider_order() {
    let mut server = Server::new_async().await;
    let body = r#"{
        "items": [
            {"summary": "Standup", "start": {"dateTime": "2026-08-07T09:00:00+02:00"}},
            {"summary": "Holiday", "start": {"date": "2026-08-07"}},
            {"start": {"date": "2026-08-07"}},
            {"summary": "Broken"}
        ]
    }"#;
    let _mock = server
        .mock("GET", "/calendars/primary/events")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_body(body)
        .create_async()
        .await;

    let client = client_for(&server, StaticTokens::new());
    let events = client.fetch_events(day()).await.unwrap();

    // "Broken" has no start at all and is skipped; order is preserved.
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].title, "Standup");
    assert!(matches!(events[0].start, EventStart::At(_)));
    assert_eq!(events[1].title, "Holiday");
    assert_eq!(events[1].start, EventStart::AllDay(day()));
    assert_eq!(events[2].title, "Untitled Event");
}

#[tokio::test]
async fn task_aggregation_is_best_effort_across_lists() {
    let mut server = Server::new_async().await;

    let _lists = server
        .mock("GET", "/users/@me/lists")
        .with_status(200)
        .with_body(
            r#"{"items": [
                {"id": "a", "title": "My Tasks"},
                {"id": "b", "title": "Groceries"},
                {"id": "c", "title": "Broken List"}
            ]}"#,
        )
        .create_async()
        .await;

    let _list_a = server
        .mock("GET", "/lists/a/tasks")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_body(r#"{"items": [{"id": "t1", "title": "Buy milk"}]}"#)
        .create_async()
        .await;
    let _list_b = server
        .mock("GET", "/lists/b/tasks")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_body(r#"{"items": [{"id": "t2", "title": "Apples"}]}"#)
        .create_async()
        .await;
    // One list is down; the other two must still come through.
    let _list_c = server
        .mock("GET", "/lists/c/tasks")
        .match_query(mockito::Matcher::Any)
        .with_status(500)
        .create_async()
        .await;

    let client = client_for(&server, StaticTokens::new());
    let tasks = client.fetch_tasks().await.unwrap();

    assert_eq!(tasks.len(), 2);
    let milk = tasks.iter().find(|t| t.id == "t1").unwrap();
    assert_eq!(milk.list_name, "My Tasks");
    let apples = tasks.iter().find(|t| t.id == "t2").unwrap();
    assert_eq!(apples.list_name, "Groceries");
}

#[tokio::test]
async fn failure_listing_the_collection_is_a_fetch_error() {
    let mut server = Server::new_async().await;
    let _lists = server
        .mock("GET", "/users/@me/lists")
        .with_status(503)
        .create_async()
        .await;

    let client = client_for(&server, StaticTokens::new());
    assert!(client.fetch_tasks().await.is_err());
}

#[tokio::test]
async fn refreshes_credential_once_on_401() {
    let mut server = Server::new_async().await;

    // The stale token is rejected; the refreshed token is accepted.
    let rejected = server
        .mock("GET", "/calendars/primary/events")
        .match_query(mockito::Matcher::Any)
        .match_header("authorization", "Bearer stale-token")
        .with_status(401)
        .create_async()
        .await;
    let accepted = server
        .mock("GET", "/calendars/primary/events")
        .match_query(mockito::Matcher::Any)
        .match_header("authorization", "Bearer fresh-token")
        .with_status(200)
        .with_body(r#"{"items": []}"#)
        .create_async()
        .await;

    let tokens = StaticTokens::new();
    let client = client_for(&server, tokens.clone());
    let events = client.fetch_events(day()).await.unwrap();

    assert!(events.is_empty());
    assert_eq!(tokens.refreshed.load(Ordering::SeqCst), 1);
    rejected.assert_async().await;
    accepted.assert_async().await;
}

#[tokio::test]
async fn tasks_without_any_identity_are_skipped() {
    let mut server = Server::new_async().await;
    let _lists = server
        .mock("GET", "/users/@me/lists")
        .with_status(200)
        .with_body(r#"{"items": [{"id": "a", "title": "My Tasks"}]}"#)
        .create_async()
        .await;
    let _tasks = server
        .mock("GET", "/lists/a/tasks")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_body(r#"{"items": [{}, {"id": "t1", "title": "Real"}]}"#)
        .create_async()
        .await;

    let client = client_for(&server, StaticTokens::new());
    let tasks = client.fetch_tasks().await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "Real");
}
