// File: src/client/core.rs
use crate::client::{EventSource, FetchError, TaskSource, TokenProvider};
use crate::model::{Event, EventStart, TaskItem};

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate, TimeZone};
use futures::stream::{self, StreamExt};
use http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use hyper_rustls::HttpsConnectorBuilder;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

/// How many task lists are fetched in flight at once.
const LIST_FETCH_CONCURRENCY: usize = 4;

pub type HttpsClient = Client<
    hyper_rustls::HttpsConnector<hyper_util::client::legacy::connect::HttpConnector>,
    String,
>;

/// Build the shared HTTPS client: native roots, HTTP/1, plain HTTP allowed
/// (tests run against a local mock server).
pub fn build_https_client() -> HttpsClient {
    let mut root_store = rustls::RootCertStore::empty();
    let result = rustls_native_certs::load_native_certs();
    root_store.add_parsable_certificates(result.certs);
    if root_store.is_empty() {
        log::warn!("No system certificates found; HTTPS requests will fail");
    }

    let tls_config = rustls::ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();

    let https_connector = HttpsConnectorBuilder::new()
        .with_tls_config(tls_config)
        .https_or_http()
        .enable_http1()
        .build();

    Client::builder(TokioExecutor::new()).build(https_connector)
}

/// Percent-encode the characters Google rejects unescaped in query values.
fn encode_query_value(value: &str) -> String {
    value.replace('+', "%2B").replace(':', "%3A")
}

// --- WIRE TYPES ---

#[derive(Deserialize)]
struct EventsResponse {
    items: Option<Vec<RemoteEvent>>,
}

#[derive(Deserialize)]
struct RemoteEvent {
    summary: Option<String>,
    start: Option<RemoteEventStart>,
}

#[derive(Deserialize)]
struct RemoteEventStart {
    #[serde(rename = "dateTime")]
    date_time: Option<String>,
    date: Option<String>,
}

#[derive(Deserialize)]
struct TaskListsResponse {
    items: Option<Vec<RemoteTaskList>>,
}

#[derive(Deserialize, Clone)]
struct RemoteTaskList {
    id: String,
    title: Option<String>,
}

#[derive(Deserialize)]
struct TasksResponse {
    items: Option<Vec<RemoteTask>>,
}

#[derive(Deserialize)]
struct RemoteTask {
    id: Option<String>,
    title: Option<String>,
}

// --- CLIENT ---

/// HTTPS adapter over the calendar and task providers.
///
/// Each fetch is independent; a failure in one source surfaces as a
/// `FetchError` for that source only. Task aggregation is best-effort: a
/// failed sub-list is logged and skipped, the remaining lists still count.
pub struct AgendaClient {
    calendar_url: String,
    tasks_url: String,
    tokens: Arc<dyn TokenProvider>,
    http: HttpsClient,
    timeout_secs: u64,
}

impl AgendaClient {
    pub fn new(
        calendar_url: &str,
        tasks_url: &str,
        tokens: Arc<dyn TokenProvider>,
        timeout_secs: u64,
    ) -> Self {
        Self {
            calendar_url: calendar_url.trim_end_matches('/').to_string(),
            tasks_url: tasks_url.trim_end_matches('/').to_string(),
            tokens,
            http: build_https_client(),
            timeout_secs,
        }
    }

    async fn send(&self, uri: &str, bearer: &str) -> Result<http::Response<hyper::body::Incoming>, FetchError> {
        let request = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .header(
                http::header::AUTHORIZATION,
                format!("Bearer {}", bearer),
            )
            .body(String::new())
            .map_err(|e| FetchError::Request(e.to_string()))?;

        tokio::time::timeout(
            Duration::from_secs(self.timeout_secs),
            self.http.request(request),
        )
        .await
        .map_err(|_| FetchError::Timeout(self.timeout_secs))?
        .map_err(|e| FetchError::Request(e.to_string()))
    }

    /// GET a provider URI, refreshing the credential once on 401.
    async fn get_bytes(&self, uri: &str) -> Result<Vec<u8>, FetchError> {
        let bearer = self.tokens.bearer().await?;
        let mut response = self.send(uri, &bearer).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            log::info!("Provider rejected token; refreshing once");
            let bearer = self.tokens.refresh().await?;
            response = self.send(uri, &bearer).await?;
        }

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))?
            .to_bytes();

        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        Ok(bytes.to_vec())
    }

    async fn list_tasks_for(&self, list: &RemoteTaskList) -> Result<Vec<TaskItem>, FetchError> {
        let uri = format!(
            "{}/lists/{}/tasks?showCompleted=false&showHidden=false",
            self.tasks_url, list.id
        );
        let bytes = self.get_bytes(&uri).await?;
        let parsed: TasksResponse =
            serde_json::from_slice(&bytes).map_err(|e| FetchError::Decode(e.to_string()))?;

        let list_name = list.title.clone();
        let mut out = Vec::new();
        for task in parsed.items.unwrap_or_default() {
            if task.id.is_none() && task.title.is_none() {
                log::warn!(
                    "Skipping malformed task entry in list '{}'",
                    list_name.as_deref().unwrap_or("?")
                );
                continue;
            }
            out.push(TaskItem::new(
                task.id.unwrap_or_default(),
                task.title,
                list_name.clone(),
            ));
        }
        Ok(out)
    }

    async fn events_for(&self, date: NaiveDate) -> Result<Vec<Event>, FetchError> {
        // Local midnight to local end-of-day, per the provider contract.
        let start = local_datetime(date, 0, 0, 0)?;
        let end = local_datetime(date, 23, 59, 59)?;

        let uri = format!(
            "{}/calendars/primary/events?timeMin={}&timeMax={}&singleEvents=true&orderBy=startTime",
            self.calendar_url,
            encode_query_value(&start.to_rfc3339()),
            encode_query_value(&end.to_rfc3339()),
        );

        let bytes = self.get_bytes(&uri).await?;
        let parsed: EventsResponse =
            serde_json::from_slice(&bytes).map_err(|e| FetchError::Decode(e.to_string()))?;

        // Provider order is chronological; pass it through unchanged.
        let mut out = Vec::new();
        for event in parsed.items.unwrap_or_default() {
            match parse_start(event.start.as_ref()) {
                Some(start) => out.push(Event::new(event.summary, start)),
                None => {
                    log::warn!(
                        "Skipping event without a usable start: '{}'",
                        event.summary.as_deref().unwrap_or("?")
                    );
                }
            }
        }
        Ok(out)
    }
}

fn local_datetime(date: NaiveDate, h: u32, m: u32, s: u32) -> Result<DateTime<Local>, FetchError> {
    let naive = date
        .and_hms_opt(h, m, s)
        .ok_or_else(|| FetchError::Request("invalid time of day".to_string()))?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| FetchError::Request("ambiguous local time".to_string()))
}

fn parse_start(start: Option<&RemoteEventStart>) -> Option<EventStart> {
    let start = start?;
    if let Some(dt) = &start.date_time {
        let parsed = DateTime::parse_from_rfc3339(dt).ok()?;
        return Some(EventStart::At(parsed.with_timezone(&Local)));
    }
    if let Some(d) = &start.date {
        let parsed = NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()?;
        return Some(EventStart::AllDay(parsed));
    }
    None
}

#[async_trait]
impl EventSource for AgendaClient {
    async fn fetch_events(&self, date: NaiveDate) -> Result<Vec<Event>, FetchError> {
        self.events_for(date).await
    }
}

#[async_trait]
impl TaskSource for AgendaClient {
    async fn fetch_tasks(&self) -> Result<Vec<TaskItem>, FetchError> {
        let uri = format!("{}/users/@me/lists", self.tasks_url);
        let bytes = self.get_bytes(&uri).await?;
        let parsed: TaskListsResponse =
            serde_json::from_slice(&bytes).map_err(|e| FetchError::Decode(e.to_string()))?;
        let lists = parsed.items.unwrap_or_default();
        log::debug!("Fetched {} task list(s)", lists.len());

        // Best-effort aggregation: a failed list is skipped, not fatal.
        let results: Vec<(RemoteTaskList, Result<Vec<TaskItem>, FetchError>)> =
            stream::iter(lists.into_iter())
                .map(|list| async move {
                    let tasks = self.list_tasks_for(&list).await;
                    (list, tasks)
                })
                .buffered(LIST_FETCH_CONCURRENCY)
                .collect()
                .await;

        let mut all_tasks = Vec::new();
        for (list, result) in results {
            match result {
                Ok(mut tasks) => all_tasks.append(&mut tasks),
                Err(e) => {
                    log::warn!(
                        "Skipping task list '{}': {}",
                        list.title.as_deref().unwrap_or(&list.id),
                        e
                    );
                }
            }
        }
        Ok(all_tasks)
    }
}
