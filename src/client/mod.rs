// File: ./src/client/mod.rs
pub mod auth;
pub mod core;

pub use crate::client::auth::{StoredTokens, TokenProvider};
pub use crate::client::core::AgendaClient;

use crate::model::{Event, TaskItem};
use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

/// Failure obtaining or refreshing a credential. Fatal to the current job,
/// never to the process.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("no stored credentials: {0}")]
    Missing(String),
    #[error("token refresh failed: {0}")]
    RefreshFailed(String),
}

/// Failure of a single source fetch. One failed source degrades to an empty
/// result with a warning; it never aborts the other source.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("credential error: {0}")]
    Credential(#[from] CredentialError),
    #[error("request failed: {0}")]
    Request(String),
    #[error("provider returned HTTP {0}")]
    Status(u16),
    #[error("malformed provider response: {0}")]
    Decode(String),
    #[error("request timed out after {0}s")]
    Timeout(u64),
}

/// Source of calendar events for a given day. Provider order (assumed
/// chronological) is passed through unchanged.
#[async_trait]
pub trait EventSource: Send + Sync {
    async fn fetch_events(&self, date: NaiveDate) -> Result<Vec<Event>, FetchError>;
}

/// Source of open to-do items, flattened across all task lists.
#[async_trait]
pub trait TaskSource: Send + Sync {
    async fn fetch_tasks(&self) -> Result<Vec<TaskItem>, FetchError>;
}
