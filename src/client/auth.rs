// File: src/client/auth.rs
//! Stored-token credential provider.
//!
//! Dayslip never runs an interactive consent flow; it expects a token file
//! (written by an external helper) holding an access token, a refresh token
//! and the OAuth client identity. When the access token is expired, or a
//! provider answers 401, the token is refreshed against the token endpoint
//! exactly once per request and the file is rewritten.

use crate::client::CredentialError;
use crate::client::core::{HttpsClient, build_https_client};
use crate::context::AppContext;
use async_trait::async_trait;
use chrono::Utc;
use http::{Method, Request};
use http_body_util::BodyExt;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Supplies a valid bearer token on demand.
///
/// `bearer()` returns the current token, refreshing first when it is known
/// to be expired. `refresh()` forces a refresh; the client calls it once
/// when a provider answers 401 despite a seemingly-valid token.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn bearer(&self) -> Result<String, CredentialError>;
    async fn refresh(&self) -> Result<String, CredentialError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TokenFile {
    access_token: String,
    refresh_token: String,
    /// Unix timestamp (seconds) after which `access_token` is stale.
    expires_at: i64,
    client_id: String,
    client_secret: String,
}

#[derive(Deserialize)]
struct RefreshResponse {
    access_token: String,
    expires_in: Option<i64>,
}

/// `TokenProvider` backed by a JSON token file in the data directory.
pub struct StoredTokens {
    path: PathBuf,
    token_url: String,
    http: HttpsClient,
    state: Mutex<Option<TokenFile>>,
}

impl StoredTokens {
    pub fn new(ctx: &dyn AppContext, token_url: &str) -> Result<Arc<Self>, CredentialError> {
        let path = ctx
            .get_token_path()
            .ok_or_else(|| CredentialError::Missing("no data directory".to_string()))?;
        Ok(Arc::new(Self {
            path,
            token_url: token_url.to_string(),
            http: build_https_client(),
            state: Mutex::new(None),
        }))
    }

    fn load_file(&self) -> Result<TokenFile, CredentialError> {
        let contents = std::fs::read_to_string(&self.path).map_err(|e| {
            CredentialError::Missing(format!("cannot read {}: {}", self.path.display(), e))
        })?;
        serde_json::from_str(&contents).map_err(|e| {
            CredentialError::Missing(format!("cannot parse {}: {}", self.path.display(), e))
        })
    }

    fn save_file(&self, file: &TokenFile) {
        // Losing the rewrite only costs an extra refresh next run.
        match serde_json::to_string_pretty(file) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&self.path, json) {
                    log::warn!("Failed to persist refreshed token: {}", e);
                }
            }
            Err(e) => log::warn!("Failed to serialize token file: {}", e),
        }
    }

    async fn refresh_inner(&self, file: &mut TokenFile) -> Result<(), CredentialError> {
        let body = format!(
            "grant_type=refresh_token&refresh_token={}&client_id={}&client_secret={}",
            file.refresh_token, file.client_id, file.client_secret
        );

        let request = Request::builder()
            .method(Method::POST)
            .uri(&self.token_url)
            .header(http::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body)
            .map_err(|e| CredentialError::RefreshFailed(e.to_string()))?;

        let response = self
            .http
            .request(request)
            .await
            .map_err(|e| CredentialError::RefreshFailed(e.to_string()))?;

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .map_err(|e| CredentialError::RefreshFailed(e.to_string()))?
            .to_bytes();

        if !status.is_success() {
            return Err(CredentialError::RefreshFailed(format!(
                "token endpoint returned {}",
                status
            )));
        }

        let parsed: RefreshResponse = serde_json::from_slice(&bytes)
            .map_err(|e| CredentialError::RefreshFailed(e.to_string()))?;

        file.access_token = parsed.access_token;
        file.expires_at = Utc::now().timestamp() + parsed.expires_in.unwrap_or(3600);
        self.save_file(file);
        log::info!("Refreshed provider access token");
        Ok(())
    }
}

#[async_trait]
impl TokenProvider for StoredTokens {
    async fn bearer(&self) -> Result<String, CredentialError> {
        let mut state = self.state.lock().await;
        if state.is_none() {
            *state = Some(self.load_file()?);
        }
        let file = state.as_mut().ok_or_else(|| {
            CredentialError::Missing("token state unavailable".to_string())
        })?;

        // 60s slack so a token does not expire mid-request.
        if Utc::now().timestamp() + 60 >= file.expires_at {
            self.refresh_inner(file).await?;
        }
        Ok(file.access_token.clone())
    }

    async fn refresh(&self) -> Result<String, CredentialError> {
        let mut state = self.state.lock().await;
        if state.is_none() {
            *state = Some(self.load_file()?);
        }
        let file = state.as_mut().ok_or_else(|| {
            CredentialError::Missing("token state unavailable".to_string())
        })?;
        self.refresh_inner(file).await?;
        Ok(file.access_token.clone())
    }
}
