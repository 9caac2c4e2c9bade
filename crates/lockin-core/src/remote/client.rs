//! HTTP client for the remote query backend.
//!
//! Every backend operation is a named query executed with
//! `POST {base_url}/{query}/execute` and a JSON parameter object.
//! Responses share one envelope: `{ "success": bool, "data": ..., "error": ... }`.

use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, warn};
use url::Url;

use super::records::{self, RecordKind};
use crate::error::{RemoteError, Result, ValidationError};
use crate::storage::RemoteConfig;

/// Response envelope shared by every query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct QueryClient {
    http: Client,
    base_url: Url,
    auth_token: String,
}

impl QueryClient {
    pub fn new(base_url: &str, auth_token: impl Into<String>, timeout: Duration) -> Result<Self> {
        // Trailing slash so `join` appends instead of replacing the last segment.
        let normalized = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalized)
            .map_err(|e| RemoteError::InvalidEndpoint(format!("{base_url}: {e}")))?;
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(RemoteError::Http)?;
        Ok(Self {
            http,
            base_url,
            auth_token: auth_token.into(),
        })
    }

    pub fn from_config(config: &RemoteConfig) -> Result<Self> {
        Self::new(
            &config.base_url,
            config.resolved_token(),
            Duration::from_secs(config.timeout_secs.max(1)),
        )
    }

    fn endpoint(&self, query: &str) -> std::result::Result<Url, RemoteError> {
        if query.is_empty() || query.contains('/') {
            return Err(RemoteError::InvalidEndpoint(format!(
                "bad query name: {query:?}"
            )));
        }
        self.base_url
            .join(&format!("{query}/execute"))
            .map_err(|e| RemoteError::InvalidEndpoint(e.to_string()))
    }

    /// Run `query` and return the raw envelope. Only transport errors and
    /// non-success HTTP statuses are errors here.
    pub async fn execute(
        &self,
        query: &str,
        params: &Value,
    ) -> std::result::Result<QueryResponse, RemoteError> {
        let url = self.endpoint(query)?;
        let body = if params.is_null() {
            Value::Object(Map::new())
        } else {
            params.clone()
        };

        debug!(%url, query, "executing remote query");
        let resp = self
            .http
            .post(url)
            .header("auth", &self.auth_token)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            warn!(query, status = status.as_u16(), "remote query failed");
            return Err(RemoteError::Status {
                query: query.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(resp.json::<QueryResponse>().await?)
    }

    /// Run `query` and return its `data`, turning `success: false` into an error.
    pub async fn fetch(&self, query: &str, params: &Value) -> Result<Value> {
        let response = self.execute(query, params).await?;
        if !response.success {
            return Err(RemoteError::Rejected {
                query: query.to_string(),
                message: response
                    .error
                    .unwrap_or_else(|| "no error message".to_string()),
            }
            .into());
        }
        Ok(response.data)
    }

    /// Run a query returning records of `kind`, normalized to a canonical `id`.
    pub async fn fetch_records(
        &self,
        query: &str,
        params: &Value,
        kind: RecordKind,
    ) -> Result<Vec<Value>> {
        let data = self.fetch(query, params).await?;
        records::normalize_all(kind, data)
    }

    /// Check credentials with `login-user`. Returns `None` when the backend
    /// knows no such user.
    pub async fn login(&self, email: &str, password: &str) -> Result<Option<Value>> {
        validate_login(email, password)?;
        let users = self
            .fetch_records(
                "login-user",
                &json!({ "email": email, "password": password }),
                RecordKind::User,
            )
            .await?;
        Ok(users.into_iter().next())
    }
}

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S+@\S+\.\S+").unwrap());

fn validate_login(email: &str, password: &str) -> std::result::Result<(), ValidationError> {
    let invalid = |field: &str, message: &str| ValidationError::InvalidValue {
        field: field.to_string(),
        message: message.to_string(),
    };
    let email = email.trim();
    if email.is_empty() {
        return Err(invalid("email", "required"));
    }
    if !EMAIL_RE.is_match(email) {
        return Err(invalid("email", "not an email address"));
    }
    if password.chars().count() < 4 {
        return Err(invalid("password", "must be at least 4 characters"));
    }
    Ok(())
}

/// Double single quotes so free text survives the backend's SQL templates.
pub fn escape_sql_literal(text: &str) -> String {
    text.replace('\'', "''")
}
