//! HTTP client for the SQL-over-HTTP pipeline endpoint.
//!
//! Every call is one `POST` of a [`PipelineRequest`] carrying a single
//! `execute` or `batch` request. The client checks the HTTP status, then the
//! envelope's first `results` entry, and surfaces any mismatch as a typed
//! [`PipelineError`]. There are no retries: a failed write is reported to the
//! caller, who decides whether resubmitting is safe.

use std::time::Duration;

use reqwest::{Client, Url};
use silvers_core::AppConfig;

use crate::decode::{decode_rows, Record};
use crate::error::PipelineError;
use crate::types::{
    BatchResult, BatchStep, ExecuteResult, PipelineRequest, PipelineResponse, Statement,
    StreamResult,
};

/// Client for one pipeline endpoint.
///
/// Constructed once at startup and passed by reference to the catalog and
/// checkout layers. Use [`PipelineClient::from_config`] in production or
/// [`PipelineClient::new`] to point at a mock server in tests.
#[derive(Clone)]
pub struct PipelineClient {
    client: Client,
    url: Url,
    auth_token: Option<String>,
}

impl std::fmt::Debug for PipelineClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineClient")
            .field("url", &self.url.as_str())
            .field("auth_token", &self.auth_token.as_ref().map(|_| "[redacted]"))
            .finish_non_exhaustive()
    }
}

impl PipelineClient {
    /// Creates a client for the pipeline endpoint at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidUrl`] if `url` does not parse, or
    /// [`PipelineError::Http`] if the underlying `reqwest::Client` cannot be
    /// constructed.
    pub fn new(
        url: &str,
        auth_token: Option<&str>,
        timeout_secs: u64,
    ) -> Result<Self, PipelineError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("silvers/0.1 (storefront)")
            .build()?;

        let url = Url::parse(url.trim()).map_err(|e| PipelineError::InvalidUrl {
            url: url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            url,
            auth_token: auth_token
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_owned),
        })
    }

    /// Creates a client from the loaded application config.
    ///
    /// # Errors
    ///
    /// See [`PipelineClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, PipelineError> {
        Self::new(
            &config.pipeline_url,
            config.auth_token.as_deref(),
            config.request_timeout_secs,
        )
    }

    /// The endpoint this client posts to.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Executes one statement and returns its raw result.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::Http`] on network failure or timeout.
    /// - [`PipelineError::Transport`] on a non-2xx status.
    /// - [`PipelineError::Deserialize`] if the body is not a pipeline envelope.
    /// - [`PipelineError::Protocol`] if the envelope has no results, the first
    ///   result is not `ok`, or it carries no result payload.
    pub async fn execute(&self, stmt: Statement) -> Result<ExecuteResult, PipelineError> {
        let label = stmt.label();
        tracing::debug!(sql = %label, args = stmt.args.len(), "executing statement");

        let envelope = self.send_pipeline(&PipelineRequest::execute(stmt)).await?;
        let payload = Self::first_ok_payload(envelope, &label)?;
        serde_json::from_value(payload).map_err(|e| PipelineError::Deserialize {
            context: label,
            source: e,
        })
    }

    /// Executes a query and decodes its rows.
    ///
    /// # Errors
    ///
    /// Everything [`PipelineClient::execute`] returns, plus
    /// [`PipelineError::Protocol`] when the result has no `rows` key.
    pub async fn query(&self, stmt: Statement) -> Result<Vec<Record>, PipelineError> {
        let label = stmt.label();
        let result = self.execute(stmt).await?;
        if result.rows.is_none() {
            return Err(PipelineError::protocol(label, "result carried no rows"));
        }
        let records = decode_rows(&result);
        tracing::debug!(sql = %label, rows = records.len(), "query returned");
        Ok(records)
    }

    /// Runs a conditional batch in one round trip.
    ///
    /// A step that fails inside the batch is reported through
    /// [`BatchResult::step_errors`], not as an `Err`; callers inspect the
    /// per-step outcome themselves.
    ///
    /// # Errors
    ///
    /// Same transport and envelope errors as [`PipelineClient::execute`].
    pub async fn batch(&self, steps: Vec<BatchStep>) -> Result<BatchResult, PipelineError> {
        let label = format!("batch of {} steps", steps.len());
        tracing::debug!(steps = steps.len(), "executing batch");

        let envelope = self.send_pipeline(&PipelineRequest::batch(steps)).await?;
        let payload = Self::first_ok_payload(envelope, &label)?;
        serde_json::from_value(payload).map_err(|e| PipelineError::Deserialize {
            context: label,
            source: e,
        })
    }

    /// POSTs a pipeline body and parses the envelope without interpreting it.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Http`] on network failure,
    /// [`PipelineError::Transport`] on a non-2xx status, or
    /// [`PipelineError::Deserialize`] if the body is not a pipeline envelope.
    pub async fn send_pipeline(
        &self,
        request: &PipelineRequest,
    ) -> Result<PipelineResponse, PipelineError> {
        let mut builder = self.client.post(self.url.clone()).json(request);
        if let Some(token) = &self.auth_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "pipeline endpoint returned error status");
            return Err(PipelineError::Transport {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| PipelineError::Deserialize {
            context: self.url.to_string(),
            source: e,
        })
    }

    /// Extracts the `result` payload of the first `ok` entry.
    fn first_ok_payload(
        envelope: PipelineResponse,
        label: &str,
    ) -> Result<serde_json::Value, PipelineError> {
        let Some(first) = envelope.results.into_iter().next() else {
            return Err(PipelineError::protocol(label, "response carried no results"));
        };
        let StreamResult {
            kind,
            response,
            error,
        } = first;

        if kind != "ok" {
            let reason = error.map_or_else(
                || format!("result type was \"{kind}\""),
                |e| e.to_string(),
            );
            return Err(PipelineError::protocol(label, reason));
        }

        response
            .and_then(|r| r.result)
            .filter(|r| !r.is_null())
            .ok_or_else(|| PipelineError::protocol(label, "ok result carried no payload"))
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
