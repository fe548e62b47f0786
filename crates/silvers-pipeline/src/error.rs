use thiserror::Error;

/// Errors returned by the pipeline client.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a non-2xx status.
    #[error("pipeline endpoint returned HTTP {status}: {body}")]
    Transport { status: u16, body: String },

    /// A 2xx response whose envelope lacks the expected `ok` result or rows.
    #[error("protocol error in {context}: {reason}")]
    Protocol { context: String, reason: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The base URL handed to the client is not a valid URL.
    #[error("invalid pipeline URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl PipelineError {
    pub(crate) fn protocol(context: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Protocol {
            context: context.into(),
            reason: reason.into(),
        }
    }

    /// Returns `true` for failures raised after the request reached the
    /// endpoint (HTTP status or envelope problems) rather than before it.
    #[must_use]
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Protocol { .. })
    }
}
