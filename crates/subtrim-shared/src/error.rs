//! Error types for subtrim.
//!
//! Pipeline stages return these as values; only the daemon's axum boundary
//! turns them into HTTP statuses.

use thiserror::Error;

/// Maximum characters of raw model output carried in an upstream-format
/// error. Bounds both log lines and 502 response bodies.
pub const RAW_PREVIEW_LEN: usize = 500;

/// Failure modes of the extraction pipeline. Finding no object at all and
/// finding one that does not parse are distinct outcomes.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractError {
    #[error("no JSON object found in model output")]
    NoJsonFound,

    #[error("model output JSON failed to parse: {preview}")]
    InvalidJson { preview: String },
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("server misconfigured: {0}")]
    Misconfigured(String),

    #[error("upstream output had no usable JSON: {preview}")]
    UpstreamFormat { preview: String },

    #[error("upstream failure: {0}")]
    Upstream(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    /// Build an upstream-format error from raw model output, truncating the
    /// attached preview.
    pub fn upstream_format(raw: &str) -> Self {
        Self::UpstreamFormat {
            preview: truncate_preview(raw),
        }
    }
}

/// Truncate raw model output to a bounded, char-safe preview.
pub fn truncate_preview(raw: &str) -> String {
    if raw.chars().count() <= RAW_PREVIEW_LEN {
        raw.to_string()
    } else {
        raw.chars().take(RAW_PREVIEW_LEN).collect()
    }
}
