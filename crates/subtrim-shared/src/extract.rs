//! Extracting a JSON object embedded in free-form model output.
//!
//! The completion collaborator returns prose with, hopefully, one JSON
//! object somewhere in it. The scan is a textual heuristic: the substring
//! from the first `{` to the last `}`, inclusive. Nested objects inside the
//! single top-level object are covered because the outermost brace positions
//! are used; stray braces in surrounding prose are not.

use crate::error::{truncate_preview, ApiError, ExtractError};
use serde_json::Value;

/// Locate the candidate JSON object substring in raw model output.
///
/// Fails with `NoJsonFound` when either brace is missing or the last `}`
/// sits at or before the first `{`.
pub fn extract_candidate(text: &str) -> Result<&str, ExtractError> {
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if end > start => Ok(&text[start..=end]),
        _ => Err(ExtractError::NoJsonFound),
    }
}

/// Strict parse of a candidate substring. A parse failure carries a bounded
/// preview of the candidate, never the full text.
pub fn decode_candidate(candidate: &str) -> Result<Value, ExtractError> {
    serde_json::from_str(candidate).map_err(|_| ExtractError::InvalidJson {
        preview: truncate_preview(candidate),
    })
}

/// Full pipeline: scan, then strict parse. No parse is attempted when the
/// scan finds nothing.
pub fn extract_object(text: &str) -> Result<Value, ApiError> {
    match extract_candidate(text) {
        Ok(candidate) => decode_candidate(candidate).map_err(|e| match e {
            ExtractError::InvalidJson { preview } => ApiError::UpstreamFormat { preview },
            ExtractError::NoJsonFound => ApiError::upstream_format(text),
        }),
        Err(ExtractError::NoJsonFound) => Err(ApiError::upstream_format(text)),
        Err(ExtractError::InvalidJson { preview }) => Err(ApiError::UpstreamFormat { preview }),
    }
}
