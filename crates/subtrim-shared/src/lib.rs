//! Shared contracts for subtrim.
//!
//! Everything in this crate is pure: the error taxonomy, the model-output
//! extraction step, the field coercion rules, and the per-endpoint response
//! records. No HTTP types and no I/O live here; the daemon maps errors to
//! statuses at its boundary.

pub mod coerce;
pub mod error;
pub mod extract;
pub mod normalize;

pub use error::{ApiError, ExtractError, RAW_PREVIEW_LEN};
pub use extract::{decode_candidate, extract_candidate, extract_object};
pub use normalize::{
    CancelAssist, CancelContact, Classification, DraftContext, DraftEmail, PriceSuggestion,
    search_fallback_url, UNVERIFIED_LINK_CONFIDENCE_CAP,
};
