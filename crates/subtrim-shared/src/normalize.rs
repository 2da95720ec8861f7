//! Per-endpoint response records and their normalization rules.
//!
//! Each endpoint returns a concrete typed record built by a constructor that
//! encodes the fallback policy, so the shape cannot drift between endpoints.
//! The records are always fully constructible, even when the extracted
//! object is absent or partially populated.

use crate::coerce::{
    clamp_confidence, normalize_billing_period, safe_truncate, to_nullable_number,
    to_trimmed_string, truthy,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Confidence ceiling applied whenever a suggested link could not be
/// verified live and the search fallback was substituted.
pub const UNVERIFIED_LINK_CONFIDENCE_CAP: f64 = 0.35;

/// Confidence reported on a fully deterministic fallback (upstream gave us
/// nothing usable at all).
pub const FALLBACK_CONFIDENCE: f64 = 0.1;

/// Length cap for free-text notes fields.
pub const NOTES_MAX_LEN: usize = 280;

// ============================================================================
// Subscription classification
// ============================================================================

/// Result of classifying an email as a subscription receipt.
///
/// When the model says it is not a subscription, every AI-derived
/// identification field is nulled. `billing_email` falls back to the
/// verified caller's email when the model omits it, in both branches.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Classification {
    pub is_subscription: bool,
    pub service_name: Option<String>,
    pub plan: Option<String>,
    pub amount: Option<f64>,
    pub currency: Option<String>,
    pub billing_period: Option<String>,
    pub billing_email: Option<String>,
    pub confidence: f64,
}

impl Classification {
    pub fn from_model(obj: &Value, caller_email: Option<&str>) -> Self {
        let is_subscription = truthy(obj.get("is_subscription"));
        let billing_email = to_trimmed_string(obj.get("billing_email"))
            .or_else(|| caller_email.map(str::to_string));
        let confidence = clamp_confidence(obj.get("confidence"));

        if !is_subscription {
            return Self {
                is_subscription: false,
                service_name: None,
                plan: None,
                amount: None,
                currency: None,
                billing_period: None,
                billing_email,
                confidence,
            };
        }

        Self {
            is_subscription: true,
            service_name: to_trimmed_string(obj.get("service_name")),
            plan: to_trimmed_string(obj.get("plan")),
            amount: to_nullable_number(obj.get("amount")),
            currency: to_trimmed_string(obj.get("currency")).map(|c| c.to_uppercase()),
            billing_period: normalize_billing_period(obj.get("billing_period")),
            billing_email,
            confidence,
        }
    }
}

// ============================================================================
// Price suggestion
// ============================================================================

/// Typical-price lookup for a subscription in a country. Cached upstream of
/// this type by (name, country).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PriceSuggestion {
    pub subscription_name: String,
    pub country_code: String,
    /// Accepted only when the coerced number is >= 0.
    pub monthly: Option<f64>,
    pub currency: Option<String>,
    pub confidence: f64,
    pub notes: String,
}

impl PriceSuggestion {
    pub fn from_model(obj: &Value, name: &str, country: &str) -> Self {
        Self {
            subscription_name: name.to_string(),
            country_code: country.to_string(),
            monthly: to_nullable_number(obj.get("monthly")).filter(|m| *m >= 0.0),
            currency: to_trimmed_string(obj.get("currency")).map(|c| c.to_uppercase()),
            confidence: clamp_confidence(obj.get("confidence")),
            notes: safe_truncate(obj.get("notes"), NOTES_MAX_LEN),
        }
    }
}

// ============================================================================
// Cancellation contact
// ============================================================================

/// Where to reach a service to cancel. Never fails the caller's flow: when
/// the upstream reply is unusable this is built deterministically from the
/// caller's input alone.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CancelContact {
    pub email: Option<String>,
    #[serde(rename = "cancelURL")]
    pub cancel_url: Option<String>,
    pub confidence: f64,
    pub notes: String,
}

impl CancelContact {
    pub fn from_model(obj: &Value) -> Self {
        Self {
            email: to_trimmed_string(obj.get("email")),
            cancel_url: to_trimmed_string(obj.get("cancelURL"))
                .or_else(|| to_trimmed_string(obj.get("cancel_url"))),
            confidence: clamp_confidence(obj.get("confidence")),
            notes: safe_truncate(obj.get("notes"), NOTES_MAX_LEN),
        }
    }

    /// Deterministic fallback when the upstream reply was unusable.
    pub fn fallback(subscription_name: &str) -> Self {
        Self {
            email: None,
            cancel_url: Some(search_fallback_url(subscription_name)),
            confidence: FALLBACK_CONFIDENCE,
            notes: "Could not look up verified cancellation details; \
                    the link below searches for the official cancellation page."
                .to_string(),
        }
    }
}

// ============================================================================
// Cancellation email draft
// ============================================================================

/// Caller-supplied fields used both in the prompt and in the deterministic
/// fallback draft.
#[derive(Debug, Clone)]
pub struct DraftContext {
    pub subscription_name: String,
    pub user_name: Option<String>,
    pub account_email: Option<String>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DraftEmail {
    pub subject: String,
    pub body: String,
}

impl DraftEmail {
    /// Per-field fallback: a missing subject or body is replaced by its
    /// deterministic counterpart, not the whole draft.
    pub fn from_model(obj: &Value, ctx: &DraftContext) -> Self {
        let fallback = Self::fallback(ctx);
        Self {
            subject: to_trimmed_string(obj.get("subject")).unwrap_or(fallback.subject),
            body: to_trimmed_string(obj.get("body")).unwrap_or(fallback.body),
        }
    }

    /// Fully deterministic draft built from caller input only.
    pub fn fallback(ctx: &DraftContext) -> Self {
        let name = ctx.subscription_name.trim();
        let mut body = format!(
            "Hello,\n\nI would like to cancel my {name} subscription, effective immediately.\n"
        );
        if let Some(email) = ctx.account_email.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            body.push_str(&format!("The account is registered under {email}.\n"));
        }
        if let Some(reason) = ctx.reason.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            body.push_str(&format!("Reason: {reason}.\n"));
        }
        body.push_str("\nPlease confirm the cancellation in writing.\n\nThank you,\n");
        body.push_str(
            ctx.user_name
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or("A customer"),
        );
        Self {
            subject: format!("Request to cancel my {name} subscription"),
            body,
        }
    }
}

// ============================================================================
// Combined cancel assist
// ============================================================================

/// Combined contact lookup plus email draft, built from a single model
/// reply.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CancelAssist {
    pub contact: CancelContact,
    pub draft: DraftEmail,
}

impl CancelAssist {
    pub fn from_model(obj: &Value, ctx: &DraftContext) -> Self {
        Self {
            contact: CancelContact::from_model(obj),
            draft: DraftEmail::from_model(obj, ctx),
        }
    }
}

// ============================================================================
// Search fallback link
// ============================================================================

/// Guaranteed-non-dead substitute link for an unverifiable cancellation URL.
pub fn search_fallback_url(subscription_name: &str) -> String {
    let name = subscription_name.trim();
    let query = if name.is_empty() {
        "cancel subscription".to_string()
    } else {
        format!("cancel {name} subscription")
    };
    format!("https://www.google.com/search?q={}", encode_query(&query))
}

/// Minimal application/x-www-form-urlencoded query encoding.
fn encode_query(q: &str) -> String {
    let mut out = String::with_capacity(q.len());
    for b in q.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}
