//! API routes for subtrimd.
//!
//! Handlers assemble a prompt, consult the cache where one exists, invoke
//! the completion collaborator, and delegate shaping to the normalizers in
//! subtrim-shared. Identity-gated routes verify the bearer token before any
//! external call. Status mapping lives in `error::HttpError`, nowhere else.

use crate::auth::{bearer_token, IdentityClaims};
use crate::error::{HandlerResult, HttpError};
use crate::liveness::Liveness;
use crate::prompts;
use crate::server::AppState;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use subtrim_shared::{
    extract_object, search_fallback_url, ApiError, CancelAssist, CancelContact, Classification,
    DraftEmail, PriceSuggestion, UNVERIFIED_LINK_CONFIDENCE_CAP,
};
use subtrim_shared::normalize::DraftContext;
use subtrim_shared::coerce::normalize_country_code;
use tracing::{info, warn};

type AppStateArc = Arc<AppState>;

// ============================================================================
// Health Routes
// ============================================================================

pub fn health_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/", get(root))
        .route("/healthz", get(healthz))
}

async fn root() -> &'static str {
    "ok"
}

#[derive(Debug, Clone, Serialize)]
struct HealthResponse {
    ok: bool,
    version: String,
    started_at: String,
}

async fn healthz(State(state): State<AppStateArc>) -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        started_at: state.started_at.to_rfc3339(),
    })
}

/// Fallback for unmatched routes.
pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" })))
}

// ============================================================================
// Identity-gated Routes
// ============================================================================

pub fn classify_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/v1/classifySubscription", post(classify_subscription))
        .route("/v1/deleteMyData", post(delete_my_data))
}

#[derive(Debug, Clone, Deserialize)]
struct ClassifyRequest {
    subject: Option<String>,
    from: Option<String>,
    excerpt: Option<String>,
}

async fn classify_subscription(
    State(state): State<AppStateArc>,
    headers: HeaderMap,
    Json(req): Json<ClassifyRequest>,
) -> HandlerResult<Classification> {
    // Auth precedes validation and any external call.
    let claims = authenticate(&state, &headers).await?;

    let subject = require_field(req.subject.as_deref(), "subject")?;
    let from = require_field(req.from.as_deref(), "from")?;
    let excerpt = require_field(req.excerpt.as_deref(), "excerpt")?;

    let prompt = prompts::classify_subscription(&subject, &from, &excerpt);
    let raw = state.completion.complete(&prompt).await?;
    // Fail loudly: a reply with no usable JSON is a 502 with a preview.
    let obj = extract_object(&raw)?;

    let result = Classification::from_model(&obj, claims.email.as_deref());
    info!(
        "classified '{}' as subscription={} (confidence {:.2})",
        subject, result.is_subscription, result.confidence
    );
    Ok(Json(result))
}

async fn delete_my_data(
    State(state): State<AppStateArc>,
    headers: HeaderMap,
) -> HandlerResult<Value> {
    let claims = authenticate(&state, &headers).await?;
    // No persistence exists; this is a verified acknowledgment.
    info!(
        "delete-my-data acknowledged for {}",
        claims.email.as_deref().unwrap_or("<no email claim>")
    );
    Ok(Json(json!({ "ok": true, "deleted": true })))
}

async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<IdentityClaims, HttpError> {
    let header = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    let token = bearer_token(header)?;
    Ok(state.verifier.verify(token).await?)
}

// ============================================================================
// Assist Routes
// ============================================================================

pub fn assist_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/api/price-suggest", post(price_suggest))
        .route("/api/cancel-contact", post(cancel_contact))
        .route("/api/draft-cancel-email", post(draft_cancel_email))
        .route("/api/cancel-assist", post(cancel_assist))
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupRequest {
    subscription_name: Option<String>,
    country_code: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct PriceResponse {
    #[serde(flatten)]
    suggestion: PriceSuggestion,
    cache_hit: bool,
}

async fn price_suggest(
    State(state): State<AppStateArc>,
    Json(req): Json<LookupRequest>,
) -> HandlerResult<PriceResponse> {
    let name = require_field(req.subscription_name.as_deref(), "subscriptionName")?;
    let country = normalize_country_code(req.country_code.as_deref());

    let key = crate::cache::PriceCache::key(&name, &country);
    if let Some(suggestion) = state.price_cache.get(&key).await {
        info!("price cache hit for {}", key);
        return Ok(Json(PriceResponse { suggestion, cache_hit: true }));
    }

    let prompt = prompts::price_suggest(&name, &country);
    let raw = state.completion.complete(&prompt).await?;
    let obj = extract_object(&raw)?;

    let suggestion = PriceSuggestion::from_model(&obj, &name, &country);
    state.price_cache.put(&key, suggestion.clone()).await;
    Ok(Json(PriceResponse { suggestion, cache_hit: false }))
}

async fn cancel_contact(
    State(state): State<AppStateArc>,
    Json(req): Json<LookupRequest>,
) -> Json<CancelContact> {
    // Never fails the caller's flow: every failure path collapses into the
    // deterministic fallback.
    let name = req.subscription_name.as_deref().unwrap_or("").trim().to_string();
    let country = normalize_country_code(req.country_code.as_deref());

    if name.is_empty() {
        return Json(CancelContact::fallback(&name));
    }

    let contact = match lookup_contact(&state, &name, &country).await {
        Ok(contact) => verify_contact_link(&state, contact, &name).await,
        Err(e) => {
            warn!("cancel-contact falling back for '{}': {}", name, e);
            CancelContact::fallback(&name)
        }
    };
    Json(contact)
}

async fn lookup_contact(state: &AppState, name: &str, country: &str) -> Result<CancelContact, ApiError> {
    let prompt = prompts::cancel_contact(name, country);
    let raw = state.completion.complete(&prompt).await?;
    let obj = extract_object(&raw)?;
    Ok(CancelContact::from_model(&obj))
}

/// Probe the suggested link. Anything short of a confirmed-live answer swaps
/// in the search fallback and caps confidence to signal the link is
/// unverified.
async fn verify_contact_link(
    state: &AppState,
    mut contact: CancelContact,
    name: &str,
) -> CancelContact {
    let candidate = contact.cancel_url.clone().unwrap_or_default();
    let verdict = state.liveness.check(&candidate).await;
    match verdict.liveness {
        Liveness::Reachable => {
            if let Some(final_url) = verdict.final_url {
                contact.cancel_url = Some(final_url);
            }
        }
        Liveness::Unreachable | Liveness::Indeterminate => {
            contact.cancel_url = Some(search_fallback_url(name));
            contact.confidence = contact.confidence.min(UNVERIFIED_LINK_CONFIDENCE_CAP);
        }
    }
    contact
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DraftRequest {
    subscription_name: Option<String>,
    user_name: Option<String>,
    account_email: Option<String>,
    reason: Option<String>,
}

impl DraftRequest {
    fn into_context(self) -> DraftContext {
        DraftContext {
            subscription_name: self.subscription_name.unwrap_or_default().trim().to_string(),
            user_name: self.user_name,
            account_email: self.account_email,
            reason: self.reason,
        }
    }
}

async fn draft_cancel_email(
    State(state): State<AppStateArc>,
    Json(req): Json<DraftRequest>,
) -> Json<DraftEmail> {
    let ctx = req.into_context();

    let prompt = prompts::draft_cancel_email(&ctx);
    let draft = match state.completion.complete(&prompt).await {
        Ok(raw) => match extract_object(&raw) {
            Ok(obj) => DraftEmail::from_model(&obj, &ctx),
            Err(e) => {
                warn!("draft-cancel-email falling back: {}", e);
                DraftEmail::fallback(&ctx)
            }
        },
        Err(e) => {
            warn!("draft-cancel-email falling back: {}", e);
            DraftEmail::fallback(&ctx)
        }
    };
    Json(draft)
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssistRequest {
    subscription_name: Option<String>,
    country_code: Option<String>,
    user_name: Option<String>,
    account_email: Option<String>,
}

async fn cancel_assist(
    State(state): State<AppStateArc>,
    Json(req): Json<AssistRequest>,
) -> HandlerResult<CancelAssist> {
    let name = require_field(req.subscription_name.as_deref(), "subscriptionName")?;
    let country = normalize_country_code(req.country_code.as_deref());
    let ctx = DraftContext {
        subscription_name: name.clone(),
        user_name: req.user_name,
        account_email: req.account_email,
        reason: None,
    };

    let prompt = prompts::cancel_assist(&name, &country, &ctx);
    let raw = state.completion.complete(&prompt).await?;
    // Fail loudly, unlike the single-purpose assist endpoints.
    let obj = extract_object(&raw)?;

    let CancelAssist { contact, draft } = CancelAssist::from_model(&obj, &ctx);
    let contact = verify_contact_link(&state, contact, &name).await;
    Ok(Json(CancelAssist { contact, draft }))
}

// ============================================================================
// Shared helpers
// ============================================================================

fn require_field(value: Option<&str>, field: &str) -> Result<String, ApiError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => Ok(v.to_string()),
        None => Err(ApiError::bad_request(format!("missing required field: {field}"))),
    }
}
