//! Link liveness probing.
//!
//! Before a suggested cancellation URL reaches the client it gets a short
//! existence probe. The verdict is three-state: a confirmed dead link and a
//! link we could not check are different outcomes, even though both make the
//! caller substitute the search fallback.

use std::time::Duration;
use tracing::debug;

/// Probe bound; also the bound for the single retry.
pub const PROBE_TIMEOUT: Duration = Duration::from_millis(2500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    /// Probe answered with a 2xx/3xx status
    Reachable,
    /// Probe answered with anything else
    Unreachable,
    /// Probe never got an answer (transport error or timeout)
    Indeterminate,
}

#[derive(Debug, Clone)]
pub struct LivenessVerdict {
    pub liveness: Liveness,
    /// URL after redirects, when the probe got an answer
    pub final_url: Option<String>,
    pub status_code: Option<u16>,
}

impl LivenessVerdict {
    pub fn is_reachable(&self) -> bool {
        self.liveness == Liveness::Reachable
    }

    fn unanswered(liveness: Liveness) -> Self {
        Self {
            liveness,
            final_url: None,
            status_code: None,
        }
    }
}

pub struct LinkLivenessChecker {
    client: reqwest::Client,
}

impl LinkLivenessChecker {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(PROBE_TIMEOUT)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .expect("liveness probe client");
        Self { client }
    }

    /// Classify a candidate URL. Empty input short-circuits to unreachable
    /// without touching the network. Servers that reject HEAD (403/405) get
    /// one GET retry under a fresh bound. Never returns an error.
    pub async fn check(&self, candidate: &str) -> LivenessVerdict {
        let candidate = candidate.trim();
        if candidate.is_empty() {
            return LivenessVerdict::unanswered(Liveness::Unreachable);
        }
        let Some(url) = ensure_scheme(candidate) else {
            debug!("refusing to probe non-http candidate {}", candidate);
            return LivenessVerdict::unanswered(Liveness::Unreachable);
        };

        match self.probe(reqwest::Method::HEAD, &url).await {
            Ok(verdict) if matches!(verdict.status_code, Some(403) | Some(405)) => {
                debug!("HEAD rejected for {}, retrying with GET", url);
                match self.probe(reqwest::Method::GET, &url).await {
                    Ok(verdict) => verdict,
                    Err(e) => {
                        debug!("GET probe failed for {}: {}", url, e);
                        LivenessVerdict::unanswered(Liveness::Indeterminate)
                    }
                }
            }
            Ok(verdict) => verdict,
            Err(e) => {
                debug!("HEAD probe failed for {}: {}", url, e);
                LivenessVerdict::unanswered(Liveness::Indeterminate)
            }
        }
    }

    async fn probe(&self, method: reqwest::Method, url: &str) -> Result<LivenessVerdict, reqwest::Error> {
        let response = self.client.request(method, url).send().await?;
        let status = response.status().as_u16();
        let liveness = if (200..400).contains(&status) {
            Liveness::Reachable
        } else {
            Liveness::Unreachable
        };
        Ok(LivenessVerdict {
            liveness,
            final_url: Some(response.url().to_string()),
            status_code: Some(status),
        })
    }
}

impl Default for LinkLivenessChecker {
    fn default() -> Self {
        Self::new()
    }
}

/// Bare domains get a secure scheme prepended. Candidates carrying a
/// non-http scheme (ftp://, mailto:, tel:) are not probeable and yield None.
/// A bare `host:port` is still a domain, not a scheme.
pub fn ensure_scheme(candidate: &str) -> Option<String> {
    let lower = candidate.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return Some(candidate.to_string());
    }
    if lower.contains("://") || lower.starts_with("mailto:") || lower.starts_with("tel:") {
        return None;
    }
    Some(format!("https://{candidate}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::{get, on, MethodFilter};
    use axum::Router;
    use std::future::IntoFuture;
    use std::net::SocketAddr;

    async fn serve(router: Router) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(axum::serve(listener, router).into_future());
        addr
    }

    #[test]
    fn scheme_is_prepended_for_bare_domains() {
        assert_eq!(
            ensure_scheme("netflix.com/cancel").as_deref(),
            Some("https://netflix.com/cancel")
        );
        assert_eq!(
            ensure_scheme("a.test:8080/x").as_deref(),
            Some("https://a.test:8080/x")
        );
        assert_eq!(ensure_scheme("http://a.test").as_deref(), Some("http://a.test"));
        assert_eq!(ensure_scheme("HTTPS://a.test").as_deref(), Some("HTTPS://a.test"));
    }

    #[test]
    fn non_http_schemes_are_rejected() {
        assert_eq!(ensure_scheme("ftp://files.a.test/x"), None);
        assert_eq!(ensure_scheme("mailto:support@a.test"), None);
        assert_eq!(ensure_scheme("tel:+15551234567"), None);
    }

    #[tokio::test]
    async fn non_http_url_is_unreachable_without_network() {
        let checker = LinkLivenessChecker::new();
        let verdict = checker.check("ftp://files.a.test/x").await;
        assert_eq!(verdict.liveness, Liveness::Unreachable);
        assert_eq!(verdict.status_code, None);
    }

    #[tokio::test]
    async fn empty_url_is_unreachable_without_network() {
        let checker = LinkLivenessChecker::new();
        let verdict = checker.check("   ").await;
        assert_eq!(verdict.liveness, Liveness::Unreachable);
        assert_eq!(verdict.status_code, None);
    }

    #[tokio::test]
    async fn ok_url_is_reachable() {
        let addr = serve(Router::new().route("/cancel", get(|| async { "ok" }))).await;
        let checker = LinkLivenessChecker::new();
        let verdict = checker.check(&format!("http://{addr}/cancel")).await;
        assert_eq!(verdict.liveness, Liveness::Reachable);
        assert_eq!(verdict.status_code, Some(200));
        assert!(verdict.final_url.unwrap().ends_with("/cancel"));
    }

    #[tokio::test]
    async fn gone_url_is_unreachable() {
        let addr = serve(Router::new().route("/gone", get(|| async { StatusCode::GONE }))).await;
        let checker = LinkLivenessChecker::new();
        let verdict = checker.check(&format!("http://{addr}/gone")).await;
        assert_eq!(verdict.liveness, Liveness::Unreachable);
        assert_eq!(verdict.status_code, Some(410));
    }

    #[tokio::test]
    async fn head_rejection_retries_with_get() {
        // MethodFilter::GET alone means HEAD gets a 405, which must trigger
        // the GET retry.
        let addr = serve(Router::new().route(
            "/strict",
            on(MethodFilter::GET, || async { "ok" }),
        ))
        .await;
        let checker = LinkLivenessChecker::new();
        let verdict = checker.check(&format!("http://{addr}/strict")).await;
        assert_eq!(verdict.liveness, Liveness::Reachable);
        assert_eq!(verdict.status_code, Some(200));
    }

    #[tokio::test]
    async fn connection_refused_is_indeterminate() {
        // Bind then drop a listener so the port is very likely closed.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let checker = LinkLivenessChecker::new();
        let verdict = checker.check(&format!("http://{addr}/")).await;
        assert_eq!(verdict.liveness, Liveness::Indeterminate);
    }
}
