//! HTTP request handlers: scrape endpoint and health check.

use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tracing::{error, warn};

use eapi_exporter_core::collector::ModuleSelection;

use crate::exposition::{self, CONTENT_TYPE_LATEST};
use crate::state::SharedState;

// ============================================================
// Health
// ============================================================

pub(crate) async fn handle_health() -> &'static str {
    "ok"
}

// ============================================================
// Scrape
// ============================================================

#[derive(Debug, Deserialize)]
pub(crate) struct ScrapeQuery {
    pub(crate) target: Option<String>,
    pub(crate) modules: Option<String>,
}

/// `GET /arista?target=<host>[,<host>...]&modules=<list>`
pub(crate) async fn handle_scrape(
    State(state): State<SharedState>,
    Query(query): Query<ScrapeQuery>,
) -> Response {
    let modules = query.modules.as_deref().filter(|m| !m.is_empty());
    if let Some(requested) = modules
        && !is_valid_module_list(requested)
    {
        error!(modules = requested, "invalid modules specified");
        return bad_request("Invalid modules specified".to_string());
    }

    let Some(targets) = parse_targets(query.target.as_deref()) else {
        return bad_request("No target parameter provided!".to_string());
    };

    for target in &targets {
        if let Err(e) = tokio::net::lookup_host((target.as_str(), 0)).await {
            warn!(switch = %target, error = %e, "target does not resolve");
            return bad_request(format!("Target does not exist in DNS: {}", e));
        }
    }

    let selection = ModuleSelection::parse(modules.or(state.default_modules.as_deref()));
    let collector = state.collector.clone();
    let samples =
        match tokio::task::spawn_blocking(move || collector.collect(&targets, &selection)).await {
            Ok(samples) => samples,
            Err(e) => {
                error!(error = %e, "scrape task failed");
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        };

    match exposition::encode(&samples) {
        Ok(body) => ([(header::CONTENT_TYPE, CONTENT_TYPE_LATEST)], body).into_response(),
        Err(e) => {
            error!(error = %e, "failed to encode metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn bad_request(message: String) -> Response {
    (StatusCode::BAD_REQUEST, message).into_response()
}

/// Comma-separated list of ASCII letter runs, like `memory,port`.
fn is_valid_module_list(modules: &str) -> bool {
    modules
        .split(',')
        .all(|name| !name.is_empty() && name.chars().all(|c| c.is_ascii_alphabetic()))
}

/// Splits the target parameter; `None` when no target is named.
fn parse_targets(raw: Option<&str>) -> Option<Vec<String>> {
    let targets: Vec<String> = raw?
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();
    if targets.is_empty() { None } else { Some(targets) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;

    use eapi_exporter_core::collector::{Collector, MockSwitch};

    use crate::state::AppState;

    fn app(switch: MockSwitch, default_modules: Option<&str>) -> axum::Router {
        crate::router(Arc::new(AppState {
            collector: Arc::new(Collector::new(Arc::new(switch))),
            default_modules: default_modules.map(str::to_string),
        }))
    }

    async fn get(app: axum::Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[test]
    fn module_list_validation() {
        assert!(is_valid_module_list("memory"));
        assert!(is_valid_module_list("memory,port,sfp"));
        assert!(is_valid_module_list("bogus"));
        assert!(!is_valid_module_list("memory,"));
        assert!(!is_valid_module_list(",memory"));
        assert!(!is_valid_module_list("memory port"));
        assert!(!is_valid_module_list("mem0ry"));
        assert!(!is_valid_module_list("memory;port"));
    }

    #[test]
    fn target_parsing() {
        assert_eq!(parse_targets(None), None);
        assert_eq!(parse_targets(Some("")), None);
        assert_eq!(parse_targets(Some(" , ")), None);
        assert_eq!(
            parse_targets(Some("sw1, sw2")),
            Some(vec!["sw1".to_string(), "sw2".to_string()])
        );
    }

    #[tokio::test]
    async fn invalid_modules_rejected_before_collection() {
        let switch = MockSwitch::typical_switch();
        let uri = "/arista?target=sw1&modules=memory;port";
        let (status, body) = get(app(switch.clone(), None), uri).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "Invalid modules specified");
        assert_eq!(switch.connect_count(), 0);
    }

    #[tokio::test]
    async fn missing_target_rejected() {
        let (status, body) = get(app(MockSwitch::typical_switch(), None), "/arista").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "No target parameter provided!");

        let (status, _) = get(app(MockSwitch::typical_switch(), None), "/arista?target=").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unresolvable_target_rejected_before_collection() {
        let switch = MockSwitch::typical_switch();
        let (status, body) = get(app(switch.clone(), None), "/arista?target=nonexistent.invalid").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.starts_with("Target does not exist in DNS: "), "{}", body);
        assert_eq!(switch.connect_count(), 0);
    }

    #[tokio::test]
    async fn scrape_returns_exposition() {
        let app = app(MockSwitch::typical_switch(), None);
        let response = app
            .oneshot(
                Request::get("/arista?target=localhost&modules=memory")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            CONTENT_TYPE_LATEST
        );
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("arista_up{target=\"localhost\"} 1"));
        assert!(text.contains("arista_mem_total{target=\"localhost\"} 16012300"));
        assert!(text.contains("arista_hw_info{"));
        assert!(!text.contains("arista_tcam_used"));
    }

    #[tokio::test]
    async fn configured_modules_apply_when_request_has_none() {
        let app = app(MockSwitch::typical_switch(), Some("tcam"));
        let (status, text) = get(app, "/arista?target=localhost").await;

        assert_eq!(status, StatusCode::OK);
        assert!(text.contains("arista_tcam_used{"));
        assert!(!text.contains("arista_mem_total"));
    }

    #[tokio::test]
    async fn health() {
        let (status, body) = get(app(MockSwitch::typical_switch(), None), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");
    }
}
