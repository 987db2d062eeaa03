//! Access logging middleware.
//!
//! Scrapes are logged at info with the requested targets and modules.
//! Health checks are logged at debug only.

use std::net::SocketAddr;
use std::time::Instant;

use axum::extract::{ConnectInfo, Query, Request};
use axum::http::Uri;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{debug, info};

use crate::handlers::ScrapeQuery;

const HEALTH_PATH: &str = "/health";
const ABSENT: &str = "-";

pub(crate) async fn access_log(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let (targets, modules) = scrape_params(req.uri());
    let client = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip().to_string())
        .unwrap_or_else(|| ABSENT.to_owned());
    let t0 = Instant::now();

    let response = next.run(req).await;

    let latency_ms = t0.elapsed().as_millis() as u64;
    let status = response.status().as_u16();
    if path == HEALTH_PATH {
        debug!(client, status, latency_ms, "{method} {path}");
    } else {
        info!(client, status, latency_ms, targets, modules, "{method} {path}");
    }
    response
}

/// Extracts `target` and `modules` from the query, `-` when absent.
fn scrape_params(uri: &Uri) -> (String, String) {
    match Query::<ScrapeQuery>::try_from_uri(uri) {
        Ok(Query(query)) => (
            query.target.unwrap_or_else(|| ABSENT.to_owned()),
            query.modules.unwrap_or_else(|| ABSENT.to_owned()),
        ),
        Err(_) => (ABSENT.to_owned(), ABSENT.to_owned()),
    }
}
