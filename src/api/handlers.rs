use super::client_ip::{client_address, normalize};
use super::compose::compose;
use super::protocol::{
    AttributionResponse, ErrorResponse, HealthResponse, IPV4_ONLY_MESSAGE, LOCATION_DATABASE_NAME,
    LookupResponse, PROXY_DATABASE_NAME,
};
use crate::lookup::engine::ResolutionEngine;
use crate::lookup::types::{COMBINED_ATTRIBUTION, LICENSE_URL, LookupOutcome, TableTag};

use axum::extract::{ConnectInfo, Path};
use axum::http::{HeaderMap, StatusCode};
use axum::{Extension, Json};
use regex::Regex;
use std::net::SocketAddr;
use std::sync::{Arc, LazyLock};

/// Shape check for the path parameter; octet ranges are enforced by the engine.
static IPV4_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,3}\.){3}\d{1,3}$").expect("valid IPv4 shape regex"));

pub async fn handle_lookup_self(
    Extension(engine): Extension<Arc<ResolutionEngine>>,
    headers: HeaderMap,
    peer: Option<ConnectInfo<SocketAddr>>,
) -> (StatusCode, Json<LookupResponse>) {
    let raw = client_address(&headers, peer.map(|ConnectInfo(addr)| addr));
    let ip = normalize(&raw);

    respond(&engine, ip)
}

pub async fn handle_lookup(
    Extension(engine): Extension<Arc<ResolutionEngine>>,
    Path(ip): Path<String>,
) -> (StatusCode, Json<LookupResponse>) {
    if !IPV4_SHAPE.is_match(&ip) {
        tracing::debug!("Refusing non-IPv4 lookup {:?}", ip);
        return (
            StatusCode::BAD_REQUEST,
            Json(LookupResponse::Rejected(ErrorResponse {
                error: IPV4_ONLY_MESSAGE.to_string(),
                attribution: Some(COMBINED_ATTRIBUTION),
            })),
        );
    }

    respond(&engine, &ip)
}

pub async fn handle_health(
    Extension(engine): Extension<Arc<ResolutionEngine>>,
) -> Json<HealthResponse> {
    let stats = engine.stats();
    let table = |tag: TableTag| stats.iter().find(|s| s.tag == tag);
    let rows = |tag: TableTag| table(tag).map_or(0, |s| s.rows);
    let range = |tag: TableTag| {
        table(tag).map_or_else(|| "unknown".to_string(), |s| s.coverage().to_string())
    };

    Json(HealthResponse {
        status: "ok",
        timestamp: chrono::Utc::now().to_rfc3339(),
        proxy_database_entries: rows(TableTag::Proxy),
        location_database_entries: rows(TableTag::Location),
        proxy_database_range: range(TableTag::Proxy),
        location_database_range: range(TableTag::Location),
    })
}

pub async fn handle_attribution(
    Extension(engine): Extension<Arc<ResolutionEngine>>,
) -> Json<AttributionResponse> {
    Json(AttributionResponse {
        databases: vec![PROXY_DATABASE_NAME, LOCATION_DATABASE_NAME],
        attribution: COMBINED_ATTRIBUTION,
        license: LICENSE_URL,
        proxy_entries: engine.entries(TableTag::Proxy),
        location_entries: engine.entries(TableTag::Location),
    })
}

fn respond(engine: &ResolutionEngine, ip: &str) -> (StatusCode, Json<LookupResponse>) {
    let outcome = engine.resolve(ip);

    match &outcome {
        LookupOutcome::Matched { tag, .. } => tracing::debug!("{} matched {} table", ip, tag),
        LookupOutcome::NotFound { key, .. } => tracing::debug!("{} ({}) not found", ip, key),
        LookupOutcome::Rejected(reason) => tracing::debug!("{:?} rejected: {:?}", ip, reason),
    }

    let response = compose(ip, &outcome);
    (response.status(), Json(response))
}
