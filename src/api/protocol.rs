//! API Protocol
//!
//! Endpoint paths and the JSON bodies the service returns.

use axum::http::StatusCode;
use serde::Serialize;

// --- API Endpoints ---

/// Looks up the caller's own address.
pub const ENDPOINT_LOOKUP_SELF: &str = "/api/ip";
/// Looks up the address given in the path.
pub const ENDPOINT_LOOKUP: &str = "/api/ip/:ip";
/// Liveness and table sizes.
pub const ENDPOINT_HEALTH: &str = "/api/health";
/// Data licensing information.
pub const ENDPOINT_ATTRIBUTION: &str = "/api/attribution";

pub const PROXY_DATABASE_NAME: &str = "IP2Proxy LITE PX12";
pub const LOCATION_DATABASE_NAME: &str = "IP2Location LITE DB11";

pub const NOT_FOUND_MESSAGE: &str = "IP address not found in either database";
pub const IPV4_ONLY_MESSAGE: &str = "Invalid IP address format. Only IPv4 addresses are supported.";
pub const RATE_LIMITED_MESSAGE: &str = "Too many requests. Please try again later.";

// --- Data Transfer Objects ---

/// A successful match.
///
/// `fields` holds the matched record's present attributes under their response names; absent
/// attributes are left out entirely.
#[derive(Debug, Serialize)]
pub struct FoundResponse {
    pub ip: String,
    pub source: &'static str,
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
    pub attribution: &'static str,
}

/// A well-formed address that no table covers.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotFoundResponse {
    pub error: &'static str,
    pub ip: String,
    /// Decimal string form of the numeric key.
    pub ip_numeric: String,
    pub proxy_db_range: String,
    pub location_db_range: String,
    pub attribution: &'static str,
}

/// Generic error body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribution: Option<&'static str>,
}

/// Body of both lookup endpoints.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum LookupResponse {
    Found(FoundResponse),
    NotFound(NotFoundResponse),
    Rejected(ErrorResponse),
}

impl LookupResponse {
    pub fn status(&self) -> StatusCode {
        match self {
            LookupResponse::Found(_) => StatusCode::OK,
            LookupResponse::NotFound(_) => StatusCode::NOT_FOUND,
            LookupResponse::Rejected(_) => StatusCode::BAD_REQUEST,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    /// RFC 3339 time the response was produced.
    pub timestamp: String,
    pub proxy_database_entries: usize,
    pub location_database_entries: usize,
    /// `"<from> - <to>"` or `"unknown"` for an empty table.
    pub proxy_database_range: String,
    pub location_database_range: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributionResponse {
    pub databases: Vec<&'static str>,
    pub attribution: &'static str,
    pub license: &'static str,
    pub proxy_entries: usize,
    pub location_entries: usize,
}
