//! Result Composer
//!
//! Turns a `LookupOutcome` into the response body. A match carries only the attribution of
//! the table that answered; rejections and misses carry the combined attribution.

use super::protocol::{
    ErrorResponse, FoundResponse, LookupResponse, NOT_FOUND_MESSAGE, NotFoundResponse,
};
use crate::lookup::types::{COMBINED_ATTRIBUTION, Coverage, LookupOutcome, RangeRecord, TableTag};

pub fn compose(ip: &str, outcome: &LookupOutcome<'_>) -> LookupResponse {
    match outcome {
        LookupOutcome::Matched {
            tag,
            attribution,
            record,
        } => LookupResponse::Found(FoundResponse {
            ip: ip.to_string(),
            source: tag.source_name(),
            fields: record_fields(record),
            attribution: *attribution,
        }),
        LookupOutcome::NotFound { key, coverage } => LookupResponse::NotFound(NotFoundResponse {
            error: NOT_FOUND_MESSAGE,
            ip: ip.to_string(),
            ip_numeric: key.to_string(),
            proxy_db_range: coverage_for(coverage, TableTag::Proxy),
            location_db_range: coverage_for(coverage, TableTag::Location),
            attribution: COMBINED_ATTRIBUTION,
        }),
        LookupOutcome::Rejected(reason) => LookupResponse::Rejected(ErrorResponse {
            error: reason.message().to_string(),
            attribution: Some(COMBINED_ATTRIBUTION),
        }),
    }
}

/// Name a source column is published under.
pub fn response_key(field: &str) -> &str {
    match field {
        "countryName" => "country",
        "regionName" => "region",
        "cityName" => "city",
        other => other,
    }
}

fn record_fields(record: &RangeRecord) -> serde_json::Map<String, serde_json::Value> {
    record
        .attributes()
        .filter_map(|(name, value)| {
            value.map(|v| (response_key(name).to_string(), serde_json::Value::from(v)))
        })
        .collect()
}

fn coverage_for(coverage: &[Coverage], tag: TableTag) -> String {
    coverage
        .iter()
        .find(|c| c.tag == tag)
        .map_or_else(|| "unknown".to_string(), ToString::to_string)
}
