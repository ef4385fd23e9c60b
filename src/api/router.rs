use super::handlers::{handle_attribution, handle_health, handle_lookup, handle_lookup_self};
use super::middleware::{rate_limit, security_headers};
use super::protocol::{
    ENDPOINT_ATTRIBUTION, ENDPOINT_HEALTH, ENDPOINT_LOOKUP, ENDPOINT_LOOKUP_SELF,
};
use super::ratelimit::RateLimiter;
use crate::config::Config;
use crate::lookup::engine::ResolutionEngine;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::{Extension, Router, middleware, routing::get};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

const CORS_MAX_AGE: Duration = Duration::from_secs(86_400);

/// Builds the service router.
///
/// Security headers wrap everything, including CORS preflights and rate-limited responses.
pub fn build_router(
    engine: Arc<ResolutionEngine>,
    limiter: Arc<RateLimiter>,
    config: &Config,
) -> Router {
    Router::new()
        .route(ENDPOINT_LOOKUP_SELF, get(handle_lookup_self))
        .route(ENDPOINT_LOOKUP, get(handle_lookup))
        .route(ENDPOINT_HEALTH, get(handle_health))
        .route(ENDPOINT_ATTRIBUTION, get(handle_attribution))
        .layer(Extension(engine))
        .layer(middleware::from_fn_with_state(limiter, rate_limit))
        .layer(cors_layer(config.allowed_origins.as_deref()))
        .layer(middleware::from_fn(security_headers))
}

fn cors_layer(allowed_origins: Option<&[String]>) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .max_age(CORS_MAX_AGE);

    match allowed_origins {
        Some(origins) => {
            let origins: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|origin| match HeaderValue::from_str(origin) {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                        None
                    }
                })
                .collect();
            layer.allow_origin(AllowOrigin::list(origins))
        }
        None => layer.allow_origin(Any),
    }
}
