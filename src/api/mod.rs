//! HTTP API Module
//!
//! A thin axum transport over the `ResolutionEngine`.
//!
//! ## Responsibilities
//! - **Routing**: `/api/ip`, `/api/ip/:ip`, `/api/health` and `/api/attribution`.
//! - **Composition**: Shaping engine outcomes into the documented JSON responses.
//! - **Client Address**: Extracting and normalizing the caller's IPv4 address.
//! - **Protection**: Security headers, CORS and a per-client request limiter.
//!
//! ## Submodules
//! - **`client_ip`**: Forwarded-header and peer address extraction.
//! - **`compose`**: Maps a `LookupOutcome` to a `LookupResponse`.
//! - **`handlers`**: Request handlers.
//! - **`middleware`**: Security header and rate limit middleware.
//! - **`protocol`**: Endpoint paths and response DTOs.
//! - **`ratelimit`**: Fixed-window per-client request counter.
//! - **`router`**: Assembles routes and layers.

pub mod client_ip;
pub mod compose;
pub mod handlers;
pub mod middleware;
pub mod protocol;
pub mod ratelimit;
pub mod router;
