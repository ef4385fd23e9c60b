//! IPv4 Lookup Service Library
//!
//! Answers "what do we know about this IPv4 address?" from two range tables loaded once at
//! startup: the IP2Proxy LITE anonymizer table and the IP2Location LITE geolocation table.
//!
//! ## Architecture Modules
//! - **`lookup`**: The lookup engine. Parses addresses into numeric keys, loads the delimited
//!   source files into sorted interval tables, and resolves keys against them with proxy-first,
//!   first-match-wins precedence.
//! - **`api`**: The axum HTTP surface: lookup, health and attribution endpoints plus security
//!   headers, CORS and per-client rate limiting.
//! - **`config`**: Startup settings from environment variables and command-line flags.

pub mod api;
pub mod config;
pub mod lookup;
