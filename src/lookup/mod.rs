//! Lookup Engine Module
//!
//! Resolves IPv4 addresses against the interval-keyed reference tables loaded at startup.
//!
//! ## Overview
//! Each reference table (IP2Proxy, IP2Location) is a sorted list of closed numeric ranges, one
//! per source row. An address is converted to its numeric key and searched against the tables in a
//! fixed order; the first table containing a covering range wins.
//!
//! ## Responsibilities
//! - **Codec**: Converting dotted-decimal strings to numeric keys and back.
//! - **Loading**: Streaming delimited source files into immutable `IntervalTable`s.
//! - **Search**: Binary range search over a sorted table.
//! - **Resolution**: Ordered, first-match-wins probing with typed outcomes.
//!
//! ## Submodules
//! - **`codec`**: Address parsing and formatting.
//! - **`engine`**: The `ResolutionEngine` and its ordered table sources.
//! - **`error`**: Load-time error taxonomy.
//! - **`loader`**: Line-oriented source parsing and table construction.
//! - **`table`**: The sorted `IntervalTable` and its range search.
//! - **`types`**: Records, schemas, outcomes and attribution constants.

pub mod codec;
pub mod engine;
pub mod error;
pub mod loader;
pub mod table;
pub mod types;

#[cfg(test)]
mod tests;
