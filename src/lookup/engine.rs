use super::codec::{AddressKey, parse_ipv4};
use super::loader::load_path;
use super::table::IntervalTable;
use super::types::{
    Coverage, FieldSchema, LOCATION_ATTRIBUTION, LookupOutcome, PROXY_ATTRIBUTION, RejectReason,
    TableStats, TableTag,
};

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Inputs that never identify a real client and are refused without probing.
const NO_ADDRESS_SENTINELS: [&str; 2] = ["127.0.0.1", "localhost"];

/// One table in the lookup order, with the attribution text owed when it answers.
#[derive(Debug)]
pub struct TableSource {
    pub tag: TableTag,
    pub table: IntervalTable,
    pub attribution: &'static str,
}

/// Ordered, first-match-wins lookup over a fixed list of interval tables.
///
/// Tables are owned by the engine and never mutated after construction, so a shared
/// `Arc<ResolutionEngine>` can serve any number of concurrent callers without locking.
#[derive(Debug)]
pub struct ResolutionEngine {
    sources: Vec<TableSource>,
}

impl ResolutionEngine {
    /// Standard lookup order: proxy table first, then location table.
    pub fn new(proxy: IntervalTable, location: IntervalTable) -> Self {
        Self::with_sources(vec![
            TableSource {
                tag: TableTag::Proxy,
                table: proxy,
                attribution: PROXY_ATTRIBUTION,
            },
            TableSource {
                tag: TableTag::Location,
                table: location,
                attribution: LOCATION_ATTRIBUTION,
            },
        ])
    }

    pub fn with_sources(sources: Vec<TableSource>) -> Self {
        Self { sources }
    }

    /// Loads both source files in parallel on the blocking pool.
    ///
    /// Any failure is returned with the table it concerns as context and nothing is served.
    pub async fn load(proxy_db: PathBuf, location_db: PathBuf) -> Result<Self> {
        let (proxy, location) = tokio::try_join!(
            load_table(TableTag::Proxy, proxy_db, FieldSchema::proxy()),
            load_table(TableTag::Location, location_db, FieldSchema::location()),
        )?;

        Ok(Self::new(proxy, location))
    }

    /// Resolves a dotted-decimal address.
    ///
    /// Empty input and loopback sentinels are rejected before parsing; unparseable input is
    /// rejected before any table is consulted.
    pub fn resolve(&self, ip: &str) -> LookupOutcome<'_> {
        if ip.is_empty() || NO_ADDRESS_SENTINELS.contains(&ip) {
            return LookupOutcome::Rejected(RejectReason::NoAddress);
        }

        match parse_ipv4(ip) {
            Some(key) => self.resolve_key(key),
            None => LookupOutcome::Rejected(RejectReason::InvalidFormat),
        }
    }

    /// Searches each table in order and returns the first covering record.
    pub fn resolve_key(&self, key: AddressKey) -> LookupOutcome<'_> {
        for source in &self.sources {
            if let Some(record) = source.table.find(key) {
                return LookupOutcome::Matched {
                    tag: source.tag,
                    attribution: source.attribution,
                    record,
                };
            }
        }

        LookupOutcome::NotFound {
            key,
            coverage: self.coverage(),
        }
    }

    /// Covered span of every table, in lookup order.
    pub fn coverage(&self) -> Vec<Coverage> {
        self.sources
            .iter()
            .map(|source| Coverage {
                tag: source.tag,
                bounds: source.table.bounds(),
            })
            .collect()
    }

    /// Row count and covered span of every table, in lookup order.
    pub fn stats(&self) -> Vec<TableStats> {
        self.sources
            .iter()
            .map(|source| TableStats {
                tag: source.tag,
                rows: source.table.len(),
                bounds: source.table.bounds(),
            })
            .collect()
    }

    pub fn table(&self, tag: TableTag) -> Option<&IntervalTable> {
        self.sources
            .iter()
            .find(|source| source.tag == tag)
            .map(|source| &source.table)
    }

    /// Number of records in the table with `tag`; zero if there is no such table.
    pub fn entries(&self, tag: TableTag) -> usize {
        self.table(tag).map_or(0, IntervalTable::len)
    }
}

async fn load_table(tag: TableTag, path: PathBuf, schema: FieldSchema) -> Result<IntervalTable> {
    let label = tag.source_name();
    tracing::info!("Loading {} database from {}...", label, path.display());

    let (table, _report) = tokio::task::spawn_blocking(move || load_path(&path, &schema))
        .await
        .with_context(|| format!("{} loader task failed", label))?
        .with_context(|| format!("Failed to load {} database", label))?;

    Ok(table)
}
