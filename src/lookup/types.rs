//! Lookup Data Types
//!
//! Defines the records stored in interval tables, the per-table field schemas and the typed
//! outcome of a resolution.

use super::codec::AddressKey;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Raw field value the source files use for "not provided".
pub const ABSENT_SENTINEL: &str = "-";

pub const PROXY_ATTRIBUTION: &str =
    "This site or product includes IP2Proxy LITE data available from https://lite.ip2location.com";
pub const LOCATION_ATTRIBUTION: &str =
    "This site or product includes IP2Location LITE data available from https://lite.ip2location.com";
/// Used whenever no single table produced the answer.
pub const COMBINED_ATTRIBUTION: &str = "This site or product includes IP2Proxy LITE and IP2Location LITE data available from https://lite.ip2location.com";
pub const LICENSE_URL: &str = "https://www.ip2location.com/free/license";

/// Attribute columns of the IP2Proxy PX12 file, after the two bound columns.
pub const PROXY_FIELDS: [&str; 13] = [
    "proxyType",
    "countryCode",
    "countryName",
    "regionName",
    "cityName",
    "isp",
    "domain",
    "usageType",
    "asn",
    "as",
    "lastSeen",
    "threat",
    "provider",
];

/// Attribute columns of the IP2Location DB11 file, after the two bound columns.
pub const LOCATION_FIELDS: [&str; 20] = [
    "countryCode",
    "countryName",
    "regionName",
    "cityName",
    "isp",
    "latitude",
    "longitude",
    "domain",
    "zipCode",
    "timeZone",
    "netspeed",
    "iddCode",
    "areaCode",
    "weatherStationCode",
    "weatherStationName",
    "mcc",
    "mnc",
    "mobileBrand",
    "elevation",
    "usageType",
];

/// Ordered attribute names for one table, shared by every record of that table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSchema {
    names: Arc<[String]>,
}

impl FieldSchema {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn proxy() -> Self {
        Self::new(PROXY_FIELDS)
    }

    pub fn location() -> Self {
        Self::new(LOCATION_FIELDS)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }
}

/// One row of an interval table: the closed range `[from, to]` plus its attributes.
///
/// Attribute values are `None` when the source marked them with the absent sentinel and
/// `Some("")` when the source field was present but empty.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeRecord {
    pub from: AddressKey,
    pub to: AddressKey,
    schema: FieldSchema,
    values: Box<[Option<String>]>,
}

impl RangeRecord {
    /// Builds a record, padding missing trailing values as absent and dropping extras.
    pub fn new(
        from: AddressKey,
        to: AddressKey,
        schema: FieldSchema,
        mut values: Vec<Option<String>>,
    ) -> Self {
        debug_assert!(from <= to, "range bounds inverted: {} > {}", from, to);
        values.resize(schema.len(), None);
        Self {
            from,
            to,
            schema,
            values: values.into_boxed_slice(),
        }
    }

    pub fn contains(&self, key: AddressKey) -> bool {
        self.from <= key && key <= self.to
    }

    /// Looks up an attribute by name.
    ///
    /// Returns `None` if the schema has no such field and `Some(None)` if the field exists but
    /// was absent in the source row.
    pub fn get(&self, name: &str) -> Option<Option<&str>> {
        let idx = self.schema.position(name)?;
        Some(self.values[idx].as_deref())
    }

    /// Attributes in source column order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.schema
            .names()
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(Option::as_deref))
    }
}

/// Which reference table produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TableTag {
    Proxy,
    Location,
}

impl TableTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableTag::Proxy => "proxy",
            TableTag::Location => "location",
        }
    }

    /// Public name of the data product behind the table.
    pub fn source_name(&self) -> &'static str {
        match self {
            TableTag::Proxy => "IP2Proxy",
            TableTag::Location => "IP2Location",
        }
    }
}

impl fmt::Display for TableTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The span a table covers: first record's `from` to last record's `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coverage {
    pub tag: TableTag,
    pub bounds: Option<(AddressKey, AddressKey)>,
}

impl fmt::Display for Coverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.bounds {
            Some((from, to)) => write!(f, "{} - {}", from, to),
            None => f.write_str("unknown"),
        }
    }
}

/// Size and span of one loaded table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableStats {
    pub tag: TableTag,
    pub rows: usize,
    pub bounds: Option<(AddressKey, AddressKey)>,
}

impl TableStats {
    pub fn coverage(&self) -> Coverage {
        Coverage {
            tag: self.tag,
            bounds: self.bounds,
        }
    }
}

/// Why an input was refused before any table was consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Empty input or a loopback sentinel.
    NoAddress,
    /// Not four dot-separated octets in `0..=255`.
    InvalidFormat,
}

impl RejectReason {
    pub fn message(&self) -> &'static str {
        match self {
            RejectReason::NoAddress => "Cannot lookup localhost or empty IP",
            RejectReason::InvalidFormat => "Invalid IP address format",
        }
    }
}

/// Result of `ResolutionEngine::resolve`. Every call yields exactly one variant.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome<'a> {
    Matched {
        tag: TableTag,
        attribution: &'static str,
        record: &'a RangeRecord,
    },
    NotFound {
        key: AddressKey,
        coverage: Vec<Coverage>,
    },
    Rejected(RejectReason),
}
