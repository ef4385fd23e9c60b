//! Table Loader
//!
//! Streams a delimited range file into an `IntervalTable`.
//!
//! ## Source Format
//! One record per line, comma separated. Every field may be wrapped in double quotes, which are
//! stripped literally: quoted commas and escaped quotes are not supported. The first two fields
//! are the inclusive numeric bounds; the rest map positionally onto the table's `FieldSchema`.
//! A field equal to `-` is stored as absent.

use super::codec::AddressKey;
use super::error::LoadError;
use super::table::IntervalTable;
use super::types::{ABSENT_SENTINEL, FieldSchema, RangeRecord};

use csv::StringRecord;
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Overlapping pairs logged individually before only the total is reported.
const MAX_OVERLAP_WARNINGS: usize = 5;

/// Byte order mark some exports put in front of the first field.
const UTF8_BOM: char = '\u{feff}';

/// Diagnostics gathered while building a table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Records loaded.
    pub rows: usize,
    /// First `from` and last `to` after sorting.
    pub bounds: Option<(AddressKey, AddressKey)>,
    /// Adjacent record pairs whose ranges intersect.
    pub overlaps: usize,
    /// Rows that had fewer attribute fields than the schema.
    pub short_rows: usize,
}

/// Opens `path` and loads it with `load`.
pub fn load_path(
    path: &Path,
    schema: &FieldSchema,
) -> Result<(IntervalTable, LoadReport), LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let (table, report) = load(BufReader::new(file), schema)?;

    match report.bounds {
        Some((first, last)) => tracing::info!(
            "Loaded {} entries from {} (range {} - {})",
            report.rows,
            path.display(),
            first,
            last
        ),
        None => tracing::warn!("Loaded 0 entries from {}", path.display()),
    }

    Ok((table, report))
}

/// Parses every line of `reader` into a record and builds a sorted table.
///
/// Blank lines are skipped. Read failures and malformed bounds abort the whole load.
pub fn load<R: Read>(
    reader: R,
    schema: &FieldSchema,
) -> Result<(IntervalTable, LoadReport), LoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(reader);

    let mut records = Vec::new();
    let mut short_rows = 0usize;
    let mut row = StringRecord::new();
    let mut first = true;

    while csv_reader.read_record(&mut row)? {
        let line_no = row.position().map_or(records.len() + 1, |p| p.line() as usize);
        let mut fields = record_fields(&row);

        if first {
            if let Some(field) = fields.first_mut() {
                let stripped = field.strip_prefix(UTF8_BOM).map(str::to_string);
                if let Some(stripped) = stripped {
                    *field = Cow::Owned(stripped);
                }
            }
            first = false;
        }

        if fields.iter().all(|field| field.trim().is_empty()) {
            continue;
        }

        let (record, short) = parse_record(line_no, &fields, schema)?;
        if short {
            short_rows += 1;
        }
        records.push(record);
    }

    tracing::debug!("Sorting {} entries...", records.len());
    let table = IntervalTable::from_records(records);

    let mut overlaps = 0usize;
    for (prev, next) in table.overlaps() {
        if overlaps < MAX_OVERLAP_WARNINGS {
            tracing::warn!(
                "Overlapping ranges: {} - {} and {} - {}",
                prev.from,
                prev.to,
                next.from,
                next.to
            );
        }
        overlaps += 1;
    }
    if overlaps > 0 {
        tracing::warn!(
            "{} overlapping range pairs; lookups inside them may resolve to either record",
            overlaps
        );
    }
    if short_rows > 0 {
        tracing::warn!(
            "{} rows had fewer than {} attribute fields; missing fields stored as absent",
            short_rows,
            schema.len()
        );
    }

    let report = LoadReport {
        rows: table.len(),
        bounds: table.bounds(),
        overlaps,
        short_rows,
    };

    Ok((table, report))
}

/// Fields of one source row with all double quotes removed.
pub fn record_fields(row: &StringRecord) -> Vec<Cow<'_, str>> {
    row.iter()
        .map(|field| {
            if field.contains('"') {
                Cow::Owned(field.replace('"', ""))
            } else {
                Cow::Borrowed(field)
            }
        })
        .collect()
}

/// Returns the record and whether the row was short of attribute fields.
fn parse_record(
    line_no: usize,
    fields: &[Cow<'_, str>],
    schema: &FieldSchema,
) -> Result<(RangeRecord, bool), LoadError> {
    if fields.len() < 2 {
        return Err(LoadError::MissingBound { line: line_no });
    }

    let from = parse_bound(line_no, "from", &fields[0])?;
    let to = parse_bound(line_no, "to", &fields[1])?;
    if from > to {
        return Err(LoadError::InvertedBounds {
            line: line_no,
            from,
            to,
        });
    }

    let values: Vec<Option<String>> = fields[2..]
        .iter()
        .take(schema.len())
        .map(|raw| {
            if *raw == ABSENT_SENTINEL {
                None
            } else {
                Some(raw.clone().into_owned())
            }
        })
        .collect();
    let short = values.len() < schema.len();

    Ok((RangeRecord::new(from, to, schema.clone(), values), short))
}

fn parse_bound(line_no: usize, field: &'static str, raw: &str) -> Result<AddressKey, LoadError> {
    raw.trim()
        .parse::<AddressKey>()
        .map_err(|_| LoadError::InvalidBound {
            line: line_no,
            field,
            value: raw.to_string(),
        })
}
