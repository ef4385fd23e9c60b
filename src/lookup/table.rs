use super::codec::AddressKey;
use super::types::RangeRecord;

/// An immutable table of closed ranges sorted ascending by `from`.
///
/// Lookups assume the ranges do not overlap; `overlaps` reports adjacent pairs that break this so
/// the loader can flag them. There are no mutation methods once built.
#[derive(Debug, Clone)]
pub struct IntervalTable {
    records: Vec<RangeRecord>,
}

impl IntervalTable {
    /// Sorts `records` by lower bound and freezes them into a table.
    pub fn from_records(mut records: Vec<RangeRecord>) -> Self {
        records.sort_unstable_by_key(|r| r.from);
        Self { records }
    }

    pub fn empty() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Binary range search. Returns the record whose `[from, to]` contains `key`.
    pub fn find(&self, key: AddressKey) -> Option<&RangeRecord> {
        let mut left = 0usize;
        let mut right = self.records.len();

        while left < right {
            let mid = left + (right - left) / 2;
            let entry = &self.records[mid];

            if entry.contains(key) {
                return Some(entry);
            }

            if key < entry.from {
                right = mid;
            } else {
                left = mid + 1;
            }
        }

        None
    }

    /// `from` of the first record and `to` of the last, or `None` for an empty table.
    pub fn bounds(&self) -> Option<(AddressKey, AddressKey)> {
        let first = self.records.first()?;
        let last = self.records.last()?;
        Some((first.from, last.to))
    }

    /// Adjacent record pairs whose ranges intersect.
    pub fn overlaps(&self) -> impl Iterator<Item = (&RangeRecord, &RangeRecord)> {
        self.records
            .windows(2)
            .filter(|pair| pair[1].from <= pair[0].to)
            .map(|pair| (&pair[0], &pair[1]))
    }

    pub fn records(&self) -> &[RangeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
