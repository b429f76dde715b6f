//! Three-way result of comparing a probe against the current record.

use core::cmp::Ordering;

/// Outcome of [`compare`](crate::NvmAdapter::compare).
///
/// The record database reports an ordering; it is named here so callers
/// never have to decode a length sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CompareOutcome {
    /// The probed range equals the pattern.
    Equal,
    /// The database reported the record as less than the pattern: shorter,
    /// or lower at the first differing byte.
    ShorterThanPattern,
    /// The database reported the record as greater than the pattern.
    LongerThanPattern,
}

impl CompareOutcome {
    /// Whether the pattern matched.
    #[inline]
    pub const fn is_equal(self) -> bool {
        matches!(self, Self::Equal)
    }
}

impl From<Ordering> for CompareOutcome {
    fn from(ordering: Ordering) -> Self {
        match ordering {
            Ordering::Equal => Self::Equal,
            Ordering::Less => Self::ShorterThanPattern,
            Ordering::Greater => Self::LongerThanPattern,
        }
    }
}

/// Compare `pattern` against `record[offset..offset + pattern.len()]`.
///
/// Bytes are compared lexicographically over the overlapping range. If the
/// overlap is equal but the record ends before the pattern does, the record
/// is `Less`. An offset past the end of the record leaves no overlap.
pub fn compare_record_bytes(record: &[u8], offset: usize, pattern: &[u8]) -> Ordering {
    let available = record.get(offset..).unwrap_or(&[]);
    let overlap = pattern.len().min(available.len());

    match available[..overlap].cmp(&pattern[..overlap]) {
        Ordering::Equal if available.len() < pattern.len() => Ordering::Less,
        other => other,
    }
}
