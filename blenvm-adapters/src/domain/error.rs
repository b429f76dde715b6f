//! Domain-level errors.
//!
//! [`DbError`] is what the record database port reports. [`NvmError`] is the
//! three-tier vocabulary surfaced to the BLE stack.

use core::fmt;

/// Errors reported by a [`RecordDatabase`](crate::domain::RecordDatabase).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum DbError {
    /// The store has no room left for the record.
    Full,

    /// No further record matches the seek filter.
    EndOfDb,

    /// The flash operation was refused by the timing gate.
    ///
    /// Retrying once the radio has gone quiet is expected to succeed.
    Locked,

    /// The cursor is not positioned on a live record.
    NoCurrentRecord,

    /// The record content does not fit the database's length fields.
    RecordTooLarge,

    /// The underlying flash driver failed.
    Flash,
}

impl fmt::Display for DbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => write!(f, "Record store is full"),
            Self::EndOfDb => write!(f, "End of record store"),
            Self::Locked => write!(f, "Flash access deferred by radio activity"),
            Self::NoCurrentRecord => write!(f, "Cursor is not on a live record"),
            Self::RecordTooLarge => write!(f, "Record content too large"),
            Self::Flash => write!(f, "Flash driver error"),
        }
    }
}

impl core::error::Error for DbError {}

/// Status surfaced to the BLE stack by the adaptation façade.
///
/// Exhaustion is split into [`Full`](Self::Full) for writes and
/// [`EndOfSequence`](Self::EndOfSequence) for reads. Everything else is
/// [`Busy`](Self::Busy) and is safe to retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NvmError {
    /// Capacity exhausted on append.
    Full,
    /// No further record for this seek.
    EndOfSequence,
    /// Transient failure; retry later.
    Busy,
}

impl NvmError {
    /// Translate an append failure.
    #[inline]
    pub const fn from_append(err: DbError) -> Self {
        match err {
            DbError::Full => Self::Full,
            _ => Self::Busy,
        }
    }

    /// Translate a seek or read failure.
    #[inline]
    pub const fn from_read(err: DbError) -> Self {
        match err {
            DbError::EndOfDb => Self::EndOfSequence,
            _ => Self::Busy,
        }
    }

    /// Whether the caller may retry the same request later.
    #[inline]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::Busy)
    }
}

impl fmt::Display for NvmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => write!(f, "NVM full"),
            Self::EndOfSequence => write!(f, "No more records"),
            Self::Busy => write!(f, "NVM busy"),
        }
    }
}

impl core::error::Error for NvmError {}
