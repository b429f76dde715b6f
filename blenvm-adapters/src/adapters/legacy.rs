//! Integer status boundary of the BLE stack's platform NVM interface.
//!
//! The stack calls its persistence layer with raw seek modes and record
//! tags and expects small integer status codes back. This module converts
//! between that vocabulary and the typed façade; nothing below it ever sees
//! a raw code.
//!
//! # Codes
//!
//! | Code            | Value | Meaning                          |
//! |-----------------|-------|----------------------------------|
//! | `BLEPLAT_OK`    | 0     | success / pattern equal          |
//! | `BLEPLAT_FULL`  | -1    | no room for the record           |
//! | `BLEPLAT_BUSY`  | -2    | transient failure, retry         |
//! | `BLEPLAT_EOF`   | -3    | no more records / record longer  |
//!
//! `compare` additionally returns the pattern length when the current
//! record is shorter than (or lower than) the pattern.

use crate::adapters::nvm_adapter::NvmAdapter;
use crate::adapters::probe::DebugProbe;
use crate::domain::{
    error::NvmError,
    ports::RecordDatabase,
    value_objects::{CompareOutcome, DiscardMode, RecordType, SeekMode},
};

/// Success.
pub const BLEPLAT_OK: i32 = 0;
/// No room left for the record.
pub const BLEPLAT_FULL: i32 = -1;
/// Transient failure; the stack retries later.
pub const BLEPLAT_BUSY: i32 = -2;
/// End of records.
pub const BLEPLAT_EOF: i32 = -3;

/// Raw seek mode: first record.
pub const BLEPLAT_NVM_FIRST: u8 = 0;
/// Raw seek mode: next record.
pub const BLEPLAT_NVM_NEXT: u8 = 1;
/// Raw seek mode: current record.
pub const BLEPLAT_NVM_CURRENT: u8 = 2;
/// Raw discard mode: every record.
pub const BLEPLAT_NVM_ALL: u8 = 3;

impl SeekMode {
    /// Decode a raw seek mode. `ALL` is not a seek.
    pub const fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            BLEPLAT_NVM_FIRST => Some(Self::First),
            BLEPLAT_NVM_NEXT => Some(Self::Next),
            BLEPLAT_NVM_CURRENT => Some(Self::Current),
            _ => None,
        }
    }
}

impl DiscardMode {
    /// Decode a raw discard mode. Only `CURRENT` and `ALL` discard.
    pub const fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            BLEPLAT_NVM_CURRENT => Some(Self::Current),
            BLEPLAT_NVM_ALL => Some(Self::All),
            _ => None,
        }
    }
}

impl NvmError {
    /// The stack's status code for this error.
    pub const fn code(self) -> i32 {
        match self {
            Self::Full => BLEPLAT_FULL,
            Self::EndOfSequence => BLEPLAT_EOF,
            Self::Busy => BLEPLAT_BUSY,
        }
    }
}

/// The stack's status code for a façade result.
pub fn status_code<T>(result: &Result<T, NvmError>) -> i32 {
    match result {
        Ok(_) => BLEPLAT_OK,
        Err(err) => err.code(),
    }
}

/// The stack's return value for a compare of `pattern_len` bytes.
///
/// A record shorter than the pattern is reported as the pattern length,
/// a longer one as [`BLEPLAT_EOF`].
pub const fn compare_code(outcome: CompareOutcome, pattern_len: u16) -> i32 {
    match outcome {
        CompareOutcome::Equal => BLEPLAT_OK,
        CompareOutcome::ShorterThanPattern => pattern_len as i32,
        CompareOutcome::LongerThanPattern => BLEPLAT_EOF,
    }
}

impl<D: RecordDatabase, P: DebugProbe> NvmAdapter<D, P> {
    /// [`add`](Self::add) with raw arguments and an integer status.
    pub fn legacy_add(&mut self, record_type: u8, data: &[u8], extra: &[u8]) -> i32 {
        status_code(&self.add(RecordType::new(record_type), data, extra))
    }

    /// [`get`](Self::get) with raw arguments and an integer status.
    ///
    /// An unknown seek mode is reported busy.
    pub fn legacy_get(&mut self, mode: u8, record_type: u8, offset: u16, dest: &mut [u8]) -> i32 {
        let Some(mode) = SeekMode::from_raw(mode) else {
            return BLEPLAT_BUSY;
        };
        status_code(&self.get(mode, RecordType::new(record_type), offset as usize, dest))
    }

    /// [`compare`](Self::compare) with the stack's sentinel return value.
    ///
    /// Only the first `u16::MAX` bytes of `pattern` take part, matching the
    /// width of the stack's size argument.
    pub fn legacy_compare(&mut self, offset: u16, pattern: &[u8]) -> i32 {
        let len = u16::try_from(pattern.len()).unwrap_or(u16::MAX);
        let outcome = self.compare(offset as usize, &pattern[..len as usize]);
        compare_code(outcome, len)
    }

    /// [`discard`](Self::discard) with a raw mode. Unknown modes are ignored.
    pub fn legacy_discard(&mut self, mode: u8) {
        if let Some(mode) = DiscardMode::from_raw(mode) {
            self.discard(mode);
        }
    }
}
