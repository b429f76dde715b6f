//! RecordDatabase port - Secondary (driven) port to the flash record database.
//!
//! This port defines what the adaptation layer needs from the append-only
//! record database. The database owns layout, wear-leveling and durability;
//! the adaptation layer only routes, positions cursors and translates
//! results.

use core::cmp::Ordering;

use crate::domain::error::DbError;
use crate::domain::value_objects::{RecordType, StoreId};

/// Port for the append-only record database.
///
/// # Hexagonal Architecture
///
/// ```text
/// ┌─────────────────────┐
/// │   Domain Layer      │
/// │ (router, cursor)    │
/// └──────────┬──────────┘
///            │ depends on
///            ▼
/// ┌─────────────────────┐
/// │ RecordDatabase Port │  ◄── This trait
/// └──────────┬──────────┘
///            │ implemented by
///            ▼
/// ┌─────────────────────┐
/// │  Adapter Layer      │
/// │ (MemoryRecordDb,    │
/// │  NorFlashRecordDb)  │
/// └─────────────────────┘
/// ```
///
/// # Records
///
/// A record is a type tag plus content. Content is the payload followed by
/// the extra payload given to [`append`](Self::append); reads and compares
/// address the concatenation.
///
/// # Cursors
///
/// Every operation except [`erase`](Self::erase) goes through a cursor. A
/// cursor is bound to one store by [`init_cursor`](Self::init_cursor) and
/// then walks that store in append order. The default cursor is unbound and
/// must be initialized before use.
pub trait RecordDatabase {
    /// Opaque per-store cursor.
    type Cursor: Default;

    /// Bring the database up (scan flash, recover tails).
    ///
    /// Called once by the façade before any cursor is opened.
    fn init(&mut self) -> Result<(), DbError>;

    /// Bind `cursor` to `store` and rewind it before the first record.
    ///
    /// Any previous position is discarded.
    fn init_cursor(&mut self, store: StoreId, cursor: &mut Self::Cursor);

    /// Append a record to the cursor's store.
    ///
    /// # Errors
    ///
    /// - [`DbError::Full`] if the store cannot hold the record
    /// - [`DbError::Locked`] if the flash operation is not allowed right now
    /// - any other variant for implementation specific failures
    fn append(
        &mut self,
        cursor: &mut Self::Cursor,
        record_type: RecordType,
        payload: &[u8],
        extra: &[u8],
    ) -> Result<(), DbError>;

    /// Re-read the record under the cursor.
    ///
    /// Copies at most `dest.len()` bytes of content starting at `offset` and
    /// returns the record's total content length.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::NoCurrentRecord`] when the cursor is not on a live
    /// record.
    fn read_current(
        &mut self,
        cursor: &mut Self::Cursor,
        offset: usize,
        dest: &mut [u8],
    ) -> Result<usize, DbError>;

    /// Advance the cursor to the next live record accepted by `filter` and
    /// read it like [`read_current`](Self::read_current).
    ///
    /// # Errors
    ///
    /// Returns [`DbError::EndOfDb`] when no further record matches.
    fn read_next(
        &mut self,
        cursor: &mut Self::Cursor,
        filter: RecordType,
        offset: usize,
        dest: &mut [u8],
    ) -> Result<usize, DbError>;

    /// Compare `pattern` against the current record's content at `offset`.
    ///
    /// Returns how the record compares to the pattern: `Less` when the
    /// record is shorter or lower at the first differing byte. A cursor not
    /// on a live record compares `Greater`.
    fn compare_current(
        &mut self,
        cursor: &mut Self::Cursor,
        offset: usize,
        pattern: &[u8],
    ) -> Ordering;

    /// Delete the record under the cursor.
    fn delete_current(&mut self, cursor: &mut Self::Cursor) -> Result<(), DbError>;

    /// Erase every record of `store` in one bulk operation.
    fn erase(&mut self, store: StoreId) -> Result<(), DbError>;
}
