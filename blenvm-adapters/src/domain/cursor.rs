//! Seek controller - the First/Next/Current traversal state machine.
//!
//! The controller drives one [`StoreHandle`] through the record database
//! port and keeps the handle's [`CursorState`](crate::domain::CursorState)
//! in step with what the database reported.

use crate::domain::{
    entities::StoreHandle,
    error::DbError,
    ports::RecordDatabase,
    value_objects::{RecordType, SeekMode},
};

/// Run one seek on `handle`.
///
/// - `First` rewinds the handle's cursor in place, then seeks like `Next`.
/// - `Next` advances to the next record accepted by `filter`.
/// - `Current` re-reads the record under the cursor. `filter` is ignored and
///   an unpositioned cursor is left for the database to reject.
///
/// On success at most `dest.len()` bytes starting at `offset` are copied and
/// the record's total content length is returned.
pub fn seek<D: RecordDatabase>(
    db: &mut D,
    handle: &mut StoreHandle<D::Cursor>,
    mode: SeekMode,
    filter: RecordType,
    offset: usize,
    dest: &mut [u8],
) -> Result<usize, DbError> {
    match mode {
        SeekMode::First => {
            db.init_cursor(handle.store(), handle.cursor_mut());
            handle.mark_unpositioned();
            seek_next(db, handle, filter, offset, dest)
        }
        SeekMode::Next => seek_next(db, handle, filter, offset, dest),
        SeekMode::Current => db.read_current(handle.cursor_mut(), offset, dest),
    }
}

fn seek_next<D: RecordDatabase>(
    db: &mut D,
    handle: &mut StoreHandle<D::Cursor>,
    filter: RecordType,
    offset: usize,
    dest: &mut [u8],
) -> Result<usize, DbError> {
    let result = db.read_next(handle.cursor_mut(), filter, offset, dest);
    match result {
        Ok(_) => handle.mark_positioned(filter),
        Err(DbError::EndOfDb) => handle.mark_unpositioned(),
        // A busy database leaves the cursor where it was.
        Err(_) => {}
    }
    result
}
