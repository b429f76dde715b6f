//! Seek and discard modes requested by the stack.

/// Traversal operation for [`get`](crate::NvmAdapter::get).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SeekMode {
    /// Rewind the store and position on the first matching record.
    First,
    /// Advance to the next matching record.
    Next,
    /// Re-read the record under the cursor without moving.
    Current,
}

/// Scope of a [`discard`](crate::NvmAdapter::discard).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DiscardMode {
    /// Delete the record under the cursor of the current store.
    Current,
    /// Erase the whole security/GATT store.
    All,
}
