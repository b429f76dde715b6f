//! Store handle entity - a database cursor bound to one store.

use super::CursorState;
use crate::domain::value_objects::{RecordType, StoreId};

/// A record database cursor bound to one [`StoreId`].
///
/// Handles live as long as the façade. They are re-initialized in place on
/// every `First` seek and never recreated.
#[derive(Debug)]
pub struct StoreHandle<C> {
    store: StoreId,
    cursor: C,
    state: CursorState,
}

impl<C> StoreHandle<C> {
    /// Wrap an initialized database cursor.
    pub const fn new(store: StoreId, cursor: C) -> Self {
        Self {
            store,
            cursor,
            state: CursorState::Unpositioned,
        }
    }

    /// The store this handle is bound to.
    #[inline]
    pub const fn store(&self) -> StoreId {
        self.store
    }

    /// The seek state.
    #[inline]
    pub const fn state(&self) -> CursorState {
        self.state
    }

    /// The database cursor.
    #[inline]
    pub fn cursor(&self) -> &C {
        &self.cursor
    }

    /// Mutable access to the database cursor.
    #[inline]
    pub fn cursor_mut(&mut self) -> &mut C {
        &mut self.cursor
    }

    pub(crate) fn mark_positioned(&mut self, filter: RecordType) {
        self.state = CursorState::Positioned(filter);
    }

    pub(crate) fn mark_unpositioned(&mut self) {
        self.state = CursorState::Unpositioned;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_handle_is_unpositioned() {
        let handle = StoreHandle::new(StoreId::SecurityGatt, 7u32);
        assert_eq!(handle.store(), StoreId::SecurityGatt);
        assert_eq!(handle.state(), CursorState::Unpositioned);
        assert_eq!(*handle.cursor(), 7);
    }

    #[test]
    fn test_state_transitions() {
        let mut handle = StoreHandle::new(StoreId::DeviceIdentity, ());
        handle.mark_positioned(RecordType::DEVICE_ID);
        assert_eq!(handle.state(), CursorState::Positioned(RecordType::DEVICE_ID));

        handle.mark_unpositioned();
        assert!(!handle.state().is_positioned());
    }
}
