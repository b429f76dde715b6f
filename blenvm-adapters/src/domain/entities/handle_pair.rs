//! The fixed pair of store handles.

use super::StoreHandle;
use crate::domain::ports::RecordDatabase;
use crate::domain::value_objects::StoreId;

/// Exactly one [`StoreHandle`] per [`StoreId`].
#[derive(Debug)]
pub struct HandlePair<C> {
    security_gatt: StoreHandle<C>,
    device_identity: StoreHandle<C>,
}

impl<C: Default> HandlePair<C> {
    /// Open and initialize one cursor per store.
    pub fn open<D>(db: &mut D) -> Self
    where
        D: RecordDatabase<Cursor = C>,
    {
        Self {
            security_gatt: open_handle(db, StoreId::SecurityGatt),
            device_identity: open_handle(db, StoreId::DeviceIdentity),
        }
    }
}

impl<C> HandlePair<C> {
    /// The handle of `store`.
    #[inline]
    pub fn get(&self, store: StoreId) -> &StoreHandle<C> {
        match store {
            StoreId::SecurityGatt => &self.security_gatt,
            StoreId::DeviceIdentity => &self.device_identity,
        }
    }

    /// Mutable handle of `store`.
    #[inline]
    pub fn get_mut(&mut self, store: StoreId) -> &mut StoreHandle<C> {
        match store {
            StoreId::SecurityGatt => &mut self.security_gatt,
            StoreId::DeviceIdentity => &mut self.device_identity,
        }
    }
}

fn open_handle<D: RecordDatabase>(db: &mut D, store: StoreId) -> StoreHandle<D::Cursor> {
    let mut cursor = D::Cursor::default();
    db.init_cursor(store, &mut cursor);
    StoreHandle::new(store, cursor)
}
