//! Heap-backed record database.
//!
//! `MemoryRecordDb` keeps both stores in RAM with a byte budget per store.
//! It follows the append-only model of the flash database: deleting a record
//! only marks it, and its bytes are given back by [`erase`] alone. Useful for
//! host simulation and tests.
//!
//! [`erase`]: crate::domain::RecordDatabase::erase

extern crate alloc;

use alloc::vec::Vec;
use core::cmp::Ordering;

use crate::domain::{
    error::DbError,
    ports::RecordDatabase,
    value_objects::{compare_record_bytes, RecordType, StoreId},
};

/// A record as held by [`MemoryRecordDb`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    record_type: RecordType,
    content: Vec<u8>,
    deleted: bool,
}

impl StoredRecord {
    /// The record's type tag.
    pub fn record_type(&self) -> RecordType {
        self.record_type
    }

    /// Payload followed by the extra payload.
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Whether the record has been deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }
}

#[derive(Debug, Default)]
struct MemoryStore {
    records: Vec<StoredRecord>,
    capacity: usize,
    used: usize,
}

/// Cursor of [`MemoryRecordDb`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryCursor {
    store: Option<StoreId>,
    current: Option<usize>,
    next: usize,
}

impl MemoryCursor {
    /// The store the cursor is bound to, if initialized.
    pub fn store(&self) -> Option<StoreId> {
        self.store
    }

    /// Index of the record under the cursor.
    pub fn position(&self) -> Option<usize> {
        self.current
    }
}

/// Record database keeping both stores in RAM.
///
/// # Examples
///
/// ```
/// use blenvm_adapters::{MemoryRecordDb, StoreId};
///
/// let db = MemoryRecordDb::with_capacity(1024, 128);
/// assert_eq!(db.capacity(StoreId::DeviceIdentity), 128);
/// assert_eq!(db.live_count(StoreId::SecurityGatt), 0);
/// ```
#[derive(Debug, Default)]
pub struct MemoryRecordDb {
    stores: [MemoryStore; 2],
}

impl MemoryRecordDb {
    /// Create a database with per-store byte budgets.
    pub fn with_capacity(security_gatt: usize, device_identity: usize) -> Self {
        let mut db = Self::default();
        db.stores[StoreId::SecurityGatt.index()].capacity = security_gatt;
        db.stores[StoreId::DeviceIdentity.index()].capacity = device_identity;
        db
    }

    /// Byte budget of `store`.
    pub fn capacity(&self, store: StoreId) -> usize {
        self.stores[store.index()].capacity
    }

    /// Bytes consumed in `store`, deleted records included.
    pub fn used(&self, store: StoreId) -> usize {
        self.stores[store.index()].used
    }

    /// Every record of `store` in append order, deleted ones included.
    pub fn records(&self, store: StoreId) -> &[StoredRecord] {
        &self.stores[store.index()].records
    }

    /// Live records of `store` in append order.
    pub fn live_records(&self, store: StoreId) -> impl Iterator<Item = &StoredRecord> {
        self.records(store).iter().filter(|r| !r.deleted)
    }

    /// Number of live records in `store`.
    pub fn live_count(&self, store: StoreId) -> usize {
        self.live_records(store).count()
    }

    fn bound_store(cursor: &MemoryCursor) -> Result<StoreId, DbError> {
        cursor.store.ok_or(DbError::NoCurrentRecord)
    }

    fn live_at(&self, cursor: &MemoryCursor) -> Option<&StoredRecord> {
        let store = cursor.store?;
        let record = self.stores[store.index()].records.get(cursor.current?)?;
        (!record.deleted).then_some(record)
    }
}

fn copy_out(record: &StoredRecord, offset: usize, dest: &mut [u8]) -> usize {
    let available = record.content.get(offset..).unwrap_or(&[]);
    let n = available.len().min(dest.len());
    dest[..n].copy_from_slice(&available[..n]);
    record.content.len()
}

impl RecordDatabase for MemoryRecordDb {
    type Cursor = MemoryCursor;

    fn init(&mut self) -> Result<(), DbError> {
        Ok(())
    }

    fn init_cursor(&mut self, store: StoreId, cursor: &mut MemoryCursor) {
        *cursor = MemoryCursor {
            store: Some(store),
            current: None,
            next: 0,
        };
    }

    fn append(
        &mut self,
        cursor: &mut MemoryCursor,
        record_type: RecordType,
        payload: &[u8],
        extra: &[u8],
    ) -> Result<(), DbError> {
        let store = &mut self.stores[Self::bound_store(cursor)?.index()];
        let size = payload.len() + extra.len();

        if store.used + size > store.capacity {
            return Err(DbError::Full);
        }

        let mut content = Vec::with_capacity(size);
        content.extend_from_slice(payload);
        content.extend_from_slice(extra);

        store.records.push(StoredRecord {
            record_type,
            content,
            deleted: false,
        });
        store.used += size;
        Ok(())
    }

    fn read_current(
        &mut self,
        cursor: &mut MemoryCursor,
        offset: usize,
        dest: &mut [u8],
    ) -> Result<usize, DbError> {
        let record = self.live_at(cursor).ok_or(DbError::NoCurrentRecord)?;
        Ok(copy_out(record, offset, dest))
    }

    fn read_next(
        &mut self,
        cursor: &mut MemoryCursor,
        filter: RecordType,
        offset: usize,
        dest: &mut [u8],
    ) -> Result<usize, DbError> {
        let records = &self.stores[Self::bound_store(cursor)?.index()].records;

        let found = records
            .iter()
            .enumerate()
            .skip(cursor.next)
            .find(|(_, r)| !r.deleted && filter.matches(r.record_type));

        match found {
            Some((index, record)) => {
                cursor.current = Some(index);
                cursor.next = index + 1;
                Ok(copy_out(record, offset, dest))
            }
            None => {
                cursor.current = None;
                cursor.next = records.len();
                Err(DbError::EndOfDb)
            }
        }
    }

    fn compare_current(
        &mut self,
        cursor: &mut MemoryCursor,
        offset: usize,
        pattern: &[u8],
    ) -> Ordering {
        match self.live_at(cursor) {
            Some(record) => compare_record_bytes(&record.content, offset, pattern),
            None => Ordering::Greater,
        }
    }

    fn delete_current(&mut self, cursor: &mut MemoryCursor) -> Result<(), DbError> {
        let store = Self::bound_store(cursor)?;
        let index = cursor.current.ok_or(DbError::NoCurrentRecord)?;
        let record = self.stores[store.index()]
            .records
            .get_mut(index)
            .filter(|r| !r.deleted)
            .ok_or(DbError::NoCurrentRecord)?;
        record.deleted = true;
        Ok(())
    }

    fn erase(&mut self, store: StoreId) -> Result<(), DbError> {
        let store = &mut self.stores[store.index()];
        store.records.clear();
        store.used = 0;
        Ok(())
    }
}
