//! The adaptation façade exposed to the BLE stack.
//!
//! See the crate root for a walk through `add` and `get`.

use crate::adapters::probe::{DebugProbe, NoProbe};
use crate::domain::{
    cursor,
    entities::HandlePair,
    error::{DbError, NvmError},
    ports::RecordDatabase,
    value_objects::{CompareOutcome, DiscardMode, NvmConfig, RecordType, SeekMode, StoreId},
    StoreRouter,
};

/// Persistence façade of the BLE stack over a two-store record database.
///
/// The façade owns the database, one handle per store and the current-store
/// selection. All operations take `&mut self`; sharing the façade between
/// an interrupt and the main loop needs external serialization.
///
/// # Type Parameters
///
/// - `D`: The record database (must implement [`RecordDatabase`])
/// - `P`: Debug instrumentation bracketing flash-affecting operations
pub struct NvmAdapter<D: RecordDatabase, P = NoProbe> {
    db: D,
    router: StoreRouter,
    handles: HandlePair<D::Cursor>,
    probe: P,
}

impl<D: RecordDatabase> NvmAdapter<D, NoProbe> {
    /// Initialize the database and open both store handles.
    ///
    /// The security/GATT store starts out selected.
    ///
    /// # Errors
    ///
    /// Returns the database error if its initialization fails.
    pub fn new(db: D, config: NvmConfig) -> Result<Self, DbError> {
        Self::with_probe(db, config, NoProbe)
    }
}

impl<D: RecordDatabase, P: DebugProbe> NvmAdapter<D, P> {
    /// Like [`new`](NvmAdapter::new), bracketing flash operations with `probe`.
    pub fn with_probe(mut db: D, config: NvmConfig, probe: P) -> Result<Self, DbError> {
        db.init()?;
        let handles = HandlePair::open(&mut db);

        Ok(Self {
            db,
            router: StoreRouter::new(config),
            handles,
            probe,
        })
    }

    /// Append a record to the store `record_type` routes to.
    ///
    /// The stored content is `payload` followed by `extra`.
    ///
    /// # Errors
    ///
    /// - [`NvmError::Full`] if the store has no room left
    /// - [`NvmError::Busy`] for anything else, including a deferred flash write
    pub fn add(
        &mut self,
        record_type: RecordType,
        payload: &[u8],
        extra: &[u8],
    ) -> Result<(), NvmError> {
        let store = self.router.select(record_type);
        let handle = self.handles.get_mut(store);

        self.probe.enter();
        let result = self
            .db
            .append(handle.cursor_mut(), record_type, payload, extra);
        self.probe.exit();

        #[cfg(feature = "log")]
        if let Err(err) = &result {
            log::debug!("append of {} to {} failed: {}", record_type, store, err);
        }
        #[cfg(feature = "defmt")]
        if let Err(err) = &result {
            defmt::debug!("append of {} to {} failed: {}", record_type, store, err);
        }

        result.map_err(NvmError::from_append)
    }

    /// Seek in the store `record_type` routes to and read the record found.
    ///
    /// Copies at most `dest.len()` bytes of content starting at `offset` and
    /// returns the record's total content length.
    ///
    /// The store is selected from `record_type` in every mode. For
    /// [`SeekMode::Current`] the type is not used as a filter; the read
    /// happens wherever that store's cursor was left by its last
    /// `First`/`Next`.
    ///
    /// # Errors
    ///
    /// - [`NvmError::EndOfSequence`] when `First`/`Next` runs out of records
    /// - [`NvmError::Busy`] for anything else
    pub fn get(
        &mut self,
        mode: SeekMode,
        record_type: RecordType,
        offset: usize,
        dest: &mut [u8],
    ) -> Result<usize, NvmError> {
        let store = self.router.select(record_type);
        let handle = self.handles.get_mut(store);

        cursor::seek(&mut self.db, handle, mode, record_type, offset, dest)
            .map_err(NvmError::from_read)
    }

    /// Compare `pattern` with the current record of the current store,
    /// starting `offset` bytes into its content.
    ///
    /// The store is not reselected: this acts on whichever store the last
    /// `add`/`get` addressed.
    pub fn compare(&mut self, offset: usize, pattern: &[u8]) -> CompareOutcome {
        let handle = self.handles.get_mut(self.router.current());
        let ordering = self.db.compare_current(handle.cursor_mut(), offset, pattern);
        CompareOutcome::from(ordering)
    }

    /// Delete records.
    ///
    /// - [`DiscardMode::Current`] deletes the record under the cursor of the
    ///   current store. When the current store is the device identity store
    ///   this is a silent no-op: identity records are never deleted one by
    ///   one.
    /// - [`DiscardMode::All`] erases the whole security/GATT store in one
    ///   bulk operation. The identity store is never touched.
    ///
    /// Failures are not reported.
    pub fn discard(&mut self, mode: DiscardMode) {
        self.probe.enter();

        match mode {
            DiscardMode::Current => {
                let store = self.router.current();
                if !store.is_deletion_protected() {
                    let handle = self.handles.get_mut(store);
                    let result = self.db.delete_current(handle.cursor_mut());
                    Self::note_discard_failure(store, result);
                }
            }
            DiscardMode::All => {
                let store = StoreId::SecurityGatt;
                let result = self.db.erase(store);
                if result.is_ok() {
                    // The old position would point into records appended later.
                    let handle = self.handles.get_mut(store);
                    self.db.init_cursor(store, handle.cursor_mut());
                    handle.mark_unpositioned();
                }
                Self::note_discard_failure(store, result);
            }
        }

        self.probe.exit();
    }

    /// The store the next `compare`/`discard` will act on.
    #[inline]
    pub fn current_store(&self) -> StoreId {
        self.router.current()
    }

    /// The store router.
    #[inline]
    pub fn router(&self) -> &StoreRouter {
        &self.router
    }

    /// The handles of both stores.
    #[inline]
    pub fn handles(&self) -> &HandlePair<D::Cursor> {
        &self.handles
    }

    /// The record database.
    #[inline]
    pub fn db(&self) -> &D {
        &self.db
    }

    /// Mutable access to the record database.
    #[inline]
    pub fn db_mut(&mut self) -> &mut D {
        &mut self.db
    }

    /// Consume the façade and return the record database.
    pub fn into_inner(self) -> D {
        self.db
    }

    #[allow(unused_variables)]
    fn note_discard_failure(store: StoreId, result: Result<(), DbError>) {
        #[cfg(feature = "log")]
        if let Err(err) = result {
            log::debug!("discard on {} failed: {}", store, err);
        }
        #[cfg(feature = "defmt")]
        if let Err(err) = result {
            defmt::debug!("discard on {} failed: {}", store, err);
        }
    }
}
