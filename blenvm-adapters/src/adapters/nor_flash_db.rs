//! Append-only record database on `embedded-storage` NOR flash.
//!
//! Each store is a log of records packed from the start of its region.
//! Deleting a record clears its status word in place, which is why the
//! flash must support [`MultiwriteNorFlash`]. Space is only reclaimed by
//! erasing the whole store.
//!
//! # Record format
//!
//! ```text
//! offset  size  field
//! 0       4     status   FFFFFFFF = not committed, 5A5A5A5A = valid, 0 = deleted
//! 4       1     record type
//! 5       1     reserved (FF)
//! 6       2     payload length (LE)
//! 8       2     extra length (LE)
//! 10      2     reserved (FFFF)
//! 12      n     payload ++ extra, padded with FF to a 4-byte boundary
//! ```
//!
//! The body is programmed before the status word, so a write cut short by a
//! reset leaves a record that is skipped on the next scan.
//!
//! Every program and erase is first submitted to the [`FlashGate`]; a
//! refusal surfaces as [`DbError::Locked`].
//!
//! # Example
//!
//! ```ignore
//! use blenvm_adapters::{FlashLayout, NorFlashRecordDb, NvmAdapter, NvmConfig, RadioTimingGate};
//!
//! let layout = FlashLayout::split(flash.capacity() as u32, 2048, 1)?;
//! let gate = RadioTimingGate::new(|| vtimer_now(), || next_radio_activity());
//! let db = NorFlashRecordDb::new(flash, layout, gate)?;
//! let mut nvm = NvmAdapter::new(db, NvmConfig::default())?;
//! ```

use core::cmp::Ordering;

use embedded_storage::nor_flash::{MultiwriteNorFlash, NorFlashError};

use crate::adapters::flash_layout::{FlashLayout, LayoutError, StoreRegion};
use crate::domain::{
    error::DbError,
    ports::{AlwaysPermit, FlashGate, RecordDatabase},
    value_objects::{RecordType, StoreId},
};

/// Size of the record header in bytes.
pub const RECORD_HEADER_SIZE: u32 = 12;

/// Records start and end on this boundary.
pub const RECORD_ALIGN: u32 = 4;

const STATUS_ERASED: u32 = 0xFFFF_FFFF;
const STATUS_VALID: u32 = 0x5A5A_5A5A;
const STATUS_DELETED: u32 = 0x0000_0000;

/// Staging buffer size for unaligned reads and chunked writes.
const CHUNK: usize = 32;

#[derive(Debug, Clone, Copy)]
struct RecordHeader {
    status: u32,
    record_type: RecordType,
    payload_len: u16,
    extra_len: u16,
}

impl RecordHeader {
    fn parse(raw: &[u8; RECORD_HEADER_SIZE as usize]) -> Self {
        Self {
            status: u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]),
            record_type: RecordType::new(raw[4]),
            payload_len: u16::from_le_bytes([raw[6], raw[7]]),
            extra_len: u16::from_le_bytes([raw[8], raw[9]]),
        }
    }

    /// Body bytes after the status word, as programmed.
    fn meta(record_type: RecordType, payload_len: u16, extra_len: u16) -> [u8; 8] {
        let [p0, p1] = payload_len.to_le_bytes();
        let [e0, e1] = extra_len.to_le_bytes();
        [record_type.value(), 0xFF, p0, p1, e0, e1, 0xFF, 0xFF]
    }

    /// No record was ever started here: end of the log.
    fn is_free(&self) -> bool {
        self.status == STATUS_ERASED
            && self.record_type.value() == 0xFF
            && self.payload_len == 0xFFFF
            && self.extra_len == 0xFFFF
    }

    fn is_valid(&self) -> bool {
        self.status == STATUS_VALID
    }

    fn content_len(&self) -> usize {
        self.payload_len as usize + self.extra_len as usize
    }

    fn footprint(&self) -> u32 {
        record_footprint(self.content_len())
    }
}

/// Flash bytes taken by a record with `content_len` bytes of content.
#[inline]
pub const fn record_footprint(content_len: usize) -> u32 {
    let raw = RECORD_HEADER_SIZE + content_len as u32;
    (raw + RECORD_ALIGN - 1) / RECORD_ALIGN * RECORD_ALIGN
}

/// Cursor of [`NorFlashRecordDb`]. Offsets are relative to the store region.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NorCursor {
    store: Option<StoreId>,
    current: Option<u32>,
    next: u32,
}

impl NorCursor {
    /// The store the cursor is bound to, if initialized.
    pub fn store(&self) -> Option<StoreId> {
        self.store
    }

    /// Region offset of the record under the cursor.
    pub fn position(&self) -> Option<u32> {
        self.current
    }
}

/// Record database writing an append-only log per store to NOR flash.
///
/// # Type Parameters
///
/// - `F`: The flash (must allow rewriting a word to clear more bits)
/// - `G`: The gate consulted before each program/erase
pub struct NorFlashRecordDb<F, G = AlwaysPermit> {
    flash: F,
    layout: FlashLayout,
    gate: G,
    /// Region offset of the first free byte, per store.
    tails: [u32; 2],
}

impl<F, G> NorFlashRecordDb<F, G>
where
    F: MultiwriteNorFlash,
    G: FlashGate,
{
    /// Create a database over `flash` with the given layout and gate.
    ///
    /// The log tails are recovered by [`RecordDatabase::init`].
    ///
    /// # Errors
    ///
    /// Returns an error if the layout does not fit the flash, or if the
    /// flash cannot read and program 4-byte words.
    pub fn new(flash: F, layout: FlashLayout, gate: G) -> Result<Self, LayoutError> {
        let word = RECORD_ALIGN as usize;
        if F::READ_SIZE == 0
            || F::WRITE_SIZE == 0
            || word % F::READ_SIZE != 0
            || word % F::WRITE_SIZE != 0
        {
            return Err(LayoutError::UnsupportedWordSize {
                read_size: F::READ_SIZE,
                write_size: F::WRITE_SIZE,
            });
        }

        let capacity = u32::try_from(flash.capacity()).unwrap_or(u32::MAX);
        layout.validate(capacity, F::ERASE_SIZE as u32)?;

        Ok(Self {
            flash,
            layout,
            gate,
            tails: [0; 2],
        })
    }

    /// The flash layout.
    pub fn layout(&self) -> &FlashLayout {
        &self.layout
    }

    /// The flash gate.
    pub fn gate(&self) -> &G {
        &self.gate
    }

    /// Bytes of `store` taken by records, deleted ones included.
    pub fn used(&self, store: StoreId) -> u32 {
        self.tails[store.index()]
    }

    /// Bytes of `store` still free.
    pub fn free(&self, store: StoreId) -> u32 {
        self.layout.region(store).size() - self.used(store)
    }

    /// Count the live records of `store`.
    pub fn live_count(&mut self, store: StoreId) -> Result<usize, DbError> {
        let region = self.layout.region(store);
        let tail = self.tails[store.index()];
        let mut count = 0;
        let mut pos = 0;
        while pos < tail {
            let header = self.read_header(region, pos)?;
            if header.is_valid() {
                count += 1;
            }
            pos += header.footprint();
        }
        Ok(count)
    }

    /// Type of the live record under `cursor`, if there is one.
    pub fn current_record_type(&mut self, cursor: &NorCursor) -> Result<Option<RecordType>, DbError> {
        match self.live_header(cursor) {
            Ok((_, _, header)) => Ok(Some(header.record_type)),
            Err(DbError::NoCurrentRecord) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Consume the database and return the flash.
    pub fn into_inner(self) -> F {
        self.flash
    }

    fn read_bytes(&mut self, addr: u32, out: &mut [u8]) -> Result<(), DbError> {
        let mut scratch = [0u8; CHUNK];
        let mut done = 0;

        while done < out.len() {
            let pos = addr + done as u32;
            let base = pos - pos % RECORD_ALIGN;
            let skip = (pos - base) as usize;
            let take = (CHUNK - skip).min(out.len() - done);
            let span = (skip + take).next_multiple_of(RECORD_ALIGN as usize);

            self.flash
                .read(base, &mut scratch[..span])
                .map_err(flash_error)?;
            out[done..done + take].copy_from_slice(&scratch[skip..skip + take]);
            done += take;
        }
        Ok(())
    }

    fn read_header(&mut self, region: StoreRegion, pos: u32) -> Result<RecordHeader, DbError> {
        let mut raw = [0u8; RECORD_HEADER_SIZE as usize];
        self.read_bytes(region.start_offset() + pos, &mut raw)?;
        Ok(RecordHeader::parse(&raw))
    }

    /// Walk the log of `store` to its first free slot.
    fn scan_tail(&mut self, store: StoreId) -> Result<u32, DbError> {
        let region = self.layout.region(store);
        let mut pos = 0;

        while pos + RECORD_HEADER_SIZE <= region.size() {
            let header = self.read_header(region, pos)?;
            if header.is_free() {
                break;
            }
            let end = pos + header.footprint();
            if end > region.size() {
                // Damaged length field: nothing after it can be trusted.
                break;
            }
            pos = end;
        }

        Ok(pos)
    }

    fn copy_out(
        &mut self,
        region: StoreRegion,
        pos: u32,
        header: &RecordHeader,
        offset: usize,
        dest: &mut [u8],
    ) -> Result<usize, DbError> {
        let total = header.content_len();
        let n = total.saturating_sub(offset).min(dest.len());
        if n > 0 {
            let addr = region.start_offset() + pos + RECORD_HEADER_SIZE + offset as u32;
            self.read_bytes(addr, &mut dest[..n])?;
        }
        Ok(total)
    }

    fn live_header(&mut self, cursor: &NorCursor) -> Result<(StoreRegion, u32, RecordHeader), DbError> {
        let (Some(store), Some(pos)) = (cursor.store, cursor.current) else {
            return Err(DbError::NoCurrentRecord);
        };
        let region = self.layout.region(store);
        let header = self.read_header(region, pos)?;
        if !header.is_valid() {
            return Err(DbError::NoCurrentRecord);
        }
        Ok((region, pos, header))
    }

    fn compare_at(
        &mut self,
        addr: u32,
        available: usize,
        pattern: &[u8],
    ) -> Result<Ordering, DbError> {
        let overlap = pattern.len().min(available);
        let mut scratch = [0u8; CHUNK];
        let mut done = 0;

        while done < overlap {
            let take = (overlap - done).min(CHUNK);
            self.read_bytes(addr + done as u32, &mut scratch[..take])?;
            match scratch[..take].cmp(&pattern[done..done + take]) {
                Ordering::Equal => done += take,
                other => return Ok(other),
            }
        }

        Ok(if available < pattern.len() {
            Ordering::Less
        } else {
            Ordering::Equal
        })
    }

    /// Lengths must already be known to fit in `u16`.
    fn program_record(
        &mut self,
        addr: u32,
        record_type: RecordType,
        payload: &[u8],
        extra: &[u8],
    ) -> Result<(), DbError> {
        let meta = RecordHeader::meta(record_type, payload.len() as u16, extra.len() as u16);
        let footprint = record_footprint(payload.len() + extra.len());
        let mut bytes = meta
            .iter()
            .chain(payload)
            .chain(extra)
            .copied()
            .chain(core::iter::repeat(0xFF));

        let body_len = (footprint - RECORD_ALIGN) as usize;
        let body_addr = addr + RECORD_ALIGN;
        let mut chunk = [0xFFu8; CHUNK];
        let mut written = 0;

        while written < body_len {
            let n = (body_len - written).min(CHUNK);
            for slot in chunk[..n].iter_mut() {
                *slot = bytes.next().unwrap_or(0xFF);
            }
            self.flash
                .write(body_addr + written as u32, &chunk[..n])
                .map_err(flash_error)?;
            written += n;
        }

        self.write_status(addr, STATUS_VALID)
    }

    fn write_status(&mut self, addr: u32, status: u32) -> Result<(), DbError> {
        self.flash
            .write(addr, &status.to_le_bytes())
            .map_err(flash_error)
    }

    fn admit(&self, budget: i32) -> Result<(), DbError> {
        if self.gate.may_proceed(budget) {
            Ok(())
        } else {
            Err(DbError::Locked)
        }
    }
}

fn flash_error<E: NorFlashError>(err: E) -> DbError {
    #[cfg(feature = "log")]
    log::warn!("flash operation failed: {:?}", err.kind());
    #[cfg(not(feature = "log"))]
    let _ = err;
    DbError::Flash
}

fn bound_store(cursor: &NorCursor) -> Result<StoreId, DbError> {
    cursor.store.ok_or(DbError::NoCurrentRecord)
}

impl<F, G> RecordDatabase for NorFlashRecordDb<F, G>
where
    F: MultiwriteNorFlash,
    G: FlashGate,
{
    type Cursor = NorCursor;

    fn init(&mut self) -> Result<(), DbError> {
        for store in StoreId::ALL {
            let tail = self.scan_tail(store)?;
            self.tails[store.index()] = tail;

            #[cfg(feature = "log")]
            log::debug!("{}: {} of {} bytes used", store, tail, self.layout.region(store).size());
            #[cfg(feature = "defmt")]
            defmt::debug!("{}: {} bytes used", store, tail);
        }
        Ok(())
    }

    fn init_cursor(&mut self, store: StoreId, cursor: &mut NorCursor) {
        *cursor = NorCursor {
            store: Some(store),
            current: None,
            next: 0,
        };
    }

    fn append(
        &mut self,
        cursor: &mut NorCursor,
        record_type: RecordType,
        payload: &[u8],
        extra: &[u8],
    ) -> Result<(), DbError> {
        let store = bound_store(cursor)?;
        if payload.len() > u16::MAX as usize || extra.len() > u16::MAX as usize {
            return Err(DbError::RecordTooLarge);
        }

        let footprint = record_footprint(payload.len() + extra.len());
        if footprint > self.free(store) {
            return Err(DbError::Full);
        }

        self.admit(self.layout.timing().write_budget)?;

        let tail = self.tails[store.index()];
        let addr = self.layout.region(store).start_offset() + tail;
        let result = self.program_record(addr, record_type, payload, extra);
        // A half-programmed record still occupies its slot.
        self.tails[store.index()] = tail + footprint;
        result
    }

    fn read_current(
        &mut self,
        cursor: &mut NorCursor,
        offset: usize,
        dest: &mut [u8],
    ) -> Result<usize, DbError> {
        let (region, pos, header) = self.live_header(cursor)?;
        self.copy_out(region, pos, &header, offset, dest)
    }

    fn read_next(
        &mut self,
        cursor: &mut NorCursor,
        filter: RecordType,
        offset: usize,
        dest: &mut [u8],
    ) -> Result<usize, DbError> {
        let store = bound_store(cursor)?;
        let region = self.layout.region(store);
        let tail = self.tails[store.index()];
        let mut pos = cursor.next;

        while pos < tail {
            let header = self.read_header(region, pos)?;
            let next = pos + header.footprint();

            if header.is_valid() && filter.matches(header.record_type) {
                cursor.current = Some(pos);
                cursor.next = next;
                return self.copy_out(region, pos, &header, offset, dest);
            }
            pos = next;
        }

        cursor.current = None;
        cursor.next = pos;
        Err(DbError::EndOfDb)
    }

    fn compare_current(
        &mut self,
        cursor: &mut NorCursor,
        offset: usize,
        pattern: &[u8],
    ) -> Ordering {
        let Ok((region, pos, header)) = self.live_header(cursor) else {
            return Ordering::Greater;
        };

        let available = header.content_len().saturating_sub(offset);
        let addr = region.start_offset() + pos + RECORD_HEADER_SIZE + offset.min(header.content_len()) as u32;
        self.compare_at(addr, available, pattern)
            .unwrap_or(Ordering::Greater)
    }

    fn delete_current(&mut self, cursor: &mut NorCursor) -> Result<(), DbError> {
        let (region, pos, _) = self.live_header(cursor)?;
        self.admit(self.layout.timing().write_budget)?;
        self.write_status(region.start_offset() + pos, STATUS_DELETED)
    }

    fn erase(&mut self, store: StoreId) -> Result<(), DbError> {
        let region = self.layout.region(store);
        let sectors = region.size() / F::ERASE_SIZE as u32;
        let budget = self
            .layout
            .timing()
            .erase_budget
            .saturating_mul(i32::try_from(sectors).unwrap_or(i32::MAX));
        self.admit(budget)?;

        #[cfg(feature = "log")]
        log::info!("erasing {} ({} sectors)", store, sectors);
        #[cfg(feature = "defmt")]
        defmt::info!("erasing {} ({} sectors)", store, sectors);

        let start = region.start_offset();
        let result = self
            .flash
            .erase(start, start + region.size())
            .map_err(flash_error);
        // Even a partial erase may have wiped the head of the log.
        self.tails[store.index()] = self.scan_tail(store)?;
        result
    }
}
