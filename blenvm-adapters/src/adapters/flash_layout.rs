//! Placement of the two record stores in NOR flash.

use core::fmt;

use crate::domain::value_objects::StoreId;

/// A contiguous, erase-aligned flash region holding one store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StoreRegion {
    start_offset: u32,
    size: u32,
}

impl StoreRegion {
    /// Create a region of `size` bytes starting at `start_offset`.
    ///
    /// Alignment is checked by [`FlashLayout::validate`].
    pub const fn new(start_offset: u32, size: u32) -> Self {
        Self { start_offset, size }
    }

    /// Byte offset of the region in flash.
    #[inline]
    pub const fn start_offset(&self) -> u32 {
        self.start_offset
    }

    /// Region length in bytes.
    #[inline]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// One past the last byte, or `None` on overflow.
    #[inline]
    pub const fn end(&self) -> Option<u32> {
        self.start_offset.checked_add(self.size)
    }

    const fn overlaps(&self, other: &StoreRegion) -> bool {
        let (Some(end), Some(other_end)) = (self.end(), other.end()) else {
            return true;
        };
        self.start_offset < other_end && other.start_offset < end
    }
}

/// Time budgets handed to the flash gate, in system timer ticks.
///
/// Zero budgets permit an operation whenever the next radio activity is
/// still in the future.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FlashTiming {
    /// Budget for programming one record (or one status word).
    pub write_budget: i32,
    /// Budget for erasing one sector.
    pub erase_budget: i32,
}

impl FlashTiming {
    /// Create timing budgets.
    pub const fn new(write_budget: i32, erase_budget: i32) -> Self {
        Self {
            write_budget,
            erase_budget,
        }
    }
}

/// Where each store lives in flash and how long flash operations take.
///
/// # Example
///
/// ```
/// use blenvm_adapters::{FlashLayout, StoreId};
///
/// // 8 sectors of 4KB: the last one holds the identity store.
/// let layout = FlashLayout::split(8 * 4096, 4096, 1).unwrap();
/// assert_eq!(layout.region(StoreId::SecurityGatt).size(), 7 * 4096);
/// assert_eq!(layout.region(StoreId::DeviceIdentity).start_offset(), 7 * 4096);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FlashLayout {
    security_gatt: StoreRegion,
    device_identity: StoreRegion,
    timing: FlashTiming,
}

impl FlashLayout {
    /// Place both stores explicitly, with zero timing budgets.
    pub const fn new(security_gatt: StoreRegion, device_identity: StoreRegion) -> Self {
        Self {
            security_gatt,
            device_identity,
            timing: FlashTiming::new(0, 0),
        }
    }

    /// Split `capacity` bytes of flash: the last `identity_sectors` sectors
    /// hold the identity store, everything before them the security/GATT
    /// store.
    ///
    /// # Errors
    ///
    /// Returns an error if the result would not pass [`validate`](Self::validate).
    pub fn split(
        capacity: u32,
        erase_size: u32,
        identity_sectors: u32,
    ) -> Result<Self, LayoutError> {
        let identity_size = identity_sectors
            .checked_mul(erase_size)
            .ok_or(LayoutError::OutOfBounds {
                store: StoreId::DeviceIdentity,
                capacity,
            })?;
        let security_size =
            capacity
                .checked_sub(identity_size)
                .ok_or(LayoutError::OutOfBounds {
                    store: StoreId::DeviceIdentity,
                    capacity,
                })?;

        let layout = Self::new(
            StoreRegion::new(0, security_size),
            StoreRegion::new(security_size, identity_size),
        );
        layout.validate(capacity, erase_size)?;
        Ok(layout)
    }

    /// Replace the timing budgets.
    pub const fn with_timing(mut self, timing: FlashTiming) -> Self {
        self.timing = timing;
        self
    }

    /// The region of `store`.
    #[inline]
    pub const fn region(&self, store: StoreId) -> StoreRegion {
        match store {
            StoreId::SecurityGatt => self.security_gatt,
            StoreId::DeviceIdentity => self.device_identity,
        }
    }

    /// The timing budgets.
    #[inline]
    pub const fn timing(&self) -> FlashTiming {
        self.timing
    }

    /// Check the layout against a flash of `capacity` bytes erased in
    /// `erase_size` sectors.
    ///
    /// # Errors
    ///
    /// - [`LayoutError::EmptyRegion`] if a store has no space
    /// - [`LayoutError::Unaligned`] if a region does not start and end on a
    ///   sector boundary
    /// - [`LayoutError::OutOfBounds`] if a region ends past `capacity`
    /// - [`LayoutError::Overlap`] if the regions share a sector
    pub fn validate(&self, capacity: u32, erase_size: u32) -> Result<(), LayoutError> {
        for store in StoreId::ALL {
            let region = self.region(store);

            if region.size == 0 {
                return Err(LayoutError::EmptyRegion(store));
            }
            if erase_size == 0
                || region.start_offset % erase_size != 0
                || region.size % erase_size != 0
            {
                return Err(LayoutError::Unaligned { store, erase_size });
            }
            match region.end() {
                Some(end) if end <= capacity => {}
                _ => return Err(LayoutError::OutOfBounds { store, capacity }),
            }
        }

        if self.security_gatt.overlaps(&self.device_identity) {
            return Err(LayoutError::Overlap);
        }

        Ok(())
    }
}

/// Errors that can occur when validating a [`FlashLayout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LayoutError {
    /// A store region has zero size.
    EmptyRegion(StoreId),
    /// A store region is not aligned to the erase size.
    Unaligned {
        /// The offending store.
        store: StoreId,
        /// The flash erase size.
        erase_size: u32,
    },
    /// A store region extends past the end of flash.
    OutOfBounds {
        /// The offending store.
        store: StoreId,
        /// The flash capacity.
        capacity: u32,
    },
    /// The two store regions overlap.
    Overlap,
    /// The flash read or write granularity cannot address 4-byte words.
    UnsupportedWordSize {
        /// Flash read granularity.
        read_size: usize,
        /// Flash write granularity.
        write_size: usize,
    },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyRegion(store) => write!(f, "{} has no space", store),
            Self::Unaligned { store, erase_size } => write!(
                f,
                "{} is not aligned to the {} byte erase size",
                store, erase_size
            ),
            Self::OutOfBounds { store, capacity } => write!(
                f,
                "{} does not fit in {} bytes of flash",
                store, capacity
            ),
            Self::Overlap => write!(f, "Store regions overlap"),
            Self::UnsupportedWordSize {
                read_size,
                write_size,
            } => write!(
                f,
                "Flash read size {} / write size {} must divide 4",
                read_size, write_size
            ),
        }
    }
}

impl core::error::Error for LayoutError {}

#[cfg(test)]
mod tests {
    use super::*;

    const SECTOR: u32 = 4096;

    #[test]
    fn test_split() {
        let layout = FlashLayout::split(4 * SECTOR, SECTOR, 1).unwrap();
        assert_eq!(layout.region(StoreId::SecurityGatt), StoreRegion::new(0, 3 * SECTOR));
        assert_eq!(
            layout.region(StoreId::DeviceIdentity),
            StoreRegion::new(3 * SECTOR, SECTOR)
        );
    }

    #[test]
    fn test_split_without_room_for_security() {
        assert_eq!(
            FlashLayout::split(SECTOR, SECTOR, 1),
            Err(LayoutError::EmptyRegion(StoreId::SecurityGatt))
        );
        assert!(FlashLayout::split(SECTOR, SECTOR, 2).is_err());
    }

    #[test]
    fn test_unaligned_region() {
        let layout = FlashLayout::new(StoreRegion::new(0, SECTOR), StoreRegion::new(SECTOR + 4, SECTOR));
        assert_eq!(
            layout.validate(8 * SECTOR, SECTOR),
            Err(LayoutError::Unaligned {
                store: StoreId::DeviceIdentity,
                erase_size: SECTOR
            })
        );
    }

    #[test]
    fn test_out_of_bounds() {
        let layout = FlashLayout::new(StoreRegion::new(0, SECTOR), StoreRegion::new(SECTOR, 2 * SECTOR));
        assert!(matches!(
            layout.validate(2 * SECTOR, SECTOR),
            Err(LayoutError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_overlap() {
        let layout = FlashLayout::new(StoreRegion::new(0, 2 * SECTOR), StoreRegion::new(SECTOR, SECTOR));
        assert_eq!(layout.validate(4 * SECTOR, SECTOR), Err(LayoutError::Overlap));
    }

    #[test]
    fn test_with_timing() {
        let layout = FlashLayout::split(2 * SECTOR, SECTOR, 1)
            .unwrap()
            .with_timing(FlashTiming::new(40, 9000));
        assert_eq!(layout.timing().write_budget, 40);
        assert_eq!(layout.timing().erase_budget, 9000);
    }
}
