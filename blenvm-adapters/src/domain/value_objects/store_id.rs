//! Identifier of the two logical record stores.

use core::fmt;

/// One of the two record stores managed by the adaptation layer.
///
/// The topology is fixed: there is no way to name a third store, and every
/// `match` over `StoreId` is exhaustive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreId {
    /// Bonding/security keys and GATT server data.
    SecurityGatt,
    /// Device identity data (address, IRK). Never deleted record by record.
    DeviceIdentity,
}

impl StoreId {
    /// Both stores, in database id order.
    pub const ALL: [StoreId; 2] = [StoreId::SecurityGatt, StoreId::DeviceIdentity];

    /// Database id of the store (`0` for security/GATT, `1` for identity).
    #[inline]
    pub const fn raw(self) -> u8 {
        match self {
            Self::SecurityGatt => 0,
            Self::DeviceIdentity => 1,
        }
    }

    /// Look up a store from its database id.
    #[inline]
    pub const fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::SecurityGatt),
            1 => Some(Self::DeviceIdentity),
            _ => None,
        }
    }

    /// Array index for per-store tables.
    #[inline]
    pub const fn index(self) -> usize {
        self.raw() as usize
    }

    /// Whether single records of this store may never be deleted.
    #[inline]
    pub const fn is_deletion_protected(self) -> bool {
        matches!(self, Self::DeviceIdentity)
    }
}

impl fmt::Display for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SecurityGatt => write!(f, "security/GATT store"),
            Self::DeviceIdentity => write!(f, "device identity store"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_ids() {
        assert_eq!(StoreId::SecurityGatt.raw(), 0);
        assert_eq!(StoreId::DeviceIdentity.raw(), 1);
        assert_eq!(StoreId::from_raw(1), Some(StoreId::DeviceIdentity));
        assert_eq!(StoreId::from_raw(2), None);
    }

    #[test]
    fn test_only_identity_is_protected() {
        assert!(StoreId::DeviceIdentity.is_deletion_protected());
        assert!(!StoreId::SecurityGatt.is_deletion_protected());
    }

    #[test]
    fn test_all_matches_indices() {
        for (i, store) in StoreId::ALL.iter().enumerate() {
            assert_eq!(store.index(), i);
        }
    }
}
