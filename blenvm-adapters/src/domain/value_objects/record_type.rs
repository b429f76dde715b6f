//! Record type tag value object.

use core::fmt;

/// Caller-supplied discriminator of a logical record category.
///
/// The tag is opaque to the adaptation layer except for two uses: routing a
/// record to its store, and filtering records during a seek.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RecordType(u8);

impl RecordType {
    /// Security (bonding) records.
    pub const SECURITY: Self = Self(0);
    /// GATT server records (CCCD values, service change state).
    pub const GATT: Self = Self(1);
    /// Device identity record.
    pub const DEVICE_ID: Self = Self(2);
    /// Wildcard filter matching every record type.
    pub const ANY: Self = Self(0xFF);

    /// Create a record type from its raw tag.
    #[inline]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Get the raw tag.
    #[inline]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Whether this is the wildcard filter.
    #[inline]
    pub const fn is_any(self) -> bool {
        self.0 == Self::ANY.0
    }

    /// Whether a stored record of type `stored` passes this filter.
    #[inline]
    pub const fn matches(self, stored: RecordType) -> bool {
        self.is_any() || self.0 == stored.0
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::SECURITY => write!(f, "Security"),
            Self::GATT => write!(f, "Gatt"),
            Self::DEVICE_ID => write!(f, "DeviceId"),
            Self::ANY => write!(f, "Any"),
            Self(other) => write!(f, "Type({:#04x})", other),
        }
    }
}

impl From<u8> for RecordType {
    fn from(value: u8) -> Self {
        Self::new(value)
    }
}

impl From<RecordType> for u8 {
    fn from(record_type: RecordType) -> Self {
        record_type.value()
    }
}
