//! Build-time routing configuration.

use super::RecordType;

/// Configuration of the store router.
///
/// The identity tag is fixed when the stack is built; it is not negotiated
/// at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NvmConfig {
    identity_record_type: RecordType,
}

impl NvmConfig {
    /// Create a configuration routing `identity_record_type` to the identity store.
    ///
    /// # Panics
    ///
    /// Panics if `identity_record_type` is the wildcard [`RecordType::ANY`],
    /// which must keep routing to the security/GATT store.
    pub const fn new(identity_record_type: RecordType) -> Self {
        assert!(
            !identity_record_type.is_any(),
            "identity record type cannot be the wildcard"
        );
        Self { identity_record_type }
    }

    /// The record type stored in the device identity store.
    #[inline]
    pub const fn identity_record_type(&self) -> RecordType {
        self.identity_record_type
    }
}

impl Default for NvmConfig {
    fn default() -> Self {
        Self::new(RecordType::DEVICE_ID)
    }
}
