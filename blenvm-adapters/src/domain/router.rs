//! Store router - maps record types to stores and tracks the current store.

use crate::domain::value_objects::{NvmConfig, RecordType, StoreId};

/// Routes each record type to one of the two stores.
///
/// The router also owns the current-store selection. `add` and `get`
/// reselect through [`select`](Self::select); `compare` and `discard` read
/// [`current`](Self::current) and act on the store last addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreRouter {
    config: NvmConfig,
    current: StoreId,
}

impl StoreRouter {
    /// Create a router with the security/GATT store selected.
    pub const fn new(config: NvmConfig) -> Self {
        Self {
            config,
            current: StoreId::SecurityGatt,
        }
    }

    /// The store `record_type` belongs to.
    ///
    /// Only the configured identity type routes to the identity store;
    /// every other tag, including [`RecordType::ANY`], routes to the
    /// security/GATT store.
    #[inline]
    pub const fn route(&self, record_type: RecordType) -> StoreId {
        if record_type.value() == self.config.identity_record_type().value() {
            StoreId::DeviceIdentity
        } else {
            StoreId::SecurityGatt
        }
    }

    /// Make the store of `record_type` current and return it.
    #[inline]
    pub fn select(&mut self, record_type: RecordType) -> StoreId {
        self.current = self.route(record_type);
        self.current
    }

    /// The store last selected.
    #[inline]
    pub const fn current(&self) -> StoreId {
        self.current
    }

    /// The routing configuration.
    #[inline]
    pub const fn config(&self) -> &NvmConfig {
        &self.config
    }
}

impl Default for StoreRouter {
    fn default() -> Self {
        Self::new(NvmConfig::default())
    }
}
