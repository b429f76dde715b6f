//! NVM adaptation layer between a BLE host stack and a record database.
//!
//! The stack persists three kinds of records: security bonds, GATT server
//! state and the device identity. This crate routes them into two stores,
//! walks each store with a long-lived cursor, and holds flash operations
//! back while the radio is about to transmit.
//!
//! # Architecture
//!
//! The crate is organized into two layers:
//!
//! ## Domain Layer (`domain`)
//! Pure rules with no infrastructure dependencies:
//! - **Entities**: `StoreHandle` with cursor state
//! - **Value Objects**: `StoreId`, `RecordType`, `SeekMode`, `SysTime`, `NvmConfig`
//! - **Services**: `StoreRouter`, `seek`, `RadioTimingGate`
//! - **Ports**: `RecordDatabase`, `SysClock`, `RadioScheduler`, `FlashGate`
//!
//! ## Adapter Layer (`adapters`)
//! Concrete implementations:
//! - **`NvmAdapter`**: The façade the stack calls (`add`, `get`, `compare`, `discard`)
//! - **`legacy`**: Raw modes and integer status codes
//! - **`MemoryRecordDb`**: RAM database (requires `alloc`)
//! - **`NorFlashRecordDb`**: NOR flash database (requires `embedded-storage`)
//!
//! # Quick Start
//!
//! ```
//! use blenvm_adapters::{MemoryRecordDb, NvmAdapter, NvmConfig, RecordType, SeekMode};
//!
//! let db = MemoryRecordDb::with_capacity(1024, 256);
//! let mut nvm = NvmAdapter::new(db, NvmConfig::default()).unwrap();
//!
//! nvm.add(RecordType::SECURITY, b"ltk", b"").unwrap();
//!
//! let mut buf = [0u8; 8];
//! let len = nvm.get(SeekMode::First, RecordType::SECURITY, 0, &mut buf).unwrap();
//! assert_eq!(&buf[..len], b"ltk");
//! ```
//!
//! # Features
//!
//! - `alloc`: Enable `MemoryRecordDb`
//! - `embedded-storage`: Enable `NorFlashRecordDb` over `embedded-storage` NOR flash
//! - `embedded-hal`: Enable `PinProbe` timing probe
//! - `std`: Build against the standard library
//! - `log`: Enable logging support
//! - `defmt`: Enable defmt logging for embedded

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![warn(missing_docs)]

// Core layers
pub mod domain;
pub mod adapters;

// Re-export commonly used types for convenience
pub use domain::{
    seek, AlwaysPermit, CompareOutcome, CursorState, DbError, DiscardMode, FlashGate, HandlePair,
    NvmConfig, NvmError, RadioScheduler, RadioTimingGate, RecordDatabase, RecordType, SeekMode,
    StoreHandle, StoreId, StoreRouter, SysClock, SysTime,
};

pub use adapters::{legacy, DebugProbe, NoProbe, NvmAdapter};

#[cfg(feature = "embedded-hal")]
pub use adapters::PinProbe;

#[cfg(feature = "alloc")]
pub use adapters::{MemoryCursor, MemoryRecordDb, StoredRecord};

#[cfg(feature = "embedded-storage")]
pub use adapters::{
    FlashLayout, FlashTiming, LayoutError, NorCursor, NorFlashRecordDb, StoreRegion,
};
