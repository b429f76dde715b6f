//! Adapter layer - the stack-facing façade and concrete record databases.
//!
//! # Hexagonal Architecture
//!
//! ```text
//!     ┌──────────────────────────────────┐
//!     │  BLE stack (legacy int codes)    │
//!     └────────────┬─────────────────────┘
//!                  │ calls
//!                  ▼
//!     ┌──────────────────────────────────┐
//!     │      Adapter Layer               │  ◄── This module
//!     │  - NvmAdapter + legacy codes     │
//!     │  - MemoryRecordDb                │
//!     │  - NorFlashRecordDb              │
//!     └────────────┬─────────────────────┘
//!                  │ implements
//!                  ▼
//!     ┌──────────────────────────────────┐
//!     │  Domain ports (RecordDatabase)   │
//!     └──────────────────────────────────┘
//! ```
//!
//! # Available Adapters
//!
//! - **`NvmAdapter`**: The add / get / compare / discard façade
//! - **`MemoryRecordDb`**: RAM record database (requires `alloc`)
//! - **`NorFlashRecordDb`**: Append-only log on NOR flash (requires `embedded-storage`)
//! - **`PinProbe`**: GPIO timing probe (requires `embedded-hal`)

mod nvm_adapter;
mod probe;

pub mod legacy;

#[cfg(feature = "alloc")]
mod memory_db;

#[cfg(feature = "embedded-storage")]
mod flash_layout;

#[cfg(feature = "embedded-storage")]
mod nor_flash_db;

pub use nvm_adapter::NvmAdapter;
pub use probe::{DebugProbe, NoProbe};

#[cfg(feature = "embedded-hal")]
pub use probe::PinProbe;

#[cfg(feature = "alloc")]
pub use memory_db::{MemoryCursor, MemoryRecordDb, StoredRecord};

#[cfg(feature = "embedded-storage")]
pub use flash_layout::{FlashLayout, FlashTiming, LayoutError, StoreRegion};

#[cfg(feature = "embedded-storage")]
pub use nor_flash_db::{record_footprint, NorCursor, NorFlashRecordDb, RECORD_ALIGN, RECORD_HEADER_SIZE};
