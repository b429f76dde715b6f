//! Domain layer - routing, traversal and timing rules with zero
//! infrastructure dependencies.
//!
//! The domain layer contains:
//! - **Entities**: `StoreHandle`, one long-lived cursor per store
//! - **Value Objects**: `StoreId`, `RecordType`, `SeekMode`, `SysTime`, ...
//! - **Domain Services**: the store router, the seek controller and the
//!   radio-timing gate
//! - **Ports**: `RecordDatabase`, `SysClock`, `RadioScheduler`, `FlashGate`
//! - **Domain Errors**: `DbError` from the database, `NvmError` for the stack
//!
//! # Hexagonal Architecture
//!
//! ```text
//!     ┌──────────────────────────────────┐
//!     │      Domain Layer (Core)         │
//!     │                                  │
//!     │  ┌────────────────────────────┐  │
//!     │  │  Entities & Value Objects  │  │
//!     │  │  - StoreHandle, StoreId    │  │
//!     │  └────────────────────────────┘  │
//!     │              ▲                   │
//!     │  ┌────────────────────────────┐  │
//!     │  │    Domain Services         │  │
//!     │  │    - StoreRouter           │  │
//!     │  │    - seek()                │  │
//!     │  │    - RadioTimingGate       │  │
//!     │  └────────────────────────────┘  │
//!     │              │                   │
//!     │              ▼                   │
//!     │  ┌────────────────────────────┐  │
//!     │  │    Ports (Interfaces)      │  │
//!     │  │    - RecordDatabase        │  │
//!     │  │    - SysClock, Radio...    │  │
//!     │  └────────────────────────────┘  │
//!     └──────────────────────────────────┘
//!                    ▲
//!                    │ implemented by
//!     ┌──────────────────────────────────┐
//!     │      Adapter Layer               │
//!     │  - NvmAdapter (façade)           │
//!     │  - MemoryRecordDb                │
//!     │  - NorFlashRecordDb              │
//!     └──────────────────────────────────┘
//! ```

pub mod cursor;
pub mod entities;
pub mod error;
pub mod ports;
pub mod value_objects;

mod router;
mod timing_gate;

pub use cursor::seek;
pub use entities::{CursorState, HandlePair, StoreHandle};
pub use error::{DbError, NvmError};
pub use ports::{AlwaysPermit, FlashGate, RadioScheduler, RecordDatabase, SysClock};
pub use router::StoreRouter;
pub use timing_gate::RadioTimingGate;
pub use value_objects::{
    compare_record_bytes, CompareOutcome, DiscardMode, NvmConfig, RecordType, SeekMode, StoreId,
    SysTime,
};
