//! Value objects for the domain layer.
//!
//! Value objects are immutable, validated data types that represent
//! concepts in the domain model.

mod compare;
mod nvm_config;
mod record_type;
mod seek_mode;
mod store_id;
mod sys_time;

pub use compare::{compare_record_bytes, CompareOutcome};
pub use nvm_config::NvmConfig;
pub use record_type::RecordType;
pub use seek_mode::{DiscardMode, SeekMode};
pub use store_id::StoreId;
pub use sys_time::SysTime;
