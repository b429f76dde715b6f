//! Ports define the interfaces between the domain and the outside world.
//!
//! This module contains the **secondary (driven) ports** the adaptation
//! layer depends on: the record database, the system clock and the radio
//! scheduler, plus the gate the record database consults before touching
//! flash.

mod radio;
mod record_database;

pub use radio::{AlwaysPermit, FlashGate, RadioScheduler, SysClock};
pub use record_database::RecordDatabase;
