//! Clock, radio scheduler and flash gate ports.
//!
//! The BLE link layer owns the radio schedule and the system timer; the
//! record database owns the flash. These ports let the timing gate sit
//! between them without depending on either.

use crate::domain::value_objects::SysTime;

/// Source of the current system time.
pub trait SysClock {
    /// Read the system timer.
    fn now(&self) -> SysTime;
}

/// View of the link layer's radio schedule.
pub trait RadioScheduler {
    /// Start time of the next scheduled radio activity, or `None` when the
    /// radio is idle.
    fn next_radio_activity(&self) -> Option<SysTime>;
}

/// Decision point consulted by a record database before it writes or erases
/// flash.
pub trait FlashGate {
    /// Whether an operation needing `budget` ticks may start now.
    ///
    /// Must not block. A denied operation is reported as busy and retried by
    /// the caller.
    fn may_proceed(&self, budget: i32) -> bool;
}

impl<F> SysClock for F
where
    F: Fn() -> SysTime,
{
    fn now(&self) -> SysTime {
        self()
    }
}

impl<F> RadioScheduler for F
where
    F: Fn() -> Option<SysTime>,
{
    fn next_radio_activity(&self) -> Option<SysTime> {
        self()
    }
}

impl<G: FlashGate + ?Sized> FlashGate for &G {
    fn may_proceed(&self, budget: i32) -> bool {
        (**self).may_proceed(budget)
    }
}

/// Gate for targets without a radio: every flash operation may proceed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlwaysPermit;

impl FlashGate for AlwaysPermit {
    #[inline]
    fn may_proceed(&self, _budget: i32) -> bool {
        true
    }
}
