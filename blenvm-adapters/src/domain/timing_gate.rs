//! Radio-timing gate - decides whether flash may be touched right now.

use crate::domain::{
    ports::{FlashGate, RadioScheduler, SysClock},
    value_objects::SysTime,
};

/// Permits a flash operation only if it cannot overlap the next radio
/// activity.
///
/// The gate is a single non-blocking check. It never waits or retries; a
/// record database that is denied reports busy and the caller retries.
///
/// # Examples
///
/// ```
/// use blenvm_adapters::domain::{RadioTimingGate, SysTime};
///
/// let now = || SysTime::from_ticks(1_000);
/// let next = || Some(SysTime::from_ticks(1_100));
/// let gate = RadioTimingGate::new(now, next);
///
/// assert!(gate.permits(99));
/// assert!(!gate.permits(100));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RadioTimingGate<C, R> {
    clock: C,
    scheduler: R,
}

impl<C, R> RadioTimingGate<C, R>
where
    C: SysClock,
    R: RadioScheduler,
{
    /// Create a gate over a system clock and a radio schedule.
    pub const fn new(clock: C, scheduler: R) -> Self {
        Self { clock, scheduler }
    }

    /// Whether an operation needing `budget` ticks may start now.
    ///
    /// An idle radio permits any budget, negative ones included. Otherwise
    /// the time left until the next radio activity must be strictly greater
    /// than `budget`.
    pub fn permits(&self, budget: i32) -> bool {
        let now = self.clock.now();

        let Some(next_activity) = self.scheduler.next_radio_activity() else {
            return true;
        };

        let remaining = next_activity.ticks_since(now);
        let permitted = remaining > budget;

        #[cfg(feature = "log")]
        if !permitted {
            log::trace!(
                "flash deferred: {} ticks to radio activity at {}, {} needed",
                remaining,
                next_activity,
                budget
            );
        }
        #[cfg(feature = "defmt")]
        if !permitted {
            defmt::trace!(
                "flash deferred: {} ticks to radio activity, {} needed",
                remaining,
                budget
            );
        }

        permitted
    }

    /// Time left until the next radio activity, or `None` when idle.
    pub fn remaining(&self) -> Option<i32> {
        let now: SysTime = self.clock.now();
        self.scheduler
            .next_radio_activity()
            .map(|next| next.ticks_since(now))
    }
}

impl<C, R> FlashGate for RadioTimingGate<C, R>
where
    C: SysClock,
    R: RadioScheduler,
{
    #[inline]
    fn may_proceed(&self, budget: i32) -> bool {
        self.permits(budget)
    }
}
