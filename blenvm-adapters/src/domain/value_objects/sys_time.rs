//! System tick value object.

use core::fmt;

/// A reading of the free-running 32-bit system timer.
///
/// The counter wraps; only differences between two nearby readings are
/// meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SysTime(u32);

impl SysTime {
    /// Create a time from raw ticks.
    #[inline]
    pub const fn from_ticks(ticks: u32) -> Self {
        Self(ticks)
    }

    /// Raw tick count.
    #[inline]
    pub const fn ticks(self) -> u32 {
        self.0
    }

    /// Signed ticks from `earlier` to `self`, tolerating counter wraparound.
    ///
    /// # Examples
    ///
    /// ```
    /// use blenvm_adapters::domain::SysTime;
    ///
    /// let before_wrap = SysTime::from_ticks(u32::MAX - 4);
    /// let after_wrap = SysTime::from_ticks(5);
    /// assert_eq!(after_wrap.ticks_since(before_wrap), 10);
    /// assert_eq!(before_wrap.ticks_since(after_wrap), -10);
    /// ```
    #[inline]
    pub const fn ticks_since(self, earlier: SysTime) -> i32 {
        self.0.wrapping_sub(earlier.0) as i32
    }
}

impl fmt::Display for SysTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}t", self.0)
    }
}

impl From<u32> for SysTime {
    fn from(ticks: u32) -> Self {
        Self::from_ticks(ticks)
    }
}
