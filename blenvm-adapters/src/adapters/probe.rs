//! Debug instrumentation around flash-affecting operations.
//!
//! On hardware the probe is usually a spare GPIO watched with a logic
//! analyzer, so flash activity can be lined up against radio events. It has
//! no functional effect on the façade.

/// Marks the start and end of a flash-affecting façade operation.
pub trait DebugProbe {
    /// A flash-affecting operation starts.
    fn enter(&mut self);
    /// The operation finished, whatever its outcome.
    fn exit(&mut self);
}

/// Probe that does nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoProbe;

impl DebugProbe for NoProbe {
    #[inline]
    fn enter(&mut self) {}

    #[inline]
    fn exit(&mut self) {}
}

/// Probe driving a GPIO high for the duration of the operation.
///
/// Pin errors are ignored.
#[cfg(feature = "embedded-hal")]
#[derive(Debug)]
pub struct PinProbe<P> {
    pin: P,
}

#[cfg(feature = "embedded-hal")]
impl<P: embedded_hal::digital::OutputPin> PinProbe<P> {
    /// Wrap an output pin; it is driven low immediately.
    pub fn new(mut pin: P) -> Self {
        let _ = pin.set_low();
        Self { pin }
    }

    /// Release the pin.
    pub fn into_inner(self) -> P {
        self.pin
    }
}

#[cfg(feature = "embedded-hal")]
impl<P: embedded_hal::digital::OutputPin> DebugProbe for PinProbe<P> {
    #[inline]
    fn enter(&mut self) {
        let _ = self.pin.set_high();
    }

    #[inline]
    fn exit(&mut self) {
        let _ = self.pin.set_low();
    }
}
