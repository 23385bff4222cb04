//! Pulse-width output contract.

use core::fmt;
use core::time::Duration;

/// Error from a pulse-output operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PwmError {
    /// The peripheral rejected the operation at the I/O level.
    Io,
    /// Channel index beyond the implemented channel count.
    ChannelOutOfRange,
}

impl fmt::Display for PwmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io => write!(f, "pwm I/O error"),
            Self::ChannelOutOfRange => write!(f, "pwm channel out of range"),
        }
    }
}

/// Pulse-width modulation peripheral.
///
/// One peripheral drives several output channels that share a single period
/// and counter top; each channel carries its own compare value.
pub trait Pwm {
    /// Set the time between rising flanks of the square wave, shared by all
    /// channels of this peripheral.
    fn set_period(&mut self, period: Duration) -> Result<(), PwmError>;

    /// The counter wrap value defining the duty-cycle resolution.
    fn top(&self) -> u32;

    /// Set `channel`'s compare value, e.g. `top() / 4` for a 25% duty cycle.
    ///
    /// Any value up to [`top`] is valid by construction; errors are only I/O
    /// failures or a channel index beyond the implemented count.
    ///
    /// [`top`]: Pwm::top
    fn set(&mut self, channel: u8, value: u32) -> Result<(), PwmError>;
}
