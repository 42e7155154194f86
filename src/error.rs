//! Error and result types shared by the servo driver.
//!
//! Every variant describes an input the driver refused and left alone. None of them
//! leave the timer in a partial state, so callers that prefer the silent
//! reject/clamp/no-op behavior can discard them with `let _ = ...`.

use crate::timer::CompareUnit;

/// Result alias used across the crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Reasons a servo request was ignored.
#[derive(Clone, Copy, Debug, Eq, PartialEq, derive_more::Display, derive_more::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The pin is not wired to a Timer1 compare output.
    #[display("pin {_0} is not a servo pin")]
    UnsupportedPin(#[error(not(source))] u8),

    /// Another channel already owns this compare unit.
    #[display("compare unit {_0} is already attached")]
    UnitOccupied(#[error(not(source))] CompareUnit),

    /// No channel has been attached to this compare unit.
    #[display("compare unit {_0} has no attached servo")]
    NotAttached(#[error(not(source))] CompareUnit),

    /// The static driver slot was already filled.
    #[display("servo driver already initialized")]
    AlreadyInitialized,

    /// The static driver slot is still empty.
    #[display("servo driver not initialized")]
    Uninitialized,
}
