//! Per-servo channel state for hobby positional servos like the SG90.
//!
//! A [`ServoChannel`] is one servo's binding to a Timer1 compare unit: the pin it
//! drives, its pulse-width bounds, whether the timer is currently driving it, and how
//! many pulses it has sent since it last connected. The driver owns the channels; see
//! [`ServoDriver`](crate::servo_driver::ServoDriver) for usage.

use crate::timer::{CompareUnit, PULSE_HZ, TIMER_TOP};

/// Arduino pin number of OC1A (PA6) on the ATtiny24/44/84.
pub const PIN_A: u8 = 6;

/// Arduino pin number of OC1B (PA5) on the ATtiny24/44/84.
pub const PIN_B: u8 = 5;

/// Default minimum pulse width for hobby servos (microseconds).
pub const MIN_PULSE_US_DEFAULT: u16 = 1_000;

/// Default maximum pulse width for hobby servos (microseconds).
pub const MAX_PULSE_US_DEFAULT: u16 = 2_500;

/// Widest pulse the timer can produce. A compare value at or above TOP never matches,
/// so the pin would stay high and no compare interrupt would fire.
pub const MAX_PULSE_US: u16 = TIMER_TOP - 1;

/// Largest commandable angle in degrees. The smallest is 0.
pub const MAX_DEGREES: i16 = 180;

/// Compare unit wired to `pin`, or `None` if the pin has no Timer1 output.
#[must_use]
pub const fn compare_unit_for_pin(pin: u8) -> Option<CompareUnit> {
    match pin {
        PIN_A => Some(CompareUnit::A),
        PIN_B => Some(CompareUnit::B),
        _ => None,
    }
}

/// Clamp `degrees` into `0..=180`.
#[must_use]
pub const fn clamp_degrees(degrees: i16) -> i16 {
    if degrees < 0 {
        0
    } else if degrees > MAX_DEGREES {
        MAX_DEGREES
    } else {
        degrees
    }
}

/// Map `degrees` (clamped) linearly onto `[min_pulse_us, max_pulse_us]`.
///
/// Uses truncating integer division, so both endpoints are exact. Reversed bounds
/// (`min_pulse_us > max_pulse_us`) run the servo backwards.
#[must_use]
pub fn degrees_to_pulse_us(degrees: i16, min_pulse_us: u16, max_pulse_us: u16) -> u16 {
    let span = i32::from(max_pulse_us).saturating_sub(i32::from(min_pulse_us));
    let offset = i32::from(clamp_degrees(degrees))
        .saturating_mul(span)
        .saturating_div(i32::from(MAX_DEGREES));
    let pulse_us = i32::from(min_pulse_us).saturating_add(offset);
    // Always between the two bounds, so the fallback is never taken.
    u16::try_from(pulse_us).unwrap_or(min_pulse_us)
}

/// Whether the timer is driving a channel's pin.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelState {
    /// Compare output and interrupt are off. The pin holds its last level.
    #[default]
    Disconnected,
    /// The timer toggles the pin every period and counts pulses.
    Connected,
}

/// One servo's binding to a compare unit.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ServoChannel {
    pin: u8,
    unit: CompareUnit,
    min_pulse_us: u16,
    max_pulse_us: u16,
    pulse_count: u8,
    state: ChannelState,
    pulse_width_us: Option<u16>,
}

impl ServoChannel {
    pub(crate) const fn new(
        pin: u8,
        unit: CompareUnit,
        min_pulse_us: u16,
        max_pulse_us: u16,
    ) -> Self {
        Self {
            pin,
            unit,
            min_pulse_us,
            max_pulse_us,
            pulse_count: 0,
            state: ChannelState::Disconnected,
            pulse_width_us: None,
        }
    }

    /// Pin this channel drives.
    #[must_use]
    pub const fn pin(&self) -> u8 {
        self.pin
    }

    /// Compare unit this channel owns.
    #[must_use]
    pub const fn unit(&self) -> CompareUnit {
        self.unit
    }

    /// Pulse width at 0 degrees (microseconds).
    #[must_use]
    pub const fn min_pulse_us(&self) -> u16 {
        self.min_pulse_us
    }

    /// Pulse width at 180 degrees (microseconds).
    #[must_use]
    pub const fn max_pulse_us(&self) -> u16 {
        self.max_pulse_us
    }

    /// Pulses sent since the channel last connected.
    #[must_use]
    pub const fn pulse_count(&self) -> u8 {
        self.pulse_count
    }

    /// Current connection state.
    #[must_use]
    pub const fn state(&self) -> ChannelState {
        self.state
    }

    /// Last pulse width written to the compare register, if any.
    #[must_use]
    pub const fn pulse_width_us(&self) -> Option<u16> {
        self.pulse_width_us
    }

    /// Pulse width this channel would produce for `degrees`.
    #[must_use]
    pub fn pulse_us_for_degrees(&self, degrees: i16) -> u16 {
        degrees_to_pulse_us(degrees, self.min_pulse_us, self.max_pulse_us)
    }

    /// Clamp a raw pulse width into this channel's bounds.
    #[must_use]
    pub fn clamp_pulse_us(&self, pulse_us: u16) -> u16 {
        let low = self.min_pulse_us.min(self.max_pulse_us);
        let high = self.min_pulse_us.max(self.max_pulse_us);
        pulse_us.clamp(low, high)
    }

    pub(crate) const fn is_connected(&self) -> bool {
        matches!(self.state, ChannelState::Connected)
    }

    pub(crate) const fn mark_connected(&mut self, pulse_width_us: u16) {
        self.state = ChannelState::Connected;
        self.pulse_width_us = Some(pulse_width_us);
    }

    pub(crate) const fn mark_disconnected(&mut self) {
        self.state = ChannelState::Disconnected;
        self.pulse_count = 0;
    }

    /// Count one pulse. Returns `true` once a full second of pulses has gone out.
    pub(crate) fn count_pulse(&mut self) -> bool {
        self.pulse_count = self.pulse_count.saturating_add(1);
        self.pulse_count >= PULSE_HZ
    }
}
