//! A device abstraction for up to two servos on ATtiny24/44/84 Timer1.
//!
//! See [`ServoDriver`] for usage examples.

use crate::logging::{log_debug, log_info, log_warn};
use crate::servo::{
    ChannelState, MAX_PULSE_US, MAX_PULSE_US_DEFAULT, MIN_PULSE_US_DEFAULT, ServoChannel,
    compare_unit_for_pin,
};
use crate::timer::{self, CompareUnit, PULSE_HZ, TimerRegisters};
use crate::{Error, Result};

/// Angle written by [`ServoDriver::center`].
const CENTER_DEGREES: i16 = 90;

/// Drives up to two hobby servos from Timer1 in fast PWM mode.
///
/// The driver owns the timer registers and a table of at most one channel per
/// compare unit. Pins 6 (OC1A) and 5 (OC1B) are the only servo pins.
///
/// Every write connects the channel and programs its compare register. The timer then
/// sends one pulse every 20 ms and raises a compare-match interrupt for it; route those
/// interrupts to [`on_compare_match`](Self::on_compare_match). After 50 pulses (one
/// second) the channel releases its pin. Write again at least once a second to keep a
/// servo holding its position.
///
/// Rejected requests (unknown pin, occupied unit, unattached unit) change nothing and
/// return an [`Error`] the caller may ignore.
///
/// # Example
///
/// Runs against the host register file (`host` feature).
///
#[cfg_attr(feature = "host", doc = "```rust")]
#[cfg_attr(not(feature = "host"), doc = "```rust,ignore")]
/// use tiny_servo::servo::{ChannelState, PIN_A, PIN_B};
/// use tiny_servo::servo_driver::ServoDriver;
/// use tiny_servo::timer::CompareUnit;
/// use tiny_servo::timer_host::MockTimer;
///
/// let mut servos = ServoDriver::new(MockTimer::new());
///
/// let arm = servos.attach(PIN_A)?; // 1000..=2500 us
/// let claw = servos.attach_with_bounds(PIN_B, 544, 2_400)?;
///
/// assert_eq!(servos.write_angle(arm, 90)?, 1_750);
/// assert_eq!(servos.write_angle(claw, 200)?, 2_400); // clamped to 180 degrees
///
/// // One second of compare-match interrupts releases the servo.
/// for _ in 0..50 {
///     servos.on_compare_match(CompareUnit::A);
/// }
/// assert_eq!(servos.state(arm), Some(ChannelState::Disconnected));
/// # Ok::<(), tiny_servo::Error>(())
/// ```
#[derive(Debug)]
pub struct ServoDriver<R> {
    registers: R,
    channels: [Option<ServoChannel>; 2],
    timer_configured: bool,
}

impl<R: TimerRegisters> ServoDriver<R> {
    /// Create a driver with no channels attached.
    ///
    /// The timer is left untouched until the first successful attach.
    #[must_use]
    pub const fn new(registers: R) -> Self {
        Self {
            registers,
            channels: [None, None],
            timer_configured: false,
        }
    }

    /// Attach a servo on `pin` with the default 1000..=2500 us pulse range.
    ///
    /// See [`attach_with_bounds`](Self::attach_with_bounds).
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedPin`] or [`Error::UnitOccupied`] without changing
    /// any state.
    pub fn attach(&mut self, pin: u8) -> Result<CompareUnit> {
        self.attach_with_bounds(pin, MIN_PULSE_US_DEFAULT, MAX_PULSE_US_DEFAULT)
    }

    /// Attach a servo on `pin` whose 0 and 180 degree positions are `min_pulse_us` and
    /// `max_pulse_us`.
    ///
    /// The first attach puts Timer1 into fast PWM at 50 Hz. The pin becomes an output,
    /// but the servo receives no pulses until the first write.
    ///
    /// Bounds above [`MAX_PULSE_US`] are lowered to it, so every pulse ends inside the
    /// 20 ms period and raises its compare interrupt.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedPin`] if `pin` has no compare output, and
    /// [`Error::UnitOccupied`] if another servo already owns the unit. Neither touches
    /// the registers or the existing channel.
    pub fn attach_with_bounds(
        &mut self,
        pin: u8,
        min_pulse_us: u16,
        max_pulse_us: u16,
    ) -> Result<CompareUnit> {
        let Some(unit) = compare_unit_for_pin(pin) else {
            log_warn!("servo pin {} has no Timer1 output", pin);
            return Err(Error::UnsupportedPin(pin));
        };

        let slot = self.slot_mut(unit);
        if slot.is_some() {
            log_warn!("servo unit {} already attached", unit);
            return Err(Error::UnitOccupied(unit));
        }
        let min_pulse_us = min_pulse_us.min(MAX_PULSE_US);
        let max_pulse_us = max_pulse_us.min(MAX_PULSE_US);
        *slot = Some(ServoChannel::new(pin, unit, min_pulse_us, max_pulse_us));

        let registers = &mut self.registers;
        let configure_timer = !self.timer_configured;
        critical_section::with(|_| {
            if configure_timer {
                timer::configure_fast_pwm(registers);
            }
            timer::set_output(registers, port_bit(pin));
        });
        if configure_timer {
            self.timer_configured = true;
            log_info!("servo timer top={} rate={}Hz", timer::TIMER_TOP, PULSE_HZ);
        }

        log_info!(
            "servo pin {} -> unit {} ({}..{}us)",
            pin, unit, min_pulse_us, max_pulse_us
        );
        Ok(unit)
    }

    /// Move the servo on `unit` to `degrees`, clamped into `0..=180`.
    ///
    /// Connects the channel if it was released. Writing to a channel that is already
    /// connected updates the pulse width but does not restart its one-second window.
    ///
    /// Returns the pulse width written, in microseconds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotAttached`] if no servo owns `unit`.
    pub fn write_angle(&mut self, unit: CompareUnit, degrees: i16) -> Result<u16> {
        let Self {
            registers,
            channels,
            ..
        } = self;
        let channel = attached_mut(channels, unit)?;
        let pulse_us = channel.pulse_us_for_degrees(degrees);
        drive(registers, channel, pulse_us);
        log_debug!("servo unit {} {}deg -> {}us", unit, degrees, pulse_us);
        Ok(pulse_us)
    }

    /// Write a raw pulse width, clamped into the channel's bounds.
    ///
    /// Same connection behavior as [`write_angle`](Self::write_angle).
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotAttached`] if no servo owns `unit`.
    pub fn write_pulse_us(&mut self, unit: CompareUnit, pulse_us: u16) -> Result<u16> {
        let Self {
            registers,
            channels,
            ..
        } = self;
        let channel = attached_mut(channels, unit)?;
        let clamped_us = channel.clamp_pulse_us(pulse_us);
        drive(registers, channel, clamped_us);
        log_debug!("servo unit {} pulse {}us", unit, clamped_us);
        Ok(clamped_us)
    }

    /// Move the servo on `unit` to 90 degrees.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotAttached`] if no servo owns `unit`.
    pub fn center(&mut self, unit: CompareUnit) -> Result<u16> {
        self.write_angle(unit, CENTER_DEGREES)
    }

    /// Release the servo now instead of waiting for the one-second timeout.
    ///
    /// The pin keeps its last level and the pulse counter restarts from zero on the next
    /// write.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotAttached`] if no servo owns `unit`.
    pub fn relax(&mut self, unit: CompareUnit) -> Result<()> {
        let Self {
            registers,
            channels,
            ..
        } = self;
        let channel = attached_mut(channels, unit)?;
        release(registers, channel);
        log_info!("servo unit {} relaxed", unit);
        Ok(())
    }

    /// Handle one compare-match interrupt for `unit`.
    ///
    /// This is the only driver code meant to run in interrupt context. Each call counts
    /// one pulse; the 50th releases the channel and resets its counter. Events for an
    /// empty unit or a released channel are ignored.
    ///
    /// Returns the channel's state after the event, or `None` if no servo owns `unit`.
    pub fn on_compare_match(&mut self, unit: CompareUnit) -> Option<ChannelState> {
        let Self {
            registers,
            channels,
            ..
        } = self;
        let channel = attached_mut(channels, unit).ok()?;
        if channel.is_connected() && channel.count_pulse() {
            release(registers, channel);
            log_debug!("servo unit {} released after {} pulses", unit, PULSE_HZ);
        }
        Some(channel.state())
    }

    /// The channel attached to `unit`, if any.
    #[must_use]
    pub const fn channel(&self, unit: CompareUnit) -> Option<&ServoChannel> {
        let [slot_a, slot_b] = &self.channels;
        match unit {
            CompareUnit::A => slot_a.as_ref(),
            CompareUnit::B => slot_b.as_ref(),
        }
    }

    /// Whether a servo owns `unit`.
    #[must_use]
    pub const fn is_attached(&self, unit: CompareUnit) -> bool {
        self.channel(unit).is_some()
    }

    /// Connection state of the channel on `unit`, if any.
    #[must_use]
    pub fn state(&self, unit: CompareUnit) -> Option<ChannelState> {
        self.channel(unit).map(ServoChannel::state)
    }

    /// Last pulse width written to `unit`, if any.
    #[must_use]
    pub fn pulse_width_us(&self, unit: CompareUnit) -> Option<u16> {
        self.channel(unit).and_then(ServoChannel::pulse_width_us)
    }

    /// The register backend, for inspection.
    #[must_use]
    pub const fn registers(&self) -> &R {
        &self.registers
    }

    const fn slot_mut(&mut self, unit: CompareUnit) -> &mut Option<ServoChannel> {
        slot_mut(&mut self.channels, unit)
    }
}

const fn slot_mut(
    channels: &mut [Option<ServoChannel>; 2],
    unit: CompareUnit,
) -> &mut Option<ServoChannel> {
    let [slot_a, slot_b] = channels;
    match unit {
        CompareUnit::A => slot_a,
        CompareUnit::B => slot_b,
    }
}

fn attached_mut(
    channels: &mut [Option<ServoChannel>; 2],
    unit: CompareUnit,
) -> Result<&mut ServoChannel> {
    slot_mut(channels, unit)
        .as_mut()
        .ok_or(Error::NotAttached(unit))
}

/// Connect the channel if needed, then program its compare register.
fn drive(registers: &mut impl TimerRegisters, channel: &mut ServoChannel, pulse_us: u16) {
    critical_section::with(|_| {
        let compare_register = if channel.is_connected() {
            channel.unit().compare_register()
        } else {
            timer::connect(registers, channel.unit())
        };
        registers.write16(compare_register, pulse_us);
        channel.mark_connected(pulse_us);
    });
}

fn release(registers: &mut impl TimerRegisters, channel: &mut ServoChannel) {
    critical_section::with(|_| {
        timer::disconnect(registers, channel.unit());
        channel.mark_disconnected();
    });
}

/// `DDRA` bit for a servo pin. Servo pins are port A pins with matching numbers.
const fn port_bit(pin: u8) -> u8 {
    match 1_u8.checked_shl(pin as u32) {
        Some(bit) => bit,
        None => 0,
    }
}
