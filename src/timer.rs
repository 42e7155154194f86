//! Timer1 register layout and the register sequences the servo driver issues.
//!
//! The driver never touches hardware directly. It names registers through [`Reg8`]
//! and [`Reg16`] and goes through a [`TimerRegisters`] backend, so the same sequences
//! run against the real ATtiny84 peripheral or a host-side register file.

use derive_more::Display;

// ============================================================================
// Constants
// ============================================================================

/// Timer1 TOP (`ICR1`). 8 MHz / 8 / 20000 = 50 Hz.
pub const TIMER_TOP: u16 = 20_000;

/// Control pulses per second at [`TIMER_TOP`].
pub const PULSE_HZ: u8 = 50;

/// Bit masks for the Timer1 and port registers, matching the ATtiny24/44/84 datasheet.
pub mod bits {
    /// `TCCR1A`: clear OC1A on compare match, set at BOTTOM.
    pub const COM1A1: u8 = 1 << 7;
    /// `TCCR1A`: clear OC1B on compare match, set at BOTTOM.
    pub const COM1B1: u8 = 1 << 5;
    /// `TCCR1A`: waveform generation mode bit 1.
    pub const WGM11: u8 = 1 << 1;

    /// `TCCR1B`: waveform generation mode bit 3.
    pub const WGM13: u8 = 1 << 4;
    /// `TCCR1B`: waveform generation mode bit 2.
    pub const WGM12: u8 = 1 << 3;
    /// `TCCR1B`: clock select, clk/8.
    pub const CS11: u8 = 1 << 1;

    /// `TIMSK1`: output compare B match interrupt enable.
    pub const OCIE1B: u8 = 1 << 2;
    /// `TIMSK1`: output compare A match interrupt enable.
    pub const OCIE1A: u8 = 1 << 1;

    /// `TCCR1A` value for mode 14 (fast PWM, TOP = `ICR1`) with both outputs disconnected.
    pub const TCCR1A_FAST_PWM: u8 = WGM11;
    /// `TCCR1B` value for mode 14 with a /8 prescaler.
    pub const TCCR1B_FAST_PWM_DIV8: u8 = CS11 | WGM12 | WGM13;
}

// ============================================================================
// Register identifiers
// ============================================================================

/// 8-bit registers the driver reads and writes.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reg8 {
    /// Timer1 control register A (compare output and low waveform bits).
    Tccr1a,
    /// Timer1 control register B (high waveform bits and clock select).
    Tccr1b,
    /// Timer1 interrupt mask.
    Timsk1,
    /// Port A data direction.
    Ddra,
}

/// 16-bit registers the driver writes.
///
/// `Ocr1a` and `Ocr1b` are the compare-register handles returned when a channel
/// connects.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reg16 {
    /// Input capture register, used as TOP in mode 14.
    Icr1,
    /// Output compare register A.
    Ocr1a,
    /// Output compare register B.
    Ocr1b,
}

/// One of the two Timer1 compare units.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CompareUnit {
    /// Drives OC1A.
    A,
    /// Drives OC1B.
    B,
}

impl CompareUnit {
    /// Both units, in registry order.
    pub const ALL: [Self; 2] = [Self::A, Self::B];

    /// The `OCR1x` register this unit compares against.
    #[must_use]
    pub const fn compare_register(self) -> Reg16 {
        match self {
            Self::A => Reg16::Ocr1a,
            Self::B => Reg16::Ocr1b,
        }
    }

    /// `TCCR1A` bit that hands the pin to the timer.
    #[must_use]
    pub const fn output_mode_bit(self) -> u8 {
        match self {
            Self::A => bits::COM1A1,
            Self::B => bits::COM1B1,
        }
    }

    /// `TIMSK1` bit that enables this unit's compare-match interrupt.
    #[must_use]
    pub const fn interrupt_bit(self) -> u8 {
        match self {
            Self::A => bits::OCIE1A,
            Self::B => bits::OCIE1B,
        }
    }
}

// ============================================================================
// Backend trait
// ============================================================================

/// Register access for Timer1 and its output port.
///
/// Implementations perform plain volatile accesses. Callers are responsible for
/// running read-modify-write sequences inside a critical section.
pub trait TimerRegisters {
    /// Read an 8-bit register.
    fn read8(&mut self, reg: Reg8) -> u8;

    /// Write an 8-bit register.
    fn write8(&mut self, reg: Reg8, value: u8);

    /// Write a 16-bit register.
    fn write16(&mut self, reg: Reg16, value: u16);

    /// Read, transform and write back an 8-bit register.
    fn modify8(&mut self, reg: Reg8, f: impl FnOnce(u8) -> u8) {
        let value = self.read8(reg);
        self.write8(reg, f(value));
    }
}

// ============================================================================
// Register sequences
// ============================================================================

/// Put Timer1 in fast PWM mode 14 with a /8 prescaler and TOP = [`TIMER_TOP`].
///
/// Both compare outputs start disconnected.
pub(crate) fn configure_fast_pwm(registers: &mut impl TimerRegisters) {
    registers.write8(Reg8::Tccr1a, bits::TCCR1A_FAST_PWM);
    registers.write8(Reg8::Tccr1b, bits::TCCR1B_FAST_PWM_DIV8);
    registers.write16(Reg16::Icr1, TIMER_TOP);
}

/// Enable the unit's compare interrupt and hand its pin to the timer.
///
/// Returns the compare register to program with the pulse width.
pub(crate) fn connect(registers: &mut impl TimerRegisters, unit: CompareUnit) -> Reg16 {
    registers.modify8(Reg8::Timsk1, |timsk| timsk | unit.interrupt_bit());
    registers.modify8(Reg8::Tccr1a, |tccr| tccr | unit.output_mode_bit());
    unit.compare_register()
}

/// Disable the unit's compare interrupt and release its pin.
///
/// The pin keeps whatever level it last had.
pub(crate) fn disconnect(registers: &mut impl TimerRegisters, unit: CompareUnit) {
    registers.modify8(Reg8::Timsk1, |timsk| timsk & !unit.interrupt_bit());
    registers.modify8(Reg8::Tccr1a, |tccr| tccr & !unit.output_mode_bit());
}

/// Make a port A pin an output.
pub(crate) fn set_output(registers: &mut impl TimerRegisters, port_bit: u8) {
    registers.modify8(Reg8::Ddra, |ddr| ddr | port_bit);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer_host::MockTimer;

    #[test]
    fn fast_pwm_mode_matches_datasheet() {
        let mut timer = MockTimer::new();
        configure_fast_pwm(&mut timer);

        assert_eq!(timer.reg8(Reg8::Tccr1a), 0b0000_0010);
        assert_eq!(timer.reg8(Reg8::Tccr1b), 0b0001_1010);
        assert_eq!(timer.reg16(Reg16::Icr1), 20_000);
    }

    #[test]
    fn connect_only_touches_its_own_unit() {
        let mut timer = MockTimer::new();
        configure_fast_pwm(&mut timer);

        let register = connect(&mut timer, CompareUnit::B);

        assert_eq!(register, Reg16::Ocr1b);
        assert_eq!(timer.reg8(Reg8::Timsk1), bits::OCIE1B);
        assert_eq!(timer.reg8(Reg8::Tccr1a), bits::WGM11 | bits::COM1B1);
    }

    #[test]
    fn disconnect_keeps_the_other_unit_running() {
        let mut timer = MockTimer::new();
        configure_fast_pwm(&mut timer);
        connect(&mut timer, CompareUnit::A);
        connect(&mut timer, CompareUnit::B);

        disconnect(&mut timer, CompareUnit::A);

        assert_eq!(timer.reg8(Reg8::Timsk1), bits::OCIE1B);
        assert_eq!(timer.reg8(Reg8::Tccr1a), bits::WGM11 | bits::COM1B1);
    }

    #[test]
    fn set_output_preserves_other_direction_bits() {
        let mut timer = MockTimer::new();
        timer.write8(Reg8::Ddra, 0b0000_0001);

        set_output(&mut timer, 1 << 6);

        assert_eq!(timer.reg8(Reg8::Ddra), 0b0100_0001);
    }
}
