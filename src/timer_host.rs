//! A register-file stand-in for Timer1, for running the driver off-target.
//!
//! [`MockTimer`] stores every register the driver touches and counts writes, so tests
//! can check exact bit patterns and confirm that rejected calls never reach hardware.

use crate::timer::{CompareUnit, Reg8, Reg16, TimerRegisters};

/// In-memory Timer1 and port A registers.
///
/// # Example
///
/// ```rust
/// use tiny_servo::servo::PIN_A;
/// use tiny_servo::servo_driver::ServoDriver;
/// use tiny_servo::timer::{CompareUnit, Reg16};
/// use tiny_servo::timer_host::MockTimer;
///
/// let mut servos = ServoDriver::new(MockTimer::new());
/// let unit = servos.attach(PIN_A)?;
/// servos.write_angle(unit, 90)?;
///
/// assert_eq!(servos.registers().reg16(Reg16::Ocr1a), 1_750);
/// assert!(servos.registers().compare_output_enabled(CompareUnit::A));
/// # Ok::<(), tiny_servo::Error>(())
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MockTimer {
    tccr1a: u8,
    tccr1b: u8,
    timsk1: u8,
    ddra: u8,
    icr1: u16,
    ocr1a: u16,
    ocr1b: u16,
    write_count: usize,
}

impl MockTimer {
    /// All registers at their reset value of zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tccr1a: 0,
            tccr1b: 0,
            timsk1: 0,
            ddra: 0,
            icr1: 0,
            ocr1a: 0,
            ocr1b: 0,
            write_count: 0,
        }
    }

    /// Current value of an 8-bit register.
    #[must_use]
    pub const fn reg8(&self, reg: Reg8) -> u8 {
        match reg {
            Reg8::Tccr1a => self.tccr1a,
            Reg8::Tccr1b => self.tccr1b,
            Reg8::Timsk1 => self.timsk1,
            Reg8::Ddra => self.ddra,
        }
    }

    /// Current value of a 16-bit register.
    #[must_use]
    pub const fn reg16(&self, reg: Reg16) -> u16 {
        match reg {
            Reg16::Icr1 => self.icr1,
            Reg16::Ocr1a => self.ocr1a,
            Reg16::Ocr1b => self.ocr1b,
        }
    }

    /// Register writes issued so far, 8- and 16-bit combined.
    #[must_use]
    pub const fn write_count(&self) -> usize {
        self.write_count
    }

    /// Whether the unit's compare-match interrupt is enabled in `TIMSK1`.
    #[must_use]
    pub const fn compare_interrupt_enabled(&self, unit: CompareUnit) -> bool {
        self.timsk1 & unit.interrupt_bit() != 0
    }

    /// Whether the unit's pin is handed to the timer in `TCCR1A`.
    #[must_use]
    pub const fn compare_output_enabled(&self, unit: CompareUnit) -> bool {
        self.tccr1a & unit.output_mode_bit() != 0
    }

    const fn record_write(&mut self) {
        self.write_count = self.write_count.saturating_add(1);
    }
}

impl TimerRegisters for MockTimer {
    fn read8(&mut self, reg: Reg8) -> u8 {
        self.reg8(reg)
    }

    fn write8(&mut self, reg: Reg8, value: u8) {
        self.record_write();
        match reg {
            Reg8::Tccr1a => self.tccr1a = value,
            Reg8::Tccr1b => self.tccr1b = value,
            Reg8::Timsk1 => self.timsk1 = value,
            Reg8::Ddra => self.ddra = value,
        }
    }

    fn write16(&mut self, reg: Reg16, value: u16) {
        self.record_write();
        match reg {
            Reg16::Icr1 => self.icr1 = value,
            Reg16::Ocr1a => self.ocr1a = value,
            Reg16::Ocr1b => self.ocr1b = value,
        }
    }
}
