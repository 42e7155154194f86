//! Timer1 backend and interrupt vectors for the ATtiny24/44/84.
//!
//! [`SERVOS`] is the driver the `TIM1_COMPA`/`TIM1_COMPB` vectors dispatch into.
//! Call [`init`] once at startup, then enable interrupts globally.
//!
//! # Example
//!
//! ```rust,no_run
//! # #![no_std]
//! # #![no_main]
//! # use panic_halt as _;
//! use tiny_servo::attiny84::{self, SERVOS};
//! use tiny_servo::servo::PIN_A;
//!
//! # fn example() -> tiny_servo::Result<()> {
//! if let Some(dp) = avr_device::attiny84::Peripherals::take() {
//!     attiny84::init(dp.TC1, dp.PORTA)?;
//!     let unit = SERVOS.with(|servos| servos.attach(PIN_A))??;
//!     SERVOS.with(|servos| servos.write_angle(unit, 120))??;
//! }
//! # Ok(())
//! # }
//! ```

use avr_device::attiny84::{PORTA, TC1};

use crate::Result;
use crate::servo_static::ServoDriverStatic;
use crate::timer::{CompareUnit, Reg8, Reg16, TimerRegisters};

/// Timer1 and port A, owned by the servo driver.
pub struct Timer1 {
    tc1: TC1,
    porta: PORTA,
}

impl Timer1 {
    /// Take ownership of the peripherals the driver programs.
    #[must_use]
    pub const fn new(tc1: TC1, porta: PORTA) -> Self {
        Self { tc1, porta }
    }
}

impl TimerRegisters for Timer1 {
    fn read8(&mut self, reg: Reg8) -> u8 {
        match reg {
            Reg8::Tccr1a => self.tc1.tccr1a.read().bits(),
            Reg8::Tccr1b => self.tc1.tccr1b.read().bits(),
            Reg8::Timsk1 => self.tc1.timsk1.read().bits(),
            Reg8::Ddra => self.porta.ddra.read().bits(),
        }
    }

    #[expect(unsafe_code, reason = "values are built from the datasheet masks in timer::bits")]
    fn write8(&mut self, reg: Reg8, value: u8) {
        match reg {
            Reg8::Tccr1a => self.tc1.tccr1a.write(|w| unsafe { w.bits(value) }),
            Reg8::Tccr1b => self.tc1.tccr1b.write(|w| unsafe { w.bits(value) }),
            Reg8::Timsk1 => self.tc1.timsk1.write(|w| unsafe { w.bits(value) }),
            Reg8::Ddra => self.porta.ddra.write(|w| unsafe { w.bits(value) }),
        }
    }

    #[expect(unsafe_code, reason = "any 16-bit value is a valid TOP or compare value")]
    fn write16(&mut self, reg: Reg16, value: u16) {
        match reg {
            Reg16::Icr1 => self.tc1.icr1.write(|w| unsafe { w.bits(value) }),
            Reg16::Ocr1a => self.tc1.ocr1a.write(|w| unsafe { w.bits(value) }),
            Reg16::Ocr1b => self.tc1.ocr1b.write(|w| unsafe { w.bits(value) }),
        }
    }
}

/// The driver behind the Timer1 compare vectors.
pub static SERVOS: ServoDriverStatic<Timer1> = ServoDriverStatic::new_static();

/// Hand Timer1 and port A to [`SERVOS`].
///
/// # Errors
///
/// Returns [`Error::AlreadyInitialized`](crate::Error::AlreadyInitialized) on a second
/// call.
pub fn init(tc1: TC1, porta: PORTA) -> Result<()> {
    SERVOS.init(Timer1::new(tc1, porta))
}

#[avr_device::interrupt(attiny84)]
fn TIM1_COMPA() {
    SERVOS.dispatch(CompareUnit::A);
}

#[avr_device::interrupt(attiny84)]
fn TIM1_COMPB() {
    SERVOS.dispatch(CompareUnit::B);
}
