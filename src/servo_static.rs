//! Static storage that lets interrupt handlers reach a [`ServoDriver`].
//!
//! Interrupt vectors cannot take arguments, so the driver they dispatch into has to
//! live in a `static`. [`ServoDriverStatic`] holds it behind a critical-section mutex
//! and exposes the same driver to foreground code through [`with`](ServoDriverStatic::with).

use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

use crate::logging::log_info;
use crate::servo::ChannelState;
use crate::servo_driver::ServoDriver;
use crate::timer::{CompareUnit, TimerRegisters};
use crate::{Error, Result};

/// Static resources for a [`ServoDriver`] shared with interrupt handlers.
///
/// # Example
///
/// Runs against the host register file (`host` feature).
///
#[cfg_attr(feature = "host", doc = "```rust")]
#[cfg_attr(not(feature = "host"), doc = "```rust,ignore")]
/// use tiny_servo::servo::PIN_A;
/// use tiny_servo::servo_static::ServoDriverStatic;
/// use tiny_servo::timer::CompareUnit;
/// use tiny_servo::timer_host::MockTimer;
///
/// static SERVOS: ServoDriverStatic<MockTimer> = ServoDriverStatic::new_static();
///
/// // In an interrupt handler:
/// fn timer1_compare_a() {
///     SERVOS.dispatch(CompareUnit::A);
/// }
///
/// SERVOS.init(MockTimer::new())?;
/// SERVOS.with(|servos| servos.attach(PIN_A).and_then(|unit| servos.write_angle(unit, 30)))??;
/// timer1_compare_a();
///
/// assert_eq!(
///     SERVOS.with(|servos| servos.channel(CompareUnit::A).map(|channel| channel.pulse_count()))?,
///     Some(1)
/// );
/// # Ok::<(), tiny_servo::Error>(())
/// ```
pub struct ServoDriverStatic<R> {
    driver: Mutex<CriticalSectionRawMutex, RefCell<Option<ServoDriver<R>>>>,
}

impl<R: TimerRegisters> ServoDriverStatic<R> {
    /// Creates an empty slot, suitable for a `static`.
    #[must_use]
    pub const fn new_static() -> Self {
        Self {
            driver: Mutex::new(RefCell::new(None)),
        }
    }

    /// Move the register backend into the slot.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyInitialized`] if the slot already holds a driver. The
    /// existing driver is kept and `registers` is dropped.
    pub fn init(&self, registers: R) -> Result<()> {
        self.driver.lock(|cell| {
            let mut slot = cell.borrow_mut();
            if slot.is_some() {
                return Err(Error::AlreadyInitialized);
            }
            *slot = Some(ServoDriver::new(registers));
            log_info!("servo driver ready");
            Ok(())
        })
    }

    /// Run `f` with exclusive access to the driver, with interrupts held off.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Uninitialized`] before [`init`](Self::init).
    pub fn with<T>(&self, f: impl FnOnce(&mut ServoDriver<R>) -> T) -> Result<T> {
        self.driver.lock(|cell| {
            let mut slot = cell.borrow_mut();
            slot.as_mut().map(f).ok_or(Error::Uninitialized)
        })
    }

    /// Forward a compare-match interrupt to the driver.
    ///
    /// Call this, and only this, from the Timer1 compare vectors. Events that arrive
    /// before [`init`](Self::init) are dropped.
    pub fn dispatch(&self, unit: CompareUnit) -> Option<ChannelState> {
        self.with(|driver| driver.on_compare_match(unit))
            .ok()
            .flatten()
    }
}
