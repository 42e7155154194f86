//! Servo control for the ATtiny24/44/84 using the 16-bit Timer1.
//!
//! Timer1 runs in fast PWM mode at 50 Hz and drives up to two hobby servos, one per
//! compare unit. Each angle write holds the servo for one second of pulses, then the
//! pin is released to save power and stop jitter. See
//! [`ServoDriver`](servo_driver::ServoDriver) for usage.
//!
//! # Glossary
//!
//! - **Compare unit:** Timer1 has two (A and B). Each has its own compare register,
//!   interrupt and output pin (OC1A on PA6, OC1B on PA5).
//! - **Fast PWM:** the timer sets the pin at the start of each period and clears it
//!   when the counter reaches the compare value, so the high time equals the compare
//!   value in timer ticks (1 µs each at 8 MHz / 8).
//! - **TOP:** the count at which the timer wraps, 20000 ticks (20 ms).
//!
//! # Features
//!
//! - `attiny84`: real register backend and the `TIM1_COMPA`/`TIM1_COMPB` vectors.
//! - `host`: builds with `std` for running the driver against
//!   `timer_host::MockTimer` off-target.
//! - `defmt`: log attaches, writes and releases through `defmt`.
#![cfg_attr(not(any(test, feature = "host")), no_std)]

#[cfg(all(feature = "attiny84", feature = "host"))]
compile_error!("Cannot enable both 'attiny84' and 'host' features simultaneously");

mod error;
mod logging;

#[cfg(feature = "attiny84")]
pub mod attiny84;
pub mod servo;
pub mod servo_driver;
pub mod servo_static;
pub mod timer;
#[cfg(any(test, feature = "host"))]
pub mod timer_host;

// Re-export error types and result (used throughout)
pub use crate::error::{Error, Result};
