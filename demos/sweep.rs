//! Sweep two servos on an ATtiny84 at 8 MHz.
//!
//! The servo on pin 6 steps through 0..=180 in 30 degree steps. The servo on pin 5
//! mirrors it. Each position is written once. The driver releases both servos one
//! second later, and the loop moves on half a second after that.
#![no_std]
#![no_main]

use panic_halt as _;
use tiny_servo::attiny84::{self, SERVOS};
use tiny_servo::servo::{MAX_DEGREES, PIN_A, PIN_B};
use tiny_servo::timer::CompareUnit;

// 1.5 s busy-wait at 8 MHz.
const STEP_CYCLES: u32 = 12_000_000;

#[avr_device::entry]
#[expect(unsafe_code, reason = "enabling interrupts globally")]
fn main() -> ! {
    if let Some(dp) = avr_device::attiny84::Peripherals::take() {
        let _ = attiny84::init(dp.TC1, dp.PORTA);
    }

    // The claw servo only needs 544..=2400 us.
    let _ = SERVOS.with(|servos| {
        let _ = servos.attach(PIN_A);
        let _ = servos.attach_with_bounds(PIN_B, 544, 2_400);
    });

    // Driver state is fully set up before interrupts start.
    unsafe {
        avr_device::interrupt::enable();
    }

    let [arm, claw] = CompareUnit::ALL;
    loop {
        for degrees in (0..=MAX_DEGREES).step_by(30) {
            let _ = SERVOS.with(|servos| {
                let _ = servos.write_angle(arm, degrees);
                let _ = servos.write_angle(claw, MAX_DEGREES.saturating_sub(degrees));
            });
            avr_device::asm::delay_cycles(STEP_CYCLES);
        }
    }
}
