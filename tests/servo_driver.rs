#![allow(missing_docs, reason = "integration tests")]
//! Host-level tests for the servo driver against the mock Timer1.

use tiny_servo::Error;
use tiny_servo::servo::{ChannelState, MAX_PULSE_US, PIN_A, PIN_B};
use tiny_servo::servo_driver::ServoDriver;
use tiny_servo::timer::{CompareUnit, Reg8, Reg16, TIMER_TOP, bits};
use tiny_servo::timer_host::MockTimer;

fn attached(pin: u8) -> (ServoDriver<MockTimer>, CompareUnit) {
    let mut servos = ServoDriver::new(MockTimer::new());
    let unit = servos.attach(pin).unwrap();
    (servos, unit)
}

fn pulses(servos: &mut ServoDriver<MockTimer>, unit: CompareUnit, count: usize) {
    for _ in 0..count {
        servos.on_compare_match(unit);
    }
}

#[test]
fn every_angle_maps_linearly_with_exact_endpoints() {
    let mut servos = ServoDriver::new(MockTimer::new());
    let unit = servos.attach_with_bounds(PIN_A, 700, 2_300).unwrap();

    for degrees in 0..=180_i16 {
        let expected = 700 + u32::try_from(degrees).unwrap() * 1_600 / 180;
        let written = servos.write_angle(unit, degrees).unwrap();
        assert_eq!(u32::from(written), expected);
        assert_eq!(servos.registers().reg16(Reg16::Ocr1a), written);
    }
    assert_eq!(servos.write_angle(unit, 0), Ok(700));
    assert_eq!(servos.write_angle(unit, 180), Ok(2_300));
}

#[test]
fn out_of_range_angles_match_the_nearest_boundary() {
    let (mut servos, unit) = attached(PIN_B);

    let at_max = servos.write_angle(unit, 180).unwrap();
    assert_eq!(servos.write_angle(unit, 200), Ok(at_max));
    assert_eq!(servos.write_angle(unit, i16::MAX), Ok(at_max));

    let at_min = servos.write_angle(unit, 0).unwrap();
    assert_eq!(servos.write_angle(unit, -1), Ok(at_min));
    assert_eq!(servos.registers().reg16(Reg16::Ocr1b), 1_000);
}

#[test]
fn midpoint_with_default_bounds_is_1750() {
    let (mut servos, unit) = attached(PIN_A);

    assert_eq!(servos.write_angle(unit, 90), Ok(1_750));
    assert_eq!(servos.pulse_width_us(unit), Some(1_750));
}

#[test]
fn attaching_an_occupied_unit_changes_nothing() {
    let mut servos = ServoDriver::new(MockTimer::new());
    let unit = servos.attach_with_bounds(PIN_A, 600, 2_400).unwrap();
    servos.write_angle(unit, 60).unwrap();
    pulses(&mut servos, unit, 7);
    let before_channel = *servos.channel(unit).unwrap();
    let before_registers = servos.registers().clone();

    assert_eq!(servos.attach(PIN_A), Err(Error::UnitOccupied(CompareUnit::A)));
    assert_eq!(
        servos.attach_with_bounds(PIN_A, 1_000, 2_000),
        Err(Error::UnitOccupied(CompareUnit::A))
    );

    assert_eq!(*servos.channel(unit).unwrap(), before_channel);
    assert_eq!(*servos.registers(), before_registers);
    assert_eq!(servos.state(unit), Some(ChannelState::Connected));
}

#[test]
fn unsupported_pins_leave_registry_and_timer_alone() {
    let mut servos = ServoDriver::new(MockTimer::new());

    for pin in [0, 1, 4, 7, 8, 10, u8::MAX] {
        assert_eq!(servos.attach(pin), Err(Error::UnsupportedPin(pin)));
    }

    for unit in CompareUnit::ALL {
        assert!(!servos.is_attached(unit));
    }
    assert_eq!(servos.registers().write_count(), 0);
    assert_eq!(*servos.registers(), MockTimer::new());
}

#[test]
fn unsupported_pin_after_attach_does_not_reconfigure_timer() {
    let (mut servos, _unit) = attached(PIN_A);
    let writes = servos.registers().write_count();

    assert_eq!(servos.attach(3), Err(Error::UnsupportedPin(3)));

    assert_eq!(servos.registers().write_count(), writes);
    assert!(!servos.is_attached(CompareUnit::B));
}

#[test]
fn writes_to_unattached_units_are_rejected() {
    let (mut servos, _unit) = attached(PIN_A);
    let writes = servos.registers().write_count();

    assert_eq!(
        servos.write_angle(CompareUnit::B, 90),
        Err(Error::NotAttached(CompareUnit::B))
    );
    assert_eq!(
        servos.write_pulse_us(CompareUnit::B, 1_500),
        Err(Error::NotAttached(CompareUnit::B))
    );
    assert_eq!(
        servos.relax(CompareUnit::B),
        Err(Error::NotAttached(CompareUnit::B))
    );
    assert_eq!(servos.registers().write_count(), writes);
}

#[test]
fn fifty_pulses_release_the_channel() {
    let (mut servos, unit) = attached(PIN_A);
    servos.write_angle(unit, 120).unwrap();

    pulses(&mut servos, unit, 49);
    assert_eq!(servos.state(unit), Some(ChannelState::Connected));
    assert_eq!(servos.channel(unit).unwrap().pulse_count(), 49);
    assert!(servos.registers().compare_output_enabled(unit));

    assert_eq!(
        servos.on_compare_match(unit),
        Some(ChannelState::Disconnected)
    );
    assert_eq!(servos.channel(unit).unwrap().pulse_count(), 0);
    assert!(!servos.registers().compare_output_enabled(unit));
    assert!(!servos.registers().compare_interrupt_enabled(unit));
    assert_eq!(servos.registers().reg8(Reg8::Tccr1a), bits::WGM11);
    // The compare value is left as written.
    assert_eq!(servos.registers().reg16(Reg16::Ocr1a), 2_000);
}

#[test]
fn oversized_bounds_still_time_out() {
    let mut servos = ServoDriver::new(MockTimer::new());
    let unit = servos.attach_with_bounds(PIN_A, 1_000, 30_000).unwrap();

    let written = servos.write_angle(unit, 180).unwrap();
    assert_eq!(written, MAX_PULSE_US);
    assert!(servos.registers().reg16(Reg16::Ocr1a) < TIMER_TOP);
    assert_eq!(servos.registers().reg16(Reg16::Icr1), TIMER_TOP);

    servos.write_pulse_us(unit, 25_000).unwrap();
    assert!(servos.registers().reg16(Reg16::Ocr1a) < TIMER_TOP);

    pulses(&mut servos, unit, 50);
    assert_eq!(servos.state(unit), Some(ChannelState::Disconnected));
    assert!(!servos.registers().compare_output_enabled(unit));
}

#[test]
fn rewriting_within_the_window_keeps_counting() {
    let (mut servos, unit) = attached(PIN_B);
    servos.write_angle(unit, 0).unwrap();
    pulses(&mut servos, unit, 30);

    servos.write_angle(unit, 180).unwrap();
    assert_eq!(servos.channel(unit).unwrap().pulse_count(), 30);

    pulses(&mut servos, unit, 19);
    assert_eq!(servos.state(unit), Some(ChannelState::Connected));
    pulses(&mut servos, unit, 1);
    assert_eq!(servos.state(unit), Some(ChannelState::Disconnected));
}

#[test]
fn writing_after_release_reconnects_with_a_fresh_window() {
    let (mut servos, unit) = attached(PIN_A);
    servos.write_angle(unit, 10).unwrap();
    pulses(&mut servos, unit, 50);
    assert_eq!(servos.state(unit), Some(ChannelState::Disconnected));

    servos.write_angle(unit, 170).unwrap();

    assert_eq!(servos.state(unit), Some(ChannelState::Connected));
    assert_eq!(servos.channel(unit).unwrap().pulse_count(), 0);
    assert!(servos.registers().compare_interrupt_enabled(unit));
    assert!(servos.registers().compare_output_enabled(unit));

    pulses(&mut servos, unit, 49);
    assert_eq!(servos.state(unit), Some(ChannelState::Connected));
    pulses(&mut servos, unit, 1);
    assert_eq!(servos.state(unit), Some(ChannelState::Disconnected));
}

#[test]
fn events_for_an_empty_unit_are_ignored() {
    let (mut servos, unit) = attached(PIN_A);
    servos.write_angle(unit, 90).unwrap();
    let before = servos.registers().clone();

    assert_eq!(servos.on_compare_match(CompareUnit::B), None);

    assert_eq!(*servos.registers(), before);
    assert_eq!(servos.channel(unit).unwrap().pulse_count(), 0);
}

#[test]
fn two_channels_time_out_independently() {
    let mut servos = ServoDriver::new(MockTimer::new());
    let unit_a = servos.attach(PIN_A).unwrap();
    let unit_b = servos.attach_with_bounds(PIN_B, 500, 2_500).unwrap();
    servos.write_angle(unit_a, 45).unwrap();
    pulses(&mut servos, unit_a, 25);
    servos.write_angle(unit_b, 135).unwrap();

    pulses(&mut servos, unit_a, 25);
    assert_eq!(servos.state(unit_a), Some(ChannelState::Disconnected));
    assert_eq!(servos.state(unit_b), Some(ChannelState::Connected));
    assert!(servos.registers().compare_output_enabled(unit_b));
    assert_eq!(
        servos.registers().reg8(Reg8::Timsk1),
        unit_b.interrupt_bit()
    );
    assert_eq!(servos.registers().reg16(Reg16::Ocr1b), 2_000);

    pulses(&mut servos, unit_b, 50);
    assert_eq!(servos.state(unit_b), Some(ChannelState::Disconnected));
    assert_eq!(servos.registers().reg8(Reg8::Timsk1), 0);
}
