use rover_hardware::error::HwError;
use rover_hardware::radio;
use rover_hardware::{ProximityField, SimWorld, SimulatedWheels};
use rover_traits::{
    LabelEmitter, ProximitySensors, Scheduler, TelemetryReceiver, Tick, WheelMotors,
};
use rstest::rstest;
use std::time::Duration;

const DT: Duration = Duration::from_millis(64);

fn max_reading(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::MIN, f64::max)
}

#[rstest]
#[case::short(7, 1)]
#[case::default_burst(7, 3)]
#[case::other_seed(1234, 3)]
#[case::long(99, 8)]
fn obstacle_appears_on_a_flank_and_clears_after_its_lifetime(
    #[case] seed: u64,
    #[case] lifetime: u32,
) {
    let field = ProximityField::new(1.0, lifetime, Some(seed));
    let mut sensors = field.sensors();

    field.advance();
    let first = sensors.read();
    let idx = first
        .iter()
        .position(|v| *v >= 120.0)
        .expect("an obstacle reading");
    assert!(matches!(idx, 0..=2 | 5..=7), "front sensors never fire: {idx}");

    for _ in 1..lifetime {
        field.advance();
        assert!(sensors.read()[idx] >= 120.0);
    }

    // lifetime is over; the next step is clear
    field.advance();
    assert!(max_reading(&sensors.read()) < 75.0);
}

#[test]
fn obstacle_free_field_reads_the_ambient_band() {
    let field = ProximityField::new(0.0, 3, Some(5));
    let mut sensors = field.sensors();
    for _ in 0..50 {
        field.advance();
        assert!(sensors.read().iter().all(|v| (50.0..75.0).contains(v)));
    }
}

#[test]
fn same_seed_gives_same_readings() {
    let a = ProximityField::new(0.3, 4, Some(42));
    let b = ProximityField::new(0.3, 4, Some(42));
    let (mut sa, mut sb) = (a.sensors(), b.sensors());
    for _ in 0..200 {
        a.advance();
        b.advance();
        assert_eq!(sa.read(), sb.read());
    }
}

#[test]
fn pinned_field_stays_put_while_the_world_steps() {
    let field = ProximityField::new(0.5, 2, Some(1));
    let mut sensors = field.sensors();
    field.set([200.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
    let mut world = SimWorld::new(field, Some(5));
    while world.step(DT) == Tick::Advanced {}
    assert_eq!(world.ticks(), 5);
    assert_eq!(sensors.read()[0], 200.0);
}

#[test]
fn wheels_clamp_and_count_commands() {
    let mut wheels = SimulatedWheels::new(6.28);
    let probe = wheels.probe();
    wheels.set_velocity(10.0, -10.0).unwrap();
    wheels.set_velocity(3.14, 3.14).unwrap();
    assert_eq!(probe.last(), (3.14, 3.14));
    assert_eq!(probe.commands(), 2);

    let err = wheels.set_velocity(f64::NAN, 0.0).unwrap_err();
    assert!(err.downcast_ref::<HwError>().is_some());
    assert_eq!(probe.commands(), 2, "rejected command is not counted");
}

#[test]
fn closed_link_reports_link_closed() {
    let (mut tx, rx) = radio::link(2);
    drop(rx);
    let err = tx.send(b"label").unwrap_err();
    assert!(matches!(
        err.downcast_ref::<HwError>(),
        Some(HwError::LinkClosed)
    ));
}

#[test]
fn receiver_drains_in_order_then_reports_empty() {
    let (tx, mut rx) = radio::link(8);
    for i in 0..3u8 {
        tx.transmit(&[i]).unwrap();
    }
    let got: Vec<Vec<u8>> = std::iter::from_fn(|| rx.next_packet()).collect();
    assert_eq!(got, vec![vec![0], vec![1], vec![2]]);
    assert_eq!(rx.queue_len(), 0);
}
