//! Long-run share of maneuver ticks under a clear field.
//!
//! From Cruise a maneuver starts with p = 0.1 per tick, so about 9 cruise
//! ticks pass between maneuvers. A maneuver lasts E[turn] + E[forward] =
//! 12.5 + 35 = 47.5 ticks, giving 47.5 / 56.5 ≈ 0.84 of all ticks.

use rover_core::mocks::{FixedProximity, QueueReceiver, RecordingEmitter, RecordingMotors, StepLimit, StubModel};
use rover_core::{ControlLoop, MotionCfg, MotionState, ProximityReading, RandomWalk};
use rover_traits::{ManualClock, SENSOR_COUNT};

const EXPECTED: f64 = 47.5 / 56.5;

fn fraction(seed: u64, ticks: usize) -> f64 {
    let mut walk = RandomWalk::new(MotionCfg {
        seed: Some(seed),
        ..MotionCfg::default()
    });
    let clear = ProximityReading::from_raw([55.0; SENSOR_COUNT]);
    let maneuvering = (0..ticks)
        .filter(|_| {
            walk.tick(&clear);
            walk.state().is_maneuver()
        })
        .count();
    maneuvering as f64 / ticks as f64
}

#[test]
fn maneuver_fraction_converges_over_ten_thousand_ticks() {
    let fractions: Vec<f64> = (1..=5).map(|seed| fraction(seed, 10_000)).collect();
    for f in &fractions {
        assert!((f - EXPECTED).abs() < 0.05, "fraction {f} vs {EXPECTED}");
    }
    let mean = fractions.iter().sum::<f64>() / fractions.len() as f64;
    assert!((mean - EXPECTED).abs() < 0.03, "mean {mean} vs {EXPECTED}");
}

#[test]
fn control_loop_stats_agree_with_the_walk() {
    let mut ctl = ControlLoop::builder()
        .with_scheduler(StepLimit::new(10_000))
        .with_sensors(FixedProximity::uniform(55.0))
        .with_motors(RecordingMotors::new())
        .with_receiver(QueueReceiver::new())
        .with_emitter(RecordingEmitter::new())
        .with_model(StubModel::new(24, vec![1.0, 0.0]))
        .with_motion(MotionCfg {
            seed: Some(3),
            ..MotionCfg::default()
        })
        .with_clock(ManualClock::new())
        .try_build()
        .unwrap();
    let stats = ctl.run().unwrap();
    assert_eq!(stats.ticks, 10_000);
    assert_eq!(stats.modes.avoid_left + stats.modes.avoid_right, 0);
    assert_eq!(
        stats.modes.cruise + stats.modes.turn + stats.modes.forward,
        10_000
    );
    assert!((stats.maneuver_fraction() - EXPECTED).abs() < 0.05);
    assert!(matches!(
        ctl.state(),
        MotionState::Cruise | MotionState::TurnMicro { .. } | MotionState::ForwardMicro { .. }
    ));
}
