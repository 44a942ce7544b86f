use proptest::prelude::*;
use rover_core::{MotionCfg, MotionState, ProximityReading, RandomWalk};
use rover_traits::SENSOR_COUNT;

const HALF: f64 = 3.14;

fn warmed_walk(seed: u64, warmup: usize) -> RandomWalk {
    let mut walk = RandomWalk::new(MotionCfg {
        seed: Some(seed),
        ..MotionCfg::default()
    });
    let clear = ProximityReading::from_raw([40.0; SENSOR_COUNT]);
    for _ in 0..warmup {
        walk.tick(&clear);
    }
    walk
}

proptest! {
    // Holds mid-maneuver too: warmup ticks leave the walk in arbitrary modes.
    #[test]
    fn left_flank_obstacle_always_rotates_right(
        mut raw in prop::array::uniform8(0.0f64..400.0),
        idx in 5usize..8,
        level in 80.001f64..1000.0,
        seed in any::<u64>(),
        warmup in 0usize..120,
    ) {
        raw[idx] = level;
        let mut walk = warmed_walk(seed, warmup);
        let c = walk.tick(&ProximityReading::from_raw(raw));
        prop_assert_eq!((c.left, c.right), (HALF, -HALF));
        prop_assert_eq!(walk.state(), MotionState::AvoidLeft);
    }

    #[test]
    fn right_flank_obstacle_rotates_left_when_left_is_clear(
        mut raw in prop::array::uniform8(0.0f64..=80.0),
        idx in 0usize..3,
        level in 80.001f64..1000.0,
        others in prop::array::uniform2(0.0f64..1000.0),
        seed in any::<u64>(),
        warmup in 0usize..120,
    ) {
        raw[idx] = level;
        // sensors 3 and 4 are on neither flank
        raw[3] = others[0];
        raw[4] = others[1];
        let mut walk = warmed_walk(seed, warmup);
        let c = walk.tick(&ProximityReading::from_raw(raw));
        prop_assert_eq!((c.left, c.right), (-HALF, HALF));
        prop_assert_eq!(walk.state(), MotionState::AvoidRight);
    }

    #[test]
    fn clear_readings_outside_a_maneuver_cruise(
        raw in prop::array::uniform8(0.0f64..=80.0),
    ) {
        let mut walk = RandomWalk::new(MotionCfg {
            maneuver_probability: 0.0,
            seed: Some(1),
            ..MotionCfg::default()
        });
        let c = walk.tick(&ProximityReading::from_raw(raw));
        prop_assert_eq!((c.left, c.right), (HALF, HALF));
        prop_assert_eq!(walk.state(), MotionState::Cruise);
    }

    #[test]
    fn commands_stay_within_max_speed(
        raws in prop::collection::vec(prop::array::uniform8(0.0f64..200.0), 1..200),
        seed in any::<u64>(),
    ) {
        let mut walk = warmed_walk(seed, 0);
        for raw in raws {
            let c = walk.tick(&ProximityReading::from_raw(raw));
            prop_assert!(c.left.abs() <= 6.28 && c.right.abs() <= 6.28);
            prop_assert!(c.left.abs() == HALF && c.right.abs() == HALF);
        }
    }

    #[test]
    fn timed_modes_count_down_within_bounds(seed in any::<u64>()) {
        let mut walk = warmed_walk(seed, 0);
        let clear = ProximityReading::from_raw([0.0; SENSOR_COUNT]);
        let mut prev = walk.state();
        for _ in 0..400 {
            walk.tick(&clear);
            let now = walk.state();
            match (prev, now) {
                (MotionState::TurnMicro { remaining: a }, MotionState::TurnMicro { remaining: b })
                | (MotionState::ForwardMicro { remaining: a }, MotionState::ForwardMicro { remaining: b }) => {
                    prop_assert_eq!(b + 1, a);
                }
                (MotionState::TurnMicro { remaining: a }, MotionState::ForwardMicro { remaining: b }) => {
                    prop_assert_eq!(a, 0);
                    prop_assert!((19..=49).contains(&b));
                }
                (MotionState::Cruise, MotionState::TurnMicro { remaining: b }) => {
                    prop_assert!((4..=19).contains(&b));
                }
                (MotionState::ForwardMicro { remaining: a }, MotionState::Cruise) => {
                    prop_assert_eq!(a, 0);
                }
                // a finished burst can be followed by a fresh roll on the next tick
                (MotionState::ForwardMicro { remaining: a }, MotionState::TurnMicro { remaining: b }) => {
                    prop_assert_eq!(a, 0);
                    prop_assert!((4..=19).contains(&b));
                }
                (MotionState::Cruise, MotionState::Cruise) => {}
                (a, b) => prop_assert!(false, "unexpected transition {:?} -> {:?}", a, b),
            }
            prev = now;
        }
    }
}
