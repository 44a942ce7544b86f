use rover_config::load_toml;
use rstest::rstest;

const FULL: &str = r#"
[sim]
max_ticks = 500
seed = 42
realtime = false
obstacle_rate = 0.05
obstacle_ticks = 4

[supervisor]
delivery = "batch"
amplitude = 0.7
radio_capacity = 32

[model]
class_rms = [0.1, 0.4]

[logging]
level = "debug"
rotation = "daily"

[runner]
stats = true
"#;

#[test]
fn accepts_full_config() {
    let cfg = load_toml(FULL).expect("parse TOML");
    cfg.validate().expect("valid config");
    assert_eq!(cfg.sim.seed, Some(42));
    assert_eq!(cfg.model.class_rms, vec![0.1, 0.4]);
    assert!(cfg.runner.stats);
}

#[rstest]
#[case("[sim]\nmax_ticks = 0\n", "sim.max_ticks must be >= 1")]
#[case("[sim]\nobstacle_rate = 1.5\n", "sim.obstacle_rate must be in [0.0, 1.0]")]
#[case("[sim]\nobstacle_ticks = 0\n", "sim.obstacle_ticks must be >= 1")]
#[case("[supervisor]\namplitude = -1.0\n", "supervisor.amplitude must be finite")]
#[case("[supervisor]\nradio_capacity = 0\n", "supervisor.radio_capacity must be >= 1")]
#[case("[model]\nclass_rms = []\n", "model.class_rms must list at least one class")]
#[case("[model]\nclass_rms = [0.1, -0.2]\n", "model.class_rms entries must be finite")]
#[case("[logging]\nrotation = \"weekly\"\n", "logging.rotation must be one of")]
fn rejects_out_of_range_values(#[case] toml: &str, #[case] needle: &str) {
    let cfg = load_toml(toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should reject");
    assert!(format!("{err}").contains(needle), "{err}");
}

#[test]
fn unknown_delivery_fails_to_parse() {
    assert!(load_toml("[supervisor]\ndelivery = \"stream\"\n").is_err());
}
