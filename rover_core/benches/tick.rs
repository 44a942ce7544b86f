use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use rover_core::mocks::{
    FixedProximity, QueueReceiver, RecordingEmitter, RecordingMotors, StepLimit, StubModel,
};
use rover_core::protocol::{encode_batch, parse_frame};
use rover_core::{ControlLoop, MotionCfg, Triple};
use rover_traits::ManualClock;

fn batch_text() -> String {
    let readings: Vec<Triple> = (0..24)
        .map(|i| {
            let t = i as f32 / 24.0;
            Triple::new(t.sin(), t.cos(), 0.1 * t)
        })
        .collect();
    encode_batch(&readings)
}

pub fn bench_parse(c: &mut Criterion) {
    let text = batch_text();
    c.bench_function("parse_batch_frame", |b| {
        b.iter(|| parse_frame(black_box(text.as_bytes()), 24))
    });
}

pub fn bench_tick(c: &mut Criterion) {
    let text = batch_text();
    c.bench_function("tick_with_window", |b| {
        b.iter_batched(
            || {
                let rx = QueueReceiver::new();
                rx.push(text.clone());
                let ctl = ControlLoop::builder()
                    .with_scheduler(StepLimit::new(1))
                    .with_sensors(FixedProximity::uniform(30.0))
                    .with_motors(RecordingMotors::new())
                    .with_receiver(rx)
                    .with_emitter(RecordingEmitter::new())
                    .with_model(StubModel::new(24, vec![0.2, 0.7, 0.1]))
                    .with_motion(MotionCfg {
                        seed: Some(5),
                        ..MotionCfg::default()
                    })
                    .with_clock(ManualClock::new())
                    .try_build();
                ctl.ok()
            },
            |ctl| {
                if let Some(mut ctl) = ctl {
                    black_box(ctl.tick().ok());
                }
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_parse, bench_tick);
criterion_main!(benches);
