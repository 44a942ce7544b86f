use rover_core::mocks::{RecordingEmitter, StubModel};
use rover_core::protocol::decode_label;
use rover_core::{
    BuildError, ClassificationPipeline, RoverError, TelemetryWindow, Triple, WindowCfg,
};
use rstest::rstest;

fn window() -> TelemetryWindow {
    let samples = (0..24)
        .map(|i| Triple::new(i as f32, i as f32 + 0.5, -(i as f32)))
        .collect();
    TelemetryWindow::try_new(samples, 24).unwrap()
}

fn pipeline(model: StubModel, emitter: RecordingEmitter) -> ClassificationPipeline {
    ClassificationPipeline::new(Box::new(model), Box::new(emitter), &WindowCfg::default()).unwrap()
}

#[rstest]
#[case(vec![0.1, 0.9, 0.2], 1)]
#[case(vec![0.5, 0.5], 0)]
#[case(vec![0.0, 0.1, 0.2, 0.3, 0.3], 3)]
#[case(vec![-5.0], 0)]
fn label_is_first_argmax_and_is_emitted(#[case] scores: Vec<f32>, #[case] expected: i32) {
    let emitter = RecordingEmitter::new();
    let mut p = pipeline(StubModel::new(24, scores), emitter.clone());
    let result = p.classify(&window()).unwrap();
    assert_eq!(result.label, expected);
    let sent = emitter.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0], expected.to_le_bytes().to_vec());
    assert_eq!(decode_label(&sent[0]).unwrap(), expected);
}

#[test]
fn model_sees_triple_major_input() {
    let model = StubModel::new(24, vec![1.0]);
    let mut p = pipeline(model.clone(), RecordingEmitter::new());
    p.classify(&window()).unwrap();
    let inputs = model.inputs();
    assert_eq!(inputs.len(), 1);
    assert_eq!(inputs[0].len(), 72);
    assert_eq!(&inputs[0][..6], &[0.0, 0.5, -0.0, 1.0, 1.5, -1.0]);
}

#[rstest]
#[case(vec![20, 3], 60)]
#[case(vec![24, 4], 96)]
#[case(vec![], 1)]
fn mismatched_shape_is_rejected_at_build(#[case] shape: Vec<usize>, #[case] declared: usize) {
    let model = StubModel::new(24, vec![1.0]).with_shape(shape);
    let built = ClassificationPipeline::new(
        Box::new(model),
        Box::new(RecordingEmitter::new()),
        &WindowCfg::default(),
    );
    assert_eq!(
        built.unwrap_err(),
        BuildError::ShapeMismatch {
            declared,
            window: 72
        }
    );
}

#[test]
fn flat_declared_shape_is_accepted() {
    let model = StubModel::new(24, vec![1.0]).with_shape(vec![72]);
    assert!(
        ClassificationPipeline::new(
            Box::new(model),
            Box::new(RecordingEmitter::new()),
            &WindowCfg::default(),
        )
        .is_ok()
    );
}

#[test]
fn empty_score_vector_is_rejected_at_build() {
    let built = ClassificationPipeline::new(
        Box::new(StubModel::new(24, vec![])),
        Box::new(RecordingEmitter::new()),
        &WindowCfg::default(),
    );
    assert!(matches!(built, Err(BuildError::InvalidConfig(_))));
}

#[test]
fn inference_failure_is_typed_and_nothing_is_sent() {
    let emitter = RecordingEmitter::new();
    let mut p = pipeline(StubModel::new(24, vec![1.0, 2.0]).failing(), emitter.clone());
    let err = p.classify(&window()).unwrap_err();
    assert!(matches!(err, RoverError::InferenceFailure(_)), "{err}");
    assert!(emitter.sent().is_empty());
}

#[test]
fn send_failure_is_counted_not_fatal() {
    let mut p = pipeline(StubModel::new(24, vec![0.0, 1.0]), RecordingEmitter::failing());
    assert_eq!(p.classify(&window()).unwrap().label, 1);
    assert_eq!(p.classify(&window()).unwrap().label, 1);
    assert_eq!(p.send_failures(), 2);
}

#[test]
fn all_nan_scores_fail_inference() {
    let mut p = pipeline(StubModel::new(24, vec![f32::NAN, f32::NAN]), RecordingEmitter::new());
    assert!(matches!(
        p.classify(&window()),
        Err(RoverError::InferenceFailure(_))
    ));
}
