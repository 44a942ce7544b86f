//! Window classification: flatten, infer, argmax, emit.

use rover_traits::{LabelEmitter, SignatureModel};

use crate::config::{AXES, WindowCfg};
use crate::error::{BuildError, RoverError};
use crate::hw_error::map_hw_error;
use crate::protocol::encode_label;
use crate::types::{ClassificationResult, TelemetryWindow};

/// Flatten a window triple-major: `[x0, y0, z0, x1, y1, z1, ...]`.
pub fn flatten(window: &TelemetryWindow) -> Vec<f32> {
    let mut out = Vec::with_capacity(window.len() * AXES);
    for t in window.samples() {
        out.extend_from_slice(&t.to_array());
    }
    out
}

/// Index of the largest score. Ties go to the lowest index; NaN never wins.
///
/// Returns `None` when `scores` holds no comparable value.
pub fn argmax(scores: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &s) in scores.iter().enumerate() {
        if s.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if s <= b => {}
            _ => best = Some((i, s)),
        }
    }
    best.map(|(i, _)| i)
}

/// Runs the model on completed windows and publishes the winning label.
pub struct ClassificationPipeline {
    model: Box<dyn SignatureModel>,
    emitter: Box<dyn LabelEmitter>,
    input_len: usize,
    output_len: usize,
    send_failures: u64,
}

impl std::fmt::Debug for ClassificationPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassificationPipeline")
            .field("input_len", &self.input_len)
            .field("output_len", &self.output_len)
            .field("send_failures", &self.send_failures)
            .finish_non_exhaustive()
    }
}

impl ClassificationPipeline {
    /// Validate the model's declared shapes against the window once, here.
    pub fn new(
        model: Box<dyn SignatureModel>,
        emitter: Box<dyn LabelEmitter>,
        window: &WindowCfg,
    ) -> Result<Self, BuildError> {
        let declared: usize = model.input_shape().iter().product();
        let expected = window.flat_len();
        if model.input_shape().is_empty() || declared != expected {
            return Err(BuildError::ShapeMismatch {
                declared,
                window: expected,
            });
        }
        let output_len = model.output_len();
        if output_len == 0 {
            return Err(BuildError::InvalidConfig("model must produce at least one score"));
        }
        if i32::try_from(output_len).is_err() {
            return Err(BuildError::InvalidConfig("model output does not fit an i32 label"));
        }
        Ok(Self {
            model,
            emitter,
            input_len: expected,
            output_len,
            send_failures: 0,
        })
    }

    /// Labels that could not be handed to the outbound channel.
    #[inline]
    pub fn send_failures(&self) -> u64 {
        self.send_failures
    }

    /// Classify one window and emit its label.
    ///
    /// A failed send is logged and counted but still yields the label; the
    /// channel is fire-and-forget and nothing is retried.
    pub fn classify(
        &mut self,
        window: &TelemetryWindow,
    ) -> Result<ClassificationResult, RoverError> {
        let input = flatten(window);
        if input.len() != self.input_len {
            return Err(RoverError::ShapeMismatch {
                expected: self.input_len,
                actual: input.len(),
            });
        }

        let scores = self
            .model
            .infer(&input)
            .map_err(|e| map_hw_error(&*e, RoverError::InferenceFailure))?;
        if scores.len() != self.output_len {
            return Err(RoverError::InferenceFailure(format!(
                "model returned {} scores, declared {}",
                scores.len(),
                self.output_len
            )));
        }
        let index = argmax(&scores).ok_or_else(|| {
            RoverError::InferenceFailure("model returned no comparable score".into())
        })?;
        let label = i32::try_from(index)
            .map_err(|_| RoverError::InferenceFailure(format!("label {index} out of range")))?;

        if let Err(e) = self.emitter.send(&encode_label(label)) {
            let err = map_hw_error(&*e, RoverError::ChannelSend);
            self.send_failures += 1;
            tracing::warn!(label, error = %err, "label dropped");
        }
        tracing::debug!(label, "window classified");
        Ok(ClassificationResult { label })
    }
}
