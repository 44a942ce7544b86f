//! Stand-in signature model.
//!
//! Scores each class by how close the window's RMS acceleration magnitude is
//! to that class's configured center. It honours the same fixed-shape
//! contract as a trained network, which is all the control loop relies on.
use rover_traits::SignatureModel;

use crate::error::HwError;

pub struct RmsSignatureModel {
    shape: [usize; 2],
    class_rms: Vec<f32>,
}

impl RmsSignatureModel {
    /// `window_len` readings of three axes in; one score per entry of
    /// `class_rms` out.
    pub fn new(window_len: usize, class_rms: Vec<f32>) -> Self {
        Self {
            shape: [window_len, 3],
            class_rms,
        }
    }
}

impl SignatureModel for RmsSignatureModel {
    fn input_shape(&self) -> &[usize] {
        &self.shape
    }

    fn output_len(&self) -> usize {
        self.class_rms.len()
    }

    fn infer(
        &mut self,
        input: &[f32],
    ) -> Result<Vec<f32>, Box<dyn std::error::Error + Send + Sync>> {
        let expected = self.shape[0] * self.shape[1];
        if input.len() != expected {
            return Err(Box::new(HwError::ModelInput {
                expected,
                actual: input.len(),
            }));
        }
        let readings = self.shape[0].max(1) as f32;
        let sum_sq: f32 = input.iter().map(|v| v * v).sum();
        let rms = (sum_sq / readings).sqrt();
        Ok(self.class_rms.iter().map(|c| -(rms - c).abs()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearest_center_scores_highest() {
        let mut model = RmsSignatureModel::new(2, vec![0.0, 1.0, 5.0]);
        // two readings of magnitude 1.0 -> rms 1.0
        let scores = model.infer(&[1.0, 0.0, 0.0, 0.0, 1.0, 0.0]).unwrap();
        assert_eq!(scores.len(), 3);
        assert!(scores[1] > scores[0]);
        assert!(scores[1] > scores[2]);
    }

    #[test]
    fn rejects_wrong_input_length() {
        let mut model = RmsSignatureModel::new(24, vec![0.1, 0.5]);
        let err = model.infer(&[0.0; 10]).unwrap_err();
        assert!(err.to_string().contains("expected 72"));
    }
}
