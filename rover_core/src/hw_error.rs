//! Maps `Box<dyn Error>` from the device traits to typed `RoverError`.
//!
//! The traits in `rover_traits` use `Box<dyn Error + Send + Sync>` so any
//! backend can plug in; this module recovers a typed error, with an optional
//! feature-gated path for `rover_hardware::error::HwError` downcasting.

use crate::error::RoverError;

/// Map a trait-boundary error to a typed `RoverError`.
///
/// Known hardware errors map precisely; anything else is wrapped by
/// `fallback`, which the caller picks for the device it was talking to.
pub fn map_hw_error(
    e: &(dyn std::error::Error + 'static),
    fallback: impl FnOnce(String) -> RoverError,
) -> RoverError {
    #[cfg(feature = "hardware-errors")]
    {
        use rover_hardware::error::HwError;
        if let Some(hw) = e.downcast_ref::<HwError>() {
            return match hw {
                HwError::LinkClosed | HwError::QueueFull(_) => {
                    RoverError::ChannelSend(hw.to_string())
                }
                HwError::Motor(msg) => RoverError::Actuator(msg.clone()),
                HwError::ModelInput { .. } => RoverError::InferenceFailure(hw.to_string()),
            };
        }
    }

    fallback(e.to_string())
}
