//! Human-readable error descriptions and structured JSON error formatting.

use rover_core::error::{BuildError, RoverError};

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::ShapeMismatch { declared, window } => format!(
                "What happened: The signature model takes {declared} inputs but a telemetry window flattens to {window}.\nLikely causes: The model was built for a different window length.\nHow to fix: Use a model whose input shape is [window, 3], or change the window length to match the model."
            ),
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid control loop configuration ({msg}).\nLikely causes: A compiled-in constant or override is out of range.\nHow to fix: Restore the value to its documented range and rebuild."
            ),
            other => format!(
                "What happened: The control loop could not be assembled ({other}).\nLikely causes: A device failed to initialize and was not wired into the builder.\nHow to fix: Re-run with --log-level=debug to see which device failed."
            ),
        };
    }

    if let Some(re) = err.downcast_ref::<RoverError>() {
        if let RoverError::ShapeMismatch { expected, actual } = re {
            return format!(
                "What happened: A telemetry window of {actual} values reached a model expecting {expected}.\nLikely causes: The window length changed after the model was loaded.\nHow to fix: Restart with a matching model and window length."
            );
        }
        return format!(
            "What happened: {re}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
        );
    }

    // String-based heuristics for errors coming from init or config
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("open capture file") {
        return format!(
            "What happened: The capture file could not be opened.\nLikely causes: Wrong path in supervisor.capture or --capture.\nHow to fix: Point it at a tab-separated x/y/z file. Original: {msg}"
        );
    }
    if lower.contains("capture row") || lower.contains("contains no rows") {
        return format!(
            "What happened: The capture file is not valid.\nLikely causes: A row without exactly three tab-separated numbers.\nHow to fix: Fix or remove the offending row. Original: {msg}"
        );
    }
    if lower.contains("read config") || lower.contains("parse config") {
        return format!(
            "What happened: The config file could not be loaded.\nLikely causes: Missing file or invalid TOML.\nHow to fix: Check --config and the file's syntax; see etc/rover.toml for a sample. Original: {msg}"
        );
    }
    if lower.contains(" must ") {
        return format!(
            "What happened: Configuration is invalid ({msg}).\nLikely causes: An out-of-range value in the TOML.\nHow to fix: Edit the config file, then rerun."
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes: 3 for a model/window shape mismatch, 4 for any other
/// assembly fault, 1 for everything else.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if matches!(
        err.downcast_ref::<BuildError>(),
        Some(BuildError::ShapeMismatch { .. })
    ) || matches!(
        err.downcast_ref::<RoverError>(),
        Some(RoverError::ShapeMismatch { .. })
    ) {
        return 3;
    }
    if err.downcast_ref::<BuildError>().is_some() {
        return 4;
    }
    1
}

fn reason_name(err: &eyre::Report) -> &'static str {
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::ShapeMismatch { .. } => "ShapeMismatch",
            BuildError::InvalidConfig(_) => "InvalidConfig",
            _ => "MissingDevice",
        };
    }
    match err.downcast_ref::<RoverError>() {
        Some(RoverError::ShapeMismatch { .. }) => "ShapeMismatch",
        Some(RoverError::MalformedTelemetry(_)) => "MalformedTelemetry",
        Some(RoverError::InferenceFailure(_)) => "InferenceFailure",
        Some(RoverError::ChannelSend(_)) => "ChannelSend",
        Some(RoverError::Actuator(_)) => "Actuator",
        None => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    let msg = humanize(err);
    match err.downcast_ref::<BuildError>() {
        Some(BuildError::ShapeMismatch { declared, window }) => json!({
            "reason": reason_name(err),
            "details": { "declared": declared, "window": window },
            "message": msg,
        })
        .to_string(),
        _ => json!({ "reason": reason_name(err), "message": msg }).to_string(),
    }
}
