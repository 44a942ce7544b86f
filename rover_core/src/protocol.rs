//! Wire formats between the supervisor and the robot.
//!
//! Inbound telemetry is UTF-8 text in one of two shapes:
//!
//! ```text
//! single:  "0.12,0.03,-0.01"
//! batch:   "0.1,0.0,0.0;0.2,0.1,0.0;..."   (exactly one window of groups)
//! ```
//!
//! Trailing NUL padding from fixed-size radio frames is stripped before
//! parsing. Outbound classification labels are a little-endian `i32`.

use crate::error::RoverError;
use crate::types::Triple;

/// Byte length of an outbound label message.
pub const LABEL_LEN: usize = 4;

const GROUP_SEP: char = ';';
const AXIS_SEP: char = ',';

/// The two inbound message shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireFormat {
    /// One `x,y,z` triple per message.
    SingleReading,
    /// A whole window of `;`-separated triples in one message.
    Batch,
}

impl WireFormat {
    /// Pick the shape from the message text.
    pub fn detect(text: &str) -> Self {
        if text.contains(GROUP_SEP) {
            Self::Batch
        } else {
            Self::SingleReading
        }
    }

    /// Parse `text` as this shape. A batch must hold exactly `window_len` groups.
    pub fn parse(self, text: &str, window_len: usize) -> Result<Vec<Triple>, RoverError> {
        match self {
            Self::SingleReading => Ok(vec![parse_triple(text)?]),
            Self::Batch => {
                let body = text.strip_suffix(GROUP_SEP).unwrap_or(text);
                let triples = body
                    .split(GROUP_SEP)
                    .map(parse_triple)
                    .collect::<Result<Vec<_>, _>>()?;
                if triples.len() != window_len {
                    return Err(RoverError::MalformedTelemetry(format!(
                        "batch carries {} readings, expected {window_len}",
                        triples.len()
                    )));
                }
                Ok(triples)
            }
        }
    }
}

/// Decode raw packet bytes into trimmed text, dropping NUL padding.
pub fn decode_text(raw: &[u8]) -> Result<&str, RoverError> {
    let text = std::str::from_utf8(raw)
        .map_err(|e| RoverError::MalformedTelemetry(format!("not utf-8: {e}")))?;
    let text = text.trim_end_matches('\0').trim();
    if text.is_empty() {
        return Err(RoverError::MalformedTelemetry("empty message".into()));
    }
    Ok(text)
}

/// Decode and parse one inbound packet, auto-detecting its shape.
pub fn parse_frame(raw: &[u8], window_len: usize) -> Result<(WireFormat, Vec<Triple>), RoverError> {
    let text = decode_text(raw)?;
    let format = WireFormat::detect(text);
    let triples = format.parse(text, window_len)?;
    Ok((format, triples))
}

fn parse_triple(group: &str) -> Result<Triple, RoverError> {
    let mut axes = [0.0_f32; 3];
    let mut count = 0usize;
    for token in group.split(AXIS_SEP) {
        if count == axes.len() {
            return Err(RoverError::MalformedTelemetry(format!(
                "reading {group:?} has more than 3 values"
            )));
        }
        let token = token.trim();
        let v: f32 = token.parse().map_err(|_| {
            RoverError::MalformedTelemetry(format!("non-numeric value {token:?}"))
        })?;
        if !v.is_finite() {
            return Err(RoverError::MalformedTelemetry(format!(
                "non-finite value {token:?}"
            )));
        }
        axes[count] = v;
        count += 1;
    }
    if count != axes.len() {
        return Err(RoverError::MalformedTelemetry(format!(
            "reading {group:?} has {count} values, expected 3"
        )));
    }
    Ok(Triple::from(axes))
}

/// Encode one reading in the single-reading shape.
pub fn encode_single(t: &Triple) -> String {
    format!("{}{AXIS_SEP}{}{AXIS_SEP}{}", t.x, t.y, t.z)
}

/// Encode readings in the batch shape.
pub fn encode_batch(readings: &[Triple]) -> String {
    let mut out = String::with_capacity(readings.len() * 24);
    for (i, t) in readings.iter().enumerate() {
        if i > 0 {
            out.push(GROUP_SEP);
        }
        out.push_str(&encode_single(t));
    }
    out
}

#[inline]
pub fn encode_label(label: i32) -> [u8; LABEL_LEN] {
    label.to_le_bytes()
}

pub fn decode_label(bytes: &[u8]) -> Result<i32, RoverError> {
    let arr: [u8; LABEL_LEN] = bytes.try_into().map_err(|_| {
        RoverError::MalformedTelemetry(format!(
            "label message is {} bytes, expected {LABEL_LEN}",
            bytes.len()
        ))
    })?;
    Ok(i32::from_le_bytes(arr))
}
