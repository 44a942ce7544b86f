//! Telemetry windowing: turns inbound packets into complete windows.

use crate::error::RoverError;
use crate::protocol::{self, WireFormat};
use crate::types::{TelemetryWindow, Triple};

/// Accumulates readings until exactly `window_len` have arrived.
///
/// Single-reading messages accumulate across calls (and ticks). A batch
/// message is a window on its own; any partial accumulation from earlier
/// single readings is discarded when one arrives, so windows never mix
/// the two shapes.
#[derive(Debug)]
pub struct TelemetryWindower {
    window_len: usize,
    pending: Vec<Triple>,
}

impl TelemetryWindower {
    pub fn new(window_len: usize) -> Self {
        let window_len = window_len.max(1);
        Self {
            window_len,
            pending: Vec::with_capacity(window_len),
        }
    }

    /// Readings accumulated toward the next window.
    #[inline]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    #[inline]
    pub fn window_len(&self) -> usize {
        self.window_len
    }

    /// Drop any partial accumulation.
    pub fn reset(&mut self) {
        self.pending.clear();
    }

    /// Feed one raw packet. Returns the window it completed, if any.
    ///
    /// A malformed packet is rejected before it touches the accumulator, so
    /// the in-progress window is left exactly as it was.
    pub fn ingest(&mut self, raw: &[u8]) -> Result<Option<TelemetryWindow>, RoverError> {
        let (format, triples) = protocol::parse_frame(raw, self.window_len)?;
        match format {
            WireFormat::Batch => {
                if !self.pending.is_empty() {
                    tracing::warn!(
                        dropped = self.pending.len(),
                        "batch message replaced a partial window"
                    );
                    self.pending.clear();
                }
                Ok(Some(TelemetryWindow::from_complete(triples)))
            }
            WireFormat::SingleReading => {
                self.pending.extend(triples);
                if self.pending.len() < self.window_len {
                    return Ok(None);
                }
                let samples = std::mem::replace(
                    &mut self.pending,
                    Vec::with_capacity(self.window_len),
                );
                Ok(Some(TelemetryWindow::from_complete(samples)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{encode_batch, encode_single};

    fn reading(i: usize) -> Triple {
        Triple::new(i as f32, -(i as f32), 0.5)
    }

    #[test]
    fn completes_after_exactly_window_len_singles() {
        let mut w = TelemetryWindower::new(24);
        for i in 0..23 {
            assert!(w.ingest(encode_single(&reading(i)).as_bytes()).unwrap().is_none());
        }
        assert_eq!(w.pending(), 23);
        let window = w
            .ingest(encode_single(&reading(23)).as_bytes())
            .unwrap()
            .expect("window");
        assert_eq!(window.len(), 24);
        assert_eq!(window.samples()[0], reading(0));
        assert_eq!(window.samples()[23], reading(23));
        assert_eq!(w.pending(), 0);
    }

    #[test]
    fn malformed_message_leaves_pending_untouched() {
        let mut w = TelemetryWindower::new(24);
        for i in 0..5 {
            w.ingest(encode_single(&reading(i)).as_bytes()).unwrap();
        }
        assert!(w.ingest(b"abc,0,0").is_err());
        assert_eq!(w.pending(), 5);
    }

    #[test]
    fn batch_completes_on_its_own_and_clears_partial() {
        let mut w = TelemetryWindower::new(24);
        w.ingest(b"9,9,9").unwrap();
        let batch: Vec<Triple> = (0..24).map(reading).collect();
        let window = w
            .ingest(encode_batch(&batch).as_bytes())
            .unwrap()
            .expect("window");
        assert_eq!(window.samples(), &batch[..]);
        assert_eq!(w.pending(), 0);
    }

    #[test]
    fn reset_discards_partial_window() {
        let mut w = TelemetryWindower::new(3);
        w.ingest(b"1,1,1").unwrap();
        w.reset();
        assert_eq!(w.pending(), 0);
    }
}
