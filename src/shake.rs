// SOS Torch: Shake Detector
//
// Debounced threshold filter over the acceleration magnitude. Keeps nothing
// between samples except the time of the last shake.

use crate::config::*;
use crate::events::{AccelSample, ShakeEvent};

#[derive(Debug, Default)]
pub struct ShakeDetector {
    last_shake_ms: Option<u64>,
}

impl ShakeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one sample (m/s²). Returns a shake when the magnitude exceeds
    /// gravity by more than [`SHAKE_THRESHOLD`] and the previous shake is
    /// older than [`SHAKE_DEBOUNCE_MS`].
    pub fn on_sample(&mut self, x: f32, y: f32, z: f32, timestamp_ms: u64) -> Option<ShakeEvent> {
        let magnitude = (x * x + y * y + z * z).sqrt();
        let delta = magnitude - STANDARD_GRAVITY;

        if delta.is_nan() || delta <= SHAKE_THRESHOLD {
            return None;
        }

        if let Some(last) = self.last_shake_ms {
            // Clock running backwards never counts as elapsed time.
            if timestamp_ms.saturating_sub(last) <= SHAKE_DEBOUNCE_MS {
                return None;
            }
        }

        self.last_shake_ms = Some(timestamp_ms);
        log::debug!("Shake at {} ms (delta {:.2} m/s²)", timestamp_ms, delta);
        Some(ShakeEvent {
            timestamp_ms,
            delta,
        })
    }

    pub fn on_accel(&mut self, sample: AccelSample) -> Option<ShakeEvent> {
        self.on_sample(sample.x, sample.y, sample.z, sample.timestamp_ms)
    }
}
