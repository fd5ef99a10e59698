// SOS Torch: Sensor Task
//
// Polls the accelerometer at a UI-appropriate rate, runs every sample through
// the shake detector and forwards shakes to the UI task. The task lives only
// while the device is subscribed; unsubscribing stops it and hands the
// accelerometer (and the detector's debounce state) back.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::config::*;
use crate::events::UiEvent;
use crate::gateway::AccelSource;
use crate::shake::ShakeDetector;

/// What a subscription borrows while it runs.
pub struct SensorParts {
    pub source: Box<dyn AccelSource>,
    pub detector: ShakeDetector,
}

impl SensorParts {
    pub fn new(source: Box<dyn AccelSource>) -> Self {
        Self {
            source,
            detector: ShakeDetector::new(),
        }
    }
}

/// A live sensor task. Dropping it without [`unsubscribe`](Self::unsubscribe)
/// still ends the task, but loses the parts.
pub struct SensorSubscription {
    stop: Sender<()>,
    handle: JoinHandle<SensorParts>,
}

impl SensorSubscription {
    pub fn subscribe(
        parts: SensorParts,
        ui_tx: Sender<UiEvent>,
        interval: Duration,
    ) -> anyhow::Result<Self> {
        let (stop, stop_rx) = mpsc::channel();
        let handle = thread::Builder::new()
            .name("sensor".into())
            .stack_size(STACK_SENSOR)
            .spawn(move || sensor_task(parts, ui_tx, stop_rx, interval))?;
        log::info!("Shake sensing on ({} ms interval)", interval.as_millis());
        Ok(Self { stop, handle })
    }

    /// Stop the task and wait for it. `None` if the task panicked.
    pub fn unsubscribe(self) -> Option<SensorParts> {
        drop(self.stop);
        match self.handle.join() {
            Ok(parts) => {
                log::info!("Shake sensing off");
                Some(parts)
            }
            Err(_) => {
                log::error!("Sensor task panicked");
                None
            }
        }
    }
}

fn sensor_task(
    mut parts: SensorParts,
    ui_tx: Sender<UiEvent>,
    stop_rx: Receiver<()>,
    interval: Duration,
) -> SensorParts {
    log::info!("Sensor task started");

    loop {
        let tick_start = Instant::now();

        match parts.source.read() {
            Ok(sample) => {
                if let Some(shake) = parts.detector.on_accel(sample) {
                    if ui_tx.send(UiEvent::Shake(shake)).is_err() {
                        // Receiver dropped: UI task has exited. Shut down cleanly.
                        log::warn!("UI channel closed, exiting sensor task");
                        return parts;
                    }
                }
            }
            Err(e) => {
                log::warn!("Accelerometer read error: {}", e);
            }
        }

        // Sleep for the remainder of the sampling interval, waking early on stop.
        let remaining = interval.saturating_sub(tick_start.elapsed());
        match stop_rx.recv_timeout(remaining) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(RecvTimeoutError::Disconnected) => return parts,
        }
    }
}
