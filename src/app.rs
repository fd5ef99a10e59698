// SOS Torch: Device Context
//
// Owns every component and hardware handle. Built once at boot, driven by the
// UI task, torn down by `shutdown()`.

use std::ops::ControlFlow;
use std::sync::mpsc::Sender;
use std::time::Duration;

use crate::config::*;
use crate::error::{HardwareError, Peripheral};
use crate::events::{Notice, SosRunState, TorchState, UiEvent};
use crate::gateway::{self, AccelSource, AudioCue, Haptic, TorchGateway};
use crate::sos::SosSequencer;
use crate::tasks::sensor::{SensorParts, SensorSubscription};
use crate::torch::{self, FlashlightToggle, SharedTorch, TorchLine};

/// Hardware handed to the device at boot.
pub struct Peripherals {
    /// `None` when the platform has no torch control at all.
    pub torch: Option<Box<dyn TorchGateway>>,
    pub audio: Box<dyn AudioCue>,
    pub haptic: Box<dyn Haptic>,
    pub accel: Option<Box<dyn AccelSource>>,
}

enum Sensing {
    Paused(Option<SensorParts>),
    Subscribed(SensorSubscription),
}

pub struct Device {
    torch: SharedTorch,
    flashlight: FlashlightToggle,
    sos: SosSequencer,
    sensing: Sensing,
    ui_tx: Sender<UiEvent>,
    notices: Sender<Notice>,
    sample_interval: Duration,
}

impl Device {
    pub fn new(peripherals: Peripherals, ui_tx: Sender<UiEvent>, notices: Sender<Notice>) -> Self {
        let torch = TorchLine::shared(gateway::select_torch(peripherals.torch));
        if !torch::lock(&torch).is_supported() {
            let _ = notices.send(Notice::TorchUnavailable(
                "this device cannot drive a torch".into(),
            ));
        }

        let flashlight = FlashlightToggle::new(torch.clone(), peripherals.haptic, notices.clone());
        let sos = SosSequencer::new(torch.clone(), peripherals.audio, notices.clone());

        Self {
            torch,
            flashlight,
            sos,
            sensing: Sensing::Paused(peripherals.accel.map(SensorParts::new)),
            ui_tx,
            notices,
            sample_interval: Duration::from_millis(SENSOR_SAMPLE_INTERVAL_MS),
        }
    }

    pub fn with_sample_interval(mut self, interval: Duration) -> Self {
        self.sample_interval = interval;
        self
    }

    pub fn torch_state(&self) -> TorchState {
        torch::lock(&self.torch).state()
    }

    pub fn sos_state(&self) -> SosRunState {
        self.sos.state()
    }

    pub fn is_sensing(&self) -> bool {
        matches!(self.sensing, Sensing::Subscribed(_))
    }

    /// Refused while an SOS session owns the torch: no command is sent and
    /// no haptic pulse fires.
    pub fn toggle_flashlight(&mut self) -> Result<TorchState, HardwareError> {
        if self.sos.state() == SosRunState::Running {
            let err = HardwareError::Busy(Peripheral::Torch, "SOS signal in progress".into());
            log::warn!("Flashlight toggle refused: {}", err);
            let _ = self.notices.send(Notice::TorchBusy);
            return Err(err);
        }
        self.flashlight.toggle()
    }

    pub fn toggle_sos(&mut self) -> anyhow::Result<SosRunState> {
        self.sos.toggle()
    }

    /// Foreground: subscribe to the accelerometer.
    pub fn resume(&mut self) -> anyhow::Result<()> {
        let parts = match &mut self.sensing {
            Sensing::Subscribed(_) => return Ok(()),
            Sensing::Paused(parts) => parts.take(),
        };
        let Some(parts) = parts else {
            log::warn!("No accelerometer, shake sensing unavailable");
            return Ok(());
        };

        self.sensing = Sensing::Subscribed(SensorSubscription::subscribe(
            parts,
            self.ui_tx.clone(),
            self.sample_interval,
        )?);
        Ok(())
    }

    /// Background: drop the accelerometer subscription.
    pub fn pause(&mut self) {
        let sensing = std::mem::replace(&mut self.sensing, Sensing::Paused(None));
        self.sensing = match sensing {
            Sensing::Subscribed(sub) => Sensing::Paused(sub.unsubscribe()),
            paused => paused,
        };
    }

    /// Apply one UI event. `Break` once the device has been asked to shut down.
    pub fn handle(&mut self, event: UiEvent) -> ControlFlow<()> {
        match event {
            UiEvent::FlashlightPressed => {
                // Failures were already surfaced as a notice.
                let _ = self.toggle_flashlight();
            }
            UiEvent::Shake(shake) => {
                log::info!("Shake detected (delta {:.1} m/s²)", shake.delta);
                let _ = self.toggle_flashlight();
            }
            UiEvent::SosPressed => {
                if let Err(e) = self.toggle_sos() {
                    log::error!("SOS toggle failed: {}", e);
                }
            }
            UiEvent::SensingPressed => {
                if self.is_sensing() {
                    self.pause();
                } else if let Err(e) = self.resume() {
                    log::error!("Could not start shake sensing: {}", e);
                }
            }
            UiEvent::Resume => {
                if let Err(e) = self.resume() {
                    log::error!("Could not start shake sensing: {}", e);
                }
            }
            UiEvent::Pause => self.pause(),
            UiEvent::Shutdown => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    /// Stop signalling, release the sensor and leave the torch dark.
    pub fn shutdown(&mut self) {
        self.pause();
        self.sos.stop();
        log::info!("Device shut down");
    }
}
