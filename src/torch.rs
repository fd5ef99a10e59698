// SOS Torch: Torch Line & Flashlight Toggle
//
// The torch is shared between the flashlight toggle (UI task) and the SOS
// session (its own thread). Every command goes through one mutex-guarded
// `TorchLine`, which only commits the new state after the hardware accepted
// it.

use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::config::*;
use crate::error::HardwareError;
use crate::events::{Notice, TorchState};
use crate::gateway::{Haptic, Torch};

pub type SharedTorch = Arc<Mutex<TorchLine>>;

pub struct TorchLine {
    torch: Box<dyn Torch>,
    state: TorchState,
}

impl TorchLine {
    pub fn new(torch: Box<dyn Torch>) -> Self {
        Self {
            torch,
            state: TorchState::Off,
        }
    }

    pub fn shared(torch: Box<dyn Torch>) -> SharedTorch {
        Arc::new(Mutex::new(Self::new(torch)))
    }

    pub fn state(&self) -> TorchState {
        self.state
    }

    pub fn is_supported(&self) -> bool {
        self.torch.is_supported()
    }

    /// Drive the hardware to `state`; the committed state follows only on
    /// success.
    pub fn set(&mut self, state: TorchState) -> Result<TorchState, HardwareError> {
        self.torch.set(state.is_on())?;
        self.state = state;
        Ok(state)
    }

    pub fn toggle(&mut self) -> Result<TorchState, HardwareError> {
        self.set(self.state.flipped())
    }
}

/// Lock the shared line. A panic on another thread leaves the line in a
/// consistent state (it commits last), so poisoning is ignored.
pub fn lock(torch: &SharedTorch) -> MutexGuard<'_, TorchLine> {
    torch.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ---------------------------------------------------------------------------
// Flashlight toggle
// ---------------------------------------------------------------------------

pub struct FlashlightToggle {
    torch: SharedTorch,
    haptic: Box<dyn Haptic>,
    notices: Sender<Notice>,
}

impl FlashlightToggle {
    pub fn new(torch: SharedTorch, haptic: Box<dyn Haptic>, notices: Sender<Notice>) -> Self {
        Self {
            torch,
            haptic,
            notices,
        }
    }

    pub fn state(&self) -> TorchState {
        lock(&self.torch).state()
    }

    /// Flip the torch and acknowledge with a vibration pulse (longer when the
    /// torch comes on). On failure the torch state is left untouched and the
    /// user is notified.
    pub fn toggle(&mut self) -> Result<TorchState, HardwareError> {
        // Release the line before the haptic pulse, which may block.
        let result = lock(&self.torch).toggle();

        match result {
            Ok(state) => {
                log::info!("Flashlight {:?}", state);
                let pulse_ms = if state.is_on() {
                    HAPTIC_TORCH_ON_MS
                } else {
                    HAPTIC_TORCH_OFF_MS
                };
                if let Err(e) = self.haptic.pulse(Duration::from_millis(pulse_ms)) {
                    log::warn!("Haptic feedback failed: {}", e);
                }
                Ok(state)
            }
            Err(e) => {
                log::error!("Flashlight toggle failed: {}", e);
                let notice = match &e {
                    HardwareError::Unavailable(reason) => Notice::TorchUnavailable(reason.clone()),
                    HardwareError::Busy(..) => Notice::TorchBusy,
                    HardwareError::CommandFailed { .. } => Notice::TorchFailed(e.clone()),
                };
                let _ = self.notices.send(notice);
                Err(e)
            }
        }
    }
}
