// SOS Torch: Peripheral Gateways
//
// Thin pass-through interfaces to the hardware. Board drivers live in
// `drivers::*`; the host build implements the same traits in `drivers::sim`.

use std::fmt;
use std::time::Duration;

use crate::error::HardwareError;
use crate::events::AccelSample;

/// Identifies one torch-capable emitter on the platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceId(pub String);

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

/// Platform access to every torch emitter it knows about.
pub trait TorchGateway: Send {
    /// Emitters that support torch mode, in platform order.
    fn torch_devices(&self) -> Vec<DeviceId>;

    fn set_torch(&mut self, device: &DeviceId, on: bool) -> Result<(), HardwareError>;
}

/// One fixed, short sound asset.
pub trait AudioCue: Send {
    fn is_playing(&self) -> bool;
    fn play(&mut self) -> Result<(), HardwareError>;
    fn stop(&mut self) -> Result<(), HardwareError>;
    /// Rewind to the start position so the next `play` begins cleanly.
    fn reset(&mut self) -> Result<(), HardwareError>;
}

/// Play the cue from position zero. A shot that is still sounding is
/// restarted instead of layered.
pub fn play_beep(cue: &mut dyn AudioCue) -> Result<(), HardwareError> {
    if cue.is_playing() {
        cue.stop()?;
        cue.reset()?;
    }
    cue.play()
}

pub trait Haptic: Send {
    fn pulse(&mut self, duration: Duration) -> Result<(), HardwareError>;
}

/// Push-style accelerometer, polled by the sensor task.
pub trait AccelSource: Send {
    fn read(&mut self) -> Result<AccelSample, HardwareError>;
}

// ---------------------------------------------------------------------------
// Torch capability (selected once at startup)
// ---------------------------------------------------------------------------

/// The torch as the rest of the firmware sees it: either bound to a concrete
/// emitter or permanently unavailable.
pub trait Torch: Send {
    fn set(&mut self, on: bool) -> Result<(), HardwareError>;
    fn is_supported(&self) -> bool;
}

pub struct SupportedTorch {
    gateway: Box<dyn TorchGateway>,
    device: DeviceId,
}

impl Torch for SupportedTorch {
    fn set(&mut self, on: bool) -> Result<(), HardwareError> {
        self.gateway.set_torch(&self.device, on)
    }

    fn is_supported(&self) -> bool {
        true
    }
}

pub struct UnsupportedTorch {
    reason: String,
}

impl UnsupportedTorch {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl Torch for UnsupportedTorch {
    fn set(&mut self, _on: bool) -> Result<(), HardwareError> {
        Err(HardwareError::Unavailable(self.reason.clone()))
    }

    fn is_supported(&self) -> bool {
        false
    }
}

/// Bind the first torch-capable emitter, or fall back to the unsupported
/// implementation when there is none.
pub fn select_torch(gateway: Option<Box<dyn TorchGateway>>) -> Box<dyn Torch> {
    let Some(gateway) = gateway else {
        log::warn!("No torch gateway on this platform");
        return Box::new(UnsupportedTorch::new("torch control not supported"));
    };

    match gateway.torch_devices().into_iter().next() {
        Some(device) => {
            log::info!("Torch bound to device {}", device);
            Box::new(SupportedTorch { gateway, device })
        }
        None => {
            log::warn!("No torch-capable device present");
            Box::new(UnsupportedTorch::new("no torch-capable device present"))
        }
    }
}
