// SOS Torch: System Events & Data Types

use std::fmt;

use crate::error::HardwareError;

// ---------------------------------------------------------------------------
// Sensor Data (3-axis accelerometer reading, m/s²)
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AccelSample {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Monotonic milliseconds since boot.
    pub timestamp_ms: u64,
}

/// A debounced shake, as emitted by [`crate::shake::ShakeDetector`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShakeEvent {
    pub timestamp_ms: u64,
    /// How far the magnitude exceeded standard gravity.
    pub delta: f32,
}

// ---------------------------------------------------------------------------
// Torch / SOS state
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TorchState {
    #[default]
    Off,
    On,
}

impl TorchState {
    pub fn is_on(self) -> bool {
        self == Self::On
    }

    pub fn flipped(self) -> Self {
        match self {
            Self::Off => Self::On,
            Self::On => Self::Off,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SosRunState {
    #[default]
    Idle,
    Running,
}

// ---------------------------------------------------------------------------
// Notices: user-visible notifications surfaced by the shell
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// No torch-capable device, or the platform refused control.
    TorchUnavailable(String),
    /// A flashlight toggle was rejected by the hardware.
    TorchFailed(HardwareError),
    /// A flashlight toggle was refused because SOS owns the torch.
    TorchBusy,
    /// The SOS session hit a hardware fault and keeps signalling best-effort.
    SosDegraded(HardwareError),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TorchUnavailable(reason) => write!(f, "Torch not supported: {reason}"),
            Self::TorchFailed(err) => write!(f, "Could not control the torch: {err}"),
            Self::TorchBusy => f.write_str("Torch is busy signalling SOS"),
            Self::SosDegraded(err) => write!(f, "SOS signal degraded: {err}"),
        }
    }
}

// ---------------------------------------------------------------------------
// UI Events: sent to the UI task via channel
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UiEvent {
    /// Flashlight control tapped (single click).
    FlashlightPressed,
    /// SOS control tapped (long press).
    SosPressed,
    /// The sensor task detected a shake.
    Shake(ShakeEvent),
    /// Sensing control tapped (double click): pause or resume shake sensing.
    SensingPressed,
    /// Device came to the foreground: start shake sensing.
    Resume,
    /// Device went to the background: stop shake sensing.
    Pause,
    /// Tear everything down and leave the UI loop.
    Shutdown,
}
