use std::fmt;

use thiserror::Error;

/// Which peripheral a command was addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Peripheral {
    Torch,
    Audio,
    Haptic,
    Accelerometer,
}

impl fmt::Display for Peripheral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Torch => "torch",
            Self::Audio => "audio",
            Self::Haptic => "haptic",
            Self::Accelerometer => "accelerometer",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HardwareError {
    #[error("hardware unavailable: {0}")]
    Unavailable(String),

    /// Another component currently owns the peripheral.
    #[error("{0} busy: {1}")]
    Busy(Peripheral, String),

    #[error("{peripheral} command failed: {reason}")]
    CommandFailed {
        peripheral: Peripheral,
        reason: String,
    },
}

impl HardwareError {
    pub fn command_failed(peripheral: Peripheral, reason: impl fmt::Display) -> Self {
        Self::CommandFailed {
            peripheral,
            reason: reason.to_string(),
        }
    }
}
