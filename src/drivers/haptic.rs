// SOS Torch: Haptic Motor Driver
//
// Simple GPIO-driven vibration motor.

use std::thread;
use std::time::Duration;

use esp_idf_hal::gpio::{AnyOutputPin, Output, PinDriver};

use crate::error::{HardwareError, Peripheral};
use crate::gateway::Haptic;

pub struct HapticDriver {
    pin: PinDriver<'static, AnyOutputPin, Output>,
}

impl HapticDriver {
    pub fn new(pin: PinDriver<'static, AnyOutputPin, Output>) -> Self {
        Self { pin }
    }
}

impl Haptic for HapticDriver {
    /// Vibrate for `duration` (blocks the calling thread).
    fn pulse(&mut self, duration: Duration) -> Result<(), HardwareError> {
        self.pin
            .set_high()
            .map_err(|e| HardwareError::command_failed(Peripheral::Haptic, e))?;
        thread::sleep(duration);
        self.pin
            .set_low()
            .map_err(|e| HardwareError::command_failed(Peripheral::Haptic, e))
    }
}
