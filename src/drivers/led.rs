// SOS Torch: Torch LED Driver
//
// High-power white LED switched through a logic-level MOSFET on one GPIO.

use esp_idf_hal::gpio::{AnyOutputPin, Output, PinDriver};

use crate::error::{HardwareError, Peripheral};
use crate::gateway::{DeviceId, TorchGateway};

pub struct TorchLed {
    id: DeviceId,
    pin: PinDriver<'static, AnyOutputPin, Output>,
}

impl TorchLed {
    pub fn new(mut pin: PinDriver<'static, AnyOutputPin, Output>) -> anyhow::Result<Self> {
        // Never boot with the torch lit.
        pin.set_low()?;
        Ok(Self {
            id: DeviceId::from("led0"),
            pin,
        })
    }
}

impl TorchGateway for TorchLed {
    fn torch_devices(&self) -> Vec<DeviceId> {
        vec![self.id.clone()]
    }

    fn set_torch(&mut self, device: &DeviceId, on: bool) -> Result<(), HardwareError> {
        if *device != self.id {
            return Err(HardwareError::Unavailable(format!("unknown torch device {device}")));
        }
        let result = if on { self.pin.set_high() } else { self.pin.set_low() };
        result.map_err(|e| HardwareError::command_failed(Peripheral::Torch, e))
    }
}
