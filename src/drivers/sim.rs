// SOS Torch: Simulated Peripherals
//
// Log-only stand-ins for the board hardware. The accelerometer replays
// gravity with a shake spike at a fixed cadence.

use std::time::{Duration, Instant};

use crate::config::*;
use crate::error::HardwareError;
use crate::events::AccelSample;
use crate::gateway::{AccelSource, AudioCue, DeviceId, Haptic, TorchGateway};

pub struct SimTorch {
    devices: Vec<DeviceId>,
}

impl SimTorch {
    pub fn new() -> Self {
        Self {
            devices: vec![DeviceId::from("sim-led0")],
        }
    }
}

impl Default for SimTorch {
    fn default() -> Self {
        Self::new()
    }
}

impl TorchGateway for SimTorch {
    fn torch_devices(&self) -> Vec<DeviceId> {
        self.devices.clone()
    }

    fn set_torch(&mut self, device: &DeviceId, on: bool) -> Result<(), HardwareError> {
        log::info!("[sim] torch {} {}", device, if on { "ON" } else { "off" });
        Ok(())
    }
}

#[derive(Default)]
pub struct SimBuzzer {
    started: Option<Instant>,
}

impl AudioCue for SimBuzzer {
    fn is_playing(&self) -> bool {
        self.started
            .is_some_and(|t| t.elapsed() < Duration::from_millis(BEEP_DURATION_MS))
    }

    fn play(&mut self) -> Result<(), HardwareError> {
        log::info!("[sim] beep");
        self.started = Some(Instant::now());
        Ok(())
    }

    fn stop(&mut self) -> Result<(), HardwareError> {
        self.started = None;
        Ok(())
    }

    fn reset(&mut self) -> Result<(), HardwareError> {
        Ok(())
    }
}

pub struct SimHaptic;

impl Haptic for SimHaptic {
    fn pulse(&mut self, duration: Duration) -> Result<(), HardwareError> {
        log::info!("[sim] buzz {} ms", duration.as_millis());
        Ok(())
    }
}

pub struct SimAccelerometer {
    reads: u64,
    spike_every: u64,
}

impl SimAccelerometer {
    /// Every `spike_every`-th reading is a hard jolt (~2.5 g on z).
    pub fn new(spike_every: u64) -> Self {
        Self {
            reads: 0,
            spike_every: spike_every.max(1),
        }
    }
}

impl AccelSource for SimAccelerometer {
    fn read(&mut self) -> Result<AccelSample, HardwareError> {
        self.reads += 1;
        let z = if self.reads % self.spike_every == 0 {
            STANDARD_GRAVITY * 2.5
        } else {
            STANDARD_GRAVITY
        };
        Ok(AccelSample {
            x: 0.0,
            y: 0.0,
            z,
            timestamp_ms: crate::now_ms(),
        })
    }
}
