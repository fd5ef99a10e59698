// SOS Torch: MPU6050 Accelerometer Driver
//
// Custom register-level driver over the I2C bus.
// Avoids external crate version conflicts with esp-idf-hal.

use std::sync::Mutex;

use esp_idf_hal::i2c::I2cDriver;

use crate::config::*;
use crate::error::{HardwareError, Peripheral};
use crate::events::AccelSample;
use crate::gateway::AccelSource;

/// Thread-safe handle to a shared I2C bus.
pub type SharedBus = &'static Mutex<I2cDriver<'static>>;

// MPU6050 register addresses
const REG_PWR_MGMT_1: u8 = 0x6B;
const REG_CONFIG: u8 = 0x1A;
const REG_ACCEL_CONFIG: u8 = 0x1C;
const REG_ACCEL_XOUT_H: u8 = 0x3B; // Start of 6-byte accel burst
const REG_WHO_AM_I: u8 = 0x75;
const WHO_AM_I_EXPECTED: u8 = 0x68;

fn bus_error(e: impl std::fmt::Display) -> HardwareError {
    HardwareError::command_failed(Peripheral::Accelerometer, e)
}

pub struct Mpu6050 {
    bus: SharedBus,
}

impl Mpu6050 {
    pub fn new(bus: SharedBus) -> Self {
        Self { bus }
    }

    fn bus(&self) -> Result<std::sync::MutexGuard<'_, I2cDriver<'static>>, HardwareError> {
        self.bus.lock().map_err(|_| bus_error("I2C bus lock poisoned"))
    }

    /// Verify the device is reachable on the I2C bus.
    pub fn is_connected(&self) -> bool {
        let Ok(mut bus) = self.bus() else {
            return false;
        };
        let mut buf = [0u8; 1];
        match bus.write_read(I2C_ADDR_MPU6050, &[REG_WHO_AM_I], &mut buf, I2C_TIMEOUT_TICKS) {
            Ok(()) => buf[0] == WHO_AM_I_EXPECTED,
            Err(_) => false,
        }
    }

    /// Wake the sensor and configure accel (±16 g), DLPF 21 Hz.
    pub fn init(&self) -> Result<(), HardwareError> {
        let mut bus = self.bus()?;

        // Wake up (clear SLEEP bit)
        bus.write(I2C_ADDR_MPU6050, &[REG_PWR_MGMT_1, 0x00], I2C_TIMEOUT_TICKS)
            .map_err(bus_error)?;

        // DLPF bandwidth 21 Hz
        bus.write(I2C_ADDR_MPU6050, &[REG_CONFIG, 0x04], I2C_TIMEOUT_TICKS)
            .map_err(bus_error)?;

        // Accelerometer: ±16 g, shakes easily exceed ±8 g
        bus.write(I2C_ADDR_MPU6050, &[REG_ACCEL_CONFIG, 0x18], I2C_TIMEOUT_TICKS)
            .map_err(bus_error)?;

        log::info!("MPU6050 initialised (±16g, DLPF 21Hz)");
        Ok(())
    }
}

impl AccelSource for Mpu6050 {
    /// Burst-read the three accel axes and convert to m/s².
    fn read(&mut self) -> Result<AccelSample, HardwareError> {
        let mut raw = [0u8; 6];
        self.bus()?
            .write_read(I2C_ADDR_MPU6050, &[REG_ACCEL_XOUT_H], &mut raw, I2C_TIMEOUT_TICKS)
            .map_err(bus_error)?;

        let axis = |hi: u8, lo: u8| {
            i16::from_be_bytes([hi, lo]) as f32 / ACCEL_SCALE_16G * STANDARD_GRAVITY
        };

        Ok(AccelSample {
            x: axis(raw[0], raw[1]),
            y: axis(raw[2], raw[3]),
            z: axis(raw[4], raw[5]),
            timestamp_ms: crate::now_ms(),
        })
    }
}
