// SOS Torch: Peripheral Drivers
//
// Board drivers talk to the Xiao ESP32-C3 through esp-idf-hal; the simulated
// set lets the same firmware logic run (and be tested) on a desktop host.

#[cfg(target_os = "espidf")]
pub mod buzzer;
#[cfg(target_os = "espidf")]
pub mod haptic;
#[cfg(target_os = "espidf")]
pub mod imu;
#[cfg(target_os = "espidf")]
pub mod led;

pub mod sim;
