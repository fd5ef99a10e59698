// SOS Torch: Firmware Core
//
// Handheld signalling light: shake to toggle the torch, long-press for a
// repeating SOS light + beep pattern.
//
// Leaf to root:
//   gateway  traits for torch, audio cue, haptic motor, accelerometer
//   shake    debounced shake detector
//   torch    mutex-guarded torch line + flashlight toggle
//   sos      SOS pattern and cancellable sequencer
//   app      device context owning all of the above
//   tasks    sensor / UI / button threads (FreeRTOS tasks on target)

pub mod app;
pub mod config;
pub mod drivers;
pub mod error;
pub mod events;
pub mod gateway;
pub mod input;
pub mod shake;
pub mod sos;
pub mod tasks;
pub mod torch;

// ---------------------------------------------------------------------------
// Utility: milliseconds since boot (monotonic)
// ---------------------------------------------------------------------------
#[cfg(target_os = "espidf")]
pub fn now_ms() -> u64 {
    unsafe { (esp_idf_sys::esp_timer_get_time() / 1000) as u64 }
}

#[cfg(not(target_os = "espidf"))]
pub fn now_ms() -> u64 {
    use std::sync::OnceLock;
    use std::time::Instant;

    static BOOT: OnceLock<Instant> = OnceLock::new();
    BOOT.get_or_init(Instant::now).elapsed().as_millis() as u64
}
