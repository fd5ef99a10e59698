#[cfg(target_os = "espidf")]
pub mod button;
pub mod sensor;
pub mod ui;
