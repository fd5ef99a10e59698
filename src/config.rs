// SOS Torch: Hardware & System Configuration
// Target: Seeed Studio Xiao ESP32-C3 (RISC-V)

// ---------------------------------------------------------------------------
// GPIO Pin Definitions (Xiao ESP32-C3 pinout)
// ---------------------------------------------------------------------------
pub const PIN_BUTTON: i32 = 3; // D1/A1: User button (INPUT_PULLUP, active LOW)
pub const PIN_HAPTIC: i32 = 4; // D2/A2: Vibration motor control
pub const PIN_TORCH: i32 = 5; // D3:    Torch LED driver (MOSFET gate)
pub const PIN_BUZZER: i32 = 8; // D8:    Piezo buzzer (LEDC PWM)
pub const PIN_I2C_SDA: i32 = 6; // D4:    I2C data line
pub const PIN_I2C_SCL: i32 = 7; // D5:    I2C clock line

// ---------------------------------------------------------------------------
// I2C Bus
// ---------------------------------------------------------------------------
pub const I2C_ADDR_MPU6050: u8 = 0x68;
pub const I2C_TIMEOUT_TICKS: u32 = 1000; // FreeRTOS ticks

// ---------------------------------------------------------------------------
// Task Stack Sizes (bytes)
// ---------------------------------------------------------------------------
pub const STACK_SENSOR: usize = 4096;
pub const STACK_SOS: usize = 4096;
pub const STACK_UI: usize = 8192;
pub const STACK_BUTTON: usize = 4096;

// ---------------------------------------------------------------------------
// Shake detection
// ---------------------------------------------------------------------------
pub const STANDARD_GRAVITY: f32 = 9.806_65; // m/s²
pub const SHAKE_THRESHOLD: f32 = 8.0; // m/s² above gravity
pub const SHAKE_DEBOUNCE_MS: u64 = 1000;

// ---------------------------------------------------------------------------
// SOS timing (milliseconds)
// ---------------------------------------------------------------------------
pub const SOS_SHORT_MS: u64 = 200; // dot, and the dark gap after every symbol
pub const SOS_LONG_MS: u64 = 600; // dash
pub const SOS_SEPARATOR_MS: u64 = 400; // letter separator
pub const SOS_GAP_MS: u64 = SOS_SHORT_MS;
pub const SOS_REPEAT_PAUSE_MS: u64 = 3000;

// ---------------------------------------------------------------------------
// Feedback
// ---------------------------------------------------------------------------
pub const HAPTIC_TORCH_ON_MS: u64 = 200;
pub const HAPTIC_TORCH_OFF_MS: u64 = 100;
pub const BEEP_FREQUENCY_HZ: u32 = 2000;
pub const BEEP_DURATION_MS: u64 = 150;

// ---------------------------------------------------------------------------
// Timing (milliseconds)
// ---------------------------------------------------------------------------
pub const SENSOR_SAMPLE_INTERVAL_MS: u64 = 60; // ~16 Hz, UI-rate sensor delivery
pub const UI_POLL_INTERVAL_MS: u64 = 10; // 100 Hz button poll
pub const DEBOUNCE_MS: u64 = 50;
pub const LONG_PRESS_MS: u64 = 1000;
pub const DOUBLE_CLICK_WINDOW_MS: u64 = 400;

// ---------------------------------------------------------------------------
// MPU6050 Sensor Scale Factors
// ---------------------------------------------------------------------------
pub const ACCEL_SCALE_16G: f32 = 2048.0; // LSB/g at ±16 g
