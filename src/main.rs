// SOS Torch: Firmware Entry Point
//
// Boot sequence:
//   1. Bring up I2C, the MPU6050, the torch LED, buzzer and vibration motor.
//   2. Build the device context (torch capability is selected once here).
//   3. Spawn the UI and button tasks, then resume shake sensing.
//   4. The main thread surfaces user notices for the rest of its life.
//
// On a desktop host the same core runs against simulated peripherals and a
// short scripted session.

use std::sync::mpsc;
use std::thread;

use sos_torch::app::{Device, Peripherals};
use sos_torch::config::*;
use sos_torch::events::{Notice, UiEvent};
use sos_torch::tasks;

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------
#[cfg(target_os = "espidf")]
fn main() -> anyhow::Result<()> {
    use std::sync::Mutex;

    use esp_idf_hal::gpio::{AnyInputPin, Input, InputPin, OutputPin, PinDriver};
    use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
    use esp_idf_hal::ledc::{config::TimerConfig, LedcDriver, LedcTimerDriver};
    use esp_idf_hal::peripherals::Peripherals as Board;
    use esp_idf_hal::units::FromValueType;

    use sos_torch::drivers::buzzer::Buzzer;
    use sos_torch::drivers::haptic::HapticDriver;
    use sos_torch::drivers::imu::Mpu6050;
    use sos_torch::drivers::led::TorchLed;
    use sos_torch::gateway::AccelSource;

    // Link esp-idf-sys runtime patches and initialise logging.
    esp_idf_svc::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();
    log::info!("SOS Torch firmware starting…");

    // ---- Peripherals ------------------------------------------------------
    let peripherals = Board::take()?;

    // I2C bus for the MPU6050. Lives for the whole programme.
    let i2c_config = I2cConfig::new().baudrate(400u32.kHz().into());
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio6, // SDA
        peripherals.pins.gpio7, // SCL
        &i2c_config,
    )?;
    let i2c_bus: &'static Mutex<I2cDriver<'static>> = Box::leak(Box::new(Mutex::new(i2c)));

    // Self-test: a missing accelerometer only disables shake sensing.
    let imu = Mpu6050::new(i2c_bus);
    let accel: Option<Box<dyn AccelSource>> = match imu.init() {
        Ok(()) if imu.is_connected() => Some(Box::new(imu)),
        Ok(()) => {
            log::error!("MPU6050 not responding, shake sensing disabled");
            None
        }
        Err(e) => {
            log::error!("MPU6050 init failed ({}), shake sensing disabled", e);
            None
        }
    };

    let torch_pin = PinDriver::output(peripherals.pins.gpio5.downgrade_output())?;
    let haptic_pin = PinDriver::output(peripherals.pins.gpio4.downgrade_output())?;

    let ledc_timer = LedcTimerDriver::new(
        peripherals.ledc.timer0,
        &TimerConfig::new().frequency(BEEP_FREQUENCY_HZ.Hz()),
    )?;
    let ledc = LedcDriver::new(peripherals.ledc.channel0, ledc_timer, peripherals.pins.gpio8)?;

    let button: PinDriver<'static, AnyInputPin, Input> =
        PinDriver::input(peripherals.pins.gpio3.downgrade_input())?;
    // Pull-up via the raw API: the downgraded input pin has no `set_pull`.
    let ret = unsafe {
        esp_idf_sys::gpio_set_pull_mode(PIN_BUTTON, esp_idf_sys::gpio_pull_mode_t_GPIO_PULLUP_ONLY)
    };
    if ret != esp_idf_sys::ESP_OK {
        log::error!("Button pull-up config failed ({})", ret);
    }

    // ---- Device context ---------------------------------------------------
    let (ui_tx, ui_rx) = mpsc::channel();
    let (notice_tx, notice_rx) = mpsc::channel::<Notice>();

    let device = Device::new(
        Peripherals {
            torch: Some(Box::new(TorchLed::new(torch_pin)?)),
            audio: Box::new(Buzzer::new(ledc)?),
            haptic: Box::new(HapticDriver::new(haptic_pin)),
            accel,
        },
        ui_tx.clone(),
        notice_tx,
    );

    // ---- Spawn tasks (map to FreeRTOS tasks via std::thread) ---------------
    thread::Builder::new()
        .name("ui".into())
        .stack_size(STACK_UI)
        .spawn(move || {
            tasks::ui::ui_task(device, ui_rx);
        })?;

    let button_tx = ui_tx.clone();
    thread::Builder::new()
        .name("button".into())
        .stack_size(STACK_BUTTON)
        .spawn(move || {
            tasks::button::button_task(button, button_tx);
        })?;

    // Foreground from the start.
    ui_tx.send(UiEvent::Resume)?;
    log::info!("Boot complete, entering normal operation");

    // Main thread only surfaces notices from here on.
    for notice in notice_rx {
        log::warn!("NOTICE: {}", notice);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Desktop simulator
// ---------------------------------------------------------------------------
#[cfg(not(target_os = "espidf"))]
fn main() -> anyhow::Result<()> {
    use std::time::Duration;

    use sos_torch::drivers::sim::{SimAccelerometer, SimBuzzer, SimHaptic, SimTorch};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("SOS Torch simulator starting…");

    let (ui_tx, ui_rx) = mpsc::channel();
    let (notice_tx, notice_rx) = mpsc::channel::<Notice>();

    let device = Device::new(
        Peripherals {
            torch: Some(Box::new(SimTorch::new())),
            audio: Box::new(SimBuzzer::default()),
            haptic: Box::new(SimHaptic),
            accel: Some(Box::new(SimAccelerometer::new(40))),
        },
        ui_tx.clone(),
        notice_tx,
    );

    let ui = thread::Builder::new()
        .name("ui".into())
        .stack_size(STACK_UI)
        .spawn(move || tasks::ui::ui_task(device, ui_rx))?;

    let script = [
        (UiEvent::Resume, 3_000),
        (UiEvent::Pause, 0),
        (UiEvent::FlashlightPressed, 500),
        (UiEvent::FlashlightPressed, 500),
        (UiEvent::SosPressed, 7_000),
        (UiEvent::SosPressed, 500),
        (UiEvent::Shutdown, 0),
    ];
    for (event, hold_ms) in script {
        log::info!("[sim] user: {:?}", event);
        ui_tx.send(event)?;
        thread::sleep(Duration::from_millis(hold_ms));
    }

    let device = ui.join().map_err(|_| anyhow::anyhow!("UI task panicked"))?;
    log::info!(
        "Final state: torch {:?}, SOS {:?}",
        device.torch_state(),
        device.sos_state()
    );

    for notice in notice_rx.try_iter() {
        log::warn!("NOTICE: {}", notice);
    }
    Ok(())
}
