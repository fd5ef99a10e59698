// SOS Torch: Button Task
//
// Samples the user button at ~100 Hz and turns gestures into UI events.

use std::sync::mpsc::Sender;
use std::thread;
use std::time::{Duration, Instant};

use esp_idf_hal::gpio::{AnyInputPin, Input, PinDriver};

use crate::config::*;
use crate::events::UiEvent;
use crate::input::GestureDecoder;

pub fn button_task(pin: PinDriver<'static, AnyInputPin, Input>, ui_tx: Sender<UiEvent>) {
    log::info!("Button task started");

    let poll_interval = Duration::from_millis(UI_POLL_INTERVAL_MS);
    let mut decoder = GestureDecoder::new(Instant::now());

    loop {
        // Active LOW with pull-up.
        let pressed = pin.is_low();
        if let Some(gesture) = decoder.update(pressed, Instant::now()) {
            log::debug!("Button {:?}", gesture);
            if ui_tx.send(gesture.to_event()).is_err() {
                log::warn!("UI channel closed, exiting button task");
                return;
            }
        }
        thread::sleep(poll_interval);
    }
}
