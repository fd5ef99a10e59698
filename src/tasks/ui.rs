// SOS Torch: UI Task
//
// Owns the device context and applies UI events (button gestures, shakes,
// lifecycle) one at a time, so flashlight toggles are serialised.
// Only `Shutdown` ends the loop: the device holds a sender for its sensor
// subscriptions, so the channel stays open while it lives.

use std::sync::mpsc::Receiver;

use crate::app::Device;
use crate::events::UiEvent;

pub fn ui_task(mut device: Device, ui_rx: Receiver<UiEvent>) -> Device {
    log::info!("UI task started");

    for event in ui_rx.iter() {
        log::debug!("UI event {:?}", event);
        if device.handle(event).is_break() {
            break;
        }
    }

    device.shutdown();
    device
}
