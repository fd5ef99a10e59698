// SOS Torch: Button Gesture Decoder
//
// Debounced button handler with single-click, double-click, and long-press
// detection. Pure state machine: the button task samples the pin at ~100 Hz
// and feeds the level in together with the sample time.

use std::time::{Duration, Instant};

use crate::config::*;
use crate::events::UiEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    SingleClick,
    DoubleClick,
    LongPress,
}

impl Gesture {
    /// What the shell asks of the device for each gesture.
    pub fn to_event(self) -> UiEvent {
        match self {
            Self::SingleClick => UiEvent::FlashlightPressed,
            Self::DoubleClick => UiEvent::SensingPressed,
            Self::LongPress => UiEvent::SosPressed,
        }
    }
}

pub struct GestureDecoder {
    // Debounce state
    last_raw: bool,
    last_change: Instant,

    // Press tracking
    press_start: Option<Instant>,
    button_down: bool,
    long_press_sent: bool,

    // Double-click state machine
    first_click_at: Option<Instant>,
}

impl GestureDecoder {
    pub fn new(now: Instant) -> Self {
        Self {
            last_raw: false,
            last_change: now,
            press_start: None,
            button_down: false,
            long_press_sent: false,
            first_click_at: None,
        }
    }

    /// Call every ~10 ms with the raw level (`true` = pressed).
    pub fn update(&mut self, pressed: bool, now: Instant) -> Option<Gesture> {
        // ---- debounce filter ----
        if pressed != self.last_raw {
            self.last_change = now;
        }
        self.last_raw = pressed;

        if now.duration_since(self.last_change) < Duration::from_millis(DEBOUNCE_MS) {
            // Signal still bouncing; only the click window can expire.
            return self.check_double_click_timeout(now);
        }

        // ---- button pressed edge ----
        if pressed && !self.button_down {
            self.button_down = true;
            self.press_start = Some(now);
            self.long_press_sent = false;
        }

        // ---- held: fire long press without waiting for release ----
        if pressed && !self.long_press_sent {
            let held = self.press_start.map(|t| now.duration_since(t)).unwrap_or_default();
            if held >= Duration::from_millis(LONG_PRESS_MS) {
                self.long_press_sent = true;
                self.first_click_at = None;
                return Some(Gesture::LongPress);
            }
        }

        // ---- button released edge ----
        if !pressed && self.button_down {
            self.button_down = false;
            self.press_start = None;

            if self.long_press_sent {
                return None;
            }
            if self.first_click_at.take().is_some() {
                // Second click within window
                return Some(Gesture::DoubleClick);
            }
            self.first_click_at = Some(now);
            return None;
        }

        self.check_double_click_timeout(now)
    }

    /// If the double-click window expires, emit a single-click.
    fn check_double_click_timeout(&mut self, now: Instant) -> Option<Gesture> {
        let first = self.first_click_at?;
        if now.duration_since(first) > Duration::from_millis(DOUBLE_CLICK_WINDOW_MS) {
            self.first_click_at = None;
            return Some(Gesture::SingleClick);
        }
        None
    }
}
