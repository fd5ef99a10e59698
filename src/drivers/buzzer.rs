// SOS Torch: Piezo Buzzer Driver
//
// LEDC PWM tone at 50 % duty. `play` starts the tone and arms a one-shot
// timer that silences it after BEEP_DURATION_MS, so the caller never blocks.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use esp_idf_hal::ledc::LedcDriver;
use esp_idf_svc::timer::{EspTaskTimerService, EspTimer};

use crate::config::*;
use crate::error::{HardwareError, Peripheral};
use crate::gateway::AudioCue;

fn audio_error(e: impl std::fmt::Display) -> HardwareError {
    HardwareError::command_failed(Peripheral::Audio, e)
}

type SharedChannel = Arc<Mutex<LedcDriver<'static>>>;

fn set_duty(channel: &SharedChannel, duty: u32) -> Result<(), HardwareError> {
    let mut channel = channel.lock().map_err(|_| audio_error("LEDC lock poisoned"))?;
    channel.set_duty(duty).map_err(audio_error)
}

pub struct Buzzer {
    channel: SharedChannel,
    playing: Arc<AtomicBool>,
    silence: EspTimer<'static>,
    tone_duty: u32,
}

impl Buzzer {
    pub fn new(mut channel: LedcDriver<'static>) -> anyhow::Result<Self> {
        let tone_duty = channel.get_max_duty() / 2;
        channel.set_duty(0)?;

        let channel = Arc::new(Mutex::new(channel));
        let playing = Arc::new(AtomicBool::new(false));

        let timer_channel = Arc::clone(&channel);
        let timer_playing = Arc::clone(&playing);
        let silence = EspTaskTimerService::new()?.timer(move || {
            if let Err(e) = set_duty(&timer_channel, 0) {
                log::warn!("Buzzer silence failed: {}", e);
            }
            timer_playing.store(false, Ordering::SeqCst);
        })?;

        Ok(Self {
            channel,
            playing,
            silence,
            tone_duty,
        })
    }
}

impl AudioCue for Buzzer {
    fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }

    fn play(&mut self) -> Result<(), HardwareError> {
        set_duty(&self.channel, self.tone_duty)?;
        self.playing.store(true, Ordering::SeqCst);
        self.silence
            .after(Duration::from_millis(BEEP_DURATION_MS))
            .map_err(audio_error)
    }

    fn stop(&mut self) -> Result<(), HardwareError> {
        self.silence.cancel().map_err(audio_error)?;
        self.playing.store(false, Ordering::SeqCst);
        set_duty(&self.channel, 0)
    }

    /// A synthesised tone has no playback position: stopping already rewinds.
    fn reset(&mut self) -> Result<(), HardwareError> {
        Ok(())
    }
}
