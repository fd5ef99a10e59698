// SOS Torch: SOS Sequencer
//
// IDLE --start()--> RUNNING --stop()--> IDLE
//
// A running session owns a dedicated thread that blinks the torch through
// `SOS_PATTERN`, beeping with every lit symbol, pauses, and repeats. Every
// wait is a cancellation point: `stop()` drops the session's stop channel,
// which wakes the thread at once, then joins it before forcing the torch off.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::config::*;
use crate::error::HardwareError;
use crate::events::{Notice, SosRunState, TorchState};
use crate::gateway::{play_beep, AudioCue};
use crate::torch::{self, SharedTorch};

// ---------------------------------------------------------------------------
// Pattern
// ---------------------------------------------------------------------------

/// One timed interval of the pattern. Every symbol is followed by a dark gap
/// of [`SOS_GAP_MS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symbol {
    pub duration_ms: u64,
    pub torch_on: bool,
}

const fn lit(duration_ms: u64) -> Symbol {
    Symbol {
        duration_ms,
        torch_on: true,
    }
}

/// S, separator, O, separator, S. The separators are lit too, so one pass
/// issues eleven torch-on commands.
pub const SOS_PATTERN: [Symbol; 11] = [
    lit(SOS_SHORT_MS),
    lit(SOS_SHORT_MS),
    lit(SOS_SHORT_MS),
    lit(SOS_SEPARATOR_MS),
    lit(SOS_LONG_MS),
    lit(SOS_LONG_MS),
    lit(SOS_LONG_MS),
    lit(SOS_SEPARATOR_MS),
    lit(SOS_SHORT_MS),
    lit(SOS_SHORT_MS),
    lit(SOS_SHORT_MS),
];

/// Length of one pass including the trailing gaps.
pub fn pattern_duration() -> Duration {
    let ms: u64 = SOS_PATTERN.iter().map(|s| s.duration_ms + SOS_GAP_MS).sum();
    Duration::from_millis(ms)
}

// ---------------------------------------------------------------------------
// Pacing / cancellation
// ---------------------------------------------------------------------------

/// Where a session sleeps. Each call is a cancellation checkpoint.
pub trait Pacer {
    /// Sleep for `duration`. Returns `false` if cancelled before it elapsed.
    fn wait(&mut self, duration: Duration) -> bool;

    fn is_cancelled(&mut self) -> bool;
}

/// Real-time pacer driven by the session's stop channel. Cancellation is the
/// sender being dropped (or sending), so it stays observable once it happened.
pub struct StopSignal {
    rx: Receiver<()>,
    cancelled: bool,
}

impl StopSignal {
    pub fn new(rx: Receiver<()>) -> Self {
        Self { rx, cancelled: false }
    }
}

impl Pacer for StopSignal {
    fn wait(&mut self, duration: Duration) -> bool {
        if self.cancelled {
            return false;
        }
        match self.rx.recv_timeout(duration) {
            Err(RecvTimeoutError::Timeout) => true,
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                self.cancelled = true;
                false
            }
        }
    }

    fn is_cancelled(&mut self) -> bool {
        if !self.cancelled {
            self.cancelled = !matches!(self.rx.try_recv(), Err(TryRecvError::Empty));
        }
        self.cancelled
    }
}

// ---------------------------------------------------------------------------
// Session loop
// ---------------------------------------------------------------------------

/// Reports the first hardware fault of a session; later ones only go to the
/// debug log.
pub struct FaultReport {
    notices: Sender<Notice>,
    reported: bool,
}

impl FaultReport {
    pub fn new(notices: Sender<Notice>) -> Self {
        Self {
            notices,
            reported: false,
        }
    }

    fn report(&mut self, err: HardwareError) {
        if self.reported {
            log::debug!("SOS fault (already reported): {}", err);
            return;
        }
        self.reported = true;
        log::warn!("SOS continues despite hardware fault: {}", err);
        let _ = self.notices.send(Notice::SosDegraded(err));
    }
}

/// Signal until the pacer is cancelled. Leaves the torch in whatever state it
/// had when cancellation was observed; the caller turns it off.
pub fn run_session(
    torch: &SharedTorch,
    audio: &mut dyn AudioCue,
    pacer: &mut dyn Pacer,
    faults: &mut FaultReport,
) {
    let mut pass: u32 = 0;
    loop {
        pass = pass.wrapping_add(1);
        log::debug!("SOS pass {}", pass);

        if !run_pass(torch, audio, pacer, faults) {
            return;
        }
        if !pacer.wait(Duration::from_millis(SOS_REPEAT_PAUSE_MS)) {
            return;
        }
    }
}

/// One full pass of the pattern. Returns `false` when cancelled.
fn run_pass(
    torch: &SharedTorch,
    audio: &mut dyn AudioCue,
    pacer: &mut dyn Pacer,
    faults: &mut FaultReport,
) -> bool {
    let gap = Duration::from_millis(SOS_GAP_MS);

    for symbol in SOS_PATTERN.iter() {
        if pacer.is_cancelled() {
            return false;
        }

        if symbol.torch_on {
            if let Err(e) = play_beep(audio) {
                faults.report(e);
            }
            if let Err(e) = torch::lock(torch).set(TorchState::On) {
                faults.report(e);
            }
        }

        if !pacer.wait(Duration::from_millis(symbol.duration_ms)) {
            return false;
        }

        if symbol.torch_on {
            if let Err(e) = torch::lock(torch).set(TorchState::Off) {
                faults.report(e);
            }
        }

        if !pacer.wait(gap) {
            return false;
        }
    }
    true
}

// ---------------------------------------------------------------------------
// Sequencer
// ---------------------------------------------------------------------------

pub type SharedAudio = Arc<Mutex<Box<dyn AudioCue>>>;

fn lock_audio(audio: &SharedAudio) -> MutexGuard<'_, Box<dyn AudioCue>> {
    audio.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

struct Session {
    stop: Sender<()>,
    handle: JoinHandle<()>,
}

pub struct SosSequencer {
    torch: SharedTorch,
    audio: SharedAudio,
    notices: Sender<Notice>,
    session: Option<Session>,
}

impl SosSequencer {
    pub fn new(torch: SharedTorch, audio: Box<dyn AudioCue>, notices: Sender<Notice>) -> Self {
        Self {
            torch,
            audio: Arc::new(Mutex::new(audio)),
            notices,
            session: None,
        }
    }

    pub fn state(&self) -> SosRunState {
        if self.session.is_some() {
            SosRunState::Running
        } else {
            SosRunState::Idle
        }
    }

    /// Begin a session. Starting while one is running does nothing.
    pub fn start(&mut self) -> anyhow::Result<SosRunState> {
        if self.session.is_some() {
            log::debug!("SOS already running");
            return Ok(SosRunState::Running);
        }

        let (stop, stop_rx) = mpsc::channel();
        let torch = Arc::clone(&self.torch);
        let audio = Arc::clone(&self.audio);
        let mut faults = FaultReport::new(self.notices.clone());

        let handle = thread::Builder::new()
            .name("sos".into())
            .stack_size(STACK_SOS)
            .spawn(move || {
                let mut pacer = StopSignal::new(stop_rx);
                let mut audio = lock_audio(&audio);
                run_session(&torch, &mut **audio, &mut pacer, &mut faults);
            })?;

        self.session = Some(Session { stop, handle });
        log::info!("SOS started");
        Ok(SosRunState::Running)
    }

    /// End the session: cancel the pending wait, silence and rewind the cue,
    /// and leave the torch off. Safe to call while idle.
    pub fn stop(&mut self) -> SosRunState {
        if let Some(Session { stop, handle }) = self.session.take() {
            drop(stop);
            if handle.join().is_err() {
                log::error!("SOS session thread panicked");
            }
            log::info!("SOS stopped");
        }

        {
            let mut audio = lock_audio(&self.audio);
            if let Err(e) = audio.stop() {
                log::warn!("Failed to stop SOS beep: {}", e);
            }
            if let Err(e) = audio.reset() {
                log::warn!("Failed to rewind SOS beep: {}", e);
            }
        }

        if let Err(e) = torch::lock(&self.torch).set(TorchState::Off) {
            log::error!("Failed to turn torch off after SOS: {}", e);
        }

        SosRunState::Idle
    }

    pub fn toggle(&mut self) -> anyhow::Result<SosRunState> {
        match self.state() {
            SosRunState::Idle => self.start(),
            SosRunState::Running => Ok(self.stop()),
        }
    }
}

impl Drop for SosSequencer {
    fn drop(&mut self) {
        if self.session.is_some() {
            self.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::Instant;

    use crate::error::Peripheral;
    use crate::gateway::Torch;
    use crate::torch::TorchLine;

    // ---- virtual time ------------------------------------------------------

    #[derive(Clone, Default)]
    struct Clock(Arc<AtomicU64>);

    impl Clock {
        fn now(&self) -> u64 {
            self.0.load(Ordering::SeqCst)
        }
    }

    struct VirtualPacer {
        clock: Clock,
        cancel_at: u64,
    }

    impl Pacer for VirtualPacer {
        fn wait(&mut self, duration: Duration) -> bool {
            let now = self.clock.now();
            let until = now + duration.as_millis() as u64;
            if self.cancel_at < until {
                self.clock.0.store(self.cancel_at.max(now), Ordering::SeqCst);
                return false;
            }
            self.clock.0.store(until, Ordering::SeqCst);
            true
        }

        fn is_cancelled(&mut self) -> bool {
            self.clock.now() >= self.cancel_at
        }
    }

    // ---- recording peripherals ---------------------------------------------

    type Timeline = Arc<Mutex<Vec<(u64, bool)>>>;

    struct RecordingTorch {
        clock: Clock,
        timeline: Timeline,
        fail: bool,
    }

    impl Torch for RecordingTorch {
        fn set(&mut self, on: bool) -> Result<(), HardwareError> {
            self.timeline.lock().unwrap().push((self.clock.now(), on));
            if self.fail {
                return Err(HardwareError::command_failed(Peripheral::Torch, "flash busy"));
            }
            Ok(())
        }

        fn is_supported(&self) -> bool {
            true
        }
    }

    #[derive(Default)]
    struct RecordingCue {
        clock: Clock,
        plays: Arc<Mutex<Vec<u64>>>,
        calls: Arc<Mutex<Vec<&'static str>>>,
        fail_play: bool,
    }

    impl AudioCue for RecordingCue {
        fn is_playing(&self) -> bool {
            false
        }

        fn play(&mut self) -> Result<(), HardwareError> {
            self.plays.lock().unwrap().push(self.clock.now());
            self.calls.lock().unwrap().push("play");
            if self.fail_play {
                return Err(HardwareError::command_failed(Peripheral::Audio, "amp fault"));
            }
            Ok(())
        }

        fn stop(&mut self) -> Result<(), HardwareError> {
            self.calls.lock().unwrap().push("stop");
            Ok(())
        }

        fn reset(&mut self) -> Result<(), HardwareError> {
            self.calls.lock().unwrap().push("reset");
            Ok(())
        }
    }

    fn rig(fail: bool) -> (Clock, SharedTorch, Timeline, RecordingCue) {
        let clock = Clock::default();
        let timeline = Timeline::default();
        let torch = TorchLine::shared(Box::new(RecordingTorch {
            clock: clock.clone(),
            timeline: timeline.clone(),
            fail,
        }));
        let cue = RecordingCue {
            clock: clock.clone(),
            ..Default::default()
        };
        (clock, torch, timeline, cue)
    }

    fn run_until(cancel_at: u64, fail: bool) -> (Timeline, RecordingCue, Vec<Notice>) {
        let (clock, torch, timeline, mut cue) = rig(fail);
        let (tx, rx) = mpsc::channel();
        let mut faults = FaultReport::new(tx);
        let mut pacer = VirtualPacer { clock, cancel_at };
        run_session(&torch, &mut cue, &mut pacer, &mut faults);
        drop(faults);
        (timeline, cue, rx.iter().collect())
    }

    #[test]
    fn pattern_is_eleven_lit_symbols() {
        let durations: Vec<u64> = SOS_PATTERN.iter().map(|s| s.duration_ms).collect();
        assert_eq!(durations, vec![200, 200, 200, 400, 600, 600, 600, 400, 200, 200, 200]);
        assert!(SOS_PATTERN.iter().all(|s| s.torch_on));
        assert_eq!(pattern_duration(), Duration::from_millis(6000));
    }

    #[test]
    fn one_pass_follows_the_timing_table() {
        let pass_ms = pattern_duration().as_millis() as u64;
        // Cancel in the middle of the repeat pause.
        let (timeline, cue, notices) = run_until(pass_ms + 1000, false);
        let timeline = timeline.lock().unwrap().clone();

        let ons: Vec<u64> = timeline.iter().filter(|(_, on)| *on).map(|(t, _)| *t).collect();
        assert_eq!(ons, vec![0, 400, 800, 1200, 1800, 2600, 3400, 4200, 4800, 5200, 5600]);

        let lit: Vec<u64> = timeline.chunks(2).map(|pair| pair[1].0 - pair[0].0).collect();
        assert_eq!(lit, vec![200, 200, 200, 400, 600, 600, 600, 400, 200, 200, 200]);
        assert!(timeline.chunks(2).all(|pair| pair[0].1 && !pair[1].1));

        // A beep accompanies every lit symbol.
        assert_eq!(*cue.plays.lock().unwrap(), ons);
        assert!(notices.is_empty());
    }

    #[test]
    fn audio_faults_leave_the_light_pattern_intact() {
        let (clock, torch, timeline, mut cue) = rig(false);
        cue.fail_play = true;
        let (tx, rx) = mpsc::channel();
        let mut faults = FaultReport::new(tx);
        let pass_ms = pattern_duration().as_millis() as u64;
        let mut pacer = VirtualPacer {
            clock,
            cancel_at: pass_ms + 10,
        };

        run_session(&torch, &mut cue, &mut pacer, &mut faults);
        drop(faults);

        let timeline = timeline.lock().unwrap().clone();
        assert_eq!(timeline.len(), 22);
        let ons: Vec<u64> = timeline.iter().filter(|(_, on)| *on).map(|(t, _)| *t).collect();
        assert_eq!(ons, vec![0, 400, 800, 1200, 1800, 2600, 3400, 4200, 4800, 5200, 5600]);
        let lit: Vec<u64> = timeline.chunks(2).map(|pair| pair[1].0 - pair[0].0).collect();
        assert_eq!(lit, vec![200, 200, 200, 400, 600, 600, 600, 400, 200, 200, 200]);

        // Every beep was still attempted.
        assert_eq!(*cue.plays.lock().unwrap(), ons);

        let notices: Vec<Notice> = rx.iter().collect();
        assert_eq!(notices.len(), 1);
        assert!(matches!(
            &notices[0],
            Notice::SosDegraded(HardwareError::CommandFailed {
                peripheral: Peripheral::Audio,
                ..
            })
        ));
    }

    #[test]
    fn pattern_repeats_after_pause() {
        let pass_ms = pattern_duration().as_millis() as u64;
        let second = pass_ms + SOS_REPEAT_PAUSE_MS;
        let (timeline, _cue, _) = run_until(second + 100, false);
        let timeline = timeline.lock().unwrap().clone();

        assert_eq!(timeline.len(), 23);
        assert_eq!(timeline[22], (9000, true));
        assert_eq!(second, 9000);
        // Nothing happens during the repeat pause.
        assert!(timeline.iter().all(|(t, _)| *t <= pass_ms - SOS_GAP_MS || *t >= second));
    }

    #[test]
    fn cancel_mid_symbol_stops_all_activity() {
        let (timeline, cue, _) = run_until(150, false);
        assert_eq!(*timeline.lock().unwrap(), vec![(0, true)]);
        assert_eq!(*cue.plays.lock().unwrap(), vec![0]);
    }

    #[test]
    fn faults_are_reported_once_and_loop_continues() {
        let pass_ms = pattern_duration().as_millis() as u64;
        let (timeline, cue, notices) = run_until(pass_ms + 10, true);

        assert_eq!(timeline.lock().unwrap().len(), 22);
        assert_eq!(cue.plays.lock().unwrap().len(), 11);
        assert_eq!(notices.len(), 1);
        assert!(matches!(notices[0], Notice::SosDegraded(_)));
    }

    #[test]
    fn stop_signal_observes_dropped_sender() {
        let (tx, rx) = mpsc::channel::<()>();
        let mut pacer = StopSignal::new(rx);
        assert!(!pacer.is_cancelled());
        assert!(pacer.wait(Duration::from_millis(1)));
        drop(tx);
        assert!(pacer.is_cancelled());
        assert!(!pacer.wait(Duration::from_secs(10)));
        assert!(pacer.is_cancelled());
    }

    // ---- real threads --------------------------------------------------------

    fn sequencer() -> (SosSequencer, Timeline, Arc<Mutex<Vec<&'static str>>>, Receiver<Notice>) {
        let (_clock, torch, timeline, cue) = rig(false);
        let calls = cue.calls.clone();
        let (tx, rx) = mpsc::channel();
        (SosSequencer::new(torch, Box::new(cue), tx), timeline, calls, rx)
    }

    #[test]
    fn stop_turns_torch_off_promptly() {
        let (mut sos, timeline, calls, _rx) = sequencer();

        assert_eq!(sos.start().unwrap(), SosRunState::Running);
        thread::sleep(Duration::from_millis(100));

        let began = Instant::now();
        assert_eq!(sos.stop(), SosRunState::Idle);
        assert!(began.elapsed() < Duration::from_millis(600));

        assert_eq!(sos.state(), SosRunState::Idle);
        assert_eq!(torch::lock(&sos.torch).state(), TorchState::Off);
        assert_eq!(timeline.lock().unwrap().last().map(|(_, on)| *on), Some(false));

        let calls_now = calls.lock().unwrap().clone();
        assert_eq!(&calls_now[calls_now.len() - 2..], &["stop", "reset"]);

        // No delayed side effects after stop.
        let commands = timeline.lock().unwrap().len();
        thread::sleep(Duration::from_millis(400));
        assert_eq!(timeline.lock().unwrap().len(), commands);
    }

    #[test]
    fn start_while_running_is_a_no_op() {
        let (mut sos, timeline, _calls, _rx) = sequencer();

        sos.start().unwrap();
        thread::sleep(Duration::from_millis(50));
        sos.start().unwrap();
        thread::sleep(Duration::from_millis(50));
        sos.stop();

        // Only one session drove the torch: a single on, then the final off.
        let ons = timeline.lock().unwrap().iter().filter(|(_, on)| *on).count();
        assert_eq!(ons, 1);
    }

    #[test]
    fn toggle_alternates_sessions() {
        let (mut sos, _timeline, _calls, _rx) = sequencer();
        assert_eq!(sos.toggle().unwrap(), SosRunState::Running);
        assert_eq!(sos.toggle().unwrap(), SosRunState::Idle);
        assert_eq!(sos.toggle().unwrap(), SosRunState::Running);
        drop(sos);
    }

    #[test]
    fn stop_while_idle_still_forces_torch_off() {
        let (mut sos, timeline, _calls, _rx) = sequencer();
        torch::lock(&sos.torch).set(TorchState::On).unwrap();
        assert_eq!(sos.stop(), SosRunState::Idle);
        assert_eq!(torch::lock(&sos.torch).state(), TorchState::Off);
        assert_eq!(*timeline.lock().unwrap().last().unwrap(), (0, false));
    }
}
