//! Voice recorder state machine
//!
//! Replaces scattered capture callbacks with a command-driven state machine:
//! Idle -> Recording -> Stopped (artifact held) -> Playing -> Stopped, with
//! clear() returning to Idle from anywhere. The microphone is held only
//! between start and stop/clear and is released on every exit path.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::{Error, Result};

use super::{samples_to_wav, wav_to_samples, SAMPLE_RATE};

/// Microphone capture device
///
/// Implementations append captured f32 samples into the shared sink buffer
/// until stopped. Not `Send`: cpal streams are thread-bound, and the
/// recorder lives on the UI thread.
pub trait AudioInput {
    /// Begin capturing into `sink`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Permission`] if the microphone cannot be acquired
    fn start(&mut self, sink: Arc<Mutex<Vec<f32>>>) -> Result<()>;

    /// Stop capturing and release the device
    fn stop(&mut self);
}

/// Speaker playback device for recorded artifacts
pub trait AudioOutput {
    /// Begin playing the given samples
    ///
    /// # Errors
    ///
    /// Returns [`Error::Playback`] if the output device fails
    fn start(&mut self, samples: Vec<f32>) -> Result<()>;

    /// Cancel playback and release the device
    fn stop(&mut self);

    /// Whether the last started playback ran to its natural end
    fn is_finished(&self) -> bool;
}

/// Recorder lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    /// No artifact held
    Idle,
    /// Microphone held, samples accumulating
    Recording,
    /// Artifact finalized and playable
    Stopped,
    /// Artifact rendering to the speaker
    Playing,
}

/// Point-in-time view of the recorder for UI rendering
#[derive(Debug, Clone)]
pub struct RecordingSnapshot {
    pub is_recording: bool,
    pub is_playing: bool,
    pub has_artifact: bool,
    pub duration: Duration,
    pub error: Option<String>,
}

/// Command-driven voice recorder
pub struct VoiceRecorder {
    input: Box<dyn AudioInput>,
    output: Box<dyn AudioOutput>,
    state: RecorderState,
    buffer: Arc<Mutex<Vec<f32>>>,
    started_at: Option<Instant>,
    elapsed: Duration,
    artifact: Option<Vec<u8>>,
    last_error: Option<String>,
}

impl VoiceRecorder {
    /// Create a recorder over the given devices
    #[must_use]
    pub fn new(input: Box<dyn AudioInput>, output: Box<dyn AudioOutput>) -> Self {
        Self {
            input,
            output,
            state: RecorderState::Idle,
            buffer: Arc::new(Mutex::new(Vec::new())),
            started_at: None,
            elapsed: Duration::ZERO,
            artifact: None,
            last_error: None,
        }
    }

    /// Start a new recording
    ///
    /// Ignored while already recording. Any previous artifact is discarded
    /// and the duration resets to zero.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Permission`] if the microphone cannot be acquired;
    /// the state is unchanged and the message is surfaced via the snapshot.
    pub fn start(&mut self) -> Result<()> {
        if self.state == RecorderState::Recording {
            return Ok(());
        }

        self.output.stop();
        if self.state == RecorderState::Playing {
            self.state = RecorderState::Stopped;
        }
        self.last_error = None;
        if let Ok(mut buf) = self.buffer.lock() {
            buf.clear();
        }

        // The previous artifact is only discarded once the microphone is
        // actually granted
        if let Err(e) = self.input.start(Arc::clone(&self.buffer)) {
            tracing::warn!(error = %e, "microphone acquisition failed");
            self.last_error = Some("Failed to access microphone. Please check permissions.".to_string());
            return Err(e);
        }

        self.artifact = None;
        self.elapsed = Duration::ZERO;
        self.started_at = Some(Instant::now());
        self.state = RecorderState::Recording;
        tracing::debug!("recording started");
        Ok(())
    }

    /// Finalize the current recording into a playable artifact
    ///
    /// No-op unless recording.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Audio`] if the captured samples cannot be encoded;
    /// the microphone is released regardless.
    pub fn stop(&mut self) -> Result<()> {
        if self.state != RecorderState::Recording {
            return Ok(());
        }

        self.input.stop();
        self.elapsed = self.started_at.take().map_or(Duration::ZERO, |t| t.elapsed());

        let samples = self
            .buffer
            .lock()
            .map(|mut buf| std::mem::take(&mut *buf))
            .unwrap_or_default();

        match samples_to_wav(&samples, SAMPLE_RATE) {
            Ok(wav) => {
                tracing::debug!(samples = samples.len(), bytes = wav.len(), "recording finalized");
                self.artifact = Some(wav);
                self.state = RecorderState::Stopped;
                Ok(())
            }
            Err(e) => {
                self.state = RecorderState::Idle;
                self.last_error = Some("Failed to save recording.".to_string());
                Err(e)
            }
        }
    }

    /// Play the held artifact from the beginning
    ///
    /// No-op without an artifact or while recording. Restarts playback if
    /// already playing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Playback`] if the speaker fails; the recorder
    /// returns to the stopped state.
    pub fn play(&mut self) -> Result<()> {
        self.refresh();
        if self.state == RecorderState::Recording || self.state == RecorderState::Idle {
            return Ok(());
        }
        let Some(wav) = &self.artifact else {
            return Ok(());
        };

        if self.state == RecorderState::Playing {
            self.output.stop();
            self.state = RecorderState::Stopped;
        }

        let (samples, _rate) = wav_to_samples(wav).map_err(|e| Error::Playback(e.to_string()))?;
        if let Err(e) = self.output.start(samples) {
            self.last_error = Some("Failed to play audio".to_string());
            self.state = RecorderState::Stopped;
            return Err(Error::Playback(e.to_string()));
        }

        self.state = RecorderState::Playing;
        Ok(())
    }

    /// Cancel playback, keeping the artifact
    pub fn pause(&mut self) {
        if self.state == RecorderState::Playing {
            self.output.stop();
            self.state = RecorderState::Stopped;
        }
    }

    /// Release the artifact and all devices, returning to idle
    pub fn clear(&mut self) {
        self.input.stop();
        self.output.stop();
        if let Ok(mut buf) = self.buffer.lock() {
            buf.clear();
        }
        self.artifact = None;
        self.started_at = None;
        self.elapsed = Duration::ZERO;
        self.last_error = None;
        self.state = RecorderState::Idle;
    }

    /// Current state, folding in finished playback
    pub fn state(&mut self) -> RecorderState {
        self.refresh();
        self.state
    }

    /// Elapsed recording time
    ///
    /// Ticks while recording, frozen after stop, zero when idle.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.started_at.map_or(self.elapsed, |t| t.elapsed())
    }

    /// The finalized artifact, if any
    #[must_use]
    pub fn artifact(&self) -> Option<&[u8]> {
        self.artifact.as_deref()
    }

    /// Take the finalized artifact out of the recorder for a pipeline turn
    pub fn take_artifact(&mut self) -> Option<Vec<u8>> {
        let artifact = self.artifact.take();
        if artifact.is_some() {
            self.output.stop();
            self.state = RecorderState::Idle;
        }
        artifact
    }

    /// Point-in-time view for the UI
    pub fn snapshot(&mut self) -> RecordingSnapshot {
        self.refresh();
        RecordingSnapshot {
            is_recording: self.state == RecorderState::Recording,
            is_playing: self.state == RecorderState::Playing,
            has_artifact: self.artifact.is_some(),
            duration: self.duration(),
            error: self.last_error.clone(),
        }
    }

    /// Fold a naturally finished playback back into the stopped state
    fn refresh(&mut self) {
        if self.state == RecorderState::Playing && self.output.is_finished() {
            self.output.stop();
            self.state = RecorderState::Stopped;
        }
    }
}

impl Drop for VoiceRecorder {
    fn drop(&mut self) {
        self.input.stop();
        self.output.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubInput {
        active: bool,
        deny: bool,
        samples: Vec<f32>,
    }

    impl StubInput {
        fn granted() -> Self {
            Self { active: false, deny: false, samples: vec![0.25; 320] }
        }

        fn denied() -> Self {
            Self { active: false, deny: true, samples: Vec::new() }
        }
    }

    impl AudioInput for StubInput {
        fn start(&mut self, sink: Arc<Mutex<Vec<f32>>>) -> Result<()> {
            if self.deny {
                return Err(Error::Permission("denied".to_string()));
            }
            self.active = true;
            sink.lock().unwrap().extend_from_slice(&self.samples);
            Ok(())
        }

        fn stop(&mut self) {
            self.active = false;
        }
    }

    #[derive(Default)]
    struct StubOutput {
        playing: bool,
        finished: Arc<std::sync::atomic::AtomicBool>,
    }

    impl StubOutput {
        fn finished_flag(&self) -> Arc<std::sync::atomic::AtomicBool> {
            Arc::clone(&self.finished)
        }
    }

    impl AudioOutput for StubOutput {
        fn start(&mut self, _samples: Vec<f32>) -> Result<()> {
            self.playing = true;
            self.finished.store(false, std::sync::atomic::Ordering::SeqCst);
            Ok(())
        }

        fn stop(&mut self) {
            self.playing = false;
        }

        fn is_finished(&self) -> bool {
            self.finished.load(std::sync::atomic::Ordering::SeqCst)
        }
    }

    fn recorder() -> VoiceRecorder {
        VoiceRecorder::new(Box::new(StubInput::granted()), Box::new(StubOutput::default()))
    }

    #[test]
    fn start_while_recording_is_ignored() {
        let mut rec = recorder();
        rec.start().unwrap();
        assert_eq!(rec.state(), RecorderState::Recording);
        rec.start().unwrap();
        assert_eq!(rec.state(), RecorderState::Recording);
    }

    #[test]
    fn stop_on_idle_is_a_noop() {
        let mut rec = recorder();
        rec.stop().unwrap();
        assert_eq!(rec.state(), RecorderState::Idle);
        assert!(rec.artifact().is_none());
    }

    #[test]
    fn full_cycle_produces_artifact() {
        let mut rec = recorder();
        rec.start().unwrap();
        rec.stop().unwrap();
        assert_eq!(rec.state(), RecorderState::Stopped);
        assert!(rec.artifact().is_some());
    }

    #[test]
    fn denied_microphone_leaves_state_unchanged() {
        let mut rec =
            VoiceRecorder::new(Box::new(StubInput::denied()), Box::new(StubOutput::default()));
        let err = rec.start().unwrap_err();
        assert!(matches!(err, Error::Permission(_)));
        assert_eq!(rec.state(), RecorderState::Idle);
        assert!(rec.snapshot().error.is_some());
    }

    #[test]
    fn clear_releases_artifact_from_any_state() {
        let mut rec = recorder();
        rec.start().unwrap();
        rec.stop().unwrap();
        rec.play().unwrap();
        rec.clear();
        assert_eq!(rec.state(), RecorderState::Idle);
        assert!(rec.artifact().is_none());
        assert_eq!(rec.duration(), Duration::ZERO);
    }

    #[test]
    fn new_start_discards_previous_artifact() {
        let mut rec = recorder();
        rec.start().unwrap();
        rec.stop().unwrap();
        assert!(rec.artifact().is_some());
        rec.start().unwrap();
        assert!(rec.artifact().is_none());
        assert_eq!(rec.state(), RecorderState::Recording);
    }

    #[test]
    fn play_without_artifact_is_ignored() {
        let mut rec = recorder();
        rec.play().unwrap();
        assert_eq!(rec.state(), RecorderState::Idle);
    }

    #[test]
    fn finished_playback_returns_to_stopped() {
        let output = StubOutput::default();
        let finished = output.finished_flag();
        let mut rec = VoiceRecorder::new(Box::new(StubInput::granted()), Box::new(output));
        rec.start().unwrap();
        rec.stop().unwrap();
        rec.play().unwrap();
        assert_eq!(rec.state(), RecorderState::Playing);

        finished.store(true, std::sync::atomic::Ordering::SeqCst);
        assert_eq!(rec.state(), RecorderState::Stopped);
        assert!(rec.artifact().is_some());
    }

    #[test]
    fn playback_toggles_and_pauses() {
        let mut rec = recorder();
        rec.start().unwrap();
        rec.stop().unwrap();
        rec.play().unwrap();
        assert_eq!(rec.state(), RecorderState::Playing);
        rec.pause();
        assert_eq!(rec.state(), RecorderState::Stopped);
        assert!(rec.artifact().is_some());
    }
}
