//! Voice recorder integration tests
//!
//! Tests the recorder state machine through the public device traits,
//! without requiring audio hardware.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use genie_gateway::voice::{
    samples_to_wav, wav_to_samples, AudioInput, AudioOutput, RecorderState, VoiceRecorder,
    SAMPLE_RATE,
};
use genie_gateway::{Error, Result};

/// Generate sine wave audio samples
fn generate_sine_samples(frequency: f32, duration_secs: f32, amplitude: f32) -> Vec<f32> {
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let num_samples = (SAMPLE_RATE as f32 * duration_secs) as usize;
    (0..num_samples)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let t = i as f32 / SAMPLE_RATE as f32;
            amplitude * (2.0 * std::f32::consts::PI * frequency * t).sin()
        })
        .collect()
}

/// Input that fills the sink with a sine burst on start
struct SineInput {
    deny: bool,
}

impl AudioInput for SineInput {
    fn start(&mut self, sink: Arc<Mutex<Vec<f32>>>) -> Result<()> {
        if self.deny {
            return Err(Error::Permission(
                "Failed to access microphone. Please check permissions.".to_string(),
            ));
        }
        sink.lock()
            .unwrap()
            .extend(generate_sine_samples(440.0, 0.1, 0.5));
        Ok(())
    }

    fn stop(&mut self) {}
}

/// Output tracking playback through a shared finished flag
#[derive(Default)]
struct FlagOutput {
    finished: Arc<AtomicBool>,
    started: Arc<AtomicBool>,
}

impl AudioOutput for FlagOutput {
    fn start(&mut self, samples: Vec<f32>) -> Result<()> {
        assert!(!samples.is_empty(), "playback must receive the recorded samples");
        self.started.store(true, Ordering::SeqCst);
        self.finished.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&mut self) {}

    fn is_finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }
}

#[test]
fn wav_round_trip_preserves_audio_shape() {
    let samples = generate_sine_samples(440.0, 0.25, 0.5);
    let wav = samples_to_wav(&samples, SAMPLE_RATE).unwrap();
    let (decoded, rate) = wav_to_samples(&wav).unwrap();

    assert_eq!(rate, SAMPLE_RATE);
    assert_eq!(decoded.len(), samples.len());

    // Quantization to 16-bit keeps values close
    for (a, b) in samples.iter().zip(decoded.iter()) {
        assert!((a - b).abs() < 0.001, "sample drifted: {a} vs {b}");
    }
}

#[test]
fn recorded_artifact_is_valid_wav() {
    let mut recorder = VoiceRecorder::new(
        Box::new(SineInput { deny: false }),
        Box::new(FlagOutput::default()),
    );

    recorder.start().unwrap();
    recorder.stop().unwrap();

    let artifact = recorder.artifact().expect("artifact after stop");
    let (samples, rate) = wav_to_samples(artifact).unwrap();
    assert_eq!(rate, SAMPLE_RATE);
    assert!(!samples.is_empty());
}

#[test]
fn artifact_survives_playback_and_is_consumed_by_take() {
    let output = FlagOutput::default();
    let started = Arc::clone(&output.started);
    let finished = Arc::clone(&output.finished);
    let mut recorder = VoiceRecorder::new(Box::new(SineInput { deny: false }), Box::new(output));

    recorder.start().unwrap();
    recorder.stop().unwrap();

    recorder.play().unwrap();
    assert!(started.load(Ordering::SeqCst));
    assert_eq!(recorder.state(), RecorderState::Playing);

    finished.store(true, Ordering::SeqCst);
    assert_eq!(recorder.state(), RecorderState::Stopped);

    let artifact = recorder.take_artifact().expect("artifact still held");
    assert!(!artifact.is_empty());
    assert!(recorder.artifact().is_none());
    assert_eq!(recorder.state(), RecorderState::Idle);
}

#[test]
fn denied_microphone_surfaces_a_user_visible_message() {
    let mut recorder = VoiceRecorder::new(
        Box::new(SineInput { deny: true }),
        Box::new(FlagOutput::default()),
    );

    assert!(matches!(recorder.start(), Err(Error::Permission(_))));
    let snapshot = recorder.snapshot();
    assert!(!snapshot.is_recording);
    assert_eq!(
        snapshot.error.as_deref(),
        Some("Failed to access microphone. Please check permissions.")
    );
}

#[test]
fn duration_resets_on_start_and_freezes_on_stop() {
    let mut recorder = VoiceRecorder::new(
        Box::new(SineInput { deny: false }),
        Box::new(FlagOutput::default()),
    );

    recorder.start().unwrap();
    std::thread::sleep(Duration::from_millis(20));
    let while_recording = recorder.duration();
    assert!(while_recording >= Duration::from_millis(10));

    recorder.stop().unwrap();
    let frozen = recorder.duration();
    std::thread::sleep(Duration::from_millis(20));
    assert_eq!(recorder.duration(), frozen, "duration frozen after stop");

    recorder.start().unwrap();
    assert!(recorder.duration() < while_recording, "duration resets on start");
}
