//! Voice capture and playback
//!
//! The recorder is an explicit state machine over injected audio device
//! traits; `device` holds the cpal-backed implementations.

mod device;
mod recorder;

pub use device::{Microphone, Speaker, SpeakerSink};
pub(crate) use device::{decode_mp3, play_samples_blocking};
pub use recorder::{AudioInput, AudioOutput, RecorderState, RecordingSnapshot, VoiceRecorder};

use std::io::Cursor;
use std::sync::Arc;

use async_trait::async_trait;

use crate::{Error, Result};

/// Sample rate for microphone capture (16kHz for speech)
pub const SAMPLE_RATE: u32 = 16000;

/// Plays a finalized recording artifact
///
/// Injected into the tutor session so user messages can be replayed without
/// the session owning an audio device directly.
#[async_trait]
pub trait AudioSink: Send + Sync {
    /// Play WAV bytes to completion
    ///
    /// # Errors
    ///
    /// Returns error if decoding or playback fails
    async fn play_wav(&self, wav: Arc<Vec<u8>>) -> Result<()>;
}

/// Convert f32 samples to WAV bytes for STT APIs and artifact storage
///
/// # Errors
///
/// Returns error if WAV encoding fails
pub fn samples_to_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer =
            hound::WavWriter::new(&mut cursor, spec).map_err(|e| Error::Audio(e.to_string()))?;

        for &sample in samples {
            // Convert f32 [-1.0, 1.0] to i16
            #[allow(clippy::cast_possible_truncation)]
            let sample_i16 = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
            writer
                .write_sample(sample_i16)
                .map_err(|e| Error::Audio(e.to_string()))?;
        }

        writer.finalize().map_err(|e| Error::Audio(e.to_string()))?;
    }

    Ok(cursor.into_inner())
}

/// Decode WAV bytes back to f32 samples for playback
///
/// Returns the samples and their sample rate.
///
/// # Errors
///
/// Returns error if the bytes are not valid 16-bit PCM WAV
pub fn wav_to_samples(wav: &[u8]) -> Result<(Vec<f32>, u32)> {
    let reader = hound::WavReader::new(Cursor::new(wav)).map_err(|e| Error::Audio(e.to_string()))?;
    let spec = reader.spec();

    if spec.sample_format != hound::SampleFormat::Int || spec.bits_per_sample != 16 {
        return Err(Error::Audio(format!(
            "unsupported WAV format: {:?} {} bit",
            spec.sample_format, spec.bits_per_sample
        )));
    }

    let samples = reader
        .into_samples::<i16>()
        .map(|s| s.map(|v| f32::from(v) / 32768.0))
        .collect::<std::result::Result<Vec<f32>, _>>()
        .map_err(|e| Error::Audio(e.to_string()))?;

    Ok((samples, spec.sample_rate))
}
