//! cpal-backed audio devices
//!
//! `Microphone` and `Speaker` implement the recorder's device traits;
//! `SpeakerSink` plays finalized artifacts for message replay. Streams are
//! thread-bound, so blocking playback helpers run on dedicated threads.

use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleRate, Stream, StreamConfig};

use crate::{Error, Result};

use super::{wav_to_samples, AudioInput, AudioOutput, AudioSink, SAMPLE_RATE};

/// Poll interval while waiting for blocking playback to drain
const DRAIN_POLL_MS: u64 = 50;

/// Microphone capture device
pub struct Microphone {
    config: StreamConfig,
    stream: Option<Stream>,
}

impl Microphone {
    /// Open the default input device at the capture sample rate
    ///
    /// # Errors
    ///
    /// Returns [`Error::Permission`] if no usable input device is available
    pub fn open() -> Result<Self> {
        let host = cpal::default_host();

        let device = host
            .default_input_device()
            .ok_or_else(|| Error::Permission("no input device available".to_string()))?;

        let supported_config = device
            .supported_input_configs()
            .map_err(|e| Error::Permission(e.to_string()))?
            .find(|c| {
                c.channels() == 1
                    && c.min_sample_rate() <= SampleRate(SAMPLE_RATE)
                    && c.max_sample_rate() >= SampleRate(SAMPLE_RATE)
            })
            .ok_or_else(|| Error::Permission("no suitable input config found".to_string()))?;

        let config = supported_config
            .with_sample_rate(SampleRate(SAMPLE_RATE))
            .config();

        tracing::debug!(
            device = device.name().unwrap_or_default(),
            sample_rate = SAMPLE_RATE,
            "microphone opened"
        );

        Ok(Self { config, stream: None })
    }
}

impl AudioInput for Microphone {
    fn start(&mut self, sink: Arc<Mutex<Vec<f32>>>) -> Result<()> {
        if self.stream.is_some() {
            return Ok(());
        }

        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| Error::Permission("no input device".to_string()))?;

        let stream = device
            .build_input_stream(
                &self.config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if let Ok(mut buf) = sink.lock() {
                        buf.extend_from_slice(data);
                    }
                },
                |err| {
                    tracing::error!(error = %err, "microphone capture error");
                },
                None,
            )
            .map_err(|e| Error::Permission(e.to_string()))?;

        stream.play().map_err(|e| Error::Permission(e.to_string()))?;
        self.stream = Some(stream);
        Ok(())
    }

    fn stop(&mut self) {
        if self.stream.take().is_some() {
            tracing::debug!("microphone released");
        }
    }
}

/// Speaker playback device
pub struct Speaker {
    config: StreamConfig,
    sample_rate: u32,
    stream: Option<Stream>,
    finished: Arc<AtomicBool>,
}

impl Speaker {
    /// Open the default output device at the given sample rate
    ///
    /// # Errors
    ///
    /// Returns [`Error::Audio`] if no usable output device is available
    pub fn open(sample_rate: u32) -> Result<Self> {
        let config = output_config(sample_rate)?;
        Ok(Self {
            config,
            sample_rate,
            stream: None,
            finished: Arc::new(AtomicBool::new(false)),
        })
    }
}

impl AudioOutput for Speaker {
    fn start(&mut self, samples: Vec<f32>) -> Result<()> {
        self.stop();
        self.finished.store(false, Ordering::SeqCst);

        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| Error::Audio("no output device".to_string()))?;

        let channels = self.config.channels as usize;
        let finished = Arc::clone(&self.finished);
        let mut position = 0usize;

        let stream = device
            .build_output_stream(
                &self.config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    for frame in data.chunks_mut(channels) {
                        let sample = if position < samples.len() {
                            let s = samples[position];
                            position += 1;
                            s
                        } else {
                            finished.store(true, Ordering::SeqCst);
                            0.0
                        };
                        for out in frame.iter_mut() {
                            *out = sample;
                        }
                    }
                },
                |err| {
                    tracing::error!(error = %err, "speaker playback error");
                },
                None,
            )
            .map_err(|e| Error::Audio(e.to_string()))?;

        stream.play().map_err(|e| Error::Audio(e.to_string()))?;
        tracing::debug!(sample_rate = self.sample_rate, "playback started");
        self.stream = Some(stream);
        Ok(())
    }

    fn stop(&mut self) {
        self.stream.take();
    }

    fn is_finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }
}

/// Plays recorded WAV artifacts on a blocking thread
pub struct SpeakerSink;

#[async_trait]
impl AudioSink for SpeakerSink {
    async fn play_wav(&self, wav: Arc<Vec<u8>>) -> Result<()> {
        let stop = Arc::new(AtomicBool::new(false));
        tokio::task::spawn_blocking(move || {
            let (samples, rate) = wav_to_samples(&wav)?;
            play_samples_blocking(&samples, rate, &stop)
        })
        .await
        .map_err(|e| Error::Playback(e.to_string()))?
    }
}

/// Find an output config at the requested rate, preferring mono
fn output_config(sample_rate: u32) -> Result<StreamConfig> {
    let host = cpal::default_host();

    let device = host
        .default_output_device()
        .ok_or_else(|| Error::Audio("no output device available".to_string()))?;

    let supported = device
        .supported_output_configs()
        .map_err(|e| Error::Audio(e.to_string()))?
        .find(|c| {
            c.channels() == 1
                && c.min_sample_rate() <= SampleRate(sample_rate)
                && c.max_sample_rate() >= SampleRate(sample_rate)
        })
        .or_else(|| {
            // Fallback: stereo
            device.supported_output_configs().ok()?.find(|c| {
                c.channels() == 2
                    && c.min_sample_rate() <= SampleRate(sample_rate)
                    && c.max_sample_rate() >= SampleRate(sample_rate)
            })
        })
        .ok_or_else(|| Error::Audio("no suitable output config found".to_string()))?;

    Ok(supported.with_sample_rate(SampleRate(sample_rate)).config())
}

/// Play samples to the default output device, blocking until the samples
/// drain, the stop flag is raised, or a generous timeout elapses
///
/// # Errors
///
/// Returns [`Error::Audio`] if the output device fails
pub(crate) fn play_samples_blocking(
    samples: &[f32],
    sample_rate: u32,
    stop: &AtomicBool,
) -> Result<()> {
    if samples.is_empty() {
        return Ok(());
    }

    let config = output_config(sample_rate)?;
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| Error::Audio("no output device".to_string()))?;

    let channels = config.channels as usize;
    let finished = Arc::new(AtomicBool::new(false));
    let finished_cb = Arc::clone(&finished);
    let owned: Vec<f32> = samples.to_vec();
    let mut position = 0usize;

    let stream = device
        .build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                for frame in data.chunks_mut(channels) {
                    let sample = if position < owned.len() {
                        let s = owned[position];
                        position += 1;
                        s
                    } else {
                        finished_cb.store(true, Ordering::SeqCst);
                        0.0
                    };
                    for out in frame.iter_mut() {
                        *out = sample;
                    }
                }
            },
            |err| {
                tracing::error!(error = %err, "audio playback error");
            },
            None,
        )
        .map_err(|e| Error::Audio(e.to_string()))?;

    stream.play().map_err(|e| Error::Audio(e.to_string()))?;

    let duration_ms = (samples.len() as u64 * 1000) / u64::from(sample_rate);
    let timeout = std::time::Duration::from_millis(duration_ms + 500);
    let started = std::time::Instant::now();

    while !finished.load(Ordering::SeqCst) && !stop.load(Ordering::SeqCst) {
        if started.elapsed() > timeout {
            break;
        }
        std::thread::sleep(std::time::Duration::from_millis(DRAIN_POLL_MS));
    }

    drop(stream);
    Ok(())
}

/// Decode MP3 bytes (remote TTS output) to mono f32 samples
///
/// Returns the samples and their sample rate.
///
/// # Errors
///
/// Returns [`Error::Audio`] on malformed MP3 data
pub(crate) fn decode_mp3(mp3_data: &[u8]) -> Result<(Vec<f32>, u32)> {
    let mut decoder = minimp3::Decoder::new(Cursor::new(mp3_data));
    let mut samples = Vec::new();
    let mut sample_rate = 0u32;

    loop {
        match decoder.next_frame() {
            Ok(frame) => {
                #[allow(clippy::cast_sign_loss)]
                {
                    sample_rate = frame.sample_rate as u32;
                }
                if frame.channels == 2 {
                    // Stereo: average channels
                    samples.extend(frame.data.chunks(2).map(|chunk| {
                        let left = f32::from(chunk[0]) / 32768.0;
                        let right = f32::from(chunk.get(1).copied().unwrap_or(chunk[0])) / 32768.0;
                        f32::midpoint(left, right)
                    }));
                } else {
                    samples.extend(frame.data.iter().map(|&s| f32::from(s) / 32768.0));
                }
            }
            Err(minimp3::Error::Eof) => break,
            Err(e) => return Err(Error::Audio(format!("MP3 decode error: {e}"))),
        }
    }

    if sample_rate == 0 {
        return Err(Error::Audio("empty MP3 stream".to_string()));
    }

    Ok((samples, sample_rate))
}
