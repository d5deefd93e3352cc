use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use genie_gateway::api::ApiServer;
use genie_gateway::speech::{SpeechToText, TextToSpeech};
use genie_gateway::tutor::{HttpTutorBackend, Role, TutorSession, TutorSettings};
use genie_gateway::voice::{
    AudioInput, AudioOutput, Microphone, Speaker, SpeakerSink, VoiceRecorder, SAMPLE_RATE,
};
use genie_gateway::{languages, Config};

/// Genie - Voice tutoring gateway for children practicing English
#[derive(Parser)]
#[command(name = "genie", version, about)]
struct Cli {
    /// Port to listen on
    #[arg(long, env = "GENIE_PORT")]
    port: Option<u16>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Disable voice features (for headless servers without audio hardware)
    #[arg(long, env = "GENIE_DISABLE_VOICE")]
    disable_voice: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive voice practice session against a local gateway
    Practice,
    /// Test microphone input
    TestMic {
        /// Duration in seconds
        #[arg(short, long, default_value = "5")]
        duration: u64,
    },
    /// Test speaker output
    TestSpeaker,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,genie_gateway=info",
        1 => "info,genie_gateway=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

#[allow(clippy::future_not_send)]
async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load_with_options(cli.disable_voice)?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    match cli.command {
        Some(Command::Practice) => practice(config).await,
        Some(Command::TestMic { duration }) => test_mic(duration).await,
        Some(Command::TestSpeaker) => test_speaker().await,
        None => {
            tracing::info!(port = config.server.port, "starting genie gateway");
            ApiServer::new(&config).run().await?;
            Ok(())
        }
    }
}

/// Run an interactive practice session: record a turn, run the pipeline,
/// print the conversation
#[allow(clippy::future_not_send)]
async fn practice(config: Config) -> anyhow::Result<()> {
    let port = config.server.port;
    let _server = ApiServer::new(&config).spawn();
    tokio::time::sleep(Duration::from_millis(200)).await;

    let backend = Arc::new(HttpTutorBackend::new(format!("http://127.0.0.1:{port}")));
    let stt = SpeechToText::negotiate(&config);
    let tts = TextToSpeech::negotiate(&config);
    let mut session =
        TutorSession::new(backend, stt, tts, TutorSettings::default()).with_sink(Arc::new(SpeakerSink));

    let native = languages::by_code_or_english(&config.tutor.native_language);
    session.update_settings(native, config.tutor.native_help);

    let mut recorder = VoiceRecorder::new(
        Box::new(Microphone::open()?),
        Box::new(Speaker::open(SAMPLE_RATE)?),
    );

    if let Some(greeting) = session.messages().first() {
        println!("genie: {}", greeting.text);
    }
    println!("\nPress Enter to start recording, Enter again to stop, 'q' to quit.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim() == "q" {
            break;
        }

        if recorder.snapshot().is_recording {
            recorder.stop()?;
            let Some(artifact) = recorder.take_artifact() else {
                continue;
            };
            println!("(thinking...)");
            if let Err(e) = session.send_audio(artifact).await {
                println!("({e})");
                continue;
            }
            print_last_turn(&session);
            println!("\nPress Enter to record another turn, 'q' to quit.");
        } else {
            match recorder.start() {
                Ok(()) => println!("(recording - press Enter to stop)"),
                Err(e) => println!("({e})"),
            }
        }
    }

    session.stop_speaking();
    Ok(())
}

/// Print the newest user/assistant exchange
fn print_last_turn(session: &TutorSession) {
    let messages = session.messages();
    let start = messages.len().saturating_sub(2);
    for message in &messages[start..] {
        match message.role {
            Role::User => println!("you:   {}", message.text),
            Role::Assistant => {
                println!("genie: {}", message.text);
                if let Some(translation) = &message.translation {
                    println!("       ({translation})");
                }
            }
        }
    }
}

/// Test microphone input
#[allow(clippy::future_not_send)]
async fn test_mic(duration: u64) -> anyhow::Result<()> {
    println!("Testing microphone for {duration} seconds...");
    println!("Speak into your microphone!\n");

    let buffer = Arc::new(Mutex::new(Vec::new()));
    let mut mic = Microphone::open()?;
    mic.start(Arc::clone(&buffer))?;

    println!("Sample rate: {SAMPLE_RATE} Hz");
    println!("---");

    for i in 0..duration {
        tokio::time::sleep(Duration::from_secs(1)).await;

        let samples: Vec<f32> = buffer.lock().map(|mut buf| std::mem::take(&mut *buf)).unwrap_or_default();
        let energy = calculate_rms(&samples);
        let peak = samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max);

        // Visual meter
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let meter_len = (energy * 100.0).min(50.0) as usize;
        let meter: String = "█".repeat(meter_len) + &" ".repeat(50 - meter_len);

        println!(
            "[{:2}s] RMS: {:.4} | Peak: {:.4} | [{}]",
            i + 1,
            energy,
            peak,
            meter
        );
    }

    mic.stop();

    println!("\n---");
    println!("If you saw movement in the meter, your mic is working!");
    Ok(())
}

/// Calculate RMS energy
#[allow(clippy::cast_precision_loss)]
fn calculate_rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}

/// Test speaker output with a sine wave
#[allow(clippy::future_not_send)]
async fn test_speaker() -> anyhow::Result<()> {
    println!("Testing speaker output...");
    println!("You should hear a 440Hz tone for 2 seconds\n");

    let mut speaker = Speaker::open(SAMPLE_RATE)?;

    let frequency = 440.0_f32;
    let duration_secs = 2.0_f32;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let num_samples = (SAMPLE_RATE as f32 * duration_secs) as usize;

    #[allow(clippy::cast_precision_loss)]
    let samples: Vec<f32> = (0..num_samples)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            (2.0 * std::f32::consts::PI * frequency * t).sin() * 0.3 // 30% volume
        })
        .collect();

    println!("Playing {} samples at {SAMPLE_RATE} Hz...", samples.len());
    speaker.start(samples)?;

    let deadline = tokio::time::Instant::now() + Duration::from_secs(3);
    while !speaker.is_finished() && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    speaker.stop();

    println!("\n---");
    println!("If you heard the tone, your speakers are working!");
    Ok(())
}
