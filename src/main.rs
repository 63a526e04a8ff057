use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use rolling_stats::Stats;
use serde::Serialize;

use vocals::audio;
use vocals::config::{Config, ReferencePitch};
use vocals::pitch;
use vocals::recorder::{RecordOptions, record_to_file};
use vocals::tone;
use vocals::wav::load_wav;

#[derive(Parser)]
#[command(name = "vocals", version, about = "Vocal recording and practice toolkit")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Record vocals to a WAV file
    Record {
        /// Output WAV filename
        outfile: PathBuf,

        /// Duration in seconds
        #[arg(short, long, default_value_t = 5.0)]
        duration: f32,

        /// Sample rate, overriding the configuration file
        #[arg(short = 'r', long)]
        rate: Option<u32>,

        /// Countdown in seconds before recording starts
        #[arg(short, long, default_value_t = 0)]
        countdown: u32,

        /// Play a metronome click at this tempo while recording
        #[arg(long)]
        bpm: Option<u32>,

        /// Print detected pitch range after recording
        #[arg(long)]
        show_range: bool,

        /// Play a reference note (e.g. A4, 440, 440hz) before recording
        #[arg(long)]
        reference: Option<ReferencePitch>,

        /// Record from the input device matching this name
        #[arg(long)]
        device: Option<String>,
    },

    /// Play a simple warmup scale
    Warmup {
        /// Starting frequency in Hz
        #[arg(long, default_value_t = 220.0)]
        start: f32,

        /// Number of semitone steps
        #[arg(long, default_value_t = 8)]
        steps: usize,

        /// Beep duration in seconds
        #[arg(long, default_value_t = 0.5)]
        duration: f32,

        /// Don't descend back to the start
        #[arg(long)]
        no_down: bool,
    },

    /// Analyze a WAV file: level statistics and pitch range
    Analyze {
        /// WAV file to analyze
        file: PathBuf,

        #[arg(short = 'f', long, value_enum, default_value = "text")]
        format: ReportFormat,
    },

    /// List audio input and output devices
    Devices,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    match cli.command {
        Command::Record {
            outfile,
            duration,
            rate,
            countdown,
            bpm,
            show_range,
            reference,
            device,
        } => {
            let mut audio_config = config.audio.clone();
            if let Some(rate) = rate {
                audio_config.sample_rate = rate;
            }

            println!("=== vocals - take recorder ===");
            println!("Sample rate: {} Hz", audio_config.sample_rate);
            println!("Channels: {}", audio_config.channels);
            println!("Duration: {}s", duration);
            if let Some(bpm) = bpm {
                println!("Metronome: {} bpm", bpm);
            }
            if let Some(ref reference) = reference {
                println!("Reference: {}", reference);
            }
            println!();

            let options = RecordOptions {
                duration,
                countdown,
                metronome_bpm: bpm,
                reference_freq: reference.map(|r| r.as_hz()),
                show_range,
                device,
            };
            record_to_file(&outfile, &options, &audio_config)?;
            println!("Saved {}", outfile.display());
        }

        Command::Warmup {
            start,
            steps,
            duration,
            no_down,
        } => {
            tone::play_warmup(start, steps, duration, !no_down, config.audio.sample_rate)?;
        }

        Command::Analyze { file, format } => analyze(&file, format)?,

        Command::Devices => {
            println!("Input devices:");
            for name in audio::list_input_devices()? {
                println!("  {}", name);
            }
            println!("Output devices:");
            for name in audio::list_output_devices()? {
                println!("  {}", name);
            }
        }
    }

    Ok(())
}

#[derive(Serialize)]
struct AnalysisReport {
    ts: String,
    file: String,
    sample_rate: u32,
    channels: u16,
    duration_secs: f32,
    peak: f32,
    rms: f32,
    pitch_low_hz: Option<f32>,
    pitch_high_hz: Option<f32>,
    pitch_low_note: Option<String>,
    pitch_high_note: Option<String>,
}

fn analyze(file: &Path, format: ReportFormat) -> anyhow::Result<()> {
    let (samples, spec) = load_wav(file)?;

    // Analysis runs on a mono signal: average interleaved channels.
    let mono: Vec<f32> = if spec.channels > 1 {
        samples
            .chunks(spec.channels as usize)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect()
    } else {
        samples
    };

    let mut levels: Stats<f32> = Stats::new();
    for &sample in &mono {
        levels.update(sample.abs());
    }
    let sum_sq: f64 = mono.iter().map(|&s| s as f64 * s as f64).sum();
    let rms = if mono.is_empty() {
        0.0
    } else {
        (sum_sq / mono.len() as f64).sqrt() as f32
    };

    let range = pitch::pitch_range(&mono, spec.sample_rate);

    let report = AnalysisReport {
        ts: Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
        file: file.display().to_string(),
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        duration_secs: mono.len() as f32 / spec.sample_rate as f32,
        peak: if levels.count > 0 { levels.max } else { 0.0 },
        rms,
        pitch_low_hz: range.map(|r| r.0),
        pitch_high_hz: range.map(|r| r.1),
        pitch_low_note: range.map(|r| pitch::freq_to_note(r.0)),
        pitch_high_note: range.map(|r| pitch::freq_to_note(r.1)),
    };

    match format {
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        ReportFormat::Text => {
            println!("File: {}", report.file);
            println!("  Sample rate: {} Hz", report.sample_rate);
            println!("  Channels: {}", report.channels);
            println!("  Duration: {:.2}s", report.duration_secs);
            println!("  Peak level: {:.3}", report.peak);
            println!("  RMS level: {:.3}", report.rms);
            match (report.pitch_low_hz, report.pitch_high_hz) {
                (Some(low), Some(high)) => println!(
                    "  Pitch range: {:.1} Hz - {:.1} Hz ({} - {})",
                    low,
                    high,
                    report.pitch_low_note.as_deref().unwrap_or("-"),
                    report.pitch_high_note.as_deref().unwrap_or("-"),
                ),
                _ => println!("  Pitch range: no voiced audio detected"),
            }
        }
    }

    Ok(())
}
