//! chirp CLI: inspect, edit and play mono sounds headlessly.
//!
//! Usage:
//!   chirp info voice.wav
//!   chirp apply voice.wav -e higher -e echo --trim 0.1:0.8 -o out.wav
//!   chirp play voice.wav

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chirp_master::{
    EditSession, Effect, MemoryHost, OutputKind, PlaybackListener, SampleBuffer, SessionConfig,
    SoundId, TrimRange,
};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "chirp", version, about = "Mono sound editor")]
struct Cli {
    /// Log at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Session config file (TOML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print format details and a waveform overview.
    Info { input: PathBuf },

    /// Apply edits in order: effects, then trim, then reverse.
    Apply {
        input: PathBuf,

        /// Effect toggle: higher, lower, echo, robot, louder, softer.
        #[arg(short, long = "effect")]
        effects: Vec<Effect>,

        /// Keep only START:END, as fractions of the length.
        #[arg(long, value_parser = parse_trim)]
        trim: Option<TrimRange>,

        #[arg(long)]
        reverse: bool,

        #[arg(short, long)]
        output: PathBuf,
    },

    /// Play through the default output device.
    Play {
        input: PathBuf,

        #[arg(long, value_parser = parse_trim)]
        trim: Option<TrimRange>,
    },
}

fn parse_trim(s: &str) -> Result<TrimRange, String> {
    let (start, end) = s
        .split_once(':')
        .ok_or_else(|| format!("expected START:END, got '{s}'"))?;
    let parse = |v: &str| -> Result<f64, String> {
        let f: f64 = v.trim().parse().map_err(|e| format!("bad fraction '{v}': {e}"))?;
        if !(0.0..=1.0).contains(&f) {
            return Err(format!("fraction {f} outside 0..1"));
        }
        Ok(f)
    };
    Ok(TrimRange::new(parse(start)?, parse(end)?))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => SessionConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => SessionConfig::default(),
    };

    match cli.command {
        Command::Info { input } => print_info(&input, &config),
        Command::Apply {
            input,
            effects,
            trim,
            reverse,
            output,
        } => apply(&input, &effects, trim, reverse, &output, config),
        Command::Play { input, trim } => play(&input, trim, config),
    }
}

fn read_wav(path: &Path) -> Result<SampleBuffer> {
    let data = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    chirp_formats::load_wav(&data).with_context(|| format!("failed to decode {}", path.display()))
}

fn open_session(
    path: &Path,
    config: SessionConfig,
    listener: Arc<dyn PlaybackListener>,
) -> Result<(Arc<MemoryHost>, SoundId, EditSession)> {
    let buffer = read_wav(path)?;
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let host = Arc::new(MemoryHost::new());
    let id = host.add(&name, &path.display().to_string(), buffer);
    let session = EditSession::open(host.clone(), id, config, listener)?;
    Ok((host, id, session))
}

fn print_info(path: &Path, config: &SessionConfig) -> Result<()> {
    let buffer = read_wav(path)?;
    let peak = buffer.samples().iter().fold(0.0f32, |m, s| m.max(s.abs()));
    println!("File:        {}", path.display());
    println!("Sample rate: {} Hz", buffer.sample_rate());
    println!("Samples:     {}", buffer.len());
    println!("Duration:    {:.3} s", buffer.duration_secs());
    println!("Peak:        {:.3}", peak);

    let levels = chirp_ir::chunk_levels(buffer.samples(), config.rms_chunk_size);
    const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
    let overview: String = levels
        .iter()
        .map(|&l| BARS[((l * (BARS.len() - 1) as f32).round() as usize).min(BARS.len() - 1)])
        .collect();
    println!("Waveform:    {}", overview);
    Ok(())
}

fn apply(
    input: &Path,
    effects: &[Effect],
    trim: Option<TrimRange>,
    reverse: bool,
    output: &Path,
    config: SessionConfig,
) -> Result<()> {
    let config = SessionConfig {
        autoplay: false,
        output: OutputKind::Null,
        ..config
    };
    let (host, id, session) = open_session(input, config, Arc::new(chirp_master::SilentListener))?;
    info!(input = %input.display(), ?effects, ?trim, reverse, "applying edits");

    for &effect in effects {
        session.toggle_effect(effect)?;
        if !session.wait_for_render(Duration::from_secs(60)) {
            bail!("timed out rendering {effect}");
        }
        if let Some(e) = session.take_render_error() {
            return Err(e).with_context(|| format!("failed to apply {effect}"));
        }
    }
    if let Some(range) = trim {
        session.set_trim_start(range.start_or_zero());
        session.set_trim_end(range.end_or_one());
        session.enter_or_commit_trim()?;
    }
    if reverse {
        session.reverse()?;
    }

    let buffer = host.buffer(id).context("edited sound vanished from host")?;
    let mut file = std::io::BufWriter::new(
        std::fs::File::create(output)
            .with_context(|| format!("failed to create {}", output.display()))?,
    );
    chirp_formats::write_wav(&mut file, &buffer)?;
    file.flush()?;
    println!(
        "Wrote {} samples ({:.3} s) to {}",
        buffer.len(),
        buffer.duration_secs(),
        output.display()
    );
    Ok(())
}

/// Draws a progress bar on stdout.
struct ProgressBar;

impl PlaybackListener for ProgressBar {
    fn on_progress(&self, fraction: f64) {
        const WIDTH: usize = 40;
        let filled = (fraction * WIDTH as f64).round() as usize;
        print!(
            "\r[{}{}] {:3.0}%",
            "#".repeat(filled.min(WIDTH)),
            " ".repeat(WIDTH - filled.min(WIDTH)),
            fraction * 100.0
        );
        let _ = std::io::stdout().flush();
    }

    fn on_stopped(&self) {
        println!();
    }
}

fn play(path: &Path, trim: Option<TrimRange>, config: SessionConfig) -> Result<()> {
    let config = SessionConfig {
        autoplay: false,
        ..config
    };
    let (_host, _id, session) = open_session(path, config, Arc::new(ProgressBar))?;
    if let Some(range) = trim {
        session.set_trim_start(range.start_or_zero());
        session.set_trim_end(range.end_or_one());
    }
    session.play().context("failed to start playback")?;
    while session.is_playing() {
        std::thread::sleep(Duration::from_millis(10));
    }
    session.stop();
    println!("Done.");
    Ok(())
}
