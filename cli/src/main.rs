//! ADSPA CLI - Binary entry point and terminal session management.
//!
//! # Architecture
//!
//! The CLI bridges [`adspa_engine`] (application state) and [`adspa_tui`] (rendering),
//! providing RAII-based terminal management with guaranteed cleanup.
//!
//! ```text
//! main() -> load config -> TerminalSession::new() -> run_app() -> App + TUI
//!        \-> --headless -> headless::run() -> spawn_run()
//! ```
//!
//! # Event Loop
//!
//! The full-screen UI uses a fixed 16ms render cadence:
//!
//! 1. Wait for frame tick
//! 2. Drain input queue (non-blocking via [`adspa_tui::InputPump`])
//! 3. Advance application state (`app.tick()`), which samples the active run
//! 4. Render frame

mod headless;

use anyhow::{Context, Result, bail};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::{Backend, CrosstermBackend},
};
use std::{
    fs::{self, OpenOptions},
    io::{Stdout, Write, stdout},
    path::PathBuf,
    sync::Mutex,
    time::Duration,
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use adspa_config::AdspaConfig;
use adspa_engine::{
    App, DEFAULT_TICK_CADENCE, MediaKind, SimulationSettings, TotalOverride, UiOptions,
    resolve_phase_plan,
};
use adspa_tui::{InputPump, draw, handle_events};

#[derive(Parser)]
#[command(name = "adspa")]
#[command(about = "Simulated ad spatial placement pipeline in the terminal")]
struct Cli {
    /// Source video file name
    #[arg(long)]
    video: Option<String>,

    /// Asset image file name
    #[arg(long)]
    asset: Option<String>,

    /// Config file (defaults to ~/.adspa/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Stretch or shrink all phases to this total, in milliseconds
    #[arg(long)]
    total_ms: Option<f64>,

    /// Delay between the end of the last phase and completion, in milliseconds
    #[arg(long)]
    grace_ms: Option<u64>,

    /// Run once without the terminal UI and print progress lines
    #[arg(long)]
    headless: bool,
}

fn init_tracing(headless: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    if headless {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
        return;
    }

    let (log_file, init_warnings) = open_log_file();

    if let Some((log_path, file)) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();

        tracing::info!(path = %log_path.display(), "Logging initialized");
        for warning in init_warnings {
            tracing::warn!("{warning}");
        }
        return;
    }

    // Without a log file, prefer no logs over corrupting the TUI.
    tracing_subscriber::registry().with(env_filter).init();
}

fn open_log_file() -> (Option<(PathBuf, std::fs::File)>, Vec<String>) {
    let mut warnings = Vec::new();

    for candidate in log_file_candidates() {
        if let Some(parent) = candidate.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warnings.push(format!(
                "Failed to create log dir {}: {e}",
                parent.display()
            ));
            continue;
        }

        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(&candidate)
        {
            Ok(file) => return (Some((candidate, file)), warnings),
            Err(e) => {
                warnings.push(format!(
                    "Failed to open log file {}: {e}",
                    candidate.display()
                ));
            }
        }
    }

    (None, warnings)
}

fn log_file_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    // Primary: ~/.adspa/logs/adspa.log
    if let Some(config_path) = AdspaConfig::path()
        && let Some(config_dir) = config_path.parent()
    {
        candidates.push(config_dir.join("logs").join("adspa.log"));
    }

    // Fallback: ./.adspa/logs/adspa.log
    candidates.push(PathBuf::from(".adspa").join("logs").join("adspa.log"));

    candidates
}

fn load_config(cli: &Cli) -> Result<Option<AdspaConfig>> {
    if let Some(path) = cli.config.as_deref() {
        return AdspaConfig::load_from(path).map(Some).map_err(Into::into);
    }
    match AdspaConfig::load() {
        Ok(config) => Ok(config),
        Err(err) => {
            // A broken default config should not keep the app from starting.
            tracing::warn!("Using defaults: {err}");
            Ok(None)
        }
    }
}

/// File settings with command-line overrides applied.
fn resolve_settings(cli: &Cli, config: Option<&AdspaConfig>) -> Result<SimulationSettings> {
    let mut settings = match config {
        Some(config) => config.simulation_settings()?,
        None => SimulationSettings::default(),
    };

    if let Some(millis) = cli.total_ms {
        match TotalOverride::from_millis(millis) {
            Some(total) => settings.total_override = Some(total),
            None => {
                tracing::warn!(total_ms = millis, "Ignoring out-of-range --total-ms");
                settings.total_override = None;
            }
        }
    }
    if let Some(millis) = cli.grace_ms {
        settings.grace_period = Duration::from_millis(millis);
    }
    Ok(settings)
}

/// RAII wrapper for terminal state with guaranteed cleanup on drop.
///
/// Raw mode and the alternate screen are restored even after panics or early returns.
struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalSession {
    fn new() -> Result<Self> {
        enable_raw_mode()?;

        let mut out = stdout();
        if let Err(err) = execute!(out, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(err.into());
        }

        let terminal = match Terminal::new(CrosstermBackend::new(out)) {
            Ok(t) => t,
            Err(err) => {
                let _ = disable_raw_mode();
                let _ = execute!(stdout(), LeaveAlternateScreen);
                return Err(err.into());
            }
        };

        Ok(Self { terminal })
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.headless);

    let config = load_config(&cli)?;
    let settings = resolve_settings(&cli, config.as_ref())?;
    let ui_options = config
        .as_ref()
        .map_or_else(UiOptions::default, AdspaConfig::ui_options);

    if cli.headless {
        return run_headless(&cli, settings).await;
    }

    let mut app = App::new(settings, ui_options);
    for (kind, name) in [
        (MediaKind::Video, cli.video.as_deref()),
        (MediaKind::Image, cli.asset.as_deref()),
    ] {
        if let Some(name) = name
            && let Err(err) = app.select_media(kind, name)
        {
            app.set_error(err.to_string());
        }
    }

    let result = {
        let mut session = TerminalSession::new()?;
        run_app(&mut session.terminal, &mut app).await
    };

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }
    Ok(())
}

async fn run_headless(cli: &Cli, settings: SimulationSettings) -> Result<()> {
    for (kind, name) in [
        (MediaKind::Video, cli.video.as_deref()),
        (MediaKind::Image, cli.asset.as_deref()),
    ] {
        if let Some(name) = name
            && !kind.accepts(name)
        {
            bail!("{name} is not a supported {kind} file ({})", kind.accepted());
        }
    }

    let plan = resolve_phase_plan(&settings.phases, settings.total_override)
        .context("invalid phase configuration")?;
    let shutdown = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl-C: {err}");
            std::future::pending::<()>().await;
        }
    };

    let mut out = stdout();
    let outcome = headless::run(
        plan,
        settings.grace_period,
        DEFAULT_TICK_CADENCE,
        &mut out,
        shutdown,
    )
    .await?;

    if outcome == headless::HeadlessOutcome::Completed {
        writeln!(out, "result: {}", settings.result_video)?;
    }
    Ok(())
}

const FRAME_DURATION: Duration = Duration::from_millis(16);

async fn run_app<B>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()>
where
    B: Backend + Write,
    B::Error: Send + Sync + 'static,
{
    let mut input = InputPump::new();
    let mut frames = tokio::time::interval(FRAME_DURATION);
    frames.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let result: Result<()> = loop {
        frames.tick().await;

        // Non-blocking input (drain queue only)
        let quit_now = match handle_events(app, &mut input) {
            Ok(q) => q,
            Err(e) => break Err(e),
        };
        if quit_now {
            break Ok(());
        }

        app.tick();

        if let Err(e) = terminal.draw(|frame| draw(frame, app)) {
            break Err(e.into());
        }
    };

    app.cancel_processing();
    input.shutdown().await;
    result
}
