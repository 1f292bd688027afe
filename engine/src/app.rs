//! Application state: media selection, processing, and completed results.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use thiserror::Error;
use uuid::Uuid;

use adspa_types::{
    PhasePlan, PlanError, RunState, SimulationSettings, UiOptions, resolve_phase_plan,
};

use crate::driver::{DriverError, DriverLoop, TickOutcome};

/// Spinner cadence, independent of render FPS.
const UI_TICK_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppStatus {
    Idle,
    Processing,
    Completed,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("select both a source video and an asset image first")]
    MissingMedia,
    #[error("cannot start processing while {0:?}")]
    NotIdle(AppStatus),
    #[error("{name} is not a supported {kind} file ({accepted})")]
    UnsupportedMedia {
        kind: MediaKind,
        name: String,
        accepted: &'static str,
    },
    #[error(transparent)]
    Plan(#[from] PlanError),
    #[error(transparent)]
    Driver(#[from] DriverError),
}

/// Which dropzone a selection belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Image,
}

impl MediaKind {
    const VIDEO_EXTENSIONS: &'static [&'static str] = &["mp4", "webm", "mov"];
    const IMAGE_EXTENSIONS: &'static [&'static str] = &["jpg", "jpeg", "png", "webp"];

    fn extensions(self) -> &'static [&'static str] {
        match self {
            MediaKind::Video => Self::VIDEO_EXTENSIONS,
            MediaKind::Image => Self::IMAGE_EXTENSIONS,
        }
    }

    /// Human-readable list of accepted formats.
    #[must_use]
    pub fn accepted(self) -> &'static str {
        match self {
            MediaKind::Video => "MP4, WebM, MOV",
            MediaKind::Image => "JPG, PNG, WEBP",
        }
    }

    /// Case-insensitive extension check.
    #[must_use]
    pub fn accepts(self, name: &str) -> bool {
        std::path::Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.extensions()
                    .iter()
                    .any(|allowed| ext.eq_ignore_ascii_case(allowed))
            })
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            MediaKind::Video => "video",
            MediaKind::Image => "image",
        })
    }
}

/// In-progress entry of a media file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaPrompt {
    pub kind: MediaKind,
    pub buffer: String,
}

/// The user's chosen inputs. Names are display labels only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaSelection {
    pub source_video: Option<String>,
    pub asset_image: Option<String>,
}

impl MediaSelection {
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.source_video.is_some() && self.asset_image.is_some()
    }
}

/// A finished run kept for the rest of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryItem {
    pub id: Uuid,
    pub timestamp: DateTime<Local>,
    pub source_file_name: String,
    pub image_file_name: String,
    pub result_video: String,
}

#[derive(Debug)]
pub struct App {
    settings: SimulationSettings,
    ui_options: UiOptions,
    status: AppStatus,
    selection: MediaSelection,
    driver: DriverLoop,
    run_complete: Arc<AtomicBool>,
    history: Vec<HistoryItem>,
    /// History entry shown on the completion screen.
    showing: Option<Uuid>,
    prompt: Option<MediaPrompt>,
    ui_tick: usize,
    last_ui_tick: Instant,
    last_error: Option<String>,
    quit: bool,
}

impl App {
    #[must_use]
    pub fn new(settings: SimulationSettings, ui_options: UiOptions) -> Self {
        Self {
            settings,
            ui_options,
            status: AppStatus::Idle,
            selection: MediaSelection::default(),
            driver: DriverLoop::new(),
            run_complete: Arc::new(AtomicBool::new(false)),
            history: Vec::new(),
            showing: None,
            prompt: None,
            ui_tick: 0,
            last_ui_tick: Instant::now(),
            last_error: None,
            quit: false,
        }
    }

    #[must_use]
    pub fn status(&self) -> AppStatus {
        self.status
    }

    #[must_use]
    pub fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    #[must_use]
    pub fn ui_options(&self) -> UiOptions {
        self.ui_options
    }

    #[must_use]
    pub fn selection(&self) -> &MediaSelection {
        &self.selection
    }

    pub fn select_source_video(&mut self, name: impl Into<String>) {
        self.selection.source_video = Some(name.into());
    }

    pub fn select_asset_image(&mut self, name: impl Into<String>) {
        self.selection.asset_image = Some(name.into());
    }

    /// Validate and store a selection for `kind`.
    pub fn select_media(&mut self, kind: MediaKind, name: &str) -> Result<(), AppError> {
        let name = name.trim();
        if !kind.accepts(name) {
            return Err(AppError::UnsupportedMedia {
                kind,
                name: name.to_string(),
                accepted: kind.accepted(),
            });
        }
        match kind {
            MediaKind::Video => self.select_source_video(name),
            MediaKind::Image => self.select_asset_image(name),
        }
        Ok(())
    }

    /// Open the file name prompt. Only available while idle.
    pub fn begin_prompt(&mut self, kind: MediaKind) {
        if self.status == AppStatus::Idle {
            self.prompt = Some(MediaPrompt {
                kind,
                buffer: String::new(),
            });
        }
    }

    #[must_use]
    pub fn prompt(&self) -> Option<&MediaPrompt> {
        self.prompt.as_ref()
    }

    pub fn prompt_push(&mut self, c: char) {
        if let Some(prompt) = self.prompt.as_mut() {
            prompt.buffer.push(c);
        }
    }

    pub fn prompt_backspace(&mut self) {
        if let Some(prompt) = self.prompt.as_mut() {
            prompt.buffer.pop();
        }
    }

    pub fn cancel_prompt(&mut self) {
        self.prompt = None;
    }

    /// Apply the prompt buffer as a selection. The prompt stays open on error.
    pub fn submit_prompt(&mut self) -> Result<(), AppError> {
        let Some(prompt) = self.prompt.take() else {
            return Ok(());
        };
        if let Err(err) = self.select_media(prompt.kind, &prompt.buffer) {
            self.prompt = Some(prompt);
            return Err(err);
        }
        self.last_error = None;
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        if self.status == AppStatus::Idle {
            self.selection = MediaSelection::default();
        }
    }

    #[must_use]
    pub fn is_ready_to_process(&self) -> bool {
        self.status == AppStatus::Idle && self.selection.is_ready()
    }

    /// Resolve the plan from current settings and begin the overlay run.
    pub fn start_processing(&mut self) -> Result<(), AppError> {
        self.start_processing_at(Instant::now())
    }

    pub fn start_processing_at(&mut self, now: Instant) -> Result<(), AppError> {
        if self.status != AppStatus::Idle {
            return Err(AppError::NotIdle(self.status));
        }
        if !self.selection.is_ready() {
            return Err(AppError::MissingMedia);
        }

        let plan = resolve_phase_plan(&self.settings.phases, self.settings.total_override)?;
        tracing::debug!(%plan, "Resolved phase plan");

        self.run_complete.store(false, Ordering::Release);
        let flag = Arc::clone(&self.run_complete);
        self.driver.start_at(
            plan,
            move || flag.store(true, Ordering::Release),
            self.settings.grace_period,
            now,
        )?;
        self.status = AppStatus::Processing;
        self.prompt = None;
        self.last_error = None;
        Ok(())
    }

    /// Advance per-frame state. Called once per render tick.
    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    pub fn tick_at(&mut self, now: Instant) {
        if now.saturating_duration_since(self.last_ui_tick) >= UI_TICK_INTERVAL {
            self.last_ui_tick = now;
            self.ui_tick = self.ui_tick.wrapping_add(1);
        }

        if self.status != AppStatus::Processing {
            return;
        }
        if let TickOutcome::NotRunning = self.driver.tick_at(now) {
            return;
        }
        if self.run_complete.swap(false, Ordering::AcqRel) {
            self.handle_processing_complete();
        }
    }

    fn handle_processing_complete(&mut self) {
        let (Some(source), Some(image)) = (
            self.selection.source_video.clone(),
            self.selection.asset_image.clone(),
        ) else {
            self.status = AppStatus::Completed;
            return;
        };

        let item = HistoryItem {
            id: Uuid::new_v4(),
            timestamp: Local::now(),
            source_file_name: source,
            image_file_name: image,
            result_video: self.settings.result_video.clone(),
        };
        tracing::info!(id = %item.id, source = %item.source_file_name, "Placement complete");
        self.showing = Some(item.id);
        self.history.insert(0, item);
        self.status = AppStatus::Completed;
    }

    /// Abandon the overlay and return to media selection.
    pub fn cancel_processing(&mut self) {
        if self.status == AppStatus::Processing {
            self.driver.cancel();
            self.run_complete.store(false, Ordering::Release);
            self.status = AppStatus::Idle;
        }
    }

    /// "Start new project": clear inputs and return to idle.
    pub fn reset(&mut self) {
        self.driver.cancel();
        self.run_complete.store(false, Ordering::Release);
        self.selection = MediaSelection::default();
        self.showing = None;
        self.prompt = None;
        self.status = AppStatus::Idle;
    }

    /// Show a previous result on the completion screen.
    pub fn restore_history_item(&mut self, index: usize) -> bool {
        if self.status == AppStatus::Processing {
            return false;
        }
        let Some(item) = self.history.get(index) else {
            return false;
        };
        self.showing = Some(item.id);
        self.selection = MediaSelection {
            source_video: Some(item.source_file_name.clone()),
            asset_image: Some(item.image_file_name.clone()),
        };
        self.status = AppStatus::Completed;
        true
    }

    #[must_use]
    pub fn history(&self) -> &[HistoryItem] {
        &self.history
    }

    #[must_use]
    pub fn shown_result(&self) -> Option<&HistoryItem> {
        let id = self.showing?;
        self.history.iter().find(|item| item.id == id)
    }

    #[must_use]
    pub fn run_state(&self) -> Option<RunState> {
        self.driver.last_state()
    }

    #[must_use]
    pub fn plan(&self) -> Option<&PhasePlan> {
        self.driver.plan()
    }

    #[must_use]
    pub fn ui_tick(&self) -> usize {
        self.ui_tick
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.last_error = Some(message.into());
    }

    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn request_quit(&mut self) {
        self.quit = true;
    }

    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.quit
    }
}
