//! Input handling for the ADSPA TUI.

use anyhow::{Result, anyhow};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};
use tokio::sync::mpsc;
use tracing::debug;

use adspa_engine::{App, AppStatus, MediaKind};

const INPUT_POLL_TIMEOUT: Duration = Duration::from_millis(25); // shutdown responsiveness
const INPUT_CHANNEL_CAPACITY: usize = 256;
const MAX_EVENTS_PER_FRAME: usize = 64; // never starve rendering

enum InputMsg {
    Event(Event),
    Error(String),
}

/// Reads terminal events on a blocking thread and hands them to the frame loop.
pub struct InputPump {
    rx: mpsc::Receiver<InputMsg>,
    stop: Arc<AtomicBool>,
    join: Option<tokio::task::JoinHandle<()>>,
}

impl InputPump {
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(INPUT_CHANNEL_CAPACITY);
        let stop = Arc::new(AtomicBool::new(false));
        let stop2 = stop.clone();

        let join = tokio::task::spawn_blocking(move || input_loop(stop2, tx));
        Self {
            rx,
            stop,
            join: Some(join),
        }
    }

    pub async fn shutdown(&mut self) {
        self.rx.close();

        self.stop.store(true, Ordering::Release);
        if let Some(join) = self.join.take() {
            let _ = tokio::time::timeout(Duration::from_secs(2), join).await;
        }
    }
}

impl Default for InputPump {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InputPump {
    fn drop(&mut self) {
        // Do not block in Drop.
        self.rx.close();
        self.stop.store(true, Ordering::Release);
    }
}

fn input_loop(stop: Arc<AtomicBool>, tx: mpsc::Sender<InputMsg>) {
    while !stop.load(Ordering::Acquire) {
        match event::poll(INPUT_POLL_TIMEOUT) {
            Ok(true) => match event::read() {
                Ok(ev) => {
                    if tx.blocking_send(InputMsg::Event(ev)).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    let _ = tx.blocking_send(InputMsg::Error(e.to_string()));
                    break;
                }
            },
            Ok(false) => {}
            Err(e) => {
                let _ = tx.blocking_send(InputMsg::Error(e.to_string()));
                break;
            }
        }
    }
}

/// Drain pending events into `app`. Returns `Ok(true)` when the app should quit.
pub fn handle_events(app: &mut App, input: &mut InputPump) -> Result<bool> {
    let mut processed = 0;
    while processed < MAX_EVENTS_PER_FRAME {
        let ev = match input.rx.try_recv() {
            Ok(InputMsg::Event(ev)) => ev,
            Ok(InputMsg::Error(msg)) => return Err(anyhow!("input error: {msg}")),
            Err(mpsc::error::TryRecvError::Empty) => break,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                return Err(anyhow!("input pump disconnected"));
            }
        };

        if let Event::Key(key) = ev
            && apply_key(app, key)
        {
            return Ok(true);
        }
        processed += 1;
    }

    Ok(app.should_quit())
}

/// Apply one key event. Returns `true` when the app should quit.
pub fn apply_key(app: &mut App, key: KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.request_quit();
        return true;
    }

    if app.prompt().is_some() {
        apply_prompt_key(app, key);
        return false;
    }

    match (app.status(), key.code) {
        (_, KeyCode::Char('q')) => {
            if app.status() == AppStatus::Processing {
                app.cancel_processing();
            }
            app.request_quit();
            return true;
        }
        (AppStatus::Idle, KeyCode::Char('v')) => app.begin_prompt(MediaKind::Video),
        (AppStatus::Idle, KeyCode::Char('a')) => app.begin_prompt(MediaKind::Image),
        (AppStatus::Idle, KeyCode::Char('x')) => app.clear_selection(),
        (AppStatus::Idle, KeyCode::Enter | KeyCode::Char('g')) => {
            if let Err(err) = app.start_processing() {
                debug!(error = %err, "Start rejected");
                app.set_error(err.to_string());
            }
        }
        (AppStatus::Processing, KeyCode::Esc | KeyCode::Char('c')) => app.cancel_processing(),
        (AppStatus::Completed, KeyCode::Char('r' | 'n') | KeyCode::Esc) => app.reset(),
        (AppStatus::Idle | AppStatus::Completed, KeyCode::Char(c @ '1'..='9')) => {
            let index = (c as usize) - ('1' as usize);
            if !app.restore_history_item(index) {
                app.set_error(format!("No history entry #{c}"));
            }
        }
        _ => {}
    }
    false
}

fn apply_prompt_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.cancel_prompt(),
        KeyCode::Enter => {
            if let Err(err) = app.submit_prompt() {
                app.set_error(err.to_string());
            }
        }
        KeyCode::Backspace => app.prompt_backspace(),
        KeyCode::Char(c) => app.prompt_push(c),
        _ => {}
    }
}
