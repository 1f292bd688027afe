//! End-to-end flow: config file -> settings -> App -> keys -> rendered screen.

use std::io::Write;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{Terminal, backend::TestBackend};

use adspa_config::AdspaConfig;
use adspa_engine::{App, AppStatus, UiOptions};
use adspa_tui::{apply_key, draw};

use crate::common::ms;

fn press(app: &mut App, code: KeyCode) -> bool {
    apply_key(app, KeyEvent::new(code, KeyModifiers::NONE))
}

fn type_text(app: &mut App, text: &str) {
    for c in text.chars() {
        press(app, KeyCode::Char(c));
    }
}

fn screen(app: &App) -> String {
    let mut terminal = Terminal::new(TestBackend::new(100, 32)).unwrap();
    terminal.draw(|frame| draw(frame, app)).unwrap();
    let buffer = terminal.backend().buffer();
    let width = usize::from(buffer.area.width);
    buffer
        .content()
        .chunks(width)
        .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

fn app_from_config(toml_src: &str) -> App {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{toml_src}").unwrap();
    let config = AdspaConfig::load_from(file.path()).unwrap();
    App::new(config.simulation_settings().unwrap(), config.ui_options())
}

fn select_media(app: &mut App) {
    press(app, KeyCode::Char('v'));
    type_text(app, "street.webm");
    press(app, KeyCode::Enter);
    press(app, KeyCode::Char('a'));
    type_text(app, "can.png");
    press(app, KeyCode::Enter);
}

#[test]
fn configured_run_from_selection_to_result() {
    let mut app = app_from_config(
        r#"
        [simulation]
        total_duration_ms = 2000
        grace_period_ms = 250
        result_video = "demo/after.mp4"
        "#,
    );
    select_media(&mut app);
    assert!(screen(&app).contains("Ready to process"));

    let t0 = Instant::now();
    app.start_processing_at(t0).unwrap();

    // Defaults 3000/3000/4000 rescaled to 600/600/800.
    app.tick_at(t0 + ms(900));
    let text = screen(&app);
    assert!(text.contains("OCCLUSION LOGIC"));
    assert!(text.contains("50%"));

    app.tick_at(t0 + ms(2000));
    assert_eq!(app.status(), AppStatus::Processing);
    app.tick_at(t0 + ms(2250));
    assert_eq!(app.status(), AppStatus::Completed);

    let text = screen(&app);
    assert!(text.contains("demo/after.mp4"));
    assert!(text.contains("street.webm"));

    press(&mut app, KeyCode::Char('n'));
    assert_eq!(app.status(), AppStatus::Idle);
    assert!(screen(&app).contains("1. street.webm + can.png"));

    press(&mut app, KeyCode::Char('1'));
    assert_eq!(app.status(), AppStatus::Completed);
}

#[test]
fn rejected_file_type_is_reported() {
    let mut app = App::new(Default::default(), UiOptions::default());
    press(&mut app, KeyCode::Char('a'));
    type_text(&mut app, "document.pdf");
    press(&mut app, KeyCode::Enter);

    assert!(app.selection().asset_image.is_none());
    let text = screen(&app);
    assert!(text.contains("Error: document.pdf is not a supported image file"));
}

#[test]
fn cancelled_run_leaves_no_history() {
    let mut app = App::new(Default::default(), UiOptions::default());
    select_media(&mut app);
    let t0 = Instant::now();
    app.start_processing_at(t0).unwrap();
    app.tick_at(t0 + ms(4000));

    press(&mut app, KeyCode::Esc);
    app.tick_at(t0 + Duration::from_secs(60));
    assert_eq!(app.status(), AppStatus::Idle);
    assert!(app.history().is_empty());
    assert!(screen(&app).contains("No projects yet"));
}

#[test]
fn ascii_config_renders_ascii_timeline() {
    let mut app = app_from_config("[app]\nascii_only = true\nreduced_motion = true\n");
    select_media(&mut app);
    let t0 = Instant::now();
    app.start_processing_at(t0).unwrap();
    app.tick_at(t0 + ms(7000));
    let text = screen(&app);
    assert!(text.contains("[x] Spatial -- [x] Occlusion -- [>] Diffusion"));
}
