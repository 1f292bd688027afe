//! TUI rendering for ADSPA using ratatui.

mod input;
mod overlay;
mod theme;

pub use input::{InputPump, apply_key, handle_events};
pub use overlay::draw_overlay;
pub use theme::{Glyphs, Palette, glyphs, palette, spinner_frame, styles};

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Padding, Paragraph, Wrap},
};

use adspa_engine::{App, AppStatus, HistoryItem, MediaKind};

const OVERLAY_WIDTH: u16 = 72;
const OVERLAY_HEIGHT: u16 = 14;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
    let options = app.ui_options();
    let palette = palette(options);
    let glyphs = glyphs(options);
    let bg_block = Block::default().style(Style::default().bg(palette.bg_dark));
    frame.render_widget(bg_block, frame.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(1), // Title
            Constraint::Min(1),    // Body
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    draw_title(frame, chunks[0], &palette);
    match app.status() {
        AppStatus::Idle => draw_idle(frame, app, chunks[1], &palette, &glyphs),
        AppStatus::Processing => draw_processing(frame, app, chunks[1], &palette),
        AppStatus::Completed => draw_completed(frame, app, chunks[1], &palette, &glyphs),
    }
    draw_status_bar(frame, app, chunks[2], &palette);
}

fn draw_title(frame: &mut Frame, area: Rect, palette: &Palette) {
    let title = Line::from(vec![
        Span::styled("ADSPA", styles::engine_badge(palette)),
        Span::styled(
            "  Ad Spatial Placement",
            Style::default().fg(palette.text_secondary),
        ),
    ]);
    frame.render_widget(Paragraph::new(title), area);
}

fn panel<'a>(title: &'a str, palette: &Palette) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(palette.bg_border))
        .title(Span::styled(format!(" {title} "), styles::title(palette)))
        .padding(Padding::horizontal(1))
        .style(Style::default().bg(palette.bg_panel))
}

fn media_line<'a>(
    label: &'a str,
    value: Option<&'a str>,
    palette: &Palette,
    glyphs: &Glyphs,
) -> Line<'a> {
    match value {
        Some(name) => Line::from(vec![
            Span::styled(format!("{} ", glyphs.selected), Style::default().fg(palette.success)),
            Span::styled(label, Style::default().fg(palette.text_secondary)),
            Span::styled(name, Style::default().fg(palette.text_primary)),
        ]),
        None => Line::from(vec![
            Span::styled(format!("{} ", glyphs.missing), Style::default().fg(palette.text_muted)),
            Span::styled(label, Style::default().fg(palette.text_secondary)),
            Span::styled("not selected", Style::default().fg(palette.text_muted)),
        ]),
    }
}

fn draw_idle(frame: &mut Frame, app: &App, area: Rect, palette: &Palette, glyphs: &Glyphs) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Min(3)])
        .split(area);

    let selection = app.selection();
    let mut lines = vec![
        media_line(
            "Source video: ",
            selection.source_video.as_deref(),
            palette,
            glyphs,
        ),
        media_line(
            "Asset image:  ",
            selection.asset_image.as_deref(),
            palette,
            glyphs,
        ),
        Line::default(),
    ];

    if let Some(prompt) = app.prompt() {
        let noun = match prompt.kind {
            MediaKind::Video => "Video",
            MediaKind::Image => "Image",
        };
        let label = format!("{noun} file ({}): ", prompt.kind.accepted());
        lines.push(Line::from(vec![
            Span::styled(
                format!("{} ", glyphs.prompt),
                Style::default().fg(palette.primary),
            ),
            Span::styled(label, Style::default().fg(palette.text_secondary)),
            Span::styled(
                format!("{}_", prompt.buffer),
                Style::default()
                    .fg(palette.text_primary)
                    .add_modifier(Modifier::BOLD),
            ),
        ]));
    } else if app.is_ready_to_process() {
        lines.push(Line::from(Span::styled(
            "Ready to process. Press Enter to start.",
            Style::default().fg(palette.success),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            "Select a source video and an asset image to begin.",
            Style::default().fg(palette.text_muted),
        )));
    }

    let setup = Paragraph::new(lines)
        .block(panel("Project Setup", palette))
        .wrap(Wrap { trim: false });
    frame.render_widget(setup, chunks[0]);
    draw_history(frame, app.history(), chunks[1], palette, glyphs);
}

fn draw_processing(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let (Some(plan), Some(state)) = (app.plan(), app.run_state()) else {
        let waiting = Paragraph::new(Span::styled(
            "Preparing run...",
            Style::default().fg(palette.text_muted),
        ));
        frame.render_widget(waiting, area);
        return;
    };

    let width = OVERLAY_WIDTH.min(area.width);
    let height = OVERLAY_HEIGHT.min(area.height);
    let overlay_area = Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    };
    draw_overlay(
        frame,
        overlay_area,
        plan,
        &state,
        app.ui_tick(),
        app.ui_options(),
    );
}

fn draw_completed(frame: &mut Frame, app: &App, area: Rect, palette: &Palette, glyphs: &Glyphs) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Min(3)])
        .split(area);

    let lines = match app.shown_result() {
        Some(item) => vec![
            Line::from(vec![
                Span::styled(
                    format!("{} ", glyphs.step_done),
                    Style::default().fg(palette.success),
                ),
                Span::styled(
                    "Placement complete",
                    Style::default()
                        .fg(palette.success)
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(format!("Before: {}", item.source_file_name)),
            Line::from(format!("Asset:  {}", item.image_file_name)),
            Line::from(vec![
                Span::raw("After:  "),
                Span::styled(
                    item.result_video.clone(),
                    Style::default().fg(palette.primary),
                ),
            ]),
            Line::from(Span::styled(
                format!("Finished {}", item.timestamp.format("%Y-%m-%d %H:%M:%S")),
                Style::default().fg(palette.text_muted),
            )),
        ],
        None => vec![Line::from("Placement complete")],
    };

    let result = Paragraph::new(lines).block(panel("Result", palette));
    frame.render_widget(result, chunks[0]);
    draw_history(frame, app.history(), chunks[1], palette, glyphs);
}

fn history_line<'a>(index: usize, item: &'a HistoryItem, palette: &Palette) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{}. ", index + 1), Style::default().fg(palette.primary)),
        Span::styled(
            item.source_file_name.as_str(),
            Style::default().fg(palette.text_primary),
        ),
        Span::styled(" + ", Style::default().fg(palette.text_muted)),
        Span::styled(
            item.image_file_name.as_str(),
            Style::default().fg(palette.text_primary),
        ),
        Span::styled(
            format!("  {}", item.timestamp.format("%H:%M:%S")),
            Style::default().fg(palette.text_muted),
        ),
    ])
}

fn draw_history(
    frame: &mut Frame,
    history: &[HistoryItem],
    area: Rect,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let lines: Vec<Line> = if history.is_empty() {
        vec![Line::from(Span::styled(
            format!("{} No projects yet", glyphs.bullet),
            Style::default().fg(palette.text_muted),
        ))]
    } else {
        history
            .iter()
            .enumerate()
            .map(|(index, item)| history_line(index, item, palette))
            .collect()
    };

    frame.render_widget(
        Paragraph::new(lines).block(panel("History", palette)),
        area,
    );
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    if let Some(error) = app.last_error() {
        let line = Line::from(vec![
            Span::raw(" "),
            Span::styled(format!("Error: {error}"), Style::default().fg(palette.error)),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    }

    let hints: &[(&str, &str)] = if app.prompt().is_some() {
        &[("Enter", "confirm"), ("Esc", "cancel")]
    } else {
        match app.status() {
            AppStatus::Idle => &[
                ("v", "video"),
                ("a", "asset"),
                ("Enter", "start"),
                ("1-9", "history"),
                ("q", "quit"),
            ],
            AppStatus::Processing => &[("Esc", "cancel"), ("q", "quit")],
            AppStatus::Completed => &[("n", "new project"), ("1-9", "history"), ("q", "quit")],
        }
    };

    let mut spans = vec![Span::raw(" ")];
    for (i, (key, action)) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled("  ", styles::key_hint(palette)));
        }
        spans.push(Span::styled(*key, styles::key_highlight(palette)));
        spans.push(Span::styled(format!(" {action}"), styles::key_hint(palette)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
