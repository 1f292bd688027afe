//! Processing overlay: a pure rendering of the latest [`RunState`].

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Gauge, Paragraph},
};

use adspa_engine::narration::{self, DIFFUSION_STEPS, StepStatus};
use adspa_engine::{PhasePlan, RunState, UiOptions};

use crate::theme::{Glyphs, Palette, glyphs, palette, spinner_frame, styles};

/// Text bar of `width` cells with `fraction` filled.
pub(crate) fn progress_bar(width: usize, fraction: f64, glyphs: &Glyphs) -> String {
    let filled = filled_cells(width, fraction);
    let mut bar = glyphs.bar_filled.repeat(filled);
    bar.push_str(&glyphs.bar_empty.repeat(width - filled));
    bar
}

fn filled_cells(width: usize, fraction: f64) -> usize {
    ((fraction.clamp(0.0, 1.0) * width as f64).round() as usize).min(width)
}

/// Scanner line sweeping left to right with phase progress.
fn scanner_line(width: usize, pct: f64, glyphs: &Glyphs) -> String {
    if width == 0 {
        return String::new();
    }
    let pos = filled_cells(width - 1, pct / 100.0);
    let mut line = " ".repeat(pos);
    line.push_str(glyphs.scan_line);
    line.push_str(&" ".repeat(width - 1 - pos));
    line
}

pub fn draw_overlay(
    frame: &mut Frame,
    area: Rect,
    plan: &PhasePlan,
    state: &RunState,
    ui_tick: usize,
    options: UiOptions,
) {
    let palette = palette(options);
    let glyphs = glyphs(options);
    let accent = palette.stage(state.active_phase);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(accent))
        .title(Span::styled(" ADSPA ENGINE ", styles::engine_badge(&palette)))
        .style(Style::default().bg(palette.bg_panel));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Stage header
            Constraint::Min(4),    // Visualization
            Constraint::Length(1), // Terminal log
            Constraint::Length(1), // Overall gauge
            Constraint::Length(1), // Timeline
        ])
        .split(inner);

    draw_header(frame, chunks[0], plan, state, ui_tick, options, &palette);
    draw_visualization(frame, chunks[1], state, &palette, &glyphs);

    let log = Paragraph::new(Line::from(vec![
        Span::styled(format!("{} ", glyphs.prompt), Style::default().fg(palette.terminal)),
        Span::styled(
            narration::status_message(state),
            Style::default().fg(palette.terminal),
        ),
    ]));
    frame.render_widget(log, chunks[2]);

    let overall = Gauge::default()
        .gauge_style(Style::default().fg(accent).bg(palette.bg_border))
        .ratio((state.overall_progress_pct / 100.0).clamp(0.0, 1.0))
        .label(format!("{:.0}%", state.overall_progress_pct));
    frame.render_widget(overall, chunks[3]);

    draw_timeline(frame, chunks[4], plan, state, &palette, &glyphs);
}

fn draw_header(
    frame: &mut Frame,
    area: Rect,
    plan: &PhasePlan,
    state: &RunState,
    ui_tick: usize,
    options: UiOptions,
    palette: &Palette,
) {
    let accent = palette.stage(state.active_phase);
    let label = plan
        .get(state.active_phase)
        .map_or("", |phase| phase.name());

    let title = Line::from(vec![
        Span::styled(
            format!("{} ", spinner_frame(ui_tick, options)),
            Style::default().fg(accent),
        ),
        Span::styled(
            narration::stage_title(state.active_phase),
            styles::title(palette).fg(accent),
        ),
    ]);
    let pct = Line::from(Span::styled(
        format!("{:.0}%", state.phase_progress_pct),
        Style::default()
            .fg(palette.text_primary)
            .add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Right);
    let subtitle = Line::from(Span::styled(
        label.to_string(),
        Style::default().fg(palette.text_secondary),
    ));

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(area);
    frame.render_widget(Paragraph::new(title), rows[0]);
    frame.render_widget(Paragraph::new(pct), rows[0]);
    frame.render_widget(Paragraph::new(subtitle), rows[1]);
}

fn draw_visualization(
    frame: &mut Frame,
    area: Rect,
    state: &RunState,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let accent = palette.stage(state.active_phase);
    let width = usize::from(area.width);
    let mut lines: Vec<Line> = Vec::new();

    match state.active_phase {
        0 | 1 => {
            lines.push(Line::from(Span::styled(
                scanner_line(width, state.phase_progress_pct, glyphs),
                Style::default().fg(accent),
            )));
            for reveal in narration::reveals(state) {
                lines.push(Line::from(vec![
                    Span::styled(
                        format!("{} ", glyphs.step_done),
                        Style::default().fg(palette.success),
                    ),
                    Span::styled(reveal.label(), Style::default().fg(palette.text_primary)),
                ]));
            }
        }
        2 => {
            let step = narration::diffusion_step(state);
            lines.push(Line::from(Span::styled(
                format!("DENOISING STEP {step}/{DIFFUSION_STEPS}"),
                Style::default().fg(accent).add_modifier(Modifier::BOLD),
            )));
            lines.push(stage_bar(width, state, accent, glyphs));
        }
        index => {
            lines.push(Line::from(Span::styled(
                format!("STAGE {}", index + 1),
                Style::default().fg(accent).add_modifier(Modifier::BOLD),
            )));
            lines.push(stage_bar(width, state, accent, glyphs));
        }
    }

    frame.render_widget(Paragraph::new(lines), area);
}

fn stage_bar(width: usize, state: &RunState, accent: Color, glyphs: &Glyphs) -> Line<'static> {
    Line::from(Span::styled(
        progress_bar(
            width.saturating_sub(2),
            state.phase_progress_pct / 100.0,
            glyphs,
        ),
        Style::default().fg(accent),
    ))
}

fn draw_timeline(
    frame: &mut Frame,
    area: Rect,
    plan: &PhasePlan,
    state: &RunState,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let mut spans = Vec::with_capacity(plan.len() * 2);
    for index in 0..plan.len() {
        if index > 0 {
            let connector = if index <= state.active_phase || state.completed {
                palette.stage(index)
            } else {
                palette.bg_border
            };
            spans.push(Span::styled(
                format!(" {} ", glyphs.connector),
                Style::default().fg(connector),
            ));
        }
        let (glyph, style) = match narration::step_status(state, index) {
            StepStatus::Done => (glyphs.step_done, Style::default().fg(palette.success)),
            StepStatus::Active => (
                glyphs.step_active,
                Style::default()
                    .fg(palette.stage(index))
                    .add_modifier(Modifier::BOLD),
            ),
            StepStatus::Pending => (glyphs.step_pending, Style::default().fg(palette.text_muted)),
        };
        spans.push(Span::styled(
            format!("{glyph} {}", narration::stage_short_label(index)),
            style,
        ));
    }

    frame.render_widget(
        Paragraph::new(Line::from(spans)).alignment(Alignment::Center),
        area,
    );
}
