use crate::render::{display_text, segments};
use crate::session::Hit;
use crate::tui::app::App;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Prompt
            Constraint::Length(1), // Status
            Constraint::Min(0),    // Matches
        ])
        .split(f.area());

    draw_prompt(f, app, chunks[0]);
    draw_status(f, app, chunks[1]);
    draw_matches(f, app, chunks[2]);
}

fn draw_prompt(f: &mut Frame, app: &App, area: Rect) {
    let line = Line::from(vec![
        Span::styled(app.prompt.as_str(), Style::default().fg(Color::Cyan)),
        Span::raw(app.query.as_str()),
    ]);
    f.render_widget(Paragraph::new(line), area);

    let width = (app.prompt.chars().count() + app.query.chars().count()) as u16;
    f.set_cursor_position((area.x + width.min(area.width.saturating_sub(1)), area.y));
}

fn draw_status(f: &mut Frame, app: &App, area: Rect) {
    let style = if app.status_message.is_some() {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    f.render_widget(Paragraph::new(Span::styled(app.status_line(), style)), area);
}

fn draw_matches(f: &mut Frame, app: &App, area: Rect) {
    let mut positions = Vec::new();
    let lines: Vec<Line> = app
        .session
        .matches()
        .iter()
        .take(area.height as usize)
        .enumerate()
        .map(|(row, hit)| match_line(app, hit, row == 0, &mut positions))
        .collect();

    f.render_widget(Paragraph::new(lines), area);
}

/// One match with its positions reversed. The first row is the one
/// accept-one would take.
fn match_line<'a>(app: &'a App, hit: &Hit, first: bool, positions: &mut Vec<u32>) -> Line<'a> {
    let record = app.session.store().get(hit.id);
    app.session.positions(hit, positions);

    let base = if first {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    let spans: Vec<Span> = segments(record, positions, 0, false)
        .into_iter()
        .map(|segment| {
            let style = if segment.highlighted {
                base.add_modifier(Modifier::REVERSED)
            } else {
                base
            };
            Span::styled(display_text(segment.bytes(record)), style)
        })
        .collect();

    Line::from(spans)
}
