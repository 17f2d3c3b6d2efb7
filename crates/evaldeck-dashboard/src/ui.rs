use crate::app::App;
use crate::theme;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

const SAMPLE_LIST_WIDTH: u16 = 30;

pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.size();
    let tasks_height = app.tasks.height().min(area.height / 3);
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(tasks_height),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    frame.render_widget(header(app), layout[0]);
    app.tasks.render(frame, layout[1]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SAMPLE_LIST_WIDTH), Constraint::Min(0)])
        .split(layout[2]);
    app.samples.render(frame, body[0]);
    app.transcript.render(frame, body[1]);

    frame.render_widget(footer(), layout[3]);
}

fn header(app: &App) -> Paragraph<'static> {
    Paragraph::new(Line::from(vec![
        Span::styled(app.title().to_string(), theme::TITLE_STYLE),
        Span::styled(
            format!("  {} samples active", app.active_count()),
            theme::MUTED_STYLE,
        ),
    ]))
}

fn footer() -> Paragraph<'static> {
    Paragraph::new(Line::from(Span::styled(
        "j/k select sample | PgUp/PgDn scroll transcript | G end | q quit",
        theme::MUTED_STYLE,
    )))
}
