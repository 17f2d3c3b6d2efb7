use ratatui::style::{Color, Modifier, Style};

pub const TITLE_STYLE: Style = Style::new()
    .fg(Color::Rgb(142, 192, 124))
    .add_modifier(Modifier::BOLD);
pub const HEADING_STYLE: Style = Style::new().add_modifier(Modifier::BOLD);
pub const SELECTED_STYLE: Style = Style::new()
    .bg(Color::Rgb(131, 165, 152))
    .fg(Color::Black)
    .add_modifier(Modifier::BOLD);
pub const MUTED_STYLE: Style = Style::new().fg(Color::Rgb(146, 131, 116));
pub const TIME_STYLE: Style = Style::new().fg(Color::Rgb(131, 165, 152));
pub const SEPARATOR_STYLE: Style = Style::new().fg(Color::Rgb(104, 157, 106));
pub const CODE_STYLE: Style = Style::new().fg(Color::Rgb(189, 174, 147));

pub mod icons {
    pub const RUNNING: &str = ">";
    pub const SUCCESS: &str = "v";
    pub const ERROR: &str = "!";
}

pub fn outcome_color(outcome: Option<crate::tasks_view::TaskOutcome>) -> Color {
    match outcome {
        None => Color::Rgb(131, 165, 152),
        Some(crate::tasks_view::TaskOutcome::Success) => Color::Rgb(184, 187, 38),
        Some(crate::tasks_view::TaskOutcome::Error) => Color::Rgb(254, 128, 25),
    }
}
