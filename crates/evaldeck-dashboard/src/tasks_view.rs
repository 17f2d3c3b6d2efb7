use crate::format::{progress_time, truncate_pad};
use crate::progress::{Progress, ScaledProgress};
use crate::theme::{self, icons};
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

pub const MAX_DESCRIPTION_WIDTH: usize = 24;
pub const MAX_MODEL_NAME_WIDTH: usize = 24;
const BAR_WIDTH: usize = 26;

/// Name/model pair used up front to size the task columns.
#[derive(Debug, Clone)]
pub struct TaskSpec {
    pub name: String,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct TaskProfile {
    pub name: String,
    pub model: String,
    pub steps: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    Success,
    Error,
}

#[derive(Debug)]
struct TaskRowState {
    profile: TaskProfile,
    started: Instant,
    progress: Mutex<ScaledProgress>,
    finished: Mutex<Option<(Instant, TaskOutcome)>>,
}

/// Shared handle to one task's progress row. The engine side drives it
/// (`update`/`finish`) while the dashboard reads it each draw.
#[derive(Debug, Clone)]
pub struct TaskHandle {
    inner: Arc<TaskRowState>,
}

impl TaskHandle {
    fn new(profile: TaskProfile) -> Self {
        let progress = ScaledProgress::new(profile.steps);
        Self {
            inner: Arc::new(TaskRowState {
                profile,
                started: Instant::now(),
                progress: Mutex::new(progress),
                finished: Mutex::new(None),
            }),
        }
    }

    fn progress(&self) -> MutexGuard<'_, ScaledProgress> {
        self.inner
            .progress
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn finished(&self) -> MutexGuard<'_, Option<(Instant, TaskOutcome)>> {
        self.inner
            .finished
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Record the task result: freezes the elapsed clock and snaps the bar
    /// to full.
    pub fn finish(&self, outcome: TaskOutcome) {
        let mut finished = self.finished();
        if finished.is_none() {
            *finished = Some((Instant::now(), outcome));
        }
        drop(finished);
        self.progress().complete();
    }

    pub fn outcome(&self) -> Option<TaskOutcome> {
        self.finished().map(|(_, outcome)| outcome)
    }

    pub fn ratio(&self) -> f64 {
        self.progress().ratio()
    }

    /// Elapsed runtime, frozen once the task finished.
    pub fn elapsed(&self) -> Duration {
        let end = self
            .finished()
            .map(|(at, _)| at)
            .unwrap_or_else(Instant::now);
        end.saturating_duration_since(self.inner.started)
    }
}

impl Progress for TaskHandle {
    fn update(&self, n: usize) {
        self.progress().update(n);
    }

    fn complete(&self) {
        self.progress().complete();
    }
}

/// One progress row per running task (status icon, padded name and model,
/// bar, percentage, elapsed time) under a run-config summary line.
#[derive(Debug, Default)]
pub struct TasksView {
    handles: Vec<TaskHandle>,
    description_width: usize,
    model_width: usize,
    config_line: String,
}

impl TasksView {
    pub fn new() -> Self {
        Self {
            description_width: MAX_DESCRIPTION_WIDTH,
            model_width: MAX_MODEL_NAME_WIDTH,
            ..Self::default()
        }
    }

    /// Clear existing rows and size the shared columns from the whole batch.
    pub fn init_tasks(&mut self, specs: &[TaskSpec]) {
        self.handles.clear();
        self.description_width = specs
            .iter()
            .map(|spec| spec.name.chars().count())
            .max()
            .unwrap_or(MAX_DESCRIPTION_WIDTH)
            .min(MAX_DESCRIPTION_WIDTH);
        self.model_width = specs
            .iter()
            .map(|spec| spec.model.chars().count())
            .max()
            .unwrap_or(MAX_MODEL_NAME_WIDTH)
            .min(MAX_MODEL_NAME_WIDTH);
    }

    /// Run-config summary shown above the rows, `key: value` pairs joined
    /// with commas.
    pub fn set_config(&mut self, pairs: &[(String, String)]) {
        self.config_line = pairs
            .iter()
            .map(|(key, value)| format!("{key}: {value}"))
            .collect::<Vec<_>>()
            .join(", ");
    }

    pub fn add_task(&mut self, profile: TaskProfile) -> TaskHandle {
        let handle = TaskHandle::new(profile);
        self.handles.push(handle.clone());
        handle
    }

    pub fn task_count(&self) -> usize {
        self.handles.len()
    }

    /// Rows plus config line plus the surrounding border.
    pub fn height(&self) -> u16 {
        let config_rows = usize::from(!self.config_line.is_empty());
        (self.handles.len() + config_rows + 2) as u16
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let mut lines = Vec::new();
        if !self.config_line.is_empty() {
            lines.push(Line::from(Span::styled(
                self.config_line.clone(),
                theme::MUTED_STYLE,
            )));
        }
        for handle in &self.handles {
            lines.push(self.row_line(handle));
        }
        let block = Block::default()
            .borders(Borders::ALL)
            .title(Span::styled("Tasks", theme::TITLE_STYLE));
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Paragraph::new(Text::from(lines)), inner);
    }

    fn row_line(&self, handle: &TaskHandle) -> Line<'static> {
        let outcome = handle.outcome();
        let icon = match outcome {
            None => icons::RUNNING,
            Some(TaskOutcome::Success) => icons::SUCCESS,
            Some(TaskOutcome::Error) => icons::ERROR,
        };
        let ratio = handle.ratio();
        Line::from(vec![
            Span::styled(icon, Style::default().fg(theme::outcome_color(outcome))),
            Span::raw(" "),
            Span::styled(
                truncate_pad(&handle.inner.profile.name, self.description_width),
                theme::HEADING_STYLE,
            ),
            Span::raw(" "),
            Span::styled(
                truncate_pad(&handle.inner.profile.model, self.model_width),
                theme::MUTED_STYLE,
            ),
            Span::raw(" "),
            Span::raw(render_bar(ratio, BAR_WIDTH)),
            Span::raw(format!(" {:>3.0}% ", ratio * 100.0)),
            Span::styled(progress_time(handle.elapsed()), theme::TIME_STYLE),
        ])
    }
}

fn render_bar(ratio: f64, width: usize) -> String {
    let filled = (ratio.clamp(0.0, 1.0) * width as f64).round() as usize;
    format!(
        "[{}{}]",
        "=".repeat(filled.min(width)),
        " ".repeat(width.saturating_sub(filled))
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(name: &str, model: &str) -> TaskSpec {
        TaskSpec {
            name: name.to_string(),
            model: model.to_string(),
        }
    }

    fn profile(name: &str, steps: usize) -> TaskProfile {
        TaskProfile {
            name: name.to_string(),
            model: "mockllm/model".to_string(),
            steps,
        }
    }

    #[test]
    fn column_widths_come_from_the_longest_spec_capped() {
        let mut view = TasksView::new();
        view.init_tasks(&[
            spec("short", "m"),
            spec("a-much-longer-task-name", "mockllm/model"),
        ]);
        assert_eq!(view.description_width, 23);
        assert_eq!(view.model_width, 13);

        view.init_tasks(&[spec(
            "a-task-name-well-beyond-any-reasonable-column",
            "m",
        )]);
        assert_eq!(view.description_width, MAX_DESCRIPTION_WIDTH);
    }

    #[test]
    fn init_tasks_clears_previous_rows() {
        let mut view = TasksView::new();
        view.add_task(profile("popularity", 3));
        assert_eq!(view.task_count(), 1);
        view.init_tasks(&[spec("security-guide", "mockllm/model")]);
        assert_eq!(view.task_count(), 0);
    }

    #[test]
    fn step_updates_drive_the_bar_to_full() {
        let mut view = TasksView::new();
        let handle = view.add_task(profile("popularity", 4));
        for _ in 0..4 {
            handle.update(1);
        }
        assert!((handle.ratio() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn finish_freezes_elapsed_and_snaps_the_bar() {
        let mut view = TasksView::new();
        let handle = view.add_task(profile("popularity", 10));
        handle.update(2);
        handle.finish(TaskOutcome::Success);
        assert_eq!(handle.outcome(), Some(TaskOutcome::Success));
        assert!((handle.ratio() - 1.0).abs() < 1e-9);

        let frozen = handle.elapsed();
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(handle.elapsed(), frozen);
    }

    #[test]
    fn bar_renders_proportionally() {
        assert_eq!(render_bar(0.0, 4), "[    ]");
        assert_eq!(render_bar(0.5, 4), "[==  ]");
        assert_eq!(render_bar(1.0, 4), "[====]");
    }
}
