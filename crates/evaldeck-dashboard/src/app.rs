use crate::config::Config;
use crate::samples_view::SamplesView;
use crate::tasks_view::TasksView;
use crate::transcript_view::TranscriptView;
use crate::ui;
use anyhow::{anyhow, Result};
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use evaldeck_core::samples::ActiveSamples;
use futures_util::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::future::Future;
use std::io;
use tokio::task::JoinHandle;
use tracing::info;

const TRANSCRIPT_SCROLL_STEP: usize = 5;

/// Dashboard state: the registry being observed plus the three views over it.
pub struct App {
    title: String,
    registry: ActiveSamples,
    pub samples: SamplesView,
    pub transcript: TranscriptView,
    pub tasks: TasksView,
    should_quit: bool,
}

impl App {
    pub fn new(title: impl Into<String>, registry: ActiveSamples, tasks: TasksView) -> Self {
        Self {
            title: title.into(),
            registry,
            samples: SamplesView::new(),
            transcript: TranscriptView::new(),
            tasks,
            should_quit: false,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn active_count(&self) -> usize {
        self.registry.len()
    }

    /// One poll cycle: snapshot the registry, re-rank the list, and mirror
    /// the focused transcript.
    pub fn refresh(&mut self) {
        self.samples.set_samples(self.registry.list());
        self.sync_focus();
    }

    fn sync_focus(&mut self) {
        let focused = self.samples.focused().cloned();
        self.transcript.sync_sample(focused.as_ref());
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.samples.select_next();
                self.sync_focus();
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.samples.select_previous();
                self.sync_focus();
            }
            KeyCode::PageDown => {
                self.transcript.scroll_down(TRANSCRIPT_SCROLL_STEP);
            }
            KeyCode::PageUp => {
                self.transcript.scroll_up(TRANSCRIPT_SCROLL_STEP);
            }
            KeyCode::End | KeyCode::Char('G') => {
                self.transcript.scroll_to_end();
            }
            _ => {}
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }
}

/// Run the dashboard around an engine future: the engine executes as its own
/// task while the loop polls the registry and redraws on a fixed tick.
/// Returns the engine's value; engine errors propagate after the terminal is
/// restored; quitting cancels the engine (sample guards still release).
pub async fn run_app<T, F>(
    title: &str,
    registry: ActiveSamples,
    tasks: TasksView,
    engine: F,
    config: Config,
) -> Result<T>
where
    F: Future<Output = Result<T>> + Send + 'static,
    T: Send + 'static,
{
    registry.init();
    let mut app = App::new(title, registry, tasks);
    let mut engine = tokio::spawn(engine);

    let mut terminal = setup_terminal()?;
    let result = run_loop(&mut terminal, &mut app, &mut engine, config.tick).await;
    restore_terminal(&mut terminal)?;
    result
}

async fn run_loop<T>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    engine: &mut JoinHandle<Result<T>>,
    tick: std::time::Duration,
) -> Result<T> {
    let mut events = EventStream::new();
    let mut ticker = tokio::time::interval(tick);

    loop {
        app.refresh();
        terminal.draw(|frame| ui::render(frame, app))?;

        tokio::select! {
            _ = ticker.tick() => {}
            joined = &mut *engine => {
                info!(event = "engine_finished");
                return match joined {
                    Ok(result) => result,
                    Err(err) => Err(anyhow!("evaluation task failed: {err}")),
                };
            }
            maybe_event = events.next() => {
                if let Some(Ok(Event::Key(key))) = maybe_event {
                    if matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
                        app.handle_key(key);
                    }
                }
            }
        }

        if app.should_quit() {
            info!(event = "dashboard_quit");
            engine.abort();
            return Err(anyhow!("evaluation cancelled"));
        }
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use evaldeck_core::event::{EventKind, LogLevel, SampleInput, SampleSpec};
    use evaldeck_core::samples::ActiveSample;
    use std::sync::Arc;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn sample(task: &str) -> Arc<ActiveSample> {
        ActiveSample::new(
            task,
            "mockllm/model",
            1,
            SampleSpec {
                id: format!("{task}-1"),
                input: SampleInput::Text("input".to_string()),
                target: None,
            },
        )
    }

    #[test]
    fn refresh_focuses_the_first_sample_and_mirrors_its_transcript() {
        let registry = ActiveSamples::new();
        let sample = sample("popularity");
        sample.transcript().append(EventKind::Logger {
            level: LogLevel::Info,
            name: String::new(),
            message: "started".to_string(),
        });
        let _guard = registry.enter(Arc::clone(&sample));

        let mut app = App::new("eval", registry, TasksView::new());
        app.refresh();
        assert_eq!(app.transcript.focused_id(), Some(sample.id()));
        assert_eq!(app.transcript.fragment_count(), 1);
    }

    #[test]
    fn quit_keys_set_the_flag() {
        let mut app = App::new("eval", ActiveSamples::new(), TasksView::new());
        assert!(!app.should_quit());
        app.handle_key(key(KeyCode::Char('q')));
        assert!(app.should_quit());

        let mut app = App::new("eval", ActiveSamples::new(), TasksView::new());
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit());
    }

    #[test]
    fn selection_keys_refocus_the_transcript() {
        let registry = ActiveSamples::new();
        let first = sample("popularity");
        let second = sample("security-guide");
        let _g1 = registry.enter(Arc::clone(&first));
        let _g2 = registry.enter(Arc::clone(&second));

        let mut app = App::new("eval", registry, TasksView::new());
        app.refresh();
        let initial = app.transcript.focused_id().map(str::to_string);

        app.handle_key(key(KeyCode::Down));
        let moved = app.transcript.focused_id().map(str::to_string);
        assert_ne!(initial, moved);
    }
}
