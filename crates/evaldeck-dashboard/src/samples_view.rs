use crate::format::{progress_time, truncate_pad};
use crate::theme;
use evaldeck_core::samples::ActiveSample;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState};
use ratatui::Frame;
use std::sync::Arc;

/// Task name and sample id column width inside the list pane.
const ROW_FIELD_WIDTH: usize = 18;

/// Ranked list of the samples currently executing, fed a fresh registry
/// snapshot each refresh tick. Longest-running samples sort first, and the
/// focused sample is carried forward even after it leaves the registry so
/// the selection never silently vanishes mid-render.
#[derive(Debug, Default)]
pub struct SamplesView {
    samples: Vec<Arc<ActiveSample>>,
    state: ListState,
}

impl SamplesView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_samples(&mut self, mut samples: Vec<Arc<ActiveSample>>) {
        let focused = self.focused().cloned();

        // Keep a focused sample visible after it leaves the registry,
        // sticky until the user moves the selection elsewhere.
        if let Some(focused) = &focused {
            if !samples.iter().any(|sample| sample.id() == focused.id()) {
                samples.push(Arc::clone(focused));
            }
        }

        // Longest-running first. Recomputed every tick: execution time is a
        // function of the wall clock for samples still running.
        samples.sort_by(|a, b| b.execution_time().cmp(&a.execution_time()));

        let selected = focused
            .and_then(|focused| samples.iter().position(|sample| sample.id() == focused.id()));
        self.samples = samples;
        self.state.select(match selected {
            Some(index) => Some(index),
            None if !self.samples.is_empty() => Some(0),
            None => None,
        });
    }

    pub fn focused(&self) -> Option<&Arc<ActiveSample>> {
        self.state.selected().and_then(|index| self.samples.get(index))
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn select_next(&mut self) {
        self.move_selection(1);
    }

    pub fn select_previous(&mut self) {
        self.move_selection(-1);
    }

    fn move_selection(&mut self, step: i32) {
        if self.samples.is_empty() {
            self.state.select(None);
            return;
        }
        let max = self.samples.len().saturating_sub(1) as i32;
        let current = self.state.selected().unwrap_or(0) as i32;
        self.state.select(Some((current + step).clamp(0, max) as usize));
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let items: Vec<ListItem> = self.samples.iter().map(|sample| list_item(sample)).collect();
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(Span::styled("Samples", theme::TITLE_STYLE)),
            )
            .highlight_style(theme::SELECTED_STYLE);
        frame.render_stateful_widget(list, area, &mut self.state);
    }
}

fn list_item(sample: &ActiveSample) -> ListItem<'static> {
    let time = progress_time(sample.execution_time());
    let first = Line::from(vec![
        Span::styled(
            truncate_pad(sample.task(), ROW_FIELD_WIDTH),
            theme::HEADING_STYLE,
        ),
        Span::raw(" "),
        Span::styled(time, theme::TIME_STYLE),
    ]);
    let second = Line::from(vec![
        Span::styled(
            truncate_pad(&format!("id: {}", sample.sample().id), ROW_FIELD_WIDTH),
            theme::MUTED_STYLE,
        ),
        Span::raw(" "),
        Span::styled(format!("epoch: {}", sample.epoch()), theme::MUTED_STYLE),
    ]);
    ListItem::new(Text::from(vec![first, second, Line::default()]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use evaldeck_core::event::{SampleInput, SampleSpec};
    use evaldeck_core::samples::ActiveSamples;
    use std::time::Duration;

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

    /// A sample whose execution time is frozen at roughly `millis`.
    fn completed_sample(task: &str, millis: u64) -> Arc<ActiveSample> {
        let registry = ActiveSamples::new();
        let sample = sample(task);
        let guard = registry.enter(Arc::clone(&sample));
        std::thread::sleep(Duration::from_millis(millis));
        drop(guard);
        sample
    }

    #[test]
    fn longest_running_sample_sorts_first() {
        let short = completed_sample("short", 2);
        let long = completed_sample("long", 20);

        let mut view = SamplesView::new();
        view.set_samples(vec![Arc::clone(&short), Arc::clone(&long)]);
        assert_eq!(view.samples[0].id(), long.id());
        assert_eq!(view.samples[1].id(), short.id());
    }

    #[test]
    fn sort_is_stable_across_refreshes_when_nothing_changed() {
        let first = completed_sample("first", 10);
        let second = completed_sample("second", 2);

        let mut view = SamplesView::new();
        view.set_samples(vec![Arc::clone(&second), Arc::clone(&first)]);
        let order: Vec<String> = view.samples.iter().map(|s| s.id().to_string()).collect();
        view.set_samples(vec![Arc::clone(&second), Arc::clone(&first)]);
        let again: Vec<String> = view.samples.iter().map(|s| s.id().to_string()).collect();
        assert_eq!(order, again);
    }

    #[test]
    fn defaults_to_the_top_entry_when_nothing_was_focused() {
        let mut view = SamplesView::new();
        assert!(view.focused().is_none());
        view.set_samples(vec![sample("popularity")]);
        assert!(view.focused().is_some());
    }

    #[test]
    fn focus_follows_the_sample_to_its_new_position() {
        let short = completed_sample("short", 2);
        let long = completed_sample("long", 20);

        let mut view = SamplesView::new();
        view.set_samples(vec![Arc::clone(&short)]);
        assert_eq!(view.focused().map(|s| s.id().to_string()), Some(short.id().to_string()));

        // The longer-running sample arrives and takes the top slot; focus
        // stays on the original sample at its new index.
        view.set_samples(vec![Arc::clone(&short), Arc::clone(&long)]);
        assert_eq!(view.focused().map(|s| s.id().to_string()), Some(short.id().to_string()));
        assert_eq!(view.samples[0].id(), long.id());
    }

    #[test]
    fn departed_focused_sample_is_carried_forward() {
        let stale = completed_sample("stale", 2);
        let running = sample("running");

        let mut view = SamplesView::new();
        view.set_samples(vec![Arc::clone(&stale)]);
        assert_eq!(view.focused().map(|s| s.id().to_string()), Some(stale.id().to_string()));

        // The registry no longer contains the focused sample; it is
        // synthesized back into the list and keeps focus.
        view.set_samples(vec![Arc::clone(&running)]);
        assert_eq!(view.len(), 2);
        assert_eq!(view.focused().map(|s| s.id().to_string()), Some(stale.id().to_string()));

        // Still sticky on the next refresh.
        view.set_samples(vec![Arc::clone(&running)]);
        assert_eq!(view.len(), 2);
        assert_eq!(view.focused().map(|s| s.id().to_string()), Some(stale.id().to_string()));
    }

    #[test]
    fn moving_the_selection_releases_a_carried_sample() {
        let stale = completed_sample("stale", 2);
        let running = sample("running");

        let mut view = SamplesView::new();
        view.set_samples(vec![Arc::clone(&stale)]);
        view.set_samples(vec![Arc::clone(&running)]);
        assert_eq!(view.len(), 2);

        // Refocus onto the live sample; the stale entry drops out on the
        // next snapshot.
        let stale_index = view
            .samples
            .iter()
            .position(|s| s.id() == stale.id())
            .expect("stale entry present");
        if view.state.selected() == Some(stale_index) {
            if stale_index == 0 {
                view.select_next();
            } else {
                view.select_previous();
            }
        }
        view.set_samples(vec![Arc::clone(&running)]);
        assert_eq!(view.len(), 1);
        assert_eq!(view.focused().map(|s| s.id().to_string()), Some(running.id().to_string()));
    }
}
