use crate::render::{render_event, EventDisplay};
use crate::theme;
use evaldeck_core::samples::ActiveSample;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;
use std::sync::Arc;

/// How close to the bottom (in rows) the view may be and still count as
/// pinned there, so appended events keep it scrolled to the end.
const BOTTOM_STICKY_ROWS: usize = 3;

/// Mirrors the focused sample's transcript into rendered fragments.
///
/// Events are rendered at most once: a focus change rebuilds everything and
/// jumps to the bottom; growth of the already-focused transcript renders and
/// appends only the new suffix, preserving the scroll offset unless the view
/// was already pinned near the bottom.
#[derive(Debug, Default)]
pub struct TranscriptView {
    sample_id: Option<String>,
    events_rendered: usize,
    fragments: Vec<EventDisplay>,
    scroll: usize,
    content_rows: usize,
    viewport_rows: usize,
}

impl TranscriptView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focused_id(&self) -> Option<&str> {
        self.sample_id.as_deref()
    }

    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }

    pub fn events_rendered(&self) -> usize {
        self.events_rendered
    }

    pub fn sync_sample(&mut self, sample: Option<&Arc<ActiveSample>>) {
        match (sample, self.sample_id.as_deref()) {
            // Same sample still focused: render only the unseen suffix.
            (Some(sample), Some(id)) if sample.id() == id => {
                let suffix = sample.transcript().events_from(self.events_rendered);
                if suffix.is_empty() {
                    return;
                }
                let pinned = self.near_bottom();
                self.events_rendered += suffix.len();
                self.fragments.extend(
                    suffix
                        .iter()
                        .filter_map(render_event)
                        .filter(EventDisplay::has_body),
                );
                if pinned {
                    self.scroll = usize::MAX;
                }
            }
            (None, None) => {}
            // Focus moved to a different sample (or away): full resync.
            (sample, _) => {
                self.sample_id = sample.map(|sample| sample.id().to_string());
                self.fragments.clear();
                self.events_rendered = 0;
                self.scroll = usize::MAX;
                if let Some(sample) = sample {
                    let events = sample.transcript().snapshot();
                    self.events_rendered = events.len();
                    self.fragments.extend(
                        events
                            .iter()
                            .filter_map(render_event)
                            .filter(EventDisplay::has_body),
                    );
                } else {
                    self.scroll = 0;
                }
            }
        }
    }

    pub fn scroll_up(&mut self, rows: usize) {
        self.scroll = self.effective_scroll().saturating_sub(rows);
    }

    pub fn scroll_down(&mut self, rows: usize) {
        self.scroll = self
            .effective_scroll()
            .saturating_add(rows)
            .min(self.max_scroll());
    }

    pub fn scroll_to_end(&mut self) {
        self.scroll = usize::MAX;
    }

    fn max_scroll(&self) -> usize {
        self.content_rows.saturating_sub(self.viewport_rows)
    }

    fn effective_scroll(&self) -> usize {
        self.scroll.min(self.max_scroll())
    }

    fn near_bottom(&self) -> bool {
        self.max_scroll() - self.effective_scroll() <= BOTTOM_STICKY_ROWS
    }

    /// Flatten fragments to display rows at `width`, record the viewport
    /// metrics scroll math depends on, and clamp the offset.
    fn refresh_layout(&mut self, width: u16, height: usize) -> Vec<Line<'static>> {
        let rows = self.layout_rows(width);
        self.content_rows = rows.len();
        self.viewport_rows = height;
        self.scroll = self.effective_scroll();
        rows
    }

    fn layout_rows(&self, width: u16) -> Vec<Line<'static>> {
        let mut rows = Vec::new();
        for fragment in &self.fragments {
            rows.push(separator_row(&fragment.title, width));
            for line in &fragment.body.lines {
                rows.extend(wrap_line(line, width));
            }
            rows.push(Line::default());
        }
        rows
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(Span::styled("Transcript", theme::TITLE_STYLE));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = self.refresh_layout(inner.width, inner.height as usize);
        let visible: Vec<Line<'static>> = rows
            .into_iter()
            .skip(self.scroll)
            .take(inner.height as usize)
            .collect();
        frame.render_widget(Paragraph::new(Text::from(visible)), inner);
    }
}

/// Section separator: a rule carrying the fragment title.
fn separator_row(title: &str, width: u16) -> Line<'static> {
    let head = format!("── {title} ");
    let used = head.chars().count();
    let tail = "─".repeat((width as usize).saturating_sub(used));
    Line::from(Span::styled(format!("{head}{tail}"), theme::SEPARATOR_STYLE))
}

/// Word-wrap one styled line to the viewport width. Lines that fit pass
/// through untouched; overlong lines re-wrap as plain text carrying the
/// line's leading style.
fn wrap_line(line: &Line<'static>, width: u16) -> Vec<Line<'static>> {
    let width = (width as usize).max(1);
    let flat: String = line
        .spans
        .iter()
        .map(|span| span.content.as_ref())
        .collect();
    if flat.chars().count() <= width {
        return vec![line.clone()];
    }
    let style = line
        .spans
        .first()
        .map(|span| span.style)
        .unwrap_or_default();
    textwrap::wrap(&flat, width)
        .into_iter()
        .map(|piece| Line::from(Span::styled(piece.into_owned(), style)))
        .collect()
}
