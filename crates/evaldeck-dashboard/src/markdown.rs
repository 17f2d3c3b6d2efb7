use crate::theme;
use pulldown_cmark::{Event as MdEvent, Options, Parser, Tag, TagEnd};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

/// Render markdown into styled lines. Covers the constructs transcripts
/// actually produce: paragraphs, headings, fenced/indented code, inline code,
/// emphasis, bullet lists, and rules. Anything else degrades to its text.
pub fn markdown_lines(source: &str) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    append_markdown(source, &mut lines);
    lines
}

pub fn append_markdown(source: &str, lines: &mut Vec<Line<'static>>) {
    let mut writer = Writer {
        lines,
        spans: Vec::new(),
        code: None,
        bold: 0,
        italic: 0,
        heading: false,
        list_depth: 0,
    };

    for event in Parser::new_ext(source, Options::empty()) {
        match event {
            MdEvent::Start(Tag::Paragraph) => writer.start_block(),
            MdEvent::End(TagEnd::Paragraph) => writer.flush(),
            MdEvent::Start(Tag::Heading { .. }) => {
                writer.start_block();
                writer.heading = true;
            }
            MdEvent::End(TagEnd::Heading(_)) => {
                writer.flush();
                writer.heading = false;
            }
            MdEvent::Start(Tag::CodeBlock(_)) => {
                writer.start_block();
                writer.code = Some(String::new());
            }
            MdEvent::End(TagEnd::CodeBlock) => writer.flush_code(),
            MdEvent::Start(Tag::List(_)) => {
                if writer.list_depth == 0 {
                    writer.start_block();
                }
                writer.list_depth += 1;
            }
            MdEvent::End(TagEnd::List(_)) => {
                writer.list_depth = writer.list_depth.saturating_sub(1);
            }
            MdEvent::Start(Tag::Item) => {
                writer.flush();
                let indent = "  ".repeat(writer.list_depth.saturating_sub(1));
                writer.spans.push(Span::raw(format!("{indent}- ")));
            }
            MdEvent::End(TagEnd::Item) => writer.flush(),
            MdEvent::Start(Tag::Strong) => writer.bold += 1,
            MdEvent::End(TagEnd::Strong) => writer.bold = writer.bold.saturating_sub(1),
            MdEvent::Start(Tag::Emphasis) => writer.italic += 1,
            MdEvent::End(TagEnd::Emphasis) => writer.italic = writer.italic.saturating_sub(1),
            MdEvent::Text(text) => writer.text(&text),
            MdEvent::Code(code) => writer
                .spans
                .push(Span::styled(code.into_string(), theme::CODE_STYLE)),
            MdEvent::SoftBreak | MdEvent::HardBreak => writer.flush_continuation(),
            MdEvent::Rule => {
                writer.start_block();
                writer
                    .lines
                    .push(Line::from(Span::styled("───", theme::SEPARATOR_STYLE)));
            }
            _ => {}
        }
    }
    writer.flush();
}

struct Writer<'a> {
    lines: &'a mut Vec<Line<'static>>,
    spans: Vec<Span<'static>>,
    code: Option<String>,
    bold: usize,
    italic: usize,
    heading: bool,
    list_depth: usize,
}

impl Writer<'_> {
    fn style(&self) -> Style {
        let mut style = Style::default();
        if self.heading || self.bold > 0 {
            style = style.add_modifier(Modifier::BOLD);
        }
        if self.italic > 0 {
            style = style.add_modifier(Modifier::ITALIC);
        }
        style
    }

    fn text(&mut self, text: &str) {
        if let Some(buffer) = self.code.as_mut() {
            buffer.push_str(text);
            return;
        }
        self.spans.push(Span::styled(text.to_string(), self.style()));
    }

    /// Separate a new block from the previous one with a single blank line.
    fn start_block(&mut self) {
        self.flush();
        if !self.lines.is_empty() {
            self.lines.push(Line::default());
        }
    }

    fn flush(&mut self) {
        if !self.spans.is_empty() {
            self.lines.push(Line::from(std::mem::take(&mut self.spans)));
        }
    }

    /// Line break inside one block: emit the pending spans even when empty so
    /// consecutive breaks keep their vertical space.
    fn flush_continuation(&mut self) {
        self.lines.push(Line::from(std::mem::take(&mut self.spans)));
    }

    fn flush_code(&mut self) {
        let Some(buffer) = self.code.take() else {
            return;
        };
        for line in buffer.trim_end_matches('\n').split('\n') {
            self.lines
                .push(Line::from(Span::styled(line.to_string(), theme::CODE_STYLE)));
        }
    }
}
