use crate::markdown::{append_markdown, markdown_lines};
use crate::theme;
use evaldeck_core::event::{
    Event, EventKind, SampleSpec, Score, ToolResult, ToolView, ToolViewFormat,
};
use evaldeck_core::message::{ChatMessage, MessageRole};
use ratatui::text::{Line, Span, Text};
use serde_json::Value;

const SCORE_LABEL_WIDTH: usize = 12;

/// Rendered form of one transcript event: a title for the section separator
/// and an optional styled body. Ephemeral: derived from the event on demand
/// and never stored back.
#[derive(Debug, Clone, PartialEq)]
pub struct EventDisplay {
    pub title: String,
    pub body: Text<'static>,
}

impl EventDisplay {
    fn new(title: impl Into<String>, lines: Vec<Line<'static>>) -> Self {
        Self {
            title: title.into(),
            body: Text::from(lines),
        }
    }

    fn title_only(title: impl Into<String>) -> Self {
        Self::new(title, Vec::new())
    }

    pub fn has_body(&self) -> bool {
        self.body
            .lines
            .iter()
            .any(|line| line.spans.iter().any(|span| !span.content.is_empty()))
    }
}

/// Map one event to its display fragment. Pure: the same event always yields
/// the same output. The match is exhaustive so a new event kind cannot
/// silently fall through without a renderer.
pub fn render_event(event: &Event) -> Option<EventDisplay> {
    match &event.kind {
        EventKind::SampleInit { sample } => Some(render_sample_init(sample)),
        EventKind::Step { step_type, name } => Some(EventDisplay::title_only(format!(
            "{}: {name}",
            step_type.as_deref().unwrap_or("step")
        ))),
        EventKind::Model {
            model,
            input,
            output,
        } => Some(render_model(model, input, output)),
        EventKind::Tool {
            function,
            arguments,
            view,
            result,
        } => Some(render_tool(function, arguments, view.as_ref(), result)),
        EventKind::Subtask {
            name,
            input,
            result,
        } => Some(render_subtask(name, input, result)),
        EventKind::Score { target, score } => Some(render_score(target, score)),
        EventKind::Input { input } => Some(EventDisplay::new("input", raw_lines(input.trim()))),
        EventKind::Approval {
            approver,
            decision,
            explanation,
        } => Some(EventDisplay::new(
            "approval",
            vec![Line::from(vec![
                Span::styled(approver.clone(), theme::HEADING_STYLE),
                Span::raw(format!(": {decision} ({explanation})")),
            ])],
        )),
        EventKind::Info { data } => Some(render_info(data)),
        EventKind::Logger {
            level,
            name,
            message,
        } => {
            let mut body = level.as_str().to_uppercase();
            if !name.is_empty() {
                body.push_str(&format!(" (${name})"));
            }
            body.push_str(&format!(": {message}"));
            Some(EventDisplay::new("logger", vec![Line::from(body)]))
        }
        EventKind::Error { traceback } => {
            Some(EventDisplay::new("error", raw_lines(traceback.trim())))
        }
    }
}

fn render_sample_init(sample: &SampleSpec) -> EventDisplay {
    let mut lines = Vec::new();
    for message in sample.input.messages() {
        render_message(&message, &mut lines);
    }
    if let Some(target) = sample.target.as_deref().map(str::trim) {
        if !target.is_empty() {
            lines.push(Line::default());
            lines.push(Line::from(Span::styled("Target", theme::HEADING_STYLE)));
            lines.push(Line::default());
            lines.extend(raw_lines(target));
        }
    }
    EventDisplay::new("sample init", lines)
}

fn render_model(model: &str, input: &[ChatMessage], output: &ChatMessage) -> EventDisplay {
    let mut lines = Vec::new();
    // Preceding non-assistant messages in original order.
    for message in input
        .iter()
        .filter(|message| message.role != MessageRole::Assistant)
    {
        render_message(message, &mut lines);
        lines.push(Line::default());
    }
    // The assistant output, text only: tool calls display through their own
    // tool events, not here.
    if output.has_text() {
        render_message(output, &mut lines);
    }
    EventDisplay::new(format!("model: {model}"), lines)
}

fn render_tool(
    function: &str,
    arguments: &Value,
    view: Option<&ToolView>,
    result: &ToolResult,
) -> EventDisplay {
    let mut lines = Vec::new();
    match view {
        Some(view) if view.format == ToolViewFormat::Markdown => {
            append_markdown(&view.content, &mut lines);
        }
        Some(view) => lines.extend(raw_lines(&view.content)),
        None => lines.extend(render_function_call(function, arguments)),
    }
    // append_markdown separates itself from earlier content with one blank.
    append_markdown(&result.text(), &mut lines);
    EventDisplay::new("tool call", lines)
}

fn render_subtask(name: &str, input: &Value, result: &Value) -> EventDisplay {
    let mut lines = render_function_call(name, input);
    lines.push(Line::default());
    lines.extend(render_as_json(result));
    EventDisplay::new(format!("subtask: {name}"), lines)
}

fn render_score(target: &str, score: &Score) -> EventDisplay {
    let mut lines = Vec::new();
    score_row("Target", target.trim(), &mut lines);
    if let Some(answer) = score.answer.as_deref() {
        score_row("Answer", answer.trim(), &mut lines);
    }
    score_row("Score", &value_text(&score.value), &mut lines);
    if let Some(explanation) = score.explanation.as_deref() {
        score_row("Explanation", explanation.trim(), &mut lines);
    }
    EventDisplay::new("score", lines)
}

fn render_info(data: &Value) -> EventDisplay {
    let lines = match data {
        Value::String(text) => markdown_lines(text),
        other => render_as_json(other),
    };
    EventDisplay::new("info", lines)
}

/// Bold capitalized role, a blank, then the message text as markdown.
fn render_message(message: &ChatMessage, lines: &mut Vec<Line<'static>>) {
    lines.push(Line::from(Span::styled(
        message.role.heading(),
        theme::HEADING_STYLE,
    )));
    if message.has_text() {
        append_markdown(message.text().trim(), lines);
    } else {
        lines.push(Line::default());
    }
}

/// `name(k1=v1, k2=v2, ...)` wrapped as a code block.
pub fn render_function_call(function: &str, arguments: &Value) -> Vec<Line<'static>> {
    let call = format_function_call(function, arguments);
    markdown_lines(&format!("```\n{call}\n```"))
}

fn format_function_call(function: &str, arguments: &Value) -> String {
    let arguments = match arguments {
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| format!("{key}={}", value_json(value)))
            .collect::<Vec<_>>()
            .join(", "),
        Value::Null => String::new(),
        other => value_json(other),
    };
    format!("{function}({arguments})")
}

/// Indented JSON wrapped as a code block. A value that cannot serialize
/// degrades to `null` instead of failing the render.
pub fn render_as_json(value: &Value) -> Vec<Line<'static>> {
    let json = serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".to_string());
    markdown_lines(&format!("```json\n{json}\n```"))
}

fn value_json(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "null".to_string())
}

/// Score values display bare strings without JSON quoting.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.trim().to_string(),
        other => value_json(other),
    }
}

fn score_row(label: &str, value: &str, lines: &mut Vec<Line<'static>>) {
    let mut parts = value.lines();
    let first = parts.next().unwrap_or_default();
    lines.push(Line::from(vec![
        Span::styled(
            format!("{label:<width$}", width = SCORE_LABEL_WIDTH),
            theme::HEADING_STYLE,
        ),
        Span::raw(first.to_string()),
    ]));
    for continuation in parts {
        lines.push(Line::from(format!(
            "{:<width$}{continuation}",
            "",
            width = SCORE_LABEL_WIDTH
        )));
    }
}

fn raw_lines(text: &str) -> Vec<Line<'static>> {
    text.lines().map(|line| Line::from(line.to_string())).collect()
}
