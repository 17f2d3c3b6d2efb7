use crate::message::ChatMessage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One structured record of something that happened during a sample's
/// execution. Events are immutable once created; ordering within a transcript
/// is append order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl Event {
    pub fn new(kind: EventKind) -> Self {
        Self {
            timestamp: Utc::now(),
            kind,
        }
    }
}

impl From<EventKind> for Event {
    fn from(kind: EventKind) -> Self {
        Event::new(kind)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EventKind {
    SampleInit {
        sample: SampleSpec,
    },
    Step {
        #[serde(default)]
        step_type: Option<String>,
        name: String,
    },
    Model {
        model: String,
        input: Vec<ChatMessage>,
        output: ChatMessage,
    },
    Tool {
        function: String,
        #[serde(default)]
        arguments: Value,
        #[serde(default)]
        view: Option<ToolView>,
        result: ToolResult,
    },
    Subtask {
        name: String,
        #[serde(default)]
        input: Value,
        #[serde(default)]
        result: Value,
    },
    Score {
        target: String,
        score: Score,
    },
    Input {
        input: String,
    },
    Approval {
        approver: String,
        decision: ApprovalDecision,
        explanation: String,
    },
    Info {
        data: Value,
    },
    Logger {
        level: LogLevel,
        #[serde(default)]
        name: String,
        message: String,
    },
    Error {
        traceback: String,
    },
}

/// The payload a sample executes against: its input (plain text or a full
/// message history) and an optional expected target.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SampleSpec {
    pub id: String,
    pub input: SampleInput,
    #[serde(default)]
    pub target: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum SampleInput {
    Text(String),
    Messages(Vec<ChatMessage>),
}

impl SampleInput {
    /// Normalize to a message list (plain text becomes one user message).
    pub fn messages(&self) -> Vec<ChatMessage> {
        match self {
            SampleInput::Text(text) => vec![ChatMessage::user(text.clone())],
            SampleInput::Messages(messages) => messages.clone(),
        }
    }
}

/// Caller-supplied custom rendering for a tool call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolView {
    pub format: ToolViewFormat,
    pub content: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ToolViewFormat {
    Markdown,
    Raw,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ToolResult {
    Text(String),
    Content(Vec<Content>),
}

impl ToolResult {
    /// Collapse to display text. A content list concatenates its text-bearing
    /// parts with newlines; other parts are skipped.
    pub fn text(&self) -> String {
        match self {
            ToolResult::Text(text) => text.clone(),
            ToolResult::Content(parts) => parts
                .iter()
                .filter_map(|part| match part {
                    Content::Text { text } => Some(text.as_str()),
                    Content::Data { .. } => None,
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Content {
    Text { text: String },
    Data { data: Value },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Score {
    pub value: Value,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalDecision {
    Approve,
    Modify,
    Reject,
    Escalate,
    Terminate,
}

impl ApprovalDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalDecision::Approve => "approve",
            ApprovalDecision::Modify => "modify",
            ApprovalDecision::Reject => "reject",
            ApprovalDecision::Escalate => "escalate",
            ApprovalDecision::Terminate => "terminate",
        }
    }
}

impl fmt::Display for ApprovalDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
            LogLevel::Critical => "critical",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown log level: {0}")]
pub struct ParseLevelError(String);

impl FromStr for LogLevel {
    type Err = ParseLevelError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim().to_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warning" | "warn" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            "critical" => Ok(LogLevel::Critical),
            other => Err(ParseLevelError(other.to_string())),
        }
    }
}
