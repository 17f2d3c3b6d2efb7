pub mod event;
pub mod message;
pub mod samples;
pub mod transcript;

pub use event::{
    ApprovalDecision, Content, Event, EventKind, LogLevel, SampleInput, SampleSpec, Score,
    ToolResult, ToolView, ToolViewFormat,
};
pub use message::{ChatMessage, MessageRole, ToolCall};
pub use samples::{ActiveSample, ActiveSamples, SampleGuard};
pub use transcript::Transcript;
