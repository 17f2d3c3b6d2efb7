pub mod app;
pub mod config;
pub mod format;
pub mod markdown;
pub mod progress;
pub mod render;
pub mod samples_view;
pub mod tasks_view;
pub mod theme;
pub mod transcript_view;
pub mod ui;

pub use app::{run_app, App};
pub use config::{init_logging, load_config, Config};
pub use progress::{Progress, ScaledProgress, PROGRESS_UNITS};
pub use render::{render_event, EventDisplay};
pub use samples_view::SamplesView;
pub use tasks_view::{TaskHandle, TaskOutcome, TaskProfile, TaskSpec, TasksView};
pub use transcript_view::TranscriptView;
