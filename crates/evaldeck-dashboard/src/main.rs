use anyhow::Result;
use evaldeck_core::event::{
    EventKind, LogLevel, SampleInput, SampleSpec, Score, ToolResult,
};
use evaldeck_core::message::ChatMessage;
use evaldeck_core::samples::{ActiveSample, ActiveSamples};
use evaldeck_dashboard::progress::Progress;
use evaldeck_dashboard::{
    config, run_app, TaskHandle, TaskOutcome, TaskProfile, TaskSpec, TasksView,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::info;

/// Preview harness: drives the dashboard with a scripted in-process engine so
/// the full pipeline (registry, transcripts, renderer, progress) can be
/// exercised without a real evaluation run.
#[tokio::main]
async fn main() -> Result<()> {
    let config = config::load_config();
    config::init_logging(&config);

    let registry = ActiveSamples::new();
    let mut tasks = TasksView::new();
    let specs = [
        TaskSpec {
            name: "popularity".to_string(),
            model: "mockllm/model".to_string(),
        },
        TaskSpec {
            name: "security-guide".to_string(),
            model: "mockllm/model".to_string(),
        },
    ];
    tasks.init_tasks(&specs);
    tasks.set_config(&[
        ("epochs".to_string(), "1".to_string()),
        ("temperature".to_string(), "0.7".to_string()),
        ("max_tokens".to_string(), "2048".to_string()),
    ]);

    let popularity = tasks.add_task(TaskProfile {
        name: "popularity".to_string(),
        model: "mockllm/model".to_string(),
        steps: PROMPTS.len(),
    });
    let security = tasks.add_task(TaskProfile {
        name: "security-guide".to_string(),
        model: "mockllm/model".to_string(),
        steps: GUIDES.len(),
    });

    let engine = scripted_run(registry.clone(), popularity, security);
    if let Err(err) = run_app("evaldeck preview", registry, tasks, engine, config).await {
        eprintln!("evaldeck: {err}");
    }
    Ok(())
}

const PROMPTS: &[(&str, &str, &str)] = &[
    (
        "Is the Rust programming language generally well liked? Answer yes or no.",
        "yes",
        "yes",
    ),
    (
        "Is assembly the most popular first language? Answer yes or no.",
        "no",
        "no",
    ),
    (
        "Do most developers enjoy writing build scripts? Answer yes or no.",
        "no",
        "yes",
    ),
];

const GUIDES: &[(&str, &str)] = &[
    (
        "What should a team do before enabling SSH password login?",
        "Disable it and use key-based authentication instead.",
    ),
    (
        "Name one reason to pin dependency versions in CI.",
        "Reproducible builds that cannot drift under a release.",
    ),
];

async fn scripted_run(
    registry: ActiveSamples,
    popularity: TaskHandle,
    security: TaskHandle,
) -> Result<()> {
    info!(event = "scripted_run_start");
    let mut workers = Vec::new();

    for (index, &(prompt, target, answer)) in PROMPTS.iter().enumerate() {
        let registry = registry.clone();
        let handle = popularity.clone();
        workers.push(tokio::spawn(async move {
            run_popularity_sample(registry, handle, index, prompt, target, answer).await;
        }));
        sleep(Duration::from_millis(350)).await;
    }

    for (index, &(prompt, answer)) in GUIDES.iter().enumerate() {
        let registry = registry.clone();
        let handle = security.clone();
        workers.push(tokio::spawn(async move {
            run_guide_sample(registry, handle, index, prompt, answer).await;
        }));
        sleep(Duration::from_millis(500)).await;
    }

    for worker in workers {
        worker.await?;
    }
    popularity.finish(TaskOutcome::Success);
    security.finish(TaskOutcome::Error);
    info!(event = "scripted_run_done");

    // Hold the final screen briefly before the app exits with the result.
    sleep(Duration::from_secs(3)).await;
    Ok(())
}

async fn run_popularity_sample(
    registry: ActiveSamples,
    task: TaskHandle,
    index: usize,
    prompt: &'static str,
    target: &'static str,
    answer: &'static str,
) {
    let pace = Duration::from_millis(400 + (index as u64 % 3) * 250);
    let sample = ActiveSample::new(
        "popularity",
        "mockllm/model",
        1,
        SampleSpec {
            id: format!("popularity-{}", index + 1),
            input: SampleInput::Text(prompt.to_string()),
            target: Some(target.to_string()),
        },
    );
    info!(event = "sample_start", task = "popularity", id = %sample.id());
    let guard = registry.enter(Arc::clone(&sample));
    let sample = guard.sample();

    sample.transcript().append(EventKind::SampleInit {
        sample: sample.sample().clone(),
    });
    sleep(pace).await;

    sample.transcript().append(EventKind::Step {
        step_type: Some("solver".to_string()),
        name: "generate".to_string(),
    });
    sample.transcript().append(EventKind::Model {
        model: "mockllm/model".to_string(),
        input: vec![
            ChatMessage::system("Answer with a single word."),
            ChatMessage::user(prompt),
        ],
        output: ChatMessage::assistant(answer),
    });
    sleep(pace).await;

    sample.transcript().append(EventKind::Step {
        step_type: Some("scorer".to_string()),
        name: "match".to_string(),
    });
    let correct = answer == target;
    sample.transcript().append(EventKind::Score {
        target: target.to_string(),
        score: Score {
            value: json!(if correct { "C" } else { "I" }),
            answer: Some(answer.to_string()),
            explanation: (!correct).then(|| format!("expected {target}")),
        },
    });
    sleep(pace).await;

    task.update(1);
    info!(event = "sample_done", task = "popularity", id = %sample.id());
}

async fn run_guide_sample(
    registry: ActiveSamples,
    task: TaskHandle,
    index: usize,
    prompt: &'static str,
    answer: &'static str,
) {
    let pace = Duration::from_millis(600 + (index as u64 % 2) * 300);
    let sample = ActiveSample::new(
        "security-guide",
        "mockllm/model",
        1,
        SampleSpec {
            id: format!("guide-{}", index + 1),
            input: SampleInput::Text(prompt.to_string()),
            target: None,
        },
    );
    info!(event = "sample_start", task = "security-guide", id = %sample.id());
    let guard = registry.enter(Arc::clone(&sample));
    let sample = guard.sample();

    sample.transcript().append(EventKind::SampleInit {
        sample: sample.sample().clone(),
    });
    sleep(pace).await;

    sample.transcript().append(EventKind::Tool {
        function: "search_docs".to_string(),
        arguments: json!({"query": prompt}),
        view: None,
        result: ToolResult::Text("3 matching hardening guides found".to_string()),
    });
    sample.transcript().append(EventKind::Logger {
        level: LogLevel::Info,
        name: String::new(),
        message: format!("retrieved context for guide {}", index + 1),
    });
    sleep(pace).await;

    sample.transcript().append(EventKind::Model {
        model: "mockllm/model".to_string(),
        input: vec![ChatMessage::user(prompt)],
        output: ChatMessage::assistant(answer),
    });
    sleep(pace).await;

    // The last guide sample fails while scoring; the dashboard keeps the
    // trace visible and the registry still releases the sample.
    if index + 1 == GUIDES.len() {
        sample.transcript().append(EventKind::Error {
            traceback: format!(
                "Traceback (most recent call last):\n  scorer for guide-{}\nValueError: empty rubric",
                index + 1
            ),
        });
    } else {
        sample.transcript().append(EventKind::Score {
            target: "rubric".to_string(),
            score: Score {
                value: json!(1),
                answer: Some(answer.to_string()),
                explanation: None,
            },
        });
    }
    sleep(pace).await;

    task.update(1);
    info!(event = "sample_done", task = "security-guide", id = %sample.id());
}
