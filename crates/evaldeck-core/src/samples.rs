use crate::event::SampleSpec;
use crate::transcript::Transcript;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// One in-flight evaluation unit: identity, payload, timing, and its owned
/// transcript. Shared between the owning engine task (which appends events)
/// and the dashboard (which reads snapshots), hence the `Arc` construction.
#[derive(Debug)]
pub struct ActiveSample {
    id: String,
    task: String,
    model: String,
    epoch: u32,
    sample: SampleSpec,
    started: Instant,
    completed: Mutex<Option<Instant>>,
    transcript: Transcript,
}

impl ActiveSample {
    pub fn new(
        task: impl Into<String>,
        model: impl Into<String>,
        epoch: u32,
        sample: SampleSpec,
    ) -> Arc<Self> {
        Arc::new(Self {
            id: Uuid::new_v4().to_string(),
            task: task.into(),
            model: model.into(),
            epoch,
            sample,
            started: Instant::now(),
            completed: Mutex::new(None),
            transcript: Transcript::new(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn task(&self) -> &str {
        &self.task
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn epoch(&self) -> u32 {
        self.epoch
    }

    pub fn sample(&self) -> &SampleSpec {
        &self.sample
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    fn completed(&self) -> MutexGuard<'_, Option<Instant>> {
        self.completed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_completed(&self) -> bool {
        self.completed().is_some()
    }

    /// Elapsed execution time: frozen at completion for finished samples,
    /// still growing with the wall clock for running ones.
    pub fn execution_time(&self) -> Duration {
        let end = self.completed().unwrap_or_else(Instant::now);
        end.saturating_duration_since(self.started)
    }

    fn mark_completed(&self) {
        let mut completed = self.completed();
        if completed.is_none() {
            *completed = Some(Instant::now());
        }
    }
}

/// Process-wide set of samples currently executing. An injected service
/// object rather than a global: tests and runs get fresh, isolated instances.
/// Cloning shares the same underlying set.
#[derive(Debug, Clone, Default)]
pub struct ActiveSamples {
    entries: Arc<Mutex<Vec<Arc<ActiveSample>>>>,
}

impl ActiveSamples {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, Vec<Arc<ActiveSample>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Clear all entries. Called once per run start.
    pub fn init(&self) {
        self.entries().clear();
    }

    /// Register a sample as active for the lifetime of the returned guard.
    /// Dropping the guard (normal return, error propagation, panic, or task
    /// cancellation) stamps the completion time and removes the entry.
    pub fn enter(&self, sample: Arc<ActiveSample>) -> SampleGuard {
        self.entries().push(Arc::clone(&sample));
        SampleGuard {
            registry: self.clone(),
            sample,
        }
    }

    /// Snapshot of the currently active samples. Safe to iterate while
    /// entries are added or removed concurrently.
    pub fn list(&self) -> Vec<Arc<ActiveSample>> {
        self.entries().clone()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

/// Scoped registration of one sample. Holds the registry handle so the exit
/// bookkeeping runs on every path out of the guarded work.
#[derive(Debug)]
pub struct SampleGuard {
    registry: ActiveSamples,
    sample: Arc<ActiveSample>,
}

impl SampleGuard {
    pub fn sample(&self) -> &Arc<ActiveSample> {
        &self.sample
    }
}

impl Drop for SampleGuard {
    fn drop(&mut self) {
        // Stamp completion while holding the registry lock so a snapshot
        // reader never observes a removed-but-uncompleted (or the reverse)
        // half state.
        let mut entries = self.registry.entries();
        self.sample.mark_completed();
        entries.retain(|entry| !Arc::ptr_eq(entry, &self.sample));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::SampleInput;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    fn sample(task: &str) -> Arc<ActiveSample> {
        ActiveSample::new(
            task,
            "mockllm/model",
            1,
            SampleSpec {
                id: "sample-1".to_string(),
                input: SampleInput::Text("input".to_string()),
                target: None,
            },
        )
    }

    #[test]
    fn enter_registers_and_drop_unregisters() {
        let registry = ActiveSamples::new();
        let sample = sample("popularity");
        {
            let guard = registry.enter(Arc::clone(&sample));
            assert_eq!(registry.len(), 1);
            assert_eq!(guard.sample().id(), sample.id());
            assert!(!sample.is_completed());
        }
        assert!(registry.is_empty());
        assert!(sample.is_completed());
    }

    #[test]
    fn completion_is_stamped_even_when_guarded_work_panics() {
        let registry = ActiveSamples::new();
        let sample = sample("security-guide");
        let result = catch_unwind(AssertUnwindSafe(|| {
            let _guard = registry.enter(Arc::clone(&sample));
            panic!("solver failed");
        }));
        assert!(result.is_err());
        assert!(registry.is_empty());
        assert!(sample.is_completed());
    }

    #[test]
    fn execution_time_freezes_at_completion() {
        let registry = ActiveSamples::new();
        let sample = sample("popularity");
        drop(registry.enter(Arc::clone(&sample)));

        let first = sample.execution_time();
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(sample.execution_time(), first);
    }

    #[test]
    fn execution_time_grows_while_running() {
        let sample = sample("popularity");
        let first = sample.execution_time();
        std::thread::sleep(Duration::from_millis(5));
        assert!(sample.execution_time() > first);
    }

    #[test]
    fn list_returns_an_isolated_snapshot() {
        let registry = ActiveSamples::new();
        let _first = registry.enter(sample("popularity"));
        let snapshot = registry.list();
        let _second = registry.enter(sample("security-guide"));
        assert_eq!(snapshot.len(), 1);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn init_clears_all_entries() {
        let registry = ActiveSamples::new();
        let guard = registry.enter(sample("popularity"));
        registry.init();
        assert!(registry.is_empty());
        // A cleared guard still completes its sample without panicking.
        drop(guard);
        assert!(registry.is_empty());
    }
}
