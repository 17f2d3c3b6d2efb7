use crate::event::Event;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Append-only event log belonging to one sample's execution.
///
/// The execution engine appends from its own task while views take snapshot
/// reads on refresh ticks, so the event list sits behind a mutex held only for
/// the push or clone itself. Events are never reordered or mutated in place.
#[derive(Debug, Default)]
pub struct Transcript {
    events: Mutex<Vec<Event>>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    fn events(&self) -> MutexGuard<'_, Vec<Event>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn append(&self, event: impl Into<Event>) {
        self.events().push(event.into());
    }

    pub fn len(&self) -> usize {
        self.events().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events().is_empty()
    }

    /// Copy of the full event list as of this call.
    pub fn snapshot(&self) -> Vec<Event> {
        self.events().clone()
    }

    /// Copy of the events at or beyond `start`. Used by incremental consumers
    /// that have already seen the first `start` events.
    pub fn events_from(&self, start: usize) -> Vec<Event> {
        let events = self.events();
        events.get(start..).map(<[Event]>::to_vec).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventKind, LogLevel};

    fn log_event(message: &str) -> EventKind {
        EventKind::Logger {
            level: LogLevel::Info,
            name: String::new(),
            message: message.to_string(),
        }
    }

    #[test]
    fn append_preserves_order() {
        let transcript = Transcript::new();
        transcript.append(log_event("one"));
        transcript.append(log_event("two"));
        transcript.append(log_event("three"));

        let messages: Vec<String> = transcript
            .snapshot()
            .into_iter()
            .map(|event| match event.kind {
                EventKind::Logger { message, .. } => message,
                other => panic!("unexpected event: {other:?}"),
            })
            .collect();
        assert_eq!(messages, ["one", "two", "three"]);
    }

    #[test]
    fn events_from_returns_only_the_suffix() {
        let transcript = Transcript::new();
        for i in 0..5 {
            transcript.append(log_event(&format!("event-{i}")));
        }
        assert_eq!(transcript.events_from(3).len(), 2);
        assert_eq!(transcript.events_from(5).len(), 0);
        assert_eq!(transcript.events_from(9).len(), 0);
    }

    #[test]
    fn snapshot_is_isolated_from_later_appends() {
        let transcript = Transcript::new();
        transcript.append(log_event("first"));
        let snapshot = transcript.snapshot();
        transcript.append(log_event("second"));
        assert_eq!(snapshot.len(), 1);
        assert_eq!(transcript.len(), 2);
    }
}
