//! `UserEventPublisher` that remembers what it was asked to publish.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::ports::{EventPublishError, UserEventPublisher};
use crate::domain::{TraceId, UserEvent};

/// One captured publish call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEvent {
    pub event: UserEvent,
    pub trace_id: Option<TraceId>,
}

/// Recording publisher; optionally fails every call after recording it.
#[derive(Default)]
pub struct RecordingEventPublisher {
    events: Mutex<Vec<RecordedEvent>>,
    fail_with: Option<EventPublishError>,
}

impl RecordingEventPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publisher that records, then returns `error`.
    pub fn failing(error: EventPublishError) -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            fail_with: Some(error),
        }
    }

    /// Snapshot of recorded calls in publish order.
    pub fn events(&self) -> Vec<RecordedEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl UserEventPublisher for RecordingEventPublisher {
    async fn publish<'a>(
        &self,
        event: &UserEvent,
        trace_id: Option<&'a TraceId>,
    ) -> Result<(), EventPublishError> {
        let recorded = RecordedEvent {
            event: event.clone(),
            trace_id: trace_id.cloned(),
        };
        self.events
            .lock()
            .map_err(|_| EventPublishError::rejected("recorder poisoned"))?
            .push(recorded);
        match &self.fail_with {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}
