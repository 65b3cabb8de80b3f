//! Driven port for announcing user lifecycle events to other services.
use async_trait::async_trait;
use tracing::warn;

use crate::domain::{TraceId, UserEvent};

use super::define_port_error;

define_port_error! {
    /// Errors raised by event publisher adapters.
    pub enum EventPublishError {
        /// The broker connection or channel is not available.
        Unavailable => "event channel is unavailable: {message}",
        /// The event could not be encoded for the wire.
        Encode => "event could not be encoded: {message}",
        /// The broker refused the message.
        Rejected => "event was rejected by the broker: {message}",
    }
}

/// Publishes user events. Failures never roll back the mutation that caused
/// the event.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserEventPublisher: Send + Sync {
    /// Publish one event tagged with the given trace identifier.
    async fn publish<'a>(
        &self,
        event: &UserEvent,
        trace_id: Option<&'a TraceId>,
    ) -> Result<(), EventPublishError>;
}

/// Publisher used when no broker connection could be established.
///
/// Every call logs a warning and drops the event.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledEventPublisher;

#[async_trait]
impl UserEventPublisher for DisabledEventPublisher {
    async fn publish<'a>(
        &self,
        event: &UserEvent,
        trace_id: Option<&'a TraceId>,
    ) -> Result<(), EventPublishError> {
        warn!(
            event_type = event.kind.routing_key(),
            trace_id = trace_id.map(TraceId::as_str),
            "event channel not initialised"
        );
        Ok(())
    }
}
