//! Best-effort delivery of user events after a mutation has committed.

use std::sync::Arc;

use tracing::{Instrument, error, info, info_span};

use crate::domain::ports::UserEventPublisher;
use crate::domain::{TraceId, UserEvent};

/// Publish `event`, logging the outcome. Never fails.
///
/// Callers run this after the originating write has committed, so a broker
/// failure cannot undo the mutation or change the caller's response.
pub async fn notify(
    publisher: Arc<dyn UserEventPublisher>,
    event: UserEvent,
    trace_id: Option<TraceId>,
) {
    let event_type = event.kind.routing_key();
    let user_id = event.data.user_id;
    let trace = trace_id.as_ref().map(TraceId::as_str);
    match publisher.publish(&event, trace_id.as_ref()).await {
        Ok(()) => info!(event_type, user_id, trace_id = trace, "event published"),
        Err(err) => error!(
            event_type,
            user_id,
            trace_id = trace,
            error = %err,
            "error publishing event"
        ),
    }
}

/// Spawn [`notify`] on the current runtime inside the given trace scope.
///
/// The task runs under an `event_publish` span carrying the trace id, so
/// adapter logs emitted while publishing are correlated with the request.
pub fn spawn_notify(
    publisher: Arc<dyn UserEventPublisher>,
    event: UserEvent,
    trace_id: Option<TraceId>,
) -> tokio::task::JoinHandle<()> {
    match trace_id {
        Some(id) => {
            let span = info_span!("event_publish", trace_id = %id);
            let work = notify(publisher, event, Some(id.clone())).instrument(span);
            tokio::spawn(TraceId::scope(id, work))
        }
        None => {
            let work = notify(publisher, event, None).instrument(info_span!("event_publish"));
            tokio::spawn(work)
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ports::{EventPublishError, MockUserEventPublisher};
    use crate::domain::{UserEventKind, UserId};
    use crate::test_support::LogCapture;
    use rstest::rstest;
    use tracing::debug;

    #[rstest]
    #[tokio::test]
    async fn notify_passes_trace_id_to_publisher() {
        let mut publisher = MockUserEventPublisher::new();
        publisher
            .expect_publish()
            .withf(|event, trace_id| {
                event.kind == UserEventKind::Deleted
                    && trace_id.map(TraceId::as_str) == Some("abc123")
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let trace_id = TraceId::parse_header("abc123").expect("valid id");
        notify(
            Arc::new(publisher),
            UserEvent::deleted(UserId::new(1)),
            Some(trace_id),
        )
        .await;
    }

    #[rstest]
    #[tokio::test]
    async fn notify_swallows_publish_failures() {
        let mut publisher = MockUserEventPublisher::new();
        publisher
            .expect_publish()
            .times(1)
            .returning(|_, _| Err(EventPublishError::unavailable("closed")));

        notify(Arc::new(publisher), UserEvent::deleted(UserId::new(1)), None).await;
    }

    #[rstest]
    #[tokio::test]
    async fn spawned_notify_observes_trace_scope() {
        let mut publisher = MockUserEventPublisher::new();
        publisher
            .expect_publish()
            .withf(|_, _| TraceId::current().map(|id| id.to_string()) == Some("req-9".into()))
            .times(1)
            .returning(|_, _| Ok(()));

        let trace_id = TraceId::parse_header("req-9").expect("valid id");
        spawn_notify(
            Arc::new(publisher),
            UserEvent::deleted(UserId::new(2)),
            Some(trace_id),
        )
        .await
        .expect("task completes");
    }

    #[rstest]
    #[tokio::test]
    async fn spawned_publish_logs_carry_trace_id() {
        let logs = LogCapture::start();
        let mut publisher = MockUserEventPublisher::new();
        publisher.expect_publish().times(1).returning(|_, _| {
            debug!("adapter publishing");
            Ok(())
        });

        let trace_id = TraceId::parse_header("abc123").expect("valid id");
        spawn_notify(
            Arc::new(publisher),
            UserEvent::deleted(UserId::new(3)),
            Some(trace_id),
        )
        .await
        .expect("task completes");

        let published = logs.find("event published").expect("outcome logged");
        assert_eq!(published["trace_id"], "abc123");
        assert_eq!(published["event_type"], "user.deleted");
        assert_eq!(published["span"]["trace_id"], "abc123");
        let adapter = logs.find("adapter publishing").expect("adapter log captured");
        assert_eq!(adapter["span"]["name"], "event_publish");
        assert_eq!(adapter["span"]["trace_id"], "abc123");
    }

    #[rstest]
    #[tokio::test]
    async fn publish_failures_are_logged_with_trace_id() {
        let logs = LogCapture::start();
        let mut publisher = MockUserEventPublisher::new();
        publisher
            .expect_publish()
            .returning(|_, _| Err(EventPublishError::unavailable("closed")));

        let trace_id = TraceId::parse_header("req-7").expect("valid id");
        notify(
            Arc::new(publisher),
            UserEvent::deleted(UserId::new(1)),
            Some(trace_id),
        )
        .await;

        let failure = logs.find("error publishing event").expect("failure logged");
        assert_eq!(failure["level"], "ERROR");
        assert_eq!(failure["trace_id"], "req-7");
    }
}
