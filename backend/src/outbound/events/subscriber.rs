//! Background consumer for the `user_events` exchange.
//!
//! Each delivery is decoded, logged as `event received` inside an `event`
//! span carrying the delivery's trace identifier, and acknowledged.
//! Per-message failures are logged; the loop only ends when the consumer
//! stream does or the task is aborted.

use futures_util::StreamExt;
use lapin::message::Delivery;
use lapin::options::{BasicAckOptions, BasicConsumeOptions, QueueBindOptions, QueueDeclareOptions};
use lapin::types::FieldTable;
use lapin::{Connection, ConnectionProperties, Consumer};
use tokio::task::JoinHandle;
use tracing::{Instrument, error, info, info_span, warn};

use crate::domain::{EventEnvelope, TraceId, UserEventKind};
use crate::outbound::persistence::redact_url;

use super::{EventBusError, declare_exchange, trace_id_from_headers};

const CONSUMER_TAG: &str = "user-service";

/// A delivery reduced to what the handler logs.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedEvent {
    pub trace_id: TraceId,
    pub event_type: String,
    pub user_id: Option<i64>,
    pub envelope: Option<EventEnvelope>,
}

/// Decode one delivery.
///
/// The trace identifier comes from the `trace_id` header, then the envelope
/// field, then a fresh one. Malformed bodies still decode with `envelope`
/// set to `None` so the message can be acknowledged.
pub fn decode_event(routing_key: &str, headers: Option<&FieldTable>, body: &[u8]) -> DecodedEvent {
    let envelope = serde_json::from_slice::<EventEnvelope>(body).ok();
    let trace_id = trace_id_from_headers(headers)
        .or_else(|| {
            envelope
                .as_ref()
                .and_then(|env| env.trace_id.as_deref())
                .and_then(TraceId::parse_header)
        })
        .unwrap_or_else(TraceId::generate);
    DecodedEvent {
        trace_id,
        event_type: routing_key.to_owned(),
        user_id: envelope.as_ref().and_then(EventEnvelope::user_id),
        envelope,
    }
}

async fn handle_delivery(delivery: Delivery) {
    let decoded = decode_event(
        delivery.routing_key.as_str(),
        delivery.properties.headers().as_ref(),
        &delivery.data,
    );
    let span = info_span!("event", trace_id = %decoded.trace_id);
    let trace_id = decoded.trace_id.clone();
    let work = async move {
        if decoded.envelope.is_none() {
            warn!(event_type = %decoded.event_type, "event body is not a valid envelope");
        } else if UserEventKind::from_routing_key(&decoded.event_type).is_none() {
            warn!(event_type = %decoded.event_type, "unrecognised event type");
        }
        info!(
            event_type = %decoded.event_type,
            user_id = decoded.user_id,
            "event received"
        );
        if let Err(err) = delivery.ack(BasicAckOptions::default()).await {
            error!(error = %err, "failed to acknowledge event");
        }
    };
    TraceId::scope(trace_id, work.instrument(span)).await;
}

async fn consume(mut consumer: Consumer) {
    while let Some(next) = consumer.next().await {
        match next {
            Ok(delivery) => handle_delivery(delivery).await,
            Err(err) => error!(error = %err, "error receiving event"),
        }
    }
    info!("event consumer stream ended");
}

/// Running subscriber: the broker connection plus the consuming task.
pub struct EventSubscriber {
    connection: Connection,
    task: JoinHandle<()>,
}

impl EventSubscriber {
    /// Connect, declare the topology, bind every user routing key and start
    /// consuming on a background task.
    ///
    /// # Errors
    ///
    /// Returns [`EventBusError`] when any broker step fails; the service keeps
    /// running without a subscriber.
    pub async fn setup(url: &str, exchange: &str, queue: &str) -> Result<Self, EventBusError> {
        let connection = Connection::connect(url, ConnectionProperties::default())
            .await
            .map_err(EventBusError::connect)?;
        let channel = connection
            .create_channel()
            .await
            .map_err(EventBusError::connect)?;
        declare_exchange(&channel, exchange).await?;
        channel
            .queue_declare(
                queue,
                QueueDeclareOptions {
                    durable: true,
                    ..QueueDeclareOptions::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(EventBusError::declare)?;
        for kind in UserEventKind::ALL {
            channel
                .queue_bind(
                    queue,
                    exchange,
                    kind.routing_key(),
                    QueueBindOptions::default(),
                    FieldTable::default(),
                )
                .await
                .map_err(EventBusError::declare)?;
        }
        let consumer = channel
            .basic_consume(
                queue,
                CONSUMER_TAG,
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(EventBusError::consume)?;
        let task = tokio::spawn(consume(consumer));
        info!(broker = %redact_url(url), exchange, queue, "event subscriber started");
        Ok(Self { connection, task })
    }

    /// Stop consuming and close the connection.
    pub async fn teardown(self) -> Result<(), EventBusError> {
        self.task.abort();
        match self.task.await {
            Ok(()) => {}
            Err(err) if err.is_cancelled() => {}
            Err(err) => warn!(error = %err, "event consumer task failed"),
        }
        if self.connection.status().connected() {
            self.connection
                .close(200, "Bye")
                .await
                .map_err(EventBusError::close)?;
        }
        info!("event subscriber stopped");
        Ok(())
    }
}
