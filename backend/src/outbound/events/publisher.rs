//! AMQP implementation of the `UserEventPublisher` port.

use async_trait::async_trait;
use lapin::options::BasicPublishOptions;
use lapin::publisher_confirm::Confirmation;
use lapin::types::ShortString;
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties};
use tracing::{debug, info, warn};

use crate::domain::ports::{EventPublishError, UserEventPublisher};
use crate::domain::{EventEnvelope, TraceId, UserEvent};
use crate::outbound::persistence::redact_url;

use super::{EventBusError, declare_exchange, trace_headers};

const CONTENT_TYPE_JSON: &str = "application/json";

/// Serialise the wire envelope for `event`.
pub(crate) fn encode_event(
    event: &UserEvent,
    trace_id: Option<&TraceId>,
) -> Result<Vec<u8>, EventPublishError> {
    serde_json::to_vec(&EventEnvelope::from_event(event, trace_id))
        .map_err(|err| EventPublishError::encode(err.to_string()))
}

/// Message properties: JSON content type plus the `trace_id` header.
pub(crate) fn message_properties(trace_id: Option<&TraceId>) -> BasicProperties {
    BasicProperties::default()
        .with_content_type(ShortString::from(CONTENT_TYPE_JSON))
        .with_headers(trace_headers(trace_id))
}

/// Publisher owning one connection and one channel for the process lifetime.
pub struct AmqpEventPublisher {
    connection: Connection,
    channel: Channel,
    exchange: String,
}

impl AmqpEventPublisher {
    /// Connect, open a channel and declare the exchange.
    ///
    /// # Errors
    ///
    /// Returns [`EventBusError`] when the broker is unreachable or refuses the
    /// declaration; callers fall back to the disabled publisher.
    pub async fn connect(url: &str, exchange: &str) -> Result<Self, EventBusError> {
        let connection = Connection::connect(url, ConnectionProperties::default())
            .await
            .map_err(EventBusError::connect)?;
        let channel = connection
            .create_channel()
            .await
            .map_err(EventBusError::connect)?;
        declare_exchange(&channel, exchange).await?;
        info!(broker = %redact_url(url), exchange, "event publisher connected");
        Ok(Self {
            connection,
            channel,
            exchange: exchange.to_owned(),
        })
    }

    /// Close the channel, then the connection. Already-closed resources are
    /// skipped.
    pub async fn close(&self) -> Result<(), EventBusError> {
        if self.channel.status().connected() {
            self.channel
                .close(200, "Bye")
                .await
                .map_err(EventBusError::close)?;
        }
        if self.connection.status().connected() {
            self.connection
                .close(200, "Bye")
                .await
                .map_err(EventBusError::close)?;
        }
        info!("event publisher closed");
        Ok(())
    }
}

#[async_trait]
impl UserEventPublisher for AmqpEventPublisher {
    async fn publish<'a>(
        &self,
        event: &UserEvent,
        trace_id: Option<&'a TraceId>,
    ) -> Result<(), EventPublishError> {
        let routing_key = event.kind.routing_key();
        let payload = encode_event(event, trace_id)?;
        let confirm = self
            .channel
            .basic_publish(
                &self.exchange,
                routing_key,
                BasicPublishOptions::default(),
                &payload,
                message_properties(trace_id),
            )
            .await
            .map_err(|err| EventPublishError::unavailable(err.to_string()))?;
        match confirm
            .await
            .map_err(|err| EventPublishError::unavailable(err.to_string()))?
        {
            Confirmation::Nack(_) => {
                warn!(routing_key, "broker negatively acknowledged event");
                Err(EventPublishError::rejected(format!("{routing_key} was nacked")))
            }
            Confirmation::Ack(_) | Confirmation::NotRequested => {
                debug!(routing_key, bytes = payload.len(), "event handed to broker");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{TRACE_ID_MESSAGE_HEADER, UserId};
    use crate::outbound::events::trace_id_from_headers;
    use rstest::rstest;
    use serde_json::{Value, json};

    #[rstest]
    fn encoded_event_matches_wire_shape() {
        let trace_id = TraceId::parse_header("abc123").expect("valid id");
        let bytes = encode_event(&UserEvent::deleted(UserId::new(5)), Some(&trace_id))
            .expect("encode");
        let value: Value = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(
            value,
            json!({
                "event_type": "user.deleted",
                "data": { "user_id": 5 },
                "trace_id": "abc123"
            })
        );
    }

    #[rstest]
    fn properties_carry_content_type_and_trace_header() {
        let trace_id = TraceId::parse_header("abc123").expect("valid id");
        let props = message_properties(Some(&trace_id));
        assert_eq!(
            props.content_type().as_ref().map(ShortString::as_str),
            Some(CONTENT_TYPE_JSON)
        );
        assert_eq!(trace_id_from_headers(props.headers().as_ref()), Some(trace_id));
    }

    #[rstest]
    fn properties_without_trace_have_no_trace_header() {
        let props = message_properties(None);
        let headers = props.headers().as_ref().expect("headers table present");
        assert!(
            !headers
                .inner()
                .contains_key(&ShortString::from(TRACE_ID_MESSAGE_HEADER))
        );
    }
}
