//! AMQP adapters for the `user_events` topic exchange.
//!
//! The publisher implements the [`UserEventPublisher`] port; the subscriber
//! is a background consumer that logs every event it receives. Both carry
//! the trace identifier in the `trace_id` message header.
//!
//! [`UserEventPublisher`]: crate::domain::ports::UserEventPublisher

use lapin::options::ExchangeDeclareOptions;
use lapin::types::{AMQPValue, FieldTable, ShortString};
use lapin::{Channel, ExchangeKind};

use crate::domain::{TRACE_ID_MESSAGE_HEADER, TraceId};

mod publisher;
mod subscriber;

pub use publisher::AmqpEventPublisher;
pub use subscriber::{DecodedEvent, EventSubscriber, decode_event};

/// Topic exchange shared by every user lifecycle event.
pub const USER_EVENTS_EXCHANGE: &str = "user_events";

/// Errors raised while managing broker resources.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventBusError {
    /// The connection or channel could not be opened.
    #[error("could not connect to broker: {message}")]
    Connect { message: String },
    /// Exchange, queue or binding declaration failed.
    #[error("broker topology declaration failed: {message}")]
    Declare { message: String },
    /// The consumer could not be started.
    #[error("could not start consuming: {message}")]
    Consume { message: String },
    /// Closing the channel or connection failed.
    #[error("could not close broker connection: {message}")]
    Close { message: String },
}

impl EventBusError {
    pub(crate) fn connect(err: impl std::fmt::Display) -> Self {
        Self::Connect {
            message: err.to_string(),
        }
    }

    pub(crate) fn declare(err: impl std::fmt::Display) -> Self {
        Self::Declare {
            message: err.to_string(),
        }
    }

    pub(crate) fn consume(err: impl std::fmt::Display) -> Self {
        Self::Consume {
            message: err.to_string(),
        }
    }

    pub(crate) fn close(err: impl std::fmt::Display) -> Self {
        Self::Close {
            message: err.to_string(),
        }
    }
}

/// Declare the durable topic exchange; idempotent on the broker.
pub(crate) async fn declare_exchange(channel: &Channel, exchange: &str) -> Result<(), EventBusError> {
    channel
        .exchange_declare(
            exchange,
            ExchangeKind::Topic,
            ExchangeDeclareOptions {
                durable: true,
                ..ExchangeDeclareOptions::default()
            },
            FieldTable::default(),
        )
        .await
        .map_err(EventBusError::declare)
}

/// Header table carrying the trace identifier, when one is known.
pub(crate) fn trace_headers(trace_id: Option<&TraceId>) -> FieldTable {
    let mut headers = FieldTable::default();
    if let Some(id) = trace_id {
        headers.insert(
            ShortString::from(TRACE_ID_MESSAGE_HEADER),
            AMQPValue::LongString(id.as_str().into()),
        );
    }
    headers
}

/// Read the trace identifier back out of a header table.
pub(crate) fn trace_id_from_headers(headers: Option<&FieldTable>) -> Option<TraceId> {
    let value = headers?
        .inner()
        .get(&ShortString::from(TRACE_ID_MESSAGE_HEADER))?;
    match value {
        AMQPValue::LongString(text) => {
            TraceId::parse_header(&String::from_utf8_lossy(text.as_bytes()))
        }
        AMQPValue::ShortString(text) => TraceId::parse_header(text.as_str()),
        _ => None,
    }
}
