//! Domain primitives, aggregates, ports and services.
//!
//! Purpose: define strongly typed domain entities used by the HTTP and
//! persistence adapters, plus the use-case service that ties them together.
//! Nothing in here depends on Actix, Diesel or the broker client.
//!
//! Public surface:
//! - Error / ErrorCode — transport agnostic failure taxonomy.
//! - TraceId — request-scoped correlation identifier.
//! - User, UserId, NewUser, UserChanges, Page — the user aggregate.
//! - UserEvent, UserEventKind, EventEnvelope — lifecycle events.
//! - UserService — implementation of the `UserManagement` driving port.

pub mod error;
pub mod event_notifier;
pub mod ports;
pub mod trace_id;
pub mod user;
pub mod user_events;
pub mod user_service;

pub use self::error::{Error, ErrorCode};
pub use self::trace_id::{
    REQUEST_ID_HEADER, TRACE_ID_HEADER, TRACE_ID_MAX_LEN, TRACE_ID_MESSAGE_HEADER, TraceId,
};
pub use self::user::{DEFAULT_PAGE_LIMIT, NewUser, Page, Password, User, UserChanges, UserId};
pub use self::user_events::{EventEnvelope, UserEvent, UserEventData, UserEventKind};
pub use self::user_service::UserService;

