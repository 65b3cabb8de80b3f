//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed user repository using Diesel ORM
//! - **events**: AMQP publisher and subscriber for the `user_events` exchange
//!
//! Adapters are thin translators between domain types and infrastructure
//! representations. They contain no business logic.

pub mod events;
pub mod persistence;
