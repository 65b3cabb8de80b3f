//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`UserRepository`, `UserEventPublisher`) expose strongly typed
//! errors so adapters map their failures into predictable variants. The
//! driving port (`UserManagement`) speaks the domain [`Error`](crate::domain::Error).

mod macros;
pub(crate) use macros::define_port_error;

mod user_event_publisher;
mod user_management;
mod user_repository;

#[cfg(test)]
pub use user_event_publisher::MockUserEventPublisher;
pub use user_event_publisher::{DisabledEventPublisher, EventPublishError, UserEventPublisher};
#[cfg(test)]
pub use user_management::MockUserManagement;
pub use user_management::{FixtureUserManagement, UserManagement};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
