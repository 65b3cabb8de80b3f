//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    DisabledEventPublisher, FixtureUserManagement, UserEventPublisher, UserManagement,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// User CRUD use-cases.
    pub users: Arc<dyn UserManagement>,
    /// Destination for post-commit lifecycle events.
    pub events: Arc<dyn UserEventPublisher>,
}

impl HttpState {
    /// Construct state from the driving port and the event publisher.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use user_service::domain::ports::{DisabledEventPublisher, FixtureUserManagement};
    /// use user_service::inbound::http::state::HttpState;
    ///
    /// let state = HttpState::new(Arc::new(FixtureUserManagement), Arc::new(DisabledEventPublisher));
    /// let _users = state.users.clone();
    /// ```
    pub fn new(users: Arc<dyn UserManagement>, events: Arc<dyn UserEventPublisher>) -> Self {
        Self { users, events }
    }
}

impl Default for HttpState {
    fn default() -> Self {
        Self::new(Arc::new(FixtureUserManagement), Arc::new(DisabledEventPublisher))
    }
}
