//! In-memory port implementations for tests.
//!
//! Compiled for unit tests and, through the `test-support` feature, for the
//! integration suites under `tests/`.

mod clock;
mod in_memory_users;
mod logs;
mod recording_events;

pub use clock::MutableClock;
pub use in_memory_users::InMemoryUserRepository;
pub use logs::LogCapture;
pub use recording_events::{RecordedEvent, RecordingEventPublisher};
