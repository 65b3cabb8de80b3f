//! Thread-local capture of the service's JSON log records.

use std::io;
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Value;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::EnvFilter;

use crate::telemetry::json_subscriber;

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    fn snapshot(&self) -> Vec<u8> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl io::Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Routes every record emitted on the current thread through the production
/// JSON formatter into memory until dropped.
///
/// Tasks spawned on a current-thread runtime are captured too.
pub struct LogCapture {
    buffer: SharedBuffer,
    _guard: DefaultGuard,
}

impl LogCapture {
    /// Start capturing at `TRACE` level.
    #[must_use]
    pub fn start() -> Self {
        let buffer = SharedBuffer::default();
        let writer = buffer.clone();
        let subscriber = json_subscriber(EnvFilter::new("trace"), move || writer.clone());
        let guard = tracing::subscriber::set_default(subscriber);
        Self {
            buffer,
            _guard: guard,
        }
    }

    /// Every record captured so far, parsed as JSON.
    #[must_use]
    pub fn records(&self) -> Vec<Value> {
        String::from_utf8_lossy(&self.buffer.snapshot())
            .lines()
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect()
    }

    /// First record whose `message` equals `message`.
    #[must_use]
    pub fn find(&self, message: &str) -> Option<Value> {
        self.records()
            .into_iter()
            .find(|record| record.get("message").and_then(Value::as_str) == Some(message))
    }
}
