//! Request-scoped trace identifier for correlation across logs and events.
//!
//! `TraceId` is a domain primitive representing a correlation identifier that
//! follows a request (or an inbound broker message) through the system. The
//! HTTP middleware stores it in the request extensions, from where handlers
//! receive it explicitly, and in task-local storage so error constructors and
//! log records deeper in the call chain can pick it up.
//!
//! Tokio task-local variables are not inherited across spawned tasks. Use
//! [`TraceId::scope`] when spawning new tasks to ensure the active trace
//! identifier propagates correctly.

use std::future::Future;
use std::sync::Arc;

use tokio::task_local;
use uuid::Uuid;

/// Inbound HTTP header that may supply a caller-chosen trace identifier.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Outbound HTTP header carrying the trace identifier on every response.
pub const TRACE_ID_HEADER: &str = "x-trace-id";

/// Broker message header carrying the trace identifier across the wire.
pub const TRACE_ID_MESSAGE_HEADER: &str = "trace_id";

/// Longest inbound identifier accepted from a caller.
pub const TRACE_ID_MAX_LEN: usize = 128;

task_local! {
    /// Task-local storage for the current trace identifier.
    pub(crate) static TRACE_ID: TraceId;
}

/// Per-request trace identifier exposed via task-local storage.
///
/// Identifiers are opaque: either a caller-supplied `X-Request-Id` value or a
/// freshly generated UUID v4 rendered as text.
///
/// # Examples
/// ```
/// use user_service::domain::TraceId;
///
/// async fn handler() {
///     if let Some(id) = TraceId::current() {
///         tracing::info!(trace_id = %id, "handling");
///     }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TraceId(Arc<str>);

impl TraceId {
    /// Generate a new random trace identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Arc::from(Uuid::new_v4().to_string()))
    }

    /// Accept a caller-supplied identifier when it is usable as a header value.
    ///
    /// Values must be non-empty after trimming, at most [`TRACE_ID_MAX_LEN`]
    /// characters and consist of visible ASCII only.
    ///
    /// # Examples
    /// ```
    /// use user_service::domain::TraceId;
    ///
    /// assert_eq!(TraceId::parse_header("abc123").map(|id| id.to_string()), Some("abc123".into()));
    /// assert!(TraceId::parse_header("   ").is_none());
    /// ```
    #[must_use]
    pub fn parse_header(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.len() > TRACE_ID_MAX_LEN {
            return None;
        }
        if !trimmed.bytes().all(|byte| byte.is_ascii_graphic()) {
            return None;
        }
        Some(Self(Arc::from(trimmed)))
    }

    /// Use the inbound identifier when valid, otherwise generate a new one.
    #[must_use]
    pub fn from_header_or_generate(value: Option<&str>) -> Self {
        value
            .and_then(Self::parse_header)
            .unwrap_or_else(Self::generate)
    }

    /// Returns the current trace identifier if one is in scope.
    #[must_use]
    pub fn current() -> Option<Self> {
        TRACE_ID.try_with(Clone::clone).ok()
    }

    /// Borrow the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Execute the provided future with the supplied trace identifier in scope.
    ///
    /// # Examples
    /// ```
    /// use user_service::domain::TraceId;
    ///
    /// # tokio::runtime::Runtime::new().unwrap().block_on(async {
    /// let trace_id = TraceId::parse_header("abc123").expect("valid id");
    /// let observed = TraceId::scope(trace_id.clone(), async { TraceId::current() }).await;
    /// assert_eq!(observed, Some(trace_id));
    /// # });
    /// ```
    pub async fn scope<Fut>(trace_id: TraceId, fut: Fut) -> Fut::Output
    where
        Fut: Future,
    {
        TRACE_ID.scope(trace_id, fut).await
    }
}

impl std::fmt::Display for TraceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TraceId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
