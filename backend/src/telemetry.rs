//! Structured JSON logging.
//!
//! Records are emitted as one JSON object per line with event fields at the
//! top level. Fields of the innermost active span (notably `trace_id` on the
//! `request`, `event` and `event_publish` spans) appear under a nested
//! `"span"` object.

use tracing::{Level, Subscriber, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::util::SubscriberInitExt;

/// Parse a level name case-insensitively.
///
/// Accepts `trace`, `debug`, `info`, `warn`/`warning` and
/// `error`/`critical`/`fatal`; anything else yields `INFO`.
///
/// # Examples
/// ```
/// use tracing::Level;
/// use user_service::telemetry::parse_level;
///
/// assert_eq!(parse_level("WARNING"), Level::WARN);
/// assert_eq!(parse_level("chatty"), Level::INFO);
/// ```
pub fn parse_level(name: &str) -> Level {
    match name.trim().to_ascii_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" | "warning" => Level::WARN,
        "error" | "critical" | "fatal" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Build the JSON subscriber used by the service, writing to `writer`.
pub fn json_subscriber<W>(filter: EnvFilter, writer: W) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_current_span(true)
        .with_span_list(false)
        .flatten_event(true)
        .with_writer(writer)
        .finish()
}

/// Install the global JSON subscriber filtered at `level`.
///
/// `RUST_LOG` directives, when present, refine the filter. A second call, or
/// a subscriber installed elsewhere, is reported as a warning.
pub fn init_tracing(level: &str) {
    let default_level = LevelFilter::from_level(parse_level(level));
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();
    let result = json_subscriber(filter, std::io::stdout).try_init();
    if let Err(error) = result {
        warn!(%error, "tracing subscriber already initialised");
    }
}
