//! Tracing middleware attaching a request-scoped trace identifier.
//!
//! Each incoming request takes its `trace_id` from `X-Request-Id` when the
//! caller supplied a usable value, otherwise a fresh UUID. The identifier is
//! stored in the request extensions (see the [`TraceId`] extractor), in
//! task-local storage for error constructors, and on a `request` span so
//! every log record emitted while handling the request carries it.
//!
//! Tokio task-local variables are not inherited across spawned tasks. Use
//! [`TraceId::scope`] when spawning new tasks or moving work onto blocking
//! threads to ensure the active trace identifier propagates correctly.

use std::convert::Infallible;
use std::time::Instant;

use actix_service::forward_ready;
use actix_web::dev::{Payload, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::error::InternalError;
use actix_web::http::StatusCode;
use actix_web::http::header::{HeaderMap, HeaderName, HeaderValue};
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::{Instrument, error, info, info_span};

use crate::domain::{REQUEST_ID_HEADER, TRACE_ID_HEADER, TraceId};

/// Tracing middleware attaching a request-scoped identifier and adding an
/// `X-Trace-Id` header to every response.
///
/// Handlers can read the trace ID explicitly via the [`TraceId`] extractor or
/// implicitly via [`TraceId::current`].
///
/// # Examples
/// ```
/// use actix_web::App;
/// use user_service::Trace;
///
/// let app = App::new().wrap(Trace);
/// ```
#[derive(Clone)]
pub struct Trace;

impl<S, B> Transform<S, ServiceRequest> for Trace
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = TraceMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TraceMiddleware { service }))
    }
}

/// Service wrapper produced by [`Trace`].
///
/// Applications should not use this type directly.
pub struct TraceMiddleware<S> {
    service: S,
}

fn inbound_trace_id(req: &ServiceRequest) -> TraceId {
    let raw = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok());
    TraceId::from_header_or_generate(raw)
}

fn insert_trace_header(headers: &mut HeaderMap, trace_id: &TraceId) {
    match HeaderValue::from_str(trace_id.as_str()) {
        Ok(value) => {
            headers.insert(HeaderName::from_static(TRACE_ID_HEADER), value);
        }
        Err(error) => {
            error!(%error, trace_id = %trace_id, "failed to encode trace identifier header");
        }
    }
}

fn log_completion(method: &str, path: &str, status: StatusCode, started: Instant) {
    info!(
        %method,
        %path,
        status = status.as_u16(),
        duration_ms = started.elapsed().as_secs_f64() * 1000.0,
        "request completed"
    );
}

impl<S, B> Service<ServiceRequest> for TraceMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let started = Instant::now();
        let trace_id = inbound_trace_id(&req);
        req.extensions_mut().insert(trace_id.clone());

        let method = req.method().to_string();
        let path = req.path().to_owned();
        let span = info_span!("request", trace_id = %trace_id);

        // Routing needs sole ownership of the request head, so no handle to
        // the request may outlive this call.
        let fut = {
            let _entered = span.enter();
            self.service.call(req)
        };

        let scoped_id = trace_id.clone();
        let handled = async move {
            match fut.await {
                Ok(mut res) => {
                    insert_trace_header(res.response_mut().headers_mut(), &trace_id);
                    log_completion(&method, &path, res.status(), started);
                    Ok(res)
                }
                Err(err) => {
                    let mut response = err.error_response();
                    insert_trace_header(response.headers_mut(), &trace_id);
                    error!(error = %err, %method, %path, "request failed");
                    log_completion(&method, &path, response.status(), started);
                    Err(InternalError::from_response(err, response).into())
                }
            }
        };
        Box::pin(TraceId::scope(scoped_id, handled.instrument(span)))
    }
}

/// Explicit access to the identifier the middleware stored for this request.
///
/// Falls back to the task-local identifier, then to a fresh one, so handlers
/// mounted without [`Trace`] still receive a usable value.
impl FromRequest for TraceId {
    type Error = Infallible;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let trace_id = req
            .extensions()
            .get::<TraceId>()
            .cloned()
            .or_else(TraceId::current)
            .unwrap_or_else(TraceId::generate);
        ready(Ok(trace_id))
    }
}
