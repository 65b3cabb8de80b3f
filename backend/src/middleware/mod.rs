//! Request middleware.
//!
//! Purpose: define middleware components for request lifecycle concerns such
//! as trace propagation and request completion logging.

pub mod trace;

pub use trace::Trace;
