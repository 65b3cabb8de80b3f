//! HTTP inbound adapter exposing REST endpoints.

use actix_web::web;

pub mod error;
pub mod health;
pub mod schemas;
pub mod state;
pub mod users;

pub use error::ApiResult;

/// Fixed prefix for versioned API routes.
pub const API_PREFIX: &str = "/api/v1";

/// Register extractor error handling and every versioned API route.
///
/// Callers supply `web::Data<HttpState>` themselves.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use user_service::inbound::http::{configure_api, state::HttpState};
///
/// let app = App::new()
///     .app_data(web::Data::new(HttpState::default()))
///     .configure(configure_api);
/// ```
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.app_data(error::json_config())
        .app_data(error::query_config())
        .app_data(error::path_config())
        .service(web::scope(API_PREFIX).configure(users::configure));
}
