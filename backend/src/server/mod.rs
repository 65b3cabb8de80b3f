//! Server construction and middleware wiring.

mod config;

pub use config::ServerConfig;

use actix_cors::Cors;
use actix_web::body::{BoxBody, EitherBody};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use utoipa_swagger_ui::SwaggerUi;

use user_service::ApiDoc;
use user_service::Trace;
use user_service::inbound::http::configure_api;
use user_service::inbound::http::health::{HealthState, live, ready};
use user_service::inbound::http::state::HttpState;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    openapi: utoipa::openapi::OpenApi,
}

/// Any origin, method and header is accepted.
fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allow_any_method()
        .allow_any_header()
        .send_wildcard()
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<EitherBody<BoxBody>>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        openapi,
    } = deps;

    App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(cors())
        .wrap(Trace)
        .configure(configure_api)
        .service(ready)
        .service(live)
        .service(SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", openapi))
}

/// Construct an Actix HTTP server and mark the process ready.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let ServerConfig {
        bind_addr,
        app_name,
    } = config;
    let deps = AppDependencies {
        health_state: health_state.clone(),
        http_state,
        openapi: ApiDoc::titled(&app_name),
    };

    let server = HttpServer::new(move || build_app(deps.clone()))
        .bind(bind_addr)?
        .run();

    health_state.mark_ready();
    Ok(server)
}

#[cfg(test)]
mod tests;
