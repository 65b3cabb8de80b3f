//! Tests for server construction, covering readiness signalling and the
//! routes mounted on the application.

use super::{AppDependencies, ServerConfig, build_app, create_server};
use actix_web::http::{Method, StatusCode, header};
use actix_web::{test as actix_test, web};
use rstest::{fixture, rstest};
use user_service::ApiDoc;
use user_service::inbound::http::health::HealthState;
use user_service::inbound::http::state::HttpState;

#[fixture]
fn health_state() -> web::Data<HealthState> {
    web::Data::new(HealthState::new())
}

#[fixture]
fn deps(health_state: web::Data<HealthState>) -> AppDependencies {
    AppDependencies {
        health_state,
        http_state: web::Data::new(HttpState::default()),
        openapi: ApiDoc::titled("users-under-test"),
    }
}

#[rstest]
#[actix_rt::test]
async fn create_server_marks_ready(health_state: web::Data<HealthState>) {
    assert!(!health_state.is_ready(), "state should start unready");

    let bind_addr = ServerConfig::parse_bind_addr("127.0.0.1:0").expect("valid address");
    let _server = create_server(
        health_state.clone(),
        web::Data::new(HttpState::default()),
        ServerConfig::new(bind_addr, "users-under-test"),
    )
    .expect("server should build");

    assert!(
        health_state.is_ready(),
        "server creation should mark readiness"
    );
}

#[rstest]
fn rejects_malformed_bind_addr() {
    let err = ServerConfig::parse_bind_addr("not-an-address").expect_err("invalid");
    assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
}

#[rstest]
#[actix_rt::test]
async fn probes_carry_trace_header(deps: AppDependencies) {
    deps.health_state.mark_ready();
    let app = actix_test::init_service(build_app(deps)).await;

    for path in ["/health/ready", "/health/live"] {
        let res = actix_test::call_service(&app, actix_test::TestRequest::get().uri(path).to_request())
            .await;
        assert!(res.status().is_success(), "{path} should succeed");
        assert!(res.headers().contains_key("x-trace-id"));
    }
}

#[rstest]
#[actix_rt::test]
async fn openapi_document_uses_configured_title(deps: AppDependencies) {
    let app = actix_test::init_service(build_app(deps)).await;
    let req = actix_test::TestRequest::get()
        .uri("/api-docs/openapi.json")
        .to_request();
    let body: serde_json::Value = actix_test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["info"]["title"], "users-under-test");
    assert!(body["paths"]["/api/v1/users/{id}"].is_object());
}

#[rstest]
#[actix_rt::test]
async fn preflight_allows_any_origin(deps: AppDependencies) {
    let app = actix_test::init_service(build_app(deps)).await;
    let req = actix_test::TestRequest::default()
        .method(Method::OPTIONS)
        .uri("/api/v1/users")
        .insert_header((header::ORIGIN, "https://frontend.example"))
        .insert_header((header::ACCESS_CONTROL_REQUEST_METHOD, "POST"))
        .insert_header((header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type"))
        .to_request();
    let res = actix_test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::OK);
    let allowed_origin = res
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .and_then(|value| value.to_str().ok());
    assert_eq!(allowed_origin, Some("*"));
    assert!(res.headers().contains_key(header::ACCESS_CONTROL_ALLOW_METHODS));
    assert!(res.headers().contains_key("x-trace-id"));
}

#[rstest]
#[actix_rt::test]
async fn simple_requests_gain_cors_headers(deps: AppDependencies) {
    deps.health_state.mark_ready();
    let app = actix_test::init_service(build_app(deps)).await;
    let req = actix_test::TestRequest::get()
        .uri("/health/live")
        .insert_header((header::ORIGIN, "https://frontend.example"))
        .to_request();
    let res = actix_test::call_service(&app, req).await;

    assert!(res.status().is_success());
    assert!(res.headers().contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}
