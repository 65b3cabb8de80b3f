//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every user and health endpoint together with the
//! request, response and error schemas they exchange. The binary overrides the
//! title with the configured application name before serving Swagger UI.

use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::users::{CreateUserRequest, UpdateUserRequest, UserResponse};
use utoipa::OpenApi;

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "User management API",
        description = "CRUD over users with lifecycle events published to the message broker."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        CreateUserRequest,
        UpdateUserRequest,
        UserResponse,
        ErrorSchema,
        ErrorCodeSchema
    )),
    tags(
        (name = "users", description = "User CRUD operations"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

impl ApiDoc {
    /// Build the document with `title` replacing the compiled-in title.
    pub fn titled(title: &str) -> utoipa::openapi::OpenApi {
        let mut doc = Self::openapi();
        doc.info.title = title.to_owned();
        doc
    }
}

#[cfg(test)]
mod tests {
    //! Tests verifying registered paths and schema field structure.

    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    // utoipa replaces :: with . in schema names
    const ERROR_SCHEMA_NAME: &str = "crate.domain.Error";

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    #[case("/api/v1/users")]
    #[case("/api/v1/users/{id}")]
    #[case("/health/ready")]
    #[case("/health/live")]
    fn paths_are_registered(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing path {path}");
    }

    #[test]
    fn error_schema_has_camel_case_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error_schema = schemas.get(ERROR_SCHEMA_NAME).expect("Error schema");

        assert_object_schema_has_field(error_schema, "code");
        assert_object_schema_has_field(error_schema, "message");
        assert_object_schema_has_field(error_schema, "traceId");
    }

    #[test]
    fn user_response_schema_omits_password() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let user = schemas.get("UserResponse").expect("UserResponse schema");
        assert_object_schema_has_field(user, "surname");
        match user {
            RefOr::T(Schema::Object(obj)) => assert!(!obj.properties.contains_key("password")),
            _ => panic!("expected Object schema"),
        }
    }

    #[test]
    fn titled_overrides_title() {
        let doc = ApiDoc::titled("user-management-api");
        assert_eq!(doc.info.title, "user-management-api");
    }
}
