//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. This
//! module registers the error envelope under the domain type's name so the
//! generated document describes what handlers actually return.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or could not be parsed.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The database is temporarily unavailable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Error, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "not_found")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "User with ID 7 not found")]
    message: String,
    /// Correlation identifier, equal to the `X-Trace-Id` response header.
    #[schema(example = "abc123")]
    trace_id: Option<String>,
    /// Supplementary error details.
    details: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use utoipa::PartialSchema;

    fn schema_to_json<T: PartialSchema>() -> String {
        serde_json::to_string(&T::schema()).expect("schema serialises to JSON")
    }

    #[rstest]
    fn error_schema_uses_wire_field_names() {
        assert_eq!(ErrorSchema::name(), "crate.domain.Error");
        let schema_json = schema_to_json::<ErrorSchema>();
        assert!(schema_json.contains("traceId"), "schema should use camelCase");
        assert!(schema_json.contains("message"));
    }

    #[rstest]
    #[case("invalid_request")]
    #[case("not_found")]
    #[case("service_unavailable")]
    #[case("internal_error")]
    fn error_code_schema_lists_variant(#[case] variant: &str) {
        assert_eq!(ErrorCodeSchema::name(), "crate.domain.ErrorCode");
        assert!(schema_to_json::<ErrorCodeSchema>().contains(variant));
    }
}
