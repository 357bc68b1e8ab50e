//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint of the inbound layer (auth gate,
//! vow form, diagnostics panel and health probes), the request and response
//! schemas they exchange, and the session cookie security scheme.
//!
//! The generated document backs Swagger UI in debug builds.

use crate::domain::{
    AuthMode, AuthStatus, ConnectivityReport, ConnectivityStatus, Error, ErrorCode, RowKey,
    SchemaStatus, TableCreationOutcome, TableState, TestRecordOutcome, Vow, VowForm,
    VowSubmissionOutcome,
};
use crate::inbound::http::auth::{AuthRequest, AuthResponse, SessionResponse, View};
use crate::inbound::http::diagnostics::ConnectivityResponse;
use crate::inbound::http::vows::VowFormState;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/auth.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Vows backend API",
        description = "Auth gate, vow form and diagnostics panel over a hosted Supabase project."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::authenticate,
        crate::inbound::http::auth::current_session,
        crate::inbound::http::vows::vow_form,
        crate::inbound::http::vows::submit_vow,
        crate::inbound::http::diagnostics::connectivity,
        crate::inbound::http::diagnostics::schema_status,
        crate::inbound::http::diagnostics::create_test_record,
        crate::inbound::http::diagnostics::create_table,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        AuthMode,
        AuthRequest,
        AuthResponse,
        SessionResponse,
        View,
        VowForm,
        VowFormState,
        Vow,
        RowKey,
        VowSubmissionOutcome,
        ConnectivityResponse,
        ConnectivityReport,
        ConnectivityStatus,
        AuthStatus,
        SchemaStatus,
        TableState,
        TestRecordOutcome,
        TableCreationOutcome,
    )),
    tags(
        (name = "auth", description = "Sign in and sign up"),
        (name = "vows", description = "The vow form"),
        (name = "diagnostics", description = "Connectivity and schema checks"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying the registered paths and schema field structure.

    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    /// Assert that an Object schema contains a field with the given name.
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
    #[case("/api/v1/auth")]
    #[case("/api/v1/session")]
    #[case("/api/v1/vows")]
    #[case("/api/v1/vows/form")]
    #[case("/api/v1/diagnostics/connectivity")]
    #[case("/api/v1/diagnostics/schema")]
    #[case("/api/v1/diagnostics/schema/test-record")]
    #[case("/api/v1/diagnostics/table")]
    #[case("/health/ready")]
    #[case("/health/live")]
    fn openapi_registers_path(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing path {path}");
    }

    #[rstest]
    #[case("Error", &["code", "message"])]
    #[case("VowForm", &["firstName", "surname", "amount", "purpose"])]
    #[case("VowSubmissionOutcome", &["success", "message", "form"])]
    #[case("SchemaStatus", &["state", "message"])]
    fn openapi_schema_has_fields(#[case] name: &str, #[case] fields: &[&str]) {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let schema = schemas.get(name).expect("schema registered");
        for field in fields {
            assert_object_schema_has_field(schema, field);
        }
    }

    #[test]
    fn openapi_declares_the_session_cookie_scheme() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("SessionCookie"));
    }
}
