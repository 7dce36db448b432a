use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::errors::{
    ClientListResponse, ClientResponse, ErrorModel, FileListResponse, FileResponse,
    LoginEnvelope, PrincipalResponse, SocietyListResponse, SocietyResponse,
};
use crate::models::{
    ClientExternal, LoginRequest, LoginResponse, Principal, RegisterClientRequest, Society,
    SocietyRequest, StoredFile, UploadFileRequest,
};

/// Name of the security scheme every operation requires
pub const BEARER_SCHEME: &str = "Bearer";

pub const OPENAPI_JSON_PATH: &str = "/swagger/v1/swagger.json";
pub const SWAGGER_UI_PATH: &str = "/swagger-ui";

/// Registers the HTTP bearer (JWT) scheme referenced by the global
/// security requirement.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            BEARER_SCHEME,
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Please enter a valid token"))
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "DTI AppService API",
        version = "v1",
        description = "Societies, files and external clients behind JWT bearer authentication.\n\nSend `Authorization: Bearer <token>` with a token from `/api/auth/login`."
    ),
    security(
        ("Bearer" = [])
    ),
    modifiers(&SecurityAddon),
    paths(
        crate::api::handlers::health,
        crate::api::handlers::health_ready,
        crate::api::handlers::auth::login,
        crate::api::handlers::auth::logout_everywhere,
        crate::api::handlers::auth::me,
        crate::api::handlers::societies::list_societies,
        crate::api::handlers::societies::get_society,
        crate::api::handlers::societies::create_society,
        crate::api::handlers::societies::update_society,
        crate::api::handlers::societies::delete_society,
        crate::api::handlers::societies::list_society_files,
        crate::api::handlers::files::upload_file,
        crate::api::handlers::files::get_file,
        crate::api::handlers::files::download_file,
        crate::api::handlers::files::delete_file,
        crate::api::handlers::clients::list_clients,
        crate::api::handlers::clients::register_client,
        crate::api::handlers::clients::get_client,
    ),
    components(
        schemas(
            ErrorModel,
            Society,
            SocietyRequest,
            StoredFile,
            UploadFileRequest,
            ClientExternal,
            RegisterClientRequest,
            LoginRequest,
            LoginResponse,
            Principal,
            SocietyResponse,
            SocietyListResponse,
            FileResponse,
            FileListResponse,
            ClientResponse,
            ClientListResponse,
            LoginEnvelope,
            PrincipalResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Token issuance and revocation"),
        (name = "societies", description = "Society registry"),
        (name = "files", description = "File storage"),
        (name = "clients", description = "External client registry"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn document() -> Value {
        serde_json::to_value(ApiDoc::openapi()).unwrap()
    }

    #[test]
    fn test_single_global_bearer_requirement() {
        let doc = document();
        let security = doc["security"].as_array().unwrap();
        assert_eq!(security.len(), 1);

        let requirement = security[0].as_object().unwrap();
        assert_eq!(requirement.len(), 1);
        assert_eq!(requirement[BEARER_SCHEME], serde_json::json!([]));
    }

    #[test]
    fn test_bearer_scheme_definition() {
        let doc = document();
        let scheme = &doc["components"]["securitySchemes"][BEARER_SCHEME];
        assert_eq!(scheme["type"], "http");
        assert_eq!(scheme["scheme"], "bearer");
        assert_eq!(scheme["bearerFormat"], "JWT");
        assert_eq!(scheme["description"], "Please enter a valid token");
    }

    #[test]
    fn test_document_info() {
        let doc = document();
        assert_eq!(doc["info"]["title"], "DTI AppService API");
        assert_eq!(doc["info"]["version"], "v1");
        assert!(doc["paths"]["/api/societies/{id}"].is_object());
    }

    #[test]
    fn test_success_bodies_reference_envelope_aliases() {
        let doc = document();
        let schema_ref = |path: &str, method: &str, status: &str| {
            doc["paths"][path][method]["responses"][status]["content"]["application/json"]
                ["schema"]["$ref"]
                .as_str()
                .unwrap_or_default()
                .to_string()
        };

        assert!(schema_ref("/api/files", "post", "201").ends_with("/FileResponse"));
        assert!(schema_ref("/api/auth/login", "post", "200").ends_with("/LoginEnvelope"));
        assert!(schema_ref("/api/clients", "get", "200").ends_with("/ClientListResponse"));
        assert!(schema_ref("/api/societies/{id}", "get", "200").ends_with("/SocietyResponse"));
        assert!(doc["components"]["schemas"]["FileResponse"].is_object());
    }
}
