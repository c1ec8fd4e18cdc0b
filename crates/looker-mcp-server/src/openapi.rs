use crate::routes::config_management::ConfigStatus;
use crate::routes::health::HealthResponse;
use utoipa::OpenApi;

#[allow(dead_code)] // Used by utoipa for OpenAPI generation
#[derive(OpenApi)]
#[openapi(
    info(title = "looker-mcp-server"),
    paths(
        super::routes::health::info,
        super::routes::health::health,
        super::routes::health::service_health,
        super::routes::config_management::read_config,
    ),
    components(schemas(HealthResponse, ConfigStatus))
)]
pub struct ApiDoc;

pub fn generate_schema() -> serde_json::Result<String> {
    serde_json::to_string_pretty(&ApiDoc::openapi())
}
