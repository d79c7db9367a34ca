//! OpenAPI documentation configuration

use utoipa::OpenApi;

/// Combined OpenAPI documentation for all APIs
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Delta Fashion API",
        version = "0.1.0",
        description = "Storefront and back-office REST API: catalog, checkout, orders and administration",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    nest(
        (path = "/api", api = domain_users::ApiDoc),
        (path = "/api", api = domain_categories::ApiDoc),
        (path = "/api", api = domain_products::ApiDoc),
        (path = "/api", api = domain_orders::ApiDoc),
        (path = "/api", api = domain_banners::ApiDoc),
        (path = "/api", api = domain_analytics::ApiDoc),
        (path = "/api", api = uploads::ApiDoc)
    )
)]
pub struct ApiDoc;
