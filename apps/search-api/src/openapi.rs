//! OpenAPI documentation configuration

use utoipa::OpenApi;

/// Combined OpenAPI documentation for the Search API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Product Search API",
        version = "0.1.0",
        description = "Hybrid product search: lexical keyword index with semantic vector fallback"
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    nest(
        (path = "/api", api = domain_products::ApiDoc)
    ),
    tags(
        (name = "Products", description = "Product search and ingestion")
    )
)]
pub struct ApiDoc;
