use axum_helpers::{ErrorCode, ErrorResponse};
use domain_catalog::handlers;
use utoipa::OpenApi;

/// Catalog API documentation, served by the UIs mounted in `create_router`
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Catalog API",
        description = "Products and the categories they belong to"
    ),
    nest(
        (path = "/api/products", api = handlers::products::ApiDoc),
        (path = "/api/categories", api = handlers::categories::ApiDoc)
    ),
    components(schemas(ErrorResponse, ErrorCode))
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_documents_both_resources() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;

        for path in [
            "/api/products",
            "/api/products/{id}",
            "/api/categories",
            "/api/categories/{id}",
        ] {
            assert!(paths.contains_key(path), "missing {path}");
        }
    }
}
