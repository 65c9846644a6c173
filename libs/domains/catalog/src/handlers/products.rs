use axum::{
    Json, Router,
    extract::{OriginalUri, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use axum_helpers::{
    AppError, IdPath, ValidatedJson,
    errors::responses::{
        BadRequestResponse, InternalServerErrorResponse, NotFoundResponse,
        UnprocessableEntityResponse,
    },
};
use utoipa::OpenApi;

use super::{PRODUCTS_TAG, location};
use crate::dto::{CategoryDto, ProductDto};
use crate::pagination::{Page, PageQuery, ProductSort};
use crate::repository::{CategoryRepository, ProductRepository};
use crate::service::ProductService;

/// OpenAPI documentation for the products API
#[derive(OpenApi)]
#[openapi(
    paths(find_all, find_by_id, insert, update, delete),
    components(
        schemas(ProductDto, CategoryDto),
        responses(
            BadRequestResponse,
            NotFoundResponse,
            UnprocessableEntityResponse,
            InternalServerErrorResponse
        )
    ),
    tags((name = PRODUCTS_TAG, description = "Product catalog"))
)]
pub struct ApiDoc;

type SharedService<P, C> = State<ProductService<P, C>>;

pub fn router<P, C>(service: ProductService<P, C>) -> Router
where
    P: ProductRepository + 'static,
    C: CategoryRepository + 'static,
{
    Router::new()
        .route("/", get(find_all::<P, C>).post(insert::<P, C>))
        .route(
            "/{id}",
            get(find_by_id::<P, C>)
                .put(update::<P, C>)
                .delete(delete::<P, C>),
        )
        .with_state(service)
}

/// List products one page at a time
#[utoipa::path(
    get,
    path = "",
    tag = PRODUCTS_TAG,
    params(PageQuery),
    responses(
        (status = 200, description = "Page of products", body = Page<ProductDto>),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn find_all<P: ProductRepository, C: CategoryRepository>(
    State(service): SharedService<P, C>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<ProductDto>>, AppError> {
    let request = query.into_request::<ProductSort>()?;
    Ok(Json(service.find_all_paged(request).await?))
}

/// Get a product with its categories
#[utoipa::path(
    get,
    path = "/{id}",
    tag = PRODUCTS_TAG,
    params(("id" = i64, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product found", body = ProductDto),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn find_by_id<P: ProductRepository, C: CategoryRepository>(
    State(service): SharedService<P, C>,
    IdPath(id): IdPath,
) -> Result<Json<ProductDto>, AppError> {
    Ok(Json(service.find_by_id(id).await?))
}

/// Create a product linked to existing categories
#[utoipa::path(
    post,
    path = "",
    tag = PRODUCTS_TAG,
    request_body = ProductDto,
    responses(
        (status = 201, description = "Product created", body = ProductDto,
            headers(("location" = String, description = "URI of the new product"))),
        (status = 400, response = BadRequestResponse),
        (status = 422, response = UnprocessableEntityResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn insert<P: ProductRepository, C: CategoryRepository>(
    State(service): SharedService<P, C>,
    OriginalUri(uri): OriginalUri,
    ValidatedJson(dto): ValidatedJson<ProductDto>,
) -> Result<impl IntoResponse, AppError> {
    let created = service.insert(dto).await?;
    let location = created.id.and_then(|id| location(&uri, id));

    let mut response = (StatusCode::CREATED, Json(created)).into_response();
    if let Some(value) = location {
        response.headers_mut().insert(header::LOCATION, value);
    }
    Ok(response)
}

/// Replace a product's fields and category links
#[utoipa::path(
    put,
    path = "/{id}",
    tag = PRODUCTS_TAG,
    params(("id" = i64, Path, description = "Product id")),
    request_body = ProductDto,
    responses(
        (status = 200, description = "Product updated", body = ProductDto),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse),
        (status = 422, response = UnprocessableEntityResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update<P: ProductRepository, C: CategoryRepository>(
    State(service): SharedService<P, C>,
    IdPath(id): IdPath,
    ValidatedJson(dto): ValidatedJson<ProductDto>,
) -> Result<Json<ProductDto>, AppError> {
    Ok(Json(service.update(id, dto).await?))
}

/// Delete a product
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = PRODUCTS_TAG,
    params(("id" = i64, Path, description = "Product id")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete<P: ProductRepository, C: CategoryRepository>(
    State(service): SharedService<P, C>,
    IdPath(id): IdPath,
) -> Result<StatusCode, AppError> {
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
