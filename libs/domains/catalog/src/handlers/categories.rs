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
    },
};
use utoipa::OpenApi;

use super::{CATEGORIES_TAG, location};
use crate::dto::CategoryDto;
use crate::pagination::{CategorySort, Page, PageQuery};
use crate::repository::CategoryRepository;
use crate::service::CategoryService;

/// OpenAPI documentation for the categories API
#[derive(OpenApi)]
#[openapi(
    paths(find_all, find_by_id, insert, update, delete),
    components(
        schemas(CategoryDto),
        responses(BadRequestResponse, NotFoundResponse, InternalServerErrorResponse)
    ),
    tags((name = CATEGORIES_TAG, description = "Product categories"))
)]
pub struct ApiDoc;

pub fn router<C: CategoryRepository + 'static>(service: CategoryService<C>) -> Router {
    Router::new()
        .route("/", get(find_all::<C>).post(insert::<C>))
        .route(
            "/{id}",
            get(find_by_id::<C>).put(update::<C>).delete(delete::<C>),
        )
        .with_state(service)
}

/// List categories one page at a time
#[utoipa::path(
    get,
    path = "",
    tag = CATEGORIES_TAG,
    params(PageQuery),
    responses(
        (status = 200, description = "Page of categories", body = Page<CategoryDto>),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn find_all<C: CategoryRepository>(
    State(service): State<CategoryService<C>>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<CategoryDto>>, AppError> {
    let request = query.into_request::<CategorySort>()?;
    Ok(Json(service.find_all_paged(request).await?))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = CATEGORIES_TAG,
    params(("id" = i64, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category found", body = CategoryDto),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn find_by_id<C: CategoryRepository>(
    State(service): State<CategoryService<C>>,
    IdPath(id): IdPath,
) -> Result<Json<CategoryDto>, AppError> {
    Ok(Json(service.find_by_id(id).await?))
}

#[utoipa::path(
    post,
    path = "",
    tag = CATEGORIES_TAG,
    request_body = CategoryDto,
    responses(
        (status = 201, description = "Category created", body = CategoryDto,
            headers(("location" = String, description = "URI of the new category"))),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn insert<C: CategoryRepository>(
    State(service): State<CategoryService<C>>,
    OriginalUri(uri): OriginalUri,
    ValidatedJson(dto): ValidatedJson<CategoryDto>,
) -> Result<impl IntoResponse, AppError> {
    let created = service.insert(dto).await?;
    let location = created.id.and_then(|id| location(&uri, id));

    let mut response = (StatusCode::CREATED, Json(created)).into_response();
    if let Some(value) = location {
        response.headers_mut().insert(header::LOCATION, value);
    }
    Ok(response)
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = CATEGORIES_TAG,
    params(("id" = i64, Path, description = "Category id")),
    request_body = CategoryDto,
    responses(
        (status = 200, description = "Category renamed", body = CategoryDto),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update<C: CategoryRepository>(
    State(service): State<CategoryService<C>>,
    IdPath(id): IdPath,
    ValidatedJson(dto): ValidatedJson<CategoryDto>,
) -> Result<Json<CategoryDto>, AppError> {
    Ok(Json(service.update(id, dto).await?))
}

/// Delete a category that no product links to
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = CATEGORIES_TAG,
    params(("id" = i64, Path, description = "Category id")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 400, description = "Category is still linked to products", body = axum_helpers::ErrorResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete<C: CategoryRepository>(
    State(service): State<CategoryService<C>>,
    IdPath(id): IdPath,
) -> Result<StatusCode, AppError> {
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
