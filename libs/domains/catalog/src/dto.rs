//! Wire representations of catalog entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::models::{CategoryId, ProductId};

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("must not be blank".into()));
    }
    Ok(())
}

fn validate_not_in_future(date: &DateTime<Utc>) -> Result<(), ValidationError> {
    if *date > Utc::now() {
        return Err(
            ValidationError::new("future_date").with_message("date cannot be in the future".into()),
        );
    }
    Ok(())
}

fn validate_category_ids(categories: &[CategoryDto]) -> Result<(), ValidationError> {
    if categories.iter().any(|c| c.id.is_none()) {
        return Err(ValidationError::new("category_id")
            .with_message("every category must reference an existing id".into()));
    }
    Ok(())
}

/// Category as exchanged over the API. `id` is absent on create.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema, Validate)]
pub struct CategoryDto {
    #[schema(example = 1)]
    pub id: Option<CategoryId>,
    #[serde(default)]
    #[validate(custom(function = "validate_not_blank"))]
    #[schema(example = "Electronics")]
    pub name: String,
}

/// Product as exchanged over the API.
///
/// On writes only the ids of `categories` are used; names sent by the client
/// are ignored and the stored names are returned.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema, Validate)]
pub struct ProductDto {
    #[schema(example = 1)]
    pub id: Option<ProductId>,
    #[validate(
        length(max = 60, message = "name must have at most 60 characters"),
        custom(function = "validate_not_blank")
    )]
    #[schema(example = "Phone")]
    pub name: String,
    #[serde(default)]
    #[schema(example = "Good Phone")]
    pub description: String,
    #[validate(range(min = 0.0, message = "price must not be negative"))]
    #[schema(example = 800.0)]
    pub price: f64,
    #[serde(default)]
    #[schema(example = "https://img.com/img.png")]
    pub img_url: String,
    /// Creation time; defaults to now on insert and is never changed by updates
    #[validate(custom(function = "validate_not_in_future"))]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    #[validate(custom(function = "validate_category_ids"))]
    pub categories: Vec<CategoryDto>,
}
