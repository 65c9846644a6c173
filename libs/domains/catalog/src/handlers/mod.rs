//! HTTP endpoints for products and categories

pub mod categories;
pub mod products;

use axum::http::{HeaderValue, Uri};

pub const PRODUCTS_TAG: &str = "products";
pub const CATEGORIES_TAG: &str = "categories";

/// `Location` for a resource created under the collection at `collection`.
fn location(collection: &Uri, id: i64) -> Option<HeaderValue> {
    let base = collection.path().trim_end_matches('/');
    HeaderValue::from_str(&format!("{base}/{id}")).ok()
}
