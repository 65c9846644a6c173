//! Catalog entity model.
//!
//! Persisted entities (`Product`, `Category`) always carry an id. Writes go
//! through drafts whose `id` is `None` until the store assigns one.

use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

pub type ProductId = i64;
pub type CategoryId = i64;

/// Persisted category
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// Persisted product with its categories loaded, ordered by id.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub img_url: String,
    pub date: DateTime<Utc>,
    pub categories: Vec<Category>,
}

impl Product {
    /// Turns a loaded product into a draft for an update, keeping its id,
    /// creation date and category links.
    pub fn into_draft(self) -> ProductDraft {
        ProductDraft {
            id: Some(self.id),
            name: self.name,
            description: self.description,
            price: self.price,
            img_url: self.img_url,
            date: self.date,
            categories: self.categories.iter().map(|c| CategoryRef(c.id)).collect(),
        }
    }
}

/// Unverified reference to a category by id.
///
/// Only meaningful when handed to a repository `save`; the store rejects
/// references to categories that do not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CategoryRef(pub CategoryId);

impl CategoryRef {
    pub fn id(self) -> CategoryId {
        self.0
    }
}

/// Product write model
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDraft {
    /// `None` until the first successful insert
    pub id: Option<ProductId>,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub img_url: String,
    pub date: DateTime<Utc>,
    pub categories: BTreeSet<CategoryRef>,
}

impl ProductDraft {
    /// Empty transient draft stamped with `date`.
    pub fn new(date: DateTime<Utc>) -> Self {
        Self {
            id: None,
            name: String::new(),
            description: String::new(),
            price: 0.0,
            img_url: String::new(),
            date,
            categories: BTreeSet::new(),
        }
    }

    pub fn is_transient(&self) -> bool {
        self.id.is_none()
    }
}

/// Category write model
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CategoryDraft {
    pub id: Option<CategoryId>,
    pub name: String,
}

impl From<Category> for CategoryDraft {
    fn from(category: Category) -> Self {
        Self {
            id: Some(category.id),
            name: category.name,
        }
    }
}
