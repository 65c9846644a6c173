//! Catalog Domain
//!
//! Products, the categories they belong to, and the HTTP surface over both.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints, DTO validation
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Existence checks, DTO ↔ model mapping
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + in-memory / Postgres)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Products, categories, drafts
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_catalog::{
//!     handlers,
//!     repository::InMemoryCatalogStore,
//!     service::ProductService,
//! };
//!
//! let store = InMemoryCatalogStore::new();
//! let service = ProductService::new(store.products(), store.categories());
//!
//! let router = handlers::products::router(service);
//! ```

pub mod conversions;
pub mod dto;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod pagination;
pub mod postgres;
pub mod repository;
pub mod service;

pub use dto::{CategoryDto, ProductDto};
pub use error::{CatalogError, CatalogResult, StoreError, StoreResult};
pub use models::{Category, CategoryDraft, CategoryRef, Product, ProductDraft};
pub use pagination::{Page, PageQuery, PageRequest};
pub use postgres::{PgCategoryRepository, PgProductRepository};
pub use repository::{CategoryRepository, InMemoryCatalogStore, ProductRepository};
pub use service::{CategoryService, ProductService};
