//! Catalog services - business logic layer

use chrono::Utc;
use std::sync::Arc;
use tracing::instrument;

use crate::conversions::category_refs;
use crate::dto::{CategoryDto, ProductDto};
use crate::error::{CatalogError, CatalogResult, StoreError};
use crate::models::{CategoryDraft, CategoryId, ProductDraft, ProductId};
use crate::pagination::{CategorySort, Page, PageRequest, ProductSort};
use crate::repository::{CategoryRepository, ProductRepository};

/// A missing row discovered by a verified lookup is reported as `ResourceNotFound`.
fn not_found_as_resource(err: StoreError, id: i64) -> CatalogError {
    match err {
        StoreError::NotFound { .. } => CatalogError::not_found(id),
        other => other.into(),
    }
}

/// Integrity conflicts on delete become `CatalogError::Database`.
fn integrity_as_database(err: StoreError) -> CatalogError {
    match err {
        StoreError::IntegrityViolation(msg) => {
            tracing::warn!(reason = %msg, "Delete rejected by integrity constraint");
            CatalogError::Database("Integrity violation".to_string())
        }
        other => other.into(),
    }
}

/// Product operations. Category links are resolved through the category repository.
pub struct ProductService<P: ProductRepository, C: CategoryRepository> {
    products: Arc<P>,
    categories: Arc<C>,
}

// Manual impl: cloning shares the repositories, so `P` and `C` need not be `Clone`.
impl<P: ProductRepository, C: CategoryRepository> Clone for ProductService<P, C> {
    fn clone(&self) -> Self {
        Self {
            products: Arc::clone(&self.products),
            categories: Arc::clone(&self.categories),
        }
    }
}

impl<P: ProductRepository, C: CategoryRepository> ProductService<P, C> {
    /// Wraps both repositories for sharing across handlers.
    pub fn new(products: P, categories: C) -> Self {
        Self {
            products: Arc::new(products),
            categories: Arc::new(categories),
        }
    }

    /// One page of products with the total over all pages.
    #[instrument(skip(self))]
    pub async fn find_all_paged(
        &self,
        request: PageRequest<ProductSort>,
    ) -> CatalogResult<Page<ProductDto>> {
        let page = self.products.find_page(request).await?;
        Ok(page.map(|p| ProductDto::from(&p)))
    }

    /// Fails with `ResourceNotFound` when no product has `id`.
    #[instrument(skip(self))]
    pub async fn find_by_id(&self, id: ProductId) -> CatalogResult<ProductDto> {
        self.products
            .find_by_id(id)
            .await?
            .map(|p| ProductDto::from(&p))
            .ok_or_else(|| CatalogError::not_found(id))
    }

    /// Category ids are not checked here; the store rejects unknown ones on save.
    #[instrument(skip(self, dto), fields(product_name = %dto.name))]
    pub async fn insert(&self, dto: ProductDto) -> CatalogResult<ProductDto> {
        let mut draft = ProductDraft::new(dto.date.unwrap_or_else(Utc::now));
        let refs = category_refs(&dto.categories, |id| self.categories.reference_by_id(id));
        draft.apply(&dto, refs);

        let saved = self.products.save(draft).await?;
        tracing::info!(product_id = saved.id, "Inserted product");
        Ok(ProductDto::from(&saved))
    }

    /// Overwrites the scalar fields and relinks categories. `date` and the dto id are ignored.
    #[instrument(skip(self, dto))]
    pub async fn update(&self, id: ProductId, dto: ProductDto) -> CatalogResult<ProductDto> {
        let mut draft = self
            .products
            .get_by_id(id)
            .await
            .map_err(|e| not_found_as_resource(e, id))?
            .into_draft();

        let refs = category_refs(&dto.categories, |cid| self.categories.reference_by_id(cid));
        draft.apply(&dto, refs);

        let saved = self
            .products
            .save(draft)
            .await
            .map_err(|e| not_found_as_resource(e, id))?;
        tracing::info!(product_id = saved.id, "Updated product");
        Ok(ProductDto::from(&saved))
    }

    /// Fails with `ResourceNotFound` when absent, `Database` when still referenced.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: ProductId) -> CatalogResult<()> {
        if !self.products.exists_by_id(id).await? {
            return Err(CatalogError::not_found(id));
        }

        self.products
            .delete_by_id(id)
            .await
            .map_err(integrity_as_database)?;
        tracing::info!(product_id = id, "Deleted product");
        Ok(())
    }
}

/// Category operations. Same shape as [`ProductService`], without links.
pub struct CategoryService<C: CategoryRepository> {
    categories: Arc<C>,
}

impl<C: CategoryRepository> Clone for CategoryService<C> {
    fn clone(&self) -> Self {
        Self {
            categories: Arc::clone(&self.categories),
        }
    }
}

impl<C: CategoryRepository> CategoryService<C> {
    /// Wraps the repository for sharing across handlers.
    pub fn new(categories: C) -> Self {
        Self {
            categories: Arc::new(categories),
        }
    }

    /// One page of categories with the total over all pages.
    #[instrument(skip(self))]
    pub async fn find_all_paged(
        &self,
        request: PageRequest<CategorySort>,
    ) -> CatalogResult<Page<CategoryDto>> {
        let page = self.categories.find_page(request).await?;
        Ok(page.map(|c| CategoryDto::from(&c)))
    }

    /// Fails with `ResourceNotFound` when no category has `id`.
    #[instrument(skip(self))]
    pub async fn find_by_id(&self, id: CategoryId) -> CatalogResult<CategoryDto> {
        self.categories
            .find_by_id(id)
            .await?
            .map(|c| CategoryDto::from(&c))
            .ok_or_else(|| CatalogError::not_found(id))
    }

    /// Stores a new category; any id in `dto` is ignored.
    #[instrument(skip(self, dto), fields(category_name = %dto.name))]
    pub async fn insert(&self, dto: CategoryDto) -> CatalogResult<CategoryDto> {
        let mut draft = CategoryDraft::default();
        draft.apply(&dto);

        let saved = self.categories.save(draft).await?;
        tracing::info!(category_id = saved.id, "Inserted category");
        Ok(CategoryDto::from(&saved))
    }

    /// Renames the category with `id`.
    #[instrument(skip(self, dto))]
    pub async fn update(&self, id: CategoryId, dto: CategoryDto) -> CatalogResult<CategoryDto> {
        let mut draft = CategoryDraft::from(
            self.categories
                .get_by_id(id)
                .await
                .map_err(|e| not_found_as_resource(e, id))?,
        );
        draft.apply(&dto);

        let saved = self
            .categories
            .save(draft)
            .await
            .map_err(|e| not_found_as_resource(e, id))?;
        tracing::info!(category_id = saved.id, "Updated category");
        Ok(CategoryDto::from(&saved))
    }

    /// Fails with `Database` while a product still links to the category.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: CategoryId) -> CatalogResult<()> {
        if !self.categories.exists_by_id(id).await? {
            return Err(CatalogError::not_found(id));
        }

        self.categories
            .delete_by_id(id)
            .await
            .map_err(integrity_as_database)?;
        tracing::info!(category_id = id, "Deleted category");
        Ok(())
    }
}
