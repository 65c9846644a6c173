use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::models::{
    Category, CategoryDraft, CategoryId, CategoryRef, Product, ProductDraft, ProductId,
};
use crate::pagination::{CategorySort, Direction, Page, PageRequest, ProductSort};

/// Repository trait for Product persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Load a product that must exist, else `StoreError::NotFound`
    async fn get_by_id(&self, id: ProductId) -> StoreResult<Product>;

    async fn find_by_id(&self, id: ProductId) -> StoreResult<Option<Product>>;

    async fn exists_by_id(&self, id: ProductId) -> StoreResult<bool>;

    /// Load one page of products with their categories and the overall total
    async fn find_page(&self, request: PageRequest<ProductSort>) -> StoreResult<Page<Product>>;

    /// Insert a transient draft or update a persisted one, replacing its category links
    async fn save(&self, draft: ProductDraft) -> StoreResult<Product>;

    async fn delete_by_id(&self, id: ProductId) -> StoreResult<()>;
}

/// Repository trait for Category persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Unverified reference for linking; performs no I/O
    fn reference_by_id(&self, id: CategoryId) -> CategoryRef {
        CategoryRef(id)
    }

    async fn get_by_id(&self, id: CategoryId) -> StoreResult<Category>;

    async fn find_by_id(&self, id: CategoryId) -> StoreResult<Option<Category>>;

    async fn exists_by_id(&self, id: CategoryId) -> StoreResult<bool>;

    async fn find_page(&self, request: PageRequest<CategorySort>) -> StoreResult<Page<Category>>;

    async fn save(&self, draft: CategoryDraft) -> StoreResult<Category>;

    /// Fails with `StoreError::IntegrityViolation` while a product links to it
    async fn delete_by_id(&self, id: CategoryId) -> StoreResult<()>;
}

#[derive(Debug, Clone)]
struct ProductRow {
    name: String,
    description: String,
    price: f64,
    img_url: String,
    date: chrono::DateTime<chrono::Utc>,
    categories: BTreeSet<CategoryId>,
}

#[derive(Debug, Default)]
struct CatalogState {
    categories: BTreeMap<CategoryId, String>,
    products: BTreeMap<ProductId, ProductRow>,
    last_category_id: CategoryId,
    last_product_id: ProductId,
}

impl CatalogState {
    fn category(&self, id: CategoryId) -> Option<Category> {
        self.categories.get(&id).map(|name| Category {
            id,
            name: name.clone(),
        })
    }

    fn product(&self, id: ProductId) -> Option<Product> {
        self.products.get(&id).map(|row| self.assemble(id, row))
    }

    fn assemble(&self, id: ProductId, row: &ProductRow) -> Product {
        Product {
            id,
            name: row.name.clone(),
            description: row.description.clone(),
            price: row.price,
            img_url: row.img_url.clone(),
            date: row.date,
            categories: row
                .categories
                .iter()
                .filter_map(|c| self.category(*c))
                .collect(),
        }
    }
}

/// Sorts and slices borrowed rows; callers only build values for the returned page.
fn page_of<T, K>(
    mut items: Vec<T>,
    request: &PageRequest<K>,
    compare: impl Fn(&T, &T) -> Ordering,
) -> Page<T> {
    items.sort_by(|a, b| match request.sort.direction {
        Direction::Asc => compare(a, b),
        Direction::Desc => compare(b, a),
    });
    let total = items.len() as u64;
    let content = items
        .into_iter()
        .skip(request.offset() as usize)
        .take(request.size as usize)
        .collect();
    Page::new(content, request, total)
}

/// Shared in-memory catalog (for development/testing).
///
/// Enforces the same referential rules as the relational schema: products
/// may only link to stored categories, and linked categories cannot be deleted.
#[derive(Debug, Default, Clone)]
pub struct InMemoryCatalogStore {
    state: Arc<RwLock<CatalogState>>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn products(&self) -> InMemoryProductRepository {
        InMemoryProductRepository {
            store: self.clone(),
        }
    }

    pub fn categories(&self) -> InMemoryCategoryRepository {
        InMemoryCategoryRepository {
            store: self.clone(),
        }
    }
}

/// In-memory implementation of ProductRepository
#[derive(Debug, Default, Clone)]
pub struct InMemoryProductRepository {
    store: InMemoryCatalogStore,
}

/// In-memory implementation of CategoryRepository
#[derive(Debug, Default, Clone)]
pub struct InMemoryCategoryRepository {
    store: InMemoryCatalogStore,
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn get_by_id(&self, id: ProductId) -> StoreResult<Product> {
        self.find_by_id(id).await?.ok_or(StoreError::NotFound {
            entity: "Product",
            id,
        })
    }

    async fn find_by_id(&self, id: ProductId) -> StoreResult<Option<Product>> {
        Ok(self.store.state.read().await.product(id))
    }

    async fn exists_by_id(&self, id: ProductId) -> StoreResult<bool> {
        Ok(self.store.state.read().await.products.contains_key(&id))
    }

    async fn find_page(&self, request: PageRequest<ProductSort>) -> StoreResult<Page<Product>> {
        let state = self.store.state.read().await;
        let rows: Vec<(ProductId, &ProductRow)> =
            state.products.iter().map(|(id, row)| (*id, row)).collect();

        let page = page_of(rows, &request, |(a_id, a), (b_id, b)| {
            let primary = match request.sort.by {
                ProductSort::Id => Ordering::Equal,
                ProductSort::Name => a.name.cmp(&b.name),
                ProductSort::Price => a.price.total_cmp(&b.price),
                ProductSort::Date => a.date.cmp(&b.date),
            };
            primary.then(a_id.cmp(b_id))
        });

        Ok(page.map(|(id, row)| state.assemble(id, row)))
    }

    async fn save(&self, draft: ProductDraft) -> StoreResult<Product> {
        let mut state = self.store.state.write().await;

        if let Some(missing) = draft
            .categories
            .iter()
            .find(|c| !state.categories.contains_key(&c.id()))
        {
            return Err(StoreError::EntityReference(format!(
                "Category {} does not exist",
                missing.id()
            )));
        }

        let id = match draft.id {
            Some(id) if state.products.contains_key(&id) => id,
            Some(id) => {
                return Err(StoreError::NotFound {
                    entity: "Product",
                    id,
                });
            }
            None => {
                state.last_product_id += 1;
                state.last_product_id
            }
        };

        state.products.insert(
            id,
            ProductRow {
                name: draft.name,
                description: draft.description,
                price: draft.price,
                img_url: draft.img_url,
                date: draft.date,
                categories: draft.categories.iter().map(|c| c.id()).collect(),
            },
        );

        tracing::debug!(product_id = id, "Saved product in memory");
        state
            .product(id)
            .ok_or_else(|| StoreError::Database(format!("Product {id} vanished after save")))
    }

    async fn delete_by_id(&self, id: ProductId) -> StoreResult<()> {
        let mut state = self.store.state.write().await;
        state
            .products
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound {
                entity: "Product",
                id,
            })
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn get_by_id(&self, id: CategoryId) -> StoreResult<Category> {
        self.find_by_id(id).await?.ok_or(StoreError::NotFound {
            entity: "Category",
            id,
        })
    }

    async fn find_by_id(&self, id: CategoryId) -> StoreResult<Option<Category>> {
        Ok(self.store.state.read().await.category(id))
    }

    async fn exists_by_id(&self, id: CategoryId) -> StoreResult<bool> {
        Ok(self.store.state.read().await.categories.contains_key(&id))
    }

    async fn find_page(&self, request: PageRequest<CategorySort>) -> StoreResult<Page<Category>> {
        let state = self.store.state.read().await;
        let rows: Vec<(CategoryId, &String)> = state
            .categories
            .iter()
            .map(|(id, name)| (*id, name))
            .collect();

        let page = page_of(rows, &request, |(a_id, a), (b_id, b)| {
            let primary = match request.sort.by {
                CategorySort::Id => Ordering::Equal,
                CategorySort::Name => a.cmp(b),
            };
            primary.then(a_id.cmp(b_id))
        });

        Ok(page.map(|(id, name)| Category {
            id,
            name: name.clone(),
        }))
    }

    async fn save(&self, draft: CategoryDraft) -> StoreResult<Category> {
        let mut state = self.store.state.write().await;

        let id = match draft.id {
            Some(id) if state.categories.contains_key(&id) => id,
            Some(id) => {
                return Err(StoreError::NotFound {
                    entity: "Category",
                    id,
                });
            }
            None => {
                state.last_category_id += 1;
                state.last_category_id
            }
        };

        state.categories.insert(id, draft.name.clone());
        Ok(Category {
            id,
            name: draft.name,
        })
    }

    async fn delete_by_id(&self, id: CategoryId) -> StoreResult<()> {
        let mut state = self.store.state.write().await;

        if !state.categories.contains_key(&id) {
            return Err(StoreError::NotFound {
                entity: "Category",
                id,
            });
        }
        if let Some((product_id, _)) = state
            .products
            .iter()
            .find(|(_, row)| row.categories.contains(&id))
        {
            return Err(StoreError::IntegrityViolation(format!(
                "Category {id} is still referenced by product {product_id}"
            )));
        }

        state.categories.remove(&id);
        Ok(())
    }
}
