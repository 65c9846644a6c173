use async_trait::async_trait;
use chrono::Utc;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, Order,
    PaginatorTrait, QueryFilter, QueryOrder, Select, SqlErr, TransactionTrait,
};
use std::collections::HashMap;

use crate::{
    entity::{category, product, product_category},
    error::{StoreError, StoreResult},
    models::{Category, CategoryDraft, CategoryId, Product, ProductDraft, ProductId},
    pagination::{CategorySort, Direction, Page, PageRequest, ProductSort},
    repository::{CategoryRepository, ProductRepository},
};

fn order(direction: Direction) -> Order {
    match direction {
        Direction::Asc => Order::Asc,
        Direction::Desc => Order::Desc,
    }
}

/// Maps foreign-key violations through `on_foreign_key`, everything else to `Database`.
fn classify(err: DbErr, on_foreign_key: fn(String) -> StoreError) -> StoreError {
    match err.sql_err() {
        Some(SqlErr::ForeignKeyConstraintViolation(msg)) => on_foreign_key(msg),
        _ => StoreError::Database(err.to_string()),
    }
}

fn not_found_on_missing_row(err: DbErr, entity: &'static str, id: i64) -> StoreError {
    match err {
        DbErr::RecordNotUpdated => StoreError::NotFound { entity, id },
        other => StoreError::Database(other.to_string()),
    }
}

/// Categories of each product in `product_ids`, ordered by category id.
async fn load_categories<C: ConnectionTrait>(
    db: &C,
    product_ids: &[ProductId],
) -> Result<HashMap<ProductId, Vec<Category>>, DbErr> {
    if product_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let links = product_category::Entity::find()
        .filter(product_category::Column::ProductId.is_in(product_ids.iter().copied()))
        .find_also_related(category::Entity)
        .order_by_asc(product_category::Column::CategoryId)
        .all(db)
        .await?;

    let mut by_product: HashMap<ProductId, Vec<Category>> = HashMap::new();
    for (link, category) in links {
        if let Some(category) = category {
            by_product
                .entry(link.product_id)
                .or_default()
                .push(category.into());
        }
    }
    Ok(by_product)
}

fn into_product(model: product::Model, categories: Vec<Category>) -> Product {
    Product {
        id: model.id,
        name: model.name,
        description: model.description,
        price: model.price,
        img_url: model.img_url,
        date: model.date.with_timezone(&Utc),
        categories,
    }
}

pub struct PgProductRepository {
    db: DatabaseConnection,
}

impl PgProductRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn sorted(request: &PageRequest<ProductSort>) -> Select<product::Entity> {
        let column = match request.sort.by {
            ProductSort::Id => product::Column::Id,
            ProductSort::Name => product::Column::Name,
            ProductSort::Price => product::Column::Price,
            ProductSort::Date => product::Column::Date,
        };
        product::Entity::find()
            .order_by(column, order(request.sort.direction))
            .order_by_asc(product::Column::Id)
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn get_by_id(&self, id: ProductId) -> StoreResult<Product> {
        self.find_by_id(id).await?.ok_or(StoreError::NotFound {
            entity: "Product",
            id,
        })
    }

    async fn find_by_id(&self, id: ProductId) -> StoreResult<Option<Product>> {
        let Some(model) = product::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let mut categories = load_categories(&self.db, &[id]).await?;
        Ok(Some(into_product(
            model,
            categories.remove(&id).unwrap_or_default(),
        )))
    }

    async fn exists_by_id(&self, id: ProductId) -> StoreResult<bool> {
        let count = product::Entity::find_by_id(id).count(&self.db).await?;
        Ok(count > 0)
    }

    async fn find_page(&self, request: PageRequest<ProductSort>) -> StoreResult<Page<Product>> {
        let paginator = Self::sorted(&request).paginate(&self.db, request.size);
        let total = paginator.num_items().await?;
        // Past the end: skip the fetch, its OFFSET may not fit a bigint.
        if request.offset() >= total {
            return Ok(Page::new(Vec::new(), &request, total));
        }
        let models = paginator.fetch_page(request.page).await?;

        let ids: Vec<ProductId> = models.iter().map(|m| m.id).collect();
        let mut categories = load_categories(&self.db, &ids).await?;

        let content = models
            .into_iter()
            .map(|m| {
                let linked = categories.remove(&m.id).unwrap_or_default();
                into_product(m, linked)
            })
            .collect();

        Ok(Page::new(content, &request, total))
    }

    async fn save(&self, draft: ProductDraft) -> StoreResult<Product> {
        let txn = self.db.begin().await?;

        let row = product::ActiveModel {
            id: draft.id.map_or(NotSet, Set),
            name: Set(draft.name),
            description: Set(draft.description),
            price: Set(draft.price),
            img_url: Set(draft.img_url),
            date: Set(draft.date.into()),
        };
        let model = match draft.id {
            None => row.insert(&txn).await?,
            Some(id) => row
                .update(&txn)
                .await
                .map_err(|e| not_found_on_missing_row(e, "Product", id))?,
        };

        product_category::Entity::delete_many()
            .filter(product_category::Column::ProductId.eq(model.id))
            .exec(&txn)
            .await?;

        if !draft.categories.is_empty() {
            let links = draft
                .categories
                .iter()
                .map(|c| product_category::ActiveModel {
                    product_id: Set(model.id),
                    category_id: Set(c.id()),
                });
            product_category::Entity::insert_many(links)
                .exec(&txn)
                .await
                .map_err(|e| classify(e, StoreError::EntityReference))?;
        }

        let mut categories = load_categories(&txn, &[model.id]).await?;
        txn.commit().await?;

        let linked = categories.remove(&model.id).unwrap_or_default();
        match draft.id {
            None => tracing::info!(product_id = model.id, "Created product"),
            Some(_) => tracing::info!(product_id = model.id, "Updated product"),
        }
        Ok(into_product(model, linked))
    }

    async fn delete_by_id(&self, id: ProductId) -> StoreResult<()> {
        let result = product::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| classify(e, StoreError::IntegrityViolation))?;

        if result.rows_affected == 0 {
            return Err(StoreError::NotFound {
                entity: "Product",
                id,
            });
        }

        tracing::info!(product_id = id, "Deleted product");
        Ok(())
    }
}

pub struct PgCategoryRepository {
    db: DatabaseConnection,
}

impl PgCategoryRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn get_by_id(&self, id: CategoryId) -> StoreResult<Category> {
        self.find_by_id(id).await?.ok_or(StoreError::NotFound {
            entity: "Category",
            id,
        })
    }

    async fn find_by_id(&self, id: CategoryId) -> StoreResult<Option<Category>> {
        let model = category::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn exists_by_id(&self, id: CategoryId) -> StoreResult<bool> {
        let count = category::Entity::find_by_id(id).count(&self.db).await?;
        Ok(count > 0)
    }

    async fn find_page(&self, request: PageRequest<CategorySort>) -> StoreResult<Page<Category>> {
        let column = match request.sort.by {
            CategorySort::Id => category::Column::Id,
            CategorySort::Name => category::Column::Name,
        };
        let paginator = category::Entity::find()
            .order_by(column, order(request.sort.direction))
            .order_by_asc(category::Column::Id)
            .paginate(&self.db, request.size);

        let total = paginator.num_items().await?;
        if request.offset() >= total {
            return Ok(Page::new(Vec::new(), &request, total));
        }
        let models = paginator.fetch_page(request.page).await?;

        Ok(Page::new(
            models.into_iter().map(Into::into).collect(),
            &request,
            total,
        ))
    }

    async fn save(&self, draft: CategoryDraft) -> StoreResult<Category> {
        let now = Utc::now();

        let model = match draft.id {
            None => {
                let model = category::ActiveModel {
                    id: NotSet,
                    name: Set(draft.name),
                    created_at: Set(now.into()),
                    updated_at: Set(now.into()),
                }
                .insert(&self.db)
                .await?;
                tracing::info!(category_id = model.id, "Created category");
                model
            }
            Some(id) => {
                let model = category::ActiveModel {
                    id: Set(id),
                    name: Set(draft.name),
                    created_at: NotSet,
                    updated_at: Set(now.into()),
                }
                .update(&self.db)
                .await
                .map_err(|e| not_found_on_missing_row(e, "Category", id))?;
                tracing::info!(category_id = id, "Updated category");
                model
            }
        };

        Ok(model.into())
    }

    async fn delete_by_id(&self, id: CategoryId) -> StoreResult<()> {
        let result = category::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| classify(e, StoreError::IntegrityViolation))?;

        if result.rows_affected == 0 {
            return Err(StoreError::NotFound {
                entity: "Category",
                id,
            });
        }

        tracing::info!(category_id = id, "Deleted category");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::Sort;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::collections::BTreeMap;

    fn count_row(n: i64) -> BTreeMap<&'static str, sea_orm::Value> {
        BTreeMap::from([("num_items", sea_orm::Value::BigInt(Some(n)))])
    }

    #[tokio::test]
    async fn test_page_past_the_end_skips_fetch() {
        // Only the count query is mocked; a second query would fail.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![count_row(3)]])
            .into_connection();
        let repo = PgProductRepository::new(db);
        let request = PageRequest {
            page: u64::MAX,
            size: 20,
            sort: Sort::default(),
        };

        let page = repo.find_page(request).await.unwrap();

        assert!(page.content.is_empty());
        assert_eq!(page.total_elements, 3);
        assert_eq!(page.total_pages, 1);
    }

    #[tokio::test]
    async fn test_category_page_past_the_end_is_empty() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![count_row(2)]])
            .into_connection();
        let repo = PgCategoryRepository::new(db);

        let page = repo.find_page(PageRequest::new(5, 10)).await.unwrap();

        assert!(page.content.is_empty());
        assert_eq!(page.total_elements, 2);
    }

    #[tokio::test]
    async fn test_delete_missing_category_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();
        let repo = PgCategoryRepository::new(db);

        let err = repo.delete_by_id(5).await.unwrap_err();

        assert_eq!(
            err,
            StoreError::NotFound {
                entity: "Category",
                id: 5
            }
        );
    }

    #[tokio::test]
    async fn test_find_category_maps_model() {
        let now = Utc::now();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![category::Model {
                id: 2,
                name: "Electronics".to_string(),
                created_at: now.into(),
                updated_at: now.into(),
            }]])
            .into_connection();
        let repo = PgCategoryRepository::new(db);

        let found = repo.find_by_id(2).await.unwrap();

        assert_eq!(
            found,
            Some(Category {
                id: 2,
                name: "Electronics".to_string()
            })
        );
    }

    #[test]
    fn test_non_constraint_errors_are_database_errors() {
        let err = classify(
            DbErr::Custom("boom".to_string()),
            StoreError::IntegrityViolation,
        );
        assert!(matches!(err, StoreError::Database(_)));
    }
}
