//! Integration tests for the Postgres repositories
//!
//! Each test starts its own PostgreSQL container with the catalog migrations
//! applied. Tests named `seeded` rely on the seed rows (Electronics = 1,
//! Books = 2, Computers = 3, Phone = 1 in Electronics).

use chrono::{TimeZone, Utc};
use domain_catalog::pagination::{CategorySort, Direction, ProductSort};
use domain_catalog::*;
use test_utils::assertions::{assert_id_eq, assert_some};
use test_utils::{TestDataBuilder, TestDatabase};

fn services(
    db: &TestDatabase,
) -> (
    ProductService<PgProductRepository, PgCategoryRepository>,
    CategoryService<PgCategoryRepository>,
) {
    (
        ProductService::new(
            PgProductRepository::new(db.connection()),
            PgCategoryRepository::new(db.connection()),
        ),
        CategoryService::new(PgCategoryRepository::new(db.connection())),
    )
}

fn category(id: i64) -> CategoryDto {
    CategoryDto {
        id: Some(id),
        name: String::new(),
    }
}

fn product(builder: &TestDataBuilder, categories: Vec<CategoryDto>) -> ProductDto {
    ProductDto {
        id: None,
        name: builder.name("product", "main"),
        description: "Integration test product".to_string(),
        price: builder.price(),
        img_url: builder.img_url("main"),
        date: Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()),
        categories,
    }
}

#[tokio::test]
async fn test_seeded_find_by_id_loads_categories() {
    let db = TestDatabase::new().await;
    let (products, _) = services(&db);

    let phone = products.find_by_id(1).await.unwrap();

    assert_eq!(phone.name, "Phone");
    assert_eq!(phone.description, "Good Phone");
    assert_eq!(phone.price, 800.0);
    assert_eq!(
        phone.date,
        Some(Utc.with_ymd_and_hms(2020, 10, 20, 3, 0, 0).unwrap())
    );
    assert_eq!(
        phone.categories,
        vec![CategoryDto {
            id: Some(1),
            name: "Electronics".to_string()
        }]
    );

    let err = products.find_by_id(1000).await.unwrap_err();
    assert!(matches!(err, CatalogError::ResourceNotFound(_)));
}

#[tokio::test]
async fn test_seeded_delete_linked_category_is_database_error() {
    let db = TestDatabase::new().await;
    let (products, categories) = services(&db);

    let err = categories.delete(1).await.unwrap_err();
    assert!(matches!(err, CatalogError::Database(_)));
    assert!(PgCategoryRepository::new(db.connection()).exists_by_id(1).await.unwrap());

    // Product rows cascade to their links, then Books is free to go
    products.delete(2).await.unwrap();
    categories.delete(2).await.unwrap();
    assert!(!PgCategoryRepository::new(db.connection()).exists_by_id(2).await.unwrap());
}

#[tokio::test]
async fn test_insert_then_find_round_trips_scalars() {
    let db = TestDatabase::empty().await;
    let (products, categories) = services(&db);
    let builder = TestDataBuilder::from_test_name("pg_insert_find");
    let electronics = categories
        .insert(CategoryDto {
            id: None,
            name: "Electronics".to_string(),
        })
        .await
        .unwrap();
    assert_id_eq(electronics.id, 1, "first category");

    let input = product(&builder, vec![category(1)]);
    let created = products.insert(input.clone()).await.unwrap();
    let id = assert_some(created.id, "inserted product id");

    let found = products.find_by_id(id).await.unwrap();
    assert_eq!(found.name, input.name);
    assert_eq!(found.description, input.description);
    assert_eq!(found.price, input.price);
    assert_eq!(found.img_url, input.img_url);
    assert_eq!(found.date, input.date);
    assert_eq!(found.categories, vec![electronics]);
}

#[tokio::test]
async fn test_insert_with_unknown_category_writes_nothing() {
    let db = TestDatabase::empty().await;
    let (products, _) = services(&db);
    let builder = TestDataBuilder::from_test_name("pg_unknown_category");

    let err = products
        .insert(product(&builder, vec![category(77)]))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CatalogError::Store(StoreError::EntityReference(_))
    ));
    assert_eq!(db.count("products").await, 0);
    assert_eq!(db.count("product_categories").await, 0);
}

#[tokio::test]
async fn test_update_replaces_links_and_keeps_date() {
    let db = TestDatabase::new().await;
    let (products, _) = services(&db);
    let builder = TestDataBuilder::from_test_name("pg_update");

    let updated = products
        .update(1, product(&builder, vec![category(2), category(3)]))
        .await
        .unwrap();

    assert_id_eq(updated.id, 1, "updated product");
    assert_eq!(updated.name, builder.name("product", "main"));
    assert_eq!(
        updated.date,
        Some(Utc.with_ymd_and_hms(2020, 10, 20, 3, 0, 0).unwrap())
    );
    let ids: Vec<_> = updated.categories.iter().filter_map(|c| c.id).collect();
    assert_eq!(ids, [2, 3]);
}

#[tokio::test]
async fn test_update_absent_id_leaves_rows_untouched() {
    let db = TestDatabase::new().await;
    let (products, _) = services(&db);
    let builder = TestDataBuilder::from_test_name("pg_update_absent");
    let before = products.find_by_id(1).await.unwrap();

    let err = products
        .update(404, product(&builder, vec![category(1)]))
        .await
        .unwrap_err();

    assert!(matches!(err, CatalogError::ResourceNotFound(_)));
    assert_eq!(db.count("products").await, 3);
    assert_eq!(products.find_by_id(1).await.unwrap(), before);
}

#[tokio::test]
async fn test_delete_absent_id_is_not_found() {
    let db = TestDatabase::new().await;
    let (products, categories) = services(&db);

    assert!(matches!(
        products.delete(404).await.unwrap_err(),
        CatalogError::ResourceNotFound(_)
    ));
    assert!(matches!(
        categories.delete(404).await.unwrap_err(),
        CatalogError::ResourceNotFound(_)
    ));
}

#[tokio::test]
async fn test_find_all_paged_reports_true_total() {
    let db = TestDatabase::empty().await;
    let (products, _) = services(&db);

    for i in 0..12 {
        let builder = TestDataBuilder::new(i);
        products.insert(product(&builder, vec![])).await.unwrap();
    }

    let first = products
        .find_all_paged(PageRequest::new(0, 10))
        .await
        .unwrap();
    assert_eq!(first.content.len(), 10);
    assert_eq!(first.total_elements, 12);
    assert_eq!(first.total_pages, 2);

    let second = products
        .find_all_paged(PageRequest::new(1, 10))
        .await
        .unwrap();
    assert_eq!(second.content.len(), 2);
}

#[tokio::test]
async fn test_seeded_find_all_paged_sorts() {
    let db = TestDatabase::new().await;
    let (products, categories) = services(&db);

    let page = products
        .find_all_paged(PageRequest::new(0, 10).sorted_by(ProductSort::Price, Direction::Desc))
        .await
        .unwrap();
    let names: Vec<_> = page.content.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["PC Gamer", "Phone", "The Lord of the Rings"]);
    assert_eq!(page.content[0].categories.len(), 2);

    let page = categories
        .find_all_paged(PageRequest::new(0, 2).sorted_by(CategorySort::Name, Direction::Asc))
        .await
        .unwrap();
    let names: Vec<_> = page.content.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Books", "Computers"]);
    assert_eq!(page.total_elements, 3);
}
