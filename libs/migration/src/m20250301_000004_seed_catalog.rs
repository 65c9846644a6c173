use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // Ids come from the sequences: Electronics = 1, Books = 2, Computers = 3
        db.execute_unprepared(
            r#"
            INSERT INTO categories (name)
            VALUES ('Electronics'), ('Books'), ('Computers')
            "#,
        )
        .await?;

        db.execute_unprepared(
            r#"
            INSERT INTO products (name, description, price, img_url, date)
            VALUES
                (
                    'Phone',
                    'Good Phone',
                    800.0,
                    'https://img.com/img.png',
                    TIMESTAMPTZ '2020-10-20T03:00:00Z'
                ),
                (
                    'The Lord of the Rings',
                    'Complete trilogy, illustrated hardcover edition',
                    90.5,
                    'https://img.com/lotr.png',
                    TIMESTAMPTZ '2020-07-13T20:50:07Z'
                ),
                (
                    'PC Gamer',
                    'Desktop with a dedicated graphics card',
                    1250.0,
                    'https://img.com/pc.png',
                    TIMESTAMPTZ '2020-07-14T10:00:00Z'
                )
            "#,
        )
        .await?;

        db.execute_unprepared(
            r#"
            INSERT INTO product_categories (product_id, category_id)
            SELECT p.id, c.id
            FROM products p
            JOIN categories c ON (p.name, c.name) IN (
                ('Phone', 'Electronics'),
                ('The Lord of the Rings', 'Books'),
                ('PC Gamer', 'Electronics'),
                ('PC Gamer', 'Computers')
            )
            ON CONFLICT DO NOTHING
            "#,
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                "TRUNCATE product_categories, products, categories RESTART IDENTITY",
            )
            .await?;

        Ok(())
    }
}
