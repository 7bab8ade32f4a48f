//! # Product Repository
//!
//! Database operations for the catalog.
//!
//! ## Role at Checkout
//! This is the "catalog store" the order transaction reads: current product
//! name and image are fetched inside the transaction to build order item
//! snapshots. Everything else here serves the storefront pages and the
//! admin back-office.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use luxe_core::Product;

/// Repository for catalog database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let featured = repo.list_featured(8).await?;
/// let product = repo.get_by_id("uuid-here").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, price_cents, category, image_url,
                   featured, is_active, created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Lists active products, newest first.
    pub async fn list_active(&self, limit: u32) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, price_cents, category, image_url,
                   featured, is_active, created_at, updated_at
            FROM products
            WHERE is_active = 1
            ORDER BY created_at DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Lists active products in a category, newest first.
    pub async fn list_by_category(&self, category: &str, limit: u32) -> DbResult<Vec<Product>> {
        debug!(category = %category, "Listing products by category");

        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, price_cents, category, image_url,
                   featured, is_active, created_at, updated_at
            FROM products
            WHERE is_active = 1 AND category = ?1
            ORDER BY created_at DESC
            LIMIT ?2
            "#,
        )
        .bind(category)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Lists featured active products for the storefront home page.
    pub async fn list_featured(&self, limit: u32) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, price_cents, category, image_url,
                   featured, is_active, created_at, updated_at
            FROM products
            WHERE is_active = 1 AND featured = 1
            ORDER BY created_at DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Inserts a new product (admin).
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, description, price_cents, category, image_url,
                featured, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(&product.category)
        .bind(&product.image_url)
        .bind(product.featured)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates an existing product (admin).
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, "Updating product");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                description = ?3,
                price_cents = ?4,
                category = ?5,
                image_url = ?6,
                featured = ?7,
                is_active = ?8,
                updated_at = ?9
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(&product.category)
        .bind(&product.image_url)
        .bind(product.featured)
        .bind(product.is_active)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        Ok(())
    }

    /// Soft-deletes a product by setting is_active = false.
    ///
    /// ## Why Soft Delete?
    /// Historical order items still reference this product's id; a hard
    /// delete would break those foreign keys.
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting product");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET is_active = 0, updated_at = ?2
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts active products (for diagnostics and seed idempotence).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Helper to generate a new product ID.
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn product(name: &str, price_cents: i64, category: &str, featured: bool) -> Product {
        let now = Utc::now();
        Product {
            id: generate_product_id(),
            name: name.to_string(),
            description: None,
            price_cents,
            category: Some(category.to_string()),
            image_url: Some("/placeholder.svg".to_string()),
            featured,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        let p = product("Classic Watch", 39999, "Accessories", true);
        repo.insert(&p).await.unwrap();

        let fetched = repo.get_by_id(&p.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Classic Watch");
        assert_eq!(fetched.price_cents, 39999);
        assert!(fetched.featured);

        assert!(repo.get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_by_category_and_featured() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        repo.insert(&product("Leather Jacket", 29999, "Outerwear", true))
            .await
            .unwrap();
        repo.insert(&product("Silk Dress", 19999, "Dresses", false))
            .await
            .unwrap();
        repo.insert(&product("Designer Handbag", 49999, "Accessories", true))
            .await
            .unwrap();

        let outerwear = repo.list_by_category("Outerwear", 10).await.unwrap();
        assert_eq!(outerwear.len(), 1);
        assert_eq!(outerwear[0].name, "Leather Jacket");

        let featured = repo.list_featured(10).await.unwrap();
        assert_eq!(featured.len(), 2);
    }

    #[tokio::test]
    async fn test_update_and_soft_delete() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        let mut p = product("Silk Dress", 19999, "Dresses", false);
        repo.insert(&p).await.unwrap();

        p.price_cents = 17999;
        repo.update(&p).await.unwrap();
        assert_eq!(
            repo.get_by_id(&p.id).await.unwrap().unwrap().price_cents,
            17999
        );

        repo.soft_delete(&p.id).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 0);
        // Still fetchable by id - order history needs it
        assert!(repo.get_by_id(&p.id).await.unwrap().is_some());

        // Unknown ids surface NotFound
        assert!(matches!(
            repo.soft_delete("missing").await,
            Err(DbError::NotFound { .. })
        ));
    }
}
