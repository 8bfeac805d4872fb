//! Deterministic demo catalog used by `papyra seed` and by bootstrap when
//! the store is empty. Inserts are idempotent so repeated seeds are safe.

use serde_json::json;
use uuid::{uuid, Uuid};

use crate::DbPool;

const DEMO_SEEDED_AT: &str = "2025-01-15T09:00:00+00:00";
const DEMO_ORDER_ID: Uuid = uuid!("7f9b4c7e-8d51-4a33-9c0e-2a1f6b3d5e90");
const DEMO_ORDER_DOCUMENT: &str = "123.456.789-00";
const DEMO_ORDER_TRACKING: &str = "BR123456789TR";

pub struct DemoCatalog;

#[derive(Clone, Debug)]
pub struct SeedResult {
    pub categories_seeded: usize,
    pub products_seeded: usize,
    pub orders_seeded: usize,
}

#[derive(Clone, Debug)]
pub struct SeedVerification {
    pub all_present: bool,
    pub checks: Vec<(&'static str, bool)>,
}

struct DemoCategory {
    id: Uuid,
    name: &'static str,
    image_url: &'static str,
}

struct DemoProduct {
    id: Uuid,
    name: &'static str,
    description: &'static str,
    price: &'static str,
    stock: i64,
    category: &'static str,
    featured: bool,
}

const DEMO_CATEGORIES: &[DemoCategory] = &[
    DemoCategory {
        id: uuid!("0a0f1d22-63a4-4f2e-a1c9-4b8f0d1e2a01"),
        name: "Notebooks",
        image_url: "https://images.example.com/categories/notebooks.jpg",
    },
    DemoCategory {
        id: uuid!("0a0f1d22-63a4-4f2e-a1c9-4b8f0d1e2a02"),
        name: "Writing",
        image_url: "https://images.example.com/categories/writing.jpg",
    },
    DemoCategory {
        id: uuid!("0a0f1d22-63a4-4f2e-a1c9-4b8f0d1e2a03"),
        name: "Organization",
        image_url: "https://images.example.com/categories/organization.jpg",
    },
    DemoCategory {
        id: uuid!("0a0f1d22-63a4-4f2e-a1c9-4b8f0d1e2a04"),
        name: "Accessories",
        image_url: "https://images.example.com/categories/accessories.jpg",
    },
    DemoCategory {
        id: uuid!("0a0f1d22-63a4-4f2e-a1c9-4b8f0d1e2a05"),
        name: "Gifts",
        image_url: "https://images.example.com/categories/gifts.jpg",
    },
];

const DEMO_PRODUCTS: &[DemoProduct] = &[
    DemoProduct {
        id: uuid!("3c6e8a10-97bb-4d45-8f02-6c1d9e4b7a01"),
        name: "Disc-bound notebook A5 rose pastel",
        description: "Disc-bound system that lets you add, remove, and rearrange \
             pages. Hard cover in rose pastel, 90gsm paper.",
        price: "89.90",
        stock: 25,
        category: "Notebooks",
        featured: true,
    },
    DemoProduct {
        id: uuid!("3c6e8a10-97bb-4d45-8f02-6c1d9e4b7a02"),
        name: "Vintage gel pen kit 0.5mm, 5 colors",
        description: "Fine 0.5mm needle tips with fast-dry pigmented gel ink. \
             Five retro shades for lettering and journaling.",
        price: "45.00",
        stock: 100,
        category: "Writing",
        featured: true,
    },
    DemoProduct {
        id: uuid!("3c6e8a10-97bb-4d45-8f02-6c1d9e4b7a03"),
        name: "Annual planner floral hardcover",
        description: "Monthly and weekly spreads, habit tracker, and budget \
             pages. Matte laminated hard cover with gold foil.",
        price: "129.90",
        stock: 15,
        category: "Organization",
        featured: true,
    },
];

impl DemoCatalog {
    pub async fn load(pool: &DbPool) -> Result<SeedResult, sqlx::Error> {
        let mut categories_seeded = 0usize;
        for category in DEMO_CATEGORIES {
            let result = sqlx::query(
                "INSERT INTO categories (id, name, image_url, created_at)
                 VALUES (?, ?, ?, ?)
                 ON CONFLICT (id) DO NOTHING",
            )
            .bind(category.id.to_string())
            .bind(category.name)
            .bind(category.image_url)
            .bind(DEMO_SEEDED_AT)
            .execute(pool)
            .await?;
            categories_seeded += result.rows_affected() as usize;
        }

        let mut products_seeded = 0usize;
        for product in DEMO_PRODUCTS {
            let result = sqlx::query(
                "INSERT INTO products (
                    id, name, description, price, promotional_price, cost_price,
                    stock, category, image_url, images_json, featured, details_json, created_at
                 ) VALUES (?, ?, ?, ?, NULL, NULL, ?, ?, '', '[]', ?, NULL, ?)
                 ON CONFLICT (id) DO NOTHING",
            )
            .bind(product.id.to_string())
            .bind(product.name)
            .bind(product.description)
            .bind(product.price)
            .bind(product.stock)
            .bind(product.category)
            .bind(i64::from(product.featured))
            .bind(DEMO_SEEDED_AT)
            .execute(pool)
            .await?;
            products_seeded += result.rows_affected() as usize;
        }

        let demo_items = json!([
            {
                "product_id": DEMO_PRODUCTS[0].id,
                "name": DEMO_PRODUCTS[0].name,
                "unit_price": "89.90",
                "quantity": 1
            }
        ]);
        let orders_result = sqlx::query(
            "INSERT INTO orders (
                id, customer_name, customer_document, total, status,
                tracking_code, shipping_method, created_at, items_json
             ) VALUES (?, 'Maria Souza', ?, '89.90', 'shipped', ?, 'express', ?, ?)
             ON CONFLICT (id) DO NOTHING",
        )
        .bind(DEMO_ORDER_ID.to_string())
        .bind(DEMO_ORDER_DOCUMENT)
        .bind(DEMO_ORDER_TRACKING)
        .bind(DEMO_SEEDED_AT)
        .bind(demo_items.to_string())
        .execute(pool)
        .await?;

        Ok(SeedResult {
            categories_seeded,
            products_seeded,
            orders_seeded: orders_result.rows_affected() as usize,
        })
    }

    pub async fn verify(pool: &DbPool) -> Result<SeedVerification, sqlx::Error> {
        let category_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM categories").fetch_one(pool).await?;
        let product_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products").fetch_one(pool).await?;
        let demo_order_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM orders WHERE id = ? AND tracking_code = ?",
        )
        .bind(DEMO_ORDER_ID.to_string())
        .bind(DEMO_ORDER_TRACKING)
        .fetch_one(pool)
        .await?;

        let checks = vec![
            ("categories", category_count >= DEMO_CATEGORIES.len() as i64),
            ("products", product_count >= DEMO_PRODUCTS.len() as i64),
            ("demo-order", demo_order_count == 1),
        ];
        let all_present = checks.iter().all(|(_, passed)| *passed);

        Ok(SeedVerification { all_present, checks })
    }

    pub async fn store_is_empty(pool: &DbPool) -> Result<bool, sqlx::Error> {
        let product_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products").fetch_one(pool).await?;
        let category_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM categories").fetch_one(pool).await?;
        Ok(product_count == 0 && category_count == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::DemoCatalog;
    use crate::repositories::{OrderRepository, SqlOrderRepository};
    use crate::{connect_with_settings, migrations, DbPool};

    async fn setup_pool() -> DbPool {
        let pool = connect_with_settings("sqlite::memory:?cache=shared", 1, 30)
            .await
            .expect("connect test pool");
        migrations::run_pending(&pool).await.expect("run migrations");
        pool
    }

    #[tokio::test]
    async fn seed_is_idempotent_and_verifies() {
        let pool = setup_pool().await;

        assert!(DemoCatalog::store_is_empty(&pool).await.expect("emptiness check"));

        let first = DemoCatalog::load(&pool).await.expect("first seed");
        assert_eq!(first.categories_seeded, 5);
        assert_eq!(first.products_seeded, 3);
        assert_eq!(first.orders_seeded, 1);

        let second = DemoCatalog::load(&pool).await.expect("second seed");
        assert_eq!(second.categories_seeded, 0);
        assert_eq!(second.products_seeded, 0);
        assert_eq!(second.orders_seeded, 0);

        let verification = DemoCatalog::verify(&pool).await.expect("verify");
        assert!(verification.all_present, "failed checks: {:?}", verification.checks);
        assert!(!DemoCatalog::store_is_empty(&pool).await.expect("emptiness check"));

        pool.close().await;
    }

    #[tokio::test]
    async fn demo_order_is_reachable_by_document_lookup() {
        let pool = setup_pool().await;
        DemoCatalog::load(&pool).await.expect("seed");

        let repo = SqlOrderRepository::new(pool.clone());
        let orders = repo.find_by_document("123.456.789-00").await.expect("lookup");

        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].tracking_code.as_deref(), Some("BR123456789TR"));
        assert_eq!(orders[0].status.as_str(), "shipped");

        pool.close().await;
    }
}
