use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row};
use uuid::Uuid;

use papyra_core::domain::order::{Order, OrderDraft, OrderId, OrderItem, OrderStatus};

use super::product::{encode_json, parse_decimal, parse_timestamp};
use super::{OrderRepository, RepositoryError};
use crate::DbPool;

pub struct SqlOrderRepository {
    pool: DbPool,
}

impl SqlOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn order_from_row(row: &SqliteRow) -> Result<Order, RepositoryError> {
        let id_raw: String = row.try_get("id")?;
        let id = Uuid::parse_str(&id_raw)
            .map_err(|error| RepositoryError::Decode(format!("invalid order id: {error}")))?;

        let status_raw: String = row.try_get("status")?;
        let status: OrderStatus = status_raw
            .parse()
            .map_err(|error| RepositoryError::Decode(format!("invalid order status: {error}")))?;

        let items_json: String = row.try_get("items_json")?;
        let items: Vec<OrderItem> = serde_json::from_str(&items_json)
            .map_err(|error| RepositoryError::Decode(format!("invalid items_json: {error}")))?;

        Ok(Order {
            id: OrderId(id),
            customer_name: row.try_get("customer_name")?,
            customer_document: row.try_get("customer_document")?,
            total: parse_decimal("total", &row.try_get::<String, _>("total")?)?,
            status,
            tracking_code: row.try_get("tracking_code")?,
            shipping_method: row.try_get("shipping_method")?,
            created_at: parse_timestamp("created_at", &row.try_get::<String, _>("created_at")?)?,
            items,
        })
    }
}

const ORDER_COLUMNS: &str = "id, customer_name, customer_document, total, status, \
     tracking_code, shipping_method, created_at, items_json";

#[async_trait::async_trait]
impl OrderRepository for SqlOrderRepository {
    async fn create(&self, draft: OrderDraft) -> Result<Order, RepositoryError> {
        let order = Order {
            id: OrderId::new(),
            customer_name: draft.customer_name,
            customer_document: draft.customer_document,
            total: draft.total,
            status: OrderStatus::Pending,
            tracking_code: None,
            shipping_method: draft.shipping_method,
            created_at: Utc::now(),
            items: draft.items,
        };

        sqlx::query(
            "INSERT INTO orders (
                id, customer_name, customer_document, total, status,
                tracking_code, shipping_method, created_at, items_json
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(order.id.0.to_string())
        .bind(&order.customer_name)
        .bind(&order.customer_document)
        .bind(order.total.to_string())
        .bind(order.status.as_str())
        .bind(&order.tracking_code)
        .bind(&order.shipping_method)
        .bind(order.created_at.to_rfc3339())
        .bind(encode_json("items", &order.items)?)
        .execute(&self.pool)
        .await?;

        Ok(order)
    }

    async fn list_recent(&self) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::order_from_row).collect()
    }

    async fn find_by_document(&self, document: &str) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders
             WHERE customer_document = ?
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(document)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::order_from_row).collect()
    }

    async fn update_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("UPDATE orders SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id.0.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_tracking_code(&self, id: &OrderId, code: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query("UPDATE orders SET tracking_code = ? WHERE id = ?")
            .bind(code)
            .bind(id.0.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use papyra_core::domain::order::{OrderDraft, OrderItem, OrderStatus};
    use papyra_core::domain::product::ProductId;

    use super::SqlOrderRepository;
    use crate::repositories::OrderRepository;
    use crate::{connect_with_settings, migrations, DbPool};

    async fn setup_pool() -> DbPool {
        let pool = connect_with_settings("sqlite::memory:?cache=shared", 1, 30)
            .await
            .expect("connect test pool");
        migrations::run_pending(&pool).await.expect("run migrations");
        pool
    }

    fn draft(customer: &str, document: Option<&str>, total_cents: i64) -> OrderDraft {
        OrderDraft {
            customer_name: customer.to_string(),
            customer_document: document.map(str::to_string),
            total: Decimal::new(total_cents, 2),
            shipping_method: Some("standard".to_string()),
            items: vec![OrderItem {
                product_id: ProductId::new(),
                name: "Annual planner".to_string(),
                unit_price: Decimal::new(total_cents, 2),
                quantity: 1,
            }],
        }
    }

    #[tokio::test]
    async fn create_starts_pending_without_tracking() {
        let pool = setup_pool().await;
        let repo = SqlOrderRepository::new(pool.clone());

        let created =
            repo.create(draft("Ana Lima", Some("123.456.789-00"), 12990)).await.expect("create");
        assert_eq!(created.status, OrderStatus::Pending);
        assert!(created.tracking_code.is_none());

        let listed = repo.list_recent().await.expect("list");
        assert_eq!(listed, vec![created]);

        pool.close().await;
    }

    #[tokio::test]
    async fn find_by_document_is_exact_and_newest_first() {
        let pool = setup_pool().await;
        let repo = SqlOrderRepository::new(pool.clone());

        repo.create(draft("Ana Lima", Some("123.456.789-00"), 12990)).await.expect("create a");
        repo.create(draft("Ana Lima", Some("123.456.789-00"), 4500)).await.expect("create b");
        repo.create(draft("Rui Alves", Some("98.765.432/0001-10"), 990)).await.expect("create c");
        repo.create(draft("Walk-in", None, 1500)).await.expect("create d");

        let matches = repo.find_by_document("123.456.789-00").await.expect("find");
        assert_eq!(matches.len(), 2);
        assert!(matches.iter().all(|order| {
            order.customer_document.as_deref() == Some("123.456.789-00")
        }));
        assert!(matches[0].created_at >= matches[1].created_at);

        let none = repo.find_by_document("000.000.000-00").await.expect("find none");
        assert!(none.is_empty());

        pool.close().await;
    }

    #[tokio::test]
    async fn status_and_tracking_updates_are_field_level() {
        let pool = setup_pool().await;
        let repo = SqlOrderRepository::new(pool.clone());

        let created =
            repo.create(draft("Ana Lima", Some("123.456.789-00"), 12990)).await.expect("create");

        assert!(repo.update_status(&created.id, OrderStatus::Shipped).await.expect("status"));
        assert!(repo.set_tracking_code(&created.id, "BR123456789TR").await.expect("tracking"));

        let fetched = repo.find_by_document("123.456.789-00").await.expect("find");
        assert_eq!(fetched[0].status, OrderStatus::Shipped);
        assert_eq!(fetched[0].tracking_code.as_deref(), Some("BR123456789TR"));

        let missing = papyra_core::domain::order::OrderId::new();
        assert!(!repo.update_status(&missing, OrderStatus::Paid).await.expect("missing status"));

        pool.close().await;
    }
}
