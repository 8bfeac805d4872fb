use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{sqlite::SqliteRow, Row};
use uuid::Uuid;

use papyra_core::domain::product::{Product, ProductDetails, ProductDraft, ProductId};

use super::{ProductRepository, RepositoryError};
use crate::DbPool;

pub struct SqlProductRepository {
    pool: DbPool,
}

impl SqlProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn product_from_row(row: &SqliteRow) -> Result<Product, RepositoryError> {
        let id_raw: String = row.try_get("id")?;
        let id = Uuid::parse_str(&id_raw)
            .map_err(|error| RepositoryError::Decode(format!("invalid product id: {error}")))?;

        let images_json: String = row.try_get("images_json")?;
        let images: Vec<String> = serde_json::from_str(&images_json)
            .map_err(|error| RepositoryError::Decode(format!("invalid images_json: {error}")))?;

        let details_json: Option<String> = row.try_get("details_json")?;
        let details: Option<ProductDetails> = match details_json {
            Some(raw) => Some(serde_json::from_str(&raw).map_err(|error| {
                RepositoryError::Decode(format!("invalid details_json: {error}"))
            })?),
            None => None,
        };

        Ok(Product {
            id: ProductId(id),
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            price: parse_decimal("price", &row.try_get::<String, _>("price")?)?,
            promotional_price: parse_optional_decimal(
                "promotional_price",
                row.try_get::<Option<String>, _>("promotional_price")?,
            )?,
            cost_price: parse_optional_decimal(
                "cost_price",
                row.try_get::<Option<String>, _>("cost_price")?,
            )?,
            stock: row.try_get("stock")?,
            category: row.try_get("category")?,
            image_url: row.try_get("image_url")?,
            images,
            featured: row.try_get::<i64, _>("featured")? != 0,
            details,
            created_at: parse_timestamp("created_at", &row.try_get::<String, _>("created_at")?)?,
        })
    }
}

const PRODUCT_COLUMNS: &str = "id, name, description, price, promotional_price, cost_price, \
     stock, category, image_url, images_json, featured, details_json, created_at";

#[async_trait::async_trait]
impl ProductRepository for SqlProductRepository {
    async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::product_from_row).collect()
    }

    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let row =
            sqlx::query(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?"))
                .bind(id.0.to_string())
                .fetch_optional(&self.pool)
                .await?;

        row.as_ref().map(Self::product_from_row).transpose()
    }

    async fn create(&self, draft: ProductDraft) -> Result<Product, RepositoryError> {
        let product = Product {
            id: ProductId::new(),
            name: draft.name,
            description: draft.description,
            price: draft.price,
            promotional_price: draft.promotional_price,
            cost_price: draft.cost_price,
            stock: draft.stock,
            category: draft.category,
            image_url: draft.image_url,
            images: draft.images,
            featured: draft.featured,
            details: draft.details,
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO products (
                id, name, description, price, promotional_price, cost_price,
                stock, category, image_url, images_json, featured, details_json, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(product.id.0.to_string())
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price.to_string())
        .bind(product.promotional_price.map(|value| value.to_string()))
        .bind(product.cost_price.map(|value| value.to_string()))
        .bind(product.stock)
        .bind(&product.category)
        .bind(&product.image_url)
        .bind(encode_json("images", &product.images)?)
        .bind(i64::from(product.featured))
        .bind(product.details.as_ref().map(|details| encode_json("details", details)).transpose()?)
        .bind(product.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(product)
    }

    async fn update(&self, id: &ProductId, draft: ProductDraft) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE products SET
                name = ?, description = ?, price = ?, promotional_price = ?, cost_price = ?,
                stock = ?, category = ?, image_url = ?, images_json = ?, featured = ?,
                details_json = ?
             WHERE id = ?",
        )
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(draft.price.to_string())
        .bind(draft.promotional_price.map(|value| value.to_string()))
        .bind(draft.cost_price.map(|value| value.to_string()))
        .bind(draft.stock)
        .bind(&draft.category)
        .bind(&draft.image_url)
        .bind(encode_json("images", &draft.images)?)
        .bind(i64::from(draft.featured))
        .bind(draft.details.as_ref().map(|details| encode_json("details", details)).transpose()?)
        .bind(id.0.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: &ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id.0.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

pub(crate) fn parse_decimal(field: &str, value: &str) -> Result<Decimal, RepositoryError> {
    Decimal::from_str(value)
        .map_err(|error| RepositoryError::Decode(format!("invalid decimal for {field}: {error}")))
}

pub(crate) fn parse_optional_decimal(
    field: &str,
    value: Option<String>,
) -> Result<Option<Decimal>, RepositoryError> {
    value.map(|raw| parse_decimal(field, &raw)).transpose()
}

pub(crate) fn parse_timestamp(field: &str, value: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|error| RepositoryError::Decode(format!("invalid timestamp for {field}: {error}")))
}

pub(crate) fn encode_json<T: serde::Serialize>(
    field: &str,
    value: &T,
) -> Result<String, RepositoryError> {
    serde_json::to_string(value)
        .map_err(|error| RepositoryError::Decode(format!("failed to encode {field}: {error}")))
}
