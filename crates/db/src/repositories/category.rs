use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row};
use uuid::Uuid;

use papyra_core::domain::category::{Category, CategoryDraft, CategoryId};

use super::product::parse_timestamp;
use super::{CategoryRepository, RepositoryError};
use crate::DbPool;

pub struct SqlCategoryRepository {
    pool: DbPool,
}

impl SqlCategoryRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn category_from_row(row: &SqliteRow) -> Result<Category, RepositoryError> {
        let id_raw: String = row.try_get("id")?;
        let id = Uuid::parse_str(&id_raw)
            .map_err(|error| RepositoryError::Decode(format!("invalid category id: {error}")))?;

        Ok(Category {
            id: CategoryId(id),
            name: row.try_get("name")?,
            image_url: row.try_get("image_url")?,
            created_at: parse_timestamp("created_at", &row.try_get::<String, _>("created_at")?)?,
        })
    }
}

#[async_trait::async_trait]
impl CategoryRepository for SqlCategoryRepository {
    async fn list(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, name, image_url, created_at FROM categories
             ORDER BY created_at ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::category_from_row).collect()
    }

    async fn create(&self, draft: CategoryDraft) -> Result<Category, RepositoryError> {
        let category = Category {
            id: CategoryId::new(),
            name: draft.name,
            image_url: draft.image_url,
            created_at: Utc::now(),
        };

        sqlx::query("INSERT INTO categories (id, name, image_url, created_at) VALUES (?, ?, ?, ?)")
            .bind(category.id.0.to_string())
            .bind(&category.name)
            .bind(&category.image_url)
            .bind(category.created_at.to_rfc3339())
            .execute(&self.pool)
            .await?;

        Ok(category)
    }

    async fn update(
        &self,
        id: &CategoryId,
        draft: CategoryDraft,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("UPDATE categories SET name = ?, image_url = ? WHERE id = ?")
            .bind(&draft.name)
            .bind(&draft.image_url)
            .bind(id.0.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: &CategoryId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id.0.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
