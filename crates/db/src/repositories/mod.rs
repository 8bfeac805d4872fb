use async_trait::async_trait;
use thiserror::Error;

use papyra_core::domain::category::{Category, CategoryDraft, CategoryId};
use papyra_core::domain::order::{Order, OrderDraft, OrderId, OrderStatus};
use papyra_core::domain::product::{Product, ProductDraft, ProductId};

pub mod category;
pub mod memory;
pub mod order;
pub mod product;

pub use category::SqlCategoryRepository;
pub use memory::{InMemoryCategoryRepository, InMemoryOrderRepository, InMemoryProductRepository};
pub use order::SqlOrderRepository;
pub use product::SqlProductRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Product>, RepositoryError>;
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError>;
    async fn create(&self, draft: ProductDraft) -> Result<Product, RepositoryError>;
    async fn update(&self, id: &ProductId, draft: ProductDraft) -> Result<bool, RepositoryError>;
    async fn delete(&self, id: &ProductId) -> Result<bool, RepositoryError>;
}

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Category>, RepositoryError>;
    async fn create(&self, draft: CategoryDraft) -> Result<Category, RepositoryError>;
    async fn update(&self, id: &CategoryId, draft: CategoryDraft)
        -> Result<bool, RepositoryError>;
    async fn delete(&self, id: &CategoryId) -> Result<bool, RepositoryError>;
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn create(&self, draft: OrderDraft) -> Result<Order, RepositoryError>;
    async fn list_recent(&self) -> Result<Vec<Order>, RepositoryError>;
    /// Exact match on the customer document supplied at checkout, newest
    /// first. An unknown document is an empty result, not an error.
    async fn find_by_document(&self, document: &str) -> Result<Vec<Order>, RepositoryError>;
    async fn update_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
    ) -> Result<bool, RepositoryError>;
    async fn set_tracking_code(&self, id: &OrderId, code: &str) -> Result<bool, RepositoryError>;
}
