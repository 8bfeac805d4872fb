//! In-memory repository doubles for agent and interface tests.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use papyra_core::domain::category::{Category, CategoryDraft, CategoryId};
use papyra_core::domain::order::{Order, OrderDraft, OrderId, OrderStatus};
use papyra_core::domain::product::{Product, ProductDraft, ProductId};

use super::{
    CategoryRepository, OrderRepository, ProductRepository, RepositoryError,
};

#[derive(Default)]
pub struct InMemoryProductRepository {
    products: Mutex<Vec<Product>>,
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let mut products = self.products.lock().expect("product store poisoned").clone();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(products)
    }

    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let products = self.products.lock().expect("product store poisoned");
        Ok(products.iter().find(|product| &product.id == id).cloned())
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
        self.products.lock().expect("product store poisoned").push(product.clone());
        Ok(product)
    }

    async fn update(&self, id: &ProductId, draft: ProductDraft) -> Result<bool, RepositoryError> {
        let mut products = self.products.lock().expect("product store poisoned");
        let Some(existing) = products.iter_mut().find(|product| &product.id == id) else {
            return Ok(false);
        };
        existing.name = draft.name;
        existing.description = draft.description;
        existing.price = draft.price;
        existing.promotional_price = draft.promotional_price;
        existing.cost_price = draft.cost_price;
        existing.stock = draft.stock;
        existing.category = draft.category;
        existing.image_url = draft.image_url;
        existing.images = draft.images;
        existing.featured = draft.featured;
        existing.details = draft.details;
        Ok(true)
    }

    async fn delete(&self, id: &ProductId) -> Result<bool, RepositoryError> {
        let mut products = self.products.lock().expect("product store poisoned");
        let before = products.len();
        products.retain(|product| &product.id != id);
        Ok(products.len() < before)
    }
}

#[derive(Default)]
pub struct InMemoryCategoryRepository {
    categories: Mutex<Vec<Category>>,
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn list(&self) -> Result<Vec<Category>, RepositoryError> {
        let mut categories = self.categories.lock().expect("category store poisoned").clone();
        categories.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(categories)
    }

    async fn create(&self, draft: CategoryDraft) -> Result<Category, RepositoryError> {
        let category = Category {
            id: CategoryId::new(),
            name: draft.name,
            image_url: draft.image_url,
            created_at: Utc::now(),
        };
        self.categories.lock().expect("category store poisoned").push(category.clone());
        Ok(category)
    }

    async fn update(
        &self,
        id: &CategoryId,
        draft: CategoryDraft,
    ) -> Result<bool, RepositoryError> {
        let mut categories = self.categories.lock().expect("category store poisoned");
        let Some(existing) = categories.iter_mut().find(|category| &category.id == id) else {
            return Ok(false);
        };
        existing.name = draft.name;
        existing.image_url = draft.image_url;
        Ok(true)
    }

    async fn delete(&self, id: &CategoryId) -> Result<bool, RepositoryError> {
        let mut categories = self.categories.lock().expect("category store poisoned");
        let before = categories.len();
        categories.retain(|category| &category.id != id);
        Ok(categories.len() < before)
    }
}

/// Order store double. `fail_with` flips every call into an error so tests
/// can exercise the degraded paths.
#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: Mutex<Vec<Order>>,
    failure: Mutex<Option<String>>,
}

impl InMemoryOrderRepository {
    pub fn with_orders(orders: Vec<Order>) -> Self {
        Self { orders: Mutex::new(orders), failure: Mutex::new(None) }
    }

    pub fn fail_with(&self, message: impl Into<String>) {
        *self.failure.lock().expect("failure flag poisoned") = Some(message.into());
    }

    pub fn recover(&self) {
        *self.failure.lock().expect("failure flag poisoned") = None;
    }

    fn check_failure(&self) -> Result<(), RepositoryError> {
        match self.failure.lock().expect("failure flag poisoned").clone() {
            Some(message) => Err(RepositoryError::Decode(message)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn create(&self, draft: OrderDraft) -> Result<Order, RepositoryError> {
        self.check_failure()?;
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
        self.orders.lock().expect("order store poisoned").push(order.clone());
        Ok(order)
    }

    async fn list_recent(&self) -> Result<Vec<Order>, RepositoryError> {
        self.check_failure()?;
        let mut orders = self.orders.lock().expect("order store poisoned").clone();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn find_by_document(&self, document: &str) -> Result<Vec<Order>, RepositoryError> {
        self.check_failure()?;
        let mut orders: Vec<Order> = self
            .orders
            .lock()
            .expect("order store poisoned")
            .iter()
            .filter(|order| order.customer_document.as_deref() == Some(document))
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn update_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
    ) -> Result<bool, RepositoryError> {
        self.check_failure()?;
        let mut orders = self.orders.lock().expect("order store poisoned");
        let Some(existing) = orders.iter_mut().find(|order| &order.id == id) else {
            return Ok(false);
        };
        existing.status = status;
        Ok(true)
    }

    async fn set_tracking_code(&self, id: &OrderId, code: &str) -> Result<bool, RepositoryError> {
        self.check_failure()?;
        let mut orders = self.orders.lock().expect("order store poisoned");
        let Some(existing) = orders.iter_mut().find(|order| &order.id == id) else {
            return Ok(false);
        };
        existing.tracking_code = Some(code.to_string());
        Ok(true)
    }
}
