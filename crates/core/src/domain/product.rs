use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId(pub Uuid);

impl ProductId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ProductId {
    fn default() -> Self {
        Self::new()
    }
}

/// Rich product copy rendered on the product page. Stored as a JSON column.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDetails {
    #[serde(default)]
    pub long_description: Option<String>,
    #[serde(default)]
    pub benefits: Vec<Benefit>,
    #[serde(default)]
    pub specs: Vec<SpecEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Benefit {
    pub title: String,
    pub desc: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecEntry {
    pub label: String,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    /// "For" price shown when the product is on promotion.
    pub promotional_price: Option<Decimal>,
    /// Internal cost price, never exposed on the storefront.
    pub cost_price: Option<Decimal>,
    pub stock: i64,
    pub category: String,
    pub image_url: String,
    pub images: Vec<String>,
    pub featured: bool,
    pub details: Option<ProductDetails>,
    pub created_at: DateTime<Utc>,
}

/// Fields accepted when creating or updating a product. Identifier and
/// creation timestamp are assigned by the store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub promotional_price: Option<Decimal>,
    #[serde(default)]
    pub cost_price: Option<Decimal>,
    #[serde(default)]
    pub stock: i64,
    pub category: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub details: Option<ProductDetails>,
}
