pub mod config;
pub mod domain;
pub mod errors;

pub use domain::category::{Category, CategoryDraft, CategoryId};
pub use domain::chat::{ChatRole, Message};
pub use domain::order::{
    Order, OrderDraft, OrderId, OrderItem, OrderStatus, OrderSummary,
};
pub use domain::product::{
    Benefit, Product, ProductDetails, ProductDraft, ProductId, SpecEntry,
};
pub use errors::{ApplicationError, DomainError, InterfaceError};
