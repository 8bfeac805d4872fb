use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::warn;

use papyra_core::domain::order::OrderSummary;
use papyra_db::repositories::OrderRepository;

pub const ORDER_STATUS_TOOL_NAME: &str = "checkOrderStatus";

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;
    async fn execute(&self, input: Value) -> Result<Value>;
}

#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn register<T>(&mut self, tool: T)
    where
        T: Tool + 'static,
    {
        self.tools.insert(tool.name().to_string(), Box::new(tool));
    }

    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(Box::as_ref)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Read-only order lookup keyed by the confirmed customer document. The
/// repository handle is injected; the tool never writes.
pub struct OrderStatusTool {
    orders: Arc<dyn OrderRepository>,
}

impl OrderStatusTool {
    pub fn new(orders: Arc<dyn OrderRepository>) -> Self {
        Self { orders }
    }
}

#[async_trait]
impl Tool for OrderStatusTool {
    fn name(&self) -> &'static str {
        ORDER_STATUS_TOOL_NAME
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let Some(document) = input.get("document").and_then(Value::as_str) else {
            bail!("checkOrderStatus requires a string `document` argument");
        };

        // A store failure reads as "nothing found": the conversation
        // degrades instead of surfacing an internal error to the customer.
        let orders = match self.orders.find_by_document(document).await {
            Ok(orders) => orders,
            Err(error) => {
                warn!(error = %error, "order lookup failed; treating as not found");
                return Ok(json!({
                    "found": false,
                    "message": "No orders found for this CPF/CNPJ."
                }));
            }
        };

        if orders.is_empty() {
            return Ok(json!({
                "found": false,
                "message": "No orders found for this CPF/CNPJ."
            }));
        }

        let summaries: Vec<OrderSummary> = orders.iter().map(OrderSummary::from_order).collect();
        Ok(json!({ "found": true, "orders": summaries }))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;
    use rust_decimal::Decimal;
    use serde_json::json;

    use papyra_core::domain::order::{Order, OrderId, OrderItem, OrderStatus};
    use papyra_core::domain::product::ProductId;
    use papyra_db::repositories::InMemoryOrderRepository;

    use super::{OrderStatusTool, Tool};

    fn shipped_order(document: &str) -> Order {
        Order {
            id: OrderId::new(),
            customer_name: "Maria Souza".to_string(),
            customer_document: Some(document.to_string()),
            total: Decimal::new(8990, 2),
            status: OrderStatus::Shipped,
            tracking_code: Some("BR123456789TR".to_string()),
            shipping_method: Some("express".to_string()),
            created_at: Utc::now(),
            items: vec![OrderItem {
                product_id: ProductId::new(),
                name: "Disc-bound notebook A5".to_string(),
                unit_price: Decimal::new(8990, 2),
                quantity: 1,
            }],
        }
    }

    #[tokio::test]
    async fn summarizes_matching_orders() {
        let repo = Arc::new(InMemoryOrderRepository::with_orders(vec![shipped_order(
            "123.456.789-00",
        )]));
        let tool = OrderStatusTool::new(repo);

        let result =
            tool.execute(json!({ "document": "123.456.789-00" })).await.expect("execute");

        assert_eq!(result["found"], true);
        let orders = result["orders"].as_array().expect("orders array");
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0]["status"], "shipped");
        assert_eq!(orders[0]["tracking"], "BR123456789TR");
        assert_eq!(orders[0]["item_count"], 1);
    }

    #[tokio::test]
    async fn unknown_document_reports_not_found() {
        let repo = Arc::new(InMemoryOrderRepository::default());
        let tool = OrderStatusTool::new(repo);

        let result =
            tool.execute(json!({ "document": "000.000.000-00" })).await.expect("execute");

        assert_eq!(result["found"], false);
        assert!(result.get("orders").is_none());
    }

    #[tokio::test]
    async fn store_failure_degrades_to_not_found() {
        let repo = Arc::new(InMemoryOrderRepository::with_orders(vec![shipped_order(
            "123.456.789-00",
        )]));
        repo.fail_with("connection refused");
        let tool = OrderStatusTool::new(repo);

        let result =
            tool.execute(json!({ "document": "123.456.789-00" })).await.expect("execute");

        assert_eq!(result["found"], false);
    }

    #[tokio::test]
    async fn missing_document_argument_is_an_error() {
        let tool = OrderStatusTool::new(Arc::new(InMemoryOrderRepository::default()));
        assert!(tool.execute(json!({})).await.is_err());
    }
}
