use rust_decimal::Decimal;

use crate::commands::CommandResult;
use papyra_core::config::{AppConfig, LoadOptions};
use papyra_core::domain::order::{OrderDraft, OrderItem, OrderStatus};
use papyra_core::domain::product::ProductId;
use papyra_db::repositories::{
    OrderRepository, ProductRepository, SqlOrderRepository, SqlProductRepository,
};
use papyra_db::{connect_with_settings, migrations, DemoCatalog};

/// End-to-end readiness probe against a throwaway in-memory store: migrate,
/// seed, read the catalog, and walk one order through checkout and
/// fulfilment updates.
pub fn run() -> CommandResult {
    if let Err(error) = AppConfig::load(LoadOptions::default()) {
        return CommandResult::failure(
            "smoke",
            "config_validation",
            format!("configuration issue: {error}"),
            2,
        );
    }

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "smoke",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    let result = runtime.block_on(async {
        let mut passed: Vec<&'static str> = Vec::new();

        let pool = connect_with_settings("sqlite::memory:?cache=shared", 1, 30)
            .await
            .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;
        passed.push("connect");

        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), 5u8))?;
        passed.push("migrate");

        DemoCatalog::load(&pool)
            .await
            .map_err(|error| ("seed_execution", error.to_string(), 5u8))?;
        passed.push("seed");

        let products = SqlProductRepository::new(pool.clone());
        let catalog = products
            .list()
            .await
            .map_err(|error| ("catalog_read", error.to_string(), 6u8))?;
        if catalog.is_empty() {
            return Err(("catalog_read", "seeded catalog is empty".to_string(), 6u8));
        }
        passed.push("catalog-read");

        let orders = SqlOrderRepository::new(pool.clone());
        let order = orders
            .create(OrderDraft {
                customer_name: "Smoke Probe".to_string(),
                customer_document: Some("999.999.999-99".to_string()),
                total: Decimal::new(8990, 2),
                shipping_method: Some("standard".to_string()),
                items: vec![OrderItem {
                    product_id: ProductId::new(),
                    name: catalog[0].name.clone(),
                    unit_price: Decimal::new(8990, 2),
                    quantity: 1,
                }],
            })
            .await
            .map_err(|error| ("order_create", error.to_string(), 6u8))?;

        orders
            .update_status(&order.id, OrderStatus::Paid)
            .await
            .map_err(|error| ("order_update", error.to_string(), 6u8))?;
        orders
            .set_tracking_code(&order.id, "SMOKE00000TR")
            .await
            .map_err(|error| ("order_update", error.to_string(), 6u8))?;

        let found = orders
            .find_by_document("999.999.999-99")
            .await
            .map_err(|error| ("order_lookup", error.to_string(), 6u8))?;
        let round_trip_ok = found.len() == 1
            && found[0].status == OrderStatus::Paid
            && found[0].tracking_code.as_deref() == Some("SMOKE00000TR");
        if !round_trip_ok {
            return Err(("order_lookup", "order round trip did not match".to_string(), 6u8));
        }
        passed.push("order-round-trip");

        pool.close().await;
        Ok(passed)
    });

    match result {
        Ok(passed) => CommandResult::success(
            "smoke",
            format!("all readiness checks passed: {}", passed.join(", ")),
        ),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("smoke", error_class, message, exit_code)
        }
    }
}
