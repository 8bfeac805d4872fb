use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use papyra_agent::llm::{ChatModel, ContextMessage, LlmError, ModelTurn, ToolSpec};
use papyra_agent::runtime::Concierge;
use papyra_agent::GeminiModel;
use papyra_core::config::{AppConfig, ConfigError, LoadOptions};
use papyra_db::fixtures::DemoCatalog;
use papyra_db::repositories::{CategoryRepository, OrderRepository, ProductRepository};
use papyra_db::{connect_with_settings, migrations, DbPool};
use papyra_notify::alerts::{AlertSender, FailureNotifier, LogAlertSender};
use papyra_notify::handover::HandoverDispatcher;

/// Shared handle set for the HTTP routers. Everything is injected here once
/// at startup; no global client handles exist.
#[derive(Clone)]
pub struct AppState {
    pub products: Arc<dyn ProductRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub orders: Arc<dyn OrderRepository>,
    pub concierge: Arc<Concierge>,
    pub notifier: Arc<FailureNotifier<Arc<dyn AlertSender>>>,
    pub handover: Arc<HandoverDispatcher>,
}

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub state: AppState,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("demo catalog seed failed: {0}")]
    Seed(#[source] sqlx::Error),
}

/// Stand-in model used when no API key is configured. Every call fails with
/// `MissingApiKey`, which the concierge turns into its fixed apology.
struct OfflineModel;

#[async_trait]
impl ChatModel for OfflineModel {
    async fn generate(
        &self,
        _system_instruction: &str,
        _context: &[ContextMessage],
        _tool: Option<&ToolSpec>,
    ) -> Result<ModelTurn, LlmError> {
        Err(LlmError::MissingApiKey)
    }

    async fn continue_with_tool_result(
        &self,
        _system_instruction: &str,
        _context: &[ContextMessage],
        _tool_name: &str,
        _tool_result: &serde_json::Value,
    ) -> Result<String, LlmError> {
        Err(LlmError::MissingApiKey)
    }
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    if DemoCatalog::store_is_empty(&db_pool).await.map_err(BootstrapError::Seed)? {
        let seeded = DemoCatalog::load(&db_pool).await.map_err(BootstrapError::Seed)?;
        info!(
            event_name = "system.bootstrap.demo_seeded",
            correlation_id = "bootstrap",
            categories = seeded.categories_seeded,
            products = seeded.products_seeded,
            "store was empty; demo catalog loaded"
        );
    }

    let state = build_state(&config, &db_pool);

    Ok(Application { config, db_pool, state })
}

fn build_state(config: &AppConfig, db_pool: &DbPool) -> AppState {
    use papyra_db::repositories::{
        SqlCategoryRepository, SqlOrderRepository, SqlProductRepository,
    };

    let orders: Arc<dyn OrderRepository> = Arc::new(SqlOrderRepository::new(db_pool.clone()));

    let model: Arc<dyn ChatModel> = match GeminiModel::from_config(&config.llm) {
        Ok(model) => Arc::new(model),
        Err(error) => {
            info!(
                event_name = "system.bootstrap.llm_offline",
                correlation_id = "bootstrap",
                reason = %error,
                "concierge model unavailable; chat degrades to fixed replies"
            );
            Arc::new(OfflineModel)
        }
    };

    let sender: Arc<dyn AlertSender> = Arc::new(LogAlertSender);
    AppState {
        products: Arc::new(SqlProductRepository::new(db_pool.clone())),
        categories: Arc::new(SqlCategoryRepository::new(db_pool.clone())),
        orders: orders.clone(),
        concierge: Arc::new(Concierge::new(model, orders)),
        notifier: Arc::new(FailureNotifier::with_sender(config.alerts.clone(), sender)),
        handover: Arc::new(HandoverDispatcher::new(
            reqwest::Client::new(),
            config.webhook.clone(),
        )),
    }
}

#[cfg(test)]
pub(crate) mod tests_support {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use papyra_agent::runtime::Concierge;
    use papyra_core::config::{AlertConfig, WebhookConfig};
    use papyra_db::repositories::{
        InMemoryCategoryRepository, InMemoryOrderRepository, InMemoryProductRepository,
        OrderRepository,
    };
    use papyra_notify::alerts::{AlertChannel, AlertSender, FailureNotifier};
    use papyra_notify::handover::HandoverDispatcher;

    use super::{AppState, OfflineModel};

    #[derive(Default)]
    pub struct RecordingAlertSender {
        pub deliveries: Mutex<Vec<(AlertChannel, String)>>,
    }

    #[async_trait]
    impl AlertSender for RecordingAlertSender {
        async fn send(&self, channel: AlertChannel, _recipient: &str, message: &str) -> bool {
            self.deliveries
                .lock()
                .expect("deliveries poisoned")
                .push((channel, message.to_string()));
            true
        }
    }

    /// Router test harness: in-memory repositories, offline model, recording
    /// alert sender with both channels enabled, disabled webhook.
    pub fn state_with_memory_repos() -> (AppState, Arc<RecordingAlertSender>) {
        let alerts = Arc::new(RecordingAlertSender::default());
        let alert_config = AlertConfig {
            admin_email: Some("owner@papyra.example".to_string()),
            admin_phone: Some("+55 11 91234-5678".to_string()),
            notify_email: true,
            notify_whatsapp: true,
        };

        let orders: Arc<InMemoryOrderRepository> = Arc::new(InMemoryOrderRepository::default());
        let order_repo: Arc<dyn OrderRepository> = orders.clone();
        let sender: Arc<dyn AlertSender> = alerts.clone();

        let state = AppState {
            products: Arc::new(InMemoryProductRepository::default()),
            categories: Arc::new(InMemoryCategoryRepository::default()),
            orders: order_repo.clone(),
            concierge: Arc::new(Concierge::new(Arc::new(OfflineModel), order_repo)),
            notifier: Arc::new(FailureNotifier::with_sender(alert_config, sender)),
            handover: Arc::new(HandoverDispatcher::new(
                reqwest::Client::new(),
                WebhookConfig { enabled: false, handover_url: "https://sink.example".into() },
            )),
        };

        (state, alerts)
    }

    /// Same harness but the order store is reachable for poisoning.
    pub fn state_with_failable_orders(
    ) -> (AppState, Arc<RecordingAlertSender>, Arc<InMemoryOrderRepository>) {
        let (mut state, alerts) = state_with_memory_repos();
        let orders = Arc::new(InMemoryOrderRepository::default());
        let order_repo: Arc<dyn OrderRepository> = orders.clone();
        state.orders = order_repo.clone();
        state.concierge = Arc::new(Concierge::new(Arc::new(OfflineModel), order_repo));
        (state, alerts, orders)
    }
}

#[cfg(test)]
mod tests {
    use papyra_core::config::{ConfigOverrides, LoadOptions};
    use papyra_db::fixtures::DemoCatalog;

    use crate::bootstrap::bootstrap;

    fn overrides(database_url: &str) -> LoadOptions {
        LoadOptions {
            overrides: ConfigOverrides {
                database_url: Some(database_url.to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        }
    }

    #[tokio::test]
    async fn bootstrap_migrates_and_seeds_an_empty_store() {
        let app = bootstrap(overrides("sqlite::memory:?cache=shared"))
            .await
            .expect("bootstrap should succeed against an in-memory store");

        let (table_count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master \
             WHERE type = 'table' AND name IN ('products', 'categories', 'orders')",
        )
        .fetch_one(&app.db_pool)
        .await
        .expect("expected baseline tables after bootstrap");
        assert_eq!(table_count, 3, "bootstrap should expose baseline store tables");

        let verification =
            DemoCatalog::verify(&app.db_pool).await.expect("verify demo catalog");
        assert!(verification.all_present, "empty store should receive the demo catalog");

        app.db_pool.close().await;
    }

    #[tokio::test]
    async fn bootstrap_fails_fast_on_invalid_database_url() {
        let result = bootstrap(overrides("postgres://not-sqlite")).await;

        assert!(result.is_err());
        let message = result.err().expect("error").to_string();
        assert!(message.contains("database.url"));
    }
}
