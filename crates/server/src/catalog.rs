//! Storefront and back-office catalog endpoints: product and category CRUD
//! plus AI-drafted product copy.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use papyra_core::domain::category::{Category, CategoryDraft, CategoryId};
use papyra_core::domain::product::{Product, ProductDraft, ProductId};
use papyra_core::errors::ApplicationError;
use papyra_db::repositories::RepositoryError;

use crate::bootstrap::AppState;

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
}

/// Maps a store failure through the application error taxonomy so customers
/// only ever see the user-safe message.
pub(crate) fn store_unavailable(
    operation: &str,
    error: &RepositoryError,
) -> (StatusCode, Json<ApiError>) {
    let interface =
        ApplicationError::Persistence(error.to_string()).into_interface(operation);
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ApiError { error: interface.user_message().to_string() }),
    )
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/products", get(list_products).post(create_product))
        .route("/api/v1/products/{id}", axum::routing::put(update_product).delete(delete_product))
        .route("/api/v1/products/describe", post(describe_product))
        .route("/api/v1/categories", get(list_categories).post(create_category))
        .route(
            "/api/v1/categories/{id}",
            axum::routing::put(update_category).delete(delete_category),
        )
        .with_state(state)
}

fn parse_id(raw: &str) -> Result<Uuid, (StatusCode, Json<ApiError>)> {
    Uuid::parse_str(raw).map_err(|_| {
        (StatusCode::BAD_REQUEST, Json(ApiError { error: format!("invalid id `{raw}`") }))
    })
}

fn not_found(kind: &str) -> (StatusCode, Json<ApiError>) {
    (StatusCode::NOT_FOUND, Json(ApiError { error: format!("{kind} not found") }))
}

async fn list_products(State(state): State<AppState>) -> Json<Vec<Product>> {
    // Reads degrade to an empty catalog; the failure is still fanned out.
    match state.products.list().await {
        Ok(products) => Json(products),
        Err(error) => {
            warn!(error = %error, "product listing failed; returning empty catalog");
            state.notifier.notify_failure("products.list", &error.to_string()).await;
            Json(Vec::new())
        }
    }
}

async fn create_product(
    State(state): State<AppState>,
    Json(draft): Json<ProductDraft>,
) -> Result<(StatusCode, Json<Product>), (StatusCode, Json<ApiError>)> {
    match state.products.create(draft).await {
        Ok(product) => Ok((StatusCode::CREATED, Json(product))),
        Err(error) => {
            state.notifier.notify_failure("products.create", &error.to_string()).await;
            Err(store_unavailable("products.create", &error))
        }
    }
}

async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(draft): Json<ProductDraft>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<ApiError>)> {
    let id = ProductId(parse_id(&id)?);
    match state.products.update(&id, draft).await {
        Ok(true) => Ok(Json(serde_json::json!({ "updated": true }))),
        Ok(false) => Err(not_found("product")),
        Err(error) => {
            state.notifier.notify_failure("products.update", &error.to_string()).await;
            Err(store_unavailable("products.update", &error))
        }
    }
}

async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<ApiError>)> {
    let id = ProductId(parse_id(&id)?);
    match state.products.delete(&id).await {
        Ok(true) => Ok(Json(serde_json::json!({ "deleted": true }))),
        Ok(false) => Err(not_found("product")),
        Err(error) => {
            state.notifier.notify_failure("products.delete", &error.to_string()).await;
            Err(store_unavailable("products.delete", &error))
        }
    }
}

#[derive(Debug, Deserialize)]
struct DescribeRequest {
    name: String,
    category: String,
}

#[derive(Debug, Serialize)]
struct DescribeResponse {
    description: String,
}

async fn describe_product(
    State(state): State<AppState>,
    Json(request): Json<DescribeRequest>,
) -> Result<Json<DescribeResponse>, (StatusCode, Json<ApiError>)> {
    match state.concierge.generate_product_description(&request.name, &request.category).await {
        Ok(description) => Ok(Json(DescribeResponse { description })),
        Err(error) => {
            warn!(error = %error, "description generation failed");
            Err((
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiError { error: "Could not reach the writing assistant.".to_string() }),
            ))
        }
    }
}

async fn list_categories(State(state): State<AppState>) -> Json<Vec<Category>> {
    match state.categories.list().await {
        Ok(categories) => Json(categories),
        Err(error) => {
            warn!(error = %error, "category listing failed; returning empty list");
            state.notifier.notify_failure("categories.list", &error.to_string()).await;
            Json(Vec::new())
        }
    }
}

async fn create_category(
    State(state): State<AppState>,
    Json(draft): Json<CategoryDraft>,
) -> Result<(StatusCode, Json<Category>), (StatusCode, Json<ApiError>)> {
    match state.categories.create(draft).await {
        Ok(category) => Ok((StatusCode::CREATED, Json(category))),
        Err(error) => {
            state.notifier.notify_failure("categories.create", &error.to_string()).await;
            Err(store_unavailable("categories.create", &error))
        }
    }
}

async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(draft): Json<CategoryDraft>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<ApiError>)> {
    let id = CategoryId(parse_id(&id)?);
    match state.categories.update(&id, draft).await {
        Ok(true) => Ok(Json(serde_json::json!({ "updated": true }))),
        Ok(false) => Err(not_found("category")),
        Err(error) => {
            state.notifier.notify_failure("categories.update", &error.to_string()).await;
            Err(store_unavailable("categories.update", &error))
        }
    }
}

async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<ApiError>)> {
    let id = CategoryId(parse_id(&id)?);
    match state.categories.delete(&id).await {
        Ok(true) => Ok(Json(serde_json::json!({ "deleted": true }))),
        Ok(false) => Err(not_found("category")),
        Err(error) => {
            state.notifier.notify_failure("categories.delete", &error.to_string()).await;
            Err(store_unavailable("categories.delete", &error))
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use rust_decimal::Decimal;
    use tower::util::ServiceExt;

    use crate::bootstrap::tests_support::state_with_memory_repos;

    fn product_body(name: &str) -> String {
        serde_json::json!({
            "name": name,
            "description": "test",
            "price": "89.90",
            "category": "Notebooks"
        })
        .to_string()
    }

    #[tokio::test]
    async fn product_crud_round_trip() {
        let (state, _alerts) = state_with_memory_repos();
        let router = super::router(state.clone());

        let create = router
            .clone()
            .oneshot(
                Request::post("/api/v1/products")
                    .header("content-type", "application/json")
                    .body(Body::from(product_body("Disc-bound notebook A5")))
                    .expect("request"),
            )
            .await
            .expect("create response");
        assert_eq!(create.status(), StatusCode::CREATED);

        let listed = state.products.list().await.expect("list");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Disc-bound notebook A5");
        assert_eq!(listed[0].price, Decimal::new(8990, 2));

        let delete = router
            .clone()
            .oneshot(
                Request::delete(format!("/api/v1/products/{}", listed[0].id.0))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("delete response");
        assert_eq!(delete.status(), StatusCode::OK);
        assert!(state.products.list().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn unknown_product_update_is_not_found() {
        let (state, _alerts) = state_with_memory_repos();
        let router = super::router(state);

        let response = router
            .oneshot(
                Request::put(format!("/api/v1/products/{}", uuid::Uuid::new_v4()))
                    .header("content-type", "application/json")
                    .body(Body::from(product_body("Ghost")))
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn malformed_ids_are_bad_requests() {
        let (state, _alerts) = state_with_memory_repos();
        let router = super::router(state);

        let response = router
            .oneshot(
                Request::delete("/api/v1/categories/not-a-uuid")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn describe_degrades_when_the_model_is_offline() {
        let (state, _alerts) = state_with_memory_repos();
        let router = super::router(state);

        let response = router
            .oneshot(
                Request::post("/api/v1/products/describe")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        serde_json::json!({ "name": "Planner", "category": "Organization" })
                            .to_string(),
                    ))
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
