//! 产品处理器

use axum::{
    async_trait,
    extract::{rejection::PathRejection, FromRequest, Path, Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Json, Response},
    Form,
};

use super::{
    model::{CreateProductRequest, Product},
    service::ProductService,
};
use crate::core::{
    error::CoreError,
    response::{MessageResponse, Rejection, ResponsePolicy, CREATED_MESSAGE},
};
use crate::infrastructure::database::DatabaseManager;

#[derive(Clone)]
pub struct AppState {
    pub product_service: ProductService,
    pub policy: ResponsePolicy,
    pub db: DatabaseManager,
}

/// JSON 或表单格式的创建请求体
#[derive(Debug)]
pub struct ProductPayload(pub CreateProductRequest);

/// 请求体无法解析
#[derive(Debug)]
pub struct PayloadRejection(pub String);

impl IntoResponse for PayloadRejection {
    fn into_response(self) -> Response {
        ResponsePolicy::default()
            .reject(CoreError::BadRequest(self.0))
            .into_response()
    }
}

#[async_trait]
impl<S> FromRequest<S> for ProductPayload
where
    S: Send + Sync,
{
    type Rejection = PayloadRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.trim_start().starts_with("application/json"));

        if is_json {
            let Json(body) = Json::<CreateProductRequest>::from_request(req, state)
                .await
                .map_err(|e| PayloadRejection(e.body_text()))?;
            Ok(Self(body))
        } else {
            let Form(body) = Form::<CreateProductRequest>::from_request(req, state)
                .await
                .map_err(|e| PayloadRejection(e.body_text()))?;
            Ok(Self(body))
        }
    }
}

pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<Product>>, Rejection> {
    state
        .product_service
        .list_products()
        .await
        .map(Json)
        .map_err(|e| state.policy.reject(e))
}

pub async fn find_products(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Vec<Product>>, Rejection> {
    let Path(name) =
        path.map_err(|e| state.policy.reject(CoreError::BadRequest(e.body_text())))?;

    state
        .product_service
        .find_products(&name)
        .await
        .map(Json)
        .map_err(|e| state.policy.reject(e))
}

pub async fn create_product(
    State(state): State<AppState>,
    payload: Result<ProductPayload, PayloadRejection>,
) -> Result<MessageResponse, Rejection> {
    let ProductPayload(req) = payload.map_err(|e| state.policy.reject(CoreError::BadRequest(e.0)))?;

    state
        .product_service
        .create_product(&req)
        .await
        .map_err(|e| state.policy.reject(e))?;

    Ok(MessageResponse::ok(CREATED_MESSAGE))
}

// 健康检查
pub async fn health_check(State(state): State<AppState>) -> Response {
    match state.db.ping().await {
        Ok(()) => Json(serde_json::json!({
            "status": "healthy",
            "database": "connected",
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }))
        .into_response(),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({
                    "status": "unhealthy",
                    "database": "unreachable",
                    "timestamp": chrono::Utc::now().to_rfc3339(),
                })),
            )
                .into_response()
        }
    }
}
