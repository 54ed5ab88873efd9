//! 应用层：路由组装与启动引导

pub mod products;

use axum::{
    error_handling::HandleErrorLayer,
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    middleware,
    response::IntoResponse,
    routing::get,
    BoxError, Router,
};
use std::time::Duration;
use tower::{timeout::error::Elapsed, ServiceBuilder};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::config::Config;
use crate::core::{
    error::CoreError, middleware::request_logging_middleware, response::ResponsePolicy,
};
use crate::infrastructure::database::DatabaseManager;
use products::{
    handler::{self, AppState},
    service::ProductService,
    store::ProductStore,
    validation::ValidationRules,
};

impl AppState {
    /// 用已建立的连接池和配置组装应用状态
    pub fn new(db: DatabaseManager, config: &Config) -> Self {
        let policy = config.policy;
        let store = ProductStore::new(
            db.get_pool().clone(),
            Duration::from_secs(config.database.query_timeout_secs),
        );
        let rules = ValidationRules::new(policy.name_pattern, policy.validation_mode);

        Self {
            product_service: ProductService::new(store, rules, policy.match_mode),
            policy: ResponsePolicy::from(policy),
            db,
        }
    }
}

/// 创建路由
pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handler::health_check))
        .route(
            "/api/products",
            get(handler::list_products).post(handler::create_product),
        )
        .route(
            "/api/products/",
            get(handler::list_products).post(handler::create_product),
        )
        .route("/api/products/:name", get(handler::find_products))
}

/// 跨域层；未配置来源时返回 `None`
pub fn cors_layer(allowed_origin: Option<&str>) -> Option<CorsLayer> {
    let origin = allowed_origin?.trim();

    let allow_origin = if origin == "*" {
        AllowOrigin::from(Any)
    } else {
        match HeaderValue::from_str(origin) {
            Ok(value) => AllowOrigin::exact(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                return None;
            }
        }
    };

    Some(
        CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([CONTENT_TYPE]),
    )
}

/// 请求超时层；超时响应和其他失败一样按策略渲染
pub fn with_request_timeout<S>(
    router: Router<S>,
    policy: ResponsePolicy,
    timeout: Duration,
) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(
        ServiceBuilder::new()
            .layer(HandleErrorLayer::new(move |err: BoxError| async move {
                let err = if err.is::<Elapsed>() {
                    CoreError::Timeout
                } else {
                    CoreError::Storage(err.to_string())
                };
                policy.reject(err).into_response()
            }))
            .timeout(timeout),
    )
}

/// 完整应用：路由 + 中间件 + 状态
pub fn build_app(state: AppState, config: &Config) -> Router {
    let router = create_routes()
        .layer(middleware::from_fn(request_logging_middleware))
        .layer(TraceLayer::new_for_http());
    let router = with_request_timeout(
        router,
        state.policy,
        Duration::from_secs(config.server.request_timeout_secs),
    );

    let router = match cors_layer(config.cors.allowed_origin.as_deref()) {
        Some(cors) => router.layer(cors),
        None => router,
    };

    router.with_state(state)
}

/// 连接数据库（可选建表）并组装应用
pub async fn bootstrap(config: &Config) -> anyhow::Result<(Router, DatabaseManager)> {
    let database_url = config.database_url()?;
    let db = DatabaseManager::new(&database_url, &config.database).await?;

    if config.database.init_schema {
        db.ensure_schema().await?;
    }

    let state = AppState::new(db.clone(), config);
    Ok((build_app(state, config), db))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StatusPolicy;
    use crate::core::{error::ErrorResponse, response::TIMEOUT_MESSAGE};
    use axum::http::StatusCode;
    use axum_test::TestServer;

    fn slow_server(policy: ResponsePolicy) -> TestServer {
        let router: Router = Router::new().route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                "done"
            }),
        );
        TestServer::new(with_request_timeout(router, policy, Duration::from_millis(50))).unwrap()
    }

    #[tokio::test]
    async fn test_request_timeout_renders_json() {
        let server = slow_server(ResponsePolicy::default());

        let response = server.get("/slow").await;
        response.assert_status(StatusCode::REQUEST_TIMEOUT);

        let body: ErrorResponse = response.json();
        assert_eq!(body.status, 408);
        assert_eq!(body.msg, TIMEOUT_MESSAGE);
    }

    #[tokio::test]
    async fn test_request_timeout_uniform_status() {
        let server = slow_server(ResponsePolicy {
            status_policy: StatusPolicy::Uniform,
            ..Default::default()
        });

        let response = server.get("/slow").await;
        response.assert_status(StatusCode::ACCEPTED);
        assert_eq!(response.json::<ErrorResponse>().status, 202);
    }

    #[test]
    fn test_cors_layer_requires_origin() {
        assert!(cors_layer(None).is_none());
        assert!(cors_layer(Some("*")).is_some());
        assert!(cors_layer(Some("http://localhost:5173")).is_some());
    }
}
