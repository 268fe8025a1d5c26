//! 路由配置模块
//!
//! 定义所有 REST API 端点的路由映射，以及整站中间件

use axum::{
    Router,
    extract::Request,
    http::{HeaderValue, header},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use rule_shared::{config::CorsConfig, observability::middleware as obs_middleware};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::{handlers, state::AppState};

/// 构建规则 API 路由
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::health::index))
        .route("/health", get(handlers::health::health_check))
        .route("/evaluate_rule", post(handlers::evaluate::evaluate_rule))
        .route(
            "/rules",
            get(handlers::rule::list_rules).post(handlers::rule::save_rule),
        )
        .route(
            "/rules/{id}",
            get(handlers::rule::get_rule).delete(handlers::rule::delete_rule),
        )
        .route("/create_rule", post(handlers::rule::create_rule))
        .route("/combine_rules", post(handlers::rule::combine_rules))
}

/// 构建完整应用：路由 + 安全头 + CORS + 可观测性中间件
pub fn build_router(state: AppState, cors: &CorsConfig) -> Router {
    api_routes()
        .layer(middleware::from_fn(security_headers))
        .layer(cors_layer(cors))
        .layer(middleware::from_fn(obs_middleware::http_tracing))
        .layer(middleware::from_fn(obs_middleware::request_id))
        .with_state(state)
}

/// 未配置来源时允许任意来源
pub fn cors_layer(cors: &CorsConfig) -> CorsLayer {
    if cors.is_permissive() {
        info!("CORS allowed_origins: * (all origins)");
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    info!("CORS allowed_origins: {}", cors.allowed_origins.join(","));
    let origins: Vec<HeaderValue> = cors
        .allowed_origins
        .iter()
        .filter_map(|s| s.parse::<HeaderValue>().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// 为所有响应注入 HTTP 安全头
async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    response
}
