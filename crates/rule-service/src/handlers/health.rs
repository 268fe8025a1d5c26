//! 存活检查

use axum::Json;

/// GET /
pub async fn index() -> &'static str {
    "Rule Engine API is running!"
}

/// 存活探针：服务进程正常即返回 ok
///
/// GET /health
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "rule-service"
    }))
}
