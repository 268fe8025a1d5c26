//! 规则服务错误类型定义

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rule_engine::RuleError;
use serde_json::json;

/// 规则服务错误类型
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("参数验证失败: {0}")]
    Validation(String),

    #[error("AST 格式无效: {0}")]
    InvalidAst(String),

    #[error("{0}")]
    RuleSyntax(String),

    #[error("规则不存在: {0}")]
    RuleNotFound(String),

    #[error("内部错误: {0}")]
    Internal(String),
}

impl ApiError {
    /// 返回对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::InvalidAst(_) | Self::RuleSyntax(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::RuleNotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 返回错误码（用于 API 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidAst(_) => "INVALID_AST",
            Self::RuleSyntax(_) => "RULE_SYNTAX_ERROR",
            Self::RuleNotFound(_) => "RULE_NOT_FOUND",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 内部错误只返回通用提示，详细信息仅记录日志
        let message = match &self {
            Self::Internal(e) => {
                tracing::error!(error = %e, "内部错误");
                "服务内部错误，请稍后重试".to_string()
            }
            other => other.to_string(),
        };

        let body = json!({
            "success": false,
            "code": self.error_code(),
            "message": message,
            "data": serde_json::Value::Null
        });

        (status, axum::Json(body)).into_response()
    }
}

impl From<RuleError> for ApiError {
    fn from(err: RuleError) -> Self {
        match err {
            RuleError::Syntax(_) | RuleError::CombineFailed { .. } => {
                Self::RuleSyntax(err.to_string())
            }
            RuleError::EmptyRule => Self::Validation(err.to_string()),
            RuleError::RuleNotFound(id) => Self::RuleNotFound(id),
        }
    }
}

/// 评估任务异常退出（panic 或被取消）
impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Internal(format!("评估任务异常退出: {}", err))
    }
}

/// 从 validator 错误转换
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

/// 请求体无法解析（非 JSON、字段类型错误等）一律视为参数错误
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

/// 服务层 Result 类型别名
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rule_engine::SyntaxError;

    fn all_error_variants() -> Vec<(ApiError, StatusCode, &'static str)> {
        vec![
            (ApiError::Validation("ruleString 不能为空".into()), StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            (ApiError::InvalidAst("missing field `type`".into()), StatusCode::BAD_REQUEST, "INVALID_AST"),
            (ApiError::RuleSyntax("括号不匹配".into()), StatusCode::BAD_REQUEST, "RULE_SYNTAX_ERROR"),
            (ApiError::RuleNotFound("r-1".into()), StatusCode::NOT_FOUND, "RULE_NOT_FOUND"),
            (ApiError::Internal("unexpected state".into()), StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        ]
    }

    #[test]
    fn test_all_variants_status_code() {
        for (error, expected_status, label) in all_error_variants() {
            assert_eq!(
                error.status_code(),
                expected_status,
                "状态码不匹配: variant={label}"
            );
        }
    }

    #[test]
    fn test_all_variants_error_code() {
        for (error, _status, expected_code) in all_error_variants() {
            assert_eq!(
                error.error_code(),
                expected_code,
                "错误码不匹配: expected={expected_code}"
            );
        }
    }

    #[test]
    fn test_from_rule_error() {
        let syntax: ApiError = RuleError::Syntax(SyntaxError::UnbalancedParenthesis {
            position: 3,
        })
        .into();
        assert_eq!(syntax.error_code(), "RULE_SYNTAX_ERROR");
        assert!(syntax.to_string().contains("位置 3"));

        let combine: ApiError = RuleError::CombineFailed {
            index: 2,
            source: SyntaxError::EmptyExpression,
        }
        .into();
        assert!(combine.to_string().contains("第 2 条"));

        let empty: ApiError = RuleError::EmptyRule.into();
        assert_eq!(empty.status_code(), StatusCode::BAD_REQUEST);

        let missing: ApiError = RuleError::RuleNotFound("abc".into()).into();
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_error_response_body() {
        let response = ApiError::RuleNotFound("r-404".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "RULE_NOT_FOUND");
        assert!(body["data"].is_null());
        assert_eq!(body["message"], "规则不存在: r-404");
    }

    #[tokio::test]
    async fn test_failed_task_hides_details() {
        let join_err = tokio::spawn(async { panic!("secret token abc123") })
            .await
            .unwrap_err();
        let error: ApiError = join_err.into();
        assert_eq!(error.error_code(), "INTERNAL_ERROR");

        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "INTERNAL_ERROR");
        assert!(!body["message"].as_str().unwrap().contains("abc123"));
    }
}
