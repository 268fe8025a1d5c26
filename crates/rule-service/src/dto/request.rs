//! 请求体定义

use serde::Deserialize;
use serde_json::{Map, Value};
use validator::Validate;

use crate::error::ApiError;

/// 规则评估请求
///
/// `ast` 与 `data` 先按原始 JSON 接收，以便对缺失、null 和类型错误
/// 给出明确的参数错误。
#[derive(Debug, Deserialize)]
pub struct EvaluateRuleRequest {
    #[serde(default)]
    pub ast: Option<Value>,
    #[serde(default)]
    pub data: Option<Value>,
    /// 是否在响应中返回评估轨迹
    #[serde(default)]
    pub trace: bool,
}

impl EvaluateRuleRequest {
    /// 校验必填项，返回 (AST JSON, 记录)
    pub fn into_parts(self) -> Result<(Value, Map<String, Value>), ApiError> {
        let (Some(ast), Some(data)) = (self.ast, self.data) else {
            return Err(ApiError::Validation("ast 和 data 均为必填项".to_string()));
        };

        match data {
            Value::Object(record) => Ok((ast, record)),
            other => Err(ApiError::Validation(format!(
                "data 必须是 JSON 对象，实际为: {}",
                json_type_name(&other)
            ))),
        }
    }
}

/// 规则文本请求（保存规则、编译规则共用）
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RuleStringRequest {
    #[validate(length(min = 1, message = "ruleString 不能为空"))]
    pub rule_string: String,
}

/// 合并规则请求
#[derive(Debug, Deserialize)]
pub struct CombineRulesRequest {
    pub rules: Vec<String>,
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
