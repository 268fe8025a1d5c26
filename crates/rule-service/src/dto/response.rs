//! 响应体定义

use rule_engine::Node;
use serde::Serialize;

/// 规则评估响应
#[derive(Debug, Serialize)]
pub struct EvaluateRuleResponse {
    pub result: bool,
    /// 仅在请求 `trace: true` 时返回
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<Vec<String>>,
}

/// 编译或合并后的 AST；合并空列表时为 null
#[derive(Debug, Serialize)]
pub struct AstResponse {
    pub ast: Option<Node>,
}

/// 删除规则响应
#[derive(Debug, Serialize)]
pub struct DeleteRuleResponse {
    pub deleted: String,
}
