//! 规则引擎错误类型

use thiserror::Error;

/// 规则文本语法错误
///
/// 位置均为源文本中的字符偏移（从 0 开始），便于调用方定位需要修改的片段。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("规则为空: 未识别到任何条件")]
    EmptyExpression,

    #[error("无法识别的输入 '{fragment}' (位置 {position})")]
    UnexpectedInput { position: usize, fragment: String },

    #[error("括号不匹配 (位置 {position})")]
    UnbalancedParenthesis { position: usize },

    #[error("逻辑操作符 {connective} 缺少操作数 (位置 {position})")]
    MissingOperand { connective: String, position: usize },

    #[error("条件之间缺少逻辑操作符: 解析后剩余 {count} 个独立子树")]
    MissingConnective { count: usize },

    #[error("无法拆分比较条件 '{clause}' (位置 {position})")]
    MalformedComparison { position: usize, clause: String },

    #[error("规则嵌套过深: AST 深度超过上限 {limit}")]
    TooDeep { limit: usize },
}

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("规则语法错误: {0}")]
    Syntax(#[from] SyntaxError),

    #[error("第 {index} 条规则合并失败: {source}")]
    CombineFailed {
        index: usize,
        #[source]
        source: SyntaxError,
    },

    #[error("规则内容不能为空")]
    EmptyRule,

    #[error("规则未找到: {0}")]
    RuleNotFound(String),
}

pub type Result<T> = std::result::Result<T, RuleError>;
