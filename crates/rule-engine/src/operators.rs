//! 规则操作符定义

use serde::{Deserialize, Serialize};
use std::fmt;

/// 比较操作符
///
/// 序列化为源文本中的符号（`>`、`<=` 等）。无法识别的符号保留为
/// `Unsupported`，使外部传入的 AST 依然可以反序列化，评估时该条件恒为 false。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ComparisonOperator {
    Gt,
    Lt,
    Gte,
    Lte,
    Eq,
    Unsupported(String),
}

impl ComparisonOperator {
    /// 词法分析器识别的比较符号，较长的符号在前
    pub const SYMBOLS: [&'static str; 5] = ["<=", ">=", "<", ">", "="];

    pub fn parse(symbol: &str) -> Self {
        match symbol {
            ">" => Self::Gt,
            "<" => Self::Lt,
            ">=" => Self::Gte,
            "<=" => Self::Lte,
            "=" | "==" => Self::Eq,
            other => Self::Unsupported(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Gte => ">=",
            Self::Lte => "<=",
            Self::Eq => "=",
            Self::Unsupported(symbol) => symbol,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported(_))
    }
}

impl From<String> for ComparisonOperator {
    fn from(symbol: String) -> Self {
        Self::parse(&symbol)
    }
}

impl From<ComparisonOperator> for String {
    fn from(op: ComparisonOperator) -> Self {
        op.as_str().to_string()
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 逻辑操作符
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LogicalOperator {
    And,
    Or,
    Unsupported(String),
}

impl LogicalOperator {
    pub fn parse(keyword: &str) -> Self {
        match keyword {
            "AND" => Self::And,
            "OR" => Self::Or,
            other => Self::Unsupported(other.to_string()),
        }
    }

    /// 优先级：AND 高于 OR，两者均为左结合
    pub fn precedence(&self) -> u8 {
        match self {
            Self::And => 2,
            Self::Or => 1,
            Self::Unsupported(_) => 0,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
            Self::Unsupported(keyword) => keyword,
        }
    }
}

impl From<String> for LogicalOperator {
    fn from(keyword: String) -> Self {
        Self::parse(&keyword)
    }
}

impl From<LogicalOperator> for String {
    fn from(op: LogicalOperator) -> Self {
        op.as_str().to_string()
    }
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
