//! 条件评估器
//!
//! 比较记录中的字段值与规则字面量。类型不一致时按宽松语义转换：
//! 两侧都是字符串时按字符串比较，否则统一转为数值比较。

use crate::models::Literal;
use crate::operators::ComparisonOperator;
use serde_json::Value;
use std::cmp::Ordering;

/// 条件评估器
pub struct ConditionEvaluator;

impl ConditionEvaluator {
    /// 评估单个比较条件
    ///
    /// 字段不存在或操作符不受支持时返回 false，不会报错。
    pub fn evaluate(
        field_value: Option<&Value>,
        operator: &ComparisonOperator,
        literal: &Literal,
    ) -> bool {
        let Some(field_value) = field_value else {
            return false;
        };

        match operator {
            ComparisonOperator::Eq => Self::loose_eq(field_value, literal),
            ComparisonOperator::Gt => Self::compare(field_value, literal, Ordering::is_gt),
            ComparisonOperator::Lt => Self::compare(field_value, literal, Ordering::is_lt),
            ComparisonOperator::Gte => Self::compare(field_value, literal, Ordering::is_ge),
            ComparisonOperator::Lte => Self::compare(field_value, literal, Ordering::is_le),
            ComparisonOperator::Unsupported(_) => false,
        }
    }

    /// 相等比较：字符串之间忽略大小写，其余按数值比较
    fn loose_eq(field: &Value, literal: &Literal) -> bool {
        match (field, literal) {
            (Value::String(a), Literal::String(b)) => a.to_lowercase() == b.to_lowercase(),
            (Value::Null | Value::Array(_) | Value::Object(_), _) => false,
            _ => Self::to_number(field) == Self::literal_number(literal),
        }
    }

    /// 大小比较：字符串之间按字典序，其余按数值比较，NaN 一律不满足
    fn compare(field: &Value, literal: &Literal, accept: fn(Ordering) -> bool) -> bool {
        let ordering = match (field, literal) {
            (Value::String(a), Literal::String(b)) => Some(a.as_str().cmp(b.as_str())),
            _ => Self::to_number(field).partial_cmp(&Self::literal_number(literal)),
        };
        ordering.is_some_and(accept)
    }

    fn literal_number(literal: &Literal) -> f64 {
        match literal {
            Literal::Number(n) => *n,
            Literal::String(s) => Self::parse_number(s),
        }
    }

    /// 将 JSON 值转换为数值
    pub fn to_number(value: &Value) -> f64 {
        match value {
            Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
            Value::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Value::Null => 0.0,
            Value::String(s) => Self::parse_number(s),
            Value::Array(_) | Value::Object(_) => f64::NAN,
        }
    }

    /// 去除首尾空白后解析，空字符串视为 0
    fn parse_number(s: &str) -> f64 {
        let s = s.trim();
        if s.is_empty() {
            return 0.0;
        }
        s.parse::<f64>().unwrap_or(f64::NAN)
    }
}
