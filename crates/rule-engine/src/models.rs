//! 规则引擎领域模型

use crate::operators::{ComparisonOperator, LogicalOperator};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fmt;

/// 比较条件中的字面量
///
/// 解析阶段一次性完成类型判定：能解析为数字的记为 `Number`，
/// 否则记为去掉单引号的 `String`。
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Number(f64),
    String(String),
}

impl Literal {
    /// 从源文本中的原始值片段构造字面量
    ///
    /// 引号内的数字（如 `'123'`）保持为字符串。
    pub fn from_token(raw: &str) -> Self {
        let raw = raw.trim();
        match raw.parse::<f64>() {
            Ok(n) if n.is_finite() => Self::Number(n),
            _ => Self::String(raw.replace('\'', "")),
        }
    }

    /// 整数值的浮点数按整数输出，保持与源文本一致
    fn integral(n: f64) -> Option<i64> {
        (n.fract() == 0.0 && n.abs() < 9.0e15).then_some(n as i64)
    }
}

impl Serialize for Literal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Number(n) => match Self::integral(*n) {
                Some(i) => serializer.serialize_i64(i),
                None => serializer.serialize_f64(*n),
            },
            Self::String(s) => serializer.serialize_str(s),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => match Self::integral(*n) {
                Some(i) => write!(f, "{}", i),
                None => write!(f, "{}", n),
            },
            Self::String(s) => write!(f, "'{}'", s),
        }
    }
}

impl From<f64> for Literal {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for Literal {
    fn from(n: i32) -> Self {
        Self::Number(n as f64)
    }
}

impl From<i64> for Literal {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

/// 比较条件（AST 叶子节点的内容）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub field: String,
    pub operator: ComparisonOperator,
    /// 线上格式沿用 `value` 字段名，同时接受 `literal`
    #[serde(rename = "value", alias = "literal")]
    pub literal: Literal,
}

impl Comparison {
    pub fn new(
        field: impl Into<String>,
        operator: ComparisonOperator,
        literal: impl Into<Literal>,
    ) -> Self {
        Self {
            field: field.into(),
            operator,
            literal: literal.into(),
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.operator, self.literal)
    }
}

/// AST 节点
///
/// 构造后不可变。`Operator` 节点恰好拥有两棵子树，子树由 `Box` 独占，
/// 因此整棵树只有一个根且不存在环。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WireNode", into = "WireNode")]
pub enum Node {
    Operand(Comparison),
    Operator {
        connective: LogicalOperator,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    pub fn operand(
        field: impl Into<String>,
        operator: ComparisonOperator,
        literal: impl Into<Literal>,
    ) -> Self {
        Self::Operand(Comparison::new(field, operator, literal))
    }

    pub fn operator(connective: LogicalOperator, left: Node, right: Node) -> Self {
        Self::Operator {
            connective,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn and(left: Node, right: Node) -> Self {
        Self::operator(LogicalOperator::And, left, right)
    }

    pub fn or(left: Node, right: Node) -> Self {
        Self::operator(LogicalOperator::Or, left, right)
    }

    /// 叶子节点（比较条件）数量
    pub fn operand_count(&self) -> usize {
        match self {
            Self::Operand(_) => 1,
            Self::Operator { left, right, .. } => left.operand_count() + right.operand_count(),
        }
    }

    pub fn depth(&self) -> usize {
        match self {
            Self::Operand(_) => 1,
            Self::Operator { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    /// 规则中引用的所有字段
    pub fn fields(&self) -> BTreeSet<String> {
        let mut fields = BTreeSet::new();
        self.collect_fields(&mut fields);
        fields
    }

    fn collect_fields(&self, fields: &mut BTreeSet<String>) {
        match self {
            Self::Operand(cond) => {
                fields.insert(cond.field.clone());
            }
            Self::Operator { left, right, .. } => {
                left.collect_fields(fields);
                right.collect_fields(fields);
            }
        }
    }
}

/// 以全括号中缀形式输出，便于日志和调试
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Operand(cond) => write!(f, "{}", cond),
            Self::Operator {
                connective,
                left,
                right,
            } => write!(f, "({} {} {})", left, connective, right),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum NodeKind {
    Operand,
    Operator,
}

/// AST 的 JSON 线上格式：`{type, value, left, right}`
#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireNode {
    #[serde(rename = "type")]
    kind: NodeKind,
    value: Value,
    #[serde(default)]
    left: Option<Box<WireNode>>,
    #[serde(default)]
    right: Option<Box<WireNode>>,
}

impl TryFrom<WireNode> for Node {
    type Error = String;

    fn try_from(wire: WireNode) -> Result<Self, Self::Error> {
        match wire.kind {
            NodeKind::Operand => {
                if wire.left.is_some() || wire.right.is_some() {
                    return Err("operand 节点不能包含子节点".to_string());
                }
                let cond: Comparison = serde_json::from_value(wire.value)
                    .map_err(|e| format!("operand 节点的比较条件无效: {}", e))?;
                Ok(Self::Operand(cond))
            }
            NodeKind::Operator => {
                let connective = match wire.value {
                    Value::String(keyword) => LogicalOperator::from(keyword),
                    other => {
                        return Err(format!("operator 节点的值必须是字符串，实际: {}", other));
                    }
                };
                let left = wire
                    .left
                    .ok_or_else(|| format!("operator 节点 {} 缺少左子树", connective))?;
                let right = wire
                    .right
                    .ok_or_else(|| format!("operator 节点 {} 缺少右子树", connective))?;
                Ok(Self::operator(
                    connective,
                    Node::try_from(*left)?,
                    Node::try_from(*right)?,
                ))
            }
        }
    }
}

impl From<Node> for WireNode {
    fn from(node: Node) -> Self {
        match node {
            Node::Operand(cond) => WireNode {
                kind: NodeKind::Operand,
                value: serde_json::json!(cond),
                left: None,
                right: None,
            },
            Node::Operator {
                connective,
                left,
                right,
            } => WireNode {
                kind: NodeKind::Operator,
                value: Value::String(connective.into()),
                left: Some(Box::new(WireNode::from(*left))),
                right: Some(Box::new(WireNode::from(*right))),
            },
        }
    }
}

/// 评估上下文 - 提供给规则引擎的记录（字段名 → 值）
#[derive(Debug, Clone, Default)]
pub struct EvaluationContext {
    data: Map<String, Value>,
}

impl EvaluationContext {
    pub fn new(data: Map<String, Value>) -> Self {
        Self { data }
    }

    /// 从 JSON 值创建，非对象返回 None
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(data) => Some(Self { data }),
            _ => None,
        }
    }

    /// 获取字段值，字段不存在时返回 None
    pub fn get_field(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }
}

/// 评估结果
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    pub matched: bool,
    pub matched_conditions: Vec<String>,
    pub evaluation_trace: Vec<String>,
    pub evaluation_time_ms: i64,
}

/// 持久化的规则记录（仅保存原始规则文本）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRule {
    pub id: String,
    pub rule_string: String,
    pub created_at: DateTime<Utc>,
}
