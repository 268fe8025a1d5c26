//! 规则执行器
//!
//! 递归遍历 AST 求值。逻辑节点的左右子树总是都会被评估，
//! 两侧结果都会写入调试日志，开启追踪时也会记录到评估轨迹中。

use crate::evaluator::ConditionEvaluator;
use crate::models::{Comparison, EvaluationContext, EvaluationResult, Node};
use crate::operators::LogicalOperator;
use std::time::Instant;
use tracing::debug;

/// 规则执行器
pub struct RuleExecutor {
    /// 是否记录详细评估追踪
    trace_enabled: bool,
}

impl RuleExecutor {
    pub fn new() -> Self {
        Self {
            trace_enabled: false,
        }
    }

    /// 启用评估追踪
    pub fn with_trace(mut self) -> Self {
        self.trace_enabled = true;
        self
    }

    /// 执行规则评估，返回匹配结果和评估追踪信息
    pub fn execute(&self, ast: &Node, context: &EvaluationContext) -> EvaluationResult {
        let start = Instant::now();
        let mut result = EvaluationResult::default();

        result.matched = self.evaluate_node(ast, context, &mut result, "root");
        result.evaluation_time_ms = start.elapsed().as_millis() as i64;

        result
    }

    /// 评估规则，仅返回是否匹配
    pub fn evaluate(&self, ast: &Node, context: &EvaluationContext) -> bool {
        self.execute(ast, context).matched
    }

    /// AST 为空（例如合并空规则列表的结果）时不匹配
    pub fn evaluate_optional(&self, ast: Option<&Node>, context: &EvaluationContext) -> bool {
        match ast {
            Some(ast) => self.evaluate(ast, context),
            None => {
                debug!("AST 为空，评估结果为 false");
                false
            }
        }
    }

    fn evaluate_node(
        &self,
        node: &Node,
        context: &EvaluationContext,
        result: &mut EvaluationResult,
        path: &str,
    ) -> bool {
        match node {
            Node::Operand(cond) => self.evaluate_comparison(cond, context, result, path),
            Node::Operator {
                connective,
                left,
                right,
            } => {
                // 节点路径只用于追踪输出
                let (left_path, right_path) = if self.trace_enabled {
                    (format!("{}.left", path), format!("{}.right", path))
                } else {
                    (String::new(), String::new())
                };
                let left_matched = self.evaluate_node(left, context, result, &left_path);
                let right_matched = self.evaluate_node(right, context, result, &right_path);

                debug!(
                    path,
                    connective = %connective,
                    left = left_matched,
                    right = right_matched,
                    "逻辑节点子树评估完成"
                );

                let matched = match connective {
                    LogicalOperator::And => left_matched && right_matched,
                    LogicalOperator::Or => left_matched || right_matched,
                    LogicalOperator::Unsupported(keyword) => {
                        debug!(path, connective = %keyword, "不支持的逻辑操作符，结果为 false");
                        false
                    }
                };

                if self.trace_enabled {
                    result.evaluation_trace.push(format!(
                        "{}: {} (left={}, right={}) => {}",
                        path,
                        connective,
                        left_matched,
                        right_matched,
                        if matched { "MATCHED" } else { "NOT_MATCHED" }
                    ));
                }

                matched
            }
        }
    }

    fn evaluate_comparison(
        &self,
        cond: &Comparison,
        context: &EvaluationContext,
        result: &mut EvaluationResult,
        path: &str,
    ) -> bool {
        let field_value = context.get_field(&cond.field);

        if field_value.is_none() {
            debug!(path, field = %cond.field, "记录中缺少字段，条件不满足");
        } else if !cond.operator.is_supported() {
            debug!(path, operator = %cond.operator, "不支持的比较操作符，条件不满足");
        }

        let matched = ConditionEvaluator::evaluate(field_value, &cond.operator, &cond.literal);
        debug!(path, condition = %cond, matched, "比较条件评估完成");

        if self.trace_enabled {
            result.evaluation_trace.push(format!(
                "{}: {} => {}",
                path,
                cond,
                if matched { "MATCHED" } else { "NOT_MATCHED" }
            ));
            if matched {
                result
                    .matched_conditions
                    .push(format!("{}: {}", path, cond));
            }
        }

        matched
    }
}

impl Default for RuleExecutor {
    fn default() -> Self {
        Self::new()
    }
}

/// 评估 AST，不记录追踪
pub fn evaluate(ast: &Node, context: &EvaluationContext) -> bool {
    RuleExecutor::new().evaluate(ast, context)
}

/// 评估可能为空的 AST
pub fn evaluate_optional(ast: Option<&Node>, context: &EvaluationContext) -> bool {
    RuleExecutor::new().evaluate_optional(ast, context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{combine, compile};
    use serde_json::json;

    const EXAMPLE_RULE: &str = "((age > 30 AND department = 'Sales') OR (age < 25 AND department = 'Marketing')) AND (salary > 50000 OR experience > 5)";

    fn ctx(value: serde_json::Value) -> EvaluationContext {
        EvaluationContext::from_value(value).unwrap()
    }

    #[test]
    fn test_missing_field_is_false() {
        let ast = compile("age > 30").unwrap();
        assert!(!evaluate(&ast, &ctx(json!({}))));
    }

    #[test]
    fn test_case_insensitive_equality() {
        let ast = compile("dept = 'sales'").unwrap();
        assert!(evaluate(&ast, &ctx(json!({"dept": "Sales"}))));
    }

    #[test]
    fn test_example_rule() {
        let ast = compile(EXAMPLE_RULE).unwrap();
        assert!(evaluate(
            &ast,
            &ctx(json!({"age": 35, "department": "Sales", "salary": 60000, "experience": 3}))
        ));
        assert!(!evaluate(
            &ast,
            &ctx(json!({"age": 35, "department": "Marketing", "salary": 60000, "experience": 3}))
        ));
        assert!(evaluate(
            &ast,
            &ctx(json!({"age": 22, "department": "marketing", "salary": 1000, "experience": 6}))
        ));
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let ast = compile(EXAMPLE_RULE).unwrap();
        let record = ctx(json!({"age": 35, "department": "Sales", "experience": 10}));
        let first = evaluate(&ast, &record);
        for _ in 0..5 {
            assert_eq!(evaluate(&ast, &record), first);
        }
    }

    #[test]
    fn test_roundtrip_preserves_evaluation() {
        let ast = compile(EXAMPLE_RULE).unwrap();
        let json = serde_json::to_string(&ast).unwrap();
        let parsed: Node = serde_json::from_str(&json).unwrap();
        let record = ctx(json!({"age": 24, "department": "Marketing", "salary": 70000}));
        assert_eq!(evaluate(&ast, &record), evaluate(&parsed, &record));
    }

    #[test]
    fn test_evaluate_optional_none() {
        let empty: Vec<&str> = Vec::new();
        let ast = combine(&empty).unwrap();
        assert!(!evaluate_optional(ast.as_ref(), &ctx(json!({"a": 1}))));
    }

    #[test]
    fn test_both_branches_are_visited() {
        let ast = compile("a = 1 AND b = 2").unwrap();
        let result = RuleExecutor::new()
            .with_trace()
            .execute(&ast, &ctx(json!({"a": 0, "b": 2})));

        assert!(!result.matched);
        assert_eq!(result.evaluation_trace.len(), 3);
        assert!(result.evaluation_trace[0].starts_with("root.left: a = 1 => NOT_MATCHED"));
        assert!(result.evaluation_trace[1].starts_with("root.right: b = 2 => MATCHED"));
        assert!(result.evaluation_trace[2].starts_with("root: AND"));
        assert_eq!(result.matched_conditions, vec!["root.right: b = 2".to_string()]);
    }

    #[test]
    fn test_trace_disabled_by_default() {
        let ast = compile("a = 1 OR b = 2").unwrap();
        let result = RuleExecutor::new().execute(&ast, &ctx(json!({"a": 1})));
        assert!(result.matched);
        assert!(result.evaluation_trace.is_empty());
        assert!(result.matched_conditions.is_empty());
    }

    #[test]
    fn test_unsupported_connective_is_false() {
        let ast: Node = serde_json::from_value(json!({
            "type": "operator",
            "value": "XOR",
            "left": {"type": "operand", "value": {"field": "a", "operator": "=", "value": 1}},
            "right": {"type": "operand", "value": {"field": "b", "operator": "=", "value": 2}}
        }))
        .unwrap();
        assert!(!evaluate(&ast, &ctx(json!({"a": 1, "b": 2}))));
    }

    #[test]
    fn test_numeric_string_field() {
        let ast = compile("score >= 5").unwrap();
        assert!(evaluate(&ast, &ctx(json!({"score": "5"}))));
        assert!(!evaluate(&ast, &ctx(json!({"score": "n/a"}))));
    }
}
