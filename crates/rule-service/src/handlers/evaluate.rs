//! 规则评估 API 处理器

use axum::{Json, extract::rejection::JsonRejection};
use rule_engine::{EvaluationContext, Node, RuleExecutor};
use rule_shared::observability::metrics;
use std::time::Instant;
use tracing::{debug, info, instrument};

use crate::{
    dto::{EvaluateRuleRequest, EvaluateRuleResponse},
    error::{ApiError, Result},
};

/// 对一条记录评估 AST
///
/// POST /evaluate_rule
#[instrument(skip(payload))]
pub async fn evaluate_rule(
    payload: std::result::Result<Json<EvaluateRuleRequest>, JsonRejection>,
) -> Result<Json<EvaluateRuleResponse>> {
    let Json(req) = payload?;
    let with_trace = req.trace;
    let (ast, record) = req.into_parts()?;

    let ast: Node = serde_json::from_value(ast).map_err(|e| ApiError::InvalidAst(e.to_string()))?;
    let context = EvaluationContext::new(record);

    let executor = if with_trace {
        RuleExecutor::new().with_trace()
    } else {
        RuleExecutor::new()
    };

    // 评估是纯 CPU 计算，放到阻塞线程池执行；任务异常退出时返回 500
    let start = Instant::now();
    let outcome = tokio::task::spawn_blocking(move || executor.execute(&ast, &context)).await?;
    metrics::record_rule_evaluation(outcome.matched, start.elapsed().as_secs_f64());

    debug!(matched_conditions = ?outcome.matched_conditions, "评估明细");
    info!(matched = outcome.matched, "规则评估完成");

    Ok(Json(EvaluateRuleResponse {
        result: outcome.matched,
        trace: with_trace.then_some(outcome.evaluation_trace),
    }))
}
