//! 规则管理 API 处理器
//!
//! 规则文本的保存、查询、删除，以及编译与合并

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use rule_engine::{RuleError, StoredRule, combine, compile};
use rule_shared::observability::metrics;
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::{
    dto::{AstResponse, CombineRulesRequest, DeleteRuleResponse, RuleStringRequest},
    error::{ApiError, Result},
    state::AppState,
};

/// 记录编译结果指标
fn record_compilation<T>(result: &std::result::Result<T, RuleError>) {
    let status = match result {
        Ok(_) => "success",
        Err(RuleError::Syntax(_) | RuleError::CombineFailed { .. }) => "syntax_error",
        Err(RuleError::EmptyRule) => "empty",
        Err(_) => "error",
    };
    metrics::record_rule_compilation(status);
}

/// 保存规则文本
///
/// POST /rules
#[instrument(skip(state, payload))]
pub async fn save_rule(
    State(state): State<AppState>,
    payload: std::result::Result<Json<RuleStringRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<StoredRule>)> {
    let Json(req) = payload?;
    req.validate()?;

    let saved = state.store.save(&req.rule_string);
    record_compilation(&saved);
    let rule = saved.inspect_err(|e| warn!(error = %e, "规则保存失败"))?;

    info!(rule_id = %rule.id, "Rule saved");
    Ok((StatusCode::CREATED, Json(rule)))
}

/// 获取所有规则（按保存顺序）
///
/// GET /rules
pub async fn list_rules(State(state): State<AppState>) -> Json<Vec<StoredRule>> {
    Json(state.store.list_all())
}

/// 获取单条规则
///
/// GET /rules/{id}
pub async fn get_rule(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StoredRule>> {
    state
        .store
        .get(&id)
        .map(Json)
        .ok_or(ApiError::RuleNotFound(id))
}

/// 删除规则
///
/// DELETE /rules/{id}
#[instrument(skip(state))]
pub async fn delete_rule(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteRuleResponse>> {
    state.store.delete(&id)?;
    Ok(Json(DeleteRuleResponse { deleted: id }))
}

/// 编译规则文本为 AST（不保存）
///
/// POST /create_rule
#[instrument(skip(payload))]
pub async fn create_rule(
    payload: std::result::Result<Json<RuleStringRequest>, JsonRejection>,
) -> Result<Json<AstResponse>> {
    let Json(req) = payload?;
    req.validate()?;

    let compiled = compile(&req.rule_string);
    record_compilation(&compiled);
    let ast = compiled.inspect_err(|e| warn!(error = %e, "规则编译失败"))?;

    info!(operands = ast.operand_count(), depth = ast.depth(), "Rule compiled");
    Ok(Json(AstResponse { ast: Some(ast) }))
}

/// 以 AND 合并多条规则文本
///
/// POST /combine_rules
#[instrument(skip(payload))]
pub async fn combine_rules(
    payload: std::result::Result<Json<CombineRulesRequest>, JsonRejection>,
) -> Result<Json<AstResponse>> {
    let Json(req) = payload?;

    let combined = combine(req.rules.as_slice());
    record_compilation(&combined);
    let ast = combined.inspect_err(|e| warn!(error = %e, "规则合并失败"))?;

    info!(count = req.rules.len(), "Rules combined");
    Ok(Json(AstResponse { ast }))
}
