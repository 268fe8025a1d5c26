//! 规则存储管理
//!
//! 使用 DashMap 提供线程安全的规则存储。只保存原始规则文本，
//! 保存时编译一次以校验语法，使用时再按需编译。

use crate::compiler;
use crate::error::{Result, RuleError};
use crate::models::{Node, StoredRule};
use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{info, instrument, warn};

#[derive(Debug, Clone)]
struct StoreEntry {
    /// 插入序号，用于按保存顺序列出规则
    seq: u64,
    rule: StoredRule,
}

/// 规则存储
#[derive(Clone, Default)]
pub struct RuleStore {
    rules: Arc<DashMap<String, StoreEntry>>,
    next_seq: Arc<AtomicU64>,
}

impl RuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取当前存储的规则数量
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// 检查存储是否为空
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// 保存规则文本
    ///
    /// 空白文本返回 `EmptyRule`，语法错误原样返回，AST 不落库。
    #[instrument(skip(self, rule_string))]
    pub fn save(&self, rule_string: &str) -> Result<StoredRule> {
        if rule_string.trim().is_empty() {
            warn!("拒绝保存空规则");
            return Err(RuleError::EmptyRule);
        }

        compiler::compile(rule_string)?;

        let rule = StoredRule {
            id: uuid::Uuid::new_v4().to_string(),
            rule_string: rule_string.to_string(),
            created_at: Utc::now(),
        };
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.rules.insert(
            rule.id.clone(),
            StoreEntry {
                seq,
                rule: rule.clone(),
            },
        );

        info!("规则已保存: {}", rule.id);
        Ok(rule)
    }

    /// 获取规则
    pub fn get(&self, rule_id: &str) -> Option<StoredRule> {
        self.rules.get(rule_id).map(|entry| entry.rule.clone())
    }

    /// 检查规则是否存在
    pub fn contains(&self, rule_id: &str) -> bool {
        self.rules.contains_key(rule_id)
    }

    /// 删除规则
    #[instrument(skip(self))]
    pub fn delete(&self, rule_id: &str) -> Result<()> {
        if self.rules.remove(rule_id).is_some() {
            info!("规则已删除: {}", rule_id);
            Ok(())
        } else {
            warn!("删除不存在的规则: {}", rule_id);
            Err(RuleError::RuleNotFound(rule_id.to_string()))
        }
    }

    /// 按保存顺序获取所有规则
    pub fn list_all(&self) -> Vec<StoredRule> {
        let mut entries: Vec<StoreEntry> = self.rules.iter().map(|r| r.value().clone()).collect();
        entries.sort_by_key(|entry| entry.seq);
        entries.into_iter().map(|entry| entry.rule).collect()
    }

    /// 清空所有规则
    #[instrument(skip(self))]
    pub fn clear(&self) {
        let count = self.rules.len();
        self.rules.clear();
        info!("已清空 {} 条规则", count);
    }

    /// 编译已保存的规则
    pub fn compile_by_id(&self, rule_id: &str) -> Result<Node> {
        let rule = self
            .get(rule_id)
            .ok_or_else(|| RuleError::RuleNotFound(rule_id.to_string()))?;
        compiler::compile(&rule.rule_string)
    }

    /// 按给定顺序合并已保存的规则
    pub fn combine_ids<S: AsRef<str>>(&self, rule_ids: &[S]) -> Result<Option<Node>> {
        let texts = rule_ids
            .iter()
            .map(|id| {
                self.get(id.as_ref())
                    .map(|rule| rule.rule_string)
                    .ok_or_else(|| RuleError::RuleNotFound(id.as_ref().to_string()))
            })
            .collect::<Result<Vec<_>>>()?;
        compiler::combine(texts.as_slice())
    }
}
