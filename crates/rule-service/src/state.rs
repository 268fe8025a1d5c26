//! 应用状态定义

use rule_engine::RuleStore;

/// Axum 应用共享状态
///
/// `RuleStore` 内部以 Arc 共享，克隆状态不会复制规则数据。
#[derive(Clone, Default)]
pub struct AppState {
    pub store: RuleStore,
}

impl AppState {
    pub fn new(store: RuleStore) -> Self {
        Self { store }
    }
}
