//! 布尔规则引擎
//!
//! 提供规则文本的编译与评估能力，支持：
//! - 中缀规则文本（AND / OR / 括号 / 比较条件）编译为二叉 AST
//! - 多条规则以 AND 合并
//! - 对 JSON 记录求值，可选评估追踪
//! - 线程安全的规则文本存储

pub mod compiler;
pub mod error;
pub mod evaluator;
pub mod executor;
pub mod lexer;
pub mod models;
pub mod operators;
pub mod store;

pub use compiler::{MAX_DEPTH, combine, compile};
pub use error::{Result, RuleError, SyntaxError};
pub use evaluator::ConditionEvaluator;
pub use executor::{RuleExecutor, evaluate, evaluate_optional};
pub use models::{Comparison, EvaluationContext, EvaluationResult, Literal, Node, StoredRule};
pub use operators::{ComparisonOperator, LogicalOperator};
pub use store::RuleStore;
