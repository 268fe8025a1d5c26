//! API 处理器

pub mod evaluate;
pub mod health;
pub mod rule;
