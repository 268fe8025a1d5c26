//! 规则服务
//!
//! 通过 REST API 提供规则编译、合并、评估以及规则文本的保存与查询。

pub mod dto;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::{ApiError, Result};
pub use routes::build_router;
pub use state::AppState;
