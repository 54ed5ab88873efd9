//! 核心层：错误类型、响应策略、中间件

pub mod error;
pub mod middleware;
pub mod response;
