//! # Products API
//!
//! 基于 Axum + SQLx 的产品资源服务：
//! - 列出全部产品
//! - 按名称（子串或完全匹配）查询产品
//! - 校验后创建产品，名称唯一
//!
//! 分层结构：`app`（路由与业务）→ `core`（错误、响应策略、中间件）→ `infrastructure`（连接池、日志）。

pub mod app;
pub mod config;
pub mod core;
pub mod infrastructure;

pub use app::{bootstrap, build_app, create_routes};
pub use config::Config;
