//! 产品资源：列表、按名称查询、创建

pub mod handler;
pub mod model;
pub mod service;
pub mod store;
pub mod validation;
