//! 产品数据模型

use serde::{Deserialize, Serialize};

/// `products` 表中的一行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: f64,
}

/// 创建产品的原始请求体（JSON 或表单）
///
/// 字段保持原样，交给校验规则决定是否合法；表单中的值都会以字符串到达。
#[derive(Debug, Default, Deserialize)]
pub struct CreateProductRequest {
    #[serde(default)]
    pub name: Option<serde_json::Value>,
    #[serde(default)]
    pub price: Option<serde_json::Value>,
}

/// 通过校验、可以写入的产品
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub price: f64,
}
