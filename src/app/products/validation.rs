//! 产品字段校验规则
//!
//! 每个字段一个校验函数，按 name → price 的顺序执行；
//! fail-fast 模式在第一条错误处停止。

use regex::Regex;
use serde_json::Value;

use super::model::{CreateProductRequest, NewProduct};
use crate::config::{NamePattern, ValidationMode};
use crate::core::error::FieldError;

pub const MAX_NAME_LEN: usize = 255;

const LETTERS: &str = r"^[A-Za-z ]+$";
const LETTERS_DIGITS: &str = r"^[A-Za-z0-9 ]+$";
const NUMERIC: &str = r"^[+-]?(\d*\.)?\d+$";

/// 编译后的校验规则，启动时创建一次
#[derive(Debug, Clone)]
pub struct ValidationRules {
    pattern: NamePattern,
    name_re: Regex,
    numeric_re: Regex,
    mode: ValidationMode,
}

impl ValidationRules {
    pub fn new(pattern: NamePattern, mode: ValidationMode) -> Self {
        let name_re = match pattern {
            NamePattern::Letters => LETTERS,
            NamePattern::LettersDigits => LETTERS_DIGITS,
        };

        Self {
            pattern,
            // 常量模式，编译不会失败
            name_re: Regex::new(name_re).expect("valid name pattern"),
            numeric_re: Regex::new(NUMERIC).expect("valid numeric pattern"),
            mode,
        }
    }

    /// 校验请求体，返回可写入的产品或字段错误列表
    pub fn validate(&self, req: &CreateProductRequest) -> Result<NewProduct, Vec<FieldError>> {
        let mut errors = Vec::new();

        let name = match self.validate_name(req.name.as_ref()) {
            Ok(name) => Some(name),
            Err(e) => {
                errors.push(e);
                if self.mode == ValidationMode::FailFast {
                    return Err(errors);
                }
                None
            }
        };

        let price = match self.validate_price(req.price.as_ref()) {
            Ok(price) => Some(price),
            Err(e) => {
                errors.push(e);
                None
            }
        };

        match (name, price) {
            (Some(name), Some(price)) => Ok(NewProduct { name, price }),
            _ => Err(errors),
        }
    }

    /// 必填 → trim → HTML 转义 → 长度 → 字符集
    pub fn validate_name(&self, value: Option<&Value>) -> Result<String, FieldError> {
        let raw = match value {
            None | Some(Value::Null) => return Err(FieldError::new("name", "Name is required.")),
            Some(Value::String(s)) => s,
            Some(_) => return Err(FieldError::new("name", "Name must be a string.")),
        };

        let name = escape_html(raw.trim());
        if name.is_empty() {
            return Err(FieldError::new("name", "Name is required."));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(FieldError::new(
                "name",
                format!("Name must be at most {} characters.", MAX_NAME_LEN),
            ));
        }
        if !self.name_re.is_match(&name) {
            let msg = match self.pattern {
                NamePattern::Letters => "Name may only contain letters and spaces.",
                NamePattern::LettersDigits => "Name may only contain letters, digits and spaces.",
            };
            return Err(FieldError::new("name", msg));
        }

        Ok(name)
    }

    /// 必填 → 数值 → 转为 f64
    pub fn validate_price(&self, value: Option<&Value>) -> Result<f64, FieldError> {
        let not_numeric = || FieldError::new("price", "Price must be a number.");

        let price = match value {
            None | Some(Value::Null) => {
                return Err(FieldError::new("price", "Price is required."))
            }
            Some(Value::Number(n)) => n.as_f64().ok_or_else(not_numeric)?,
            Some(Value::String(s)) => {
                let s = s.trim();
                if s.is_empty() {
                    return Err(FieldError::new("price", "Price is required."));
                }
                if !self.numeric_re.is_match(s) {
                    return Err(not_numeric());
                }
                s.parse::<f64>().map_err(|_| not_numeric())?
            }
            Some(_) => return Err(not_numeric()),
        };

        if !price.is_finite() {
            return Err(not_numeric());
        }
        Ok(price)
    }
}

/// HTML 转义，字符集与常见的 `escape()` 清洗器一致
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            '\\' => out.push_str("&#x5C;"),
            '`' => out.push_str("&#96;"),
            _ => out.push(c),
        }
    }
    out
}
