//! 核心响应处理模块

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use super::error::{CoreError, ErrorResponse};
use crate::config::{PolicyConfig, StatusPolicy, ValidationMode};

pub const DUPLICATE_MESSAGE: &str = "Product already exists.";
pub const STORAGE_FAILURE_MESSAGE: &str = "Something went wrong, please try again later.";
pub const VALIDATION_MESSAGE: &str = "Invalid product data.";
pub const CREATED_MESSAGE: &str = "Product has been added.";
pub const TIMEOUT_MESSAGE: &str = "Request timed out.";

/// 简单消息响应 `{status, msg}`
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub status: u16,
    pub msg: String,
}

impl MessageResponse {
    pub fn ok(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK.as_u16(),
            msg: msg.into(),
        }
    }
}

impl IntoResponse for MessageResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}

/// 已按策略渲染好的失败响应
#[derive(Debug)]
pub struct Rejection {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// 错误响应策略
///
/// 决定失败时用哪个状态码，以及校验错误返回首条还是全部。
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponsePolicy {
    pub validation_mode: ValidationMode,
    pub status_policy: StatusPolicy,
}

impl From<PolicyConfig> for ResponsePolicy {
    fn from(policy: PolicyConfig) -> Self {
        Self {
            validation_mode: policy.validation_mode,
            status_policy: policy.status_policy,
        }
    }
}

impl ResponsePolicy {
    fn status_for(&self, natural: StatusCode) -> StatusCode {
        match self.status_policy {
            StatusPolicy::Distinct => natural,
            StatusPolicy::Uniform => StatusCode::ACCEPTED,
        }
    }

    /// 把核心错误渲染成响应
    pub fn reject(&self, err: CoreError) -> Rejection {
        let (natural, msg, field, errors) = match err {
            CoreError::Validation(mut errors) => match self.validation_mode {
                ValidationMode::FailFast if !errors.is_empty() => {
                    let first = errors.swap_remove(0);
                    (StatusCode::BAD_REQUEST, first.msg, Some(first.field), None)
                }
                _ => (
                    StatusCode::BAD_REQUEST,
                    VALIDATION_MESSAGE.to_string(),
                    None,
                    Some(errors),
                ),
            },
            CoreError::Duplicate => (
                StatusCode::BAD_REQUEST,
                DUPLICATE_MESSAGE.to_string(),
                None,
                None,
            ),
            CoreError::BadRequest(detail) => {
                warn!("Rejected request body: {}", detail);
                (StatusCode::BAD_REQUEST, detail, None, None)
            }
            CoreError::Storage(detail) => {
                error!("Storage error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    STORAGE_FAILURE_MESSAGE.to_string(),
                    None,
                    None,
                )
            }
            CoreError::Timeout => {
                warn!("Request timed out");
                (
                    StatusCode::REQUEST_TIMEOUT,
                    TIMEOUT_MESSAGE.to_string(),
                    None,
                    None,
                )
            }
        };

        let status = self.status_for(natural);
        Rejection {
            status,
            body: ErrorResponse {
                status: status.as_u16(),
                msg,
                field,
                errors,
            },
        }
    }
}
