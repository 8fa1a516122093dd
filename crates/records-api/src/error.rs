//! HTTP 层错误类型
//!
//! 业务错误到 HTTP 状态码的映射，以及统一的错误响应体

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use records::AcademicError;
use serde_json::json;

/// HTTP 层错误
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Academic(#[from] AcademicError),

    /// 请求体、路径或查询参数无法解析
    #[error("请求格式错误: {0}")]
    BadRequest(String),

    #[error("参数验证失败: {0}")]
    Validation(String),
}

impl ApiError {
    /// 返回对应的 HTTP 状态码
    ///
    /// 唯一性冲突按 400 返回，字段校验失败按 422 返回
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Academic(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            Self::Academic(e) if e.is_conflict() => StatusCode::BAD_REQUEST,
            Self::Academic(AcademicError::Validation(_)) | Self::Validation(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::Academic(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Academic(e) => e.error_code(),
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Validation(_) => "VALIDATION_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 系统级错误只返回通用提示，详细信息仅记录日志
        let message = match &self {
            Self::Academic(e) if !e.is_business_error() => {
                tracing::error!(error = %e, code = e.error_code(), "存储操作失败");
                "服务内部错误，请稍后重试".to_string()
            }
            other => other.to_string(),
        };

        let body = json!({
            "success": false,
            "code": self.error_code(),
            "message": message,
            "data": serde_json::Value::Null
        });

        (status, Json(body)).into_response()
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
