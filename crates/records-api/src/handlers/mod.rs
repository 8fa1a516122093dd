//! HTTP 请求处理器
//!
//! 提取器失败时转换为 `ApiError`，保证所有错误响应使用统一格式

pub mod course;
pub mod grade;
pub mod student;
pub mod system;

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query};
use uuid::Uuid;

use crate::dto::PaginationParams;

/// 请求体
pub(crate) type JsonBody<T> = Result<Json<T>, JsonRejection>;

/// 路径中的记录 ID
pub(crate) type IdPath = Result<Path<Uuid>, PathRejection>;

/// 分页查询参数
pub(crate) type PageQuery = Result<Query<PaginationParams>, QueryRejection>;
