//! 学籍记录 HTTP 服务
//!
//! 将 REST 请求映射到学生、课程、成绩服务，并把业务错误转换为 HTTP 状态码：
//! 不存在 404，唯一性冲突 400，校验失败 422，存储故障 500。
//!
//! ## 模块结构
//!
//! - `routes`: 路由与中间件组装
//! - `handlers`: 请求处理器
//! - `dto`: HTTP 层独有的请求与响应对象
//! - `error`: 错误类型与状态码映射
//! - `state`: 应用共享状态

pub mod dto;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::{ApiError, Result};
pub use state::AppState;
