//! 请求与响应对象
//!
//! 实体的创建/修改请求直接复用服务层的 `records::dto`，这里只定义 HTTP 层独有的对象。

use serde::{Deserialize, Serialize};
use validator::Validate;

/// 列表分页参数
///
/// `skip` 为跳过的条数，`limit` 未提供时使用配置中的默认值
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct PaginationParams {
    #[serde(default)]
    #[validate(range(min = 0, message = "skip 不能为负数"))]
    pub skip: i64,
    #[validate(range(min = 1, message = "limit 必须大于0"))]
    pub limit: Option<i64>,
}

impl PaginationParams {
    pub fn offset(&self) -> i64 {
        self.skip
    }

    pub fn limit_or(&self, default_limit: i64) -> i64 {
        self.limit.unwrap_or(default_limit)
    }
}

/// 根路径返回的应用信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppInfo {
    pub name: String,
    pub version: String,
    pub status: String,
}

/// 探针响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<String>,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            storage: None,
        }
    }
}
