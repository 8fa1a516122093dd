//! 课程实体

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 课程
///
/// 课程编码全局唯一且创建后不可修改。课程独占其成绩记录。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: Uuid,
    /// 课程编码，3-20 个字符
    pub code: String,
    pub name: String,
    /// 学时，1-1000
    pub credit_hours: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
