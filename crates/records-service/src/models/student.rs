//! 学生实体

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 学生
///
/// 学号（registration_number）与邮箱全局唯一，学号创建后不可修改。
/// 学生独占其名下的成绩记录，删除学生时成绩随之删除。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: Uuid,
    /// 姓名，3-100 个字符
    pub name: String,
    pub email: String,
    /// 学号，5-20 个字符
    pub registration_number: String,
    pub birth_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
