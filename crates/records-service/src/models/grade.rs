//! 成绩实体

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 成绩下限
pub const MIN_GRADE_VALUE: f64 = 0.0;
/// 成绩上限
pub const MAX_GRADE_VALUE: f64 = 10.0;

/// 成绩
///
/// 同一 (student_id, course_id, semester) 组合最多存在一条记录。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Grade {
    pub id: Uuid,
    pub student_id: Uuid,
    pub course_id: Uuid,
    /// 分数，0.0-10.0，保留两位小数
    pub value: f64,
    /// 学期标签，如 "2024.1"
    pub semester: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Grade {
    /// 是否与给定的 (学生, 课程, 学期) 组合相同
    pub fn matches_triple(&self, student_id: Uuid, course_id: Uuid, semester: &str) -> bool {
        self.student_id == student_id && self.course_id == course_id && self.semester == semester
    }
}

/// 分数保留两位小数，恰好居中时取偶数（8.125 -> 8.12）
pub fn round_grade_value(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// 分数是否在合法区间内（NaN 与无穷均不合法）
pub fn is_valid_grade_value(value: f64) -> bool {
    value.is_finite() && (MIN_GRADE_VALUE..=MAX_GRADE_VALUE).contains(&value)
}
