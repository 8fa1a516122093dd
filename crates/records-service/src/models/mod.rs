//! 领域模型
//!
//! 学生、课程与成绩三类实体，以及记录时间戳的统一规则。

mod course;
mod grade;
mod student;

pub use course::Course;
pub use grade::{Grade, MAX_GRADE_VALUE, MIN_GRADE_VALUE, is_valid_grade_value, round_grade_value};
pub use student::Student;

use chrono::{DateTime, Duration, SubsecRound, Utc};

/// 当前时间，截断到微秒
///
/// Postgres 的 timestamptz 精度为微秒，内存存储与数据库返回的值需保持一致
pub fn now_utc() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// 计算下一次更新时间
///
/// 保证严格大于上一次的 updated_at，即使时钟分辨率不足或发生回拨
pub fn next_update_time(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = now_utc();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}
