//! 记录存储 Trait 定义
//!
//! 服务层只依赖这里的抽象：`RecordStore` 负责开启工作单元，
//! `UnitOfWork` 在单个事务内提供各表的增删改查，提交前的任何失败都会整体回滚。

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::error::AcademicError;
use crate::models::{Course, Grade, Student};

/// 存储层 Result 类型别名
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// 存储层已知的唯一约束
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueKey {
    StudentEmail,
    StudentRegistrationNumber,
    CourseCode,
    /// (student_id, course_id, semester) 组合
    GradeTriple,
}

impl UniqueKey {
    /// 数据库中对应的约束名
    pub const fn constraint_name(self) -> &'static str {
        match self {
            Self::StudentEmail => "students_email_key",
            Self::StudentRegistrationNumber => "students_registration_number_key",
            Self::CourseCode => "courses_code_key",
            Self::GradeTriple => "grades_student_course_semester_key",
        }
    }

    /// 根据约束名识别唯一约束
    pub fn from_constraint(name: &str) -> Option<Self> {
        [
            Self::StudentEmail,
            Self::StudentRegistrationNumber,
            Self::CourseCode,
            Self::GradeTriple,
        ]
        .into_iter()
        .find(|key| key.constraint_name() == name)
    }
}

/// 存储层错误
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("违反唯一约束: {}", .0.constraint_name())]
    UniqueViolation(UniqueKey),

    #[error("违反外键约束: {0}")]
    ForeignKeyViolation(String),

    #[error("数据库错误: {0}")]
    Database(sqlx::Error),

    #[error("存储不可用: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                if let Some(key) = db_err.constraint().and_then(UniqueKey::from_constraint) {
                    return Self::UniqueViolation(key);
                }
            }
            if db_err.is_foreign_key_violation() {
                return Self::ForeignKeyViolation(
                    db_err.constraint().unwrap_or("unknown").to_string(),
                );
            }
        }
        Self::Database(err)
    }
}

impl StoreError {
    /// 转换为业务错误
    ///
    /// 唯一约束冲突交给 `conflict` 重新归类为对应的业务冲突，其余错误按系统错误处理
    pub fn classify<F>(self, conflict: F) -> AcademicError
    where
        F: FnOnce(UniqueKey) -> AcademicError,
    {
        match self {
            Self::UniqueViolation(key) => conflict(key),
            other => other.into(),
        }
    }
}

impl From<StoreError> for AcademicError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Database(e) => Self::Database(e),
            StoreError::UniqueViolation(key) => {
                Self::Storage(format!("未归类的唯一约束冲突: {}", key.constraint_name()))
            }
            StoreError::ForeignKeyViolation(constraint) => {
                Self::Storage(format!("违反外键约束: {constraint}"))
            }
            StoreError::Unavailable(msg) => Self::Storage(msg),
        }
    }
}

/// 记录存储
///
/// 每次业务操作开启一个工作单元，不在调用之间缓存任何实体
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// 开启工作单元（事务）
    async fn begin(&self) -> StoreResult<Box<dyn UnitOfWork>>;

    /// 存储可用性探测
    async fn ping(&self) -> StoreResult<()>;
}

/// 工作单元
///
/// 所有读写都发生在同一个事务内。调用 `commit` 才会生效，
/// 未提交即被 drop 时所有写入都会被丢弃。
#[async_trait]
pub trait UnitOfWork: Send {
    // 学生
    async fn find_student(&mut self, id: Uuid) -> StoreResult<Option<Student>>;
    /// 查找并锁定学生行，锁持有到工作单元结束
    async fn find_student_for_update(&mut self, id: Uuid) -> StoreResult<Option<Student>>;
    async fn find_student_by_registration_number(
        &mut self,
        registration_number: &str,
    ) -> StoreResult<Option<Student>>;
    async fn find_student_by_email(&mut self, email: &str) -> StoreResult<Option<Student>>;
    async fn list_students(&mut self, offset: i64, limit: i64) -> StoreResult<Vec<Student>>;
    async fn insert_student(&mut self, student: &Student) -> StoreResult<()>;
    /// 写回可变字段（name、email、birth_date、updated_at），行不存在时返回 false
    async fn update_student(&mut self, student: &Student) -> StoreResult<bool>;
    async fn delete_student(&mut self, id: Uuid) -> StoreResult<bool>;

    // 课程
    async fn find_course(&mut self, id: Uuid) -> StoreResult<Option<Course>>;
    async fn find_course_for_update(&mut self, id: Uuid) -> StoreResult<Option<Course>>;
    async fn find_course_by_code(&mut self, code: &str) -> StoreResult<Option<Course>>;
    async fn list_courses(&mut self, offset: i64, limit: i64) -> StoreResult<Vec<Course>>;
    async fn insert_course(&mut self, course: &Course) -> StoreResult<()>;
    /// 写回可变字段（name、credit_hours、updated_at）
    async fn update_course(&mut self, course: &Course) -> StoreResult<bool>;
    async fn delete_course(&mut self, id: Uuid) -> StoreResult<bool>;

    // 成绩
    async fn find_grade(&mut self, id: Uuid) -> StoreResult<Option<Grade>>;
    async fn find_grade_for_update(&mut self, id: Uuid) -> StoreResult<Option<Grade>>;
    async fn list_grades(&mut self, offset: i64, limit: i64) -> StoreResult<Vec<Grade>>;
    async fn list_grades_by_student(&mut self, student_id: Uuid) -> StoreResult<Vec<Grade>>;
    async fn list_grades_by_course(&mut self, course_id: Uuid) -> StoreResult<Vec<Grade>>;
    /// 查找相同 (学生, 课程, 学期) 的成绩，可排除指定 ID
    async fn find_grade_by_triple(
        &mut self,
        student_id: Uuid,
        course_id: Uuid,
        semester: &str,
        exclude_id: Option<Uuid>,
    ) -> StoreResult<Option<Grade>>;
    async fn insert_grade(&mut self, grade: &Grade) -> StoreResult<()>;
    /// 写回可变字段（value、semester、updated_at）
    async fn update_grade(&mut self, grade: &Grade) -> StoreResult<bool>;
    async fn delete_grade(&mut self, id: Uuid) -> StoreResult<bool>;
    /// 删除学生名下全部成绩，返回删除条数
    async fn delete_grades_by_student(&mut self, student_id: Uuid) -> StoreResult<u64>;
    /// 删除课程下全部成绩，返回删除条数
    async fn delete_grades_by_course(&mut self, course_id: Uuid) -> StoreResult<u64>;

    /// 提交事务
    async fn commit(self: Box<Self>) -> StoreResult<()>;
}
