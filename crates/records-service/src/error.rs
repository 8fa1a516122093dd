//! 学籍服务错误类型
//!
//! 定义服务层的业务错误和系统错误

use thiserror::Error;
use uuid::Uuid;

/// 学籍服务错误类型
#[derive(Debug, Error)]
pub enum AcademicError {
    // === 记录不存在 ===
    #[error("学生不存在: {0}")]
    StudentNotFound(Uuid),

    #[error("课程不存在: {0}")]
    CourseNotFound(Uuid),

    #[error("成绩不存在: {0}")]
    GradeNotFound(Uuid),

    // === 唯一性冲突 ===
    #[error("学号 {0} 已被注册")]
    RegistrationNumberTaken(String),

    #[error("邮箱 {0} 已被使用")]
    EmailTaken(String),

    #[error("课程编码 {0} 已存在")]
    CourseCodeTaken(String),

    #[error("该学生在此课程的 {semester} 学期已有成绩")]
    DuplicateGrade { semester: String },

    // === 参数校验 ===
    #[error("参数校验失败: {0}")]
    Validation(String),

    // === 系统错误 ===
    #[error("数据库错误: {0}")]
    Database(#[source] sqlx::Error),

    #[error("存储错误: {0}")]
    Storage(String),
}

/// 学籍服务 Result 类型别名
pub type Result<T> = std::result::Result<T, AcademicError>;

impl AcademicError {
    /// 引用的记录不存在
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::StudentNotFound(_) | Self::CourseNotFound(_) | Self::GradeNotFound(_)
        )
    }

    /// 违反唯一性规则
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::RegistrationNumberTaken(_)
                | Self::EmailTaken(_)
                | Self::CourseCodeTaken(_)
                | Self::DuplicateGrade { .. }
        )
    }

    /// 检查是否为业务错误（非系统错误）
    pub fn is_business_error(&self) -> bool {
        !matches!(self, Self::Database(_) | Self::Storage(_))
    }

    /// 指标与日志使用的结果分类
    pub fn outcome(&self) -> &'static str {
        if self.is_not_found() {
            "not_found"
        } else if self.is_conflict() {
            "conflict"
        } else if matches!(self, Self::Validation(_)) {
            "invalid"
        } else {
            "error"
        }
    }

    /// 获取错误码（用于 API 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::StudentNotFound(_) => "STUDENT_NOT_FOUND",
            Self::CourseNotFound(_) => "COURSE_NOT_FOUND",
            Self::GradeNotFound(_) => "GRADE_NOT_FOUND",
            Self::RegistrationNumberTaken(_) => "REGISTRATION_NUMBER_TAKEN",
            Self::EmailTaken(_) => "EMAIL_TAKEN",
            Self::CourseCodeTaken(_) => "COURSE_CODE_TAKEN",
            Self::DuplicateGrade { .. } => "DUPLICATE_GRADE",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }
}

/// 从 validator 错误转换
impl From<validator::ValidationErrors> for AcademicError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}
