//! 服务层
//!
//! 学生、课程、成绩三个服务各自负责一种实体的生命周期规则。
//! 成绩服务通过 `StudentDirectory` / `CourseDirectory` 组合前两者，
//! 在同一个工作单元内校验引用。
//!
//! ## 模块结构
//!
//! - `dto`: 创建/修改请求与删除回执
//! - `student_service`: 学生服务
//! - `course_service`: 课程服务
//! - `grade_service`: 成绩服务

pub mod dto;
mod course_service;
mod grade_service;
mod student_service;
#[cfg(test)]
mod test_support;

pub use course_service::CourseService;
pub use grade_service::GradeService;
pub use student_service::StudentService;

use async_trait::async_trait;
use records_shared::observability::metrics;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Course, Student};
use crate::repository::UnitOfWork;

/// 按 ID 解析学生
#[async_trait]
pub trait StudentDirectory: Send + Sync {
    /// 在调用方的工作单元内查找学生，不存在时返回 `StudentNotFound`
    async fn get_within(&self, unit: &mut dyn UnitOfWork, id: Uuid) -> Result<Student>;
}

/// 按 ID 解析课程
#[async_trait]
pub trait CourseDirectory: Send + Sync {
    /// 在调用方的工作单元内查找课程，不存在时返回 `CourseNotFound`
    async fn get_within(&self, unit: &mut dyn UnitOfWork, id: Uuid) -> Result<Course>;
}

/// 记录写操作结果指标
fn observe<T>(entity: &'static str, operation: &'static str, result: &Result<T>) {
    let outcome = match result {
        Ok(_) => "ok",
        Err(e) => e.outcome(),
    };
    metrics::record_operation(entity, operation, outcome);
}
