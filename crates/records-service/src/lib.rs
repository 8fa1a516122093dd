//! 学籍记录服务（领域层）
//!
//! 管理学生、课程以及二者之间的成绩记录，负责所有引用完整性与业务校验规则。
//!
//! ## 核心功能
//!
//! - **学生管理**：学号、邮箱全局唯一，学号创建后不可修改
//! - **课程管理**：课程编码全局唯一且不可修改，学时 1-1000
//! - **成绩管理**：学生与课程必须存在，同一学生同一课程同一学期只允许一条成绩
//! - **级联删除**：删除学生或课程时在同一事务内删除其全部成绩
//!
//! ## 模块结构
//!
//! - `models`: 领域模型定义
//! - `error`: 错误类型定义
//! - `repository`: 记录存储抽象（工作单元）及 Postgres / 内存实现
//! - `service`: 业务服务层

pub mod error;
pub mod models;
pub mod repository;
pub mod service;

pub use error::{AcademicError, Result};
pub use models::*;
pub use repository::{
    MemoryRecordStore, PgRecordStore, RecordStore, StoreError, UniqueKey, UnitOfWork,
};
pub use service::{
    CourseDirectory, CourseService, GradeService, StudentDirectory, StudentService, dto,
};
