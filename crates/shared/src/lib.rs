//! 共享库
//!
//! 包含各服务共用的配置加载、数据库连接池、基础设施错误与可观测性代码。

pub mod config;
pub mod database;
pub mod error;
pub mod observability;
