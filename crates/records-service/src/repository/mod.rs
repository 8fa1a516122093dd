//! 数据访问层
//!
//! `RecordStore` 抽象和两个实现：Postgres（生产）与内存（测试、本地演示）。

mod memory;
mod postgres;
mod traits;

pub use memory::{MemoryRecordStore, MemoryUnitOfWork};
pub use postgres::{MIGRATOR, PgRecordStore, PgUnitOfWork};
pub use traits::{RecordStore, StoreError, StoreResult, UniqueKey, UnitOfWork};

#[cfg(test)]
pub use traits::MockRecordStore;
