//! 持久化编排（persist）
//!
//! - `Record` / `RecordStore`：外部持久化引擎的记录形态与能力接口；
//! - `InMemoryRecordStore`：基于 `DashMap` 的参考实现；
//! - `Repository`：把映射器、乐观锁、写入与事件发布串成 save/delete 协议；
//! - `RepositoryConfig`：批量删除策略与读取深度。
//!
mod config;
mod record;
mod record_store;
mod repository;
mod store_inmemory;

pub use config::{BulkDeletePolicy, RepositoryConfig};
pub use record::Record;
pub use record_store::{RecordStore, RelationHandle, StoreError};
pub use repository::{BulkDeleteReport, Repository};
pub use store_inmemory::InMemoryRecordStore;
