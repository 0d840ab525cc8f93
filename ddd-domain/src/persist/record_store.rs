//! 记录存储能力（RecordStore）
//!
//! 仓储与映射器所依赖的外部持久化引擎接口：按 id 查找、创建、条件更新、删除，
//! 以及按名称导航关联。具体后端（Postgres 等）由上层实现并注入。
//!
//! `update` 必须把“比较版本”与“写入”作为一次原子操作完成
//! （例如 `UPDATE ... WHERE version = $expected`），否则两个写者可能同时通过检查。
//!
use super::record::Record;
use crate::error::DomainError;
use crate::value_object::Version;
use std::sync::Arc;
use thiserror::Error;

/// 存储层错误
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("version mismatch: actual={actual}")]
    VersionMismatch { actual: Version },
    #[error("record already exists: actual={actual}")]
    AlreadyExists { actual: Version },
    #[error("record missing")]
    Missing,
    #[error("unknown relation: {name}")]
    UnknownRelation { name: String },
    #[error("write rejected: {reason}")]
    Rejected { reason: String },
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UnknownRelation { name } => DomainError::RelationNotFound { relation: name },
            StoreError::Missing => DomainError::NotFound {
                reason: "record missing".to_string(),
            },
            other => DomainError::PersistenceFailure {
                reason: other.to_string(),
            },
        }
    }
}

#[cfg(feature = "infra-sqlx")]
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::Missing,
            other => StoreError::Rejected {
                reason: other.to_string(),
            },
        }
    }
}

/// 命名关联的句柄
pub trait RelationHandle {
    fn name(&self) -> &str;

    fn find(&self, related_id: &str) -> Result<Option<Record>, StoreError>;

    /// 删除关联中的一项；不存在时返回 `Ok(false)`
    fn delete(&self, related_id: &str) -> Result<bool, StoreError>;
}

pub trait RecordStore: Send + Sync {
    fn find_by_id(&self, table: &str, id: &str) -> Result<Option<Record>, StoreError>;

    /// 插入新行，返回已持久化的记录；同 id 已存在时返回 `AlreadyExists`
    fn create(&self, record: &Record) -> Result<Record, StoreError>;

    /// 条件更新：仅当存储中的版本等于 `expected` 时写入并推进版本
    fn update(&self, record: &Record, expected: Version) -> Result<Record, StoreError>;

    /// 删除行；行不存在时返回 `Ok(false)`
    fn delete(&self, record: &Record) -> Result<bool, StoreError>;

    /// 导航命名关联；名称无效时返回 `UnknownRelation`
    fn relation<'a>(
        &'a self,
        record: &Record,
        name: &str,
    ) -> Result<Box<dyn RelationHandle + 'a>, StoreError>;
}

impl<T> RecordStore for Arc<T>
where
    T: RecordStore + ?Sized,
{
    fn find_by_id(&self, table: &str, id: &str) -> Result<Option<Record>, StoreError> {
        (**self).find_by_id(table, id)
    }

    fn create(&self, record: &Record) -> Result<Record, StoreError> {
        (**self).create(record)
    }

    fn update(&self, record: &Record, expected: Version) -> Result<Record, StoreError> {
        (**self).update(record, expected)
    }

    fn delete(&self, record: &Record) -> Result<bool, StoreError> {
        (**self).delete(record)
    }

    fn relation<'a>(
        &'a self,
        record: &Record,
        name: &str,
    ) -> Result<Box<dyn RelationHandle + 'a>, StoreError> {
        (**self).relation(record, name)
    }
}
