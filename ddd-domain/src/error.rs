//! 领域层统一错误定义
//!
//! 覆盖实体生命周期与持久化编排的全部失败语义：乐观锁冲突、写入/删除失败、
//! 关联导航、映射器解析、仓储配置、值校验与事件投递。核心内部不捕获、不重试，
//! 一律原样传播给直接调用方，重试策略由调用方决定。
//!
use crate::value_object::Version;
use thiserror::Error;

/// 统一错误类型
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DomainError {
    // --- 并发/持久化 ---
    #[error(
        "concurrency conflict: entity={entity_id}, expected_version={expected}, actual_version={actual}"
    )]
    ConcurrencyConflict {
        entity_id: String,
        expected: Version,
        actual: Version,
    },
    #[error("persistence failure: {reason}")]
    PersistenceFailure { reason: String },
    #[error("deletion failure: entity={entity_id}, reason={reason}")]
    DeletionFailure { entity_id: String, reason: String },
    #[error("related deletion failure: relation={relation}, related_id={related_id}, reason={reason}")]
    RelatedDeletionFailure {
        relation: String,
        related_id: String,
        reason: String,
    },
    #[error("relation not found: {relation}")]
    RelationNotFound { relation: String },

    // --- 配置 ---
    #[error("mapper not found: entity_type={entity_type}")]
    MapperNotFound { entity_type: String },
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },

    // --- 领域规则 ---
    #[error("validation error: {reason}")]
    Validation { reason: String },
    #[error("not found: {reason}")]
    NotFound { reason: String },

    // --- 事件系统（写入已提交，投递失败） ---
    #[error("event handler error: handler={handler}, event={event_name}, reason={reason}")]
    EventHandler {
        handler: String,
        event_name: String,
        reason: String,
    },

    // --- 序列化/解析 ---
    #[error("serialization error: {source}")]
    Serde {
        #[from]
        source: serde_json::Error,
    },
    #[error("parse error: {reason}")]
    Parse { reason: String },
}

/// 统一 Result 类型别名
pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    pub fn validation(reason: impl Into<String>) -> Self {
        DomainError::Validation {
            reason: reason.into(),
        }
    }

    pub fn persistence(reason: impl Into<String>) -> Self {
        DomainError::PersistenceFailure {
            reason: reason.into(),
        }
    }

    pub fn invalid_configuration(reason: impl Into<String>) -> Self {
        DomainError::InvalidConfiguration {
            reason: reason.into(),
        }
    }

    /// 面向系统边界的数字错误码（HTTP 语义）
    pub fn code(&self) -> u16 {
        match self {
            DomainError::ConcurrencyConflict { .. } => 409,
            DomainError::Validation { .. } | DomainError::Parse { .. } => 422,
            DomainError::Serde { .. } => 400,
            DomainError::NotFound { .. } => 404,
            DomainError::EventHandler { .. } => 502,
            DomainError::PersistenceFailure { .. }
            | DomainError::DeletionFailure { .. }
            | DomainError::RelatedDeletionFailure { .. }
            | DomainError::RelationNotFound { .. }
            | DomainError::MapperNotFound { .. }
            | DomainError::InvalidConfiguration { .. } => 500,
        }
    }

    /// 调用方是否可以（在重新加载后）重试当前操作
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DomainError::ConcurrencyConflict { .. }
                | DomainError::PersistenceFailure { .. }
                | DomainError::EventHandler { .. }
        )
    }
}

// 允许在适配层直接使用 `?` 将解析错误转换为 DomainError

impl From<uuid::Error> for DomainError {
    fn from(err: uuid::Error) -> Self {
        DomainError::Parse {
            reason: err.to_string(),
        }
    }
}

impl From<std::num::ParseIntError> for DomainError {
    fn from(err: std::num::ParseIntError) -> Self {
        DomainError::Parse {
            reason: err.to_string(),
        }
    }
}

impl From<chrono::ParseError> for DomainError {
    fn from(err: chrono::ParseError) -> Self {
        DomainError::Parse {
            reason: err.to_string(),
        }
    }
}
