use super::change_set::ChangeSet;
use crate::value_object::Version;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 实体的时间戳对
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamps {
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Timestamps {
    pub fn now() -> Self {
        Self {
            created_at: Utc::now(),
            updated_at: None,
        }
    }
}

/// 实体核心状态：标识、时间戳、版本与变更台账
///
/// 变更台账只存在于内存中，不参与序列化，水合时清空。
/// `persisted_version` 记录最近一次从持久化读出或写入的版本，乐观锁以它为准，
/// `touch` 推进的只是内存版本。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityState<Id> {
    id: Id,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
    version: Version,
    #[serde(default)]
    persisted_version: Version,
    #[serde(skip)]
    changes: ChangeSet,
}

impl<Id> EntityState<Id> {
    /// 新建（瞬态）实体：版本 0，台账为空
    pub fn new(id: Id) -> Self {
        Self::restore(id, Timestamps::now(), Version::new())
    }

    /// 从权威来源（持久化记录）恢复
    pub fn restore(id: Id, timestamps: Timestamps, version: Version) -> Self {
        Self {
            id,
            created_at: timestamps.created_at,
            updated_at: timestamps.updated_at,
            version,
            persisted_version: version,
            changes: ChangeSet::default(),
        }
    }

    pub fn id(&self) -> &Id {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    pub fn timestamps(&self) -> Timestamps {
        Timestamps {
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// 最近一次与持久化同步时的版本
    pub fn persisted_version(&self) -> Version {
        self.persisted_version
    }

    pub fn changes(&self) -> &ChangeSet {
        &self.changes
    }

    pub fn is_dirty(&self) -> bool {
        !self.changes.is_empty()
    }

    /// 内存簿记：刷新 `updated_at` 并推进版本
    pub fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
        self.version = self.version.next();
    }

    /// 用权威时间戳与版本覆盖当前值并清空台账
    pub fn hydrate(&mut self, timestamps: Timestamps, version: Version) {
        self.created_at = timestamps.created_at;
        self.updated_at = timestamps.updated_at;
        self.version = version;
        self.persisted_version = version;
        self.changes = ChangeSet::default();
    }

    pub(crate) fn replace_changes(&mut self, changes: ChangeSet) {
        self.changes = changes;
    }

    pub(crate) fn clear_changes(&mut self) {
        self.changes = ChangeSet::default();
    }

    pub(crate) fn mark_updated(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}
