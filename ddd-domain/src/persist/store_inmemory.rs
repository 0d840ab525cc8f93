//! 内存版记录存储（InMemoryRecordStore）
//!
//! 基于 `DashMap` 的 `RecordStore` 实现，用于测试、示例与本地开发：
//! - `update` 在持有行级写锁期间完成版本比较与写入，满足原子条件更新；
//! - 关联需先按表名声明，未声明的名称导航失败；
//! - 记录写入次数，并可切换为拒绝写入以模拟存储故障。
//!
use super::record::Record;
use super::record_store::{RecordStore, RelationHandle, StoreError};
use crate::entity::Timestamps;
use crate::value_object::Version;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

type RowKey = (String, String);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RelationKey {
    table: String,
    parent_id: String,
    relation: String,
}

#[derive(Default)]
pub struct InMemoryRecordStore {
    rows: DashMap<RowKey, Record>,
    declared_relations: HashMap<String, Vec<String>>,
    related: DashMap<RelationKey, BTreeMap<String, Record>>,
    writes: AtomicUsize,
    read_only: AtomicBool,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 为某张表声明一个可导航的关联
    pub fn with_relation(mut self, table: impl Into<String>, relation: impl Into<String>) -> Self {
        self.declared_relations
            .entry(table.into())
            .or_default()
            .push(relation.into());
        self
    }

    /// 直接放入一行已存在的数据（不计入写入次数）
    pub fn seed(&self, record: Record) -> Record {
        let version = record.version();
        let timestamps = record.timestamps();
        let stored = record.persisted(version, timestamps);
        self.rows.insert(
            (stored.table().to_string(), stored.id().to_string()),
            stored.clone(),
        );
        stored
    }

    /// 向父记录的命名关联中挂一条子记录
    pub fn attach_related(
        &self,
        parent: &Record,
        relation: &str,
        child: Record,
    ) -> Result<(), StoreError> {
        let key = self.relation_key(parent, relation)?;
        let version = child.version();
        let timestamps = child.timestamps();
        let child = child.persisted(version, timestamps);
        self.related
            .entry(key)
            .or_default()
            .insert(child.id().to_string(), child);
        Ok(())
    }

    pub fn related_ids(&self, parent: &Record, relation: &str) -> Vec<String> {
        let Ok(key) = self.relation_key(parent, relation) else {
            return Vec::new();
        };
        self.related
            .get(&key)
            .map(|children| children.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn contains(&self, table: &str, id: &str) -> bool {
        self.rows.contains_key(&(table.to_string(), id.to_string()))
    }

    /// 成功的写入（创建/更新/删除）次数
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// 切换为拒绝一切写入
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    fn ensure_writable(&self) -> Result<(), StoreError> {
        if self.read_only.load(Ordering::SeqCst) {
            return Err(StoreError::Rejected {
                reason: "store is read-only".to_string(),
            });
        }
        Ok(())
    }

    fn relation_key(&self, parent: &Record, relation: &str) -> Result<RelationKey, StoreError> {
        let declared = self
            .declared_relations
            .get(parent.table())
            .is_some_and(|names| names.iter().any(|n| n == relation));
        if !declared {
            return Err(StoreError::UnknownRelation {
                name: relation.to_string(),
            });
        }

        Ok(RelationKey {
            table: parent.table().to_string(),
            parent_id: parent.id().to_string(),
            relation: relation.to_string(),
        })
    }

    fn row_key(record: &Record) -> RowKey {
        (record.table().to_string(), record.id().to_string())
    }
}

impl RecordStore for InMemoryRecordStore {
    fn find_by_id(&self, table: &str, id: &str) -> Result<Option<Record>, StoreError> {
        Ok(self
            .rows
            .get(&(table.to_string(), id.to_string()))
            .map(|row| row.clone()))
    }

    fn create(&self, record: &Record) -> Result<Record, StoreError> {
        self.ensure_writable()?;

        match self.rows.entry(Self::row_key(record)) {
            Entry::Occupied(existing) => Err(StoreError::AlreadyExists {
                actual: existing.get().version(),
            }),
            Entry::Vacant(slot) => {
                let timestamps = Timestamps {
                    created_at: record.created_at(),
                    updated_at: Some(Utc::now()),
                };
                let stored = record.clone().persisted(record.version(), timestamps);
                slot.insert(stored.clone());
                self.writes.fetch_add(1, Ordering::SeqCst);
                Ok(stored)
            }
        }
    }

    fn update(&self, record: &Record, expected: Version) -> Result<Record, StoreError> {
        self.ensure_writable()?;

        // 持有该行的写锁直到函数返回，比较与写入之间不会插入其他写者
        let mut row = self
            .rows
            .get_mut(&Self::row_key(record))
            .ok_or(StoreError::Missing)?;
        if row.version() != expected {
            return Err(StoreError::VersionMismatch {
                actual: row.version(),
            });
        }

        let timestamps = Timestamps {
            created_at: row.created_at(),
            updated_at: Some(Utc::now()),
        };
        let stored = record.clone().persisted(expected.next(), timestamps);
        *row = stored.clone();
        self.writes.fetch_add(1, Ordering::SeqCst);

        Ok(stored)
    }

    fn delete(&self, record: &Record) -> Result<bool, StoreError> {
        self.ensure_writable()?;

        let removed = self.rows.remove(&Self::row_key(record)).is_some();
        if removed {
            self.related
                .retain(|k, _| !(k.table == record.table() && k.parent_id == record.id()));
            self.writes.fetch_add(1, Ordering::SeqCst);
        }

        Ok(removed)
    }

    fn relation<'a>(
        &'a self,
        record: &Record,
        name: &str,
    ) -> Result<Box<dyn RelationHandle + 'a>, StoreError> {
        let key = self.relation_key(record, name)?;
        Ok(Box::new(InMemoryRelation { store: self, key }))
    }
}

struct InMemoryRelation<'a> {
    store: &'a InMemoryRecordStore,
    key: RelationKey,
}

impl RelationHandle for InMemoryRelation<'_> {
    fn name(&self) -> &str {
        &self.key.relation
    }

    fn find(&self, related_id: &str) -> Result<Option<Record>, StoreError> {
        Ok(self
            .store
            .related
            .get(&self.key)
            .and_then(|children| children.get(related_id).cloned()))
    }

    fn delete(&self, related_id: &str) -> Result<bool, StoreError> {
        self.store.ensure_writable()?;

        let removed = self
            .store
            .related
            .get_mut(&self.key)
            .is_some_and(|mut children| children.remove(related_id).is_some());
        if removed {
            self.store.writes.fetch_add(1, Ordering::SeqCst);
        }

        Ok(removed)
    }
}
