//! 仓储（Repository）
//!
//! 编排映射器解析、乐观锁、持久化与事件发布。`save` 的顺序：
//! 1. 解析映射器并通过 `to_model` 得到（已有或新建的）记录；
//! 2. 记录已存在时比较版本，不一致直接返回 `ConcurrencyConflict`，不发起写入；
//! 3. 新记录总是创建；已有记录仅在实体有变更时做条件更新；
//! 4. 写入成功后才按记录顺序发布待发布事件，成功则标记为已提交；
//! 5. 用权威记录水合实体（时间戳、版本）并返回记录。
//!
//! 发布失败时写入已经提交：实体照常水合，事件保留为待发布，错误返回给调用方，
//! 再次 `save`（此时为零写入）会重新发布。
//!
use super::config::{BulkDeletePolicy, RepositoryConfig};
use super::record::Record;
use super::record_store::{RecordStore, StoreError};
use crate::aggregate_root::AggregateRoot;
use crate::domain_event::{DomainEvent, SerializedEvent};
use crate::error::{DomainError, DomainResult};
use crate::eventing::DomainEventPublisher;
use crate::mapper::{EntityMapper, EntityMapperResolver};
use crate::value_object::Version;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// 某一聚合类型的仓储
pub struct Repository<A>
where
    A: AggregateRoot,
{
    resolver: Arc<EntityMapperResolver>,
    store: Arc<dyn RecordStore>,
    publisher: Arc<dyn DomainEventPublisher>,
    config: RepositoryConfig,
    _marker: PhantomData<fn() -> A>,
}

impl<A> Repository<A>
where
    A: AggregateRoot,
{
    /// 创建仓储；聚合类型缺少映射器等配置问题在此立即以 `InvalidConfiguration` 失败
    pub fn new(
        resolver: Arc<EntityMapperResolver>,
        store: Arc<dyn RecordStore>,
        publisher: Arc<dyn DomainEventPublisher>,
        config: RepositoryConfig,
    ) -> DomainResult<Self> {
        if A::TYPE.trim().is_empty() {
            return Err(DomainError::invalid_configuration(
                "aggregate type name must not be empty",
            ));
        }

        let mapper = resolver.resolve::<A>().map_err(|_| {
            DomainError::invalid_configuration(format!(
                "no mapper registered for aggregate type `{}`",
                A::TYPE
            ))
        })?;
        if mapper.table().trim().is_empty() {
            return Err(DomainError::invalid_configuration(format!(
                "mapper for `{}` declares an empty table name",
                A::TYPE
            )));
        }

        Ok(Self {
            resolver,
            store,
            publisher,
            config,
            _marker: PhantomData,
        })
    }

    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    fn mapper(&self) -> DomainResult<Arc<dyn EntityMapper<A>>> {
        self.resolver.resolve::<A>()
    }

    /// 按标识加载聚合
    #[instrument(skip_all, fields(aggregate_type = A::TYPE, aggregate_id = %id))]
    pub fn find(&self, id: &A::Id) -> DomainResult<Option<A>> {
        let mapper = self.mapper()?;
        let Some(record) = self.store.find_by_id(mapper.table(), &id.to_string())? else {
            return Ok(None);
        };

        let mut aggregate = mapper.to_entity(&record, self.config.deep_hydration())?;
        aggregate.hydrate(record.timestamps(), record.version());

        Ok(Some(aggregate))
    }

    pub fn exists(&self, id: &A::Id) -> DomainResult<bool> {
        let mapper = self.mapper()?;
        Ok(self
            .store
            .find_by_id(mapper.table(), &id.to_string())?
            .is_some())
    }

    /// 保存聚合并在写入成功后发布其待发布事件
    #[instrument(skip_all, fields(aggregate_type = A::TYPE, aggregate_id = %aggregate.id()))]
    pub fn save(&self, aggregate: &mut A) -> DomainResult<Record> {
        let mapper = self.mapper()?;
        let record = mapper.to_model(aggregate, &*self.store)?;
        let entity_id = aggregate.id().to_string();
        let expected = aggregate.persisted_version();

        if record.exists() && record.version() != expected {
            warn!(%expected, actual = %record.version(), "optimistic lock check failed");
            return Err(DomainError::ConcurrencyConflict {
                entity_id,
                expected,
                actual: record.version(),
            });
        }

        let record = if record.is_new() {
            self.store
                .create(&record)
                .map_err(|e| write_error(&entity_id, expected, e))?
        } else if aggregate.is_dirty() {
            self.store
                .update(&record, expected)
                .map_err(|e| write_error(&entity_id, expected, e))?
        } else {
            debug!(version = %record.version(), "aggregate unchanged, skipping write");
            record
        };

        let published = self.publish_pending(aggregate);
        aggregate.hydrate(record.timestamps(), record.version());
        published?;

        Ok(record)
    }

    fn publish_pending(&self, aggregate: &mut A) -> DomainResult<()> {
        if !aggregate.has_uncommitted_events() {
            return Ok(());
        }

        let events: Vec<SerializedEvent> = aggregate
            .uncommitted_events()
            .iter()
            .map(|e| e.to_array())
            .collect();

        if let Err(err) = self.publisher.publish(&events) {
            warn!(error = %err, "write committed but event publication failed");
            return Err(err);
        }
        debug!(count = events.len(), "published domain events");
        aggregate.mark_events_as_committed();

        Ok(())
    }

    /// 删除聚合对应的记录；记录不存在同样视为失败
    #[instrument(skip_all, fields(aggregate_type = A::TYPE, aggregate_id = %aggregate.id()))]
    pub fn delete(&self, aggregate: &A) -> DomainResult<()> {
        let mapper = self.mapper()?;
        let entity_id = aggregate.id().to_string();
        let deletion_failure = |reason: String| DomainError::DeletionFailure {
            entity_id: entity_id.clone(),
            reason,
        };

        let record = self
            .store
            .find_by_id(mapper.table(), &entity_id)
            .map_err(|e| deletion_failure(e.to_string()))?
            .ok_or_else(|| deletion_failure("no backing record".to_string()))?;

        match self.store.delete(&record) {
            Ok(true) => {
                debug!("aggregate deleted");
                Ok(())
            }
            Ok(false) => Err(deletion_failure("record already deleted".to_string())),
            Err(e) => {
                warn!(error = %e, "delete rejected");
                Err(deletion_failure(e.to_string()))
            }
        }
    }

    /// 按给定顺序逐个删除，不提供整体原子性，失败处理见 `BulkDeletePolicy`
    pub fn delete_many<'a, I>(&self, aggregates: I) -> DomainResult<BulkDeleteReport>
    where
        I: IntoIterator<Item = &'a A>,
        A: 'a,
    {
        let mut report = BulkDeleteReport::default();

        for aggregate in aggregates {
            let id = aggregate.id().to_string();
            match self.delete(aggregate) {
                Ok(()) => report.deleted.push(id),
                Err(err) => match self.config.bulk_delete() {
                    BulkDeletePolicy::AbortOnFirstFailure => return Err(err),
                    BulkDeletePolicy::ContinueOnFailure => report.failed.push((id, err)),
                },
            }
        }

        Ok(report)
    }

    /// 删除聚合某个命名关联中的一项
    #[instrument(
        skip_all,
        fields(
            aggregate_type = A::TYPE,
            aggregate_id = %aggregate.id(),
            relation = relation,
            related_id = related_id
        )
    )]
    pub fn delete_related(
        &self,
        aggregate: &A,
        relation: &str,
        related_id: &str,
    ) -> DomainResult<()> {
        let related_failure = |reason: String| DomainError::RelatedDeletionFailure {
            relation: relation.to_string(),
            related_id: related_id.to_string(),
            reason,
        };

        let mapper = self.mapper()?;
        let record = mapper.to_model(aggregate, &*self.store)?;
        let handle = self
            .store
            .relation(&record, relation)
            .map_err(|e| match e {
                StoreError::UnknownRelation { name } => {
                    DomainError::RelationNotFound { relation: name }
                }
                other => related_failure(other.to_string()),
            })?;

        match handle.delete(related_id) {
            Ok(true) => {
                debug!("related record deleted");
                Ok(())
            }
            Ok(false) => Err(related_failure("related record not found".to_string())),
            Err(e) => {
                warn!(error = %e, "related delete rejected");
                Err(related_failure(e.to_string()))
            }
        }
    }
}

fn write_error(entity_id: &str, expected: Version, err: StoreError) -> DomainError {
    let err = match err {
        StoreError::VersionMismatch { actual } | StoreError::AlreadyExists { actual } => {
            DomainError::ConcurrencyConflict {
                entity_id: entity_id.to_string(),
                expected,
                actual,
            }
        }
        StoreError::Missing => {
            DomainError::persistence(format!("record {entity_id} disappeared before the write"))
        }
        other => DomainError::persistence(other.to_string()),
    };
    warn!(error = %err, "write failed");
    err
}

/// `delete_many` 的结果
#[derive(Debug, Default)]
pub struct BulkDeleteReport {
    deleted: Vec<String>,
    failed: Vec<(String, DomainError)>,
}

impl BulkDeleteReport {
    /// 已删除的实体标识（按处理顺序）
    pub fn deleted(&self) -> &[String] {
        &self.deleted
    }

    pub fn failed(&self) -> &[(String, DomainError)] {
        &self.failed
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}
