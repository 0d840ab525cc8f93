use crate::entity::Entity;
use crate::error::DomainResult;
use crate::persist::{Record, RecordStore};

/// 实体映射器：在领域对象与持久化记录之间做纯粹的双向转换
///
/// 实现者只需给出表名与两个方向的字段拷贝；`to_model` 的
/// “先按 id 定位已有记录，否则构造新记录，再拷贝领域字段” 由默认实现保证。
pub trait EntityMapper<E>: Send + Sync
where
    E: Entity,
{
    /// 记录所在的表
    fn table(&self) -> &str;

    /// 从记录重建实体；`deep` 为真时一并装载关联
    ///
    /// 返回的实体台账为空、没有待发布事件，时间戳与版本取自记录。
    fn to_entity(&self, record: &Record, deep: bool) -> DomainResult<E>;

    /// 把实体的领域字段拷贝到记录上，不做任何 I/O
    fn write_fields(&self, entity: &E, record: &mut Record) -> DomainResult<()>;

    /// 定位（或新建）实体对应的记录并写入领域字段
    fn to_model(&self, entity: &E, store: &dyn RecordStore) -> DomainResult<Record> {
        let mut record = match store.find_by_id(self.table(), &entity.id().to_string())? {
            Some(existing) => existing,
            None => Record::for_entity(self.table(), entity),
        };
        self.write_fields(entity, &mut record)?;

        Ok(record)
    }
}
