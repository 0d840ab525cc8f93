//! 实体（Entity）基础抽象
//!
//! 以组合方式建模：具体实体持有一个 `EntityState`（标识、时间戳、版本、变更台账），
//! 通过 `Entity` 暴露统一的生命周期操作；需要脏检查的实体再实现 `TrackChanges`，
//! 提供逐类型的字段快照与变更回写。
//!
//! 状态机：瞬态 → 已持久化且干净 ⇄ 已持久化且有变更 → （保存成功）已持久化且干净。
//!
mod change_set;
mod state;

pub use change_set::{ChangeSet, FieldChange, FieldValues};
pub use state::{EntityState, Timestamps};

use crate::error::DomainResult;
use crate::value_object::Version;
use chrono::{DateTime, Utc};
use std::any::TypeId;
use std::{fmt::Display, str::FromStr};

/// 具备唯一标识、时间戳与版本的实体
pub trait Entity: Send + Sync + 'static {
    /// 实体标识类型，要求可解析、可显示与可克隆
    type Id: Clone + PartialEq + Display + FromStr + Send + Sync + 'static;

    /// 实体类型名（映射器注册、日志与错误信息使用）
    const TYPE: &'static str;

    fn state(&self) -> &EntityState<Self::Id>;

    fn state_mut(&mut self) -> &mut EntityState<Self::Id>;

    /// 获取实体标识
    fn id(&self) -> &Self::Id {
        self.state().id()
    }

    /// 获取当前版本（乐观锁）
    fn version(&self) -> Version {
        self.state().version()
    }

    /// 最近一次加载或保存时的权威版本，不受 `touch` 影响
    fn persisted_version(&self) -> Version {
        self.state().persisted_version()
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.state().created_at()
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.state().updated_at()
    }

    fn timestamps(&self) -> Timestamps {
        self.state().timestamps()
    }

    /// 类型与标识都相同才视为同一实体，其余字段不参与比较
    fn equals<O: Entity>(&self, other: &O) -> bool
    where
        Self: Sized,
    {
        TypeId::of::<Self>() == TypeId::of::<O>() && self.id().to_string() == other.id().to_string()
    }

    fn touch(&mut self) {
        self.state_mut().touch();
    }

    fn is_dirty(&self) -> bool {
        self.state().is_dirty()
    }

    fn changes(&self) -> &ChangeSet {
        self.state().changes()
    }

    /// 由仓储在写入成功后调用；不触碰待发布事件
    fn hydrate(&mut self, timestamps: Timestamps, version: Version) {
        self.state_mut().hydrate(timestamps, version);
    }
}

/// 脏检查能力：逐类型给出字段快照并负责把变更写回私有状态
pub trait TrackChanges: Entity {
    /// 当前领域字段的规范值
    fn current_values(&self) -> FieldValues;

    /// 将变更集合中的新值写回实体
    fn apply_changes(&mut self, changes: &ChangeSet) -> DomainResult<()>;

    /// 先重置台账，再只记录确实变化的字段；返回空集合时调用方不应写回或持久化
    fn record_change(&mut self, proposed: FieldValues) -> ChangeSet {
        let changes = ChangeSet::diff(&self.current_values(), &proposed);
        self.state_mut().replace_changes(changes.clone());
        changes
    }

    /// 记录并写回变更，返回本次调用的变更集合
    ///
    /// 写回成功后本次变更并入尚未保存的台账（同一字段保留最早的旧值），
    /// 因此之后的空变更不会抹掉之前已写回实体的修改。
    /// 写回失败时台账恢复为调用前的状态。
    fn change(&mut self, proposed: FieldValues) -> DomainResult<ChangeSet> {
        let pending = self.changes().clone();
        let changes = self.record_change(proposed);
        if changes.is_empty() {
            self.state_mut().replace_changes(pending);
            return Ok(changes);
        }

        if let Err(err) = self.apply_changes(&changes) {
            self.state_mut().replace_changes(pending);
            return Err(err);
        }
        self.state_mut().replace_changes(pending.merge(&changes));
        self.state_mut().mark_updated();

        Ok(changes)
    }
}
