//! 领域事件发布器（DomainEventPublisher）协议
//!
//! 仓储在写入成功后、以记录顺序整批交给发布器；发布同步完成，无缓冲、不重试。
//!
use crate::domain_event::SerializedEvent;
use crate::error::DomainResult;
use std::sync::Arc;

pub trait DomainEventPublisher: Send + Sync {
    /// 依次把每条事件分发给订阅了该事件名的全部订阅者
    fn publish(&self, events: &[SerializedEvent]) -> DomainResult<()>;
}

impl<T> DomainEventPublisher for Arc<T>
where
    T: DomainEventPublisher + ?Sized,
{
    fn publish(&self, events: &[SerializedEvent]) -> DomainResult<()> {
        (**self).publish(events)
    }
}
