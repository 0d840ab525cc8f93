use super::base_event::{BaseEvent, EventData};
use super::serialized_event::SerializedEvent;
use chrono::{DateTime, Utc};
use std::fmt;

/// 领域事件：描述聚合上已经发生的事实，构造后不可变
pub trait DomainEvent: Clone + fmt::Debug + Send + Sync + 'static {
    /// 事件名（订阅者按此匹配），由具体事件类型给出
    fn event_name(&self) -> &str;

    /// 公共部分：聚合标识、载荷、版本与发生时间
    fn base(&self) -> &BaseEvent;

    fn aggregate_id(&self) -> &str {
        self.base().aggregate_id()
    }

    fn event_data(&self) -> &EventData {
        self.base().event_data()
    }

    /// 事件载荷的结构版本（默认 1）
    fn event_version(&self) -> usize {
        self.base().event_version()
    }

    fn occurred_on(&self) -> DateTime<Utc> {
        self.base().occurred_on()
    }

    /// 稳定的序列化形态，不依赖任何二次查询
    fn to_array(&self) -> SerializedEvent {
        SerializedEvent::from_event(self)
    }
}
