//! 事件订阅者（EventHandler）
//!
//! 定义消费某类/多类/全部事件的处理逻辑与元信息（名称、订阅的事件名）。
//!
use crate::domain_event::SerializedEvent;

#[derive(Clone, Debug)]
pub enum HandledEventType {
    One(String),
    Many(Vec<String>),
    All,
}

/// 事件订阅者：同步处理一条已提交的领域事件
pub trait EventHandler: Send + Sync {
    /// 订阅者名称（用于错误信息与日志）
    fn handler_name(&self) -> &str;
    /// 订阅的事件名
    fn handled_event_type(&self) -> HandledEventType;
    /// 处理事件
    fn handle(&self, event: &SerializedEvent) -> anyhow::Result<()>;
}
