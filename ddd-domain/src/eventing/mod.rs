//! 事件子系统（eventing）
//!
//! 提供领域事件的发布协议与进程内实现：
//! - `DomainEventPublisher`：仓储在写入成功后调用的发布接口；
//! - `EventHandler`：按事件名订阅并同步处理事件；
//! - `InMemoryEventPublisher`：按事件名索引订阅者、顺序分发的默认实现。
//!
//! 发布器通过构造参数注入仓储，不存在全局查找。
//!
mod handler;
mod publisher;
mod publisher_inmemory;

pub use handler::{EventHandler, HandledEventType};
pub use publisher::DomainEventPublisher;
pub use publisher_inmemory::InMemoryEventPublisher;
