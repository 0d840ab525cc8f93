//! 进程内事件发布器（InMemoryEventPublisher）
//!
//! 订阅者在启动时一次性注册，按事件名建立索引：
//! - 事件按给定顺序逐条分发，同一事件内先精确匹配、再通配订阅者，均按注册顺序；
//! - 任一订阅者失败即停止并返回 `DomainError::EventHandler`，不重试；
//! - 典型用途：单体应用、测试环境与示例。
//!
use super::handler::{EventHandler, HandledEventType};
use super::publisher::DomainEventPublisher;
use crate::domain_event::SerializedEvent;
use crate::error::{DomainError, DomainResult};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Clone, Default)]
struct HandlerRegistry {
    by_name: HashMap<String, Vec<Arc<dyn EventHandler>>>,
    all: Vec<Arc<dyn EventHandler>>,
}

impl HandlerRegistry {
    fn new(handlers: Vec<Arc<dyn EventHandler>>) -> Self {
        let mut by_name: HashMap<String, Vec<Arc<dyn EventHandler>>> = HashMap::new();
        let mut all: Vec<Arc<dyn EventHandler>> = Vec::new();

        for h in handlers {
            match h.handled_event_type() {
                HandledEventType::All => all.push(h),
                HandledEventType::One(name) => {
                    by_name.entry(name).or_default().push(h);
                }
                HandledEventType::Many(names) => {
                    for name in names {
                        by_name.entry(name).or_default().push(h.clone());
                    }
                }
            }
        }

        Self { by_name, all }
    }

    fn matching(&self, event_name: &str) -> impl Iterator<Item = &Arc<dyn EventHandler>> {
        self.by_name
            .get(event_name)
            .into_iter()
            .flatten()
            .chain(self.all.iter())
    }
}

/// 同步的进程内发布器
#[derive(Clone, Default)]
pub struct InMemoryEventPublisher {
    registry: HandlerRegistry,
}

impl InMemoryEventPublisher {
    pub fn new(handlers: Vec<Arc<dyn EventHandler>>) -> Self {
        Self {
            registry: HandlerRegistry::new(handlers),
        }
    }
}

impl DomainEventPublisher for InMemoryEventPublisher {
    fn publish(&self, events: &[SerializedEvent]) -> DomainResult<()> {
        for event in events {
            for handler in self.registry.matching(event.event_name()) {
                debug!(
                    event_name = event.event_name(),
                    aggregate_id = event.aggregate_id(),
                    handler = handler.handler_name(),
                    "dispatching domain event"
                );

                handler.handle(event).map_err(|err| {
                    warn!(
                        event_name = event.event_name(),
                        handler = handler.handler_name(),
                        error = %err,
                        "event handler failed"
                    );
                    DomainError::EventHandler {
                        handler: handler.handler_name().to_string(),
                        event_name: event.event_name().to_string(),
                        reason: err.to_string(),
                    }
                })?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Clone)]
    struct SpyHandler {
        name: &'static str,
        types: HandledEventType,
        fail_on: Option<&'static str>,
        seen: Arc<Mutex<Vec<String>>>,
    }

    impl EventHandler for SpyHandler {
        fn handler_name(&self) -> &str {
            self.name
        }

        fn handled_event_type(&self) -> HandledEventType {
            self.types.clone()
        }

        fn handle(&self, event: &SerializedEvent) -> anyhow::Result<()> {
            if self.fail_on == Some(event.event_name()) {
                anyhow::bail!("fail requested");
            }
            self.seen
                .lock()
                .unwrap()
                .push(format!("{}:{}", self.name, event.event_name()));
            Ok(())
        }
    }

    fn mk_event(name: &str) -> SerializedEvent {
        SerializedEvent::builder()
            .event_name(name)
            .aggregate_id("o-1")
            .build()
    }

    #[test]
    fn dispatches_in_event_order_to_matching_handlers() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let placed = SpyHandler {
            name: "mailer",
            types: HandledEventType::One("order.placed".into()),
            fail_on: None,
            seen: seen.clone(),
        };
        let audit = SpyHandler {
            name: "audit",
            types: HandledEventType::All,
            fail_on: None,
            seen: seen.clone(),
        };
        let billing = SpyHandler {
            name: "billing",
            types: HandledEventType::Many(vec!["order.placed".into(), "order.paid".into()]),
            fail_on: None,
            seen: seen.clone(),
        };

        let publisher =
            InMemoryEventPublisher::new(vec![Arc::new(placed), Arc::new(audit), Arc::new(billing)]);
        publisher
            .publish(&[mk_event("order.placed"), mk_event("order.paid")])
            .unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                "mailer:order.placed",
                "billing:order.placed",
                "audit:order.placed",
                "billing:order.paid",
                "audit:order.paid",
            ]
        );
    }

    #[test]
    fn failing_handler_stops_dispatch_and_surfaces_error() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let flaky = SpyHandler {
            name: "flaky",
            types: HandledEventType::All,
            fail_on: Some("order.placed"),
            seen: seen.clone(),
        };

        let publisher = InMemoryEventPublisher::new(vec![Arc::new(flaky)]);
        let err = publisher
            .publish(&[mk_event("order.placed"), mk_event("order.paid")])
            .unwrap_err();

        match err {
            DomainError::EventHandler {
                handler,
                event_name,
                ..
            } => {
                assert_eq!(handler, "flaky");
                assert_eq!(event_name, "order.placed");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn events_without_subscribers_are_ignored() {
        let publisher = InMemoryEventPublisher::default();
        publisher.publish(&[mk_event("order.placed")]).unwrap();
    }
}
