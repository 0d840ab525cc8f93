//! 领域事件（Domain Event）
//!
//! 定义事件需要实现的最小接口（`DomainEvent`）、所有事件共享的 `BaseEvent`，
//! 以及发布时使用的线上形态 `SerializedEvent`。

mod base_event;
mod domain_event_trait;
mod serialized_event;

pub use base_event::{BaseEvent, EventData};
pub use domain_event_trait::DomainEvent;
pub use serialized_event::SerializedEvent;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    #[derive(Debug, Clone)]
    struct OrderShipped {
        base: BaseEvent,
    }

    impl DomainEvent for OrderShipped {
        fn event_name(&self) -> &str {
            "order.shipped"
        }

        fn base(&self) -> &BaseEvent {
            &self.base
        }
    }

    fn payload() -> EventData {
        let mut data = EventData::new();
        data.insert("carrier".into(), json!("dhl"));
        data.insert("parcels".into(), json!(2));
        data
    }

    #[test]
    fn base_event_defaults() {
        let before = Utc::now();
        let base = BaseEvent::new("o-1");
        assert_eq!(base.aggregate_id(), "o-1");
        assert!(base.event_data().is_empty());
        assert_eq!(base.event_version(), 1);
        assert!(base.occurred_on() >= before);
    }

    #[test]
    fn occurred_on_is_fixed_at_construction() {
        let event = OrderShipped {
            base: BaseEvent::with_data("o-1", payload()),
        };
        let first = event.occurred_on();
        let copy = event.clone();
        assert_eq!(copy.occurred_on(), first);
        assert_eq!(event.to_array().occurred_on(), first);
    }

    #[test]
    fn to_array_has_stable_wire_shape() {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 8, 30, 0).unwrap();
        let event = OrderShipped {
            base: BaseEvent::builder()
                .aggregate_id("o-9")
                .event_data(payload())
                .event_version(2)
                .occurred_on(at)
                .build(),
        };

        let json = event.to_array().to_json().unwrap();
        assert_eq!(
            json,
            json!({
                "event_name": "order.shipped",
                "aggregate_id": "o-9",
                "event_data": {"carrier": "dhl", "parcels": 2},
                "event_version": 2,
                "occurred_on": "2026-03-01T08:30:00Z"
            })
        );

        // 载荷保持插入顺序
        let keys: Vec<&String> = event.event_data().keys().collect();
        assert_eq!(keys, vec!["carrier", "parcels"]);
    }
}
