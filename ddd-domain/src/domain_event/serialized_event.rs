use super::base_event::EventData;
use super::domain_event_trait::DomainEvent;
use crate::error::DomainResult;
use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 领域事件的线上形态
///
/// `{event_name, aggregate_id, event_data, event_version, occurred_on}`，
/// 其中 `occurred_on` 为 RFC 3339 / ISO-8601 字符串。
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
pub struct SerializedEvent {
    #[builder(into)]
    event_name: String,
    #[builder(into)]
    aggregate_id: String,
    #[builder(default)]
    event_data: EventData,
    #[builder(default = 1)]
    event_version: usize,
    #[builder(default = Utc::now())]
    occurred_on: DateTime<Utc>,
}

impl SerializedEvent {
    pub fn from_event<E: DomainEvent>(event: &E) -> Self {
        Self {
            event_name: event.event_name().to_string(),
            aggregate_id: event.aggregate_id().to_string(),
            event_data: event.event_data().clone(),
            event_version: event.event_version(),
            occurred_on: event.occurred_on(),
        }
    }

    pub fn event_name(&self) -> &str {
        &self.event_name
    }

    pub fn aggregate_id(&self) -> &str {
        &self.aggregate_id
    }

    pub fn event_data(&self) -> &EventData {
        &self.event_data
    }

    pub fn event_version(&self) -> usize {
        self.event_version
    }

    pub fn occurred_on(&self) -> DateTime<Utc> {
        self.occurred_on
    }

    pub fn to_json(&self) -> DomainResult<Value> {
        Ok(serde_json::to_value(self)?)
    }
}
