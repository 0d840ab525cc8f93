use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 事件载荷：保持插入顺序的键值映射
pub type EventData = Map<String, Value>;

/// 领域事件的公共部分
///
/// 构造时捕获 `occurred_on`，之后不提供任何修改入口。
#[derive(Builder, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseEvent {
    #[builder(into)]
    aggregate_id: String,
    #[builder(default)]
    event_data: EventData,
    #[builder(default = 1)]
    event_version: usize,
    #[builder(default = Utc::now())]
    occurred_on: DateTime<Utc>,
}

impl BaseEvent {
    /// 空载荷、版本 1
    pub fn new(aggregate_id: impl Into<String>) -> Self {
        Self::builder().aggregate_id(aggregate_id).build()
    }

    pub fn with_data(aggregate_id: impl Into<String>, event_data: EventData) -> Self {
        Self::builder()
            .aggregate_id(aggregate_id)
            .event_data(event_data)
            .build()
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
}
