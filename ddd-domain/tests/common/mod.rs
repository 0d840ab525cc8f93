#![allow(dead_code)]

use ddd_domain::aggregate_root::{AggregateRoot, EventLog};
use ddd_domain::domain_event::{BaseEvent, EventData, SerializedEvent};
use ddd_domain::entity::{ChangeSet, EntityState, FieldValues, Timestamps, TrackChanges};
use ddd_domain::error::{DomainError, DomainResult};
use ddd_domain::eventing::DomainEventPublisher;
use ddd_domain::mapper::{EntityMapper, EntityMapperResolver};
use ddd_domain::persist::{InMemoryRecordStore, Record, Repository, RepositoryConfig};
use ddd_domain::value_object::Version;
use ddd_macros::{domain_event, entity};
use serde_json::json;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const ORDERS: &str = "orders";

#[domain_event]
pub enum OrderEvent {
    #[event(name = "order.placed")]
    Placed { customer: String },
    #[event(name = "order.status_changed")]
    StatusChanged { from: String, to: String },
}

#[entity(event = OrderEvent, name = "order")]
pub struct Order {
    pub customer: String,
    pub status: String,
    pub total: i64,
}

impl Order {
    pub fn place(id: &str, customer: &str) -> Self {
        let mut order = Self {
            state: EntityState::new(id.to_string()),
            events: EventLog::new(),
            customer: customer.to_string(),
            status: "pending".to_string(),
            total: 0,
        };
        let mut data = EventData::new();
        data.insert("customer".to_string(), json!(customer));
        order.record_event(OrderEvent::Placed {
            base: BaseEvent::with_data(id, data),
            customer: customer.to_string(),
        });
        order
    }

    pub fn change_status(&mut self, to: &str) -> DomainResult<ChangeSet> {
        let from = self.status.clone();
        let changes = self.change(FieldValues::new().with("status", to))?;
        if !changes.is_empty() {
            let event = OrderEvent::StatusChanged {
                base: BaseEvent::new(self.state.id().as_str()),
                from,
                to: to.to_string(),
            };
            self.record_event(event);
        }
        Ok(changes)
    }
}

impl TrackChanges for Order {
    fn current_values(&self) -> FieldValues {
        FieldValues::new()
            .with("customer", self.customer.as_str())
            .with("status", self.status.as_str())
            .with("total", self.total)
    }

    fn apply_changes(&mut self, changes: &ChangeSet) -> DomainResult<()> {
        for change in changes {
            match change.field() {
                "customer" => self.customer = change.new_as()?,
                "status" => self.status = change.new_as()?,
                "total" => self.total = change.new_as()?,
                other => return Err(DomainError::validation(format!("unknown field `{other}`"))),
            }
        }
        Ok(())
    }
}

pub struct OrderMapper;

impl EntityMapper<Order> for OrderMapper {
    fn table(&self) -> &str {
        ORDERS
    }

    fn to_entity(&self, record: &Record, _deep: bool) -> DomainResult<Order> {
        Ok(Order {
            state: EntityState::restore(
                record.id().to_string(),
                record.timestamps(),
                record.version(),
            ),
            events: EventLog::new(),
            customer: record.attribute("customer")?,
            status: record.attribute("status")?,
            total: record.attribute("total")?,
        })
    }

    fn write_fields(&self, entity: &Order, record: &mut Record) -> DomainResult<()> {
        record.set_attribute("customer", &entity.customer)?;
        record.set_attribute("status", &entity.status)?;
        record.set_attribute("total", &entity.total)
    }
}

/// 记录每次发布调用；可设置让下一次发布失败
#[derive(Default)]
pub struct RecordingPublisher {
    published: Mutex<Vec<SerializedEvent>>,
    calls: AtomicUsize,
    fail_next: AtomicBool,
}

impl RecordingPublisher {
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn event_names(&self) -> Vec<String> {
        self.published
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.event_name().to_string())
            .collect()
    }
}

impl DomainEventPublisher for RecordingPublisher {
    fn publish(&self, events: &[SerializedEvent]) -> DomainResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(DomainError::EventHandler {
                handler: "recording".to_string(),
                event_name: events
                    .first()
                    .map(|e| e.event_name().to_string())
                    .unwrap_or_default(),
                reason: "subscriber unavailable".to_string(),
            });
        }
        self.published.lock().unwrap().extend_from_slice(events);
        Ok(())
    }
}

pub struct Fixture {
    pub store: Arc<InMemoryRecordStore>,
    pub publisher: Arc<RecordingPublisher>,
    pub repo: Repository<Order>,
}

pub fn fixture() -> Fixture {
    fixture_with(RepositoryConfig::default())
}

pub fn fixture_with(config: RepositoryConfig) -> Fixture {
    let store = Arc::new(InMemoryRecordStore::new().with_relation(ORDERS, "lines"));
    let publisher = Arc::new(RecordingPublisher::default());
    let resolver = Arc::new(
        EntityMapperResolver::builder()
            .register::<Order, _>(OrderMapper)
            .unwrap()
            .build(),
    );
    let repo = Repository::new(resolver, store.clone(), publisher.clone(), config).unwrap();

    Fixture {
        store,
        publisher,
        repo,
    }
}

/// 直接放入一条已持久化的订单行
pub fn seed_order(store: &InMemoryRecordStore, id: &str, version: usize, status: &str) -> Record {
    let mut record = Record::new(ORDERS, id);
    record.set_attribute("customer", "ada").unwrap();
    record.set_attribute("status", status).unwrap();
    record.set_attribute("total", &100).unwrap();
    store.seed(record.persisted(Version::from_value(version), Timestamps::now()))
}
