use ddd_application::{AppError, ErrorPayload};
use ddd_domain::aggregate_root::{AggregateRoot, EventLog};
use ddd_domain::domain_event::{BaseEvent, EventData, SerializedEvent};
use ddd_domain::entity::{ChangeSet, Entity, EntityState, FieldValues, TrackChanges};
use ddd_domain::error::{DomainError, DomainResult};
use ddd_domain::eventing::{EventHandler, HandledEventType, InMemoryEventPublisher};
use ddd_domain::mapper::{EntityMapper, EntityMapperResolver};
use ddd_domain::persist::{InMemoryRecordStore, Record, Repository, RepositoryConfig};
use ddd_domain::value_object::ValueObject;
use ddd_macros::{domain_event, entity, entity_id};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[entity_id]
struct OrderId(Uuid);

#[domain_event]
enum OrderEvent {
    #[event(name = "order.placed")]
    Placed { customer: String },
    #[event(name = "order.line_added")]
    LineAdded { quantity: u32, unit_price: i64 },
}

#[entity(id = OrderId, event = OrderEvent, name = "order")]
struct Order {
    customer: String,
    total: i64,
}

/// 订购数量：1..=999
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Quantity(u32);

impl ValueObject for Quantity {
    type Error = DomainError;

    fn validate(&self) -> Result<(), Self::Error> {
        if (1..=999).contains(&self.0) {
            Ok(())
        } else {
            Err(DomainError::validation(format!(
                "quantity {} out of range 1..=999",
                self.0
            )))
        }
    }
}

impl Order {
    fn place(customer: &str) -> Self {
        let id = OrderId::new(Uuid::new_v4());
        let mut order = Self {
            state: EntityState::new(id.clone()),
            events: EventLog::new(),
            customer: customer.to_string(),
            total: 0,
        };
        let mut data = EventData::new();
        data.insert("customer".to_string(), customer.into());
        order.record_event(OrderEvent::Placed {
            base: BaseEvent::with_data(id.to_string(), data),
            customer: customer.to_string(),
        });
        order
    }

    fn add_line(&mut self, quantity: Quantity, unit_price: i64) -> DomainResult<()> {
        quantity.validate()?;
        let total = i64::from(quantity.0)
            .checked_mul(unit_price)
            .and_then(|line| self.total.checked_add(line))
            .ok_or_else(|| DomainError::validation("order total overflows"))?;
        self.change(FieldValues::new().with("total", total))?;

        let event = OrderEvent::LineAdded {
            base: BaseEvent::new(self.id().to_string()),
            quantity: quantity.0,
            unit_price,
        };
        self.record_event(event);
        Ok(())
    }
}

impl TrackChanges for Order {
    fn current_values(&self) -> FieldValues {
        FieldValues::new()
            .with("customer", self.customer.as_str())
            .with("total", self.total)
    }

    fn apply_changes(&mut self, changes: &ChangeSet) -> DomainResult<()> {
        for change in changes {
            match change.field() {
                "customer" => self.customer = change.new_as()?,
                "total" => self.total = change.new_as()?,
                other => return Err(DomainError::validation(format!("unknown field `{other}`"))),
            }
        }
        Ok(())
    }
}

struct OrderMapper;

impl EntityMapper<Order> for OrderMapper {
    fn table(&self) -> &str {
        "orders"
    }

    fn to_entity(&self, record: &Record, _deep: bool) -> DomainResult<Order> {
        let id: OrderId = record.id().parse()?;
        Ok(Order {
            state: EntityState::restore(id, record.timestamps(), record.version()),
            events: EventLog::new(),
            customer: record.attribute("customer")?,
            total: record.attribute("total")?,
        })
    }

    fn write_fields(&self, entity: &Order, record: &mut Record) -> DomainResult<()> {
        record.set_attribute("customer", &entity.customer)?;
        record.set_attribute("total", &entity.total)
    }
}

struct AuditLog;

impl EventHandler for AuditLog {
    fn handler_name(&self) -> &str {
        "audit-log"
    }

    fn handled_event_type(&self) -> HandledEventType {
        HandledEventType::All
    }

    fn handle(&self, event: &SerializedEvent) -> anyhow::Result<()> {
        info!(event = %event.to_json()?, "audit");
        Ok(())
    }
}

fn render(err: DomainError) -> anyhow::Result<String> {
    let payload = ErrorPayload::from(AppError::from(err));
    Ok(serde_json::to_string(&payload)?)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let resolver = Arc::new(
        EntityMapperResolver::builder()
            .register::<Order, _>(OrderMapper)?
            .build(),
    );
    let store = Arc::new(InMemoryRecordStore::new().with_relation("orders", "lines"));
    let handlers: Vec<Arc<dyn EventHandler>> = vec![Arc::new(AuditLog)];
    let publisher = Arc::new(InMemoryEventPublisher::new(handlers));
    let repo: Repository<Order> =
        Repository::new(resolver, store.clone(), publisher, RepositoryConfig::default())?;

    // 1. 新建聚合：创建记录并发布一条事件
    let mut order = Order::place("ada");
    let record = repo.save(&mut order)?;
    info!(
        id = %order.id(),
        version = %record.version(),
        pending = order.has_uncommitted_events(),
        "scenario 1: order created"
    );

    // 2. 无变更保存：零写入
    let writes = store.write_count();
    let mut loaded = repo
        .find(order.id())?
        .ok_or_else(|| anyhow::anyhow!("order {} not found", order.id()))?;
    let record = repo.save(&mut loaded)?;
    info!(
        writes_before = writes,
        writes_after = store.write_count(),
        version = %record.version(),
        "scenario 2: unchanged save"
    );

    // 3. 两份独立加载的副本：后保存者冲突
    let mut copy_a = repo.find(order.id())?.ok_or_else(|| anyhow::anyhow!("order vanished"))?;
    let mut copy_b = repo.find(order.id())?.ok_or_else(|| anyhow::anyhow!("order vanished"))?;
    copy_a.add_line(Quantity(2), 1_500)?;
    repo.save(&mut copy_a)?;
    copy_b.add_line(Quantity(1), 900)?;
    match repo.save(&mut copy_b) {
        Err(err @ DomainError::ConcurrencyConflict { .. }) => {
            warn!(payload = %render(err)?, "scenario 3: stale copy rejected");
        }
        other => anyhow::bail!("scenario 3 expected a conflict, got {other:?}"),
    }

    if let Err(err) = copy_a.add_line(Quantity(0), 100) {
        info!(payload = %render(err)?, "rejected line");
    }

    // 5. 未知关联
    match repo.delete_related(&copy_a, "nonexistentRelation", "l-1") {
        Err(err @ DomainError::RelationNotFound { .. }) => {
            warn!(payload = %render(err)?, "scenario 5: unknown relation");
        }
        other => anyhow::bail!("scenario 5 expected RelationNotFound, got {other:?}"),
    }

    // 4. 删除后不再存在
    repo.delete(&copy_a)?;
    info!(exists = repo.exists(copy_a.id())?, "scenario 4: order deleted");

    Ok(())
}
