//! 订单仓储示例
//!
//! 展示一个聚合从创建、修改、并发冲突到删除的完整持久化流程。
//!
//! 运行示例：
//! ```bash
//! RUST_LOG=debug cargo run -p ddd-domain --example order_repository
//! ```

use ddd_domain::aggregate_root::{AggregateRoot, EventLog};
use ddd_domain::domain_event::{BaseEvent, SerializedEvent};
use ddd_domain::entity::{ChangeSet, Entity, EntityState, FieldValues, TrackChanges};
use ddd_domain::error::{DomainError, DomainResult};
use ddd_domain::eventing::{EventHandler, HandledEventType, InMemoryEventPublisher};
use ddd_domain::mapper::{EntityMapper, EntityMapperResolver};
use ddd_domain::persist::{InMemoryRecordStore, Record, Repository, RepositoryConfig};
use ddd_macros::{domain_event, entity, entity_id};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use ulid::Ulid;

#[entity_id]
struct OrderId(Ulid);

#[domain_event]
enum OrderEvent {
    #[event(name = "order.placed")]
    Placed { customer: String },
    #[event(name = "order.paid")]
    Paid { amount: i64 },
}

#[entity(id = OrderId, event = OrderEvent, name = "order")]
struct Order {
    customer: String,
    paid: i64,
}

impl Order {
    fn place(customer: &str) -> Self {
        let id = OrderId::new(Ulid::new());
        let mut order = Self {
            state: EntityState::new(id.clone()),
            events: EventLog::new(),
            customer: customer.to_string(),
            paid: 0,
        };
        order.record_event(OrderEvent::Placed {
            base: BaseEvent::new(id.to_string()),
            customer: customer.to_string(),
        });
        order
    }

    fn pay(&mut self, amount: i64) -> DomainResult<()> {
        if amount <= 0 {
            return Err(DomainError::validation("amount must be positive"));
        }
        let total = self.paid + amount;
        self.change(FieldValues::new().with("paid", total))?;
        let event = OrderEvent::Paid {
            base: BaseEvent::new(self.id().to_string()),
            amount,
        };
        self.record_event(event);
        Ok(())
    }
}

impl TrackChanges for Order {
    fn current_values(&self) -> FieldValues {
        FieldValues::new()
            .with("customer", self.customer.as_str())
            .with("paid", self.paid)
    }

    fn apply_changes(&mut self, changes: &ChangeSet) -> DomainResult<()> {
        for change in changes {
            match change.field() {
                "customer" => self.customer = change.new_as()?,
                "paid" => self.paid = change.new_as()?,
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
        let id: OrderId = record.id().parse().map_err(|e| DomainError::Parse {
            reason: format!("orders.id: {e}"),
        })?;
        Ok(Order {
            state: EntityState::restore(id, record.timestamps(), record.version()),
            events: EventLog::new(),
            customer: record.attribute("customer")?,
            paid: record.attribute("paid")?,
        })
    }

    fn write_fields(&self, entity: &Order, record: &mut Record) -> DomainResult<()> {
        record.set_attribute("customer", &entity.customer)?;
        record.set_attribute("paid", &entity.paid)
    }
}

struct PrintHandler;

impl EventHandler for PrintHandler {
    fn handler_name(&self) -> &str {
        "print"
    }

    fn handled_event_type(&self) -> HandledEventType {
        HandledEventType::All
    }

    fn handle(&self, event: &SerializedEvent) -> anyhow::Result<()> {
        println!("   -> 事件 {}", event.to_json()?);
        Ok(())
    }
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
    let store = Arc::new(InMemoryRecordStore::new());
    let publisher = Arc::new(InMemoryEventPublisher::new(vec![Arc::new(PrintHandler) as Arc<dyn EventHandler>]));
    let repo: Repository<Order> =
        Repository::new(resolver, store.clone(), publisher, RepositoryConfig::default())?;

    println!("1. 创建订单");
    let mut order = Order::place("ada");
    repo.save(&mut order)?;
    println!("   {} 已保存，版本 {}", order.id(), order.version());

    println!("2. 支付");
    order.pay(120)?;
    repo.save(&mut order)?;
    println!("   已支付 {}，版本 {}", order.paid, order.version());

    println!("3. 无变更保存");
    let before = store.write_count();
    repo.save(&mut order)?;
    println!("   写入次数 {} -> {}", before, store.write_count());

    println!("4. 过期副本");
    let mut stale = repo.find(order.id())?.ok_or_else(|| anyhow::anyhow!("order vanished"))?;
    order.pay(30)?;
    repo.save(&mut order)?;
    stale.pay(1)?;
    match repo.save(&mut stale) {
        Err(err @ DomainError::ConcurrencyConflict { .. }) => println!("   冲突: {err}"),
        other => anyhow::bail!("expected a conflict, got {other:?}"),
    }

    println!("5. 删除");
    repo.delete(&order)?;
    println!("   仍然存在: {}", repo.exists(order.id())?);

    Ok(())
}
