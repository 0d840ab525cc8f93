use ddd_domain::entity::{Entity, EntityState};
use ddd_macros::{entity, entity_id};
use uuid::Uuid;

#[entity_id]
struct OrderId(Uuid);

#[entity_id(debug = false)]
struct Sku(String);

#[entity(id = OrderId, name = "order", debug = false)]
struct Order {
    lines: Vec<Sku>,
}

fn main() {
    let raw = Uuid::new_v4();
    let id = OrderId::new(raw);

    let parsed: OrderId = id.to_string().parse().unwrap();
    assert_eq!(parsed, id);
    assert_eq!(parsed.clone().into_inner(), raw);
    assert!("not-a-uuid".parse::<OrderId>().is_err());
    assert_eq!(serde_json::to_value(&id).unwrap(), serde_json::json!(raw.to_string()));
    let _ = format!("{:?}", id);

    let order = Order {
        state: EntityState::new(id.clone()),
        lines: vec![Sku::new("ABC-1".to_string())],
    };
    assert_eq!(order.id(), &id);
    assert_eq!(order.lines[0].to_string(), "ABC-1");

    let other = Order {
        state: EntityState::new(parsed),
        lines: Vec::new(),
    };
    assert!(order.equals(&other));
}
