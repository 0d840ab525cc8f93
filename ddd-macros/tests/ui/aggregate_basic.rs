use ddd_domain::aggregate_root::{AggregateRoot, EventLog};
use ddd_domain::domain_event::{BaseEvent, DomainEvent};
use ddd_domain::entity::{Entity, EntityState};
use ddd_macros::{domain_event, entity, entity_id};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[entity_id]
struct AccountId(Uuid);

#[domain_event]
enum AccountEvent {
    #[event(name = "account.opened")]
    Opened { owner: String },
    Closed {},
}

#[entity(id = AccountId, event = AccountEvent, name = "account")]
#[derive(Serialize, Deserialize)]
struct Account {
    owner: String,
}

fn main() {
    let id = AccountId::new(Uuid::new_v4());
    let mut account = Account {
        state: EntityState::new(id.clone()),
        events: EventLog::new(),
        owner: "ada".to_string(),
    };

    account.record_event(AccountEvent::Opened {
        base: BaseEvent::new(id.to_string()),
        owner: account.owner.clone(),
    });
    account.record_event(AccountEvent::Closed {
        base: BaseEvent::new(id.to_string()),
    });

    let names: Vec<String> = account
        .uncommitted_events()
        .iter()
        .map(|e| e.event_name().to_string())
        .collect();
    assert_eq!(names, vec!["account.opened", "AccountEvent.Closed"]);

    let json = serde_json::to_value(&account).unwrap();
    assert!(json.get("events").is_none());

    let copy = account.duplicate();
    assert!(!copy.has_uncommitted_events());
    assert_eq!(copy, account);
    assert_eq!(Account::TYPE, "account");
}
