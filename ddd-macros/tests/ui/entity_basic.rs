use ddd_domain::entity::{Entity, EntityState};
use ddd_macros::entity;

#[entity(name = "tag")]
struct Tag {
    label: String,
}

#[entity(id = u64, debug = false)]
struct Counter {
    state: EntityState<u64>,
    hits: u32,
}

impl std::fmt::Debug for Counter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Counter({})", self.hits)
    }
}

fn main() {
    let tag = Tag {
        state: EntityState::new("t-1".to_string()),
        label: "red".to_string(),
    };
    assert_eq!(Tag::TYPE, "tag");
    assert_eq!(tag.id(), "t-1");
    assert!(tag.version().is_new());
    assert_eq!(tag.clone(), tag);
    let _ = format!("{:?} {}", tag, tag.label);

    let counter = Counter {
        state: EntityState::new(7),
        hits: 0,
    };
    assert_eq!(Counter::TYPE, "Counter");
    assert_eq!(*counter.id(), 7);
    let _ = format!("{:?}", counter);
}
