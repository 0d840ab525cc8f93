//! 聚合根（Aggregate Root）
//!
//! 聚合根是一致性边界，也是自身领域事件的唯一记录者。事件能力以 `EventLog`
//! 组合进具体类型，并只通过 `AggregateRoot` 暴露；普通实体不实现该 trait，
//! 因而无法获得事件语义。
//!
use crate::domain_event::DomainEvent;
use crate::entity::Entity;

/// 待发布事件台账
///
/// 仅在一次业务变更与下一次成功保存之间可能非空。
#[derive(Debug, Clone)]
pub struct EventLog<E> {
    pending: Vec<E>,
}

impl<E> Default for EventLog<E> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
        }
    }
}

impl<E> EventLog<E>
where
    E: DomainEvent,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: E) {
        self.pending.push(event);
    }

    /// 返回独立副本，调用方对其任何修改都不会影响台账
    pub fn uncommitted(&self) -> Vec<E> {
        self.pending.clone()
    }

    pub fn has_uncommitted(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn commit(&mut self) {
        self.pending.clear();
    }
}

/// 聚合根：在 `Entity` 之上增加待发布事件台账
pub trait AggregateRoot: Entity {
    /// 该聚合产生的领域事件类型
    type Event: DomainEvent;

    fn event_log(&self) -> &EventLog<Self::Event>;

    fn event_log_mut(&mut self) -> &mut EventLog<Self::Event>;

    fn record_event(&mut self, event: Self::Event) {
        self.event_log_mut().record(event);
    }

    fn uncommitted_events(&self) -> Vec<Self::Event> {
        self.event_log().uncommitted()
    }

    fn has_uncommitted_events(&self) -> bool {
        self.event_log().has_uncommitted()
    }

    fn mark_events_as_committed(&mut self) {
        self.event_log_mut().commit();
    }

    /// 显式复制：保留领域字段、标识、时间戳与版本，丢弃待发布事件与变更台账
    fn duplicate(&self) -> Self
    where
        Self: Clone,
    {
        let mut copy = self.clone();
        copy.event_log_mut().commit();
        copy.state_mut().clear_changes();
        copy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain_event::BaseEvent;
    use crate::entity::{ChangeSet, EntityState, FieldValues, Timestamps, TrackChanges};
    use crate::error::DomainResult;
    use crate::value_object::Version;

    #[derive(Debug, Clone)]
    struct NoteAdded {
        base: BaseEvent,
    }

    impl DomainEvent for NoteAdded {
        fn event_name(&self) -> &str {
            "ticket.note_added"
        }

        fn base(&self) -> &BaseEvent {
            &self.base
        }
    }

    #[derive(Debug, Clone)]
    struct Ticket {
        state: EntityState<String>,
        events: EventLog<NoteAdded>,
        title: String,
    }

    impl Ticket {
        fn open(id: &str, title: &str) -> Self {
            Self {
                state: EntityState::new(id.to_string()),
                events: EventLog::new(),
                title: title.to_string(),
            }
        }

        fn add_note(&mut self) {
            let event = NoteAdded {
                base: BaseEvent::new(self.id().clone()),
            };
            self.record_event(event);
        }
    }

    impl Entity for Ticket {
        type Id = String;
        const TYPE: &'static str = "ticket";

        fn state(&self) -> &EntityState<String> {
            &self.state
        }

        fn state_mut(&mut self) -> &mut EntityState<String> {
            &mut self.state
        }
    }

    impl TrackChanges for Ticket {
        fn current_values(&self) -> FieldValues {
            FieldValues::new().with("title", self.title.as_str())
        }

        fn apply_changes(&mut self, changes: &ChangeSet) -> DomainResult<()> {
            if let Some(c) = changes.get("title") {
                self.title = c.new_as()?;
            }
            Ok(())
        }
    }

    impl AggregateRoot for Ticket {
        type Event = NoteAdded;

        fn event_log(&self) -> &EventLog<NoteAdded> {
            &self.events
        }

        fn event_log_mut(&mut self) -> &mut EventLog<NoteAdded> {
            &mut self.events
        }
    }

    #[test]
    fn new_entity_is_transient_and_clean() {
        let t = Ticket::open("t-1", "printer jam");
        assert_eq!(t.version(), Version::new());
        assert!(!t.is_dirty());
        assert!(t.updated_at().is_none());
        assert!(!t.has_uncommitted_events());
    }

    #[test]
    fn identical_values_leave_entity_clean() {
        let mut t = Ticket::open("t-1", "printer jam");
        let changes = t.record_change(FieldValues::new().with("title", "printer jam"));
        assert!(changes.is_empty());
        assert!(!t.is_dirty());
    }

    #[test]
    fn change_applies_and_marks_dirty_without_touching_version() {
        let mut t = Ticket::open("t-1", "printer jam");
        let changes = t
            .change(FieldValues::new().with("title", "printer on fire"))
            .unwrap();
        assert_eq!(changes.fields(), vec!["title"]);
        assert_eq!(t.title, "printer on fire");
        assert!(t.is_dirty());
        assert!(t.updated_at().is_some());
        assert_eq!(t.version(), Version::new());
    }

    #[test]
    fn record_change_resets_the_ledger_first() {
        let mut t = Ticket::open("t-1", "a");
        t.record_change(FieldValues::new().with("title", "b"));
        assert!(t.is_dirty());

        t.record_change(FieldValues::new().with("title", "a"));
        assert!(!t.is_dirty());
    }

    #[test]
    fn failed_apply_clears_the_ledger() {
        let mut t = Ticket::open("t-1", "a");
        let err = t.change(FieldValues::new().with("title", 42)).unwrap_err();
        assert!(matches!(err, crate::error::DomainError::Validation { .. }));
        assert!(!t.is_dirty());
        assert_eq!(t.title, "a");
    }

    #[test]
    fn hydrate_clears_ledger_but_keeps_events() {
        let mut t = Ticket::open("t-1", "a");
        t.change(FieldValues::new().with("title", "b")).unwrap();
        t.add_note();

        let ts = Timestamps::now();
        t.hydrate(ts, Version::from_value(7));
        assert!(!t.is_dirty());
        assert_eq!(t.version().value(), 7);
        assert_eq!(t.created_at(), ts.created_at);
        assert!(t.has_uncommitted_events());
    }

    #[test]
    fn touch_bumps_version_and_updated_at() {
        let mut t = Ticket::open("t-1", "a");
        t.touch();
        assert_eq!(t.version().value(), 1);
        assert!(t.updated_at().is_some());
    }

    #[test]
    fn uncommitted_events_are_independent_copies() {
        let mut t = Ticket::open("t-1", "a");
        t.add_note();
        t.add_note();

        let mut copy = t.uncommitted_events();
        copy.clear();
        assert_eq!(t.uncommitted_events().len(), 2);

        t.mark_events_as_committed();
        assert!(!t.has_uncommitted_events());
        assert!(t.uncommitted_events().is_empty());
    }

    #[test]
    fn duplicate_never_carries_pending_events() {
        let mut t = Ticket::open("t-1", "a");
        t.hydrate(Timestamps::now(), Version::from_value(4));
        t.add_note();
        t.add_note();
        t.record_change(FieldValues::new().with("title", "b"));

        let dup = t.duplicate();
        assert!(!dup.has_uncommitted_events());
        assert!(!dup.is_dirty());
        assert_eq!(dup.id(), t.id());
        assert_eq!(dup.version(), t.version());
        assert_eq!(dup.created_at(), t.created_at());
        assert_eq!(t.uncommitted_events().len(), 2);
    }

    #[test]
    fn equality_is_type_plus_id() {
        #[derive(Debug, Clone)]
        struct Label {
            state: EntityState<String>,
        }

        impl Entity for Label {
            type Id = String;
            const TYPE: &'static str = "label";

            fn state(&self) -> &EntityState<String> {
                &self.state
            }

            fn state_mut(&mut self) -> &mut EntityState<String> {
                &mut self.state
            }
        }

        let a = Ticket::open("x-1", "a");
        let b = Ticket::open("x-1", "completely different");
        let c = Ticket::open("x-2", "a");
        let label = Label {
            state: EntityState::new("x-1".to_string()),
        };

        assert!(a.equals(&b));
        assert!(!a.equals(&c));
        assert!(!a.equals(&label));
    }
}
