use super::*;
use crate::kernel::services::ports::{LogLevel, LogMessage, NetworkTask};

fn message(id: u64) -> Entity {
    Entity::Message(LogMessage {
        id: EntityId(id),
        level: LogLevel::Info,
        label: String::new(),
        text: format!("message {id}"),
        metadata: Vec::new(),
    })
}

fn task(id: u64, url: &str) -> Entity {
    Entity::Task(NetworkTask {
        id: EntityId(id),
        url: url.to_string(),
        method: "GET".to_string(),
        status_code: Some(200),
        request_headers: Vec::new(),
        response_headers: Vec::new(),
        request_body: None,
        response_body: None,
        error: None,
    })
}

#[test]
fn test_snapshot_is_newest_first() {
    let store = MemoryEntityStore::with_entities((1..=3).map(message));
    assert_eq!(&*store.snapshot(), &[EntityId(3), EntityId(2), EntityId(1)]);
    assert_eq!(store.len(), 3);
}

#[test]
fn test_upsert_keeps_position() {
    let store = MemoryEntityStore::with_entities((1..=3).map(message));
    store.insert(message(2));
    assert_eq!(&*store.snapshot(), &[EntityId(3), EntityId(2), EntityId(1)]);
}

#[test]
fn test_bulk_insert_goes_in_front_of_existing() {
    let store = MemoryEntityStore::with_entities((1..=2).map(message));
    store.insert_all([message(3), message(1), message(4)]);
    assert_eq!(
        &*store.snapshot(),
        &[EntityId(4), EntityId(3), EntityId(2), EntityId(1)]
    );

    let large = MemoryEntityStore::with_entities((1..=20_000).map(message));
    assert_eq!(large.snapshot().first(), Some(&EntityId(20_000)));
    assert_eq!(large.snapshot().last(), Some(&EntityId(1)));
}

#[test]
fn test_remove_publishes_snapshot() {
    let store = MemoryEntityStore::with_entities((1..=3).map(message));
    let mut rx = store.subscribe();
    rx.borrow_and_update();

    assert!(store.remove(EntityId(2)));
    assert!(rx.has_changed().unwrap());
    assert_eq!(&**rx.borrow_and_update(), &[EntityId(3), EntityId(1)]);
    assert!(store.entity(EntityId(2)).is_none());
    assert!(!store.remove(EntityId(2)));
}

#[test]
fn test_hosts_sorted_by_frequency() {
    let store = MemoryEntityStore::with_entities(vec![
        task(1, "https://b.example.com/a"),
        task(2, "https://a.example.com/a"),
        task(3, "https://a.example.com/b"),
        message(4),
    ]);
    assert_eq!(store.hosts(), vec!["a.example.com", "b.example.com"]);
}
