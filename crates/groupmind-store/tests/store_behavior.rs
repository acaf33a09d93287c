use groupmind_core::types::{Emotion, MessageRole, SessionId, SessionType};
use groupmind_store::types::NewMessage;
use groupmind_store::Store;

fn open() -> Store {
    Store::open_in_memory().unwrap()
}

#[test]
fn get_or_create_session_is_idempotent() {
    let store = open();
    let id = SessionId::group(42);

    let first = store.get_or_create_session(&id, 42).unwrap();
    let second = store.get_or_create_session(&id, 42).unwrap();

    assert_eq!(first.id.as_str(), second.id.as_str());
    assert_eq!(first.created_at, second.created_at);
}

#[test]
fn session_id_round_trips_through_parse() {
    let id = SessionId::personal(7);
    let (kind, target) = id.parse().unwrap();
    assert_eq!(kind, SessionType::Personal);
    assert_eq!(target, 7);
}

#[test]
fn get_messages_returns_oldest_first() {
    let store = open();
    let id = SessionId::group(1);
    store.get_or_create_session(&id, 1).unwrap();

    for i in 0..3 {
        let msg = NewMessage::new(id.clone(), MessageRole::User, format!("msg {i}"));
        store.save_message(&msg).unwrap();
    }

    let messages = store.get_messages(&id, 10, None).unwrap();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0].content, "msg 0");
    assert_eq!(messages[2].content, "msg 2");
}

#[test]
fn reset_session_clears_messages_but_keeps_identity() {
    let store = open();
    let id = SessionId::group(2);
    store.get_or_create_session(&id, 2).unwrap();
    store
        .save_message(&NewMessage::new(id.clone(), MessageRole::User, "hi"))
        .unwrap();
    store.set_compressed_context(&id, Some("summary")).unwrap();

    store.reset_session(&id).unwrap();

    let messages = store.get_messages(&id, 10, None).unwrap();
    assert!(messages.is_empty());
    let session = store.get_session(&id).unwrap().unwrap();
    assert_eq!(session.compressed_context, None);
}

#[test]
fn topics_are_trimmed_to_retention_cap() {
    let store = open();
    let id = SessionId::group(3);
    store.get_or_create_session(&id, 3).unwrap();

    for i in 0..5 {
        store
            .save_topic(&id, &format!("topic {i}"), &["a".to_string()], "summary")
            .unwrap();
    }
    store.trim_topics(&id, 2).unwrap();

    let topics = store.get_topics(&id, 10).unwrap();
    assert_eq!(topics.len(), 2);
}

#[test]
fn expressions_delete_oldest_first_on_overflow() {
    let store = open();
    let id = SessionId::group(4);
    store.get_or_create_session(&id, 4).unwrap();

    for i in 0..4 {
        store
            .save_expression(&id, 9, "alice", "greets", "casual", &format!("hey #{i}"))
            .unwrap();
    }
    store.delete_oldest_expressions(&id, 2).unwrap();

    let remaining = store.get_expressions(&id, 10).unwrap();
    assert_eq!(remaining.len(), 2);
}

#[test]
fn save_emoji_is_idempotent_on_duplicate_file_name() {
    let store = open();
    store
        .save_emoji("wave.png", "a friendly wave", Emotion::Happy)
        .unwrap();
    store
        .save_emoji("wave.png", "a friendly wave", Emotion::Happy)
        .unwrap();

    let all = store.get_all_emojis().unwrap();
    assert_eq!(all.len(), 1);
}

#[test]
fn get_by_emotion_orders_by_usage_descending() {
    let store = open();
    store
        .save_emoji("a.png", "smile", Emotion::Happy)
        .unwrap();
    store.save_emoji("b.png", "grin", Emotion::Happy).unwrap();

    let all = store.get_all_emojis().unwrap();
    let b = all.iter().find(|e| e.file_name == "b.png").unwrap();
    store.increment_emoji_usage(b.id).unwrap();

    let ranked = store.get_by_emotion(Emotion::Happy, 10).unwrap();
    assert_eq!(ranked[0].file_name, "b.png");
}
