//! Client-side view of the realtime feed: an initial fetch snapshot kept
//! consistent by applying change frames to a keyed list.

use chat_service::models::conversation::Conversation;
use chat_service::models::message::Message;
use chrono::Utc;
use realtime_core::{ChangeEvent, InsertOrder, RealtimeEvent, SyncedList, Topic};
use uuid::Uuid;

fn message(conversation_id: Uuid, content: &str) -> Message {
    Message {
        id: Uuid::new_v4(),
        conversation_id,
        author_id: Some(Uuid::new_v4()),
        role: "user".into(),
        content: content.into(),
        pinned: false,
        attachments: serde_json::json!([]),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn conversation(title: &str) -> Conversation {
    Conversation {
        id: Uuid::new_v4(),
        owner_id: Uuid::new_v4(),
        title: title.into(),
        is_collaborative: false,
        pinned: false,
        share_token: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// Decode the row out of a broadcast frame the way a subscriber would.
fn row_from_frame<T: serde::de::DeserializeOwned>(frame: &str) -> T {
    let value: serde_json::Value = serde_json::from_str(frame).unwrap();
    serde_json::from_value(value["row"].clone()).unwrap()
}

#[test]
fn message_feed_appends_and_dedups_the_echo() {
    let conversation_id = Uuid::new_v4();
    let mut feed: SyncedList<Message> = SyncedList::new(InsertOrder::Append);

    let first = message(conversation_id, "hello");
    feed.reset(vec![first.clone()]);

    let second = message(conversation_id, "world");
    let frame = RealtimeEvent::Change(ChangeEvent::insert(
        "messages",
        serde_json::to_value(&second).unwrap(),
    ))
    .to_frame(Topic::Messages(conversation_id))
    .unwrap();

    let decoded: Message = row_from_frame(&frame);
    feed.apply_insert(decoded);
    assert_eq!(feed.len(), 2);
    assert_eq!(feed.items()[1].content, "world");

    // The optimistic insert raced the server echo: same id arrives again.
    let echo: Message = row_from_frame(&frame);
    feed.apply_insert(echo);
    assert_eq!(feed.len(), 2);
}

#[test]
fn conversation_feed_prepends_and_replaces_on_update() {
    let mut feed: SyncedList<Conversation> = SyncedList::new(InsertOrder::Prepend);
    let older = conversation("older");
    feed.reset(vec![older.clone()]);

    let newer = conversation("newer");
    feed.apply_insert(newer.clone());
    assert_eq!(feed.items()[0].title, "newer");
    assert_eq!(feed.items()[1].title, "older");

    let mut renamed = older.clone();
    renamed.title = "renamed".into();
    feed.apply_update(renamed);
    assert_eq!(feed.items()[1].title, "renamed");

    feed.apply_delete(newer.id);
    assert_eq!(feed.len(), 1);
}

#[test]
fn delete_frames_carry_enough_to_remove_by_id() {
    let conversation_id = Uuid::new_v4();
    let target = message(conversation_id, "gone");
    let mut feed: SyncedList<Message> = SyncedList::new(InsertOrder::Append);
    feed.reset(vec![target.clone()]);

    let frame = RealtimeEvent::Change(ChangeEvent::delete("messages", target.id))
        .to_frame(Topic::Messages(conversation_id))
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&frame).unwrap();
    let id = Uuid::parse_str(value["row"]["id"].as_str().unwrap()).unwrap();

    feed.apply_delete(id);
    assert!(feed.is_empty());
}
