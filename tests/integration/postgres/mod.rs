//! Postgres store tests
//!
//! Need a reachable database in `TEST_DATABASE_URL`; run with `--ignored`.

use chrono::Utc;
use nexo_conversations::{Conversation, ConversationStore, Message, MessageRole, PgConversationStore};

use crate::common::test_database_url;

async fn store() -> PgConversationStore {
    let url = test_database_url().expect("TEST_DATABASE_URL must be set for Postgres tests");
    PgConversationStore::connect(&url, None)
        .await
        .expect("Postgres should be reachable")
}

#[tokio::test]
#[ignore]
async fn test_pg_conversation_lifecycle() {
    let store = store().await;

    let conv = Conversation::new(Some("pg lifecycle".to_string())).unwrap();
    let created = store.create_conversation(&conv).await.unwrap();
    assert_eq!(created.id, conv.id);
    assert_eq!(created.title, "pg lifecycle");

    let found = store.find_conversation(&conv.id).await.unwrap().unwrap();
    assert_eq!(found.id, conv.id);

    assert!(store.touch_conversation(&conv.id, Utc::now()).await.unwrap());
    assert!(!store.touch_conversation("missing", Utc::now()).await.unwrap());

    assert!(store.delete_conversation(&conv.id).await.unwrap());
    assert!(store.find_conversation(&conv.id).await.unwrap().is_none());

    store.close().await;
}

#[tokio::test]
#[ignore]
async fn test_pg_messages_ordered_and_cascade_deleted() {
    let store = store().await;

    let conv = Conversation::new(None).unwrap();
    store.create_conversation(&conv).await.unwrap();

    let at = Utc::now();
    let mut user = Message::new_user(&conv.id, "first".to_string(), None).unwrap();
    let mut assistant = Message::new_assistant(&conv.id, "second".to_string()).unwrap();
    user.timestamp = at;
    assistant.timestamp = at;
    store.create_message(&user).await.unwrap();
    store.create_message(&assistant).await.unwrap();

    let messages = store.list_messages(&conv.id).await.unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, MessageRole::User);
    assert_eq!(messages[1].role, MessageRole::Assistant);

    assert!(store.delete_conversation(&conv.id).await.unwrap());
    assert!(store.list_messages(&conv.id).await.unwrap().is_empty());

    store.close().await;
}

#[tokio::test]
#[ignore]
async fn test_pg_message_requires_conversation() {
    let store = store().await;

    let orphan = Message::new_user("no-such-conversation", "hi".to_string(), None).unwrap();
    assert!(store.create_message(&orphan).await.is_err());

    store.close().await;
}
