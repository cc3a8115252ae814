//! Message repository

use crate::domain::entities::Message;
use nexo_common::Result;
use sqlx::{PgPool, Postgres, Transaction};

#[derive(Clone)]
pub struct MessageRepository {
    pool: PgPool,
}

impl MessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List messages for a conversation, oldest first.
    /// `seq` breaks ties between messages stored within the same instant.
    pub async fn list_by_conversation(&self, conversation_id: &str) -> Result<Vec<Message>> {
        let messages = sqlx::query_as::<_, Message>(
            r#"
            SELECT id, conversation_id, role, content, image_data, "timestamp"
            FROM messages
            WHERE conversation_id = $1
            ORDER BY "timestamp" ASC, seq ASC
            "#,
        )
        .bind(conversation_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }

    /// Create a new message
    pub async fn create(&self, msg: &Message) -> Result<Message> {
        let created = sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (id, conversation_id, role, content, image_data, "timestamp")
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, conversation_id, role, content, image_data, "timestamp"
            "#,
        )
        .bind(&msg.id)
        .bind(&msg.conversation_id)
        .bind(msg.role)
        .bind(&msg.content)
        .bind(&msg.image_data)
        .bind(msg.timestamp)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }
}

/// Delete every message of a conversation within an existing transaction.
pub async fn delete_by_conversation_tx(
    tx: &mut Transaction<'_, Postgres>,
    conversation_id: &str,
) -> Result<u64> {
    let result = sqlx::query("DELETE FROM messages WHERE conversation_id = $1")
        .bind(conversation_id)
        .execute(&mut **tx)
        .await?;

    Ok(result.rows_affected())
}
