use async_trait::async_trait;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::chatmodel::ChatMessage;

const MESSAGE_COLUMNS: &str = r#"
    id, sender_id, receiver_id, property_id, message, image, seen, created_at
"#;

#[async_trait]
pub trait ChatExt {
    async fn save_message(
        &self,
        sender_id: Uuid,
        receiver_id: Uuid,
        property_id: Option<Uuid>,
        message: String,
        image: Option<String>,
    ) -> Result<ChatMessage, Error>;

    /// Full history between two users, oldest first.
    async fn get_messages_between(
        &self,
        user_a: Uuid,
        user_b: Uuid,
    ) -> Result<Vec<ChatMessage>, Error>;

    /// Every partner the user has exchanged messages with, with the latest
    /// message and the count of unseen messages from that partner.
    async fn get_conversation_partners(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<(Uuid, ChatMessage, i64)>, Error>;

    /// Mark everything `sender` sent to `receiver` as seen.
    async fn mark_messages_seen(&self, sender_id: Uuid, receiver_id: Uuid) -> Result<u64, Error>;
}

#[async_trait]
impl ChatExt for DBClient {
    async fn save_message(
        &self,
        sender_id: Uuid,
        receiver_id: Uuid,
        property_id: Option<Uuid>,
        message: String,
        image: Option<String>,
    ) -> Result<ChatMessage, Error> {
        sqlx::query_as::<_, ChatMessage>(&format!(
            r#"
            INSERT INTO chat_messages (sender_id, receiver_id, property_id, message, image)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {MESSAGE_COLUMNS}
            "#
        ))
        .bind(sender_id)
        .bind(receiver_id)
        .bind(property_id)
        .bind(message)
        .bind(image)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_messages_between(
        &self,
        user_a: Uuid,
        user_b: Uuid,
    ) -> Result<Vec<ChatMessage>, Error> {
        sqlx::query_as::<_, ChatMessage>(&format!(
            r#"
            SELECT {MESSAGE_COLUMNS}
            FROM chat_messages
            WHERE (sender_id = $1 AND receiver_id = $2)
               OR (sender_id = $2 AND receiver_id = $1)
            ORDER BY created_at ASC
            "#
        ))
        .bind(user_a)
        .bind(user_b)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_conversation_partners(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<(Uuid, ChatMessage, i64)>, Error> {
        let messages = sqlx::query_as::<_, ChatMessage>(&format!(
            r#"
            SELECT DISTINCT ON (partner) {MESSAGE_COLUMNS}
            FROM (
                SELECT *,
                       CASE WHEN sender_id = $1 THEN receiver_id ELSE sender_id END AS partner
                FROM chat_messages
                WHERE sender_id = $1 OR receiver_id = $1
            ) m
            ORDER BY partner, created_at DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut conversations = Vec::with_capacity(messages.len());
        for last_message in messages {
            let partner = if last_message.sender_id == user_id {
                last_message.receiver_id
            } else {
                last_message.sender_id
            };

            let unread = sqlx::query_scalar::<_, i64>(
                r#"
                SELECT COUNT(*)
                FROM chat_messages
                WHERE sender_id = $1
                  AND receiver_id = $2
                  AND seen = false
                "#,
            )
            .bind(partner)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

            conversations.push((partner, last_message, unread));
        }

        // Most recent conversation first
        conversations.sort_by(|a, b| b.1.created_at.cmp(&a.1.created_at));

        Ok(conversations)
    }

    async fn mark_messages_seen(&self, sender_id: Uuid, receiver_id: Uuid) -> Result<u64, Error> {
        let result = sqlx::query(
            r#"
            UPDATE chat_messages
            SET seen = true
            WHERE sender_id = $1
              AND receiver_id = $2
              AND seen = false
            "#,
        )
        .bind(sender_id)
        .bind(receiver_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
