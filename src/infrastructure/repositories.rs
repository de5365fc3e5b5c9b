//! DB Repository abstractions

use crate::infrastructure::database::DatabaseConnection;
use crate::infrastructure::entities::{Conversation, Message, Product, Supplier};
use crate::infrastructure::traits::{CatalogRepository, ConversationRepository};
use async_trait::async_trait;
use di::{Ref, injectable};
use log::error;
use uuid::Uuid;

/// Columns selected for product rows, with the supplier contact joined in.
const PRODUCT_COLUMNS: &str = "products.id, products.name, products.brand, products.price, \
     products.category, products.description, products.supplier_id, products.created_at, \
     suppliers.name AS supplier_name, suppliers.email AS supplier_email";

#[injectable(ConversationRepository)]
pub struct DbConversationRepository {
    connection: Ref<DatabaseConnection>,
}

#[async_trait]
impl ConversationRepository for DbConversationRepository {
    async fn list_conversations(&self, user_id: Uuid) -> Result<Vec<Conversation>, ()> {
        sqlx::query_as(
            "SELECT * FROM conversations WHERE user = ? ORDER BY datetime(created_at) ASC",
        )
        .bind(user_id)
        .fetch_all(&**self.connection)
        .await
        .map_err(|e| error!("{e}"))
    }

    async fn create_conversation(&self, conversation: Conversation) -> Result<Conversation, ()> {
        sqlx::query_as(
            "INSERT INTO conversations (id, user, created_at) VALUES (?, ?, ?) RETURNING *",
        )
        .bind(conversation.id)
        .bind(conversation.user)
        .bind(conversation.created_at)
        .fetch_one(&**self.connection)
        .await
        .map_err(|e| error!("{e}"))
    }

    async fn find_conversation(
        &self,
        user_id: Uuid,
        conversation_id: Uuid,
    ) -> Result<Option<Conversation>, ()> {
        sqlx::query_as("SELECT * FROM conversations WHERE id = ? AND user = ?")
            .bind(conversation_id)
            .bind(user_id)
            .fetch_optional(&**self.connection)
            .await
            .map_err(|e| error!("{e}"))
    }

    async fn list_recent_messages(
        &self,
        user_id: Uuid,
        conversation_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Message>, ()> {
        sqlx::query_as(
            "SELECT messages.id, messages.conversation_id, messages.kind, messages.created_at, messages.text \
             FROM messages INNER JOIN conversations ON conversations.id = messages.conversation_id \
             WHERE conversation_id = ? AND user = ? \
             ORDER BY datetime(messages.created_at) DESC LIMIT ?",
        )
        .bind(conversation_id)
        .bind(user_id)
        .bind(limit)
        .fetch_all(&**self.connection)
        .await
        .map_err(|e| error!("{e}"))
    }

    async fn create_message_in_conversation(
        &self,
        conversation_id: Uuid,
        message: Message,
    ) -> Result<Message, ()> {
        sqlx::query_as(
            "INSERT INTO messages (id, conversation_id, kind, created_at, text) VALUES (?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(message.id)
        .bind(conversation_id)
        .bind(message.kind)
        .bind(message.created_at)
        .bind(message.text)
        .fetch_one(&**self.connection)
        .await
        .map_err(|e| error!("{e}"))
    }
}

#[injectable(CatalogRepository)]
pub struct DbCatalogRepository {
    connection: Ref<DatabaseConnection>,
}

/// Search results are capped; the chat output is meant to stay scannable.
const SEARCH_LIMIT: i64 = 10;

#[async_trait]
impl CatalogRepository for DbCatalogRepository {
    async fn search_products(&self, query: &str) -> Result<Vec<Product>, ()> {
        let pattern = format!("%{}%", query.trim());
        sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             LEFT JOIN suppliers ON suppliers.id = products.supplier_id \
             WHERE products.name LIKE ? OR products.brand LIKE ? \
             ORDER BY datetime(products.created_at) DESC LIMIT ?",
        ))
        .bind(&pattern)
        .bind(&pattern)
        .bind(SEARCH_LIMIT)
        .fetch_all(&**self.connection)
        .await
        .map_err(|e| error!("{e}"))
    }

    async fn search_suppliers(&self, query: &str) -> Result<Vec<Supplier>, ()> {
        let pattern = format!("%{}%", query.trim());
        sqlx::query_as(
            "SELECT * FROM suppliers \
             WHERE name LIKE ? OR categories LIKE ? \
             ORDER BY datetime(created_at) DESC LIMIT ?",
        )
        .bind(&pattern)
        .bind(&pattern)
        .bind(SEARCH_LIMIT)
        .fetch_all(&**self.connection)
        .await
        .map_err(|e| error!("{e}"))
    }

    async fn products_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>, ()> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             LEFT JOIN suppliers ON suppliers.id = products.supplier_id \
             WHERE products.id IN ({placeholders})",
        );

        let mut query = sqlx::query_as(&sql);
        for id in ids {
            query = query.bind(id);
        }

        query
            .fetch_all(&**self.connection)
            .await
            .map_err(|e| error!("{e}"))
    }
}
