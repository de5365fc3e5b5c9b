//! Infrastructure traits, used for DI on higher levels

use crate::infrastructure::entities;
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait ConversationRepository: Send + Sync {
    async fn list_conversations(&self, user_id: Uuid) -> Result<Vec<entities::Conversation>, ()>;

    async fn create_conversation(
        &self,
        conversation: entities::Conversation,
    ) -> Result<entities::Conversation, ()>;

    /// Looks up a conversation, scoped to its owner.
    async fn find_conversation(
        &self,
        user_id: Uuid,
        conversation_id: Uuid,
    ) -> Result<Option<entities::Conversation>, ()>;

    /// The most recent `limit` messages of a conversation, newest first.
    async fn list_recent_messages(
        &self,
        user_id: Uuid,
        conversation_id: Uuid,
        limit: i64,
    ) -> Result<Vec<entities::Message>, ()>;

    async fn create_message_in_conversation(
        &self,
        conversation_id: Uuid,
        message: entities::Message,
    ) -> Result<entities::Message, ()>;
}

/// Read-only access to the product/supplier catalog.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn search_products(&self, query: &str) -> Result<Vec<entities::Product>, ()>;

    async fn search_suppliers(&self, query: &str) -> Result<Vec<entities::Supplier>, ()>;

    async fn products_by_ids(&self, ids: &[Uuid]) -> Result<Vec<entities::Product>, ()>;
}
