//! DI "Interfaces"

use crate::infrastructure::entities;
use crate::infrastructure::entities::MessageKind;
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait ConversationService: Send + Sync {
    /// Lists all conversations for the given user.
    async fn list_conversations(&self, user_id: Uuid) -> Vec<entities::Conversation>;

    /// Creates a new conversation for the given user, seeded with an
    /// assistant greeting message.
    async fn create_conversation(&self, user_id: Uuid) -> Result<entities::Conversation, ()>;

    /// Whether the conversation exists and belongs to the given user.
    async fn conversation_exists(&self, user_id: Uuid, conversation_id: Uuid) -> bool;

    /// The visible transcript of a conversation: chronological ascending,
    /// capped at the 50 most recent messages. History older than the cap is
    /// unavailable.
    ///
    /// Returns `Err` if the transcript could not be loaded.
    async fn list_messages(
        &self,
        user_id: Uuid,
        conversation_id: Uuid,
    ) -> Result<Vec<entities::Message>, ()>;

    /// Appends a message to a conversation.
    ///
    /// The helper functions `create_X_message` should be used instead for
    /// clarity.
    async fn create_raw_message(
        &self,
        conversation_id: Uuid,
        kind: MessageKind,
        content: String,
    ) -> Result<entities::Message, ()>;

    /// Append a user message.
    async fn create_user_message(
        &self,
        conversation_id: Uuid,
        message: String,
    ) -> Result<entities::Message, ()> {
        self.create_raw_message(conversation_id, MessageKind::User, message)
            .await
    }

    /// Append an assistant message.
    async fn create_assistant_message(
        &self,
        conversation_id: Uuid,
        message: String,
    ) -> Result<entities::Message, ()> {
        self.create_raw_message(conversation_id, MessageKind::Assistant, message)
            .await
    }
}

/// Catalog lookups the chatbot depends on. The backing store owns ordering
/// and result capping.
#[async_trait]
pub trait CatalogService: Send + Sync {
    async fn search_products(&self, query: &str) -> Result<Vec<entities::Product>, ()>;

    async fn search_suppliers(&self, query: &str) -> Result<Vec<entities::Supplier>, ()>;

    /// Full records for the given ids. Order is unspecified beyond
    /// containing the requested ids.
    async fn fetch_products_by_ids(&self, ids: &[Uuid]) -> Result<Vec<entities::Product>, ()>;
}

/// External LLM used to round off catalog answers. Callers must degrade to
/// the plain formatted text when this fails.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, text: &str) -> Result<String, ()>;
}

/// One chatbot turn: user text in, assistant text out. Never fails; every
/// failure path is folded into a user-facing reply string.
#[async_trait]
pub trait ChatbotService: Send + Sync {
    async fn handle_user_message(
        &self,
        user_id: Uuid,
        conversation_id: Uuid,
        text: &str,
    ) -> String;
}
