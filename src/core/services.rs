//! Implementations for the services the app needs.
//!

use crate::core::chatbot;
use crate::core::preferences::PreferenceStore;
use crate::core::session::SessionStore;
use crate::core::traits::{CatalogService, ChatbotService, ConversationService, Summarizer};
use crate::infrastructure::entities::{Conversation, Message, MessageKind, Product, Supplier};
use crate::infrastructure::traits::{CatalogRepository, ConversationRepository};
use async_trait::async_trait;
use chrono::Utc;
use di::{Ref, injectable};
use uuid::Uuid;

/// Greeting stored as the first message of every new conversation.
const WELCOME_MESSAGE: &str = "Hi! Ask me about products, brands, or suppliers, \
or say 'compare' to compare products side by side.";

/// Transcript cap; history older than this is unavailable.
const HISTORY_LIMIT: i64 = 50;

#[injectable(ConversationService)]
pub struct MyConversationService {
    repo: Ref<dyn ConversationRepository>,
}

#[async_trait]
impl ConversationService for MyConversationService {
    async fn list_conversations(&self, user_id: Uuid) -> Vec<Conversation> {
        self.repo
            .list_conversations(user_id)
            .await
            .unwrap_or_default()
    }

    async fn create_conversation(&self, user_id: Uuid) -> Result<Conversation, ()> {
        let conversation = self
            .repo
            .create_conversation(Conversation {
                id: Uuid::new_v4(),
                user: user_id,
                created_at: Utc::now(),
            })
            .await?;

        self.create_assistant_message(conversation.id, WELCOME_MESSAGE.to_owned())
            .await?;

        Ok(conversation)
    }

    async fn conversation_exists(&self, user_id: Uuid, conversation_id: Uuid) -> bool {
        matches!(
            self.repo.find_conversation(user_id, conversation_id).await,
            Ok(Some(_))
        )
    }

    async fn list_messages(
        &self,
        user_id: Uuid,
        conversation_id: Uuid,
    ) -> Result<Vec<Message>, ()> {
        // Fetched newest-first so the cap drops the oldest rows, then
        // reversed into display order.
        let mut messages = self
            .repo
            .list_recent_messages(user_id, conversation_id, HISTORY_LIMIT)
            .await?;
        messages.reverse();
        Ok(messages)
    }

    async fn create_raw_message(
        &self,
        conversation_id: Uuid,
        kind: MessageKind,
        content: String,
    ) -> Result<Message, ()> {
        self.repo
            .create_message_in_conversation(
                conversation_id,
                Message {
                    id: Uuid::new_v4(),
                    conversation_id,
                    kind,
                    created_at: Utc::now(),
                    text: content,
                },
            )
            .await
    }
}

#[injectable(CatalogService)]
pub struct MyCatalogService {
    repo: Ref<dyn CatalogRepository>,
}

#[async_trait]
impl CatalogService for MyCatalogService {
    async fn search_products(&self, query: &str) -> Result<Vec<Product>, ()> {
        self.repo.search_products(query).await
    }

    async fn search_suppliers(&self, query: &str) -> Result<Vec<Supplier>, ()> {
        self.repo.search_suppliers(query).await
    }

    async fn fetch_products_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>, ()> {
        self.repo.products_by_ids(ids).await
    }
}

#[injectable(ChatbotService)]
pub struct MyChatbotService {
    catalog: Ref<dyn CatalogService>,
    summarizer: Ref<dyn Summarizer>,
    sessions: Ref<SessionStore>,
    preferences: Ref<PreferenceStore>,
}

#[async_trait]
impl ChatbotService for MyChatbotService {
    async fn handle_user_message(
        &self,
        user_id: Uuid,
        conversation_id: Uuid,
        text: &str,
    ) -> String {
        // The per-conversation lock is held for the whole turn: a second
        // message for the same conversation waits until this one finished.
        let session = self.sessions.session_for(conversation_id);
        let mut session = session.lock().await;

        let mut prefs = self.preferences.get(user_id);
        let reply = chatbot::respond(
            &mut session,
            &mut prefs,
            text,
            &*self.catalog,
            &*self.summarizer,
        )
        .await;
        self.preferences.put(user_id, prefs);

        reply
    }
}
