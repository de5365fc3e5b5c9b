//! Conversations endpoints

use crate::api::ExtractUser;
use crate::api::conversations::schemas::{ChatTurn, ConversationList, CreateMessage};
use crate::core::traits::{ChatbotService, ConversationService};
use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use di_axum::Inject;
use uuid::Uuid;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_conversations).post(new_conversation))
        .route(
            "/:id/messages",
            get(conversation_messages).post(post_message),
        )
}

async fn list_conversations(
    Inject(conversation_service): Inject<dyn ConversationService>,
    ExtractUser(current_user): ExtractUser,
) -> (StatusCode, Json<ConversationList>) {
    let conversations = conversation_service.list_conversations(current_user).await;

    (
        StatusCode::OK,
        ConversationList {
            conversations: conversations
                .into_iter()
                .map(schemas::Conversation::from)
                .collect(),
        }
        .into(),
    )
}

async fn new_conversation(
    Inject(conversation_service): Inject<dyn ConversationService>,
    ExtractUser(current_user): ExtractUser,
) -> Result<(StatusCode, Json<schemas::Conversation>), StatusCode> {
    match conversation_service.create_conversation(current_user).await {
        Ok(conversation) => Ok((StatusCode::CREATED, Json(conversation.into()))),
        Err(()) => Err(StatusCode::INTERNAL_SERVER_ERROR),
    }
}

async fn conversation_messages(
    Inject(conversation_service): Inject<dyn ConversationService>,
    Path(conversation_id): Path<Uuid>,
    ExtractUser(current_user): ExtractUser,
) -> (StatusCode, Json<schemas::MessagesList>) {
    let messages = conversation_service
        .list_messages(current_user, conversation_id)
        .await;

    if let Ok(messages) = messages {
        (
            StatusCode::OK,
            Json(schemas::MessagesList {
                messages: messages.into_iter().map(schemas::Message::from).collect(),
            }),
        )
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(schemas::MessagesList::default()),
        )
    }
}

/// Stores the user message, runs one chatbot turn, stores and returns the
/// assistant reply. The chatbot itself never fails; the error branches here
/// are all about the transcript store.
async fn post_message(
    Inject(conversation_service): Inject<dyn ConversationService>,
    Inject(chatbot): Inject<dyn ChatbotService>,
    ExtractUser(current_user): ExtractUser,
    Path(conversation_id): Path<Uuid>,
    Json(message): Json<CreateMessage>,
) -> Result<Json<ChatTurn>, StatusCode> {
    if !conversation_service
        .conversation_exists(current_user, conversation_id)
        .await
    {
        return Err(StatusCode::NOT_FOUND);
    }

    let user_message = conversation_service
        .create_user_message(conversation_id, message.text.clone())
        .await
        .map_err(|()| StatusCode::INTERNAL_SERVER_ERROR)?;

    let reply = chatbot
        .handle_user_message(current_user, conversation_id, &message.text)
        .await;

    let assistant_message = conversation_service
        .create_assistant_message(conversation_id, reply)
        .await
        .map_err(|()| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(ChatTurn {
        user_message: user_message.into(),
        assistant_message: assistant_message.into(),
    }))
}

pub mod schemas {
    use crate::infrastructure::entities;
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    #[derive(Serialize, Debug)]
    pub struct Conversation {
        pub id: Uuid,
        pub created_at: DateTime<Utc>,
    }

    impl From<entities::Conversation> for Conversation {
        fn from(conversation: entities::Conversation) -> Self {
            Conversation {
                id: conversation.id,
                created_at: conversation.created_at,
            }
        }
    }

    #[derive(Serialize, Debug)]
    pub struct ConversationList {
        pub conversations: Vec<Conversation>,
    }

    #[derive(Serialize, Debug, Default)]
    pub struct MessagesList {
        pub messages: Vec<Message>,
    }

    #[derive(Serialize, Debug)]
    pub enum MessageKind {
        User,
        Assistant,
    }

    impl From<entities::MessageKind> for MessageKind {
        fn from(kind: entities::MessageKind) -> Self {
            match kind {
                entities::MessageKind::User => MessageKind::User,
                entities::MessageKind::Assistant => MessageKind::Assistant,
            }
        }
    }

    #[derive(Serialize, Debug)]
    pub struct Message {
        pub conversation_id: Uuid,
        pub id: Uuid,
        pub kind: MessageKind,
        pub text: String,
        pub created_at: DateTime<Utc>,
    }

    impl From<entities::Message> for Message {
        fn from(message: entities::Message) -> Self {
            Message {
                conversation_id: message.conversation_id,
                id: message.id,
                kind: message.kind.into(),
                text: message.text,
                created_at: message.created_at,
            }
        }
    }

    #[derive(Deserialize, Debug)]
    pub struct CreateMessage {
        pub text: String,
    }

    /// One request/reply pair as stored in the transcript.
    #[derive(Serialize, Debug)]
    pub struct ChatTurn {
        pub user_message: Message,
        pub assistant_message: Message,
    }
}
