//! Database entities

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use sqlx::types::Json;
use uuid::Uuid;

#[derive(Debug, FromRow)]
pub struct Conversation {
    pub id: Uuid,
    pub user: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[repr(u8)]
pub enum MessageKind {
    User = 1,
    Assistant = 2,
}

#[derive(Debug, FromRow)]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub kind: MessageKind,
    pub created_at: DateTime<Utc>,
    pub text: String,
}

/// A catalog product. Read-only from the chatbot's perspective. The
/// supplier contact fields are denormalized onto the row by the search
/// queries (LEFT JOIN, so both are `None` for orphaned products).
#[derive(Debug, Clone, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub brand: String,
    pub price: f64,
    pub category: String,
    pub description: String,
    pub supplier_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub supplier_name: Option<String>,
    pub supplier_email: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct Supplier {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub categories: Json<Vec<String>>,
    pub created_at: DateTime<Utc>,
}
