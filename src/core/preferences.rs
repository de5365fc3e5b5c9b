//! Per-user preference memory.
//!
//! Process-lifetime cache, never persisted. Harvested from successful
//! product searches and fed back into the summarizer prompt.

use crate::infrastructure::entities::Product;
use di::{inject, injectable};
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

const KEPT_QUERIES: usize = 5;
const KEPT_INTERESTS: usize = 5;

#[derive(Debug, Clone, Default)]
pub struct UserPreferences {
    pub preferred_brands: Vec<String>,
    pub preferred_categories: Vec<String>,
    pub last_queries: Vec<String>,
}

impl UserPreferences {
    /// Fold one successful product search into the profile. Queries are
    /// kept most recent first; brands and categories are first-seen-first
    /// and capped.
    pub fn record_product_search(&mut self, query: &str, results: &[Product]) {
        self.last_queries.insert(0, query.to_owned());
        self.last_queries.truncate(KEPT_QUERIES);

        for product in results {
            push_interest(&mut self.preferred_brands, &product.brand);
            push_interest(&mut self.preferred_categories, &product.category);
        }
    }

    /// A one-line framing hint for the summarizer, `None` for a user
    /// without history.
    pub fn interest_hint(&self) -> Option<String> {
        if self.preferred_brands.is_empty() && self.preferred_categories.is_empty() {
            return None;
        }

        let mut interests = self.preferred_brands.clone();
        interests.extend(self.preferred_categories.iter().cloned());
        Some(format!(
            "The user has previously shown interest in: {}.",
            interests.join(", ")
        ))
    }
}

fn push_interest(interests: &mut Vec<String>, value: &str) {
    if interests.iter().any(|known| known == value) {
        return;
    }
    if interests.len() < KEPT_INTERESTS {
        interests.push(value.to_owned());
    }
}

/// Process-wide map of user preference profiles.
pub struct PreferenceStore {
    preferences: Mutex<HashMap<Uuid, UserPreferences>>,
}

#[injectable]
impl PreferenceStore {
    #[inject]
    pub fn create() -> PreferenceStore {
        PreferenceStore {
            preferences: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, user_id: Uuid) -> UserPreferences {
        self.preferences
            .lock()
            .unwrap()
            .get(&user_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn put(&self, user_id: Uuid, preferences: UserPreferences) {
        self.preferences.lock().unwrap().insert(user_id, preferences);
    }
}
