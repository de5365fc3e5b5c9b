//! Chatbot core tests.
//!
//! Drives the classifier, the comparison session and the formatters through
//! fake collaborators, without a database or an LLM endpoint.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Json;
use tokio_catalog_chat_api::core::chatbot::{self, respond};
use tokio_catalog_chat_api::core::preferences::UserPreferences;
use tokio_catalog_chat_api::core::session::ComparisonSession;
use tokio_catalog_chat_api::core::traits::{CatalogService, Summarizer};
use tokio_catalog_chat_api::infrastructure::entities::{Product, Supplier};
use uuid::Uuid;

fn product(name: &str, brand: &str, price: f64, description: &str) -> Product {
    Product {
        id: Uuid::new_v4(),
        name: name.to_owned(),
        brand: brand.to_owned(),
        price,
        category: "electronics".to_owned(),
        description: description.to_owned(),
        supplier_id: None,
        created_at: Utc::now(),
        supplier_name: None,
        supplier_email: None,
    }
}

fn supplier(name: &str, email: &str, categories: &[&str]) -> Supplier {
    Supplier {
        id: Uuid::new_v4(),
        name: name.to_owned(),
        email: email.to_owned(),
        phone: None,
        categories: Json(categories.iter().map(|c| c.to_string()).collect()),
        created_at: Utc::now(),
    }
}

/// Catalog fake: a product matches when its name appears in the query (or
/// the other way around), mimicking the store's substring search.
struct FakeCatalog {
    products: Vec<Product>,
    suppliers: Vec<Supplier>,
}

impl FakeCatalog {
    fn with_products(products: Vec<Product>) -> Self {
        FakeCatalog {
            products,
            suppliers: Vec::new(),
        }
    }
}

#[async_trait]
impl CatalogService for FakeCatalog {
    async fn search_products(&self, query: &str) -> Result<Vec<Product>, ()> {
        let query = query.to_lowercase();
        Ok(self
            .products
            .iter()
            .filter(|p| {
                let name = p.name.to_lowercase();
                query.contains(&name) || name.contains(query.trim())
            })
            .cloned()
            .collect())
    }

    async fn search_suppliers(&self, query: &str) -> Result<Vec<Supplier>, ()> {
        let query = query.to_lowercase();
        Ok(self
            .suppliers
            .iter()
            .filter(|s| {
                let name = s.name.to_lowercase();
                query.contains(&name) || name.contains(query.trim())
            })
            .cloned()
            .collect())
    }

    async fn fetch_products_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>, ()> {
        Ok(ids
            .iter()
            .filter_map(|id| self.products.iter().find(|p| p.id == *id))
            .cloned()
            .collect())
    }
}

/// Every operation fails, as if the backing store were unreachable.
struct BrokenCatalog;

#[async_trait]
impl CatalogService for BrokenCatalog {
    async fn search_products(&self, _query: &str) -> Result<Vec<Product>, ()> {
        Err(())
    }

    async fn search_suppliers(&self, _query: &str) -> Result<Vec<Supplier>, ()> {
        Err(())
    }

    async fn fetch_products_by_ids(&self, _ids: &[Uuid]) -> Result<Vec<Product>, ()> {
        Err(())
    }
}

struct FakeSummarizer(Option<String>);

#[async_trait]
impl Summarizer for FakeSummarizer {
    async fn summarize(&self, _text: &str) -> Result<String, ()> {
        self.0.clone().ok_or(())
    }
}

fn unavailable_summarizer() -> FakeSummarizer {
    FakeSummarizer(None)
}

fn gaming_catalog() -> FakeCatalog {
    FakeCatalog::with_products(vec![
        product(
            "Gaming Laptop",
            "TechPro",
            1299.99,
            "High-performance gaming laptop",
        ),
        product("Office Mouse", "Clicker", 24.5, "Wired optical mouse"),
    ])
}

#[tokio::test]
async fn compare_keyword_enters_collection_mode() {
    let catalog = gaming_catalog();
    let summarizer = unavailable_summarizer();
    let mut session = ComparisonSession::default();
    let mut prefs = UserPreferences::default();

    // Other keywords in the same message must not matter.
    let reply = respond(
        &mut session,
        &mut prefs,
        "please COMPARE products from my suppliers",
        &catalog,
        &summarizer,
    )
    .await;

    assert_eq!(reply, chatbot::COMPARISON_PROMPT);
    assert!(session.is_collecting());
    assert!(session.selected().is_empty());
}

#[tokio::test]
async fn compare_while_idle_discards_a_stale_selection() {
    let catalog = gaming_catalog();
    let summarizer = unavailable_summarizer();
    let mut session = ComparisonSession::default();
    let mut prefs = UserPreferences::default();

    respond(&mut session, &mut prefs, "compare", &catalog, &summarizer).await;
    respond(
        &mut session,
        &mut prefs,
        "Gaming Laptop",
        &catalog,
        &summarizer,
    )
    .await;
    respond(&mut session, &mut prefs, "done", &catalog, &summarizer).await;

    // Back to idle with the partial selection gone; a fresh "compare"
    // starts empty.
    respond(&mut session, &mut prefs, "compare", &catalog, &summarizer).await;
    assert!(session.is_collecting());
    assert!(session.selected().is_empty());
}

#[tokio::test]
async fn collecting_appends_exactly_the_first_match() {
    let catalog = gaming_catalog();
    let summarizer = unavailable_summarizer();
    let mut session = ComparisonSession::default();
    let mut prefs = UserPreferences::default();

    respond(&mut session, &mut prefs, "compare", &catalog, &summarizer).await;
    let reply = respond(
        &mut session,
        &mut prefs,
        "Gaming Laptop",
        &catalog,
        &summarizer,
    )
    .await;

    assert_eq!(session.selected(), &[catalog.products[0].id]);
    assert!(reply.contains("Gaming Laptop"));
    assert!(reply.contains("done"));
}

#[tokio::test]
async fn collecting_unknown_name_leaves_selection_unchanged() {
    let catalog = gaming_catalog();
    let summarizer = unavailable_summarizer();
    let mut session = ComparisonSession::default();
    let mut prefs = UserPreferences::default();

    respond(&mut session, &mut prefs, "compare", &catalog, &summarizer).await;
    let reply = respond(
        &mut session,
        &mut prefs,
        "Quantum Toaster",
        &catalog,
        &summarizer,
    )
    .await;

    assert_eq!(reply, chatbot::PRODUCT_NOT_FOUND);
    assert!(session.is_collecting());
    assert!(session.selected().is_empty());
}

#[tokio::test]
async fn done_with_too_few_products_resets_the_session() {
    let catalog = gaming_catalog();
    let summarizer = unavailable_summarizer();
    let mut session = ComparisonSession::default();
    let mut prefs = UserPreferences::default();

    // Zero collected.
    respond(&mut session, &mut prefs, "compare", &catalog, &summarizer).await;
    let reply = respond(&mut session, &mut prefs, "done", &catalog, &summarizer).await;
    assert_eq!(reply, chatbot::COMPARISON_TOO_FEW);
    assert!(!session.is_collecting());
    assert!(session.selected().is_empty());

    // One collected; "DONE " must also be recognized.
    respond(&mut session, &mut prefs, "compare", &catalog, &summarizer).await;
    respond(
        &mut session,
        &mut prefs,
        "Gaming Laptop",
        &catalog,
        &summarizer,
    )
    .await;
    let reply = respond(&mut session, &mut prefs, " DONE ", &catalog, &summarizer).await;
    assert_eq!(reply, chatbot::COMPARISON_TOO_FEW);
    assert!(!session.is_collecting());
    assert!(session.selected().is_empty());
}

#[tokio::test]
async fn done_with_two_products_formats_all_five_fields() {
    let catalog = gaming_catalog();
    let summarizer = unavailable_summarizer();
    let mut session = ComparisonSession::default();
    let mut prefs = UserPreferences::default();

    respond(&mut session, &mut prefs, "compare", &catalog, &summarizer).await;
    respond(
        &mut session,
        &mut prefs,
        "Gaming Laptop",
        &catalog,
        &summarizer,
    )
    .await;
    respond(
        &mut session,
        &mut prefs,
        "Office Mouse",
        &catalog,
        &summarizer,
    )
    .await;
    let reply = respond(&mut session, &mut prefs, "done", &catalog, &summarizer).await;

    for field in ["Name:", "Brand:", "Price:", "Category:", "Description:"] {
        assert!(reply.contains(field), "missing field header {field}");
    }
    assert!(reply.contains("- Gaming Laptop: TechPro"));
    assert!(reply.contains("- Office Mouse: Clicker"));
    assert!(reply.contains("- Gaming Laptop: 1299.99"));
    assert!(reply.contains("- Office Mouse: 24.5"));
    assert!(!session.is_collecting());
}

#[tokio::test]
async fn compare_keyword_while_collecting_is_just_a_lookup() {
    let catalog = gaming_catalog();
    let summarizer = unavailable_summarizer();
    let mut session = ComparisonSession::default();
    let mut prefs = UserPreferences::default();

    respond(&mut session, &mut prefs, "compare", &catalog, &summarizer).await;
    respond(
        &mut session,
        &mut prefs,
        "Gaming Laptop",
        &catalog,
        &summarizer,
    )
    .await;

    // No product is named "compare", so this is a failed lookup, not a
    // session restart.
    let reply = respond(&mut session, &mut prefs, "compare", &catalog, &summarizer).await;
    assert_eq!(reply, chatbot::PRODUCT_NOT_FOUND);
    assert!(session.is_collecting());
    assert_eq!(session.selected().len(), 1);
}

#[tokio::test]
async fn idle_product_query_formats_the_fixed_line() {
    let catalog = gaming_catalog();
    let summarizer = unavailable_summarizer();
    let mut session = ComparisonSession::default();
    let mut prefs = UserPreferences::default();

    let reply = respond(
        &mut session,
        &mut prefs,
        "Show me Gaming Laptop products",
        &catalog,
        &summarizer,
    )
    .await;

    assert!(reply.contains(chatbot::PRODUCTS_HEADER));
    assert!(reply.contains("- Gaming Laptop (TechPro): $1299.99 - High-performance gaming laptop"));
    assert!(!session.is_collecting());
}

#[tokio::test]
async fn idle_query_can_match_both_keyword_sets() {
    let mut catalog = gaming_catalog();
    catalog.suppliers = vec![supplier(
        "TechPro Wholesale",
        "sales@techpro.example",
        &["electronics"],
    )];
    let summarizer = unavailable_summarizer();
    let mut session = ComparisonSession::default();
    let mut prefs = UserPreferences::default();

    let reply = respond(
        &mut session,
        &mut prefs,
        "TechPro Wholesale brand supplier",
        &catalog,
        &summarizer,
    )
    .await;

    // Supplier block present; the product side matched nothing so only its
    // no-results line shows up.
    assert!(reply.contains(chatbot::NO_PRODUCTS_FOUND));
    assert!(reply.contains(chatbot::SUPPLIERS_HEADER));
    assert!(reply.contains("- TechPro Wholesale (electronics)\n  Contact: sales@techpro.example"));
}

#[tokio::test]
async fn unrecognized_idle_text_gets_the_same_help_string_every_time() {
    let catalog = gaming_catalog();
    let summarizer = unavailable_summarizer();
    let mut session = ComparisonSession::default();
    let mut prefs = UserPreferences::default();

    let first = respond(&mut session, &mut prefs, "hello!", &catalog, &summarizer).await;
    let second = respond(&mut session, &mut prefs, "hello!", &catalog, &summarizer).await;

    assert_eq!(first, chatbot::HELP_MESSAGE);
    assert_eq!(second, chatbot::HELP_MESSAGE);
}

#[tokio::test]
async fn collaborator_failure_becomes_the_apology() {
    let summarizer = unavailable_summarizer();
    let mut session = ComparisonSession::default();
    let mut prefs = UserPreferences::default();

    // Idle search.
    let reply = respond(
        &mut session,
        &mut prefs,
        "any products?",
        &BrokenCatalog,
        &summarizer,
    )
    .await;
    assert_eq!(reply, chatbot::APOLOGY);

    // Lookup while collecting.
    respond(
        &mut session,
        &mut prefs,
        "compare",
        &BrokenCatalog,
        &summarizer,
    )
    .await;
    let reply = respond(
        &mut session,
        &mut prefs,
        "Gaming Laptop",
        &BrokenCatalog,
        &summarizer,
    )
    .await;
    assert_eq!(reply, chatbot::APOLOGY);
}

#[tokio::test]
async fn summarizer_output_is_appended_when_available() {
    let catalog = gaming_catalog();
    let summarizer = FakeSummarizer(Some("The laptop is the standout here.".to_owned()));
    let mut session = ComparisonSession::default();
    let mut prefs = UserPreferences::default();

    let reply = respond(
        &mut session,
        &mut prefs,
        "Show me Gaming Laptop products",
        &catalog,
        &summarizer,
    )
    .await;

    assert!(reply.contains("- Gaming Laptop (TechPro): $1299.99 - High-performance gaming laptop"));
    assert!(reply.ends_with("The laptop is the standout here."));
}

#[tokio::test]
async fn help_branch_never_calls_the_summarizer() {
    struct PanickySummarizer;

    #[async_trait]
    impl Summarizer for PanickySummarizer {
        async fn summarize(&self, _text: &str) -> Result<String, ()> {
            panic!("summarizer must not run for help replies");
        }
    }

    let catalog = gaming_catalog();
    let mut session = ComparisonSession::default();
    let mut prefs = UserPreferences::default();

    let reply = respond(
        &mut session,
        &mut prefs,
        "good morning",
        &catalog,
        &PanickySummarizer,
    )
    .await;
    assert_eq!(reply, chatbot::HELP_MESSAGE);
}

#[tokio::test]
async fn successful_product_search_updates_preferences() {
    let catalog = gaming_catalog();
    let summarizer = unavailable_summarizer();
    let mut session = ComparisonSession::default();
    let mut prefs = UserPreferences::default();

    respond(
        &mut session,
        &mut prefs,
        "Show me Gaming Laptop products",
        &catalog,
        &summarizer,
    )
    .await;

    assert_eq!(prefs.last_queries, vec!["Show me Gaming Laptop products"]);
    assert_eq!(prefs.preferred_brands, vec!["TechPro"]);
    assert_eq!(prefs.preferred_categories, vec!["electronics"]);
}
