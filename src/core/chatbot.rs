//! Chatbot core.
//!
//! Routes one user utterance to a reply: keyword classification for idle
//! conversations, the comparison-session handler while a comparison is
//! being collected, and the formatting of every catalog answer. Collaborator
//! failures never escape this module; they become [`APOLOGY`].

use crate::core::preferences::UserPreferences;
use crate::core::session::ComparisonSession;
use crate::core::traits::{CatalogService, Summarizer};
use crate::infrastructure::entities::{Product, Supplier};
use uuid::Uuid;

pub const COMPARISON_PROMPT: &str = "Comparison mode: enter product names one at a time, then type 'done' to see the comparison.";
pub const COMPARISON_TOO_FEW: &str = "I need at least two products to compare. Comparison cancelled.";
pub const COMPARISON_HEADER: &str = "Here is a side-by-side comparison:";
pub const PRODUCT_NOT_FOUND: &str = "I couldn't find a product with that name, try another name.";
pub const PRODUCTS_HEADER: &str = "Here are the products I found:";
pub const SUPPLIERS_HEADER: &str = "Here are the suppliers I found:";
pub const NO_PRODUCTS_FOUND: &str = "No matching products found.";
pub const NO_SUPPLIERS_FOUND: &str = "No matching suppliers found.";
pub const HELP_MESSAGE: &str = "I can look up products and suppliers for you. Ask about a product or brand, ask about a supplier or provider, or say 'compare' to compare products side by side.";
pub const APOLOGY: &str = "Sorry, I ran into a problem answering that. Please try again.";

/// What an idle-conversation message is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Enter comparison mode.
    Compare,
    /// Catalog lookup; both flags may be set, and both blocks are emitted.
    Catalog { products: bool, suppliers: bool },
    /// Nothing recognized.
    Help,
}

/// Case-insensitive keyword classification. "compare" wins over everything
/// else in the same message.
pub fn classify(text: &str) -> Intent {
    let text = text.to_lowercase();

    if text.contains("compare") {
        return Intent::Compare;
    }

    let products = text.contains("product") || text.contains("brand");
    let suppliers = text.contains("supplier") || text.contains("provider");

    if products || suppliers {
        Intent::Catalog {
            products,
            suppliers,
        }
    } else {
        Intent::Help
    }
}

/// One chatbot turn.
///
/// The compare keyword is checked before the collecting state, so "compare"
/// on an idle conversation always (re-)enters collection; while collecting
/// it is handed to the session handler like any other text.
pub async fn respond(
    session: &mut ComparisonSession,
    prefs: &mut UserPreferences,
    text: &str,
    catalog: &dyn CatalogService,
    summarizer: &dyn Summarizer,
) -> String {
    match classify(text) {
        Intent::Compare if !session.is_collecting() => {
            session.begin();
            COMPARISON_PROMPT.to_owned()
        }
        _ if session.is_collecting() => collecting_turn(session, text, catalog).await,
        Intent::Catalog {
            products,
            suppliers,
        } => catalog_turn(prefs, text, products, suppliers, catalog, summarizer).await,
        Intent::Compare | Intent::Help => HELP_MESSAGE.to_owned(),
    }
}

/// Session handler: while collecting, every message is either the "done"
/// sentinel or a product lookup.
async fn collecting_turn(
    session: &mut ComparisonSession,
    text: &str,
    catalog: &dyn CatalogService,
) -> String {
    if text.trim().eq_ignore_ascii_case("done") {
        let selected = session.finish();
        if selected.len() < 2 {
            return COMPARISON_TOO_FEW.to_owned();
        }
        return match catalog.fetch_products_by_ids(&selected).await {
            Ok(products) => format_comparison(&products),
            Err(()) => APOLOGY.to_owned(),
        };
    }

    match catalog.search_products(text).await {
        Ok(matches) => match matches.first() {
            Some(product) => {
                // Only the top hit counts; ties are the collaborator's call.
                session.add(product.id);
                format!(
                    "Added {} to the comparison. Enter another product name, or type 'done' to compare.",
                    product.name
                )
            }
            None => PRODUCT_NOT_FOUND.to_owned(),
        },
        Err(()) => APOLOGY.to_owned(),
    }
}

/// Idle catalog lookup: a block (or no-results line) per matched keyword
/// set, optionally rounded off by the summarizer.
async fn catalog_turn(
    prefs: &mut UserPreferences,
    text: &str,
    products_wanted: bool,
    suppliers_wanted: bool,
    catalog: &dyn CatalogService,
    summarizer: &dyn Summarizer,
) -> String {
    let mut sections = Vec::new();
    let mut found_any = false;

    if products_wanted {
        match catalog.search_products(text).await {
            Ok(products) if products.is_empty() => sections.push(NO_PRODUCTS_FOUND.to_owned()),
            Ok(products) => {
                prefs.record_product_search(text, &products);
                found_any = true;
                sections.push(format!("{PRODUCTS_HEADER}\n{}", format_product_lines(&products)));
            }
            Err(()) => return APOLOGY.to_owned(),
        }
    }

    if suppliers_wanted {
        match catalog.search_suppliers(text).await {
            Ok(suppliers) if suppliers.is_empty() => sections.push(NO_SUPPLIERS_FOUND.to_owned()),
            Ok(suppliers) => {
                found_any = true;
                sections.push(format!(
                    "{SUPPLIERS_HEADER}\n{}",
                    format_supplier_lines(&suppliers)
                ));
            }
            Err(()) => return APOLOGY.to_owned(),
        }
    }

    let mut reply = sections.join("\n\n");

    // Best effort only: a summarizer failure leaves the formatted text as is.
    if found_any {
        let prompt = match prefs.interest_hint() {
            Some(hint) => format!("{hint}\n\n{reply}"),
            None => reply.clone(),
        };
        if let Ok(summary) = summarizer.summarize(&prompt).await {
            let summary = summary.trim();
            if !summary.is_empty() {
                reply.push_str("\n\n");
                reply.push_str(summary);
            }
        }
    }

    reply
}

pub fn format_product_lines(products: &[Product]) -> String {
    products
        .iter()
        .map(|p| format!("- {} ({}): ${} - {}", p.name, p.brand, p.price, p.description))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_supplier_lines(suppliers: &[Supplier]) -> String {
    suppliers
        .iter()
        .map(|s| {
            format!(
                "- {} ({})\n  Contact: {}",
                s.name,
                s.categories.join(", "),
                s.email
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

type FieldValue = fn(&Product) -> String;

/// The compared fields, in presentation order.
pub const COMPARISON_FIELDS: [(&str, FieldValue); 5] = [
    ("Name", |p| p.name.clone()),
    ("Brand", |p| p.brand.clone()),
    ("Price", |p| p.price.to_string()),
    ("Category", |p| p.category.clone()),
    ("Description", |p| p.description.clone()),
];

/// Side-by-side text block: per field a capitalized header and one line per
/// product, field groups separated by blank lines.
pub fn format_comparison(products: &[Product]) -> String {
    let mut out = String::from(COMPARISON_HEADER);
    out.push('\n');

    for (field, value_of) in COMPARISON_FIELDS {
        out.push('\n');
        out.push_str(field);
        out.push_str(":\n");
        for product in products {
            out.push_str(&format!("- {}: {}\n", product.name, value_of(product)));
        }
    }

    out
}

/// Derived price statistics over a non-empty product set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceStats {
    pub lowest: f64,
    pub highest: f64,
    pub average: f64,
}

pub fn price_stats(products: &[Product]) -> Option<PriceStats> {
    let first = products.first()?;

    let mut lowest = first.price;
    let mut highest = first.price;
    let mut sum = 0.0;
    for product in products {
        lowest = lowest.min(product.price);
        highest = highest.max(product.price);
        sum += product.price;
    }

    Some(PriceStats {
        lowest,
        highest,
        average: sum / products.len() as f64,
    })
}

/// Per-field verdict of the comparison analysis: either every product shares
/// one value, or the per-product values differ.
#[derive(Debug, Clone)]
pub struct FieldComparison {
    pub field: &'static str,
    pub values: Vec<(Uuid, String)>,
    pub shared: Option<String>,
}

/// Classifies each compared field as a similarity or a difference, going by
/// the fields' string forms.
pub fn comparison_analysis(products: &[Product]) -> Vec<FieldComparison> {
    COMPARISON_FIELDS
        .iter()
        .map(|&(field, value_of)| {
            let values: Vec<(Uuid, String)> =
                products.iter().map(|p| (p.id, value_of(p))).collect();
            let shared = match values.first() {
                Some((_, first)) if values.iter().all(|(_, v)| v == first) => Some(first.clone()),
                _ => None,
            };
            FieldComparison {
                field,
                values,
                shared,
            }
        })
        .collect()
}
