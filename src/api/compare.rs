//! Product comparison endpoint.
//!
//! Direct comparison over explicit product ids, for callers that already
//! know what to compare; the chat interface collects ids turn by turn
//! instead and goes through the same analysis helpers.

use crate::api::ExtractUser;
use crate::api::compare::schemas::{CompareRequest, ComparisonAnalysis, PriceComparison};
use crate::core::chatbot;
use crate::core::traits::CatalogService;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use di_axum::Inject;

pub fn router() -> Router {
    Router::new().route("/compare", post(compare_products))
}

async fn compare_products(
    Inject(catalog): Inject<dyn CatalogService>,
    ExtractUser(_current_user): ExtractUser,
    Json(request): Json<CompareRequest>,
) -> Result<Json<ComparisonAnalysis>, StatusCode> {
    if request.product_ids.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let products = catalog
        .fetch_products_by_ids(&request.product_ids)
        .await
        .map_err(|()| StatusCode::INTERNAL_SERVER_ERROR)?;

    let Some(stats) = chatbot::price_stats(&products) else {
        // None of the requested ids exist.
        return Err(StatusCode::NOT_FOUND);
    };

    let mut differences = serde_json::Map::new();
    let mut similarities = serde_json::Map::new();
    for field in chatbot::comparison_analysis(&products) {
        match field.shared {
            Some(value) => {
                similarities.insert(field.field.to_owned(), value.into());
            }
            None => {
                let per_product: serde_json::Map<String, serde_json::Value> = field
                    .values
                    .into_iter()
                    .map(|(id, value)| (id.to_string(), value.into()))
                    .collect();
                differences.insert(field.field.to_owned(), per_product.into());
            }
        }
    }

    Ok(Json(ComparisonAnalysis {
        products: products.into_iter().map(schemas::Product::from).collect(),
        differences: differences.into(),
        similarities: similarities.into(),
        price_comparison: PriceComparison {
            lowest: stats.lowest,
            highest: stats.highest,
            average: stats.average,
        },
    }))
}

pub mod schemas {
    use crate::infrastructure::entities;
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    #[derive(Deserialize, Debug)]
    pub struct CompareRequest {
        pub product_ids: Vec<Uuid>,
    }

    #[derive(Serialize, Debug)]
    pub struct SupplierSummary {
        pub name: String,
        pub email: String,
    }

    #[derive(Serialize, Debug)]
    pub struct Product {
        pub id: Uuid,
        pub name: String,
        pub brand: String,
        pub price: f64,
        pub category: String,
        pub description: String,
        pub supplier: Option<SupplierSummary>,
        pub created_at: DateTime<Utc>,
    }

    impl From<entities::Product> for Product {
        fn from(product: entities::Product) -> Self {
            let supplier = match (product.supplier_name, product.supplier_email) {
                (Some(name), Some(email)) => Some(SupplierSummary { name, email }),
                _ => None,
            };

            Product {
                id: product.id,
                name: product.name,
                brand: product.brand,
                price: product.price,
                category: product.category,
                description: product.description,
                supplier,
                created_at: product.created_at,
            }
        }
    }

    #[derive(Serialize, Debug)]
    pub struct PriceComparison {
        pub lowest: f64,
        pub highest: f64,
        pub average: f64,
    }

    #[derive(Serialize, Debug)]
    pub struct ComparisonAnalysis {
        pub products: Vec<Product>,
        pub differences: serde_json::Value,
        pub similarities: serde_json::Value,
        pub price_comparison: PriceComparison,
    }
}
