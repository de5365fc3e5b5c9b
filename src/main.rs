//! Catalog chatbot web server
//!
//! (c) Softlandia 2025

use tokio_catalog_chat_api::api;
use tokio_catalog_chat_api::core::preferences::PreferenceStore;
use tokio_catalog_chat_api::core::services::{
    MyCatalogService, MyChatbotService, MyConversationService,
};
use tokio_catalog_chat_api::core::session::SessionStore;
use tokio_catalog_chat_api::core::summarizer::LlmSummarizer;
use tokio_catalog_chat_api::infrastructure::database::DatabaseConnection;
use tokio_catalog_chat_api::infrastructure::repositories::{
    DbCatalogRepository, DbConversationRepository,
};

use axum::Router;
use axum::http::{HeaderValue, Method};
use axum::response::Html;
use axum::routing::get;
use di::{Injectable, ServiceCollection};
use di_axum::RouterServiceProviderExtensions;
use log::info;
use tokio::runtime::{Builder, Runtime};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

fn main() -> anyhow::Result<()> {
    // initialize tracing
    tracing_subscriber::fmt::init();

    let runtime: Runtime = Builder::new_multi_thread().enable_all().build()?;
    runtime.block_on(web_server_task());

    Ok(())
}

async fn web_server_task() {
    let provider = ServiceCollection::new()
        .add(DatabaseConnection::singleton())
        .add(SessionStore::singleton())
        .add(PreferenceStore::singleton())
        .add(LlmSummarizer::singleton())
        .add(DbConversationRepository::scoped())
        .add(DbCatalogRepository::scoped())
        .add(MyConversationService::scoped())
        .add(MyCatalogService::scoped())
        .add(MyChatbotService::scoped())
        .build_provider()
        .unwrap();

    // build our application with a route
    let app = Router::new()
        .route("/", get(index))
        .nest_service(
            "/static",
            ServiceBuilder::new().service(ServeDir::new("static")),
        )
        .nest("/conversations", api::conversations::router())
        .nest("/api", api::compare::router())
        .layer(
            CorsLayer::new()
                .allow_headers(Any)
                .allow_methods([Method::GET, Method::POST])
                .allow_origin([
                    "http://localhost:3000".parse::<HeaderValue>().unwrap(),
                    "http://localhost:5173".parse::<HeaderValue>().unwrap(),
                ]),
        )
        .with_provider(provider);

    // run our app with hyper, listening globally on port 3000
    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
    info!("listening on {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.unwrap();
    info!("Shutting down...");
}

async fn index() -> Html<&'static str> {
    Html(include_str!("../static/index.html"))
}
