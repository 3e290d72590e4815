use anyhow::Result;
use axum::{
    routing::{get, post},
    Extension, Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};
use tracing::info;

use menu_api_server::config::Settings;
use menu_api_server::database::{DbPool, Repository};
use menu_api_server::handlers;
use menu_api_server::services::ExcelService;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,menu_api_server=debug".to_string()),
        )
        .with_target(true)
        .json()
        .init();

    info!("Starting menu API server...");

    // Load configuration
    let settings = Settings::load()?;
    info!("Configuration loaded");

    // Initialize database pool
    let db_pool = DbPool::new(&settings.database).await?;
    info!("Database connection established");

    // Apply migrations
    sqlx::migrate!("./migrations").run(db_pool.get_pool()).await?;
    info!("Migrations applied");

    // Initialize repository and services
    let repository = Arc::new(Repository::new(db_pool));
    let excel_service = Arc::new(ExcelService::new(repository.clone(), settings.export_dir()));
    let settings = Arc::new(settings);

    // Build router
    let app = build_router(repository, excel_service, settings.clone());

    // Server address
    let addr = SocketAddr::from((
        settings.server.host.parse::<std::net::IpAddr>()?,
        settings.server.port,
    ));

    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}

fn build_router(
    repository: Arc<Repository>,
    excel_service: Arc<ExcelService>,
    settings: Arc<Settings>,
) -> Router {
    let health_routes = Router::new().route("/health", get(handlers::health::health_check));

    // Auxiliary paths predate the resource routes and keep their double
    // `/menus/menus` prefix for client compatibility.
    let catalog_routes = Router::new()
        .route("/api/v1/menus/menus/fill", post(handlers::catalog::fill_catalog))
        .route("/api/v1/menus/menus/gen_excel", post(handlers::catalog::gen_excel))
        .route("/api/v1/menus/menus/get_excel", get(handlers::catalog::get_excel));

    let menu_routes = Router::new()
        .route(
            "/api/v1/menus",
            get(handlers::menus::list_menus).post(handlers::menus::create_menu),
        )
        .route(
            "/api/v1/menus/{menu_id}",
            get(handlers::menus::get_menu)
                .patch(handlers::menus::update_menu)
                .delete(handlers::menus::delete_menu),
        );

    let submenu_routes = Router::new()
        .route(
            "/api/v1/menus/{menu_id}/submenus",
            get(handlers::submenus::list_submenus).post(handlers::submenus::create_submenu),
        )
        .route(
            "/api/v1/menus/{menu_id}/submenus/{submenu_id}",
            get(handlers::submenus::get_submenu)
                .patch(handlers::submenus::update_submenu)
                .delete(handlers::submenus::delete_submenu),
        );

    let dish_routes = Router::new()
        .route(
            "/api/v1/menus/{menu_id}/submenus/{submenu_id}/dishes",
            get(handlers::dishes::list_dishes).post(handlers::dishes::create_dish),
        )
        .route(
            "/api/v1/menus/{menu_id}/submenus/{submenu_id}/dishes/{dish_id}",
            get(handlers::dishes::get_dish)
                .patch(handlers::dishes::update_dish)
                .delete(handlers::dishes::delete_dish),
        );

    Router::new()
        .merge(health_routes)
        .merge(catalog_routes)
        .merge(menu_routes)
        .merge(submenu_routes)
        .merge(dish_routes)
        // Shared state
        .layer(Extension(repository))
        .layer(Extension(excel_service))
        .layer(Extension(settings))
        // CORS
        .layer(CorsLayer::permissive())
        // Tracing
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(true)),
        )
}
