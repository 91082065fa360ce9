use axum::Router;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use dotenvy::dotenv;
use tower_http::cors::CorsLayer;
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::app::{
    banners_router, orders_router, products_router, restaurants_router, ApiDoc, AppState,
};
use crate::establish_connection;
use crate::geo::Geocoder;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("./migrations");

pub async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let mut conn = establish_connection();
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Failed to run migrations");

    let state = AppState {
        geocoder: Geocoder::from_env(),
    };

    let app = Router::new()
        .merge(banners_router())
        .merge(products_router())
        .merge(restaurants_router())
        .merge(orders_router())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(CorsLayer::permissive());

    let addr = std::env::var("HTTP_ADDR").unwrap_or_else(|_| "0.0.0.0:8100".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Foodcart service listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
