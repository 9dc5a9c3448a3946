//! Tertulia HTTP server.
//!
//! Axum REST API over the book-club graph: generic CRUD per label, typed
//! relationship creation, fixed analytics reports and CSV bulk upload.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::state::AppState;

/// Index document served at `/` when a static directory is configured.
pub const INDEX_DOCUMENT: &str = "interfaz.html";

/// Create the application router.
pub fn create_router(state: AppState, config: &ServerConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router = Router::new()
        // Relationships
        .route("/relaciones/{tipo}", post(routes::relations::create_relations))
        // Analytics
        .route("/consultas/libros-leidos", get(routes::consultas::books_read))
        .route("/consultas/personas-club", get(routes::consultas::club_members))
        .route(
            "/consultas/personas-mas-libros",
            get(routes::consultas::recommended_readers),
        )
        .route(
            "/consultas/personas-mas-clubes",
            get(routes::consultas::multi_club_members),
        )
        .route("/consultas/libros-populares", get(routes::consultas::popular_books))
        // Bulk upload
        .route("/admin/subir-csv", post(routes::admin::upload_csv))
        // Entities
        .route(
            "/{plural}",
            get(routes::entities::list_entities).post(routes::entities::create_entity),
        )
        .route("/{plural}/{identifier}", put(routes::entities::update_entity));

    if let Some(dir) = &config.static_dir {
        router = router
            .route_service("/", ServeFile::new(dir.join(INDEX_DOCUMENT)))
            .nest_service("/static", ServeDir::new(dir));
    }

    router
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn run_server(state: AppState, config: &ServerConfig) -> anyhow::Result<()> {
    let app = create_router(state, config);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Tertulia API listening");

    axum::serve(listener, app).await?;
    Ok(())
}
