use std::sync::Arc;

use axum::{
    http::{header::CONTENT_TYPE, Method},
    routing::{get, post},
    Extension, Router,
};
use helpdesk::{HelpDesk, AI};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::server::routes::{
    categories_handler, health_handler, request_handler, root_handler, stats_handler,
};

/// Shared state for handlers.
pub struct AppState<A: AI> {
    pub desk: Arc<HelpDesk<A>>,
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl<A: AI> Clone for AppState<A> {
    fn clone(&self) -> Self {
        Self {
            desk: Arc::clone(&self.desk),
            started_at: self.started_at,
        }
    }
}

/// Build the Axum application router
pub fn build_app<A: AI + 'static>(desk: Arc<HelpDesk<A>>) -> Router {
    let state = AppState {
        desk,
        started_at: chrono::Utc::now(),
    };

    // CORS configuration - allow any origin
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler::<A>))
        .route("/categories", get(categories_handler::<A>))
        .route("/stats", get(stats_handler::<A>))
        .route("/request", post(request_handler::<A>))
        .layer(Extension(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
