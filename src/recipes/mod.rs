use axum::{
    routing::{get, patch},
    Router,
};

use crate::db::AppState;

mod dto;
mod handlers;
pub mod repo;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/recipes",
            get(handlers::list).post(handlers::create),
        )
        .route("/recipes/search", get(handlers::search))
        .route(
            "/recipes/:id",
            get(handlers::get_by_id)
                .put(handlers::update)
                .delete(handlers::remove),
        )
        .route("/recipes/:id/toggle", patch(handlers::toggle_favorite))
        .route("/stats", get(handlers::stats))
}
