//! Route table for the Villa API.

use axum::Router;
use axum::routing::get;

use super::handlers::{
    AppState, create_villa, delete_villa, get_villa, health_check, list_villas,
    update_partial_villa, update_villa,
};

/// Collection path; single villas live at `{VILLAS_PATH}/{id}`.
pub const VILLAS_PATH: &str = "/villas";

/// Builds the application router.
///
/// Middleware (tracing, CORS) is layered on by the binary so that tests can
/// drive the bare router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route(VILLAS_PATH, get(list_villas).post(create_villa))
        .route(
            "/villas/{id}",
            get(get_villa)
                .put(update_villa)
                .patch(update_partial_villa)
                .delete(delete_villa),
        )
        .with_state(state)
}
