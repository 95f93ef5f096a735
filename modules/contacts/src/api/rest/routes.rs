use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{Extension, Router};
use tower_http::trace::TraceLayer;

use crate::api::rest::handlers::{self, UploadLimit};
use crate::domain::service::Service;
use crate::infra::files::UploadStore;

/// Build the contacts router.
///
/// The body limit sits above the validator's cap so an oversized upload is
/// answered by the 400 validation path, not the framework's 413.
pub fn router(service: Arc<Service>, uploads: Arc<UploadStore>, max_upload_kb: usize) -> Router {
    let limit = UploadLimit {
        max_kb: max_upload_kb,
    };
    let body_limit = max_upload_kb * 1024 + 64 * 1024;

    Router::new()
        .route("/upload", post(handlers::upload_contacts_file))
        .route(
            "/contacts",
            get(handlers::list_contacts).post(handlers::create_contact),
        )
        .route(
            "/contacts/{id}",
            get(handlers::get_contact)
                .put(handlers::update_contact)
                .delete(handlers::delete_contact),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(service))
        .layer(Extension(uploads))
        .layer(Extension(limit))
}
