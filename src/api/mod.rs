/// API routes and handlers
pub mod books;
pub mod media;
pub mod profile;

use crate::context::AppContext;
use axum::Router;

/// Build API routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .merge(books::routes())
        .merge(profile::routes())
        .merge(media::routes())
}
