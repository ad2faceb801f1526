use axum::{Router, extract::DefaultBodyLimit, middleware};
use tower_http::{limit::RequestBodyLimitLayer, services::ServeDir};

use crate::{
    api,
    common::{AppState, admin_gate, metrics},
};

/// The whole site: JSON API, admin pages and the static public directory.
///
/// The admin gate wraps everything, including the static fallback, so files
/// below `<public>/admin` are never served without a session.
pub fn router(state: AppState, body_limit: usize) -> Router {
    let public = ServeDir::new(&state.paths.public_dir);

    Router::new()
        .merge(api::gallery_routes())
        .merge(api::hero_routes())
        .merge(api::news_routes())
        .merge(api::admin_routes())
        .fallback_service(public)
        .route_layer(middleware::from_fn(metrics::track_http))
        .layer(middleware::from_fn_with_state(state.clone(), admin_gate))
        .with_state(state)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
}
