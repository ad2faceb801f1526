use anyhow::Context;
use axum::{
    Json, Router,
    extract::{Multipart, State},
    routing,
};
use libs::gallery::{HERO_URL_PREFIX, HeroImage, HeroUploadResponse};

use super::uploads::{prepare_all, read_image_parts};
use crate::{
    common::{AdminSession, ApiError, ApiResult, AppState},
    gallery,
};

pub fn hero_routes() -> Router<AppState> {
    Router::new()
        .route("/api/hero", routing::get(current_hero))
        .route("/api/hero/upload", routing::post(upload_hero))
}

async fn current_hero(State(state): State<AppState>) -> Json<HeroImage> {
    Json(HeroImage {
        image_url: state.settings.get().await.hero_image,
    })
}

/// Store a new hero image and make it the current one. Earlier hero files stay on disk.
async fn upload_hero(
    _session: AdminSession,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<HeroUploadResponse>> {
    let mut files = read_image_parts(&mut multipart).await?;
    if files.len() > 1 {
        return Err(ApiError::BadRequest("upload exactly one hero image".into()));
    }
    let Some(file) = files.pop() else {
        return Err(ApiError::BadRequest("no file uploaded".into()));
    };

    let mut prepared = prepare_all(vec![file], state.upload).await?;
    let img = prepared
        .pop()
        .context("image preparation returned nothing")?;

    let dir = &state.paths.hero_dir;
    let name = gallery::write_unique(dir, "hero", img.extension, &img.bytes)
        .await
        .with_context(|| format!("saving hero image into {}", dir.display()))?;
    let url = format!("{HERO_URL_PREFIX}/{name}");

    state
        .settings
        .update(|s| s.hero_image = Some(url.clone()))
        .await
        .context("persisting hero image setting")?;

    metrics::counter!("hero_uploads_total").increment(1);
    tracing::info!("hero image is now {url}");

    Ok(Json(HeroUploadResponse { success: true, url }))
}
