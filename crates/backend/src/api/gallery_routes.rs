use anyhow::Context;
use axum::{
    Json, Router,
    extract::{Multipart, State},
    routing,
};
use libs::gallery::{
    DeleteImageRequest, GalleryImage, GalleryListing, GalleryUploadResponse, SuccessResponse,
};

use super::uploads::{prepare_all, read_image_parts};
use crate::{
    common::{AdminSession, ApiError, ApiResult, AppState},
    gallery::{self, ResolveError},
};

pub fn gallery_routes() -> Router<AppState> {
    Router::new()
        .route("/api/gallery", routing::get(list_images))
        .route("/api/gallery/upload", routing::post(upload_images))
        .route("/api/gallery/delete", routing::post(delete_image))
}

async fn list_images(State(state): State<AppState>) -> Json<GalleryListing> {
    let images = gallery::list_gallery(state.paths.gallery_dir.clone()).await;
    Json(GalleryListing { images })
}

async fn upload_images(
    _session: AdminSession,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<GalleryUploadResponse>> {
    let files = read_image_parts(&mut multipart).await?;
    if files.is_empty() {
        return Err(ApiError::BadRequest("no file uploaded".into()));
    }

    let prepared = prepare_all(files, state.upload).await?;

    let dir = &state.paths.gallery_dir;
    let names = gallery::write_batch(dir, "gallery", &prepared)
        .await
        .with_context(|| format!("saving upload into {}", dir.display()))?;
    let images: Vec<_> = names
        .iter()
        .zip(&prepared)
        .map(|(name, img)| GalleryImage::from_file_name(name, img.width, img.height))
        .collect();

    metrics::counter!("gallery_uploads_total").increment(images.len() as u64);
    tracing::info!("stored {} gallery image(s)", images.len());

    Ok(Json(GalleryUploadResponse {
        success: true,
        images,
    }))
}

async fn delete_image(
    _session: AdminSession,
    State(state): State<AppState>,
    Json(req): Json<DeleteImageRequest>,
) -> ApiResult<Json<SuccessResponse>> {
    let image_src = req
        .image_src
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("no image source provided".into()))?;

    let path = gallery::resolve_gallery_file(&state.paths.gallery_dir, &image_src)
        .await
        .map_err(|e| match e {
            ResolveError::InvalidName => {
                tracing::warn!("refusing to delete {image_src:?}");
                ApiError::BadRequest("invalid image source".into())
            }
            ResolveError::NotFound => ApiError::NotFound("image not found".into()),
            ResolveError::Io(e) => {
                ApiError::Internal(anyhow::Error::new(e).context("resolving gallery file"))
            }
        })?;

    match tokio::fs::remove_file(&path).await {
        Ok(()) => tracing::info!("removed file {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ApiError::NotFound("image not found".into()));
        }
        Err(e) => {
            return Err(ApiError::Internal(
                anyhow::Error::new(e).context(format!("deleting {}", path.display())),
            ));
        }
    }

    metrics::counter!("gallery_deletes_total").increment(1);
    Ok(Json(SuccessResponse { success: true }))
}
