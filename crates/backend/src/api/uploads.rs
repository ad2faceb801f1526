use axum::{body::Bytes, extract::Multipart};
use mime::Mime;

use crate::{
    common::{ApiError, ApiResult},
    gallery::{PreparedImage, UploadPolicy, prepare_image},
};

/// Multipart field names accepted as image uploads.
const FILE_FIELDS: &[&str] = &["image", "file"];

/// Collect the bytes of every image part. Other parts and empty file inputs are skipped.
pub async fn read_image_parts(multipart: &mut Multipart) -> ApiResult<Vec<Bytes>> {
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::warn!("bad multipart: {e}");
        ApiError::BadRequest("malformed multipart body".into())
    })? {
        if !field.name().is_some_and(|n| FILE_FIELDS.contains(&n)) {
            continue;
        }

        if let Some(ct) = field.content_type() {
            let ct: Mime = ct
                .parse()
                .map_err(|_| ApiError::UnsupportedMediaType(format!("bad content type {ct}")))?;
            if ct.type_() != mime::IMAGE && ct != mime::APPLICATION_OCTET_STREAM {
                return Err(ApiError::UnsupportedMediaType(format!(
                    "expected an image, got {ct}"
                )));
            }
        }

        let data = field.bytes().await.map_err(|e| {
            tracing::warn!("multipart read error: {e}");
            ApiError::BadRequest("could not read uploaded file".into())
        })?;
        // browsers send an empty part for an untouched file input
        if !data.is_empty() {
            files.push(data);
        }
    }

    Ok(files)
}

/// Decode and (optionally) transcode every upload before anything is written.
pub async fn prepare_all(files: Vec<Bytes>, policy: UploadPolicy) -> ApiResult<Vec<PreparedImage>> {
    let prepared = tokio::task::spawn_blocking(move || {
        files
            .iter()
            .map(|data| prepare_image(data, policy))
            .collect::<Result<Vec<_>, _>>()
    })
    .await
    .map_err(anyhow::Error::from)?;

    prepared.map_err(|e| {
        tracing::warn!("rejected upload: {e}");
        ApiError::UnsupportedMediaType("file is not a supported image (jpeg, png, gif, webp)".into())
    })
}
