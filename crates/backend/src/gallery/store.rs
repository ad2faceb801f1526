use std::{
    fs, io,
    path::{Component, Path, PathBuf},
};

use anyhow::Context;
use libs::gallery::{GalleryImage, has_image_extension};
use thiserror::Error;
use walkdir::WalkDir;

/// Where the site lives on disk.
#[derive(Debug, Clone)]
pub struct SitePaths {
    pub public_dir: PathBuf,
    pub gallery_dir: PathBuf,
    pub hero_dir: PathBuf,
}

impl SitePaths {
    pub fn new(public_dir: PathBuf) -> Self {
        let images = public_dir.join("images");
        Self {
            gallery_dir: images.join("gallery"),
            hero_dir: images.join("hero"),
            public_dir,
        }
    }
}

/// Scan the gallery directory, creating it if absent. Any error aborts the whole scan.
pub fn scan_gallery(dir: &Path) -> anyhow::Result<Vec<GalleryImage>> {
    if !dir.exists() {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        return Ok(Vec::new());
    }

    let mut images = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if !has_image_extension(name) {
            continue;
        }

        let (width, height) = image::image_dimensions(entry.path())
            .with_context(|| format!("probing {}", entry.path().display()))?;
        images.push(GalleryImage::from_file_name(name, width, height));
    }

    Ok(images)
}

/// Listing as served to clients: failures are logged and degrade to an empty gallery.
pub async fn list_gallery(dir: PathBuf) -> Vec<GalleryImage> {
    match tokio::task::spawn_blocking(move || scan_gallery(&dir)).await {
        Ok(Ok(images)) => images,
        Ok(Err(e)) => {
            tracing::warn!("gallery scan failed: {e:#}");
            Vec::new()
        }
        Err(e) => {
            tracing::warn!("gallery scan task failed: {e}");
            Vec::new()
        }
    }
}

/// Number of image files in the gallery, without probing them.
pub fn count_gallery_files(dir: &Path) -> usize {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.file_name().to_str().is_some_and(has_image_extension))
        .count()
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("invalid image source")]
    InvalidName,
    #[error("image not found")]
    NotFound,
    #[error(transparent)]
    Io(io::Error),
}

impl From<io::Error> for ResolveError {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::NotFound {
            ResolveError::NotFound
        } else {
            ResolveError::Io(e)
        }
    }
}

/// Map a public `src` (e.g. `/images/gallery/a.jpg`) onto a file inside `dir`.
///
/// Only the last path segment is used, it must be a plain image file name,
/// and the canonical result must sit directly inside the canonical gallery dir.
pub async fn resolve_gallery_file(dir: &Path, image_src: &str) -> Result<PathBuf, ResolveError> {
    let name = image_src.rsplit('/').next().unwrap_or_default();
    if !is_plain_image_name(name) {
        return Err(ResolveError::InvalidName);
    }

    let root = tokio::fs::canonicalize(dir).await?;
    let candidate = tokio::fs::canonicalize(root.join(name)).await?;

    // a symlink pointing out of the gallery resolves elsewhere
    if candidate.parent() != Some(root.as_path()) {
        return Err(ResolveError::InvalidName);
    }
    Ok(candidate)
}

fn is_plain_image_name(name: &str) -> bool {
    if name.is_empty()
        || name.starts_with('.')
        || name.contains("..")
        || name.contains(['\\', '\0', ':'])
    {
        return false;
    }

    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && has_image_extension(name)
}
