use std::path::Path;

use serde::{Deserialize, Serialize};

/// Extensions (lowercase, without the dot) the gallery recognises as images.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// URL prefix under which gallery files are served.
pub const GALLERY_URL_PREFIX: &str = "/images/gallery";
/// URL prefix under which hero files are served.
pub const HERO_URL_PREFIX: &str = "/images/hero";

/// One displayable gallery entry. Never stored; derived from the file on every listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GalleryImage {
    pub src: String,
    pub alt: String,
    pub width: u32,
    pub height: u32,
}

impl GalleryImage {
    pub fn from_file_name(file_name: &str, width: u32, height: u32) -> Self {
        Self {
            src: format!("{GALLERY_URL_PREFIX}/{file_name}"),
            alt: alt_from_file_name(file_name),
            width,
            height,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryListing {
    pub images: Vec<GalleryImage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryUploadResponse {
    pub success: bool,
    pub images: Vec<GalleryImage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteImageRequest {
    #[serde(default)]
    pub image_src: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeroUploadResponse {
    pub success: bool,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroImage {
    pub image_url: Option<String>,
}

/// True when `name` ends in one of [`IMAGE_EXTENSIONS`], ignoring case.
pub fn has_image_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let e = e.to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&e.as_str())
        })
        .unwrap_or(false)
}

/// `"spring-fair-2024.jpg"` -> `"spring fair 2024"`
pub fn alt_from_file_name(file_name: &str) -> String {
    let stem = match file_name.rfind('.') {
        Some(idx) if idx > 0 => &file_name[..idx],
        _ => file_name,
    };
    stem.replace('-', " ")
}
