use std::{io, path::Path};

use image::{DynamicImage, ImageError, ImageFormat, codecs::jpeg::JpegEncoder, imageops::FilterType};
use libs::gallery::IMAGE_EXTENSIONS;
use tokio::io::AsyncWriteExt;

/// How uploaded images are normalised before they hit the disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadPolicy {
    /// Re-encode as JPEG filling exactly `max_width` x `max_height` (centre crop).
    pub transcode: bool,
    pub max_width: u32,
    pub max_height: u32,
    pub jpeg_quality: u8,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            transcode: true,
            max_width: 1920,
            max_height: 1080,
            jpeg_quality: 80,
        }
    }
}

#[derive(Debug)]
pub struct PreparedImage {
    pub bytes: Vec<u8>,
    pub extension: &'static str,
    pub width: u32,
    pub height: u32,
}

/// Decode `data` and either transcode it or keep it as-is, depending on `policy`.
///
/// Fails for anything that is not a decodable jpeg/png/gif/webp.
pub fn prepare_image(data: &[u8], policy: UploadPolicy) -> Result<PreparedImage, ImageError> {
    let format = image::guess_format(data)?;
    let extension = format
        .extensions_str()
        .first()
        .copied()
        .filter(|ext| IMAGE_EXTENSIONS.contains(ext))
        .ok_or_else(|| unsupported(format))?;

    let decoded = image::load_from_memory_with_format(data, format)?;

    if !policy.transcode {
        return Ok(PreparedImage {
            bytes: data.to_vec(),
            extension,
            width: decoded.width(),
            height: decoded.height(),
        });
    }

    let filled = decoded.resize_to_fill(policy.max_width, policy.max_height, FilterType::Lanczos3);
    // jpeg has no alpha channel
    let rgb = DynamicImage::ImageRgb8(filled.to_rgb8());

    let mut bytes = Vec::new();
    rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut bytes, policy.jpeg_quality))?;

    Ok(PreparedImage {
        bytes,
        extension: "jpg",
        width: rgb.width(),
        height: rgb.height(),
    })
}

fn unsupported(format: ImageFormat) -> ImageError {
    ImageError::Unsupported(image::error::UnsupportedError::from_format_and_kind(
        format.into(),
        image::error::UnsupportedErrorKind::Format(format.into()),
    ))
}

/// Write `bytes` as `<prefix>-<unix millis>-<8 hex>.<ext>` inside `dir` and return the file name.
///
/// Nothing is left in `dir` when this fails.
pub async fn write_unique(dir: &Path, prefix: &str, ext: &str, bytes: &[u8]) -> io::Result<String> {
    tokio::fs::create_dir_all(dir).await?;

    let file_name = unique_file_name(prefix, ext);
    persist(dir, &file_name, bytes).await?;
    Ok(file_name)
}

/// Write every image of one request. If any write fails, the ones that made it
/// are removed again and the first error is returned.
pub async fn write_batch(
    dir: &Path,
    prefix: &str,
    images: &[PreparedImage],
) -> io::Result<Vec<String>> {
    let results = futures::future::join_all(
        images
            .iter()
            .map(|img| write_unique(dir, prefix, img.extension, &img.bytes)),
    )
    .await;

    let (written, failed): (Vec<_>, Vec<_>) = results.into_iter().partition(Result::is_ok);
    let written: Vec<String> = written.into_iter().flatten().collect();
    match failed.into_iter().find_map(Result::err) {
        None => Ok(written),
        Some(e) => {
            discard(dir, &written).await;
            Err(e)
        }
    }
}

/// Best-effort removal of files written earlier in a failed request.
pub async fn discard(dir: &Path, names: &[String]) {
    for name in names {
        let path = dir.join(name);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => tracing::debug!("discarded {}", path.display()),
            Err(e) => tracing::warn!("could not discard {}: {e}", path.display()),
        }
    }
}

/// Data goes to a hidden `.part` file first and is hard-linked under
/// `file_name` only after flush and fsync succeeded. Linking never replaces an
/// existing file. The `.part` file is removed in every case.
async fn persist(dir: &Path, file_name: &str, bytes: &[u8]) -> io::Result<()> {
    let partial = dir.join(format!(".{file_name}.part"));
    let dest = dir.join(file_name);
    tracing::debug!("saving {}", dest.display());

    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&partial)
        .await?;
    let written = async {
        file.write_all(bytes).await?;
        file.flush().await?;
        file.sync_all().await
    }
    .await;
    drop(file);

    let linked = match written {
        Ok(()) => tokio::fs::hard_link(&partial, &dest).await,
        Err(e) => Err(e),
    };
    if let Err(e) = tokio::fs::remove_file(&partial).await {
        tracing::warn!("could not remove {}: {e}", partial.display());
    }
    if let Err(e) = &linked {
        tracing::error!("write error on {}: {e}", dest.display());
    }
    linked
}

fn unique_file_name(prefix: &str, ext: &str) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!(
        "{prefix}-{}-{}.{ext}",
        chrono::Utc::now().timestamp_millis(),
        &suffix[..8]
    )
}
