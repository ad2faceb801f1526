//! The gallery and hero directories are the only record of uploaded images:
//! listing reads them back, uploads and deletes change them directly.

mod store;
mod upload;

pub use store::{
    ResolveError, SitePaths, count_gallery_files, list_gallery, resolve_gallery_file, scan_gallery,
};
pub use upload::{PreparedImage, UploadPolicy, discard, prepare_image, write_batch, write_unique};
