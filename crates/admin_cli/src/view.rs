use libs::gallery::GalleryImage;

/// Result of one delete request, keyed by the `src` it targeted.
#[derive(Debug)]
pub struct DeleteOutcome {
    pub src: String,
    pub result: Result<(), String>,
}

/// Local copy of the gallery listing. Uploads are reconciled by replacing the
/// whole list with a fresh fetch, deletes by dropping the confirmed entries.
#[derive(Debug, Default)]
pub struct GalleryView {
    images: Vec<GalleryImage>,
}

impl GalleryView {
    pub fn new(images: Vec<GalleryImage>) -> Self {
        Self { images }
    }

    pub fn images(&self) -> &[GalleryImage] {
        &self.images
    }

    pub fn replace(&mut self, images: Vec<GalleryImage>) {
        self.images = images;
    }

    /// Drops every entry whose delete succeeded and returns the failures.
    /// Entries whose delete failed stay in the view.
    pub fn apply_deletes<'a>(&mut self, outcomes: &'a [DeleteOutcome]) -> Vec<&'a DeleteOutcome> {
        let (done, failed): (Vec<_>, Vec<_>) = outcomes.iter().partition(|o| o.result.is_ok());
        self.images
            .retain(|img| !done.iter().any(|o| o.src == img.src));
        failed
    }
}
