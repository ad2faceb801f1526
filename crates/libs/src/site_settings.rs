use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::sync::RwLock;

/// Site-wide settings the admin panel can change at runtime.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SiteSettings {
    /// Public URL of the current hero image, e.g. `/images/hero/hero-1718000000000-1a2b3c4d.jpg`.
    pub hero_image: Option<String>,
}

#[derive(Clone)]
pub struct SharedSettings {
    pub settings_store: Arc<RwLock<SiteSettings>>,
    pub file_path: PathBuf,
}

impl SharedSettings {
    /// Load from disk, writing the defaults if the file does not exist yet.
    pub fn load(file_path: impl AsRef<Path>) -> io::Result<Self> {
        let settings_path = file_path.as_ref().to_path_buf();

        let initial: SiteSettings = if settings_path.exists() {
            let toml = fs::read_to_string(&settings_path)?;
            toml::from_str(&toml).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?
        } else {
            if let Some(parent) = settings_path.parent() {
                fs::create_dir_all(parent)?;
            }
            let default = SiteSettings::default();
            let toml_str = toml::to_string_pretty(&default).map_err(io::Error::other)?;
            fs::write(&settings_path, toml_str)?;
            default
        };

        Ok(SharedSettings {
            settings_store: Arc::new(RwLock::new(initial)),
            file_path: settings_path,
        })
    }

    /// Get a snapshot of the current settings.
    pub async fn get(&self) -> SiteSettings {
        self.settings_store.read().await.clone()
    }

    /// Mutate in memory and write back to disk atomically.
    pub async fn update<F>(&self, mutator: F) -> io::Result<SiteSettings>
    where
        F: FnOnce(&mut SiteSettings),
    {
        let mut guard = self.settings_store.write().await;
        let mut next = guard.clone();
        mutator(&mut next);

        let tmp = self.file_path.with_extension("toml.tmp");
        let s = toml::to_string_pretty(&next).map_err(io::Error::other)?;
        fs::write(&tmp, s)?;
        fs::rename(&tmp, &self.file_path)?;

        // only publish once the file is on disk
        *guard = next.clone();
        Ok(next)
    }
}
