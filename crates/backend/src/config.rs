use std::{path::PathBuf, time::Duration};

use once_cell::sync::Lazy;
use serde::Deserialize;

use libs::util;

use crate::{
    common::AdminAuth,
    gallery::{SitePaths, UploadPolicy},
};

#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    pub backend_port: u16,
    pub backend_ipv4_address: String,
    /// Served as the site root; relative paths resolve against the working directory.
    pub backend_public_dir: String,
    pub backend_db_file: String,
    pub backend_settings_file: String,
    /// Argon2 PHC string, produced by `hash_once`.
    pub admin_password_hash: String,
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,
    #[serde(default = "default_true")]
    pub upload_transcode: bool,
    #[serde(default = "default_upload_max_width")]
    pub upload_max_width: u32,
    #[serde(default = "default_upload_max_height")]
    pub upload_max_height: u32,
    #[serde(default = "default_upload_jpeg_quality")]
    pub upload_jpeg_quality: u8,
    #[serde(default = "default_upload_max_bytes")]
    pub upload_max_bytes: usize,
    pub prometheus_port: u16,
    pub prometheus_ipv4_address: String,
    pub prometheus_refresh_interval: u64,
}

fn default_session_ttl_secs() -> u64 {
    60 * 60 * 24
}

fn default_true() -> bool {
    true
}

fn default_upload_max_width() -> u32 {
    1920
}

fn default_upload_max_height() -> u32 {
    1080
}

fn default_upload_jpeg_quality() -> u8 {
    80
}

fn default_upload_max_bytes() -> usize {
    25 * 1024 * 1024
}

impl Config {
    pub fn site_paths(&self) -> SitePaths {
        SitePaths::new(PathBuf::from(&self.backend_public_dir))
    }

    pub fn upload_policy(&self) -> UploadPolicy {
        UploadPolicy {
            transcode: self.upload_transcode,
            max_width: self.upload_max_width,
            max_height: self.upload_max_height,
            jpeg_quality: self.upload_jpeg_quality.clamp(1, 100),
        }
    }

    pub fn admin_auth(&self) -> AdminAuth {
        AdminAuth {
            password_hash: self.admin_password_hash.clone(),
            session_ttl: Duration::from_secs(self.session_ttl_secs),
        }
    }
}

pub static CONFIG: Lazy<Config> = Lazy::new(|| {
    let mut config = envy::from_env::<Config>()
        .unwrap_or_else(|err| panic!("Failed to load configuration from env: {:#?}", err));

    let config_dir = util::config_dir()
        .unwrap_or_else(|err| panic!("Failed to prepare config directory: {err}"));

    let backend_db_file = config_dir
        .join(&config.backend_db_file)
        .to_string_lossy()
        .into_owned();
    let backend_settings_file = config_dir
        .join(&config.backend_settings_file)
        .to_string_lossy()
        .into_owned();

    // update the config with the full paths
    config.backend_db_file = backend_db_file;
    config.backend_settings_file = backend_settings_file;

    config
});
