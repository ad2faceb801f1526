use std::{sync::Arc, time::Duration};

use libs::site_settings::SharedSettings;

use crate::{
    db::Repository,
    gallery::{SitePaths, UploadPolicy},
    news::NewsBoard,
};

/// Credentials and session lifetime for the admin panel.
#[derive(Debug, Clone)]
pub struct AdminAuth {
    pub password_hash: String,
    pub session_ttl: Duration,
}

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub settings: SharedSettings,
    pub news: Arc<NewsBoard>,
    pub paths: Arc<SitePaths>,
    pub upload: UploadPolicy,
    pub auth: Arc<AdminAuth>,
}
