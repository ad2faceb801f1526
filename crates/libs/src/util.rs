use std::{io, path::PathBuf, sync::Arc};

use tokio::sync::Notify;

/// Directory name below the platform config dir.
const APP_DIR: &str = "site_backend";

/// Resolves once Ctrl-C (or SIGTERM on unix) arrives, then wakes every waiter.
pub async fn listen_for_shutdown(notify: Arc<Notify>) {
    wait_for_signal().await;
    tracing::info!("shutdown signal received, draining connections");
    notify.notify_waiters();
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {},
                _ = sigterm.recv() => {},
            }
        }
        Err(e) => {
            tracing::warn!("no SIGTERM handler ({e}), only Ctrl-C stops the server");
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

/// `SITE_CONFIG_DIR` if set, otherwise `<platform config dir>/site_backend`.
/// The directory is created if missing.
pub fn config_dir() -> io::Result<PathBuf> {
    let dir = match std::env::var_os("SITE_CONFIG_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => dirs::config_dir()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no config directory"))?
            .join(APP_DIR),
    };
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
