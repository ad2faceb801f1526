use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "site_admin", about = "Manage the gallery, hero image and news of the site")]
pub struct Cli {
    /// Base URL of the running backend.
    #[arg(long, env = "SITE_URL", default_value = "http://127.0.0.1:8080")]
    pub url: String,
    #[arg(long, env = "SITE_ADMIN_PASSWORD", hide_env_values = true)]
    pub password: String,
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check that the password is accepted.
    Login,
    /// Print the gallery as the public site sees it.
    List,
    /// Upload one or more images to the gallery.
    Upload {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Delete gallery images by their `src`.
    Delete {
        #[arg(required = true)]
        srcs: Vec<String>,
    },
    /// Replace the hero image.
    Hero { file: PathBuf },
    #[command(subcommand)]
    News(NewsCommand),
}

#[derive(Subcommand, Debug)]
pub enum NewsCommand {
    /// List every article, drafts included.
    List,
    Add {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        content: String,
        /// YYYY-MM-DD, defaults to today on the server.
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        image: Option<String>,
        #[arg(long)]
        publish: bool,
    },
    Publish { id: u64 },
    Unpublish { id: u64 },
    Remove { id: u64 },
}
