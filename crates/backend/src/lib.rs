pub mod api;
pub mod app;
pub mod common;
mod config;
pub mod db;
pub mod gallery;
pub mod news;

pub use config::{CONFIG, Config};
