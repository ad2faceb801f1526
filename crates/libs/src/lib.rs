pub mod gallery;
pub mod news;
pub mod site_settings;
pub mod util;
