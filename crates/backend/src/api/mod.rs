mod admin_routes;
mod gallery_routes;
mod hero_routes;
mod news_routes;
mod uploads;

pub use admin_routes::admin_routes;
pub use gallery_routes::gallery_routes;
pub use hero_routes::hero_routes;
pub use news_routes::news_routes;
