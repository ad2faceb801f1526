mod repository;
mod session;

pub use repository::Repository;
pub use session::Session;
