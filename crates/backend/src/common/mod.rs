mod auth;
mod error;
pub mod metrics;
mod result;
mod state;

pub use auth::{
    AdminSession, LOGIN_PATH, SESSION_COOKIE, admin_gate, expired_session_cookie, is_gated_path,
    lookup_session, session_cookie, verify_admin_password,
};
pub use error::ApiError;
pub use result::ApiResult;
pub use state::{AdminAuth, AppState};
