use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub created_at: i64,
    pub expires_at: i64,
}
