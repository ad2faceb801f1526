use super::ApiError;

pub type ApiResult<T> = Result<T, ApiError>;
