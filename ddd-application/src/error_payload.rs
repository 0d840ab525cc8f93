use crate::error::AppError;
use ddd_domain::error::DomainError;
use serde::{Deserialize, Serialize};

/// 系统边界上的错误表示：`{"error": "...", "code": 409}`
///
/// 只携带消息与状态码，不暴露内部错误种类。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub error: String,
    pub code: u16,
}

impl ErrorPayload {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
        }
    }
}

impl From<&AppError> for ErrorPayload {
    fn from(err: &AppError) -> Self {
        Self::new(err.to_string(), err.code())
    }
}

impl From<&DomainError> for ErrorPayload {
    fn from(err: &DomainError) -> Self {
        Self::new(err.to_string(), err.code())
    }
}

impl From<AppError> for ErrorPayload {
    fn from(err: AppError) -> Self {
        Self::from(&err)
    }
}
