use ddd_domain::error::DomainError;

pub type AppResult<T> = Result<T, AppError>;

#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("validation: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),
}

impl AppError {
    /// 边界上使用的状态码；领域错误沿用其自身分类
    pub fn code(&self) -> u16 {
        match self {
            AppError::Domain(err) => err.code(),
            AppError::Validation(_) => 422,
            AppError::NotFound(_) => 404,
        }
    }

    /// 调用方是否可以重新加载后重试
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Domain(err) if err.is_retryable())
    }
}
