//! 应用层边界（ddd-application）
//!
//! 领域错误在此汇聚为 `AppError`，并在系统边界渲染为只含消息与状态码的 `ErrorPayload`。
//!
pub mod error;
pub mod error_payload;

pub use error::{AppError, AppResult};
pub use error_payload::ErrorPayload;
