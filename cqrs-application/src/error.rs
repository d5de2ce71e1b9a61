//! 应用层错误
//!
//! 只承载“非预期”路径：取消、校验器/处理器缺陷、注册冲突等。
//! 可预期的业务失败（含校验失败）一律以 [`Outcome`](crate::outcome::Outcome) 的失败值返回，
//! 不会出现在这里。
//!

#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("cancelled: request={request}")]
    Cancelled { request: &'static str },

    #[error("validator failed: request={request}, reason={reason}")]
    Validator {
        request: &'static str,
        reason: String,
    },

    #[error("handler not found: {0}")]
    HandlerNotFound(&'static str),

    #[error("handler already registered: command={command}")]
    AlreadyRegisteredCommand { command: &'static str },

    #[error("handler already registered: query={query}")]
    AlreadyRegisteredQuery { query: &'static str },

    #[error("type mismatch: expected={expected}, found={found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
}

/// 统一 Result 类型别名
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// 是否由取消信号引起
    pub fn is_cancelled(&self) -> bool {
        matches!(self, AppError::Cancelled { .. })
    }
}
