use serde::{Deserialize, Serialize};

/// 处理结果（Outcome）
///
/// 所有处理器与装饰器统一返回的成功/失败值，可选携带响应载荷。
/// - 成功：`message` 为空，带载荷的变体 `response` 为 `Some`；
/// - 失败：`message` 为诊断文本，`response` 为调用方显式给出的回退值（通常为 `None`）。
///
/// 只能通过工厂函数构造，构造后不可变。`message` 非空当且仅当失败，
/// 这是约定而非结构约束：`failure("")` 同样被接受。
///
/// 无载荷命令使用 `Outcome<()>`（默认类型参数）。
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome<T = ()> {
    is_success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    response: Option<T>,
}

impl Outcome<()> {
    /// 无载荷的成功结果
    pub fn success() -> Self {
        Self {
            is_success: true,
            message: String::new(),
            response: None,
        }
    }
}

impl<T> Outcome<T> {
    /// 失败结果，不携带载荷
    pub fn failure(message: impl Into<String>) -> Self {
        Self::failure_with_response(None, message)
    }

    /// 携带载荷的成功结果
    pub fn success_with_response(response: T) -> Self {
        Self {
            is_success: true,
            message: String::new(),
            response: Some(response),
        }
    }

    /// 失败结果，`fallback` 为显式给出的回退载荷
    pub fn failure_with_response(fallback: Option<T>, message: impl Into<String>) -> Self {
        Self {
            is_success: false,
            message: message.into(),
            response: fallback,
        }
    }

    pub fn is_success(&self) -> bool {
        self.is_success
    }

    pub fn is_failure(&self) -> bool {
        !self.is_success
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn response(&self) -> Option<&T> {
        self.response.as_ref()
    }

    pub fn into_response(self) -> Option<T> {
        self.response
    }

    /// 拆解为 `(is_success, message, response)`
    pub fn into_parts(self) -> (bool, String, Option<T>) {
        (self.is_success, self.message, self.response)
    }

    /// 转换为标准 `Result`，便于调用方使用 `?`
    ///
    /// 失败时丢弃回退载荷，仅保留诊断文本。
    pub fn into_result(self) -> Result<Option<T>, String> {
        if self.is_success {
            Ok(self.response)
        } else {
            Err(self.message)
        }
    }

    /// 对载荷做映射，成功/失败与消息保持不变
    pub fn map<U, F>(self, f: F) -> Outcome<U>
    where
        F: FnOnce(T) -> U,
    {
        Outcome {
            is_success: self.is_success,
            message: self.message,
            response: self.response.map(f),
        }
    }
}
