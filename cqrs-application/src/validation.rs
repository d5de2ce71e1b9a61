//! 请求校验
//!
//! - [`Validator`]：针对某一请求类型的校验器协作者，异步返回零到多个失败项；
//! - [`ValidationFailure`]：单个失败项（字段 + 消息）；
//! - [`format_failures`]：把失败项汇总为一条诊断文本。
//!
//! 规则如何编写由校验器实现自行决定，本模块只负责调度与汇总。
//!
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// 单个校验失败项
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFailure {
    /// 字段或上下文（例如 `name`、`items[0].qty`）
    pub field: String,
    /// 面向用户的错误消息
    pub message: String,
}

impl ValidationFailure {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// 校验器：检查一个请求实例，返回零到多个失败项
///
/// 返回 `Err` 表示校验器自身出错（缺陷），会原样向调用方传播，
/// 不会被转换为失败结果。
#[async_trait]
pub trait Validator<R>: Send + Sync {
    async fn validate(&self, request: &R) -> AppResult<Vec<ValidationFailure>>;
}

/// 某一请求类型的校验器集合（按注册顺序）
pub type Validators<R> = Vec<Arc<dyn Validator<R>>>;

/// 将同步闭包适配为 [`Validator`]
pub struct FnValidator<R, F> {
    f: F,
    _request: PhantomData<fn(&R)>,
}

impl<R, F> FnValidator<R, F>
where
    F: Fn(&R) -> Vec<ValidationFailure> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self {
            f,
            _request: PhantomData,
        }
    }
}

#[async_trait]
impl<R, F> Validator<R> for FnValidator<R, F>
where
    R: Sync,
    F: Fn(&R) -> Vec<ValidationFailure> + Send + Sync,
{
    async fn validate(&self, request: &R) -> AppResult<Vec<ValidationFailure>> {
        Ok((self.f)(request))
    }
}

/// 汇总失败消息：每条消息独占一行，且每行都以 `\n` 结尾
pub fn format_failures(failures: &[ValidationFailure]) -> String {
    failures.iter().fold(String::new(), |mut acc, f| {
        acc.push_str(&f.message);
        acc.push('\n');
        acc
    })
}

/// 并发运行全部校验器并按注册顺序汇总失败项
///
/// 等待期间监听取消信号；取消优先于校验结果。
/// 所有校验器完成后，若有校验器返回 `Err`，按注册顺序传播第一个错误。
pub(crate) async fn run_validators<R>(
    validators: &[Arc<dyn Validator<R>>],
    request: &R,
    cancellation: &CancellationToken,
    request_name: &'static str,
) -> AppResult<Vec<ValidationFailure>> {
    let checks = join_all(validators.iter().map(|v| v.validate(request)));

    let reports = tokio::select! {
        biased;
        _ = cancellation.cancelled() => {
            return Err(AppError::Cancelled { request: request_name });
        }
        reports = checks => reports,
    };

    let mut failures = Vec::new();
    for report in reports {
        failures.extend(report?);
    }
    Ok(failures)
}
