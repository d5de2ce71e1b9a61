//! 追踪装饰器
//!
//! 纯观测：调用前记录 `ProcessingStarted`，调用后按结果记录
//! `Completed` / `CompletedWithError` / `Aborted`，返回值原样透传。
//! 应作为最外层，这样校验短路也会以 `CompletedWithError` 被观测到。
//!
//! 等待内层期间监听取消信号：即使内层处理器不理会取消，
//! 调用方也会立即得到 `AppError::Cancelled`，并记录 `Aborted`。
//!
use crate::{
    command::Command,
    command_handler::CommandHandler,
    error::{AppError, AppResult},
    outcome::Outcome,
    query::Query,
    query_handler::QueryHandler,
    tracking::{RequestKind, TrackingEvent, TrackingSink},
};
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub struct TrackingDecorator<H> {
    inner: H,
    sink: Option<Arc<dyn TrackingSink>>,
}

impl<H> TrackingDecorator<H> {
    pub fn new(inner: H, sink: Arc<dyn TrackingSink>) -> Self {
        Self {
            inner,
            sink: Some(sink),
        }
    }

    /// 不产生任何事件的透传包装
    pub fn disabled(inner: H) -> Self {
        Self { inner, sink: None }
    }

    /// 在取消信号与内层调用之间竞争，取消优先
    async fn track<T, F>(
        &self,
        kind: RequestKind,
        request: &'static str,
        cancellation: &CancellationToken,
        call: F,
    ) -> AppResult<Outcome<T>>
    where
        F: Future<Output = AppResult<Outcome<T>>>,
    {
        if let Some(sink) = &self.sink {
            sink.record(TrackingEvent::ProcessingStarted { kind, request });
        }

        let result = tokio::select! {
            biased;
            _ = cancellation.cancelled() => Err(AppError::Cancelled { request }),
            result = call => result,
        };

        let Some(sink) = &self.sink else {
            return result;
        };

        match &result {
            Ok(outcome) if outcome.is_success() => {
                sink.record(TrackingEvent::Completed { kind, request });
            }
            Ok(outcome) => {
                sink.record(TrackingEvent::CompletedWithError {
                    kind,
                    request,
                    message: outcome.message().to_string(),
                });
            }
            Err(err) => {
                sink.record(TrackingEvent::Aborted {
                    kind,
                    request,
                    error: err.to_string(),
                });
            }
        }

        result
    }
}

#[async_trait]
impl<C, H> CommandHandler<C> for TrackingDecorator<H>
where
    C: Command,
    H: CommandHandler<C>,
{
    async fn handle(
        &self,
        cmd: C,
        cancellation: &CancellationToken,
    ) -> AppResult<Outcome<C::Response>> {
        self.track(
            RequestKind::Command,
            C::NAME,
            cancellation,
            self.inner.handle(cmd, cancellation),
        )
        .await
    }
}

#[async_trait]
impl<Q, H> QueryHandler<Q> for TrackingDecorator<H>
where
    Q: Query,
    H: QueryHandler<Q>,
{
    async fn handle(
        &self,
        q: Q,
        cancellation: &CancellationToken,
    ) -> AppResult<Outcome<Q::Response>> {
        self.track(
            RequestKind::Query,
            Q::NAME,
            cancellation,
            self.inner.handle(q, cancellation),
        )
        .await
    }
}
