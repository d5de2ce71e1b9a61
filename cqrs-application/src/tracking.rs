//! 执行追踪事件与输出端
//!
//! [`TrackingDecorator`](crate::tracking_decorator::TrackingDecorator) 只负责产生事件，
//! 事件写到哪里（日志、链路追踪、测试收集器）由 [`TrackingSink`] 决定。
//!
use std::fmt;
use std::sync::{Mutex, PoisonError};

/// 请求类别
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Command,
    Query,
}

impl RequestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::Command => "command",
            RequestKind::Query => "query",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 追踪事件
///
/// 一次调用依次产生 `ProcessingStarted`，随后恰好一个
/// `Completed` / `CompletedWithError` / `Aborted`。
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrackingEvent {
    ProcessingStarted {
        kind: RequestKind,
        request: &'static str,
    },
    Completed {
        kind: RequestKind,
        request: &'static str,
    },
    /// 处理器返回了失败结果（含校验失败）
    CompletedWithError {
        kind: RequestKind,
        request: &'static str,
        message: String,
    },
    /// 调用链返回了 `Err`（取消或缺陷）
    Aborted {
        kind: RequestKind,
        request: &'static str,
        error: String,
    },
}

impl TrackingEvent {
    pub fn kind(&self) -> RequestKind {
        match self {
            TrackingEvent::ProcessingStarted { kind, .. }
            | TrackingEvent::Completed { kind, .. }
            | TrackingEvent::CompletedWithError { kind, .. }
            | TrackingEvent::Aborted { kind, .. } => *kind,
        }
    }

    pub fn request(&self) -> &'static str {
        match self {
            TrackingEvent::ProcessingStarted { request, .. }
            | TrackingEvent::Completed { request, .. }
            | TrackingEvent::CompletedWithError { request, .. }
            | TrackingEvent::Aborted { request, .. } => *request,
        }
    }
}

/// 追踪事件输出端
pub trait TrackingSink: Send + Sync {
    fn record(&self, event: TrackingEvent);
}

/// 默认输出端：以结构化字段写入 `tracing`
///
/// 错误消息作为 `error` 字段输出，不拼接进日志正文。
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl TrackingSink for TracingSink {
    fn record(&self, event: TrackingEvent) {
        match event {
            TrackingEvent::ProcessingStarted { kind, request } => {
                tracing::info!(kind = kind.as_str(), request = request, "processing request");
            }
            TrackingEvent::Completed { kind, request } => {
                tracing::info!(kind = kind.as_str(), request = request, "completed request");
            }
            TrackingEvent::CompletedWithError {
                kind,
                request,
                message,
            } => {
                tracing::error!(
                    kind = kind.as_str(),
                    request = request,
                    error = %message,
                    "completed request with error"
                );
            }
            TrackingEvent::Aborted {
                kind,
                request,
                error,
            } => {
                tracing::warn!(
                    kind = kind.as_str(),
                    request = request,
                    error = %error,
                    "request aborted"
                );
            }
        }
    }
}

/// 基于内存的输出端，按到达顺序保存事件（测试与诊断用）
#[derive(Debug, Default)]
pub struct InMemorySink {
    events: Mutex<Vec<TrackingEvent>>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前已记录事件的快照
    pub fn events(&self) -> Vec<TrackingEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// 取出并清空已记录事件
    pub fn take(&self) -> Vec<TrackingEvent> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl TrackingSink for InMemorySink {
    fn record(&self, event: TrackingEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}
