//! 装饰链组装
//!
//! 固定顺序（由内到外）：具体处理器 → 校验装饰器 → 追踪装饰器。
//! 命令与查询共用同一组装函数，总线在注册时为每个请求类型调用一次。
//!
use crate::{
    tracking::TrackingSink, tracking_decorator::TrackingDecorator,
    validation::Validators, validation_decorator::ValidationDecorator,
};
use bon::Builder;
use std::sync::Arc;

/// 装饰链配置
///
/// 关闭某一层后该层退化为透传，链的类型保持不变。
#[derive(Clone, Debug, Builder)]
pub struct PipelineConfig {
    /// 是否启用校验层
    #[builder(default = true)]
    pub validation: bool,
    /// 是否启用追踪层
    #[builder(default = true)]
    pub tracking: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// 完整装饰链的类型
pub type Pipeline<R, H> = TrackingDecorator<ValidationDecorator<R, H>>;

/// 为处理器套上校验与追踪装饰器
pub fn decorate<R, H>(
    handler: H,
    validators: Validators<R>,
    sink: Arc<dyn TrackingSink>,
    config: &PipelineConfig,
) -> Pipeline<R, H> {
    let validators = if config.validation {
        validators
    } else {
        Vec::new()
    };
    let validated = ValidationDecorator::new(handler, validators);

    if config.tracking {
        TrackingDecorator::new(validated, sink)
    } else {
        TrackingDecorator::disabled(validated)
    }
}
