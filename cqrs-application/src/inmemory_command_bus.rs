use crate::{
    command::Command,
    command_bus::CommandBus,
    command_handler::CommandHandler,
    error::{AppError, AppResult},
    outcome::Outcome,
    pipeline::{PipelineConfig, decorate},
    tracking::{TracingSink, TrackingSink},
    validation::Validators,
};
use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::any::{Any, TypeId, type_name, type_name_of_val};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

type BoxAnySend = Box<dyn Any + Send>;

type CmdHandlerFuture = Pin<Box<dyn Future<Output = AppResult<BoxAnySend>> + Send>>;

type CmdHandlerFn = Arc<dyn Fn(BoxAnySend, CancellationToken) -> CmdHandlerFuture + Send + Sync>;

/// 基于内存的 CommandBus 实现
/// - 通过 TypeId 注册不同 Command 对应的 Handler
/// - 注册时即套好“校验 → 追踪”装饰链，运行时以类型擦除（Any）方式进行调度
/// - 同一命令类型只允许注册一次
pub struct InMemoryCommandBus {
    handlers: DashMap<TypeId, (&'static str, CmdHandlerFn)>,
    sink: Arc<dyn TrackingSink>,
    config: PipelineConfig,
}

impl Default for InMemoryCommandBus {
    fn default() -> Self {
        Self {
            handlers: DashMap::new(),
            sink: Arc::new(TracingSink),
            config: PipelineConfig::default(),
        }
    }
}

impl InMemoryCommandBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// 替换追踪事件输出端（仅影响之后注册的处理器）
    pub fn with_sink(mut self, sink: Arc<dyn TrackingSink>) -> Self {
        self.sink = sink;
        self
    }

    /// 替换装饰链配置（仅影响之后注册的处理器）
    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// 注册命令处理器（无校验器）
    pub fn register<C, H>(&self, handler: H) -> AppResult<()>
    where
        C: Command,
        H: CommandHandler<C> + 'static,
    {
        self.register_with_validators::<C, H>(handler, Vec::new())
    }

    /// 注册命令处理器及其校验器
    pub fn register_with_validators<C, H>(
        &self,
        handler: H,
        validators: Validators<C>,
    ) -> AppResult<()>
    where
        C: Command,
        H: CommandHandler<C> + 'static,
    {
        let slot = match self.handlers.entry(TypeId::of::<C>()) {
            Entry::Occupied(_) => {
                return Err(AppError::AlreadyRegisteredCommand { command: C::NAME });
            }
            Entry::Vacant(slot) => slot,
        };

        let pipeline = Arc::new(decorate(handler, validators, self.sink.clone(), &self.config));

        let f: CmdHandlerFn = Arc::new(
            move |boxed_cmd: BoxAnySend, cancellation: CancellationToken| -> CmdHandlerFuture {
                let pipeline = pipeline.clone();

                Box::pin(async move {
                    // 正常情况下这里的 downcast 永远不会失败（键与闭包同一泛型 C）
                    match boxed_cmd.downcast::<C>() {
                        Ok(cmd) => {
                            let outcome =
                                CommandHandler::<C>::handle(&*pipeline, *cmd, &cancellation)
                                    .await?;
                            Ok(Box::new(outcome) as BoxAnySend)
                        }
                        Err(e) => Err(AppError::TypeMismatch {
                            expected: C::NAME,
                            found: type_name_of_val(&e),
                        }),
                    }
                })
            },
        );

        slot.insert((C::NAME, f));

        Ok(())
    }

    /// 是否已注册该命令类型
    pub fn is_registered<C: Command>(&self) -> bool {
        self.handlers.contains_key(&TypeId::of::<C>())
    }

    /// 获取已注册的命令名列表（只读视图）
    pub fn registered_commands(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|e| e.value().0).collect()
    }
}

#[async_trait]
impl CommandBus for InMemoryCommandBus {
    async fn dispatch<C>(
        &self,
        cmd: C,
        cancellation: &CancellationToken,
    ) -> AppResult<Outcome<C::Response>>
    where
        C: Command,
    {
        let Some(f) = self
            .handlers
            .get(&TypeId::of::<C>())
            .map(|h| h.value().1.clone())
        else {
            return Err(AppError::HandlerNotFound(C::NAME));
        };

        let out = (f)(Box::new(cmd), cancellation.clone()).await?;

        match out.downcast::<Outcome<C::Response>>() {
            Ok(outcome) => Ok(*outcome),
            Err(e) => Err(AppError::TypeMismatch {
                expected: type_name::<Outcome<C::Response>>(),
                found: type_name_of_val(&e),
            }),
        }
    }
}
