use crate::{
    error::{AppError, AppResult},
    outcome::Outcome,
    pipeline::{PipelineConfig, decorate},
    query::Query,
    query_bus::QueryBus,
    query_handler::QueryHandler,
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

type QueryHandlerFuture = Pin<Box<dyn Future<Output = AppResult<BoxAnySend>> + Send>>;

type QueryHandlerFn =
    Arc<dyn Fn(BoxAnySend, CancellationToken) -> QueryHandlerFuture + Send + Sync>;

/// 基于内存的 QueryBus 实现
/// - 通过 TypeId 注册不同 Query 对应的 Handler
/// - 注册时套好装饰链，以类型擦除方式调度，并在调用端进行结果还原
pub struct InMemoryQueryBus {
    handlers: DashMap<TypeId, (&'static str, QueryHandlerFn)>,
    sink: Arc<dyn TrackingSink>,
    config: PipelineConfig,
}

impl Default for InMemoryQueryBus {
    fn default() -> Self {
        Self {
            handlers: DashMap::new(),
            sink: Arc::new(TracingSink),
            config: PipelineConfig::default(),
        }
    }
}

impl InMemoryQueryBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sink(mut self, sink: Arc<dyn TrackingSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// 注册查询处理器（无校验器）
    pub fn register<Q, H>(&self, handler: H) -> AppResult<()>
    where
        Q: Query,
        H: QueryHandler<Q> + 'static,
    {
        self.register_with_validators::<Q, H>(handler, Vec::new())
    }

    /// 注册查询处理器及其校验器
    pub fn register_with_validators<Q, H>(
        &self,
        handler: H,
        validators: Validators<Q>,
    ) -> AppResult<()>
    where
        Q: Query,
        H: QueryHandler<Q> + 'static,
    {
        let slot = match self.handlers.entry(TypeId::of::<Q>()) {
            Entry::Occupied(_) => {
                return Err(AppError::AlreadyRegisteredQuery { query: Q::NAME });
            }
            Entry::Vacant(slot) => slot,
        };

        let pipeline = Arc::new(decorate(handler, validators, self.sink.clone(), &self.config));

        let f: QueryHandlerFn = Arc::new(
            move |boxed_q: BoxAnySend, cancellation: CancellationToken| -> QueryHandlerFuture {
                let pipeline = pipeline.clone();

                Box::pin(async move {
                    match boxed_q.downcast::<Q>() {
                        Ok(q) => {
                            let outcome =
                                QueryHandler::<Q>::handle(&*pipeline, *q, &cancellation).await?;
                            Ok(Box::new(outcome) as BoxAnySend)
                        }
                        Err(e) => Err(AppError::TypeMismatch {
                            expected: type_name::<Q>(),
                            found: type_name_of_val(&e),
                        }),
                    }
                })
            },
        );

        slot.insert((Q::NAME, f));

        Ok(())
    }

    /// 获取已注册的查询类型名列表（只读视图）
    pub fn registered_queries(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|e| e.value().0).collect()
    }
}

#[async_trait]
impl QueryBus for InMemoryQueryBus {
    async fn dispatch<Q>(
        &self,
        q: Q,
        cancellation: &CancellationToken,
    ) -> AppResult<Outcome<Q::Response>>
    where
        Q: Query,
    {
        let Some(f) = self
            .handlers
            .get(&TypeId::of::<Q>())
            .map(|h| h.value().1.clone())
        else {
            return Err(AppError::HandlerNotFound(Q::NAME));
        };

        let out = (f)(Box::new(q), cancellation.clone()).await?;

        match out.downcast::<Outcome<Q::Response>>() {
            Ok(outcome) => Ok(*outcome),
            Err(e) => Err(AppError::TypeMismatch {
                expected: type_name::<Outcome<Q::Response>>(),
                found: type_name_of_val(&e),
            }),
        }
    }
}
