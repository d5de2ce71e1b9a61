use crate::{error::AppResult, outcome::Outcome, query::Query};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// 查询总线（Query Bus）
///
/// - 负责根据查询的具体类型路由到对应的处理器；
/// - 对外返回与查询关联的载荷类型。
#[async_trait]
pub trait QueryBus: Send + Sync {
    /// 分发查询到对应处理器
    async fn dispatch<Q>(
        &self,
        q: Q,
        cancellation: &CancellationToken,
    ) -> AppResult<Outcome<Q::Response>>
    where
        Q: Query;
}
