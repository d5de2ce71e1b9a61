use crate::{command::Command, error::AppResult, outcome::Outcome};
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// 命令处理器
///
/// 每个实现只对应一种命令类型。业务上的失败以 `Ok(Outcome::failure(..))` 返回；
/// `Err` 只用于取消与缺陷。
#[async_trait]
pub trait CommandHandler<C>: Send + Sync
where
    C: Command,
{
    async fn handle(
        &self,
        cmd: C,
        cancellation: &CancellationToken,
    ) -> AppResult<Outcome<C::Response>>;
}

#[async_trait]
impl<C, H> CommandHandler<C> for Arc<H>
where
    C: Command,
    H: CommandHandler<C> + ?Sized,
{
    async fn handle(
        &self,
        cmd: C,
        cancellation: &CancellationToken,
    ) -> AppResult<Outcome<C::Response>> {
        (**self).handle(cmd, cancellation).await
    }
}
