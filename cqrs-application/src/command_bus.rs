use crate::{command::Command, error::AppResult, outcome::Outcome};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// 命令总线（Command Bus）
///
/// - 负责根据命令的具体类型路由到对应的（已装饰的）处理器；
/// - 框架可提供不同实现（如进程内、消息队列等）；
/// - 该 trait 带有泛型方法，通常以具体实现类型注入使用。
#[async_trait]
pub trait CommandBus: Send + Sync {
    /// 分发命令到对应处理器
    ///
    /// - `cmd`：具体命令实例
    /// - `cancellation`：取消信号，贯穿整条装饰链
    async fn dispatch<C>(
        &self,
        cmd: C,
        cancellation: &CancellationToken,
    ) -> AppResult<Outcome<C::Response>>
    where
        C: Command;
}
