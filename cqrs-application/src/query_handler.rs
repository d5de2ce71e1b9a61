use crate::{error::AppResult, outcome::Outcome, query::Query};
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[async_trait]
pub trait QueryHandler<Q>: Send + Sync
where
    Q: Query,
{
    async fn handle(
        &self,
        q: Q,
        cancellation: &CancellationToken,
    ) -> AppResult<Outcome<Q::Response>>;
}

#[async_trait]
impl<Q, H> QueryHandler<Q> for Arc<H>
where
    Q: Query,
    H: QueryHandler<Q> + ?Sized,
{
    async fn handle(
        &self,
        q: Q,
        cancellation: &CancellationToken,
    ) -> AppResult<Outcome<Q::Response>> {
        (**self).handle(q, cancellation).await
    }
}
