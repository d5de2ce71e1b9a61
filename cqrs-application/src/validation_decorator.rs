//! 校验装饰器
//!
//! 在请求到达内层处理器之前运行该请求类型的全部校验器：
//! - 无校验器：直接调用内层处理器；
//! - 有失败项：返回失败结果（载荷为 `None`），内层处理器不会被调用；
//! - 全部通过：原样返回内层处理器的结果。
//!
//! 调用内层处理器前若已取消，直接返回 `AppError::Cancelled`。
//!
use crate::{
    command::Command,
    command_handler::CommandHandler,
    error::{AppError, AppResult},
    outcome::Outcome,
    query::Query,
    query_handler::QueryHandler,
    validation::{Validators, format_failures, run_validators},
};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

pub struct ValidationDecorator<R, H> {
    inner: H,
    validators: Validators<R>,
}

impl<R, H> ValidationDecorator<R, H> {
    pub fn new(inner: H, validators: Validators<R>) -> Self {
        Self { inner, validators }
    }
}

#[async_trait]
impl<C, H> CommandHandler<C> for ValidationDecorator<C, H>
where
    C: Command,
    H: CommandHandler<C>,
{
    async fn handle(
        &self,
        cmd: C,
        cancellation: &CancellationToken,
    ) -> AppResult<Outcome<C::Response>> {
        if !self.validators.is_empty() {
            let failures =
                run_validators(&self.validators, &cmd, cancellation, C::NAME).await?;
            if !failures.is_empty() {
                return Ok(Outcome::failure_with_response(
                    None,
                    format_failures(&failures),
                ));
            }
        }

        if cancellation.is_cancelled() {
            return Err(AppError::Cancelled { request: C::NAME });
        }
        self.inner.handle(cmd, cancellation).await
    }
}

#[async_trait]
impl<Q, H> QueryHandler<Q> for ValidationDecorator<Q, H>
where
    Q: Query,
    H: QueryHandler<Q>,
{
    async fn handle(
        &self,
        q: Q,
        cancellation: &CancellationToken,
    ) -> AppResult<Outcome<Q::Response>> {
        if !self.validators.is_empty() {
            let failures =
                run_validators(&self.validators, &q, cancellation, Q::NAME).await?;
            if !failures.is_empty() {
                return Ok(Outcome::failure_with_response(
                    None,
                    format_failures(&failures),
                ));
            }
        }

        if cancellation.is_cancelled() {
            return Err(AppError::Cancelled { request: Q::NAME });
        }
        self.inner.handle(q, cancellation).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{FnValidator, ValidationFailure, Validator};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    struct CreateUser {
        name: String,
    }

    impl Command for CreateUser {
        const NAME: &'static str = "CreateUser";
        type Response = ();
    }

    #[derive(Default)]
    struct CountingHandler {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CommandHandler<CreateUser> for CountingHandler {
        async fn handle(
            &self,
            cmd: CreateUser,
            _cancellation: &CancellationToken,
        ) -> AppResult<Outcome> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if cmd.name == "taken" {
                return Ok(Outcome::failure("name already taken"));
            }
            Ok(Outcome::success())
        }
    }

    #[derive(Debug)]
    struct FindUser {
        id: u32,
    }

    #[derive(Debug, PartialEq, Eq)]
    struct UserDto {
        id: u32,
    }

    impl Query for FindUser {
        const NAME: &'static str = "FindUser";
        type Response = UserDto;
    }

    #[derive(Default)]
    struct FindUserHandler {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl QueryHandler<FindUser> for FindUserHandler {
        async fn handle(
            &self,
            q: FindUser,
            _cancellation: &CancellationToken,
        ) -> AppResult<Outcome<UserDto>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Outcome::success_with_response(UserDto { id: q.id }))
        }
    }

    fn always_passes() -> Arc<dyn Validator<CreateUser>> {
        Arc::new(FnValidator::new(|_: &CreateUser| vec![]))
    }

    fn name_required() -> Arc<dyn Validator<CreateUser>> {
        Arc::new(FnValidator::new(|c: &CreateUser| {
            if c.name.is_empty() {
                vec![ValidationFailure::new("name", "Name is required")]
            } else {
                vec![]
            }
        }))
    }

    #[tokio::test]
    async fn no_validators_passes_inner_result_through() {
        let inner = Arc::new(CountingHandler::default());
        let decorator = ValidationDecorator::<CreateUser, _>::new(inner.clone(), vec![]);
        let token = CancellationToken::new();

        let ok = decorator
            .handle(CreateUser { name: "ann".into() }, &token)
            .await
            .unwrap();
        assert_eq!(ok, Outcome::success());

        let failed = decorator
            .handle(
                CreateUser {
                    name: "taken".into(),
                },
                &token,
            )
            .await
            .unwrap();
        assert_eq!(failed, Outcome::failure("name already taken"));
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn passing_validators_pass_inner_result_through() {
        let inner = Arc::new(CountingHandler::default());
        let decorator =
            ValidationDecorator::new(inner.clone(), vec![always_passes(), name_required()]);

        let out = decorator
            .handle(
                CreateUser {
                    name: "taken".into(),
                },
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        // 内层返回的失败结果不被改写
        assert_eq!(out, Outcome::failure("name already taken"));
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn single_failure_short_circuits() {
        let inner = Arc::new(CountingHandler::default());
        let decorator =
            ValidationDecorator::new(inner.clone(), vec![always_passes(), name_required()]);

        let out = decorator
            .handle(CreateUser { name: String::new() }, &CancellationToken::new())
            .await
            .unwrap();

        assert!(out.is_failure());
        assert_eq!(out.message(), "Name is required\n");
        assert_eq!(inner.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failures_from_all_validators_are_joined_in_order() {
        let too_short: Arc<dyn Validator<CreateUser>> =
            Arc::new(FnValidator::new(|c: &CreateUser| {
                if c.name.len() < 3 {
                    vec![ValidationFailure::new("name", "Name is too short")]
                } else {
                    vec![]
                }
            }));
        let inner = Arc::new(CountingHandler::default());
        let decorator =
            ValidationDecorator::new(inner.clone(), vec![name_required(), too_short]);

        let out = decorator
            .handle(CreateUser { name: String::new() }, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(out.message(), "Name is required\nName is too short\n");
        assert_eq!(inner.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn query_failure_carries_no_response() {
        let inner = Arc::new(FindUserHandler::default());
        let positive_id: Arc<dyn Validator<FindUser>> = Arc::new(FnValidator::new(|q: &FindUser| {
            if q.id == 0 {
                vec![ValidationFailure::new("id", "Id must be positive")]
            } else {
                vec![]
            }
        }));
        let decorator = ValidationDecorator::new(inner.clone(), vec![positive_id]);
        let token = CancellationToken::new();

        let rejected = decorator.handle(FindUser { id: 0 }, &token).await.unwrap();
        assert!(rejected.is_failure());
        assert_eq!(rejected.response(), None);
        assert_eq!(inner.calls.load(Ordering::SeqCst), 0);

        let found = decorator.handle(FindUser { id: 9 }, &token).await.unwrap();
        assert_eq!(found.response(), Some(&UserDto { id: 9 }));
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
    }

    /// 校验进行中触发取消，然后永远挂起
    struct CancelsMidFlight {
        token: CancellationToken,
    }

    #[async_trait]
    impl Validator<CreateUser> for CancelsMidFlight {
        async fn validate(&self, _request: &CreateUser) -> AppResult<Vec<ValidationFailure>> {
            self.token.cancel();
            std::future::pending::<()>().await;
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn cancellation_during_validation_propagates() {
        let token = CancellationToken::new();
        let inner = Arc::new(CountingHandler::default());
        let stalls: Arc<dyn Validator<CreateUser>> = Arc::new(CancelsMidFlight {
            token: token.clone(),
        });
        let decorator = ValidationDecorator::new(inner.clone(), vec![always_passes(), stalls]);

        let err = decorator
            .handle(CreateUser { name: "ann".into() }, &token)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Cancelled { request: "CreateUser" }));
        assert_eq!(inner.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn cancelled_token_skips_inner_handler() {
        let inner = Arc::new(CountingHandler::default());
        let decorator = ValidationDecorator::<CreateUser, _>::new(inner.clone(), vec![]);
        let token = CancellationToken::new();
        token.cancel();

        let err = decorator
            .handle(CreateUser { name: "ann".into() }, &token)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Cancelled { request: "CreateUser" }));
        assert_eq!(inner.calls.load(Ordering::SeqCst), 0);
    }
}
