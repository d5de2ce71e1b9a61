use async_trait::async_trait;
use cqrs_application::command::Command;
use cqrs_application::command_bus::CommandBus;
use cqrs_application::command_handler::CommandHandler;
use cqrs_application::error::{AppError, AppResult};
use cqrs_application::validation::{FnValidator, ValidationFailure, Validator};
use cqrs_application::{InMemoryCommandBus, Outcome};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
struct CreateUser {
    name: String,
}

impl Command for CreateUser {
    const NAME: &'static str = "CreateUser";
    type Response = u32;
}

struct CreateUserHandler;

#[async_trait]
impl CommandHandler<CreateUser> for CreateUserHandler {
    async fn handle(
        &self,
        cmd: CreateUser,
        _cancellation: &CancellationToken,
    ) -> AppResult<Outcome<u32>> {
        println!("CreateUser: name={}", cmd.name);
        Ok(Outcome::success_with_response(1))
    }
}

#[derive(Debug)]
struct DeleteUser {
    id: u32,
}

impl Command for DeleteUser {
    const NAME: &'static str = "DeleteUser";
    type Response = ();
}

struct DeleteUserHandler;

#[async_trait]
impl CommandHandler<DeleteUser> for DeleteUserHandler {
    async fn handle(
        &self,
        cmd: DeleteUser,
        _cancellation: &CancellationToken,
    ) -> AppResult<Outcome> {
        if cmd.id == 0 {
            return Ok(Outcome::failure("user 0 is reserved"));
        }
        println!("DeleteUser: id={}", cmd.id);
        Ok(Outcome::success())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // RUST_LOG=info 可查看追踪事件
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let name_required: Arc<dyn Validator<CreateUser>> =
        Arc::new(FnValidator::new(|c: &CreateUser| {
            if c.name.is_empty() {
                vec![ValidationFailure::new("name", "Name is required")]
            } else {
                vec![]
            }
        }));

    let bus = InMemoryCommandBus::new();
    bus.register_with_validators::<CreateUser, _>(CreateUserHandler, vec![name_required])?;
    bus.register::<DeleteUser, _>(DeleteUserHandler)?;

    let token = CancellationToken::new();

    let created = bus
        .dispatch(
            CreateUser {
                name: "Alice".into(),
            },
            &token,
        )
        .await?;
    println!("created id={:?}", created.response());

    let rejected = bus
        .dispatch(
            CreateUser {
                name: String::new(),
            },
            &token,
        )
        .await?;
    print!("rejected: {}", rejected.message());

    let reserved = bus.dispatch(DeleteUser { id: 0 }, &token).await?;
    println!("delete failed: {}", reserved.message());
    bus.dispatch(DeleteUser { id: 42 }, &token).await?;

    // 未注册的命令 -> 返回 HandlerNotFound 错误
    #[allow(dead_code)]
    #[derive(Debug)]
    struct UpdateUser {
        id: u32,
        name: String,
    }

    impl Command for UpdateUser {
        const NAME: &'static str = "UpdateUser";
        type Response = ();
    }

    if let Err(AppError::HandlerNotFound(name)) = bus
        .dispatch(
            UpdateUser {
                id: 7,
                name: "Eve".into(),
            },
            &token,
        )
        .await
    {
        eprintln!("HandlerNotFound as expected for command: {}", name);
    }
    Ok(())
}
