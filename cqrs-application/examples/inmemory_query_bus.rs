use async_trait::async_trait;
use cqrs_application::error::AppResult;
use cqrs_application::pipeline::PipelineConfig;
use cqrs_application::query::Query;
use cqrs_application::query_bus::QueryBus;
use cqrs_application::query_handler::QueryHandler;
use cqrs_application::validation::{FnValidator, ValidationFailure, Validator};
use cqrs_application::{InMemoryQueryBus, Outcome};
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
struct GetUser {
    id: u32,
}

#[derive(Debug, Serialize)]
struct UserDto {
    id: u32,
    name: String,
}

impl Query for GetUser {
    const NAME: &'static str = "GetUser";
    type Response = UserDto;
}

struct GetUserHandler;

#[async_trait]
impl QueryHandler<GetUser> for GetUserHandler {
    async fn handle(
        &self,
        q: GetUser,
        _cancellation: &CancellationToken,
    ) -> AppResult<Outcome<UserDto>> {
        if q.id > 100 {
            return Ok(Outcome::failure_with_response(None, "user not found"));
        }
        Ok(Outcome::success_with_response(UserDto {
            id: q.id,
            name: "Alice".into(),
        }))
    }
}

#[derive(Debug)]
struct ListUsers;

#[derive(Debug, Serialize)]
struct UsersDto(Vec<UserDto>);

impl Query for ListUsers {
    const NAME: &'static str = "ListUsers";
    type Response = UsersDto;
}

struct ListUsersHandler;

#[async_trait]
impl QueryHandler<ListUsers> for ListUsersHandler {
    async fn handle(
        &self,
        _q: ListUsers,
        _cancellation: &CancellationToken,
    ) -> AppResult<Outcome<UsersDto>> {
        Ok(Outcome::success_with_response(UsersDto(vec![
            UserDto {
                id: 1,
                name: "Alice".into(),
            },
            UserDto {
                id: 2,
                name: "Bob".into(),
            },
        ])))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let positive_id: Arc<dyn Validator<GetUser>> = Arc::new(FnValidator::new(|q: &GetUser| {
        if q.id == 0 {
            vec![ValidationFailure::new("id", "Id must be positive")]
        } else {
            vec![]
        }
    }));

    let bus = InMemoryQueryBus::new();
    bus.register_with_validators::<GetUser, _>(GetUserHandler, vec![positive_id])?;

    // 列表查询不需要追踪
    let quiet =
        InMemoryQueryBus::new().with_config(PipelineConfig::builder().tracking(false).build());
    quiet.register::<ListUsers, _>(ListUsersHandler)?;

    let token = CancellationToken::new();

    let user = bus.dispatch(GetUser { id: 1 }, &token).await?;
    println!("GetUser -> {}", serde_json::to_string(&user)?);

    let invalid = bus.dispatch(GetUser { id: 0 }, &token).await?;
    println!("GetUser(0) -> {}", serde_json::to_string(&invalid)?);

    let missing = bus.dispatch(GetUser { id: 404 }, &token).await?;
    println!("GetUser(404) -> {:?}", missing.into_result());

    let users = quiet.dispatch(ListUsers, &token).await?;
    println!("ListUsers -> {:?}", users.into_response());

    Ok(())
}
