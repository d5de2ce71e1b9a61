//! CQRS 应用层调度（cqrs-application）
//!
//! 调用方提交命令或查询，总线将其路由到唯一注册的处理器，
//! 并在外面按固定顺序套上横切行为：
//!
//! ```text
//! caller → TrackingDecorator → ValidationDecorator → 具体处理器
//! ```
//!
//! - [`outcome`]：统一的成功/失败结果，可携带载荷；
//! - [`command_handler`] / [`query_handler`]：两类处理器契约；
//! - [`validation_decorator`]：并发运行校验器，失败即短路；
//! - [`tracking_decorator`]：记录开始/完成/失败事件，结果原样透传；
//! - [`pipeline`]：组装装饰链；
//! - [`InMemoryCommandBus`] / [`InMemoryQueryBus`]：按类型注册与分发。
//!
//! 可预期的失败（校验失败、业务失败）是 `Outcome` 值；取消与缺陷走 `Err(AppError)`。
//!
pub mod command;
pub mod command_bus;
pub mod command_handler;
pub mod error;
pub mod inmemory_command_bus;
pub mod inmemory_query_bus;
pub mod outcome;
pub mod pipeline;
pub mod query;
pub mod query_bus;
pub mod query_handler;
pub mod tracking;
pub mod tracking_decorator;
pub mod validation;
pub mod validation_decorator;

pub use inmemory_command_bus::InMemoryCommandBus;
pub use inmemory_query_bus::InMemoryQueryBus;
pub use outcome::Outcome;
