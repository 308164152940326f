//! # Switchboard
//!
//! A typed request-dispatch library implementing the mediator pattern:
//! callers submit typed request objects (commands or queries) and receive
//! typed results without ever holding a reference to the handler that
//! satisfies them.
//!
//! ## Architecture
//!
//! All requests flow through a central [`Mediator`]:
//!
//! ```text
//! ┌────────┐     ┌──────────┐     ┌──────────────┐     ┌─────────┐
//! │ Caller │────▶│ Mediator │────▶│ middleware … │────▶│ Handler │
//! └────────┘     └──────────┘     └──────────────┘     └─────────┘
//!                      │
//!                      ▼
//!               MediatorRegistry
//!           (handler factories + middleware)
//! ```
//!
//! - **Request model** ([`Request`], [`Command`], [`Query`],
//!   [`define_request!`]): a request pairs an immutable argument value with
//!   a declared result type and a per-instance [`RequestId`].
//! - **Request context** ([`RequestContext`], [`ContextKey`]): a cloneable,
//!   typed key-value bag threaded through a single dispatch.
//! - **Registries** ([`MediatorRegistry`], [`HandlerRegistry`],
//!   [`MiddlewareRegistry`]): map request types to handler factories and
//!   hold the middleware collection. Explicitly constructed and shared via
//!   `Arc`; there is no process-wide default.
//! - **Mediator** ([`Mediator`]): resolves the handler, sorts middleware by
//!   descending priority, and runs the chain with a fresh clone of the base
//!   context.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use async_trait::async_trait;
//! use switchboard::prelude::*;
//!
//! pub struct GreetArgs {
//!     pub greetee: String,
//! }
//!
//! define_request! {
//!     /// Produces a greeting for `greetee`.
//!     pub query Greet(GreetArgs) -> String;
//! }
//!
//! struct GreetHandler;
//!
//! #[async_trait]
//! impl Handler<Greet> for GreetHandler {
//!     async fn handle(&self, request: &Greet, _cx: &mut RequestContext) -> String {
//!         format!("Hello, {}!", request.args().greetee)
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), SendError> {
//!     let registry = Arc::new(MediatorRegistry::new());
//!     registry.handler_registry().register(|| GreetHandler);
//!
//!     let mediator = Mediator::new(registry);
//!     let greeting = mediator
//!         .send_with::<Greet>(GreetArgs { greetee: "World".into() })
//!         .await?;
//!     assert_eq!(greeting, "Hello, World!");
//!     Ok(())
//! }
//! ```
//!
//! ## Concurrency
//!
//! Dispatch performs no I/O and spawns nothing: one `send` is one async
//! call stack, suspended only inside handlers and at each middleware's
//! `next` call. Concurrent sends on one mediator are safe: each gets its
//! own context clone and only reads the registries. Registering handlers or
//! middleware while dispatches are in flight is unsupported; do
//! registration during setup.

pub mod context;
pub mod error;
pub mod handler;
mod macros;
pub mod mediator;
pub mod middleware;
pub mod registry;
pub mod request;

pub use context::{ContextKey, RequestContext};
pub use error::{BoxError, SendError};
pub use handler::{BoxedResult, DispatchResult, ErasedHandler, Handler, erase};
pub use mediator::{Mediator, MediatorBuilder};
pub use middleware::{Middleware, Next};
pub use registry::{
    HandlerProvider, HandlerRegistry, MediatorRegistry, MiddlewareProvider, MiddlewareRegistry,
    NullHandlerProvider, NullMiddlewareProvider,
};
pub use request::{AnyRequest, Command, Query, Request, RequestId};

/// Prelude for common imports.
pub mod prelude {
    pub use super::context::{ContextKey, RequestContext};
    pub use super::error::SendError;
    pub use super::handler::{DispatchResult, Handler};
    pub use super::mediator::Mediator;
    pub use super::middleware::{Middleware, Next};
    pub use super::registry::MediatorRegistry;
    pub use super::request::{AnyRequest, Command, Query, Request, RequestId};

    pub use super::define_request;
}
