//! Middleware trait and the continuation type for chain execution.
//!
//! Middleware wrap every dispatch with cross-cutting behavior. Each exposes
//! an integer priority; at dispatch time the mediator sorts the registered
//! middleware by descending priority (higher runs first, i.e. outermost)
//! and threads the request through them down to the handler.
//!
//! The chain is not built from nested closures: [`Next`] holds the
//! remaining middleware as a plain slice plus the terminal handler, and
//! [`Next::run`] peels one element per invocation. A middleware may call
//! `next` zero, one, or several times, transform the result it gets back,
//! or substitute its own. The engine imposes no constraint.

use std::sync::Arc;

use async_trait::async_trait;

use crate::context::RequestContext;
use crate::handler::{DispatchResult, ErasedHandler};
use crate::request::AnyRequest;

/// A chain-of-responsibility link wrapping handler invocation.
///
/// # Example
///
/// ```rust,ignore
/// struct Authenticate;
///
/// #[async_trait]
/// impl Middleware for Authenticate {
///     fn priority(&self) -> i32 {
///         100
///     }
///
///     async fn handle(
///         &self,
///         request: &dyn AnyRequest,
///         cx: &mut RequestContext,
///         next: Next<'_>,
///     ) -> DispatchResult {
///         cx.put(&AUTHENTICATED, true);
///         next.run(request, cx).await
///     }
/// }
/// ```
#[async_trait]
pub trait Middleware: Send + Sync {
    /// Ordering weight: higher-priority middleware run first (outermost).
    ///
    /// Among middleware with equal priority, registration order decides.
    fn priority(&self) -> i32;

    /// Processes `request`, usually delegating to `next` for the remainder
    /// of the chain.
    ///
    /// Code before the `next.run(..).await` executes on the way in
    /// (descending priority order); code after it executes on the way out
    /// (ascending). Returning an error aborts the dispatch; it reaches the
    /// caller verbatim as [`SendError::Middleware`](crate::SendError::Middleware).
    async fn handle(
        &self,
        request: &dyn AnyRequest,
        cx: &mut RequestContext,
        next: Next<'_>,
    ) -> DispatchResult;
}

/// The continuation representing the rest of the chain: the not-yet-applied
/// middleware in application order, terminated by the handler call.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    remaining: &'a [Arc<dyn Middleware>],
    terminal: &'a dyn ErasedHandler,
}

impl<'a> Next<'a> {
    pub(crate) fn new(remaining: &'a [Arc<dyn Middleware>], terminal: &'a dyn ErasedHandler) -> Self {
        Self {
            remaining,
            terminal,
        }
    }

    /// Invokes the remainder of the chain.
    ///
    /// Takes `&self`, so a middleware may invoke its continuation more than
    /// once (each run shares the same per-dispatch context).
    pub async fn run(&self, request: &dyn AnyRequest, cx: &mut RequestContext) -> DispatchResult {
        match self.remaining.split_first() {
            Some((middleware, rest)) => {
                let next = Next::new(rest, self.terminal);
                middleware.handle(request, cx, next).await
            }
            None => self.terminal.call(request, cx).await,
        }
    }
}

impl std::fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Next")
            .field("remaining", &self.remaining.len())
            .finish()
    }
}
