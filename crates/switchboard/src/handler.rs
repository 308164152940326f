//! Handler traits and the type-erasure layer between typed registration and
//! untyped dispatch.
//!
//! Application code implements [`Handler<R>`] for a concrete request type
//! and registers a factory for it. The registry stores an erased form so a
//! single map can hold handlers for arbitrary request types; the typed and
//! erased worlds meet in [`erase`], which downcasts the request on the way
//! in and boxes the result on the way out.

use std::marker::PhantomData;

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::context::RequestContext;
use crate::error::SendError;
use crate::request::{AnyRequest, Request};

/// A boxed, type-erased handler result as it travels through the
/// middleware chain.
pub type BoxedResult = Box<dyn std::any::Any + Send>;

/// Result type flowing through the erased dispatch chain.
pub type DispatchResult = Result<BoxedResult, SendError>;

/// The terminal consumer of a request.
///
/// A handler is constructed fresh for every dispatch (via the factory given
/// to [`HandlerRegistry::register`](crate::HandlerRegistry::register), unless
/// that factory caches an instance) and produces the request's declared
/// result type.
///
/// Fallible handlers declare `Output = Result<T, E>` on the request; dispatch
/// passes such values through untouched.
///
/// # Example
///
/// ```rust,ignore
/// struct GreetHandler;
///
/// #[async_trait]
/// impl Handler<Greet> for GreetHandler {
///     async fn handle(&self, request: &Greet, _cx: &mut RequestContext) -> String {
///         format!("Hello, {}!", request.args().greetee)
///     }
/// }
/// ```
#[async_trait]
pub trait Handler<R: Request>: Send + Sync {
    /// Produces the result for `request`.
    ///
    /// `cx` is the per-dispatch context; values written by middleware
    /// earlier in the chain are visible here.
    async fn handle(&self, request: &R, cx: &mut RequestContext) -> R::Output;
}

/// A shared handler is a handler. Lets a factory hand out clones of one
/// long-lived instance when per-dispatch construction is undesirable.
#[async_trait]
impl<R, H> Handler<R> for std::sync::Arc<H>
where
    R: Request,
    H: Handler<R>,
{
    async fn handle(&self, request: &R, cx: &mut RequestContext) -> R::Output {
        self.as_ref().handle(request, cx).await
    }
}

/// Type-erased handler invocation, the terminal link of the middleware
/// chain.
///
/// Produced by [`HandlerProvider::handler_for`](crate::HandlerProvider::handler_for);
/// only custom provider implementations need to touch this trait directly.
pub trait ErasedHandler: Send + Sync {
    /// Downcasts `request` to the handler's request type and runs it.
    fn call<'a>(
        &'a self,
        request: &'a dyn AnyRequest,
        cx: &'a mut RequestContext,
    ) -> BoxFuture<'a, DispatchResult>;
}

struct Erased<R, H> {
    handler: H,
    _request: PhantomData<fn(R)>,
}

impl<R, H> ErasedHandler for Erased<R, H>
where
    R: Request,
    H: Handler<R>,
{
    fn call<'a>(
        &'a self,
        request: &'a dyn AnyRequest,
        cx: &'a mut RequestContext,
    ) -> BoxFuture<'a, DispatchResult> {
        Box::pin(async move {
            let typed = request.as_any().downcast_ref::<R>().ok_or_else(|| {
                SendError::RequestTypeMismatch {
                    expected: std::any::type_name::<R>(),
                    found: request.type_name(),
                }
            })?;
            let output = self.handler.handle(typed, cx).await;
            Ok(Box::new(output) as BoxedResult)
        })
    }
}

/// Wraps a typed handler into its erased form.
pub fn erase<R, H>(handler: H) -> Box<dyn ErasedHandler>
where
    R: Request,
    H: Handler<R> + 'static,
{
    Box::new(Erased {
        handler,
        _request: PhantomData,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::define_request;

    define_request! {
        pub query Double(u32) -> u32;
        pub query Unrelated(u32) -> u32;
    }

    struct DoubleHandler;

    #[async_trait]
    impl Handler<Double> for DoubleHandler {
        async fn handle(&self, request: &Double, _cx: &mut RequestContext) -> u32 {
            request.args() * 2
        }
    }

    #[tokio::test]
    async fn erased_call_round_trips_through_any() {
        let handler = erase(DoubleHandler);
        let request = Double::new(21);
        let mut cx = RequestContext::empty();

        let boxed = handler.call(&request, &mut cx).await.unwrap();
        assert_eq!(*boxed.downcast::<u32>().ok().unwrap(), 42);
    }

    #[tokio::test]
    async fn wrong_request_type_is_reported_not_panicked() {
        let handler = erase(DoubleHandler);
        let request = Unrelated::new(21);
        let mut cx = RequestContext::empty();

        let Err(err) = handler.call(&request, &mut cx).await else {
            panic!("mismatched request must be rejected");
        };
        assert!(matches!(err, SendError::RequestTypeMismatch { .. }));
    }
}
