//! The mediator: handler resolution and middleware chain execution.
//!
//! Each [`send`](Mediator::send) is a self-contained linear pipeline:
//!
//! ```text
//! caller → send → [resolve handler, sort middleware] →
//!     middleware₁ → middleware₂ → … → handler → result back up the chain
//! ```
//!
//! No state persists across calls, there are no retries, and there is no
//! cancellation hook at this layer; callers wanting timeouts race the
//! returned future themselves.

use std::any::TypeId;
use std::cmp::Reverse;
use std::sync::Arc;

use tracing::{Level, debug, span};

use crate::context::RequestContext;
use crate::error::SendError;
use crate::middleware::Next;
use crate::registry::{
    HandlerProvider, MediatorRegistry, MiddlewareProvider, NullHandlerProvider,
    NullMiddlewareProvider,
};
use crate::request::Request;

/// Dispatches requests to their registered handlers through the middleware
/// chain.
///
/// A mediator is cheap to clone and `Send + Sync`; concurrent `send` calls
/// never interfere because each gets its own clone of the base context and
/// the providers are only read during dispatch.
///
/// # Example
///
/// ```rust,ignore
/// let registry = Arc::new(MediatorRegistry::new());
/// registry.handler_registry().register(|| GreetHandler);
///
/// let mediator = Mediator::new(registry);
/// let greeting = mediator.send(Greet::new(args)).await?;
/// ```
#[derive(Clone)]
pub struct Mediator {
    handler_provider: Arc<dyn HandlerProvider>,
    middleware_provider: Arc<dyn MiddlewareProvider>,
    base_context: RequestContext,
}

impl Mediator {
    /// Creates a mediator backed by `registry` for both handler and
    /// middleware lookup, with an empty base context.
    pub fn new(registry: Arc<MediatorRegistry>) -> Self {
        Self {
            handler_provider: Arc::clone(&registry) as Arc<dyn HandlerProvider>,
            middleware_provider: registry,
            base_context: RequestContext::empty(),
        }
    }

    /// Starts configuring a mediator with explicit providers.
    pub fn builder() -> MediatorBuilder {
        MediatorBuilder::default()
    }

    /// A mediator wired to the null providers: it knows no handlers and no
    /// middleware, so every dispatch fails with
    /// [`SendError::NoHandler`]. Useful as an inert default in code that
    /// receives its real mediator later.
    pub fn null() -> Self {
        Self::builder().build()
    }

    /// Dispatches an already-constructed request and returns its typed
    /// result.
    ///
    /// Fails with [`SendError::NoHandler`], before any middleware runs, when
    /// no factory is registered for `R`; middleware failures propagate
    /// verbatim as [`SendError::Middleware`].
    pub async fn send<R: Request>(&self, request: R) -> Result<R::Output, SendError> {
        self.dispatch(request).await
    }

    /// Constructs `R` from `args` and dispatches it.
    ///
    /// Behaves exactly as `send(R::from_args(args))`: same context handling,
    /// same middleware application, same errors.
    pub async fn send_with<R: Request>(&self, args: R::Args) -> Result<R::Output, SendError> {
        self.dispatch(R::from_args(args)).await
    }

    async fn dispatch<R: Request>(&self, request: R) -> Result<R::Output, SendError> {
        let request_type = std::any::type_name::<R>();
        let span = span!(
            Level::DEBUG,
            "send",
            request_type,
            request_id = %Request::id(&request),
        );
        let _enter = span.enter();

        // Handler resolution precedes everything: middleware never run for
        // a request nobody handles.
        let handler = self
            .handler_provider
            .handler_for(TypeId::of::<R>())
            .ok_or(SendError::NoHandler { request_type })?;

        // Higher priority runs first (outermost). The sort is stable, so
        // equal priorities keep their registration order.
        let mut chain = self.middleware_provider.middlewares();
        chain.sort_by_key(|middleware| Reverse(middleware.priority()));
        debug!(middleware = chain.len(), "chain assembled");

        let mut cx = self.base_context.clone();
        drop(_enter);

        let result = Next::new(&chain, handler.as_ref())
            .run(&request, &mut cx)
            .await?;

        result
            .downcast::<R::Output>()
            .map(|boxed| *boxed)
            .map_err(|_| SendError::ResultTypeMismatch { request_type })
    }
}

impl std::fmt::Debug for Mediator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mediator")
            .field("base_context", &self.base_context)
            .finish()
    }
}

/// Builder for mediators with non-default providers or a prepared base
/// context.
///
/// Providers left unset fall back to the null providers, yielding an inert
/// mediator; supply a [`MediatorRegistry`] via [`registry`](Self::registry)
/// for the usual shared setup.
#[derive(Default)]
pub struct MediatorBuilder {
    handler_provider: Option<Arc<dyn HandlerProvider>>,
    middleware_provider: Option<Arc<dyn MiddlewareProvider>>,
    base_context: Option<RequestContext>,
}

impl MediatorBuilder {
    /// Uses `registry` for both handler and middleware lookup.
    pub fn registry(mut self, registry: Arc<MediatorRegistry>) -> Self {
        self.handler_provider = Some(Arc::clone(&registry) as Arc<dyn HandlerProvider>);
        self.middleware_provider = Some(registry);
        self
    }

    /// Overrides the handler provider.
    pub fn handler_provider(mut self, provider: Arc<dyn HandlerProvider>) -> Self {
        self.handler_provider = Some(provider);
        self
    }

    /// Overrides the middleware provider.
    pub fn middleware_provider(mut self, provider: Arc<dyn MiddlewareProvider>) -> Self {
        self.middleware_provider = Some(provider);
        self
    }

    /// Sets the base context cloned into every dispatch. Defaults to empty.
    pub fn base_context(mut self, context: RequestContext) -> Self {
        self.base_context = Some(context);
        self
    }

    /// Finishes the configuration.
    pub fn build(self) -> Mediator {
        Mediator {
            handler_provider: self
                .handler_provider
                .unwrap_or_else(|| Arc::new(NullHandlerProvider)),
            middleware_provider: self
                .middleware_provider
                .unwrap_or_else(|| Arc::new(NullMiddlewareProvider)),
            base_context: self.base_context.unwrap_or_default(),
        }
    }
}
