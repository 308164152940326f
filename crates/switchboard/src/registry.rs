//! Handler and middleware registries, and the provider seams the mediator
//! dispatches through.
//!
//! A [`MediatorRegistry`] bundles a [`HandlerRegistry`] and a
//! [`MiddlewareRegistry`] and implements both provider traits, so one
//! `Arc<MediatorRegistry>` is usually all an application constructs,
//! typically once at startup and shared by reference with every
//! [`Mediator`](crate::Mediator) that wants it. There is no process-wide
//! default: tests build their own registries instead of resetting a shared
//! one.
//!
//! Registration is expected during setup/teardown; mutating a registry while
//! dispatches are in flight is not supported (the locks keep it memory-safe,
//! nothing more).

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::handler::{ErasedHandler, Handler, erase};
use crate::middleware::Middleware;
use crate::request::Request;

/// Supplies handlers to a mediator.
///
/// Implemented by [`MediatorRegistry`]; custom implementations enable
/// decorated or composed lookup schemes.
pub trait HandlerProvider: Send + Sync {
    /// Produces a fresh handler for the request type identified by
    /// `request_type`, or `None` if the type is unknown.
    ///
    /// A miss is not an error at this layer; the mediator turns it into
    /// [`SendError::NoHandler`](crate::SendError::NoHandler).
    fn handler_for(&self, request_type: TypeId) -> Option<Box<dyn ErasedHandler>>;
}

/// Supplies the middleware collection to a mediator.
pub trait MiddlewareProvider: Send + Sync {
    /// The currently registered middleware, in registration order.
    ///
    /// Registration order is not application order; the mediator re-sorts
    /// by priority on every dispatch.
    fn middlewares(&self) -> Vec<Arc<dyn Middleware>>;
}

type HandlerFactory = Arc<dyn Fn() -> Box<dyn ErasedHandler> + Send + Sync>;

/// Maps request types to zero-argument handler factories.
///
/// Keyed by the request type's `TypeId`, so two request types cannot
/// collide regardless of their names. Exactly one factory per request type:
/// registering a second silently replaces the first (last write wins).
#[derive(Default)]
pub struct HandlerRegistry {
    factories: RwLock<HashMap<TypeId, HandlerFactory>>,
}

impl HandlerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `factory` as the handler source for request type `R`,
    /// replacing any prior registration for `R`.
    ///
    /// The factory runs once per lookup, producing a fresh handler per
    /// dispatch; a factory that clones a shared instance opts into reuse.
    pub fn register<R, H, F>(&self, factory: F)
    where
        R: Request,
        H: Handler<R> + 'static,
        F: Fn() -> H + Send + Sync + 'static,
    {
        debug!(request_type = std::any::type_name::<R>(), "handler registered");
        self.factories.write().insert(
            TypeId::of::<R>(),
            Arc::new(move || erase::<R, H>(factory())),
        );
    }

    /// Invokes the factory registered for `request_type` and returns the
    /// produced handler, or `None` for an unknown type.
    pub fn handler_for(&self, request_type: TypeId) -> Option<Box<dyn ErasedHandler>> {
        let factory = self.factories.read().get(&request_type).cloned();
        factory.map(|f| f())
    }

    /// Clears all registrations.
    pub fn reset(&self) {
        self.factories.write().clear();
    }

    /// Number of registered request types.
    pub fn len(&self) -> usize {
        self.factories.read().len()
    }

    /// `true` if no handler is registered.
    pub fn is_empty(&self) -> bool {
        self.factories.read().is_empty()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("len", &self.len())
            .finish()
    }
}

/// Holds the registered middleware in registration order.
///
/// No uniqueness constraint: registering the same middleware twice applies
/// it twice.
#[derive(Default)]
pub struct MiddlewareRegistry {
    entries: RwLock<Vec<Arc<dyn Middleware>>>,
}

impl MiddlewareRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a middleware to the collection.
    pub fn register<M>(&self, middleware: M)
    where
        M: Middleware + 'static,
    {
        self.register_arc(Arc::new(middleware));
    }

    /// Appends an already-shared middleware instance.
    pub fn register_arc(&self, middleware: Arc<dyn Middleware>) {
        debug!(priority = middleware.priority(), "middleware registered");
        self.entries.write().push(middleware);
    }

    /// The current collection, in registration order.
    pub fn snapshot(&self) -> Vec<Arc<dyn Middleware>> {
        self.entries.read().clone()
    }

    /// Clears the collection.
    pub fn reset(&self) {
        self.entries.write().clear();
    }

    /// Number of registered middleware.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// `true` if no middleware is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl fmt::Debug for MiddlewareRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareRegistry")
            .field("len", &self.len())
            .finish()
    }
}

/// A handler registry and a middleware registry under one roof.
///
/// The usual setup:
///
/// ```rust,ignore
/// let registry = Arc::new(MediatorRegistry::new());
/// registry.handler_registry().register(|| GreetHandler);
/// registry.middleware_registry().register(Authenticate);
///
/// let mediator = Mediator::new(Arc::clone(&registry));
/// ```
#[derive(Default, Debug)]
pub struct MediatorRegistry {
    handlers: HandlerRegistry,
    middlewares: MiddlewareRegistry,
}

impl MediatorRegistry {
    /// Creates an empty registry pair.
    pub fn new() -> Self {
        Self::default()
    }

    /// The handler half.
    pub fn handler_registry(&self) -> &HandlerRegistry {
        &self.handlers
    }

    /// The middleware half.
    pub fn middleware_registry(&self) -> &MiddlewareRegistry {
        &self.middlewares
    }

    /// Clears both halves. Intended for test isolation when a registry is
    /// shared between cases.
    pub fn reset(&self) {
        self.handlers.reset();
        self.middlewares.reset();
    }
}

impl HandlerProvider for MediatorRegistry {
    fn handler_for(&self, request_type: TypeId) -> Option<Box<dyn ErasedHandler>> {
        self.handlers.handler_for(request_type)
    }
}

impl MiddlewareProvider for MediatorRegistry {
    fn middlewares(&self) -> Vec<Arc<dyn Middleware>> {
        self.middlewares.snapshot()
    }
}

/// Null object: knows no handlers.
///
/// Every dispatch through a mediator configured with this provider fails
/// with [`SendError::NoHandler`](crate::SendError::NoHandler).
#[derive(Default, Debug, Clone, Copy)]
pub struct NullHandlerProvider;

impl HandlerProvider for NullHandlerProvider {
    fn handler_for(&self, _request_type: TypeId) -> Option<Box<dyn ErasedHandler>> {
        None
    }
}

/// Null object: carries no middleware.
#[derive(Default, Debug, Clone, Copy)]
pub struct NullMiddlewareProvider;

impl MiddlewareProvider for NullMiddlewareProvider {
    fn middlewares(&self) -> Vec<Arc<dyn Middleware>> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RequestContext;
    use crate::define_request;
    use async_trait::async_trait;

    define_request! {
        pub query Shout(String) -> String;
    }

    struct UpperHandler;

    #[async_trait]
    impl Handler<Shout> for UpperHandler {
        async fn handle(&self, request: &Shout, _cx: &mut RequestContext) -> String {
            request.args().to_uppercase()
        }
    }

    struct LowerHandler;

    #[async_trait]
    impl Handler<Shout> for LowerHandler {
        async fn handle(&self, request: &Shout, _cx: &mut RequestContext) -> String {
            request.args().to_lowercase()
        }
    }

    async fn run(handler: Box<dyn ErasedHandler>, input: &str) -> String {
        let request = Shout::new(input.to_owned());
        let mut cx = RequestContext::empty();
        let boxed = handler.call(&request, &mut cx).await.unwrap();
        *boxed.downcast::<String>().ok().unwrap()
    }

    #[tokio::test]
    async fn lookup_produces_a_working_handler() {
        let registry = HandlerRegistry::new();
        registry.register(|| UpperHandler);

        let handler = registry.handler_for(TypeId::of::<Shout>()).unwrap();
        assert_eq!(run(handler, "hey").await, "HEY");
    }

    #[test]
    fn lookup_miss_is_none() {
        let registry = HandlerRegistry::new();
        assert!(registry.handler_for(TypeId::of::<Shout>()).is_none());
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn reregistration_is_last_write_wins() {
        let registry = HandlerRegistry::new();
        registry.register(|| UpperHandler);
        registry.register(|| LowerHandler);
        assert_eq!(registry.len(), 1);

        let handler = registry.handler_for(TypeId::of::<Shout>()).unwrap();
        assert_eq!(run(handler, "Hey").await, "hey");
    }

    #[test]
    fn reset_clears_registrations() {
        let registry = HandlerRegistry::new();
        registry.register(|| UpperHandler);
        registry.reset();
        assert!(registry.handler_for(TypeId::of::<Shout>()).is_none());
    }

    struct Noop(i32);

    #[async_trait]
    impl Middleware for Noop {
        fn priority(&self) -> i32 {
            self.0
        }

        async fn handle(
            &self,
            request: &dyn crate::AnyRequest,
            cx: &mut RequestContext,
            next: crate::Next<'_>,
        ) -> crate::DispatchResult {
            next.run(request, cx).await
        }
    }

    #[test]
    fn middleware_snapshot_preserves_registration_order() {
        let registry = MiddlewareRegistry::new();
        registry.register(Noop(3));
        registry.register(Noop(1));
        registry.register(Noop(2));

        let priorities: Vec<i32> = registry.snapshot().iter().map(|m| m.priority()).collect();
        assert_eq!(priorities, [3, 1, 2]);
    }

    #[test]
    fn duplicate_middleware_registrations_are_kept() {
        let registry = MiddlewareRegistry::new();
        let shared: Arc<dyn Middleware> = Arc::new(Noop(5));
        registry.register_arc(Arc::clone(&shared));
        registry.register_arc(shared);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn mediator_registry_reset_clears_both_halves() {
        let registry = MediatorRegistry::new();
        registry.handler_registry().register(|| UpperHandler);
        registry.middleware_registry().register(Noop(1));

        registry.reset();
        assert!(registry.handler_registry().is_empty());
        assert!(registry.middleware_registry().is_empty());
    }

    #[test]
    fn null_providers_report_nothing() {
        assert!(NullHandlerProvider.handler_for(TypeId::of::<Shout>()).is_none());
        assert!(MiddlewareProvider::middlewares(&NullMiddlewareProvider).is_empty());
    }
}
