//! Error types for dispatch.

use thiserror::Error;

/// Opaque error type carried by failing middleware.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors surfaced by [`send`](crate::Mediator::send).
///
/// The mediator itself only originates [`NoHandler`](SendError::NoHandler)
/// and the two mismatch variants (engine invariant violations that cannot
/// occur through the typed registration API). Everything else is a
/// middleware failure, propagated transparently; the mediator never wraps,
/// retries, or swallows it.
///
/// Handlers model their own failures in [`Request::Output`](crate::Request::Output)
/// (typically a `Result`); such values travel through dispatch as ordinary
/// results and never become a `SendError`.
#[derive(Debug, Error)]
pub enum SendError {
    /// No handler factory is registered for the dispatched request type.
    ///
    /// Raised before any middleware runs.
    #[error("no handler registered for request type `{request_type}`")]
    NoHandler {
        /// Diagnostic name of the offending request type.
        request_type: &'static str,
    },

    /// A handler was invoked with a request of the wrong concrete type.
    ///
    /// Unreachable through [`HandlerRegistry::register`](crate::HandlerRegistry::register),
    /// which keys factories by the request's `TypeId`; a hand-written
    /// [`HandlerProvider`](crate::HandlerProvider) returning a handler for
    /// the wrong type surfaces here instead of panicking.
    #[error("request type mismatch: handler for `{expected}` received `{found}`")]
    RequestTypeMismatch {
        /// The request type the handler was registered for.
        expected: &'static str,
        /// The request type actually dispatched.
        found: &'static str,
    },

    /// The value produced by the chain was not the request's declared
    /// result type.
    ///
    /// Happens only when a middleware substitutes a result of the wrong
    /// type.
    #[error("result type mismatch for request type `{request_type}`")]
    ResultTypeMismatch {
        /// Diagnostic name of the dispatched request type.
        request_type: &'static str,
    },

    /// A middleware failed. The underlying error passes through verbatim.
    #[error(transparent)]
    Middleware(BoxError),
}

impl SendError {
    /// Wraps an arbitrary error as a middleware failure.
    pub fn middleware(err: impl Into<BoxError>) -> Self {
        Self::Middleware(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_handler_names_the_request_type() {
        let err = SendError::NoHandler {
            request_type: "demo::Greet",
        };
        assert_eq!(
            err.to_string(),
            "no handler registered for request type `demo::Greet`"
        );
    }

    #[test]
    fn middleware_errors_display_transparently() {
        let inner = std::io::Error::other("backend unreachable");
        let err = SendError::middleware(inner);
        assert_eq!(err.to_string(), "backend unreachable");
    }
}
