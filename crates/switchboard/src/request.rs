//! Request model for the Switchboard mediator.
//!
//! A [`Request`] pairs an immutable argument value with a statically declared
//! result type. Requests are DTOs: the caller constructs one, the mediator
//! dispatches it, and it is discarded once the dispatch completes.
//!
//! The [`Command`] and [`Query`] marker traits split requests into
//! state-mutating and read-only intent. The distinction is documentation for
//! call sites only; the dispatch engine treats both identically.
//!
//! Most request types are declared through [`define_request!`](crate::define_request),
//! which generates the struct, its constructor, and the trait impls:
//!
//! ```rust,ignore
//! use switchboard::define_request;
//!
//! define_request! {
//!     /// Looks up a greeting for the given name.
//!     pub query Greet(GreetArgs) -> String;
//!
//!     /// Persists a user record.
//!     pub command SaveUser(UserRecord) -> ();
//! }
//! ```

use std::any::Any;
use std::fmt;

use uuid::Uuid;

/// Unique identifier assigned to every request instance at construction.
///
/// Two requests built from identical arguments still carry distinct ids;
/// identity is per instance, not per value. Ids are v4 uuids and render in
/// the canonical hyphenated 36-character form. Uniqueness across the process
/// is assumed; collisions are not detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RequestId(Uuid);

impl RequestId {
    /// Draws a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying uuid.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.as_hyphenated().fmt(f)
    }
}

/// A typed, immutable intent-to-act object.
///
/// A request binds three types together: the request type itself, its
/// argument type [`Args`](Request::Args), and its result type
/// [`Output`](Request::Output). The mediator uses this association to return
/// a typed result from [`send`](crate::Mediator::send) without the caller
/// ever naming the handler.
///
/// This layer performs no validation of the argument value; argument shape
/// validation is the handler's concern.
pub trait Request: Send + Sync + 'static {
    /// The argument payload carried by this request.
    type Args: Send + Sync + 'static;

    /// The result type a handler for this request produces.
    type Output: Send + 'static;

    /// Constructs a request from its arguments, assigning a fresh
    /// [`RequestId`].
    ///
    /// This is the "constructor of request X" derivation used by
    /// [`send_with`](crate::Mediator::send_with); calling it directly and
    /// passing the result to [`send`](crate::Mediator::send) behaves
    /// identically.
    fn from_args(args: Self::Args) -> Self
    where
        Self: Sized;

    /// The identifier assigned to this instance at construction.
    fn id(&self) -> RequestId;

    /// The argument payload.
    fn args(&self) -> &Self::Args;
}

/// Marker for requests with state-mutating intent.
pub trait Command: Request {}

/// Marker for requests with read-only intent.
pub trait Query: Request {}

/// Type-erased view of a request, as seen by middleware.
///
/// Middleware apply to every request type flowing through a mediator, so
/// they receive this erased view rather than the concrete type. A middleware
/// that cares about a specific request type can recover it:
///
/// ```rust,ignore
/// if let Some(greet) = request.as_any().downcast_ref::<Greet>() {
///     debug!(name = %greet.args().name, "greeting in flight");
/// }
/// ```
pub trait AnyRequest: Send + Sync {
    /// The instance identifier.
    ///
    /// Named `request_id` rather than `id` so the erased and typed views
    /// stay callable side by side without method ambiguity.
    fn request_id(&self) -> RequestId;

    /// Diagnostic name of the concrete request type.
    fn type_name(&self) -> &'static str;

    /// Access to the concrete type for downcasting.
    fn as_any(&self) -> &dyn Any;
}

impl<R: Request> AnyRequest for R {
    fn request_id(&self) -> RequestId {
        Request::id(self)
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<R>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ping {
        id: RequestId,
        args: u32,
    }

    impl Request for Ping {
        type Args = u32;
        type Output = u32;

        fn from_args(args: u32) -> Self {
            Self {
                id: RequestId::generate(),
                args,
            }
        }

        fn id(&self) -> RequestId {
            self.id
        }

        fn args(&self) -> &u32 {
            &self.args
        }
    }

    #[test]
    fn ids_are_unique_per_instance() {
        let a = Ping::from_args(7);
        let b = Ping::from_args(7);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn ids_render_as_canonical_uuid_text() {
        let rendered = Ping::from_args(0).id().to_string();
        assert_eq!(rendered.len(), 36);
        assert_eq!(rendered.matches('-').count(), 4);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn ids_round_trip_through_serde() {
        let id = RequestId::generate();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
        let back: RequestId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn erased_view_preserves_identity() {
        let ping = Ping::from_args(3);
        let id = Request::id(&ping);
        let erased: &dyn AnyRequest = &ping;
        assert_eq!(erased.request_id(), id);
        assert_eq!(erased.as_any().downcast_ref::<Ping>().unwrap().args, 3);
        assert!(erased.type_name().ends_with("Ping"));
    }
}
