//! Per-dispatch request context.
//!
//! A [`RequestContext`] is a cloneable key-value bag threaded through a
//! single dispatch: middleware write cross-cutting data into it, handlers
//! (and later middleware) read it back. Keys are typed tokens, so one
//! context holds heterogeneous values while every `get`/`put` call site
//! stays type-checked.
//!
//! Each [`Mediator`](crate::Mediator) owns one base context; every `send`
//! clones it, so concurrent dispatches never observe each other's mutations
//! and nothing written during one dispatch leaks into the next.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// A typed context key with a `&'static str` identity.
///
/// Keys are intended to be process-wide singletons declared at module scope
/// and shared by reference between the middleware that writes a value and
/// the handler that reads it:
///
/// ```rust,ignore
/// static AUTHENTICATED: ContextKey<bool> = ContextKey::new("authenticated");
/// ```
///
/// The string id must be unique within the process. Two keys sharing an id
/// but declared with different value types do not alias: the typed lookup
/// fails the downcast and reports the entry as absent.
pub struct ContextKey<T> {
    id: &'static str,
    _value: PhantomData<fn() -> T>,
}

impl<T> ContextKey<T> {
    /// Creates a key with the given identity. `const`, so keys can live in
    /// `static` items.
    pub const fn new(id: &'static str) -> Self {
        Self {
            id,
            _value: PhantomData,
        }
    }

    /// The key's string identity.
    pub fn id(&self) -> &'static str {
        self.id
    }
}

impl<T> Clone for ContextKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ContextKey<T> {}

impl<T> fmt::Debug for ContextKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ContextKey").field(&self.id).finish()
    }
}

/// The mutable key-value bag flowing through one dispatch.
///
/// Values are stored behind `Arc`, so [`clone`](Clone::clone) is O(size):
/// it copies the map and shares the (immutable) stored values. Mutations on
/// either side after the clone are invisible to the other.
#[derive(Default, Clone)]
pub struct RequestContext {
    entries: HashMap<&'static str, Arc<dyn Any + Send + Sync>>,
}

impl RequestContext {
    /// Creates an empty context.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the value stored under `key`, or `None` if absent.
    ///
    /// Absence is not an error; callers coalesce with
    /// `unwrap_or`/`map_or` as appropriate.
    pub fn get<T: Any + Send + Sync>(&self, key: &ContextKey<T>) -> Option<&T> {
        self.entries.get(key.id).and_then(|v| v.downcast_ref())
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub fn put<T: Any + Send + Sync>(&mut self, key: &ContextKey<T>, value: T) {
        self.entries.insert(key.id, Arc::new(value));
    }

    /// Reports whether a value of the key's type is stored under `key`.
    pub fn has<T: Any + Send + Sync>(&self, key: &ContextKey<T>) -> bool {
        self.get(key).is_some()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if the context holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("len", &self.entries.len())
            .finish()
    }
}
