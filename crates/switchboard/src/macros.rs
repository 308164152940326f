//! The [`define_request!`] declaration macro.
//!
//! Request types are plain structs carrying an id and an argument payload;
//! writing them by hand means repeating the same three impls every time.
//! `define_request!` generates the struct, an inherent `new`, the
//! [`Request`](crate::Request) impl, and the matching
//! [`Command`](crate::Command) / [`Query`](crate::Query) marker impl.
//!
//! # Example
//!
//! ```rust,ignore
//! use switchboard::define_request;
//!
//! pub struct GreetArgs {
//!     pub greetee: String,
//! }
//!
//! define_request! {
//!     /// Produces a greeting for `greetee`.
//!     pub query Greet(GreetArgs) -> String;
//!
//!     /// Records that a greeting went out.
//!     pub command RecordGreeting(String) -> ();
//! }
//!
//! let request = Greet::new(GreetArgs { greetee: "World".into() });
//! ```
//!
//! Implementing [`Request`](crate::Request) by hand remains supported for
//! types that need extra fields or a custom constructor.

/// Declares one or more request types.
///
/// Each item has the form
/// `$vis (command | query) Name(ArgsType) -> OutputType;` and may carry doc
/// comments and other attributes, which are forwarded to the generated
/// struct.
#[macro_export]
macro_rules! define_request {
    () => {};

    (
        $(#[$meta:meta])*
        $vis:vis command $name:ident ( $args:ty ) -> $output:ty ;
        $($rest:tt)*
    ) => {
        $crate::__define_request_type!($(#[$meta])* $vis $name ($args) -> $output);

        impl $crate::Command for $name {}

        $crate::define_request! { $($rest)* }
    };

    (
        $(#[$meta:meta])*
        $vis:vis query $name:ident ( $args:ty ) -> $output:ty ;
        $($rest:tt)*
    ) => {
        $crate::__define_request_type!($(#[$meta])* $vis $name ($args) -> $output);

        impl $crate::Query for $name {}

        $crate::define_request! { $($rest)* }
    };
}

/// Internal helper: emits the struct and its [`Request`](crate::Request)
/// impl. Used exclusively by [`define_request!`].
#[macro_export]
#[doc(hidden)]
macro_rules! __define_request_type {
    ($(#[$meta:meta])* $vis:vis $name:ident ( $args:ty ) -> $output:ty) => {
        $(#[$meta])*
        $vis struct $name {
            id: $crate::RequestId,
            args: $args,
        }

        impl $name {
            /// Constructs the request, assigning a fresh `RequestId`.
            $vis fn new(args: $args) -> Self {
                Self {
                    id: $crate::RequestId::generate(),
                    args,
                }
            }
        }

        impl $crate::Request for $name {
            type Args = $args;
            type Output = $output;

            fn from_args(args: $args) -> Self {
                Self::new(args)
            }

            fn id(&self) -> $crate::RequestId {
                self.id
            }

            fn args(&self) -> &$args {
                &self.args
            }
        }
    };
}
