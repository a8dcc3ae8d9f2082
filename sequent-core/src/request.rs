//! # Units of Work
//!
//! A [`Request`] is one asynchronous operation with a typed result. Requests
//! that can run through the same sequence are collected into a closed enum, a
//! [`RequestSet`], whose fieldless [`RequestSet::Kind`] discriminant is the key
//! handlers are registered under.
//!
//! Each request type in a set implements [`Member`], which ties the type to
//! its kind at compile time and converts its own output to and from the set's
//! output enum. [`request_set!`] generates all of this from a single declaration.
//!
//! [`request_set!`]: crate::request_set

use std::{fmt::Debug, hash::Hash};

/// A single unit of work producing `Output` when it succeeds.
///
/// # Example
///
/// ```rust,ignore
/// struct FetchProfile { user_id: u64 }
///
/// impl Request for FetchProfile {
///     type Output = Profile;
/// }
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a valid Request",
    label = "missing `Request` implementation",
    note = "Implement `Request` and name the `Output` type the request resolves with."
)]
pub trait Request: Send + 'static {
    /// The value the request resolves with on success.
    type Output: Debug + Send + 'static;
}

/// A closed set of requests that may run through one sequence.
///
/// Usually generated by [`request_set!`](crate::request_set).
pub trait RequestSet: Send + 'static {
    /// Fieldless discriminant identifying each variant.
    type Kind: Copy + Eq + Hash + Debug + Send + Sync + 'static;

    /// Output enum with one variant per request variant.
    type Output: Debug + Send + 'static;

    /// The kind of this request.
    fn kind(&self) -> Self::Kind;

    /// The kind of request an output belongs to.
    fn output_kind(output: &Self::Output) -> Self::Kind;
}

/// A request type that is one variant of the set `S`.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a member of the request set `{S}`",
    label = "not declared in `{S}`",
    note = "Add `{Self}` as a variant of `{S}` in its `request_set!` declaration."
)]
pub trait Member<S: RequestSet>: Request + Into<S> {
    /// The kind this request type is registered under.
    const KIND: S::Kind;

    /// Extract this request's output from the set's output, if the variant matches.
    fn from_output(output: S::Output) -> Option<Self::Output>;

    /// Wrap this request's output into the set's output.
    fn into_output(output: Self::Output) -> S::Output;
}

/// Declares a request set: the request enum, its kind enum and its output enum.
///
/// Every variant wraps a type implementing [`Request`]. The macro generates
///
/// - the request enum, carrying the given attributes
/// - a `Copy + Eq + Hash + Debug` kind enum with one fieldless variant per request
/// - an output enum holding each request's `Output`
/// - [`RequestSet`] for the request enum and [`Member`] for every wrapped type
/// - `From<Inner>` for the request enum
///
/// # Example
///
/// ```rust,ignore
/// request_set! {
///     #[derive(Debug)]
///     pub enum ApiRequest: ApiKind => ApiOutput {
///         FetchProfile(FetchProfile),
///         FetchScore(FetchScore),
///     }
/// }
///
/// assert_eq!(<FetchProfile as Member<ApiRequest>>::KIND, ApiKind::FetchProfile);
/// ```
#[macro_export]
macro_rules! request_set {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : $kind:ident => $output:ident {
            $(
                $variant:ident($inner:ty)
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis enum $name {
            $(
                $variant($inner),
            )+
        }

        #[doc = concat!("Kind discriminant of [`", stringify!($name), "`].")]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $kind {
            $(
                #[allow(missing_docs)]
                $variant,
            )+
        }

        #[doc = concat!("Outputs of [`", stringify!($name), "`].")]
        #[derive(Debug)]
        $vis enum $output {
            $(
                #[allow(missing_docs)]
                $variant(<$inner as $crate::Request>::Output),
            )+
        }

        impl $output {
            /// The kind of request this output belongs to.
            #[allow(dead_code)]
            pub fn kind(&self) -> $kind {
                match self {
                    $(
                        Self::$variant(_) => $kind::$variant,
                    )+
                }
            }
        }

        impl $crate::RequestSet for $name {
            type Kind = $kind;
            type Output = $output;

            fn kind(&self) -> $kind {
                match self {
                    $(
                        Self::$variant(_) => $kind::$variant,
                    )+
                }
            }

            fn output_kind(output: &$output) -> $kind {
                output.kind()
            }
        }

        $(
            impl From<$inner> for $name {
                fn from(inner: $inner) -> Self {
                    Self::$variant(inner)
                }
            }

            impl $crate::Member<$name> for $inner {
                const KIND: $kind = $kind::$variant;

                #[allow(unreachable_patterns)]
                fn from_output(output: $output) -> Option<<$inner as $crate::Request>::Output> {
                    match output {
                        $output::$variant(inner) => Some(inner),
                        _ => None,
                    }
                }

                fn into_output(output: <$inner as $crate::Request>::Output) -> $output {
                    $output::$variant(output)
                }
            }
        )+
    };
}
