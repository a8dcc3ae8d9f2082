//! Procedural macros for `sequent`.

use proc_macro::TokenStream;

mod request;

/// Derive macro for implementing the `Request` trait.
///
/// The output type is declared with `#[request(output = Type)]` and defaults
/// to `()`.
///
/// ```rust,ignore
/// #[derive(Debug, Request)]
/// #[request(output = Profile)]
/// struct FetchProfile {
///     user_id: u64,
/// }
/// ```
#[proc_macro_derive(Request, attributes(request))]
pub fn derive_request(input: TokenStream) -> TokenStream {
    request::derive_request(input)
}
