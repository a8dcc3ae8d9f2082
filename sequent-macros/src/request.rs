//! `#[derive(Request)]`.

use proc_macro::TokenStream;
use quote::quote;
use syn::{
    DeriveInput, Ident, Token, Type,
    parse::{Parse, ParseStream},
    parse_macro_input,
};

/// Arguments of the `#[request(...)]` attribute.
pub(crate) struct RequestArgs {
    pub output: Option<Type>,
}

impl Parse for RequestArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut output = None;

        while !input.is_empty() {
            let ident: Ident = input.parse()?;
            input.parse::<Token![=]>()?;

            match ident.to_string().as_str() {
                "output" => {
                    if output.is_some() {
                        return Err(syn::Error::new(ident.span(), "duplicate `output`"));
                    }
                    output = Some(input.parse()?);
                }
                other => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown attribute: {}", other),
                    ));
                }
            }

            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(RequestArgs { output })
    }
}

pub(crate) fn derive_request(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(expanded) => expanded.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let mut output = None;
    for attr in input.attrs.iter().filter(|a| a.path().is_ident("request")) {
        let args: RequestArgs = attr.parse_args()?;
        if let Some(ty) = args.output {
            if output.is_some() {
                return Err(syn::Error::new_spanned(attr, "duplicate `output`"));
            }
            output = Some(ty);
        }
    }

    // No output declared means the request only reports completion.
    let output = output.unwrap_or_else(|| syn::parse_quote!(()));

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::sequent::Request for #name #ty_generics #where_clause {
            type Output = #output;
        }
    })
}
