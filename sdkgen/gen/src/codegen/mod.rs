//! Code generation for the individual pieces of a generated SDK.
//!
//! Each submodule turns one part of the IR into a `TokenStream`. Assembly
//! into files, validation and formatting happen in [`crate::output`].

pub mod client;
pub mod client_options;
pub mod endpoint;
pub mod environments;
pub mod error_types;
pub mod models;
pub mod optional;
pub mod request_types;

use proc_macro2::TokenStream;
use quote::quote;

pub use client::{GeneratedClient, generate_client};
pub use client_options::{generate_client_options_definition, generate_options};
pub use endpoint::{EndpointContext, ResolvedEndpoint};
pub use environments::generate_environments;
pub use error_types::generate_error_type;
pub use models::generate_type_declaration;
pub use optional::generate_optional_helpers;
pub use request_types::generate_request_type;

/// Renders documentation as `#[doc]` attributes, one per line.
///
/// Empty or missing docs render nothing.
pub fn doc_attrs(docs: Option<&str>) -> TokenStream {
    let Some(docs) = docs.map(str::trim).filter(|d| !d.is_empty()) else {
        return TokenStream::new();
    };
    let lines = docs.lines().map(|line| format!(" {}", line.trim_end()));
    quote! { #(#[doc = #lines])* }
}

/// Formats generated code using prettyplease.
///
/// ## Errors
///
/// Returns an error string if the code fails to parse.
pub fn format_generated_code(tokens: &TokenStream) -> Result<String, String> {
    let file = syn::parse2::<syn::File>(tokens.clone()).map_err(|e| e.to_string())?;
    Ok(prettyplease::unparse(&file))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doc_attrs_renders_each_line() {
        let tokens = doc_attrs(Some("Returns a user.\nFails when missing."));
        let code = format_generated_code(&quote! { #tokens pub struct User; }).unwrap();
        assert!(code.contains("/// Returns a user."));
        assert!(code.contains("/// Fails when missing."));
    }

    #[test]
    fn doc_attrs_skips_blank_docs() {
        assert!(doc_attrs(Some("  ")).is_empty());
        assert!(doc_attrs(None).is_empty());
    }
}
