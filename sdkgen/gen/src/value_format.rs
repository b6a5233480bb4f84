//! Rendering of typed values into string transport slots.
//!
//! Headers, query parameters and multipart text fields carry strings. A
//! [`TransportFormat`] describes how to get from a typed field to that
//! string: how many `Option` layers must be matched away first, and which
//! transform applies to the underlying primitive.
//!
//! | underlying primitive | rendered as |
//! |---|---|
//! | dateTime | `value.to_rfc3339()` |
//! | date | `value.format("%Y-%m-%d").to_string()` |
//! | base64 | standard base64 of the bytes |
//! | anything else | `value.to_string()` |

use proc_macro2::{Ident, TokenStream};
use quote::quote;
use sdkgen_ir::{PrimitiveType, TypeReference};

/// The transform applied to the unwrapped value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    PassThrough,
    DateTime,
    Date,
    Base64,
}

/// How a value of some type is turned into a transport string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportFormat {
    pub transform: Transform,
    /// Number of `Option` layers wrapping the value.
    pub optional_depth: usize,
    /// Whether a presence guard is required before emission.
    pub is_optional: bool,
    /// Whether the value is a primitive once options are unwrapped.
    pub is_primitive: bool,
}

/// Computes the transport format of a type reference.
///
/// Optionality unwraps exactly once per `Optional` layer, so an optional
/// base64 value is both unwrapped and encoded.
pub fn format_for_transport(reference: &TypeReference) -> TransportFormat {
    let mut optional_depth = 0;
    let mut current = reference;
    while let Some(inner) = current.as_optional() {
        optional_depth += 1;
        current = inner;
    }
    let primitive = reference.underlying_primitive();
    let transform = match primitive {
        Some(PrimitiveType::DateTime) => Transform::DateTime,
        Some(PrimitiveType::Date) => Transform::Date,
        Some(PrimitiveType::Base64) => Transform::Base64,
        _ => Transform::PassThrough,
    };
    TransportFormat {
        transform,
        optional_depth,
        is_optional: optional_depth > 0,
        is_primitive: primitive.is_some(),
    }
}

impl TransportFormat {
    /// Renders a `String` expression from an unwrapped value expression.
    pub fn render(&self, value: TokenStream) -> TokenStream {
        match self.transform {
            Transform::PassThrough => quote! { #value.to_string() },
            Transform::DateTime => quote! { #value.to_rfc3339() },
            Transform::Date => quote! { #value.format("%Y-%m-%d").to_string() },
            Transform::Base64 => quote! {
                base64::Engine::encode(&base64::engine::general_purpose::STANDARD, #value)
            },
        }
    }

    /// The pattern matching a present value through every `Option` layer,
    /// e.g. `Some(Some(value))` for a depth of two.
    pub fn guard_pattern(&self, binding: &Ident) -> TokenStream {
        let mut pattern = quote! { #binding };
        for _ in 0..self.optional_depth {
            pattern = quote! { Some(#pattern) };
        }
        pattern
    }

    /// Wraps `body` in a presence guard over `field` when the value is
    /// optional; `body` must refer to the value through `binding`.
    ///
    /// Non-optional values bind `binding` to a reference to `field` directly.
    pub fn guarded(&self, field: TokenStream, binding: &Ident, body: TokenStream) -> TokenStream {
        if self.is_optional {
            let pattern = self.guard_pattern(binding);
            quote! {
                if let #pattern = &#field {
                    #body
                }
            }
        } else {
            quote! {
                {
                    let #binding = &#field;
                    #body
                }
            }
        }
    }
}
