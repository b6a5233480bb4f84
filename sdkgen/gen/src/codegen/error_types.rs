//! Structured error types (`errors.rs`).
//!
//! Each declared error becomes a struct embedding the generic
//! `crate::core::ApiError` plus the typed body. `decode` fills it from a raw
//! error response and stamps the declared status code, so errors without a
//! body still satisfy the same contract.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use sdkgen_ir::{ErrorDeclaration, Literal};

use crate::codegen::doc_attrs;
use crate::errors::GeneratorError;
use crate::scope::Namespace;
use crate::type_mapper::{TypeMapper, UsageContext, literal_accessor_type, literal_value};

/// How an error's body is stored.
enum ErrorBody<'a> {
    None,
    Literal(&'a Literal),
    Typed { ty: TokenStream, optional: bool },
}

/// Generates the struct and impls for one declared error.
pub fn generate_error_type(
    declaration: &ErrorDeclaration,
    mapper: &TypeMapper<'_>,
    scope: &mut dyn Namespace,
) -> Result<TokenStream, GeneratorError> {
    let name = format_ident!("{}", declaration.name.name.safe_pascal_case());
    let docs = doc_attrs(declaration.docs.as_deref());
    let status_code = declaration.status_code;
    let display_name = declaration.name.name.original();
    let context = UsageContext::Local(&declaration.name.package);

    let body = match &declaration.type_ {
        None => ErrorBody::None,
        Some(reference) => match reference.as_literal() {
            Some(literal) => ErrorBody::Literal(literal),
            None => ErrorBody::Typed {
                ty: mapper.map_type(reference, context, scope)?,
                optional: reference.is_optional(),
            },
        },
    };

    let (field, decode_body, construct, accessor, serialize) = match &body {
        ErrorBody::None => (
            quote! {},
            quote! {},
            quote! { Ok(Self { api_error }) },
            quote! {},
            quote! { serializer.serialize_none() },
        ),
        ErrorBody::Literal(literal) => {
            let value = literal_value(literal);
            let accessor_ty = literal_accessor_type(literal);
            let (decoded_ty, serialize) = match literal {
                Literal::String(_) => (quote! { String }, quote! { serializer.serialize_str(#value) }),
                Literal::Boolean(_) => (quote! { bool }, quote! { serializer.serialize_bool(#value) }),
            };
            (
                quote! {},
                quote! {
                    let value: #decoded_ty = serde_json::from_slice(data)?;
                    if value != #value {
                        return Err(serde::de::Error::custom(format!(
                            "expected literal {:?}, but found {:?}",
                            #value, value
                        )));
                    }
                },
                quote! { Ok(Self { api_error }) },
                quote! {
                    /// The fixed body of this error.
                    pub fn body(&self) -> #accessor_ty {
                        #value
                    }
                },
                serialize,
            )
        }
        ErrorBody::Typed { ty, optional } => {
            let decode = if *optional {
                quote! {
                    let body: #ty = if data.is_empty() {
                        None
                    } else {
                        serde_json::from_slice(data)?
                    };
                }
            } else {
                quote! { let body: #ty = serde_json::from_slice(data)?; }
            };
            (
                quote! { pub body: #ty, },
                decode,
                quote! { Ok(Self { api_error, body }) },
                quote! {},
                quote! { serde::Serialize::serialize(&self.body, serializer) },
            )
        }
    };

    Ok(quote! {
        #docs
        #[derive(Debug, Clone)]
        pub struct #name {
            pub api_error: crate::core::ApiError,
            #field
        }

        impl #name {
            /// Decodes the error from a raw response body.
            pub fn decode(
                mut api_error: crate::core::ApiError,
                data: &[u8],
            ) -> Result<Self, serde_json::Error> {
                api_error.status_code = #status_code;
                #decode_body
                #construct
            }

            #accessor
        }

        impl std::fmt::Display for #name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}: {}", #display_name, self.api_error)
            }
        }

        impl std::error::Error for #name {
            fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
                Some(&self.api_error)
            }
        }

        impl serde::Serialize for #name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                #serialize
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::format_generated_code;
    use crate::registry::TypeRegistry;
    use crate::scope::Scope;
    use sdkgen_ir::{IntermediateRepresentation, PackagePath, TypeReference};

    fn generate(declaration: ErrorDeclaration) -> String {
        let ir = IntermediateRepresentation::new("acme");
        let mapper = TypeMapper::new(TypeRegistry::new(&ir));
        let mut scope = Scope::new("errors.rs");
        let tokens = generate_error_type(&declaration, &mapper, &mut scope).unwrap();
        format_generated_code(&tokens).unwrap()
    }

    #[test]
    fn typed_body_error() {
        let code = generate(ErrorDeclaration::new(
            "error:NotFoundError",
            PackagePath::root(),
            "NotFoundError",
            404,
            Some(TypeReference::string()),
        ));
        assert!(code.contains("pub struct NotFoundError {"));
        assert!(code.contains("pub api_error: crate::core::ApiError,"));
        assert!(code.contains("pub body: String,"));
        assert!(code.contains("api_error.status_code = 404u16;"));
        assert!(code.contains("let body: String = serde_json::from_slice(data)?;"));
        assert!(code.contains("Some(&self.api_error)"));
    }

    #[test]
    fn optional_body_accepts_empty_data() {
        let code = generate(ErrorDeclaration::new(
            "error:ConflictError",
            PackagePath::root(),
            "ConflictError",
            409,
            Some(TypeReference::optional(TypeReference::string())),
        ));
        assert!(code.contains("if data.is_empty() {"));
        assert!(code.contains("pub body: Option<String>,"));
    }

    #[test]
    fn literal_body_is_asserted() {
        let code = generate(ErrorDeclaration::new(
            "error:GoneError",
            PackagePath::root(),
            "GoneError",
            410,
            Some(TypeReference::literal_string("gone")),
        ));
        assert!(code.contains("expected literal {:?}, but found {:?}"));
        assert!(code.contains("pub fn body(&self) -> &'static str {"));
        assert!(code.contains("serializer.serialize_str(\"gone\")"));
        assert!(!code.contains("pub body:"));
    }

    #[test]
    fn bodiless_error_sets_status_only() {
        let code = generate(ErrorDeclaration::new(
            "error:UnauthorizedError",
            PackagePath::root(),
            "UnauthorizedError",
            401,
            None,
        ));
        assert!(code.contains("api_error.status_code = 401u16;"));
        assert!(code.contains("Ok(Self { api_error })"));
        assert!(code.contains("serializer.serialize_none()"));
    }
}
