//! Request wrapper types (`requests.rs`).
//!
//! A wrapper aggregates an endpoint's headers, query parameters and body
//! into the single `request` argument of the generated method. Header and
//! query fields never reach the JSON body (`#[serde(skip)]`). Literal inputs
//! are not stored at all: they are exposed through accessors returning the
//! constant, injected when serializing and asserted when deserializing.
//!
//! Field names are allocated by [`RequestLayout`], which the endpoint
//! generator rebuilds to refer to the same fields.

use proc_macro2::{Ident, TokenStream};
use quote::{format_ident, quote};
use sdkgen_ir::{
    HttpEndpoint, HttpHeader, Literal, ObjectProperty, QueryParameter, SdkRequestShape,
    TypeReference,
};

use crate::codegen::doc_attrs;
use crate::codegen::models::{
    LiteralProperty, PropertyField, literal_accessor, literal_assertion, mirror_serde,
    property_field,
};
use crate::errors::GeneratorError;
use crate::scope::{Namespace, Scope};
use crate::type_mapper::{TypeMapper, UsageContext, literal_type, literal_value};
use crate::visitors::RequestBodyModel;

/// Where a wrapper input lives.
#[derive(Debug, Clone, PartialEq)]
pub enum Binding<'ir> {
    /// A public field of the wrapper.
    Field(String),
    /// A constant exposed through an accessor method.
    Literal {
        accessor: String,
        literal: &'ir Literal,
    },
}

/// An IR input together with its binding on the wrapper.
#[derive(Debug, Clone)]
pub struct Slot<'ir, T> {
    pub item: &'ir T,
    pub binding: Binding<'ir>,
}

/// The body of a reference-body wrapper.
#[derive(Debug, Clone)]
pub struct ReferenceSlot<'ir> {
    pub body_type: &'ir TypeReference,
    pub binding: Binding<'ir>,
}

/// Names of every input carried by an endpoint's wrapper type.
#[derive(Debug, Clone)]
pub struct RequestLayout<'ir> {
    pub type_name: String,
    pub headers: Vec<Slot<'ir, HttpHeader>>,
    pub query: Vec<Slot<'ir, QueryParameter>>,
    pub body: Vec<Slot<'ir, ObjectProperty>>,
    pub reference: Option<ReferenceSlot<'ir>>,
}

impl<'ir> RequestLayout<'ir> {
    /// Lays out the wrapper of an endpoint.
    ///
    /// Returns `None` when the endpoint takes no wrapper: it has no SDK
    /// request, passes its body type directly, or has nothing to carry.
    pub fn new(endpoint: &'ir HttpEndpoint, body: Option<&RequestBodyModel<'ir>>) -> Option<Self> {
        let sdk_request = endpoint.sdk_request.as_ref()?;
        let SdkRequestShape::Wrapper {
            wrapper_name,
            body_key,
        } = &sdk_request.shape
        else {
            return None;
        };
        if !endpoint.needs_request_parameter() {
            return None;
        }

        let type_name = wrapper_name.safe_pascal_case();
        let mut fields = Scope::new(type_name.as_str());
        let mut bind = |candidate: String, reference: &'ir TypeReference| {
            let name = fields.add_local(&candidate);
            match reference.as_literal() {
                Some(literal) => Binding::Literal {
                    accessor: name,
                    literal,
                },
                None => Binding::Field(name),
            }
        };

        let headers = endpoint
            .headers
            .iter()
            .map(|header| Slot {
                item: header,
                binding: bind(header.name.name.safe_snake_case(), &header.value_type),
            })
            .collect();
        let query = endpoint
            .query_parameters
            .iter()
            .map(|parameter| Slot {
                item: parameter,
                binding: bind(parameter.name.name.safe_snake_case(), &parameter.value_type),
            })
            .collect();
        let (body, reference) = match body {
            Some(RequestBodyModel::Reference(body_type)) => {
                let body_type: &'ir TypeReference = body_type;
                let binding = bind(body_key.safe_snake_case(), body_type);
                (Vec::new(), Some(ReferenceSlot { body_type, binding }))
            }
            Some(model) => {
                let slots = model
                    .properties()
                    .map(|p| p.declared_order())
                    .unwrap_or_default()
                    .iter()
                    .map(|property| Slot {
                        item: *property,
                        binding: bind(property.name.name.safe_snake_case(), &property.value_type),
                    })
                    .collect();
                (slots, None)
            }
            None => (Vec::new(), None),
        };

        Some(Self {
            type_name,
            headers,
            query,
            body,
            reference,
        })
    }

    /// Body properties with a fixed value, with their accessor names.
    pub fn body_literals(&self) -> impl Iterator<Item = (&'ir ObjectProperty, &str, &'ir Literal)> {
        self.body.iter().filter_map(|slot| match &slot.binding {
            Binding::Literal { accessor, literal } => Some((slot.item, accessor.as_str(), *literal)),
            Binding::Field(_) => None,
        })
    }
}

/// A stored field of the wrapper. Serde attributes are only rendered when
/// the wrapper derives serde.
struct WrapperField {
    ident: Ident,
    ty: TokenStream,
    serde_attrs: TokenStream,
    docs: TokenStream,
}

impl WrapperField {
    fn render(&self, with_serde: bool) -> TokenStream {
        let Self {
            ident,
            ty,
            serde_attrs,
            docs,
        } = self;
        let serde_attrs = with_serde.then_some(serde_attrs);
        quote! {
            #docs
            #serde_attrs
            pub #ident: #ty,
        }
    }
}

/// Collects the pieces of one wrapper type.
#[derive(Default)]
struct WrapperParts {
    fields: Vec<WrapperField>,
    accessors: Vec<TokenStream>,
    /// Header and query fields, restored with `Default::default()` on
    /// deserialization.
    skipped: Vec<Ident>,
    body_fields: Vec<PropertyField>,
    reference_field: Option<Ident>,
}

impl WrapperParts {
    fn push_input(
        &mut self,
        binding: &Binding<'_>,
        ty: impl FnOnce() -> Result<TokenStream, GeneratorError>,
        docs: Option<&str>,
    ) -> Result<(), GeneratorError> {
        match binding {
            Binding::Field(field) => {
                let ident = format_ident!("{}", field);
                self.fields.push(WrapperField {
                    ident: ident.clone(),
                    ty: ty()?,
                    serde_attrs: quote! { #[serde(skip)] },
                    docs: doc_attrs(docs),
                });
                self.skipped.push(ident);
            }
            Binding::Literal { accessor, literal } => {
                self.accessors.push(literal_accessor(&format_ident!("{}", accessor), literal, docs));
            }
        }
        Ok(())
    }
}

/// Generates the wrapper type laid out by `layout`.
///
/// `scope` is the file scope of the package's `requests.rs`, where imports
/// and private helper types are bound.
pub fn generate_request_type(
    layout: &RequestLayout<'_>,
    body: Option<&RequestBodyModel<'_>>,
    mapper: &TypeMapper<'_>,
    context: UsageContext<'_>,
    scope: &mut Scope,
    generic_optionals: bool,
) -> Result<TokenStream, GeneratorError> {
    let name = format_ident!("{}", layout.type_name);
    let mut parts = WrapperParts::default();

    for slot in &layout.headers {
        let value_type = &slot.item.value_type;
        parts.push_input(
            &slot.binding,
            || mapper.map_type(value_type, context, scope),
            slot.item.docs.as_deref(),
        )?;
    }
    for slot in &layout.query {
        let parameter = slot.item;
        parts.push_input(
            &slot.binding,
            || {
                let ty = mapper.map_type(&parameter.value_type, context, scope)?;
                Ok(if parameter.allow_multiple {
                    quote! { Vec<#ty> }
                } else {
                    ty
                })
            },
            parameter.docs.as_deref(),
        )?;
    }

    let generic_optionals = generic_optionals && matches!(body, Some(RequestBodyModel::Inlined(_)));
    for slot in &layout.body {
        match &slot.binding {
            Binding::Field(field) => {
                let mut property = property_field(
                    slot.item,
                    mapper,
                    context,
                    &mut Scope::default(),
                    scope,
                    generic_optionals,
                )?;
                property.ident = format_ident!("{}", field);
                parts.fields.push(WrapperField {
                    ident: property.ident.clone(),
                    ty: property.ty.clone(),
                    serde_attrs: property.serde_attrs.clone(),
                    docs: property.docs.clone(),
                });
                parts.body_fields.push(property);
            }
            Binding::Literal { accessor, literal } => {
                let accessor = format_ident!("{}", accessor);
                parts
                    .accessors
                    .push(literal_accessor(&accessor, literal, slot.item.docs.as_deref()));
            }
        }
    }

    if let Some(reference) = &layout.reference {
        match &reference.binding {
            Binding::Field(field) => {
                let ident = format_ident!("{}", field);
                parts.fields.push(WrapperField {
                    ident: ident.clone(),
                    ty: mapper.map_type(reference.body_type, context, scope)?,
                    serde_attrs: TokenStream::new(),
                    docs: TokenStream::new(),
                });
                parts.reference_field = Some(ident);
            }
            Binding::Literal { accessor, literal } => {
                parts.accessors.push(literal_accessor(&format_ident!("{}", accessor), literal, None));
            }
        }
    }

    let derives_serde = body.is_some_and(|b| !b.needs_custom_serde());
    let fields = parts.fields.iter().map(|f| f.render(derives_serde));
    let accessors = &parts.accessors;
    let accessors_impl = (!accessors.is_empty()).then(|| {
        quote! {
            impl #name {
                #(#accessors)*
            }
        }
    });
    let derives = if derives_serde {
        quote! { #[derive(Debug, Clone, serde::Serialize, serde::Deserialize)] }
    } else {
        quote! { #[derive(Debug, Clone)] }
    };

    let serde_impls = match body {
        Some(body) if body.needs_custom_serde() => match &layout.reference {
            Some(reference) => reference_serde(&name, reference, &parts),
            None => {
                let wire = format_ident!("{}", scope.add_local(&format!("{}Wire", layout.type_name)));
                wire_serde(&name, &wire, layout, &parts)
            }
        },
        _ => TokenStream::new(),
    };

    Ok(quote! {
        #derives
        pub struct #name {
            #(#fields)*
        }

        #accessors_impl

        #serde_impls
    })
}

/// Serde impls for a body holding literals.
fn wire_serde(name: &Ident, wire: &Ident, layout: &RequestLayout<'_>, parts: &WrapperParts) -> TokenStream {
    let literals: Vec<LiteralProperty<'_>> = layout
        .body_literals()
        .map(|(property, accessor, literal)| LiteralProperty {
            accessor: format_ident!("{}", accessor),
            wire: property.name.wire_value.clone(),
            literal,
        })
        .collect();
    mirror_serde(name, wire, &parts.body_fields, &literals, &parts.skipped)
}

/// Serde impls for a reference body: only the body is (de)serialized.
fn reference_serde(name: &Ident, reference: &ReferenceSlot<'_>, parts: &WrapperParts) -> TokenStream {
    let skipped = parts.skipped.iter().map(|field| quote! { #field: Default::default(), });
    match (&reference.binding, &parts.reference_field) {
        (Binding::Field(_), Some(field)) => quote! {
            impl serde::Serialize for #name {
                fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                    serde::Serialize::serialize(&self.#field, serializer)
                }
            }

            impl<'de> serde::Deserialize<'de> for #name {
                fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                    Ok(Self {
                        #field: serde::Deserialize::deserialize(deserializer)?,
                        #(#skipped)*
                    })
                }
            }
        },
        (Binding::Literal { literal, .. }, _) => {
            let ty = literal_type(literal);
            let value = literal_value(literal);
            let assertion = literal_assertion(quote! { body }, literal);
            quote! {
                impl serde::Serialize for #name {
                    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                        serde::Serialize::serialize(&#value, serializer)
                    }
                }

                impl<'de> serde::Deserialize<'de> for #name {
                    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                        let body = <#ty as serde::Deserialize>::deserialize(deserializer)?;
                        #assertion
                        Ok(Self {
                            #(#skipped)*
                        })
                    }
                }
            }
        }
        (Binding::Field(_), None) => TokenStream::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::format_generated_code;
    use crate::registry::TypeRegistry;
    use sdkgen_ir::{
        FileProperty, FileUploadProperty, HttpMethod, HttpRequestBody, IntermediateRepresentation,
        Name, NameAndWireValue, PackagePath, PrimitiveType,
    };

    fn generate(endpoint: &HttpEndpoint, generic_optionals: bool) -> Option<String> {
        let ir = IntermediateRepresentation::new("acme");
        let mapper = TypeMapper::new(TypeRegistry::new(&ir));
        let body = endpoint
            .request_body
            .as_ref()
            .map(|b| RequestBodyModel::from_endpoint(endpoint, b).unwrap());
        let layout = RequestLayout::new(endpoint, body.as_ref())?;
        let mut scope = Scope::new("requests.rs");
        let root = PackagePath::root();
        let tokens = generate_request_type(
            &layout,
            body.as_ref(),
            &mapper,
            UsageContext::Local(&root),
            &mut scope,
            generic_optionals,
        )
        .unwrap();
        Some(format_generated_code(&tokens).unwrap())
    }

    fn create_user(properties: Vec<ObjectProperty>) -> HttpEndpoint {
        HttpEndpoint::new("createUser", HttpMethod::Post, "/users")
            .with_wrapper("request")
            .with_header(HttpHeader::new(
                "X-Request-Id",
                "requestId",
                TypeReference::optional(TypeReference::string()),
            ))
            .with_body(HttpRequestBody::Inlined {
                name: Name::new("CreateUserRequest"),
                properties,
                docs: None,
            })
    }

    #[test]
    fn plain_body_derives_serde() {
        let code = generate(
            &create_user(vec![ObjectProperty::new("name", TypeReference::string())]),
            false,
        )
        .unwrap();
        assert!(code.contains("#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]"));
        assert!(code.contains("#[serde(skip)]"));
        assert!(code.contains("pub request_id: Option<String>,"));
        assert!(code.contains("pub name: String,"));
        assert!(!code.contains("impl serde::Serialize"));
    }

    #[test]
    fn literal_body_property_uses_wire_mirror() {
        let code = generate(
            &create_user(vec![
                ObjectProperty::new("name", TypeReference::string()),
                ObjectProperty::new("kind", TypeReference::literal_string("user")),
            ]),
            false,
        )
        .unwrap();
        assert!(code.contains("struct CreateUserRequestWire {"));
        assert!(code.contains("pub fn kind(&self) -> &'static str {"));
        assert!(code.contains("kind: \"user\".to_string(),"));
        assert!(code.contains("expected literal {:?}, but found {:?}"));
        assert!(code.contains("request_id: Default::default(),"));
        assert!(!code.contains("pub kind:"));
    }

    #[test]
    fn literal_query_parameter_is_accessor_only() {
        let endpoint = HttpEndpoint::new("search", HttpMethod::Get, "/search")
            .with_wrapper("request")
            .with_query(QueryParameter::new("version", TypeReference::literal_string("v2")))
            .with_query(QueryParameter::new("tag", TypeReference::string()).multiple());
        let code = generate(&endpoint, false).unwrap();
        assert!(code.contains("#[derive(Debug, Clone)]"));
        assert!(code.contains("pub fn version(&self) -> &'static str {"));
        assert!(code.contains("pub tag: Vec<String>,"));
    }

    #[test]
    fn reference_body_serializes_body_only() {
        let endpoint = HttpEndpoint::new("update", HttpMethod::Put, "/users/{userId}")
            .with_wrapper("request")
            .with_query(QueryParameter::new(
                "dryRun",
                TypeReference::optional(TypeReference::primitive(PrimitiveType::Boolean)),
            ))
            .with_body(HttpRequestBody::Reference {
                request_body_type: TypeReference::map(TypeReference::string(), TypeReference::string()),
            });
        let code = generate(&endpoint, false).unwrap();
        assert!(code.contains("pub body: std::collections::HashMap<String, String>,"));
        assert!(code.contains("serde::Serialize::serialize(&self.body, serializer)"));
        assert!(code.contains("dry_run: Default::default(),"));
    }

    #[test]
    fn generic_optionals_apply_to_inlined_bodies() {
        let code = generate(
            &create_user(vec![ObjectProperty::new(
                "nickname",
                TypeReference::optional(TypeReference::string()),
            )]),
            true,
        )
        .unwrap();
        assert!(code.contains("pub nickname: crate::core::Optional<String>,"));
        assert!(code.contains("crate::core::Optional::is_omitted"));
    }

    #[test]
    fn files_only_upload_has_no_wrapper() {
        let endpoint = HttpEndpoint::new("upload", HttpMethod::Post, "/files")
            .with_wrapper("request")
            .with_body(HttpRequestBody::FileUpload {
                name: Name::new("UploadRequest"),
                properties: vec![FileUploadProperty::File(FileProperty {
                    key: NameAndWireValue::new("file"),
                    is_optional: false,
                })],
            });
        assert!(generate(&endpoint, false).is_none());
    }

    #[test]
    fn colliding_inputs_get_distinct_fields() {
        let endpoint = HttpEndpoint::new("search", HttpMethod::Get, "/search")
            .with_wrapper("request")
            .with_header(HttpHeader::new("X-Type", "type", TypeReference::string()))
            .with_query(QueryParameter::new("type", TypeReference::string()));
        let code = generate(&endpoint, false).unwrap();
        assert!(code.contains("pub type_: String,"));
        assert!(code.contains("pub type_2: String,"));
    }
}
