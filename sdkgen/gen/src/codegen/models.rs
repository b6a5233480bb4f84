//! Model type generation (`types.rs`).
//!
//! Objects become serde structs, enums become unit enums carrying their wire
//! values, and aliases become type aliases.
//!
//! Literal properties are never stored. They are exposed through accessors
//! returning the constant, and a private mirror struct writes them when
//! serializing and checks them when deserializing. Request wrappers share
//! this machinery.

use proc_macro2::{Ident, TokenStream};
use quote::{format_ident, quote};
use sdkgen_ir::{Literal, ObjectProperty, TypeDeclaration, TypeShape};

use crate::codegen::doc_attrs;
use crate::errors::GeneratorError;
use crate::scope::{Namespace, Scope};
use crate::type_mapper::{
    TypeMapper, UsageContext, literal_accessor_type, literal_type, literal_value,
};

/// A struct field generated from an object or body property.
#[derive(Debug, Clone)]
pub struct PropertyField {
    pub ident: Ident,
    pub wire: String,
    pub ty: TokenStream,
    pub serde_attrs: TokenStream,
    pub docs: TokenStream,
}

impl PropertyField {
    /// The field as it appears in a public struct. Serde attributes are
    /// only valid when that struct derives serde.
    pub fn declaration(&self, with_serde: bool) -> TokenStream {
        let Self {
            ident,
            ty,
            serde_attrs,
            docs,
            ..
        } = self;
        let serde_attrs = with_serde.then_some(serde_attrs);
        quote! {
            #docs
            #serde_attrs
            pub #ident: #ty,
        }
    }

    /// The field without docs or visibility, for private mirror structs.
    pub fn mirror_declaration(&self) -> TokenStream {
        let Self {
            ident,
            ty,
            serde_attrs,
            ..
        } = self;
        quote! {
            #serde_attrs
            #ident: #ty,
        }
    }
}

/// Builds the field for one property.
///
/// The field name is allocated in `fields`, the struct's namespace, while
/// imports needed by the field type are bound in `imports`. With
/// `generic_optionals`, optional properties are typed
/// `crate::core::Optional<T>` so an explicit null can be sent.
pub fn property_field(
    property: &ObjectProperty,
    mapper: &TypeMapper<'_>,
    context: UsageContext<'_>,
    fields: &mut dyn Namespace,
    imports: &mut dyn Namespace,
    generic_optionals: bool,
) -> Result<PropertyField, GeneratorError> {
    let ident = format_ident!("{}", fields.add_local(&property.name.name.safe_snake_case()));
    let wire = property.name.wire_value.clone();
    let (ty, serde_attrs) = match property.value_type.as_optional() {
        Some(inner) if generic_optionals => {
            let inner = mapper.map_type(inner, context, imports)?;
            (
                quote! { crate::core::Optional<#inner> },
                quote! {
                    #[serde(rename = #wire, default, skip_serializing_if = "crate::core::Optional::is_omitted")]
                },
            )
        }
        Some(_) => (
            mapper.map_type(&property.value_type, context, imports)?,
            quote! { #[serde(rename = #wire, default, skip_serializing_if = "Option::is_none")] },
        ),
        None => (
            mapper.map_type(&property.value_type, context, imports)?,
            quote! { #[serde(rename = #wire)] },
        ),
    };
    Ok(PropertyField {
        ident,
        wire,
        ty,
        serde_attrs,
        docs: doc_attrs(property.docs.as_deref()),
    })
}

/// A property with a fixed value, exposed through an accessor.
#[derive(Debug, Clone)]
pub struct LiteralProperty<'ir> {
    pub accessor: Ident,
    pub wire: String,
    pub literal: &'ir Literal,
}

/// The accessor method returning a literal's value.
pub fn literal_accessor(accessor: &Ident, literal: &Literal, docs: Option<&str>) -> TokenStream {
    let ty = literal_accessor_type(literal);
    let value = literal_value(literal);
    let docs = doc_attrs(docs);
    quote! {
        #docs
        pub fn #accessor(&self) -> #ty {
            #value
        }
    }
}

/// Fails deserialization unless `value` equals the expected literal.
pub fn literal_assertion(value: TokenStream, expected: &Literal) -> TokenStream {
    let expected = literal_value(expected);
    quote! {
        if #value != #expected {
            return Err(serde::de::Error::custom(format!(
                "expected literal {:?}, but found {:?}",
                #expected, #value
            )));
        }
    }
}

/// Serde impls for `name` through the private mirror struct `wire`, which
/// stores `fields` and `literals` as ordinary fields.
///
/// `defaulted` fields of `name` are not on the wire and are restored with
/// `Default::default()`.
pub fn mirror_serde(
    name: &Ident,
    wire: &Ident,
    fields: &[PropertyField],
    literals: &[LiteralProperty<'_>],
    defaulted: &[Ident],
) -> TokenStream {
    let mut wire_fields: Vec<TokenStream> =
        fields.iter().map(PropertyField::mirror_declaration).collect();
    let mut to_wire: Vec<TokenStream> = fields
        .iter()
        .map(|field| {
            let ident = &field.ident;
            quote! { #ident: self.#ident.clone(), }
        })
        .collect();
    let from_wire = fields.iter().map(|field| {
        let ident = &field.ident;
        quote! { #ident: wire.#ident, }
    });
    let defaulted = defaulted.iter().map(|field| quote! { #field: Default::default(), });
    let mut assertions = Vec::new();

    for LiteralProperty {
        accessor,
        wire: wire_name,
        literal,
    } in literals
    {
        let ty = literal_type(literal);
        let value = literal_value(literal);
        wire_fields.push(quote! {
            #[serde(rename = #wire_name)]
            #accessor: #ty,
        });
        to_wire.push(match literal {
            Literal::String(_) => quote! { #accessor: #value.to_string(), },
            Literal::Boolean(_) => quote! { #accessor: #value, },
        });
        assertions.push(literal_assertion(quote! { wire.#accessor }, literal));
    }

    quote! {
        #[derive(serde::Serialize, serde::Deserialize)]
        struct #wire {
            #(#wire_fields)*
        }

        impl serde::Serialize for #name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serde::Serialize::serialize(
                    &#wire {
                        #(#to_wire)*
                    },
                    serializer,
                )
            }
        }

        impl<'de> serde::Deserialize<'de> for #name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let wire = <#wire as serde::Deserialize>::deserialize(deserializer)?;
                #(#assertions)*
                Ok(Self {
                    #(#from_wire)*
                    #(#defaulted)*
                })
            }
        }
    }
}

/// Generates the Rust declaration of a named type.
///
/// `scope` is the file scope of the declaring package's `types.rs`.
pub fn generate_type_declaration(
    declaration: &TypeDeclaration,
    mapper: &TypeMapper<'_>,
    scope: &mut dyn Namespace,
) -> Result<TokenStream, GeneratorError> {
    let name = format_ident!("{}", declaration.name.name.safe_pascal_case());
    let docs = doc_attrs(declaration.docs.as_deref());
    let context = UsageContext::Local(&declaration.name.package);

    match &declaration.shape {
        TypeShape::Object { properties } => {
            let mut fields_scope = Scope::new(declaration.name.name.original());
            let mut fields = Vec::new();
            let mut literals = Vec::new();
            let mut accessors = Vec::new();
            for property in properties {
                match property.value_type.as_literal() {
                    Some(literal) => {
                        let accessor = format_ident!(
                            "{}",
                            fields_scope.add_local(&property.name.name.safe_snake_case())
                        );
                        accessors.push(literal_accessor(&accessor, literal, property.docs.as_deref()));
                        literals.push(LiteralProperty {
                            accessor,
                            wire: property.name.wire_value.clone(),
                            literal,
                        });
                    }
                    None => fields.push(property_field(
                        property,
                        mapper,
                        context,
                        &mut fields_scope,
                        scope,
                        false,
                    )?),
                }
            }
            if literals.is_empty() {
                let declarations = fields.iter().map(|field| field.declaration(true));
                return Ok(quote! {
                    #docs
                    #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
                    pub struct #name {
                        #(#declarations)*
                    }
                });
            }

            let declarations = fields.iter().map(|field| field.declaration(false));
            let wire = format_ident!("{}", scope.add_local(&format!("{}Wire", name)));
            let serde_impls = mirror_serde(&name, &wire, &fields, &literals, &[]);
            Ok(quote! {
                #docs
                #[derive(Debug, Clone, PartialEq)]
                pub struct #name {
                    #(#declarations)*
                }

                impl #name {
                    #(#accessors)*
                }

                #serde_impls
            })
        }
        TypeShape::Enum { values } => {
            let mut variants_scope = Scope::new(declaration.name.name.original());
            let mut variants = Vec::with_capacity(values.len());
            let mut arms = Vec::with_capacity(values.len());
            for (i, value) in values.iter().enumerate() {
                let variant = format_ident!(
                    "{}",
                    variants_scope.add_local(&value.name.name.safe_pascal_case())
                );
                let wire = &value.name.wire_value;
                let value_docs = doc_attrs(value.docs.as_deref());
                let default = (i == 0).then(|| quote! { #[default] });
                variants.push(quote! {
                    #value_docs
                    #default
                    #[serde(rename = #wire)]
                    #variant,
                });
                arms.push(quote! { Self::#variant => #wire, });
            }
            let default_derive = (!values.is_empty()).then(|| quote! { Default, });
            Ok(quote! {
                #docs
                #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, #default_derive serde::Serialize, serde::Deserialize)]
                pub enum #name {
                    #(#variants)*
                }

                impl std::fmt::Display for #name {
                    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                        f.write_str(match *self {
                            #(#arms)*
                        })
                    }
                }
            })
        }
        TypeShape::Alias { alias_of } => {
            let target = mapper.map_type(alias_of, context, scope)?;
            Ok(quote! {
                #docs
                pub type #name = #target;
            })
        }
    }
}
