//! Mapping of IR type references onto Rust type expressions.
//!
//! | IR | Rust |
//! |---|---|
//! | string, bigInteger | `String` |
//! | integer / long / uint / uint64 | `i32` / `i64` / `u32` / `u64` |
//! | float / double | `f32` / `f64` |
//! | boolean | `bool` |
//! | uuid | `uuid::Uuid` |
//! | date / dateTime | `chrono::NaiveDate` / `chrono::DateTime<chrono::Utc>` |
//! | base64 | `Vec<u8>` |
//! | unknown | `serde_json::Value` |
//! | optional / list / map | `Option<T>` / `Vec<T>` / `HashMap<K, V>` |
//! | set | `HashSet<T>` for hashable `T`, otherwise `Vec<T>` |
//! | literal | the literal's scalar type |
//!
//! Named types resolve through the [`TypeRegistry`] and are qualified
//! according to the [`UsageContext`].

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use sdkgen_ir::{ContainerType, Literal, PackagePath, PrimitiveType, TypeReference, TypeShape};

use crate::errors::GeneratorError;
use crate::registry::TypeRegistry;
use crate::scope::Namespace;

/// Where the mapped type expression will be emitted.
#[derive(Debug, Clone, Copy)]
pub enum UsageContext<'a> {
    /// Named types are always qualified through an import of their package
    /// (or `crate::` for the root package).
    Imported,
    /// The code is emitted inside the given package; its own types are
    /// referenced through `super::` instead of importing the package into
    /// itself.
    Local(&'a PackagePath),
}

/// Converts type references into Rust type expressions.
#[derive(Debug, Clone, Copy)]
pub struct TypeMapper<'ir> {
    registry: TypeRegistry<'ir>,
}

impl<'ir> TypeMapper<'ir> {
    pub fn new(registry: TypeRegistry<'ir>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> TypeRegistry<'ir> {
        self.registry
    }

    /// Maps a type reference to a type expression.
    ///
    /// ## Errors
    ///
    /// Returns `GeneratorError::UnknownType` if a named type is not declared.
    pub fn map_type(
        &self,
        reference: &TypeReference,
        context: UsageContext<'_>,
        scope: &mut dyn Namespace,
    ) -> Result<TokenStream, GeneratorError> {
        Ok(match reference {
            TypeReference::Primitive(primitive) => primitive_type(*primitive),
            TypeReference::Unknown => quote! { serde_json::Value },
            TypeReference::Named(id) => {
                let declaration = self.registry.resolve(id)?;
                qualified_path(
                    &declaration.name.package,
                    &declaration.name.name.safe_pascal_case(),
                    context,
                    scope,
                )
            }
            TypeReference::Container(container) => match container {
                ContainerType::Optional(inner) => {
                    let inner = self.map_type(inner, context, scope)?;
                    quote! { Option<#inner> }
                }
                ContainerType::List(inner) => {
                    let inner = self.map_type(inner, context, scope)?;
                    quote! { Vec<#inner> }
                }
                ContainerType::Set(inner) => {
                    let hashable = self.is_hashable(inner)?;
                    let inner = self.map_type(inner, context, scope)?;
                    if hashable {
                        quote! { std::collections::HashSet<#inner> }
                    } else {
                        quote! { Vec<#inner> }
                    }
                }
                ContainerType::Map {
                    key_type,
                    value_type,
                } => {
                    let key = self.map_type(key_type, context, scope)?;
                    let value = self.map_type(value_type, context, scope)?;
                    quote! { std::collections::HashMap<#key, #value> }
                }
                ContainerType::Literal(literal) => literal_type(literal),
            },
        })
    }

    /// Maps a path parameter type. Strings are borrowed as `&str`.
    pub fn map_parameter_type(
        &self,
        reference: &TypeReference,
        context: UsageContext<'_>,
        scope: &mut dyn Namespace,
    ) -> Result<TokenStream, GeneratorError> {
        if matches!(
            reference,
            TypeReference::Primitive(PrimitiveType::String | PrimitiveType::BigInteger)
        ) {
            return Ok(quote! { &str });
        }
        self.map_type(reference, context, scope)
    }

    /// Whether values of the type can be stored in a `HashSet`.
    pub fn is_hashable(&self, reference: &TypeReference) -> Result<bool, GeneratorError> {
        Ok(match reference {
            TypeReference::Primitive(PrimitiveType::Float | PrimitiveType::Double) => false,
            TypeReference::Primitive(_) => true,
            TypeReference::Unknown => false,
            TypeReference::Named(id) => match &self.registry.resolve(id)?.shape {
                TypeShape::Enum { .. } => true,
                TypeShape::Alias { alias_of } => self.is_hashable(alias_of)?,
                TypeShape::Object { .. } => false,
            },
            TypeReference::Container(container) => match container {
                ContainerType::Optional(inner) | ContainerType::List(inner) => {
                    self.is_hashable(inner)?
                }
                ContainerType::Set(_) | ContainerType::Map { .. } => false,
                ContainerType::Literal(_) => true,
            },
        })
    }
}

/// Qualifies an item declared at the top of `package` for use in `context`.
///
/// Items of the current package are reached through `super::`, root items
/// through `crate::`, anything else through an import of its package.
pub fn qualified_path(
    package: &PackagePath,
    name: &str,
    context: UsageContext<'_>,
    scope: &mut dyn Namespace,
) -> TokenStream {
    let ident = format_ident!("{}", name);
    match context {
        UsageContext::Local(current) if current == package => quote! { super::#ident },
        _ if package.is_root() => quote! { crate::#ident },
        _ => {
            let alias = format_ident!("{}", scope.add_import(&package.module_path()));
            quote! { #alias::#ident }
        }
    }
}

/// The Rust type of a primitive.
pub fn primitive_type(primitive: PrimitiveType) -> TokenStream {
    match primitive {
        PrimitiveType::String | PrimitiveType::BigInteger => quote! { String },
        PrimitiveType::Integer => quote! { i32 },
        PrimitiveType::Long => quote! { i64 },
        PrimitiveType::Uint => quote! { u32 },
        PrimitiveType::Uint64 => quote! { u64 },
        PrimitiveType::Float => quote! { f32 },
        PrimitiveType::Double => quote! { f64 },
        PrimitiveType::Boolean => quote! { bool },
        PrimitiveType::Uuid => quote! { uuid::Uuid },
        PrimitiveType::Date => quote! { chrono::NaiveDate },
        PrimitiveType::DateTime => quote! { chrono::DateTime<chrono::Utc> },
        PrimitiveType::Base64 => quote! { Vec<u8> },
    }
}

/// The owned Rust type holding a literal's value.
pub fn literal_type(literal: &Literal) -> TokenStream {
    match literal {
        Literal::String(_) => quote! { String },
        Literal::Boolean(_) => quote! { bool },
    }
}

/// The type returned by a literal's accessor.
pub fn literal_accessor_type(literal: &Literal) -> TokenStream {
    match literal {
        Literal::String(_) => quote! { &'static str },
        Literal::Boolean(_) => quote! { bool },
    }
}

/// The literal value as a Rust expression.
pub fn literal_value(literal: &Literal) -> TokenStream {
    match literal {
        Literal::String(value) => quote! { #value },
        Literal::Boolean(value) => quote! { #value },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::Scope;
    use sdkgen_ir::{IntermediateRepresentation, Name, Package, Subpackage, TypeDeclaration};

    fn make_ir() -> IntermediateRepresentation {
        let mut ir = IntermediateRepresentation::new("acme");
        ir.add_subpackage(
            "users",
            None,
            Subpackage {
                name: Name::new("users"),
                package: Package {
                    path: PackagePath::new(&["users"]),
                    ..Package::default()
                },
            },
        );
        ir.add_type(TypeDeclaration::object(
            "type_users:User",
            PackagePath::new(&["users"]),
            "User",
            vec![],
        ));
        ir.add_type(TypeDeclaration::enumeration(
            "type_:Role",
            PackagePath::root(),
            "Role",
            &["admin", "member"],
        ));
        ir.add_type(TypeDeclaration::alias(
            "type_:Score",
            PackagePath::root(),
            "Score",
            TypeReference::primitive(PrimitiveType::Double),
        ));
        ir
    }

    fn render(tokens: TokenStream) -> String {
        tokens.to_string().replace(' ', "")
    }

    #[test]
    fn maps_primitives() {
        assert_eq!(render(primitive_type(PrimitiveType::Long)), "i64");
        assert_eq!(
            render(primitive_type(PrimitiveType::DateTime)),
            "chrono::DateTime<chrono::Utc>"
        );
        assert_eq!(render(primitive_type(PrimitiveType::Base64)), "Vec<u8>");
    }

    #[test]
    fn optional_of_optional_is_not_collapsed() {
        let ir = make_ir();
        let mapper = TypeMapper::new(TypeRegistry::new(&ir));
        let mut scope = Scope::new("test");
        let reference = TypeReference::optional(TypeReference::optional(TypeReference::string()));
        let tokens = mapper
            .map_type(&reference, UsageContext::Imported, &mut scope)
            .unwrap();
        assert_eq!(render(tokens), "Option<Option<String>>");
    }

    #[test]
    fn named_type_in_other_package_is_imported() {
        let ir = make_ir();
        let mapper = TypeMapper::new(TypeRegistry::new(&ir));
        let mut scope = Scope::new("client.rs");
        let tokens = mapper
            .map_type(
                &TypeReference::list(TypeReference::named("type_users:User")),
                UsageContext::Imported,
                &mut scope,
            )
            .unwrap();
        assert_eq!(render(tokens), "Vec<users::User>");
        assert_eq!(scope.imports().collect::<Vec<_>>(), vec![("crate::users", "users")]);
    }

    #[test]
    fn named_type_in_current_package_uses_super() {
        let ir = make_ir();
        let mapper = TypeMapper::new(TypeRegistry::new(&ir));
        let mut scope = Scope::new("types.rs");
        let package = PackagePath::new(&["users"]);
        let tokens = mapper
            .map_type(
                &TypeReference::named("type_users:User"),
                UsageContext::Local(&package),
                &mut scope,
            )
            .unwrap();
        assert_eq!(render(tokens), "super::User");
        assert_eq!(scope.imports().count(), 0);
    }

    #[test]
    fn root_types_use_crate_path() {
        let ir = make_ir();
        let mapper = TypeMapper::new(TypeRegistry::new(&ir));
        let mut scope = Scope::new("client.rs");
        let tokens = mapper
            .map_type(&TypeReference::named("type_:Role"), UsageContext::Imported, &mut scope)
            .unwrap();
        assert_eq!(render(tokens), "crate::Role");
        assert_eq!(scope.imports().count(), 0);
    }

    #[test]
    fn set_falls_back_to_vec_for_unhashable_types() {
        let ir = make_ir();
        let mapper = TypeMapper::new(TypeRegistry::new(&ir));
        let mut scope = Scope::new("test");

        let enum_set = mapper
            .map_type(
                &TypeReference::set(TypeReference::named("type_:Role")),
                UsageContext::Imported,
                &mut scope,
            )
            .unwrap();
        assert_eq!(render(enum_set), "std::collections::HashSet<crate::Role>");

        let float_alias_set = mapper
            .map_type(
                &TypeReference::set(TypeReference::named("type_:Score")),
                UsageContext::Imported,
                &mut scope,
            )
            .unwrap();
        assert_eq!(render(float_alias_set), "Vec<crate::Score>");
    }

    #[test]
    fn literal_maps_to_scalar_type() {
        let ir = make_ir();
        let mapper = TypeMapper::new(TypeRegistry::new(&ir));
        let mut scope = Scope::new("test");
        let tokens = mapper
            .map_type(&TypeReference::literal_bool(true), UsageContext::Imported, &mut scope)
            .unwrap();
        assert_eq!(render(tokens), "bool");
    }

    #[test]
    fn string_path_parameters_are_borrowed() {
        let ir = make_ir();
        let mapper = TypeMapper::new(TypeRegistry::new(&ir));
        let mut scope = Scope::new("test");
        let tokens = mapper
            .map_parameter_type(&TypeReference::string(), UsageContext::Imported, &mut scope)
            .unwrap();
        assert_eq!(render(tokens), "&str");
    }

    #[test]
    fn named_path_parameters_of_the_current_package_use_super() {
        let ir = make_ir();
        let mapper = TypeMapper::new(TypeRegistry::new(&ir));
        let mut scope = Scope::new("users/client.rs");
        let users = PackagePath::new(&["users"]);
        let tokens = mapper
            .map_parameter_type(
                &TypeReference::named("type_users:User"),
                UsageContext::Local(&users),
                &mut scope,
            )
            .unwrap();
        assert_eq!(render(tokens), "super::User");
        assert_eq!(scope.imports().count(), 0);
    }

    #[test]
    fn unknown_named_type_fails() {
        let ir = make_ir();
        let mapper = TypeMapper::new(TypeRegistry::new(&ir));
        let mut scope = Scope::new("test");
        let err = mapper
            .map_type(&TypeReference::named("type_:Nope"), UsageContext::Imported, &mut scope)
            .unwrap_err();
        assert!(matches!(err, GeneratorError::UnknownType(_)));
    }
}
