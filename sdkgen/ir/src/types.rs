//! The type algebra of the IR.
//!
//! A [`TypeReference`] points at a primitive, a named declaration, a
//! container around another reference, or an unknown (any-JSON) value.
//! Named types are declared once in a [`TypeDeclaration`] and looked up by
//! [`TypeId`].

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::name::{Name, NameAndWireValue};
use crate::package::PackagePath;

/// Identifier of a declared type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeId(pub String);

impl TypeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Primitive value types.
///
/// ## Examples
///
/// ```
/// use sdkgen_ir::PrimitiveType;
///
/// assert_eq!(PrimitiveType::DateTime.to_string(), "dateTime");
/// assert_eq!("base64".parse::<PrimitiveType>().unwrap(), PrimitiveType::Base64);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum PrimitiveType {
    String,
    Integer,
    Long,
    Uint,
    Uint64,
    Float,
    Double,
    Boolean,
    Uuid,
    Date,
    DateTime,
    Base64,
    BigInteger,
}

/// A compile-time-fixed scalar value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Literal {
    String(String),
    Boolean(bool),
}

impl Literal {
    /// Returns the value as it is rendered in a header, query or form field.
    pub fn to_wire_string(&self) -> String {
        match self {
            Literal::String(value) => value.clone(),
            Literal::Boolean(value) => value.to_string(),
        }
    }
}

/// A reference to a type.
///
/// Serialized externally tagged, e.g. `{"primitive":"string"}`,
/// `{"named":"type_user"}` or `{"container":{"optional":{"primitive":"boolean"}}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TypeReference {
    Primitive(PrimitiveType),
    Named(TypeId),
    Container(ContainerType),
    Unknown,
}

/// Container types wrapping other references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContainerType {
    Optional(Box<TypeReference>),
    List(Box<TypeReference>),
    Set(Box<TypeReference>),
    #[serde(rename_all = "camelCase")]
    Map {
        key_type: Box<TypeReference>,
        value_type: Box<TypeReference>,
    },
    Literal(Literal),
}

impl TypeReference {
    pub fn primitive(primitive: PrimitiveType) -> Self {
        TypeReference::Primitive(primitive)
    }

    pub fn string() -> Self {
        TypeReference::Primitive(PrimitiveType::String)
    }

    pub fn named(id: impl Into<String>) -> Self {
        TypeReference::Named(TypeId::new(id))
    }

    pub fn optional(inner: TypeReference) -> Self {
        TypeReference::Container(ContainerType::Optional(Box::new(inner)))
    }

    pub fn list(inner: TypeReference) -> Self {
        TypeReference::Container(ContainerType::List(Box::new(inner)))
    }

    pub fn set(inner: TypeReference) -> Self {
        TypeReference::Container(ContainerType::Set(Box::new(inner)))
    }

    pub fn map(key: TypeReference, value: TypeReference) -> Self {
        TypeReference::Container(ContainerType::Map {
            key_type: Box::new(key),
            value_type: Box::new(value),
        })
    }

    pub fn literal_string(value: impl Into<String>) -> Self {
        TypeReference::Container(ContainerType::Literal(Literal::String(value.into())))
    }

    pub fn literal_bool(value: bool) -> Self {
        TypeReference::Container(ContainerType::Literal(Literal::Boolean(value)))
    }

    /// Returns the inner reference when this is an `Optional` container.
    pub fn as_optional(&self) -> Option<&TypeReference> {
        match self {
            TypeReference::Container(ContainerType::Optional(inner)) => Some(inner),
            _ => None,
        }
    }

    /// Returns the literal value when this is a `Literal` container.
    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            TypeReference::Container(ContainerType::Literal(literal)) => Some(literal),
            _ => None,
        }
    }

    pub fn is_optional(&self) -> bool {
        self.as_optional().is_some()
    }

    pub fn is_literal(&self) -> bool {
        self.as_literal().is_some()
    }

    /// Returns the underlying primitive, looking through any number of
    /// `Optional` layers. Other containers are not unwrapped.
    ///
    /// ## Examples
    ///
    /// ```
    /// use sdkgen_ir::{PrimitiveType, TypeReference};
    ///
    /// let nested = TypeReference::optional(TypeReference::optional(
    ///     TypeReference::primitive(PrimitiveType::Date),
    /// ));
    /// assert_eq!(nested.underlying_primitive(), Some(PrimitiveType::Date));
    ///
    /// let list = TypeReference::list(TypeReference::string());
    /// assert_eq!(list.underlying_primitive(), None);
    /// ```
    pub fn underlying_primitive(&self) -> Option<PrimitiveType> {
        match self {
            TypeReference::Primitive(primitive) => Some(*primitive),
            TypeReference::Container(ContainerType::Optional(inner)) => inner.underlying_primitive(),
            _ => None,
        }
    }
}

/// Fully qualified name of a declared type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclaredTypeName {
    pub type_id: TypeId,
    #[serde(default)]
    pub package: PackagePath,
    pub name: Name,
}

/// A named type declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDeclaration {
    pub name: DeclaredTypeName,
    pub shape: TypeShape,
    #[serde(default)]
    pub docs: Option<String>,
}

/// The shape of a declared type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TypeShape {
    Object { properties: Vec<ObjectProperty> },
    Enum { values: Vec<EnumValue> },
    #[serde(rename_all = "camelCase")]
    Alias { alias_of: TypeReference },
}

/// A property of an object type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectProperty {
    pub name: NameAndWireValue,
    pub value_type: TypeReference,
    #[serde(default)]
    pub docs: Option<String>,
}

impl ObjectProperty {
    pub fn new(wire_value: impl Into<String>, value_type: TypeReference) -> Self {
        Self {
            name: NameAndWireValue::new(wire_value),
            value_type,
            docs: None,
        }
    }
}

/// A value of an enum type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumValue {
    pub name: NameAndWireValue,
    #[serde(default)]
    pub docs: Option<String>,
}

impl TypeDeclaration {
    /// Creates an object declaration in the given package.
    pub fn object(
        id: impl Into<String>,
        package: PackagePath,
        name: impl Into<Name>,
        properties: Vec<ObjectProperty>,
    ) -> Self {
        Self {
            name: DeclaredTypeName {
                type_id: TypeId::new(id),
                package,
                name: name.into(),
            },
            shape: TypeShape::Object { properties },
            docs: None,
        }
    }

    /// Creates an enum declaration whose values are given as wire strings.
    pub fn enumeration(
        id: impl Into<String>,
        package: PackagePath,
        name: impl Into<Name>,
        values: &[&str],
    ) -> Self {
        Self {
            name: DeclaredTypeName {
                type_id: TypeId::new(id),
                package,
                name: name.into(),
            },
            shape: TypeShape::Enum {
                values: values
                    .iter()
                    .map(|value| EnumValue {
                        name: NameAndWireValue::new(*value),
                        docs: None,
                    })
                    .collect(),
            },
            docs: None,
        }
    }

    /// Creates an alias declaration.
    pub fn alias(
        id: impl Into<String>,
        package: PackagePath,
        name: impl Into<Name>,
        alias_of: TypeReference,
    ) -> Self {
        Self {
            name: DeclaredTypeName {
                type_id: TypeId::new(id),
                package,
                name: name.into(),
            },
            shape: TypeShape::Alias { alias_of },
            docs: None,
        }
    }
}
