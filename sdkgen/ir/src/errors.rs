//! Declared API errors and how responses are matched against them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::name::{Name, NameAndWireValue};
use crate::package::PackagePath;
use crate::types::TypeReference;

/// Identifier of a declared error.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorId(pub String);

impl ErrorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for ErrorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fully qualified name of a declared error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclaredErrorName {
    pub error_id: ErrorId,
    #[serde(default)]
    pub package: PackagePath,
    pub name: Name,
}

/// An error an endpoint may return.
///
/// `type_` is the body type; errors without one carry only a status code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDeclaration {
    pub name: DeclaredErrorName,
    pub discriminant_value: NameAndWireValue,
    #[serde(default, rename = "type")]
    pub type_: Option<TypeReference>,
    pub status_code: u16,
    #[serde(default)]
    pub docs: Option<String>,
}

impl ErrorDeclaration {
    /// Creates an error declaration whose discriminant wire value is the
    /// original name.
    pub fn new(
        id: impl Into<String>,
        package: PackagePath,
        name: impl Into<Name>,
        status_code: u16,
        body: Option<TypeReference>,
    ) -> Self {
        let name: Name = name.into();
        Self {
            discriminant_value: NameAndWireValue::with_name(name.original(), name.clone()),
            name: DeclaredErrorName {
                error_id: ErrorId::new(id),
                package,
                name,
            },
            type_: body,
            status_code,
            docs: None,
        }
    }

    /// Overrides the discriminant wire value.
    pub fn with_discriminant(mut self, wire_value: impl Into<String>) -> Self {
        self.discriminant_value =
            NameAndWireValue::with_name(wire_value, self.name.name.clone());
        self
    }
}

/// How error responses select a declared error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorDiscriminationStrategy {
    /// Switch on the HTTP status code.
    #[default]
    StatusCode,
    /// Switch on a discriminant property of the body; the error payload sits
    /// under `content_property`.
    #[serde(rename_all = "camelCase")]
    Property {
        discriminant: NameAndWireValue,
        content_property: NameAndWireValue,
    },
}

/// A reference from an endpoint to one of its declared errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseError {
    pub error: ErrorId,
    #[serde(default)]
    pub docs: Option<String>,
}

impl ResponseError {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            error: ErrorId::new(id),
            docs: None,
        }
    }
}
