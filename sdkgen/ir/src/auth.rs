//! Authentication schemes.
//!
//! Each scheme contributes one option to the generated client configuration
//! surface. Header schemes with a literal value are fixed and contribute
//! only a header, never an option.

use serde::{Deserialize, Serialize};

use crate::name::{Name, NameAndWireValue};
use crate::types::TypeReference;

/// Auth configuration of an API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiAuth {
    #[serde(default)]
    pub docs: Option<String>,
    #[serde(default)]
    pub schemes: Vec<AuthScheme>,
}

/// A single auth scheme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AuthScheme {
    /// `Authorization: Bearer <token>`.
    Bearer {
        token: Name,
        #[serde(default)]
        docs: Option<String>,
    },
    /// `Authorization: Basic <base64(username:password)>`.
    Basic {
        username: Name,
        password: Name,
        #[serde(default)]
        docs: Option<String>,
    },
    /// A custom header, optionally with a static value prefix.
    #[serde(rename_all = "camelCase")]
    Header {
        name: NameAndWireValue,
        value_type: TypeReference,
        #[serde(default)]
        prefix: Option<String>,
        #[serde(default)]
        docs: Option<String>,
    },
}

impl AuthScheme {
    pub fn bearer(token: impl Into<Name>) -> Self {
        AuthScheme::Bearer {
            token: token.into(),
            docs: None,
        }
    }

    pub fn basic() -> Self {
        AuthScheme::Basic {
            username: Name::new("username"),
            password: Name::new("password"),
            docs: None,
        }
    }

    pub fn header(wire_value: &str, name: impl Into<Name>, value_type: TypeReference) -> Self {
        AuthScheme::Header {
            name: NameAndWireValue::with_name(wire_value, name),
            value_type,
            prefix: None,
            docs: None,
        }
    }
}
