//! Auth schemes and custom headers: the client configuration surface.
//!
//! Every auth scheme and every custom header becomes one entry. Entries with
//! a literal value are fixed: they are sent on every request but never
//! exposed as an option.

use sdkgen_ir::{AuthScheme, HttpHeader, IntermediateRepresentation, TypeReference};
use tracing::warn;

use crate::errors::GeneratorError;
use crate::scope::{Namespace, Scope};

/// Fields every `ClientOptions` carries.
pub const RESERVED_FIELDS: [&str; 3] = ["base_url", "http_client", "http_header"];

/// Option functions every SDK exposes.
pub const RESERVED_OPTIONS: [&str; 3] = ["with_base_url", "with_http_client", "with_http_header"];

/// One entry of the configuration surface.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionEntry {
    /// `Authorization: Bearer <token>`, set when the token is non-empty.
    Bearer {
        field: String,
        option: String,
        docs: Option<String>,
    },
    /// `Authorization: Basic <base64(username:password)>`.
    Basic {
        username: String,
        password: String,
        option: String,
        docs: Option<String>,
    },
    /// A header whose value is configured by the caller.
    Header {
        field: String,
        option: String,
        wire: String,
        prefix: Option<String>,
        value_type: TypeReference,
        docs: Option<String>,
    },
    /// A header with a fixed value.
    Fixed { wire: String, value: String },
}

/// The configuration surface of a generated client.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClientOptionsModel {
    pub entries: Vec<OptionEntry>,
    /// Example invocation of the first auth scheme's option, e.g.
    /// `with_token("<YOUR_AUTH_TOKEN>")`.
    pub example: Option<AuthExample>,
}

/// The option call used in generated documentation.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthExample {
    pub option: String,
    pub arguments: Vec<String>,
}

impl ClientOptionsModel {
    /// Collects auth schemes, then custom headers, in declaration order.
    pub fn from_ir(ir: &IntermediateRepresentation) -> Result<Self, GeneratorError> {
        let mut fields = Scope::new("ClientOptions");
        for reserved in RESERVED_FIELDS {
            fields.reserve(reserved)?;
        }
        let mut options = Scope::new("option.rs");
        for reserved in RESERVED_OPTIONS {
            options.reserve(reserved)?;
        }

        let mut model = Self::default();
        for (i, scheme) in ir.auth.schemes.iter().enumerate() {
            let entry = match scheme {
                AuthScheme::Bearer { token, docs } => {
                    let field = fields.add_local(&token.safe_snake_case());
                    OptionEntry::Bearer {
                        option: options.add_local(&format!("with_{}", token.snake_case())),
                        field,
                        docs: docs.clone(),
                    }
                }
                AuthScheme::Basic {
                    username,
                    password,
                    docs,
                } => OptionEntry::Basic {
                    username: fields.add_local(&username.safe_snake_case()),
                    password: fields.add_local(&password.safe_snake_case()),
                    option: options.add_local("with_basic_auth"),
                    docs: docs.clone(),
                },
                AuthScheme::Header {
                    name,
                    value_type,
                    prefix,
                    docs,
                } => {
                    if let Some(literal) = value_type.as_literal() {
                        warn!(
                            header = %name.wire_value,
                            "literal auth header is fixed and gets no client option"
                        );
                        OptionEntry::Fixed {
                            wire: name.wire_value.clone(),
                            value: match prefix {
                                Some(prefix) => format!("{} {}", prefix, literal.to_wire_string()),
                                None => literal.to_wire_string(),
                            },
                        }
                    } else {
                        let field = fields.add_local(&name.name.safe_snake_case());
                        OptionEntry::Header {
                            option: options.add_local(&format!("with_{}", name.name.snake_case())),
                            field,
                            wire: name.wire_value.clone(),
                            prefix: prefix.clone(),
                            value_type: value_type.clone(),
                            docs: docs.clone(),
                        }
                    }
                }
            };
            if i == 0 {
                model.example = example_for(scheme, &entry);
            }
            model.entries.push(entry);
        }

        for header in &ir.headers {
            model
                .entries
                .push(header_entry(header, &mut fields, &mut options));
        }
        Ok(model)
    }
}

fn header_entry(header: &HttpHeader, fields: &mut Scope, options: &mut Scope) -> OptionEntry {
    match header.value_type.as_literal() {
        Some(literal) => OptionEntry::Fixed {
            wire: header.name.wire_value.clone(),
            value: literal.to_wire_string(),
        },
        None => {
            let field = fields.add_local(&header.name.name.safe_snake_case());
            OptionEntry::Header {
                option: options.add_local(&format!("with_{}", header.name.name.snake_case())),
                field,
                wire: header.name.wire_value.clone(),
                prefix: None,
                value_type: header.value_type.clone(),
                docs: header.docs.clone(),
            }
        }
    }
}

fn example_for(scheme: &AuthScheme, entry: &OptionEntry) -> Option<AuthExample> {
    match (scheme, entry) {
        (AuthScheme::Bearer { .. }, OptionEntry::Bearer { option, .. }) => Some(AuthExample {
            option: option.clone(),
            arguments: vec!["<YOUR_AUTH_TOKEN>".to_string()],
        }),
        (AuthScheme::Basic { .. }, OptionEntry::Basic { option, .. }) => Some(AuthExample {
            option: option.clone(),
            arguments: vec!["<YOUR_USERNAME>".to_string(), "<YOUR_PASSWORD>".to_string()],
        }),
        (AuthScheme::Header { name, .. }, OptionEntry::Header { option, .. }) => {
            Some(AuthExample {
                option: option.clone(),
                arguments: vec![format!("<YOUR_{}>", name.name.screaming_snake_case())],
            })
        }
        _ => None,
    }
}
