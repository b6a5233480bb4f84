//! Identifier names and their case renderings.
//!
//! Every identifier in the IR is carried as a [`Name`]: the original spelling
//! from the API definition plus the casings the generator needs. Names
//! serialize as the original string so IR documents stay compact.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Rust keywords that cannot be used as bare identifiers.
pub const RUST_KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
    "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move",
    "mut", "pub", "ref", "return", "self", "Self", "static", "struct", "super", "trait", "true",
    "type", "unsafe", "use", "where", "while", "abstract", "become", "box", "do", "final",
    "gen", "macro", "override", "priv", "try", "typeof", "unsized", "virtual", "yield",
];

/// An identifier with pre-computed case renderings.
///
/// ## Examples
///
/// ```
/// use sdkgen_ir::Name;
///
/// let name = Name::new("userId");
/// assert_eq!(name.snake_case(), "user_id");
/// assert_eq!(name.pascal_case(), "UserId");
/// assert_eq!(name.camel_case(), "userId");
/// assert_eq!(name.screaming_snake_case(), "USER_ID");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Name {
    original: String,
    words: Vec<String>,
}

impl Name {
    pub fn new(original: impl Into<String>) -> Self {
        let original = original.into();
        let words = split_words(&original);
        Self { original, words }
    }

    /// The name exactly as written in the API definition.
    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn snake_case(&self) -> String {
        self.words.join("_")
    }

    pub fn screaming_snake_case(&self) -> String {
        self.snake_case().to_uppercase()
    }

    pub fn pascal_case(&self) -> String {
        self.words.iter().map(|w| capitalize(w)).collect()
    }

    pub fn camel_case(&self) -> String {
        let mut out = String::new();
        for (i, word) in self.words.iter().enumerate() {
            if i == 0 {
                out.push_str(word);
            } else {
                out.push_str(&capitalize(word));
            }
        }
        out
    }

    /// Snake case that is safe to use as a Rust identifier.
    ///
    /// Keywords get a trailing underscore and names starting with a digit
    /// get a leading underscore.
    pub fn safe_snake_case(&self) -> String {
        make_safe(self.snake_case())
    }

    /// Pascal case that is safe to use as a Rust type identifier.
    pub fn safe_pascal_case(&self) -> String {
        make_safe(self.pascal_case())
    }
}

impl From<String> for Name {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for Name {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<Name> for String {
    fn from(value: Name) -> Self {
        value.original
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

/// A name paired with the exact string that appears on the wire.
///
/// The wire value is used for JSON keys, header names and query keys while
/// the name drives the generated identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameAndWireValue {
    pub wire_value: String,
    pub name: Name,
}

impl NameAndWireValue {
    /// Creates a value whose name is derived from the wire value.
    pub fn new(wire_value: impl Into<String>) -> Self {
        let wire_value = wire_value.into();
        Self {
            name: Name::new(wire_value.clone()),
            wire_value,
        }
    }

    /// Creates a value with a name that differs from the wire value.
    pub fn with_name(wire_value: impl Into<String>, name: impl Into<Name>) -> Self {
        Self {
            wire_value: wire_value.into(),
            name: name.into(),
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn make_safe(ident: String) -> String {
    if ident.is_empty() {
        return "_".to_string();
    }
    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        return format!("_{ident}");
    }
    if RUST_KEYWORDS.contains(&ident.as_str()) {
        return format!("{ident}_");
    }
    ident
}

/// Splits an identifier into lowercase words.
///
/// Word boundaries are separators (anything not alphanumeric), a lowercase
/// or digit followed by an uppercase letter, and the last capital of an
/// acronym followed by a lowercase letter (`HTTPClient` -> `http`, `client`).
fn split_words(input: &str) -> Vec<String> {
    let chars: Vec<char> = input.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }
        if c.is_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower)
            {
                words.push(std::mem::take(&mut current));
            }
        }
        current.extend(c.to_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_camel_and_pascal_case() {
        assert_eq!(Name::new("userId").snake_case(), "user_id");
        assert_eq!(Name::new("UserProfile").snake_case(), "user_profile");
    }

    #[test]
    fn splits_acronyms() {
        let name = Name::new("HTTPClient");
        assert_eq!(name.snake_case(), "http_client");
        assert_eq!(name.pascal_case(), "HttpClient");
    }

    #[test]
    fn splits_separators() {
        let name = Name::new("X-API-Version");
        assert_eq!(name.snake_case(), "x_api_version");
        assert_eq!(name.pascal_case(), "XApiVersion");
        assert_eq!(name.camel_case(), "xApiVersion");
        assert_eq!(name.screaming_snake_case(), "X_API_VERSION");
    }

    #[test]
    fn digits_stay_with_previous_word() {
        assert_eq!(Name::new("v2Users").snake_case(), "v2_users");
        assert_eq!(Name::new("oauth2").pascal_case(), "Oauth2");
    }

    #[test]
    fn safe_variants_avoid_keywords_and_digits() {
        assert_eq!(Name::new("type").safe_snake_case(), "type_");
        assert_eq!(Name::new("Self").safe_pascal_case(), "Self_");
        assert_eq!(Name::new("2fa").safe_snake_case(), "_2fa");
    }

    #[test]
    fn serializes_as_original_string() {
        let name = Name::new("errorType");
        let json = serde_json::to_string(&name).unwrap();
        assert_eq!(json, "\"errorType\"");

        let parsed: Name = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, name);
    }

    #[test]
    fn name_and_wire_value_derives_name() {
        let value = NameAndWireValue::new("X-Request-Id");
        assert_eq!(value.wire_value, "X-Request-Id");
        assert_eq!(value.name.snake_case(), "x_request_id");
    }
}
