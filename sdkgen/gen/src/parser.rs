//! IR document loading.
//!
//! IR documents are camelCase JSON matching the `sdkgen-ir` data model.

use std::fs;
use std::path::Path;

use sdkgen_ir::IntermediateRepresentation;
use tracing::debug;

use crate::errors::GeneratorError;

/// Parses an IR document.
///
/// ## Examples
///
/// ```
/// use sdkgen_gen::parser::parse_ir;
///
/// let ir = parse_ir(r#"{"apiName": "acme"}"#).unwrap();
/// assert_eq!(ir.api_name.original(), "acme");
/// assert!(ir.root_package.endpoints.is_empty());
/// ```
///
/// ## Errors
///
/// Returns `GeneratorError::Parse` if the document is not valid IR.
pub fn parse_ir(json: &str) -> Result<IntermediateRepresentation, GeneratorError> {
    serde_json::from_str(json).map_err(|e| GeneratorError::Parse(format!("invalid IR: {}", e)))
}

/// Loads an IR document from disk.
///
/// ## Errors
///
/// Returns `GeneratorError::Parse` if the file cannot be read or is not
/// valid IR.
pub fn load_ir(path: &Path) -> Result<IntermediateRepresentation, GeneratorError> {
    let content = fs::read_to_string(path).map_err(|e| {
        GeneratorError::Parse(format!("cannot read '{}': {}", path.display(), e))
    })?;
    let ir = parse_ir(&content)?;
    debug!(
        path = %path.display(),
        types = ir.types.len(),
        errors = ir.errors.len(),
        subpackages = ir.subpackages.len(),
        "loaded IR"
    );
    Ok(ir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_document_without_api_name() {
        let err = parse_ir("{}").unwrap_err();
        assert!(matches!(err, GeneratorError::Parse(_)));
    }

    #[test]
    fn missing_file_is_parse_error() {
        let err = load_ir(Path::new("/nonexistent/ir.json")).unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse document: cannot read"));
    }

    #[test]
    fn loads_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("ir.json");
        fs::write(&path, r#"{"apiName": "acme", "apiDocs": "The Acme API."}"#).unwrap();
        let ir = load_ir(&path).unwrap();
        assert_eq!(ir.api_docs.as_deref(), Some("The Acme API."));
    }
}
