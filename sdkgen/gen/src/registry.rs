//! Read-only lookup of declared types, errors and subpackages.
//!
//! The registry is built once per generation run from the IR and shared by
//! reference with every other component. A lookup miss means the IR is
//! malformed and aborts generation.

use std::collections::BTreeMap;

use sdkgen_ir::{
    ErrorDeclaration, ErrorId, IntermediateRepresentation, Subpackage, SubpackageId,
    TypeDeclaration, TypeId,
};

use crate::errors::GeneratorError;

/// Immutable index over the declarations of an IR document.
#[derive(Debug, Clone, Copy)]
pub struct TypeRegistry<'ir> {
    types: &'ir BTreeMap<TypeId, TypeDeclaration>,
    errors: &'ir BTreeMap<ErrorId, ErrorDeclaration>,
    subpackages: &'ir BTreeMap<SubpackageId, Subpackage>,
}

impl<'ir> TypeRegistry<'ir> {
    pub fn new(ir: &'ir IntermediateRepresentation) -> Self {
        Self {
            types: &ir.types,
            errors: &ir.errors,
            subpackages: &ir.subpackages,
        }
    }

    /// Resolves a type id to its declaration.
    ///
    /// ## Errors
    ///
    /// Returns `GeneratorError::UnknownType` if the id is not declared.
    pub fn resolve(&self, id: &TypeId) -> Result<&'ir TypeDeclaration, GeneratorError> {
        self.types
            .get(id)
            .ok_or_else(|| GeneratorError::UnknownType(id.clone()))
    }

    /// Resolves an error id to its declaration.
    pub fn resolve_error(&self, id: &ErrorId) -> Result<&'ir ErrorDeclaration, GeneratorError> {
        self.errors
            .get(id)
            .ok_or_else(|| GeneratorError::UnknownError(id.clone()))
    }

    pub fn resolve_subpackage(&self, id: &SubpackageId) -> Result<&'ir Subpackage, GeneratorError> {
        self.subpackages
            .get(id)
            .ok_or_else(|| GeneratorError::UnknownSubpackage(id.clone()))
    }
}
