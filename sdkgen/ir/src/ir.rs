//! The root IR document.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::auth::ApiAuth;
use crate::environments::EnvironmentsConfig;
use crate::errors::{ErrorDeclaration, ErrorDiscriminationStrategy, ErrorId};
use crate::http::HttpHeader;
use crate::name::Name;
use crate::package::{Package, Subpackage, SubpackageId};
use crate::types::{TypeDeclaration, TypeId};

/// Header names the generated client uses to identify itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformHeaders {
    pub language: String,
    pub sdk_name: String,
    pub sdk_version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SdkConfig {
    #[serde(default)]
    pub platform_headers: Option<PlatformHeaders>,
}

/// A complete description of an API.
///
/// Types, errors and subpackages are stored in ordered maps keyed by id so
/// that every traversal is deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntermediateRepresentation {
    pub api_name: Name,
    #[serde(default)]
    pub api_docs: Option<String>,
    #[serde(default)]
    pub auth: ApiAuth,
    /// Headers sent on every request, configured once on the client.
    #[serde(default)]
    pub headers: Vec<HttpHeader>,
    #[serde(default)]
    pub environments: Option<EnvironmentsConfig>,
    #[serde(default)]
    pub error_discrimination_strategy: ErrorDiscriminationStrategy,
    #[serde(default)]
    pub types: BTreeMap<TypeId, TypeDeclaration>,
    #[serde(default)]
    pub errors: BTreeMap<ErrorId, ErrorDeclaration>,
    #[serde(default)]
    pub subpackages: BTreeMap<SubpackageId, Subpackage>,
    #[serde(default)]
    pub root_package: Package,
    #[serde(default)]
    pub sdk_config: SdkConfig,
}

impl IntermediateRepresentation {
    /// Creates an empty IR for the named API.
    pub fn new(api_name: impl Into<Name>) -> Self {
        Self {
            api_name: api_name.into(),
            api_docs: None,
            auth: ApiAuth::default(),
            headers: Vec::new(),
            environments: None,
            error_discrimination_strategy: ErrorDiscriminationStrategy::StatusCode,
            types: BTreeMap::new(),
            errors: BTreeMap::new(),
            subpackages: BTreeMap::new(),
            root_package: Package::default(),
            sdk_config: SdkConfig::default(),
        }
    }

    /// Registers a type and lists it in its declaring package.
    ///
    /// The declaring package must already exist (root or a registered
    /// subpackage); otherwise the type is registered but not listed.
    pub fn add_type(&mut self, declaration: TypeDeclaration) {
        let id = declaration.name.type_id.clone();
        if let Some(package) = self.package_mut(&declaration.name.package) {
            package.types.push(id.clone());
        }
        self.types.insert(id, declaration);
    }

    /// Registers an error and lists it in its declaring package.
    pub fn add_error(&mut self, declaration: ErrorDeclaration) {
        let id = declaration.name.error_id.clone();
        if let Some(package) = self.package_mut(&declaration.name.package) {
            package.errors.push(id.clone());
        }
        self.errors.insert(id, declaration);
    }

    /// Registers a subpackage under `parent` (`None` for the root).
    pub fn add_subpackage(
        &mut self,
        id: impl Into<String>,
        parent: Option<&SubpackageId>,
        subpackage: Subpackage,
    ) {
        let id = SubpackageId::new(id);
        let parent = match parent {
            Some(parent_id) => self.subpackages.get_mut(parent_id).map(|s| &mut s.package),
            None => Some(&mut self.root_package),
        };
        if let Some(parent) = parent {
            parent.subpackages.push(id.clone());
        }
        self.subpackages.insert(id, subpackage);
    }

    fn package_mut(&mut self, path: &crate::package::PackagePath) -> Option<&mut Package> {
        if path.is_root() {
            return Some(&mut self.root_package);
        }
        self.subpackages
            .values_mut()
            .map(|s| &mut s.package)
            .find(|p| &p.path == path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::PackagePath;

    #[test]
    fn add_type_lists_type_in_package() {
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

        let users = &ir.subpackages[&SubpackageId::new("users")].package;
        assert_eq!(users.types, vec![TypeId::new("type_users:User")]);
        assert_eq!(ir.root_package.subpackages, vec![SubpackageId::new("users")]);
    }

    #[test]
    fn minimal_document_parses() {
        let ir: IntermediateRepresentation =
            serde_json::from_str(r#"{"apiName":"acme"}"#).unwrap();
        assert_eq!(ir.api_name.original(), "acme");
        assert_eq!(
            ir.error_discrimination_strategy,
            ErrorDiscriminationStrategy::StatusCode
        );
        assert!(ir.root_package.endpoints.is_empty());
    }
}
