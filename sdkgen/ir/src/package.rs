//! Packages group endpoints, types and errors into output modules.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::ErrorId;
use crate::http::HttpEndpoint;
use crate::name::Name;
use crate::types::TypeId;

/// The location of a package, as a list of path segments.
///
/// An empty path is the root package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackagePath(pub Vec<Name>);

impl PackagePath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Builds a path from raw segments.
    ///
    /// ## Examples
    ///
    /// ```
    /// use sdkgen_ir::PackagePath;
    ///
    /// let path = PackagePath::new(&["users", "v2"]);
    /// assert_eq!(path.module_path(), "crate::users::v2");
    /// assert_eq!(PackagePath::root().module_path(), "crate");
    /// ```
    pub fn new(segments: &[&str]) -> Self {
        Self(segments.iter().map(|s| Name::new(*s)).collect())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns a path one segment deeper.
    pub fn join(&self, segment: Name) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment);
        Self(segments)
    }

    /// The snake-case module segments of this path.
    pub fn module_segments(&self) -> Vec<String> {
        self.0.iter().map(Name::safe_snake_case).collect()
    }

    /// The Rust module path of this package inside the generated crate.
    pub fn module_path(&self) -> String {
        let mut path = String::from("crate");
        for segment in self.module_segments() {
            path.push_str("::");
            path.push_str(&segment);
        }
        path
    }
}

impl fmt::Display for PackagePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return f.write_str("<root>");
        }
        let segments: Vec<&str> = self.0.iter().map(Name::original).collect();
        f.write_str(&segments.join("/"))
    }
}

/// Identifier of a subpackage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubpackageId(pub String);

impl SubpackageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for SubpackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The contents of a package.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    #[serde(default)]
    pub path: PackagePath,
    #[serde(default)]
    pub endpoints: Vec<HttpEndpoint>,
    #[serde(default)]
    pub types: Vec<TypeId>,
    #[serde(default)]
    pub errors: Vec<ErrorId>,
    #[serde(default)]
    pub subpackages: Vec<SubpackageId>,
    #[serde(default)]
    pub docs: Option<String>,
}

/// A nested package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subpackage {
    pub name: Name,
    pub package: Package,
}
