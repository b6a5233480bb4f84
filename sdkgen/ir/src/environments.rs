//! Server environments and their base URLs.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::name::Name;

/// Identifier of an environment.
pub type EnvironmentId = String;

/// Identifier of a base-URL slot in a multi-URL environment.
pub type EnvironmentBaseUrlId = String;

/// The environments of an API and the default, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentsConfig {
    #[serde(default)]
    pub default_environment: Option<EnvironmentId>,
    pub environments: Environments,
}

/// Either one URL per environment, or several named URLs per environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Environments {
    SingleBaseUrl(SingleBaseUrlEnvironments),
    MultipleBaseUrls(MultipleBaseUrlsEnvironments),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleBaseUrlEnvironments {
    pub environments: Vec<SingleBaseUrlEnvironment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleBaseUrlEnvironment {
    pub id: EnvironmentId,
    pub name: Name,
    pub url: String,
    #[serde(default)]
    pub docs: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultipleBaseUrlsEnvironments {
    pub base_urls: Vec<EnvironmentBaseUrl>,
    pub environments: Vec<MultipleBaseUrlsEnvironment>,
}

/// A named base-URL slot shared by every environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentBaseUrl {
    pub id: EnvironmentBaseUrlId,
    pub name: Name,
}

/// An environment with one URL per base-URL slot.
///
/// `urls` is keyed by slot id. Its iteration order is unspecified; consumers
/// that emit code must sort it first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultipleBaseUrlsEnvironment {
    pub id: EnvironmentId,
    pub name: Name,
    pub urls: HashMap<EnvironmentBaseUrlId, String>,
    #[serde(default)]
    pub docs: Option<String>,
}

impl EnvironmentsConfig {
    /// Creates a single-URL config from `(id, url)` pairs.
    pub fn single(environments: &[(&str, &str)], default: Option<&str>) -> Self {
        Self {
            default_environment: default.map(str::to_string),
            environments: Environments::SingleBaseUrl(SingleBaseUrlEnvironments {
                environments: environments
                    .iter()
                    .map(|(id, url)| SingleBaseUrlEnvironment {
                        id: id.to_string(),
                        name: Name::new(*id),
                        url: url.to_string(),
                        docs: None,
                    })
                    .collect(),
            }),
        }
    }
}
