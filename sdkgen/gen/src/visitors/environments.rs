//! Environments: URL constants and base-URL resolution.

use sdkgen_ir::{
    EnvironmentsConfig, Environments, MultipleBaseUrlsEnvironment, MultipleBaseUrlsEnvironments,
};

use crate::errors::GeneratorError;
use crate::scope::{Namespace, Scope};

/// Name of the generated struct listing every environment.
pub const ENVIRONMENTS_STRUCT: &str = "Environments";

/// Name of the generated constant holding the environment URLs.
pub const ENVIRONMENTS_CONST: &str = "ENVIRONMENTS";

/// One environment of a single-URL config.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentUrl {
    pub field: String,
    pub url: String,
    pub docs: Option<String>,
}

/// One environment of a multi-URL config, with its slots sorted by id.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentUrls {
    pub field: String,
    pub struct_name: String,
    pub slots: Vec<UrlSlot>,
    pub docs: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UrlSlot {
    pub field: String,
    pub url: String,
}

/// The environments file, independent of how it is rendered.
#[derive(Debug, Clone, PartialEq)]
pub enum EnvironmentsModel {
    Single(Vec<EnvironmentUrl>),
    Multiple(Vec<EnvironmentUrls>),
}

impl EnvironmentsModel {
    /// Builds the model, allocating field and struct names.
    pub fn from_config(config: &EnvironmentsConfig) -> Result<Self, GeneratorError> {
        let mut file = Scope::new("environments.rs");
        file.reserve(ENVIRONMENTS_STRUCT)?;
        file.reserve(ENVIRONMENTS_CONST)?;
        let mut fields = Scope::new(ENVIRONMENTS_STRUCT);

        Ok(match &config.environments {
            Environments::SingleBaseUrl(single) => EnvironmentsModel::Single(
                single
                    .environments
                    .iter()
                    .map(|env| EnvironmentUrl {
                        field: fields.add_local(&env.name.safe_snake_case()),
                        url: env.url.clone(),
                        docs: env.docs.clone(),
                    })
                    .collect(),
            ),
            Environments::MultipleBaseUrls(multiple) => EnvironmentsModel::Multiple(
                multiple
                    .environments
                    .iter()
                    .map(|env| {
                        let mut slot_fields = Scope::new(env.id.as_str());
                        let slots = sorted_urls(env)
                            .into_iter()
                            .map(|(id, url)| UrlSlot {
                                field: slot_fields.add_local(&slot_name(multiple, id)),
                                url: url.to_string(),
                            })
                            .collect();
                        EnvironmentUrls {
                            field: fields.add_local(&env.name.safe_snake_case()),
                            struct_name: file
                                .add_local(&format!("{}Urls", env.name.safe_pascal_case())),
                            slots,
                            docs: env.docs.clone(),
                        }
                    })
                    .collect(),
            ),
        })
    }

    /// The environment used in generated documentation examples, as a path
    /// relative to the SDK crate root.
    ///
    /// Only single-URL configs without a default environment have one; with
    /// a default, callers need not pick an environment at all.
    pub fn example(&self, config: &EnvironmentsConfig) -> Option<String> {
        match self {
            EnvironmentsModel::Single(envs) if config.default_environment.is_none() => envs
                .first()
                .map(|env| format!("environments::{}.{}", ENVIRONMENTS_CONST, env.field)),
            _ => None,
        }
    }
}

/// The `(slot id, url)` pairs of an environment sorted by slot id.
pub fn sorted_urls(environment: &MultipleBaseUrlsEnvironment) -> Vec<(&str, &str)> {
    let mut urls: Vec<_> = environment
        .urls
        .iter()
        .map(|(id, url)| (id.as_str(), url.as_str()))
        .collect();
    urls.sort_unstable_by(|a, b| a.0.cmp(b.0));
    urls
}

fn slot_name(environments: &MultipleBaseUrlsEnvironments, id: &str) -> String {
    environments
        .base_urls
        .iter()
        .find(|slot| slot.id == id)
        .map(|slot| slot.name.safe_snake_case())
        .unwrap_or_else(|| sdkgen_ir::Name::new(id).safe_snake_case())
}

/// Resolves the base URL baked into an endpoint.
///
/// `endpoint_override` is the endpoint's base-URL id: an environment id for
/// single-URL configs, a slot id for multi-URL configs. It takes precedence
/// over the default environment. When nothing applies the result is empty and
/// the generated client relies on the runtime-supplied base URL.
///
/// ## Errors
///
/// Returns `GeneratorError::UnknownEnvironment` when the default environment
/// or the override names something the config does not declare.
pub fn resolve_base_url(
    config: Option<&EnvironmentsConfig>,
    endpoint_override: Option<&str>,
) -> Result<String, GeneratorError> {
    let Some(config) = config else {
        return Ok(String::new());
    };
    let default = config.default_environment.as_deref();

    match &config.environments {
        Environments::SingleBaseUrl(single) => {
            let Some(id) = endpoint_override.or(default) else {
                return Ok(String::new());
            };
            single
                .environments
                .iter()
                .find(|env| env.id == id)
                .map(|env| env.url.clone())
                .ok_or_else(|| GeneratorError::UnknownEnvironment(id.to_string()))
        }
        Environments::MultipleBaseUrls(multiple) => match default {
            Some(default) => {
                let env = multiple
                    .environments
                    .iter()
                    .find(|env| env.id == default)
                    .ok_or_else(|| GeneratorError::UnknownEnvironment(default.to_string()))?;
                match endpoint_override {
                    Some(slot) => env
                        .urls
                        .get(slot)
                        .cloned()
                        .ok_or_else(|| GeneratorError::UnknownEnvironment(slot.to_string())),
                    None => Ok(sorted_urls(env)
                        .first()
                        .map(|(_, url)| url.to_string())
                        .unwrap_or_default()),
                }
            }
            None => {
                let Some(slot) = endpoint_override else {
                    return Ok(String::new());
                };
                if !multiple.base_urls.iter().any(|b| b.id == slot) {
                    return Err(GeneratorError::UnknownEnvironment(slot.to_string()));
                }
                Ok(multiple
                    .environments
                    .iter()
                    .find_map(|env| env.urls.get(slot).cloned())
                    .unwrap_or_default())
            }
        },
    }
}
