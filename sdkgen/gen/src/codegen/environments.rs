//! `environments.rs` generation.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};

use crate::codegen::doc_attrs;
use crate::visitors::EnvironmentsModel;
use crate::visitors::environments::{ENVIRONMENTS_CONST, ENVIRONMENTS_STRUCT};

/// Generates the environment URL constants.
///
/// Single-URL configs produce one `&'static str` per environment. Multi-URL
/// configs produce one struct per environment holding its URLs by slot.
pub fn generate_environments(model: &EnvironmentsModel) -> TokenStream {
    let environments = format_ident!("{}", ENVIRONMENTS_STRUCT);
    let constant = format_ident!("{}", ENVIRONMENTS_CONST);

    match model {
        EnvironmentsModel::Single(envs) => {
            let fields = envs.iter().map(|env| {
                let field = format_ident!("{}", env.field);
                let docs = doc_attrs(env.docs.as_deref());
                quote! { #docs pub #field: &'static str, }
            });
            let values = envs.iter().map(|env| {
                let field = format_ident!("{}", env.field);
                let url = &env.url;
                quote! { #field: #url, }
            });
            quote! {
                /// The environments the API is served from.
                #[derive(Debug, Clone, Copy, PartialEq, Eq)]
                pub struct #environments {
                    #(#fields)*
                }

                pub const #constant: #environments = #environments {
                    #(#values)*
                };
            }
        }
        EnvironmentsModel::Multiple(envs) => {
            let url_structs = envs.iter().map(|env| {
                let name = format_ident!("{}", env.struct_name);
                let slots = env.slots.iter().map(|slot| {
                    let field = format_ident!("{}", slot.field);
                    quote! { pub #field: &'static str, }
                });
                quote! {
                    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
                    pub struct #name {
                        #(#slots)*
                    }
                }
            });
            let fields = envs.iter().map(|env| {
                let field = format_ident!("{}", env.field);
                let name = format_ident!("{}", env.struct_name);
                let docs = doc_attrs(env.docs.as_deref());
                quote! { #docs pub #field: #name, }
            });
            let values = envs.iter().map(|env| {
                let field = format_ident!("{}", env.field);
                let name = format_ident!("{}", env.struct_name);
                let slots = env.slots.iter().map(|slot| {
                    let slot_field = format_ident!("{}", slot.field);
                    let url = &slot.url;
                    quote! { #slot_field: #url, }
                });
                quote! { #field: #name { #(#slots)* }, }
            });
            quote! {
                /// The environments the API is served from, with one URL per
                /// service.
                #[derive(Debug, Clone, Copy, PartialEq, Eq)]
                pub struct #environments {
                    #(#fields)*
                }

                #(#url_structs)*

                pub const #constant: #environments = #environments {
                    #(#values)*
                };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::format_generated_code;
    use sdkgen_ir::{
        EnvironmentBaseUrl, Environments, EnvironmentsConfig, MultipleBaseUrlsEnvironment,
        MultipleBaseUrlsEnvironments, Name,
    };

    #[test]
    fn single_base_url_constants() {
        let config = EnvironmentsConfig::single(
            &[("production", "https://api.example.com"), ("sandbox", "https://sandbox.example.com")],
            Some("production"),
        );
        let model = EnvironmentsModel::from_config(&config).unwrap();
        let code = format_generated_code(&generate_environments(&model)).unwrap();

        assert!(code.contains("pub production: &'static str,"));
        assert!(code.contains("pub const ENVIRONMENTS: Environments = Environments {"));
        assert!(code.contains("sandbox: \"https://sandbox.example.com\","));
    }

    #[test]
    fn multiple_base_urls_are_emitted_in_sorted_order() {
        let config = EnvironmentsConfig {
            default_environment: Some("Production".to_string()),
            environments: Environments::MultipleBaseUrls(MultipleBaseUrlsEnvironments {
                base_urls: vec![
                    EnvironmentBaseUrl {
                        id: "zeta".to_string(),
                        name: Name::new("zeta"),
                    },
                    EnvironmentBaseUrl {
                        id: "alpha".to_string(),
                        name: Name::new("alpha"),
                    },
                ],
                environments: vec![MultipleBaseUrlsEnvironment {
                    id: "Production".to_string(),
                    name: Name::new("Production"),
                    urls: [
                        ("zeta".to_string(), "https://zeta.example.com".to_string()),
                        ("alpha".to_string(), "https://alpha.example.com".to_string()),
                    ]
                    .into_iter()
                    .collect(),
                    docs: None,
                }],
            }),
        };
        let model = EnvironmentsModel::from_config(&config).unwrap();
        let code = format_generated_code(&generate_environments(&model)).unwrap();

        assert!(code.contains("pub struct ProductionUrls {"));
        assert!(code.contains("pub production: ProductionUrls,"));
        let alpha = code.find("alpha: \"https://alpha.example.com\"").unwrap();
        let zeta = code.find("zeta: \"https://zeta.example.com\"").unwrap();
        assert!(alpha < zeta);
    }
}
