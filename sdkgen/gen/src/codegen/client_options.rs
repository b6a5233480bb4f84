//! `client_options.rs` and `option.rs` generation.
//!
//! `ClientOptions` holds everything a client is configured with. Options are
//! boxed closures that each set one part of it, applied in order by the
//! client constructor.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use sdkgen_ir::{IntermediateRepresentation, PlatformHeaders, PrimitiveType, TypeReference};

use crate::codegen::doc_attrs;
use crate::config::GeneratorConfig;
use crate::errors::GeneratorError;
use crate::scope::Namespace;
use crate::type_mapper::{TypeMapper, UsageContext};
use crate::value_format::format_for_transport;
use crate::visitors::{ClientOptionsModel, OptionEntry};

/// Platform header names and values sent by the generated client.
#[derive(Debug, Clone, Copy)]
pub struct Platform<'a> {
    pub headers: &'a PlatformHeaders,
    pub sdk_name: &'a str,
    pub sdk_version: &'a str,
}

impl<'a> Platform<'a> {
    /// Platform headers are sent only when the IR names them and the
    /// configuration carries an SDK version.
    pub fn resolve(ir: &'a IntermediateRepresentation, config: &'a GeneratorConfig) -> Option<Self> {
        let headers = ir.sdk_config.platform_headers.as_ref()?;
        let sdk_version = config.sdk_version.as_deref()?;
        Some(Self {
            headers,
            sdk_name: config.sdk_name.as_deref().unwrap_or(ir.api_name.original()),
            sdk_version,
        })
    }
}

/// Generates `ClientOption`, `ClientOptions` and its header materialization.
pub fn generate_client_options_definition(
    model: &ClientOptionsModel,
    platform: Option<Platform<'_>>,
    mapper: &TypeMapper<'_>,
    scope: &mut dyn Namespace,
) -> Result<TokenStream, GeneratorError> {
    let mut fields = Vec::new();
    let mut to_header = Vec::new();

    for entry in &model.entries {
        match entry {
            OptionEntry::Bearer { field, docs, .. } => {
                let ident = format_ident!("{}", field);
                let docs = doc_attrs(docs.as_deref());
                fields.push(quote! { #docs pub #ident: String, });
                to_header.push(quote! {
                    if !self.#ident.is_empty() {
                        header.set("Authorization", format!("Bearer {}", self.#ident));
                    }
                });
            }
            OptionEntry::Basic {
                username,
                password,
                docs,
                ..
            } => {
                let username = format_ident!("{}", username);
                let password = format_ident!("{}", password);
                let docs = doc_attrs(docs.as_deref());
                fields.push(quote! {
                    #docs
                    pub #username: String,
                    pub #password: String,
                });
                to_header.push(quote! {
                    if !self.#username.is_empty() && !self.#password.is_empty() {
                        let credentials = format!("{}:{}", self.#username, self.#password);
                        header.set(
                            "Authorization",
                            format!(
                                "Basic {}",
                                base64::Engine::encode(
                                    &base64::engine::general_purpose::STANDARD,
                                    credentials,
                                )
                            ),
                        );
                    }
                });
            }
            OptionEntry::Header {
                field,
                wire,
                prefix,
                value_type,
                docs,
                ..
            } => {
                let ident = format_ident!("{}", field);
                let ty = mapper.map_type(value_type, UsageContext::Imported, scope)?;
                let docs = doc_attrs(docs.as_deref());
                fields.push(quote! { #docs pub #ident: #ty, });
                to_header.push(header_assignment(&ident, wire, prefix.as_deref(), value_type));
            }
            OptionEntry::Fixed { wire, value } => {
                to_header.push(quote! { header.set(#wire, #value.to_string()); });
            }
        }
    }

    let platform_headers = platform.map(|platform| {
        let PlatformHeaders {
            language,
            sdk_name: name_header,
            sdk_version: version_header,
        } = platform.headers;
        let sdk_name = platform.sdk_name;
        let sdk_version = platform.sdk_version;
        quote! {
            headers.set(#language, "Rust".to_string());
            headers.set(#name_header, #sdk_name.to_string());
            headers.set(#version_header, #sdk_version.to_string());
        }
    });

    Ok(quote! {
        /// A functional option applied to [`ClientOptions`].
        pub type ClientOption = Box<dyn Fn(&mut ClientOptions) + Send + Sync>;

        /// Configuration shared by every client.
        #[derive(Debug, Clone, Default)]
        pub struct ClientOptions {
            pub base_url: String,
            pub http_client: reqwest::Client,
            pub http_header: crate::core::Headers,
            #(#fields)*
        }

        impl ClientOptions {
            /// Applies `opts` in order onto default options.
            pub fn new(opts: &[ClientOption]) -> Self {
                let mut options = Self::default();
                for opt in opts {
                    opt(&mut options);
                }
                options
            }

            /// The auth and custom headers derived from the options.
            pub fn to_header(&self) -> crate::core::Headers {
                let mut header = crate::core::Headers::new();
                #(#to_header)*
                header
            }

            /// The headers sent with every request.
            pub fn clone_header(&self) -> crate::core::Headers {
                let mut headers = self.http_header.clone();
                #platform_headers
                headers.merge(&self.to_header());
                headers
            }
        }
    })
}

/// Sets a configured header, skipping absent values.
fn header_assignment(
    ident: &proc_macro2::Ident,
    wire: &str,
    prefix: Option<&str>,
    value_type: &TypeReference,
) -> TokenStream {
    let format = format_for_transport(value_type);
    let binding = format_ident!("value");
    let rendered = format.render(quote! { #binding });
    let rendered = match prefix {
        Some(prefix) => quote! { format!("{} {}", #prefix, #rendered) },
        None => rendered,
    };
    let set = quote! { header.set(#wire, #rendered); };
    if !format.is_optional && matches!(value_type, TypeReference::Primitive(PrimitiveType::String)) {
        return quote! {
            if !self.#ident.is_empty() {
                let #binding = &self.#ident;
                #set
            }
        };
    }
    format.guarded(quote! { self.#ident }, &binding, set)
}

/// Generates the option constructors in `option.rs`.
pub fn generate_options(
    model: &ClientOptionsModel,
    mapper: &TypeMapper<'_>,
    scope: &mut dyn Namespace,
) -> Result<TokenStream, GeneratorError> {
    let mut options = vec![quote! {
        /// Overrides the base URL of every request.
        pub fn with_base_url(base_url: impl Into<String>) -> ClientOption {
            let base_url = base_url.into();
            Box::new(move |opts: &mut ClientOptions| opts.base_url = base_url.clone())
        }

        /// Uses the given HTTP client for every request.
        pub fn with_http_client(http_client: reqwest::Client) -> ClientOption {
            Box::new(move |opts: &mut ClientOptions| opts.http_client = http_client.clone())
        }

        /// Adds headers to every request.
        pub fn with_http_header(http_header: crate::core::Headers) -> ClientOption {
            Box::new(move |opts: &mut ClientOptions| opts.http_header = http_header.clone())
        }
    }];

    for entry in &model.entries {
        let option = match entry {
            OptionEntry::Bearer { field, option, .. } => {
                let option = format_ident!("{}", option);
                let field = format_ident!("{}", field);
                quote! {
                    /// Sets the bearer token sent in the `Authorization` header.
                    pub fn #option(#field: impl Into<String>) -> ClientOption {
                        let #field = #field.into();
                        Box::new(move |opts: &mut ClientOptions| opts.#field = #field.clone())
                    }
                }
            }
            OptionEntry::Basic {
                username,
                password,
                option,
                ..
            } => {
                let option = format_ident!("{}", option);
                let username = format_ident!("{}", username);
                let password = format_ident!("{}", password);
                quote! {
                    /// Sets the credentials sent with basic auth.
                    pub fn #option(
                        #username: impl Into<String>,
                        #password: impl Into<String>,
                    ) -> ClientOption {
                        let #username = #username.into();
                        let #password = #password.into();
                        Box::new(move |opts: &mut ClientOptions| {
                            opts.#username = #username.clone();
                            opts.#password = #password.clone();
                        })
                    }
                }
            }
            OptionEntry::Header {
                field,
                option,
                wire,
                value_type,
                ..
            } => {
                let option = format_ident!("{}", option);
                let field = format_ident!("{}", field);
                let doc = format!(" Sets the `{}` header.", wire);
                let (inner, wrap) = match value_type.as_optional() {
                    Some(inner) => (inner, true),
                    None => (value_type, false),
                };
                let (param_ty, convert) = if matches!(inner, TypeReference::Primitive(PrimitiveType::String)) {
                    (quote! { impl Into<String> }, quote! { let #field = #field.into(); })
                } else {
                    (mapper.map_type(inner, UsageContext::Imported, scope)?, quote! {})
                };
                let assigned = if wrap {
                    quote! { Some(#field.clone()) }
                } else {
                    quote! { #field.clone() }
                };
                quote! {
                    #[doc = #doc]
                    pub fn #option(#field: #param_ty) -> ClientOption {
                        #convert
                        Box::new(move |opts: &mut ClientOptions| opts.#field = #assigned)
                    }
                }
            }
            OptionEntry::Fixed { .. } => continue,
        };
        options.push(option);
    }

    Ok(quote! {
        use crate::client_options::{ClientOption, ClientOptions};

        #(#options)*
    })
}
