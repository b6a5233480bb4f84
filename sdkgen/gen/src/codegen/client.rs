//! Package client generation (`client.rs`).
//!
//! Every package gets a `Client` holding the resolved base URL, a caller and
//! the materialized headers, one async method per endpoint, and one public
//! field per subpackage client. Sub-clients are built from the same options
//! as their parent, so configuring the root configures the whole tree.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use sdkgen_ir::{Package, Subpackage};
use tracing::debug;

use crate::codegen::doc_attrs;
use crate::codegen::endpoint::{EndpointContext, ResolvedEndpoint};
use crate::errors::GeneratorError;
use crate::scope::{Namespace, Scope};

/// Fields every client declares before its sub-clients.
const CLIENT_FIELDS: [&str; 3] = ["base_url", "caller", "header"];

/// A generated package client.
#[derive(Debug, Clone)]
pub struct GeneratedClient {
    /// The client struct and its impl block.
    pub tokens: TokenStream,
    /// Method names, in endpoint declaration order.
    pub methods: Vec<String>,
}

/// Generates the client of `package`.
///
/// `example` is the usage snippet documented on the root client; it is
/// rendered as an `ignore` doc test.
///
/// ## Errors
///
/// Propagates the first endpoint that fails to assemble.
pub fn generate_client(
    package: &Package,
    subpackages: &[&Subpackage],
    context: &EndpointContext<'_>,
    example: Option<&str>,
    scope: &mut Scope,
) -> Result<GeneratedClient, GeneratorError> {
    let mut fields = Scope::new("Client");
    for field in CLIENT_FIELDS {
        fields.reserve(field)?;
    }

    let mut sub_fields = Vec::new();
    let mut sub_inits = Vec::new();
    for subpackage in subpackages {
        let field = format_ident!("{}", fields.add_local(&subpackage.name.safe_snake_case()));
        let module = format_ident!("{}", scope.add_import(&subpackage.package.path.module_path()));
        let docs = doc_attrs(subpackage.package.docs.as_deref());
        sub_fields.push(quote! {
            #docs
            pub #field: #module::client::Client,
        });
        sub_inits.push(quote! { #field: #module::client::Client::new(opts), });
    }

    let mut method_names = Scope::new("impl Client");
    method_names.reserve("new")?;
    let mut methods = Vec::new();
    let mut names = Vec::new();
    for endpoint in &package.endpoints {
        let name = method_names.add_local(&endpoint.name.safe_snake_case());
        let resolved = ResolvedEndpoint::build(endpoint, &name, context, scope)?;
        methods.push(resolved.method().clone());
        names.push(name);
    }
    debug!(package = %package.path, methods = names.len(), "generated client");

    let docs = match example {
        Some(example) => {
            let lines = std::iter::once(" ```ignore".to_string())
                .chain(example.lines().map(|line| format!(" {}", line)))
                .chain(std::iter::once(" ```".to_string()));
            quote! {
                /// Client for the API.
                ///
                #(#[doc = #lines])*
            }
        }
        None => doc_attrs(package.docs.as_deref()),
    };

    let tokens = quote! {
        #docs
        #[derive(Debug, Clone)]
        pub struct Client {
            base_url: String,
            caller: crate::core::Caller,
            header: crate::core::Headers,
            #(#sub_fields)*
        }

        impl Client {
            /// Creates a client from the given options.
            pub fn new(opts: &[crate::client_options::ClientOption]) -> Self {
                let options = crate::client_options::ClientOptions::new(opts);
                Self {
                    base_url: options.base_url.clone(),
                    caller: crate::core::Caller::new(options.http_client.clone()),
                    header: options.clone_header(),
                    #(#sub_inits)*
                }
            }

            #(#methods)*
        }
    };

    Ok(GeneratedClient {
        tokens,
        methods: names,
    })
}

/// Renders the root client usage example.
///
/// `crate_name` is the name the SDK is used under; `option` and `arguments`
/// come from the first auth scheme; `environment` is a crate-relative path
/// to an environment URL.
pub fn client_example(
    crate_name: &str,
    auth: Option<(&str, &[String])>,
    environment: Option<&str>,
) -> String {
    let mut options = Vec::new();
    if let Some((option, arguments)) = auth {
        let arguments: Vec<String> = arguments.iter().map(|a| format!("{:?}", a)).collect();
        options.push(format!(
            "    {}::option::{}({}),",
            crate_name,
            option,
            arguments.join(", ")
        ));
    }
    if let Some(environment) = environment {
        options.push(format!(
            "    {}::option::with_base_url({}::{}),",
            crate_name, crate_name, environment
        ));
    }
    if options.is_empty() {
        return format!("let client = {}::client::Client::new(&[]);", crate_name);
    }
    format!(
        "let client = {}::client::Client::new(&[\n{}\n]);",
        crate_name,
        options.join("\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::format_generated_code;
    use crate::registry::TypeRegistry;
    use crate::type_mapper::TypeMapper;
    use sdkgen_ir::{HttpEndpoint, HttpMethod, IntermediateRepresentation, Name, PackagePath};

    fn generate(
        ir: &IntermediateRepresentation,
        package: &Package,
        subpackages: &[&Subpackage],
        example: Option<&str>,
    ) -> (String, Vec<String>, Scope) {
        let context = EndpointContext {
            mapper: TypeMapper::new(TypeRegistry::new(ir)),
            package: &package.path,
            environments: ir.environments.as_ref(),
            error_discrimination: &ir.error_discrimination_strategy,
        };
        let mut scope = Scope::new("client.rs");
        let client = generate_client(package, subpackages, &context, example, &mut scope).unwrap();
        let code = format_generated_code(&client.tokens).unwrap();
        (code, client.methods, scope)
    }

    #[test]
    fn methods_follow_endpoint_order_and_avoid_new() {
        let ir = IntermediateRepresentation::new("acme");
        let mut package = Package::default();
        package.endpoints = vec![
            HttpEndpoint::new("list", HttpMethod::Get, "/users"),
            HttpEndpoint::new("new", HttpMethod::Post, "/users"),
            HttpEndpoint::new("list", HttpMethod::Get, "/users/all"),
        ];
        let (code, methods, _) = generate(&ir, &package, &[], None);
        assert_eq!(methods, vec!["list", "new2", "list2"]);
        assert!(code.contains("pub async fn new2("));
        assert!(code.contains("pub fn new(opts: &[crate::client_options::ClientOption]) -> Self"));
    }

    #[test]
    fn subpackage_clients_are_fields() {
        let ir = IntermediateRepresentation::new("acme");
        let package = Package::default();
        let users = Subpackage {
            name: Name::new("users"),
            package: Package {
                path: PackagePath::new(&["users"]),
                ..Package::default()
            },
        };
        let (code, _, scope) = generate(&ir, &package, &[&users], None);
        assert!(code.contains("pub users: users::client::Client,"));
        assert!(code.contains("users: users::client::Client::new(opts),"));
        assert!(scope.use_statements().to_string().contains("crate :: users"));
    }

    #[test]
    fn subpackage_named_like_a_client_field_is_renamed() {
        let ir = IntermediateRepresentation::new("acme");
        let header = Subpackage {
            name: Name::new("header"),
            package: Package {
                path: PackagePath::new(&["header"]),
                ..Package::default()
            },
        };
        let (code, _, _) = generate(&ir, &Package::default(), &[&header], None);
        assert!(code.contains("pub header2: header::client::Client,"));
    }

    #[test]
    fn root_client_documents_example() {
        let ir = IntermediateRepresentation::new("acme");
        let arguments = vec!["<YOUR_AUTH_TOKEN>".to_string()];
        let example = client_example(
            "acme",
            Some(("with_token", arguments.as_slice())),
            Some("environments::ENVIRONMENTS.production"),
        );
        let (code, _, _) = generate(&ir, &Package::default(), &[], Some(&example));
        assert!(code.contains("/// ```ignore"));
        assert!(code.contains("///     acme::option::with_token(\"<YOUR_AUTH_TOKEN>\"),"));
        assert!(code.contains(
            "///     acme::option::with_base_url(acme::environments::ENVIRONMENTS.production),"
        ));
    }

    #[test]
    fn example_without_options() {
        assert_eq!(
            client_example("acme", None, None),
            "let client = acme::client::Client::new(&[]);"
        );
    }
}
