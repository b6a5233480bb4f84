//! Output assembly and file writing for generated SDKs.
//!
//! This module walks the package tree of an IR, builds one generation unit
//! per file, validates each unit, formats it and writes it to disk
//! atomically.
//!
//! ## Output Structure
//!
//! ```text
//! sdk/src/
//! ├── lib.rs             # Module declarations and root re-exports
//! ├── client_options.rs  # ClientOption / ClientOptions
//! ├── option.rs          # Functional options
//! ├── environments.rs    # Environment URLs (when configured)
//! ├── optional.rs        # optional() / null() (generic optionals only)
//! ├── client.rs          # Root package client
//! ├── types.rs           # Root package models
//! ├── errors.rs          # Root package errors
//! ├── requests.rs        # Root package request wrappers
//! └── users/
//!     ├── mod.rs
//!     ├── client.rs
//!     └── ...
//! ```
//!
//! `core` (the runtime the generated code calls into) is declared by
//! `lib.rs` but not generated.
//!
//! ## Safety Guarantees
//!
//! - **Validation**: every file is parsed with `syn` before anything is written
//! - **Formatting**: output is formatted with `prettyplease`
//! - **Atomic writes**: temp file + rename, so no file is left half-written

use std::fs;
use std::path::{Path, PathBuf};

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use sdkgen_ir::{IntermediateRepresentation, Package, Subpackage};
use tracing::{debug, info};

use crate::codegen::client::client_example;
use crate::codegen::client_options::Platform;
use crate::codegen::request_types::RequestLayout;
use crate::codegen::{
    EndpointContext, generate_client, generate_client_options_definition,
    generate_environments, generate_error_type, generate_optional_helpers, generate_options,
    generate_request_type, generate_type_declaration,
};
use crate::config::GeneratorConfig;
use crate::errors::GeneratorError;
use crate::registry::TypeRegistry;
use crate::scope::{Namespace, Scope};
use crate::type_mapper::{TypeMapper, UsageContext};
use crate::visitors::{ClientOptionsModel, EnvironmentsModel, RequestBodyModel};

/// Notice placed at the top of every generated file.
pub const GENERATED_NOTICE: &str =
    "// This code was automatically generated by sdkgen. Do not edit manually.";

/// Names a file scope never hands out as import aliases: crates and path
/// roots the generated code spells out in full.
const EXTERNAL_NAMES: [&str; 11] = [
    "crate", "self", "super", "std", "serde", "serde_json", "reqwest", "url", "base64", "chrono",
    "uuid",
];

/// Modules declared at the crate root besides package modules.
const ROOT_MODULES: [&str; 9] = [
    "core",
    "client_options",
    "option",
    "environments",
    "optional",
    "client",
    "types",
    "errors",
    "requests",
];

/// One formatted output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// Path relative to the output directory.
    pub path: PathBuf,
    pub content: String,
}

/// Creates the scope of one generated file.
fn file_scope(name: &str) -> Result<Scope, GeneratorError> {
    let mut scope = Scope::new(name);
    for reserved in EXTERNAL_NAMES {
        scope.reserve(reserved)?;
    }
    Ok(scope)
}

/// Validates generated code using syn.
///
/// ## Errors
///
/// Returns `GeneratorError::CodeGen` if the code fails to parse.
pub fn validate_code(tokens: &TokenStream) -> Result<syn::File, GeneratorError> {
    syn::parse2(tokens.clone())
        .map_err(|e| GeneratorError::CodeGen(format!("Generated code is invalid: {}", e)))
}

/// Formats a parsed file and prepends the generated-code notice.
pub fn format_code(file: &syn::File) -> String {
    format!("{}\n\n{}", GENERATED_NOTICE, prettyplease::unparse(file))
}

/// Assembles one unit: the scope's `use` statements followed by `body`.
fn finish_unit(path: PathBuf, scope: &Scope, body: TokenStream) -> Result<GeneratedFile, GeneratorError> {
    let uses = scope.use_statements();
    let tokens = quote! {
        #uses
        #body
    };
    let file = validate_code(&tokens).map_err(|e| match e {
        GeneratorError::CodeGen(message) => {
            GeneratorError::CodeGen(format!("{}: {}", path.display(), message))
        }
        other => other,
    })?;
    debug!(file = %path.display(), "generated unit");
    Ok(GeneratedFile {
        path,
        content: format_code(&file),
    })
}

/// Walks the IR and produces every file of the SDK.
struct SdkBuilder<'ir> {
    ir: &'ir IntermediateRepresentation,
    config: &'ir GeneratorConfig,
    mapper: TypeMapper<'ir>,
    files: Vec<GeneratedFile>,
}

impl<'ir> SdkBuilder<'ir> {
    fn new(ir: &'ir IntermediateRepresentation, config: &'ir GeneratorConfig) -> Self {
        Self {
            ir,
            config,
            mapper: TypeMapper::new(TypeRegistry::new(ir)),
            files: Vec::new(),
        }
    }

    fn build(mut self) -> Result<Vec<GeneratedFile>, GeneratorError> {
        let options = ClientOptionsModel::from_ir(self.ir)?;
        let environments = self
            .ir
            .environments
            .as_ref()
            .map(EnvironmentsModel::from_config)
            .transpose()?;

        let mut root_modules = Scope::new("lib.rs");
        for module in ROOT_MODULES {
            root_modules.reserve(module)?;
        }
        let root = &self.ir.root_package;
        let root_subpackages = self.subpackages(root)?;
        for subpackage in &root_subpackages {
            root_modules.reserve(&subpackage.name.safe_snake_case())?;
        }

        let lib = self.lib_rs(root, &root_subpackages, environments.is_some())?;
        self.files.push(lib);
        self.client_options(&options)?;
        if let Some(model) = &environments {
            let scope = Scope::new("environments.rs");
            let body = generate_environments(model);
            self.files
                .push(finish_unit(PathBuf::from("environments.rs"), &scope, body)?);
        }
        if self.config.include_generic_optionals {
            let scope = Scope::new("optional.rs");
            self.files.push(finish_unit(
                PathBuf::from("optional.rs"),
                &scope,
                generate_optional_helpers(),
            )?);
        }

        let crate_name = self.ir.api_name.safe_snake_case();
        let auth = options
            .example
            .as_ref()
            .map(|example| (example.option.as_str(), example.arguments.as_slice()));
        let environment = match (&environments, &self.ir.environments) {
            (Some(model), Some(config)) => model.example(config),
            _ => None,
        };
        let example = client_example(&crate_name, auth, environment.as_deref());

        self.package(root, &root_subpackages, PathBuf::new(), Some(&example))?;
        Ok(self.files)
    }

    fn subpackages(&self, package: &Package) -> Result<Vec<&'ir Subpackage>, GeneratorError> {
        let registry = self.mapper.registry();
        package
            .subpackages
            .iter()
            .map(|id| registry.resolve_subpackage(id))
            .collect()
    }

    fn lib_rs(
        &self,
        root: &Package,
        subpackages: &[&Subpackage],
        has_environments: bool,
    ) -> Result<GeneratedFile, GeneratorError> {
        let default_docs = format!("Client SDK for the {} API.", self.ir.api_name.original());
        let docs = inner_doc_lines(Some(self.ir.api_docs.as_deref().unwrap_or(&default_docs)));
        let environments = has_environments.then(|| quote! { pub mod environments; });
        let optional = self
            .config
            .include_generic_optionals
            .then(|| quote! { pub mod optional; });
        let package_modules = self.package_modules(root, subpackages);

        let body = quote! {
            #(#![doc = #docs])*

            pub mod core;
            pub mod client_options;
            pub mod option;
            #environments
            #optional
            #package_modules
        };
        finish_unit(PathBuf::from("lib.rs"), &Scope::new("lib.rs"), body)
    }

    /// Module declarations and re-exports for the files of `package`.
    fn package_modules(&self, package: &Package, subpackages: &[&Subpackage]) -> TokenStream {
        let types = (!package.types.is_empty()).then(|| quote! { pub mod types; pub use types::*; });
        let errors =
            (!package.errors.is_empty()).then(|| quote! { pub mod errors; pub use errors::*; });
        let requests = has_requests(package)
            .then(|| quote! { pub mod requests; pub use requests::*; });
        let subpackages = subpackages.iter().map(|subpackage| {
            let module = format_ident!("{}", subpackage.name.safe_snake_case());
            quote! { pub mod #module; }
        });
        quote! {
            pub mod client;
            #types
            #errors
            #requests
            #(#subpackages)*
        }
    }

    fn client_options(&mut self, model: &ClientOptionsModel) -> Result<(), GeneratorError> {
        let mut scope = file_scope("client_options.rs")?;
        let platform = Platform::resolve(self.ir, self.config);
        let body = generate_client_options_definition(model, platform, &self.mapper, &mut scope)?;
        self.files.push(finish_unit(
            PathBuf::from("client_options.rs"),
            &scope,
            body,
        )?);

        let mut scope = file_scope("option.rs")?;
        let body = generate_options(model, &self.mapper, &mut scope)?;
        self.files
            .push(finish_unit(PathBuf::from("option.rs"), &scope, body)?);
        Ok(())
    }

    /// Generates the files of `package` under `dir`, then its subpackages.
    fn package(
        &mut self,
        package: &'ir Package,
        subpackages: &[&'ir Subpackage],
        dir: PathBuf,
        example: Option<&str>,
    ) -> Result<(), GeneratorError> {
        debug!(package = %package.path, "generating package");
        let usage = UsageContext::Local(&package.path);

        if !dir.as_os_str().is_empty() {
            let modules = self.package_modules(package, subpackages);
            let docs = inner_doc_lines(package.docs.as_deref());
            let body = quote! {
                #(#![doc = #docs])*
                #modules
            };
            self.files
                .push(finish_unit(dir.join("mod.rs"), &Scope::new("mod.rs"), body)?);
        }

        let context = EndpointContext {
            mapper: self.mapper,
            package: &package.path,
            environments: self.ir.environments.as_ref(),
            error_discrimination: &self.ir.error_discrimination_strategy,
        };
        let mut scope = file_scope("client.rs")?;
        let client = generate_client(package, subpackages, &context, example, &mut scope)?;
        self.files
            .push(finish_unit(dir.join("client.rs"), &scope, client.tokens)?);

        let registry = self.mapper.registry();
        if !package.types.is_empty() {
            let mut scope = file_scope("types.rs")?;
            let declarations = package
                .types
                .iter()
                .map(|id| registry.resolve(id))
                .collect::<Result<Vec<_>, _>>()?;
            for declaration in &declarations {
                scope.reserve(&declaration.name.name.safe_pascal_case())?;
            }
            let mut items = Vec::new();
            for declaration in declarations {
                items.push(generate_type_declaration(declaration, &self.mapper, &mut scope)?);
            }
            self.files
                .push(finish_unit(dir.join("types.rs"), &scope, quote! { #(#items)* })?);
        }

        if !package.errors.is_empty() {
            let mut scope = file_scope("errors.rs")?;
            let mut items = Vec::new();
            for id in &package.errors {
                let declaration = registry.resolve_error(id)?;
                items.push(generate_error_type(declaration, &self.mapper, &mut scope)?);
            }
            self.files
                .push(finish_unit(dir.join("errors.rs"), &scope, quote! { #(#items)* })?);
        }

        if has_requests(package) {
            let mut scope = file_scope("requests.rs")?;
            let mut wrappers = Vec::new();
            for endpoint in &package.endpoints {
                let body = endpoint
                    .request_body
                    .as_ref()
                    .map(|body| RequestBodyModel::from_endpoint(endpoint, body))
                    .transpose()?;
                if let Some(layout) = RequestLayout::new(endpoint, body.as_ref()) {
                    scope.reserve(&layout.type_name)?;
                    wrappers.push((body, layout));
                }
            }
            let mut items = Vec::new();
            for (body, layout) in &wrappers {
                items.push(generate_request_type(
                    layout,
                    body.as_ref(),
                    &self.mapper,
                    usage,
                    &mut scope,
                    self.config.include_generic_optionals,
                )?);
            }
            self.files
                .push(finish_unit(dir.join("requests.rs"), &scope, quote! { #(#items)* })?);
        }

        for subpackage in subpackages {
            let nested = self.subpackages(&subpackage.package)?;
            let mut modules = Scope::new(subpackage.name.original());
            for module in ["client", "types", "errors", "requests"] {
                modules.reserve(module)?;
            }
            for child in &nested {
                modules.reserve(&child.name.safe_snake_case())?;
            }
            let child_dir = dir.join(subpackage.name.safe_snake_case());
            self.package(&subpackage.package, &nested, child_dir, None)?;
        }
        Ok(())
    }
}

/// Doc lines for inner `#![doc]` attributes.
fn inner_doc_lines(docs: Option<&str>) -> Vec<String> {
    docs.map(str::trim)
        .unwrap_or_default()
        .lines()
        .map(|line| format!(" {}", line.trim_end()))
        .collect()
}

/// Whether any endpoint of `package` gets a request wrapper type.
fn has_requests(package: &Package) -> bool {
    package.endpoints.iter().any(|endpoint| {
        endpoint.needs_request_parameter()
            && matches!(
                endpoint.sdk_request.as_ref().map(|r| &r.shape),
                Some(sdkgen_ir::SdkRequestShape::Wrapper { .. })
            )
    })
}

/// Generates every file of the SDK described by `ir`.
///
/// Generation is deterministic: the same IR and configuration always
/// produce the same files in the same order with the same content.
///
/// ## Errors
///
/// Returns the first error raised by any generation unit; no files are
/// produced in that case.
pub fn generate_sdk(
    ir: &IntermediateRepresentation,
    config: &GeneratorConfig,
) -> Result<Vec<GeneratedFile>, GeneratorError> {
    debug!(api = %ir.api_name, "generating sdk");
    SdkBuilder::new(ir, config).build()
}

/// Writes content to a file atomically using temp file + rename.
///
/// ## Errors
///
/// Returns `GeneratorError::Write` if parent directories cannot be created,
/// the temp file cannot be written or the rename fails.
pub fn write_atomic(path: &Path, content: &str) -> Result<(), GeneratorError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| GeneratorError::Write {
            path: parent.display().to_string(),
            source: e,
        })?;
    }

    let temp_path = path.with_extension("rs.tmp");
    fs::write(&temp_path, content).map_err(|e| GeneratorError::Write {
        path: temp_path.display().to_string(),
        source: e,
    })?;

    fs::rename(&temp_path, path).map_err(|e| GeneratorError::Write {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

/// Generates the SDK and writes it under `output_dir`.
///
/// With `dry_run`, files are printed to stdout instead of written. The
/// output directory is created if missing, as long as its parent exists.
///
/// ## Errors
///
/// Returns an error if generation fails, the output directory's parent does
/// not exist, or a file cannot be written. Nothing is written when
/// generation fails.
pub fn generate_and_write(
    ir: &IntermediateRepresentation,
    config: &GeneratorConfig,
    output_dir: &Path,
    dry_run: bool,
) -> Result<Vec<GeneratedFile>, GeneratorError> {
    let files = generate_sdk(ir, config)?;

    if dry_run {
        for file in &files {
            println!("=== {} ===\n{}\n", file.path.display(), file.content);
        }
        return Ok(files);
    }

    if !output_dir.is_dir() {
        let parent_exists = output_dir
            .parent()
            .is_none_or(|parent| parent.as_os_str().is_empty() || parent.is_dir());
        if !parent_exists {
            return Err(GeneratorError::OutputDirNotFound(
                output_dir.display().to_string(),
            ));
        }
    }

    for file in &files {
        let path = output_dir.join(&file.path);
        write_atomic(&path, &file.content)?;
        info!(path = %path.display(), "wrote file");
    }
    Ok(files)
}
