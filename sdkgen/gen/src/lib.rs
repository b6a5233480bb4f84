//! sdkgen code generator library.
//!
//! This crate turns an `sdkgen-ir` document describing an HTTP API into the
//! source of a typed Rust client SDK. The generated code includes:
//!
//! - Model types, structured error types and request wrapper types
//! - One `Client` per package with an async method per endpoint
//! - Functional client options for auth schemes and custom headers
//! - Environment URL constants
//!
//! ## Modules
//!
//! - [`codegen`] - Code generation for the individual pieces of the SDK
//! - [`visitors`] - Classification of the IR's sum types (environments, bodies, auth)
//! - [`type_mapper`] / [`value_format`] - Type expressions and transport strings
//! - [`scope`] - Collision-free identifier and import allocation
//! - [`output`] - Assembly, validation, formatting and file writing
//! - [`parser`] / [`config`] - Loading IR documents and generator configuration
//!
//! ## Example Usage
//!
//! ```no_run
//! use std::path::Path;
//! use sdkgen_gen::config::GeneratorConfig;
//! use sdkgen_gen::output::generate_and_write;
//! use sdkgen_gen::parser::load_ir;
//!
//! let ir = load_ir(Path::new("api/ir.json")).unwrap();
//! let files = generate_and_write(&ir, &GeneratorConfig::default(), Path::new("sdk/src"), true)
//!     .unwrap();
//! println!("{} files", files.len());
//! ```

pub mod codegen;
pub mod config;
pub mod errors;
pub mod output;
pub mod parser;
pub mod registry;
pub mod scope;
pub mod type_mapper;
pub mod value_format;
pub mod visitors;
