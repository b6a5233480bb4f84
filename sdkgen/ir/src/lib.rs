//! Intermediate representation for sdkgen.
//!
//! This crate defines the language-agnostic description of an HTTP API that
//! `sdkgen-gen` turns into a typed Rust client SDK: packages of endpoints,
//! a type algebra, declared errors, auth schemes and environments.
//!
//! The types are plain data. They derive serde traits so an IR document can
//! be loaded from JSON, and carry small builder helpers for writing fixtures
//! in code.
//!
//! ## Examples
//!
//! ```
//! use sdkgen_ir::{
//!     HttpEndpoint, HttpMethod, HttpResponse, IntermediateRepresentation, PrimitiveType,
//!     QueryParameter, TypeReference,
//! };
//!
//! let mut ir = IntermediateRepresentation::new("acme");
//! ir.root_package.endpoints.push(
//!     HttpEndpoint::new("getUser", HttpMethod::Get, "/users/{userId}")
//!         .with_wrapper("request")
//!         .with_query(QueryParameter::new(
//!             "shallow",
//!             TypeReference::optional(TypeReference::primitive(PrimitiveType::Boolean)),
//!         ))
//!         .with_response(HttpResponse::json(TypeReference::string())),
//! );
//! assert_eq!(ir.root_package.endpoints[0].path_parameters.len(), 1);
//! ```

pub mod auth;
pub mod environments;
pub mod errors;
pub mod http;
pub mod ir;
pub mod name;
pub mod package;
pub mod types;

pub use auth::{ApiAuth, AuthScheme};
pub use environments::{
    EnvironmentBaseUrl, EnvironmentBaseUrlId, EnvironmentId, Environments, EnvironmentsConfig,
    MultipleBaseUrlsEnvironment, MultipleBaseUrlsEnvironments, SingleBaseUrlEnvironment,
    SingleBaseUrlEnvironments,
};
pub use errors::{
    DeclaredErrorName, ErrorDeclaration, ErrorDiscriminationStrategy, ErrorId, ResponseError,
};
pub use http::{
    FileProperty, FileUploadProperty, HttpEndpoint, HttpHeader, HttpMethod, HttpPath,
    HttpPathPart, HttpRequestBody, HttpResponse, InlinedRequestBodyProperty, PathParameter,
    QueryParameter, SdkRequest, SdkRequestShape, StreamingChunkType,
};
pub use ir::{IntermediateRepresentation, PlatformHeaders, SdkConfig};
pub use name::{Name, NameAndWireValue, RUST_KEYWORDS};
pub use package::{Package, PackagePath, Subpackage, SubpackageId};
pub use types::{
    ContainerType, DeclaredTypeName, EnumValue, Literal, ObjectProperty, PrimitiveType, TypeDeclaration,
    TypeId, TypeReference, TypeShape,
};
