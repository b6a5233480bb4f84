//! Error types for the sdkgen generator.

use sdkgen_ir::{ErrorId, SubpackageId, TypeId};
use thiserror::Error;

/// Errors that can occur during code generation.
///
/// Every variant is fatal to the generation unit that raised it. Generation
/// is a pure function of the IR, so retrying the same input fails the same way.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// Failed to load the IR or configuration document
    #[error("Failed to parse document: {0}")]
    Parse(String),

    /// Emitted tokens did not form a valid Rust file
    #[error("Code generation failed: {0}")]
    CodeGen(String),

    /// Failed to write output file
    #[error("Failed to write output file '{path}': {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Output directory does not exist
    #[error("Output directory does not exist: {0}")]
    OutputDirNotFound(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The IR references a type id that was never declared.
    #[error("Unknown type '{0}': the IR references a type that is not declared")]
    UnknownType(TypeId),

    /// The IR references an error id that was never declared.
    #[error("Unknown error '{0}': the IR references an error that is not declared")]
    UnknownError(ErrorId),

    /// The IR references a subpackage id that was never declared.
    #[error("Unknown subpackage '{0}'")]
    UnknownSubpackage(SubpackageId),

    /// An environment id does not exist in the environments config.
    #[error("Unknown environment '{0}'")]
    UnknownEnvironment(String),

    /// A request body shape has no generation strategy.
    #[error("Endpoint '{endpoint}': {kind} requests are not supported yet")]
    UnsupportedRequestBody {
        /// The endpoint whose body was rejected.
        endpoint: String,
        /// The body variant, e.g. `bytes`.
        kind: String,
    },

    /// An endpoint has inputs but no request parameter to carry them.
    #[error("Endpoint '{endpoint}': {inputs} cannot be sent without a request parameter")]
    UnboundRequestInputs {
        /// The endpoint whose inputs would be dropped.
        endpoint: String,
        /// The kinds of input, e.g. `query parameters, body`.
        inputs: String,
    },

    /// A response shape has no generation strategy.
    #[error("Endpoint '{endpoint}': unsupported {kind} response type")]
    UnsupportedResponseType {
        /// The endpoint whose response was rejected.
        endpoint: String,
        /// The response variant.
        kind: String,
    },

    /// Two bindings received the same name within one scope.
    ///
    /// The scope allocator guarantees unique names, so this indicates an
    /// allocator bug rather than a problem with the IR.
    #[error("Naming conflict in scope '{scope}': '{name}' is already bound")]
    NamingConflict {
        /// The scope (file or endpoint) where the conflict happened.
        scope: String,
        /// The conflicting identifier.
        name: String,
    },
}
