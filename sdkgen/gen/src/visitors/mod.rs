//! Exhaustive dispatch over the IR's union types.
//!
//! Each visitor turns one IR union into a small model the code generators
//! consume. Every variant is matched explicitly; a variant without a
//! generation strategy fails with a descriptive error instead of being
//! skipped.

pub mod auth;
pub mod environments;
pub mod request_body;

pub use auth::{AuthExample, ClientOptionsModel, OptionEntry};
pub use environments::{EnvironmentsModel, resolve_base_url, sorted_urls};
pub use request_body::{BodyLiteral, BodyProperties, RequestBodyModel};
