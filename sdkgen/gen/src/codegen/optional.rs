//! `optional.rs` generation: constructors for explicitly-null-able fields.

use proc_macro2::TokenStream;
use quote::quote;

/// Generates `optional(value)` and `null()` over `crate::core::Optional`.
///
/// Only emitted when generic optionals are enabled.
pub fn generate_optional_helpers() -> TokenStream {
    quote! {
        /// Wraps a value that will be sent on the wire.
        pub fn optional<T>(value: T) -> crate::core::Optional<T> {
            crate::core::Optional::value(value)
        }

        /// A value that will be sent as an explicit `null`.
        pub fn null<T>() -> crate::core::Optional<T> {
            crate::core::Optional::null()
        }
    }
}
