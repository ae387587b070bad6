pub mod models;
pub mod operations;

pub use models::*;
pub use operations::*;

use indexmap::IndexMap;

/// Derived facts attached to a model or property for the template layer.
pub type VendorExtensions = IndexMap<String, serde_json::Value>;

/// Marks a model that should be rendered as a `typealias`.
pub const VENDOR_EXTENSION_IS_ALIAS: &str = "x-is-alias";

/// The wire name escaped for use inside a generated string literal.
pub const VENDOR_EXTENSION_BASE_NAME_LITERAL: &str = "x-base-name-literal";
