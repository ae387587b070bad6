use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Value of one additional property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<PropertyValue>),
}

/// Ordered option bag handed to a generator run.
pub type AdditionalProperties = IndexMap<String, PropertyValue>;

impl PropertyValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Booleans, plus the strings `"true"`/`"false"` (case-insensitive).
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            PropertyValue::String(s) if s.eq_ignore_ascii_case("true") => Some(true),
            PropertyValue::String(s) if s.eq_ignore_ascii_case("false") => Some(false),
            _ => None,
        }
    }

    /// String entries of a list; anything else yields nothing.
    pub fn as_string_list(&self) -> Vec<String> {
        match self {
            PropertyValue::List(items) => items
                .iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Bool(b) => write!(f, "{b}"),
            PropertyValue::Number(n) => write!(f, "{n}"),
            PropertyValue::String(s) => f.write_str(s),
            PropertyValue::List(items) => {
                let parts: Vec<String> = items.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::String(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<Vec<&str>> for PropertyValue {
    fn from(values: Vec<&str>) -> Self {
        PropertyValue::List(values.into_iter().map(PropertyValue::from).collect())
    }
}

/// Read a boolean option and store the parsed value back, so templates see
/// a real boolean even when the caller wrote `"true"`.
pub fn bool_and_write_back(props: &mut AdditionalProperties, key: &str) -> Option<bool> {
    let value = props.get(key)?.as_bool().unwrap_or(false);
    props.insert(key.to_string(), PropertyValue::Bool(value));
    Some(value)
}

/// Describes one option a generator variant accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CliOption {
    pub key: &'static str,
    pub description: &'static str,
    pub default: Option<&'static str>,
    /// Accepted values with descriptions, for enumerated options.
    pub values: &'static [(&'static str, &'static str)],
}

impl CliOption {
    pub const fn new(key: &'static str, description: &'static str) -> Self {
        Self {
            key,
            description,
            default: None,
            values: &[],
        }
    }

    pub const fn boolean(key: &'static str, description: &'static str, default: bool) -> Self {
        Self {
            key,
            description,
            default: Some(if default { "true" } else { "false" }),
            values: &[],
        }
    }

    pub const fn with_default(mut self, default: &'static str) -> Self {
        self.default = Some(default);
        self
    }

    pub const fn with_values(mut self, values: &'static [(&'static str, &'static str)]) -> Self {
        self.values = values;
        self
    }

    pub fn accepts(&self, value: &str) -> bool {
        self.values.is_empty() || self.values.iter().any(|(v, _)| *v == value)
    }

    pub fn allowed_values(&self) -> String {
        let names: Vec<&str> = self.values.iter().map(|(v, _)| *v).collect();
        names.join(", ")
    }
}

/// Option keys read or written by the generator layer.
pub mod keys {
    pub const DATE_LIBRARY: &str = "dateLibrary";
    pub const COLLECTION_TYPE: &str = "collectionType";
    pub const GENERATE_INFRASTRUCTURE: &str = "generateInfrastructure";
    pub const HEADERS: &str = "headers";
    pub const EMPTY_DATA_CLASSES: &str = "emptyDataClasses";
    pub const COMPOSED_ARRAY_AS_ANY: &str = "composedArrayAsAny";
    pub const COMPOSED_VARS_NOT_REQUIRED: &str = "composedVarsNotRequired";
    pub const GENERATE_PRIMITIVE_TYPE_ALIAS: &str = "generatePrimitiveTypeAlias";
    pub const REMOVE_OPERATION_PARAMS: &str = "removeOperationParams";
    pub const REMOVE_MINUS_TEXT_IN_HEADER_PROPERTY: &str = "removeMinusTextInHeaderProperty";
    pub const IGNORE_ENDPOINT_STARTING_SLASH: &str = "ignoreEndpointStartingSlash";
    pub const ENUM_PROPERTY_NAMING: &str = "enumPropertyNaming";
    pub const MODEL_NAME_PREFIX: &str = "modelNamePrefix";
    pub const MODEL_NAME_SUFFIX: &str = "modelNameSuffix";
    pub const API_NAME_SUFFIX: &str = "apiNameSuffix";
    pub const REQUEST_DATE_CONVERTER: &str = "requestDateConverter";
    pub const LIBRARY: &str = "library";
    pub const PACKAGE_NAME: &str = "packageName";
    pub const API_PACKAGE: &str = "apiPackage";
    pub const MODEL_PACKAGE: &str = "modelPackage";
    pub const SOURCE_FOLDER: &str = "sourceFolder";
    pub const ARTIFACT_ID: &str = "artifactId";
    pub const IS_LIST: &str = "isList";
}
