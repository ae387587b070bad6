use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The `type` keyword: a single name, or a list of names (OpenAPI 3.1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeSet {
    Single(String),
    Multiple(Vec<String>),
}

impl TypeSet {
    /// The first non-`null` type name, if any.
    pub fn primary(&self) -> Option<&str> {
        match self {
            TypeSet::Single(t) => Some(t.as_str()),
            TypeSet::Multiple(types) => types.iter().map(String::as_str).find(|t| *t != "null"),
        }
    }
}

/// A reference or inline schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaOrRef {
    Ref {
        #[serde(rename = "$ref")]
        ref_path: String,
    },
    Schema(Box<Schema>),
}

impl SchemaOrRef {
    pub fn inline(schema: Schema) -> Self {
        SchemaOrRef::Schema(Box::new(schema))
    }

    pub fn as_schema(&self) -> Option<&Schema> {
        match self {
            SchemaOrRef::Schema(s) => Some(s),
            SchemaOrRef::Ref { .. } => None,
        }
    }

    pub fn ref_path(&self) -> Option<&str> {
        match self {
            SchemaOrRef::Ref { ref_path } => Some(ref_path),
            SchemaOrRef::Schema(_) => None,
        }
    }
}

/// Structural kind of a schema node, as seen by the rewriter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    Primitive,
    Object,
    Array,
    Map,
    Composed,
}

/// The subset of JSON Schema the generator reads and rewrites.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Schema {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<TypeSet>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "default", skip_serializing_if = "Option::is_none")]
    pub default_value: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, SchemaOrRef>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,

    #[serde(
        rename = "additionalProperties",
        skip_serializing_if = "Option::is_none"
    )]
    pub additional_properties: Option<AdditionalProperties>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaOrRef>>,

    #[serde(rename = "allOf", default, skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<SchemaOrRef>,

    #[serde(rename = "oneOf", default, skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<SchemaOrRef>,

    #[serde(rename = "anyOf", default, skip_serializing_if = "Vec::is_empty")]
    pub any_of: Vec<SchemaOrRef>,

    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<serde_json::Value>,

    #[serde(rename = "readOnly", skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<serde_json::Value>,
}

/// `additionalProperties` can be a boolean or a schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Bool(bool),
    Schema(Box<SchemaOrRef>),
}

impl Schema {
    /// A schema with only a `type` keyword.
    pub fn of_type(name: &str) -> Self {
        Schema {
            schema_type: Some(TypeSet::Single(name.to_string())),
            ..Default::default()
        }
    }

    /// The generic object schema that maps to the target's top type.
    pub fn untyped_object() -> Self {
        Schema::of_type("object")
    }

    pub fn type_name(&self) -> Option<&str> {
        self.schema_type.as_ref().and_then(TypeSet::primary)
    }

    pub fn set_type(&mut self, name: &str) {
        self.schema_type = Some(TypeSet::Single(name.to_string()));
    }

    pub fn is_composed(&self) -> bool {
        !self.all_of.is_empty() || !self.one_of.is_empty() || !self.any_of.is_empty()
    }

    pub fn is_array(&self) -> bool {
        self.type_name() == Some("array") || (self.schema_type.is_none() && self.items.is_some())
    }

    /// An object whose only shape is `additionalProperties`.
    pub fn is_map(&self) -> bool {
        let object_like = matches!(self.type_name(), None | Some("object"));
        let open = match &self.additional_properties {
            Some(AdditionalProperties::Schema(_)) => true,
            Some(AdditionalProperties::Bool(b)) => *b,
            None => false,
        };
        object_like && open && self.properties.is_empty()
    }

    pub fn kind(&self) -> SchemaKind {
        if self.is_array() {
            SchemaKind::Array
        } else if self.is_map() {
            SchemaKind::Map
        } else if self.is_composed() {
            SchemaKind::Composed
        } else {
            match self.type_name() {
                Some("string" | "integer" | "number" | "boolean" | "file") => SchemaKind::Primitive,
                _ => SchemaKind::Object,
            }
        }
    }

    /// The value schema of a map, if declared.
    pub fn map_values(&self) -> Option<&SchemaOrRef> {
        match &self.additional_properties {
            Some(AdditionalProperties::Schema(s)) => Some(s),
            _ => None,
        }
    }

    pub fn is_required(&self, property: &str) -> bool {
        self.required.iter().any(|r| r == property)
    }
}
