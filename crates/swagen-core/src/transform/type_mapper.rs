use indexmap::IndexMap;
use log::warn;

use crate::parse::Schema;

/// Date/time representation selected by the `dateLibrary` option.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateLibrary {
    #[default]
    Java8,
    ThreeTenBp,
    String,
    Millis,
}

impl DateLibrary {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "java8" => Some(DateLibrary::Java8),
            "threetenbp" => Some(DateLibrary::ThreeTenBp),
            "string" => Some(DateLibrary::String),
            "millis" => Some(DateLibrary::Millis),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DateLibrary::Java8 => "java8",
            DateLibrary::ThreeTenBp => "threetenbp",
            DateLibrary::String => "string",
            DateLibrary::Millis => "millis",
        }
    }
}

/// Container type selected by the `collectionType` option.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CollectionType {
    #[default]
    Array,
    List,
}

impl CollectionType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "array" => Some(CollectionType::Array),
            "list" => Some(CollectionType::List),
            _ => None,
        }
    }
}

/// Schema type key → Kotlin type.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeMapping {
    table: IndexMap<String, String>,
}

const DEFAULT_MAPPINGS: &[(&str, &str)] = &[
    ("string", "kotlin.String"),
    ("boolean", "kotlin.Boolean"),
    ("integer", "kotlin.Int"),
    ("int32", "kotlin.Int"),
    ("int64", "kotlin.Long"),
    ("float", "kotlin.Float"),
    ("double", "kotlin.Double"),
    ("number", "java.math.BigDecimal"),
    ("date", "java.time.LocalDate"),
    ("date-time", "java.time.OffsetDateTime"),
    ("uuid", "java.util.UUID"),
    ("uri", "java.net.URI"),
    ("binary", "kotlin.ByteArray"),
    ("byte", "kotlin.ByteArray"),
    ("file", "java.io.File"),
    ("array", "kotlin.Array"),
    ("list", "kotlin.collections.List"),
    ("map", "kotlin.collections.Map"),
    ("object", "kotlin.Any"),
];

impl Default for TypeMapping {
    fn default() -> Self {
        Self {
            table: DEFAULT_MAPPINGS
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl TypeMapping {
    /// Mapped type for `key`; unknown keys map to the top type.
    pub fn get(&self, key: &str) -> &str {
        self.table
            .get(key)
            .or_else(|| self.table.get("object"))
            .map(String::as_str)
            .unwrap_or("kotlin.Any")
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.table.insert(key.to_string(), value.to_string());
    }

    pub fn apply_date_library(&mut self, library: DateLibrary) {
        match library {
            DateLibrary::Java8 => {}
            DateLibrary::ThreeTenBp => {
                self.set("date", "org.threeten.bp.LocalDate");
                self.set("date-time", "org.threeten.bp.LocalDateTime");
            }
            DateLibrary::String => {
                self.set("date", "kotlin.String");
                self.set("date-time", "kotlin.String");
            }
            DateLibrary::Millis => {
                self.set("date", "kotlin.String");
                self.set("date-time", "kotlin.Long");
            }
        }
    }

    /// Apply a raw `dateLibrary` value. Unknown values keep the defaults.
    pub fn apply_date_library_option(&mut self, value: &str) -> Option<DateLibrary> {
        match DateLibrary::parse(value) {
            Some(library) => {
                self.apply_date_library(library);
                Some(library)
            }
            None => {
                warn!("Unknown dateLibrary '{value}', keeping default date types");
                None
            }
        }
    }

    pub fn apply_collection_type(&mut self, collection: CollectionType) {
        if collection == CollectionType::List {
            self.set("array", "kotlin.collections.List");
            self.set("list", "kotlin.collections.List");
        }
    }

    /// Mapping key for a non-container schema.
    pub fn schema_key(schema: &Schema) -> &'static str {
        let format = schema.format.as_deref();
        match schema.type_name() {
            Some("string") => match format {
                Some("date") => "date",
                Some("date-time") => "date-time",
                Some("uuid") => "uuid",
                Some("uri") => "uri",
                Some("binary") => "binary",
                Some("byte") => "byte",
                _ => "string",
            },
            Some("integer") => match format {
                Some("int32") => "int32",
                Some("int64") => "int64",
                _ => "integer",
            },
            Some("number") => match format {
                Some("float") => "float",
                Some("double") => "double",
                _ => "number",
            },
            Some("boolean") => "boolean",
            Some("file") => "file",
            Some("array") => "array",
            _ if schema.is_map() => "map",
            _ => "object",
        }
    }

    /// Mapped type of a primitive or untyped schema.
    pub fn primitive(&self, schema: &Schema) -> &str {
        self.get(Self::schema_key(schema))
    }
}
