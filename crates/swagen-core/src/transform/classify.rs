use crate::parse::{Schema, SchemaKind};

/// Shape of a schema node as seen by the rewriter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaClass {
    /// No type, no properties, and not a container or composition.
    Empty,
    Composed,
    /// An array whose inline item schema is a composition.
    ArrayOfComposed,
    /// A pure type alias: a primitive with no enum and no own properties.
    Alias,
    Normal,
}

pub fn classify(schema: &Schema) -> SchemaClass {
    if schema.is_array() {
        let composed_items = schema
            .items
            .as_deref()
            .and_then(|items| items.as_schema())
            .is_some_and(Schema::is_composed);
        return if composed_items {
            SchemaClass::ArrayOfComposed
        } else {
            SchemaClass::Normal
        };
    }
    if schema.is_map() {
        return SchemaClass::Normal;
    }
    if schema.is_composed() {
        return SchemaClass::Composed;
    }
    if schema.type_name().is_none_or(str::is_empty) && schema.properties.is_empty() {
        return SchemaClass::Empty;
    }
    if is_type_alias(schema) {
        return SchemaClass::Alias;
    }
    SchemaClass::Normal
}

/// A schema that only renames a primitive type.
pub fn is_type_alias(schema: &Schema) -> bool {
    schema.kind() == SchemaKind::Primitive
        && schema.enum_values.is_empty()
        && schema.properties.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> Schema {
        serde_yaml_ng::from_str(yaml).unwrap()
    }

    #[test]
    fn empty_schemas() {
        assert_eq!(classify(&parse("description: nothing here")), SchemaClass::Empty);
        assert_eq!(classify(&parse("type: ''")), SchemaClass::Empty);
        assert_eq!(
            classify(&parse("properties:\n  a: {type: string}")),
            SchemaClass::Normal
        );
    }

    #[test]
    fn containers_are_never_empty() {
        assert_eq!(classify(&parse("additionalProperties: true")), SchemaClass::Normal);
        assert_eq!(classify(&parse("items: {type: string}")), SchemaClass::Normal);
    }

    #[test]
    fn composed_and_array_of_composed() {
        assert_eq!(
            classify(&parse("anyOf:\n  - {type: string}\n  - {type: integer}")),
            SchemaClass::Composed
        );
        assert_eq!(
            classify(&parse(
                "type: array\nitems:\n  oneOf:\n    - $ref: '#/components/schemas/A'"
            )),
            SchemaClass::ArrayOfComposed
        );
        assert_eq!(
            classify(&parse("type: array\nitems:\n  $ref: '#/components/schemas/A'")),
            SchemaClass::Normal
        );
    }

    #[test]
    fn aliases() {
        assert_eq!(classify(&parse("type: string\nformat: uuid")), SchemaClass::Alias);
        assert_eq!(
            classify(&parse("type: string\nenum: [a, b]")),
            SchemaClass::Normal
        );
    }
}
