use std::collections::HashSet;

use log::{debug, info};

use super::classify::{SchemaClass, classify};
use crate::parse::{RefLookup, Schema, SchemaKind, SchemaOrRef};

/// Rewrites applied to a component schema before it is converted to a model.
///
/// Steps run in a fixed order: empty-to-string retyping (top level only),
/// composed-array coercion, then nested container item repair. The last two
/// also descend into inline property and item schemas. Every step is
/// idempotent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchemaRewriter {
    pub allow_empty_data_classes: bool,
    pub composed_array_as_any: bool,
    pub repair_nested_items: bool,
}

impl SchemaRewriter {
    pub fn rewrite(&self, name: &str, schema: &mut Schema, lookup: &RefLookup<'_>) {
        if !self.allow_empty_data_classes {
            retype_empty(name, schema);
        }
        self.rewrite_nested(name, schema, lookup);
    }

    fn rewrite_nested(&self, name: &str, schema: &mut Schema, lookup: &RefLookup<'_>) {
        if self.composed_array_as_any {
            coerce_composed_array(name, schema);
        }
        if self.repair_nested_items {
            repair_nested_items(name, schema, lookup);
        }
        for (prop_name, prop) in schema.properties.iter_mut() {
            if let SchemaOrRef::Schema(inner) = prop {
                self.rewrite_nested(&format!("{name}.{prop_name}"), inner, lookup);
            }
        }
        if let Some(SchemaOrRef::Schema(items)) = schema.items.as_deref_mut() {
            self.rewrite_nested(&format!("{name}[]"), items, lookup);
        }
    }
}

/// Give an empty schema the `string` type. Returns whether it changed.
pub fn retype_empty(name: &str, schema: &mut Schema) -> bool {
    if classify(schema) != SchemaClass::Empty {
        return false;
    }
    info!("Schema: {name} retyped to \"string\"");
    schema.set_type("string");
    true
}

/// Replace composed array items with the untyped object schema.
pub fn coerce_composed_array(name: &str, schema: &mut Schema) -> bool {
    if classify(schema) != SchemaClass::ArrayOfComposed {
        return false;
    }
    info!("Schema: {name} array of composed items coerced to untyped objects");
    schema.items = Some(Box::new(SchemaOrRef::inline(Schema::untyped_object())));
    true
}

/// Inline referenced array/map item schemas so nested containers keep their
/// full generic type. Unresolvable references are left as they are.
pub fn repair_nested_items(name: &str, schema: &mut Schema, lookup: &RefLookup<'_>) -> bool {
    let mut visited = HashSet::new();
    repair_items(name, schema, lookup, &mut visited)
}

fn repair_items(
    name: &str,
    schema: &mut Schema,
    lookup: &RefLookup<'_>,
    visited: &mut HashSet<String>,
) -> bool {
    if !schema.is_array() {
        return false;
    }
    let Some(items) = schema.items.as_deref_mut() else {
        return false;
    };
    let ref_path = match items {
        SchemaOrRef::Schema(inner) => return repair_items(name, inner, lookup, visited),
        SchemaOrRef::Ref { ref_path } => ref_path.clone(),
    };
    if !visited.insert(ref_path.clone()) {
        return false;
    }
    let target = match lookup.schema(&ref_path) {
        Ok(target) => target,
        Err(err) => {
            debug!("Schema: {name} item reference left unresolved: {err}");
            return false;
        }
    };
    if !matches!(target.kind(), SchemaKind::Array | SchemaKind::Map) {
        return false;
    }
    info!("Schema: {name} nested item {ref_path} inlined");
    let mut resolved = target.clone();
    repair_items(name, &mut resolved, lookup, visited);
    *items = SchemaOrRef::inline(resolved);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    fn schema(yaml: &str) -> Schema {
        serde_yaml_ng::from_str(yaml).unwrap()
    }

    const DOC: &str = r#"
openapi: 3.0.3
info: {title: Nested, version: "1"}
components:
  schemas:
    Row:
      type: array
      items: {type: integer}
    Labels:
      type: object
      additionalProperties: {type: string}
    Pet:
      type: object
      properties:
        name: {type: string}
"#;

    #[test]
    fn empty_schema_becomes_string() {
        let mut s = schema("description: free text");
        assert!(retype_empty("Note", &mut s));
        assert_eq!(s.type_name(), Some("string"));
        assert!(!retype_empty("Note", &mut s));
    }

    #[test]
    fn allow_empty_keeps_schema() {
        let doc = parse::from_yaml(DOC).unwrap();
        let rewriter = SchemaRewriter {
            allow_empty_data_classes: true,
            ..Default::default()
        };
        let mut s = schema("description: free text");
        rewriter.rewrite("Note", &mut s, &RefLookup::new(&doc));
        assert_eq!(s.type_name(), None);
    }

    #[test]
    fn composed_items_become_untyped_objects() {
        let mut s = schema("type: array\nitems:\n  oneOf:\n    - {type: string}\n    - {type: integer}");
        assert!(coerce_composed_array("Mixed", &mut s));
        let items = s.items.as_deref().and_then(SchemaOrRef::as_schema).unwrap();
        assert_eq!(items, &Schema::untyped_object());
        assert!(!coerce_composed_array("Mixed", &mut s));
    }

    #[test]
    fn coercion_descends_into_properties() {
        let doc = parse::from_yaml(DOC).unwrap();
        let rewriter = SchemaRewriter {
            composed_array_as_any: true,
            ..Default::default()
        };
        let mut s = schema(
            "type: object\nproperties:\n  values:\n    type: array\n    items:\n      anyOf:\n        - {type: string}\n        - {type: boolean}",
        );
        rewriter.rewrite("Holder", &mut s, &RefLookup::new(&doc));
        let values = s.properties["values"].as_schema().unwrap();
        let items = values.items.as_deref().and_then(SchemaOrRef::as_schema).unwrap();
        assert!(!items.is_composed());
    }

    #[test]
    fn nested_array_and_map_items_are_inlined() {
        let doc = parse::from_yaml(DOC).unwrap();
        let lookup = RefLookup::new(&doc);

        let mut matrix = schema("type: array\nitems:\n  $ref: '#/components/schemas/Row'");
        assert!(repair_nested_items("Matrix", &mut matrix, &lookup));
        let row = matrix.items.as_deref().and_then(SchemaOrRef::as_schema).unwrap();
        assert!(row.is_array());

        let mut label_sets = schema("type: array\nitems:\n  $ref: '#/components/schemas/Labels'");
        assert!(repair_nested_items("LabelSets", &mut label_sets, &lookup));
    }

    #[test]
    fn object_items_keep_their_reference() {
        let doc = parse::from_yaml(DOC).unwrap();
        let mut pets = schema("type: array\nitems:\n  $ref: '#/components/schemas/Pet'");
        assert!(!repair_nested_items("Pets", &mut pets, &RefLookup::new(&doc)));
        assert!(pets.items.as_deref().and_then(SchemaOrRef::ref_path).is_some());
    }

    #[test]
    fn unresolvable_items_are_left_alone() {
        let doc = parse::from_yaml(DOC).unwrap();
        let mut s = schema("type: array\nitems:\n  $ref: '#/components/schemas/Missing'");
        let before = s.clone();
        assert!(!repair_nested_items("Broken", &mut s, &RefLookup::new(&doc)));
        assert_eq!(s, before);
    }

    #[test]
    fn rewriting_twice_matches_rewriting_once() {
        let doc = parse::from_yaml(DOC).unwrap();
        let lookup = RefLookup::new(&doc);
        let rewriter = SchemaRewriter {
            composed_array_as_any: true,
            repair_nested_items: true,
            ..Default::default()
        };
        for yaml in [
            "description: empty",
            "type: array\nitems:\n  oneOf:\n    - {type: string}",
            "type: array\nitems:\n  $ref: '#/components/schemas/Row'",
        ] {
            let mut once = schema(yaml);
            rewriter.rewrite("S", &mut once, &lookup);
            let mut twice = once.clone();
            rewriter.rewrite("S", &mut twice, &lookup);
            assert_eq!(once, twice);
        }
    }
}
