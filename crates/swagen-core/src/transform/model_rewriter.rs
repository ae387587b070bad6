use log::info;
use serde_json::Value;

use crate::model::{GeneratedModel, VENDOR_EXTENSION_BASE_NAME_LITERAL, VENDOR_EXTENSION_IS_ALIAS};

/// Rewrites applied to a converted model, in order: allOf flattening,
/// composed-variable optionality, alias materialization and literal-safe
/// name escaping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModelRewriter {
    pub flatten_all_of: bool,
    pub composed_vars_not_required: bool,
    pub materialize_aliases: bool,
    pub allow_empty_data_classes: bool,
    pub generate_primitive_type_alias: bool,
    pub escape_base_name_literals: bool,
}

impl ModelRewriter {
    pub fn rewrite(&self, model: &mut GeneratedModel) {
        if self.flatten_all_of {
            flatten_all_of(model);
        }
        if self.composed_vars_not_required {
            relax_composed_vars(model);
        }
        if self.materialize_aliases {
            mark_type_alias(
                model,
                self.allow_empty_data_classes,
                self.generate_primitive_type_alias,
            );
        }
        if self.escape_base_name_literals {
            escape_base_name_literals(model);
        }
    }
}

/// Replace inheritance with one concrete variable list.
pub fn flatten_all_of(model: &mut GeneratedModel) -> bool {
    if model.all_of.is_empty() {
        return false;
    }
    model.parent = None;
    model.parent_vars.clear();
    for var in &mut model.all_vars {
        var.is_inherited = false;
    }
    model.vars = model.all_vars.clone();
    model.rebuild_views();
    true
}

/// Make every variable of a oneOf/anyOf model optional.
pub fn relax_composed_vars(model: &mut GeneratedModel) -> bool {
    if !model.has_composed_members() {
        return false;
    }
    model.for_each_property_mut(|var| var.required = false);
    model.rebuild_views();
    true
}

/// Mark a model to be rendered as a `typealias`.
pub fn mark_type_alias(
    model: &mut GeneratedModel,
    allow_empty_data_classes: bool,
    generate_primitive_type_alias: bool,
) -> bool {
    let no_properties = model.property_view_count() == 0;
    let marked = (!allow_empty_data_classes && no_properties)
        || (generate_primitive_type_alias && model.is_alias);
    if !marked {
        return false;
    }
    info!("Model: {} marked as typealias", model.name);
    model
        .vendor_extensions
        .insert(VENDOR_EXTENSION_IS_ALIAS.to_string(), Value::Bool(true));
    if model.data_type.is_none() {
        model.data_type = model.parent.clone();
    }
    if generate_primitive_type_alias {
        model.is_alias = false;
    }
    true
}

/// Attach the wire name with `$` escaped, for use inside Kotlin string
/// literals.
pub fn escape_base_name_literals(model: &mut GeneratedModel) {
    model.for_each_property_mut(|var| {
        let literal = var.base_name.replace('$', "\\$");
        var.vendor_extensions.insert(
            VENDOR_EXTENSION_BASE_NAME_LITERAL.to_string(),
            Value::String(literal),
        );
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GeneratedProperty;

    fn var(name: &str, required: bool, inherited: bool) -> GeneratedProperty {
        GeneratedProperty {
            name: name.into(),
            base_name: name.into(),
            data_type: "kotlin.String".into(),
            base_type: "kotlin.String".into(),
            required,
            is_inherited: inherited,
            ..Default::default()
        }
    }

    fn dog() -> GeneratedModel {
        let inherited = vec![var("name", true, true), var("kind", false, true)];
        let own = vec![var("bark", true, false)];
        let mut model = GeneratedModel {
            name: "Dog".into(),
            class_name: "Dog".into(),
            parent: Some("Animal".into()),
            all_of: vec!["Animal".into()],
            parent_vars: inherited.clone(),
            all_vars: inherited.into_iter().chain(own.clone()).collect(),
            vars: own,
            ..Default::default()
        };
        model.rebuild_views();
        model
    }

    #[test]
    fn flattening_detaches_parent() {
        let mut model = dog();
        let expected = model.all_vars.len();
        assert!(flatten_all_of(&mut model));
        assert_eq!(model.parent, None);
        assert_eq!(model.vars.len(), expected);
        assert!(model.vars.iter().all(|v| !v.is_inherited));
        assert!(model.all_vars.iter().all(|v| !v.is_inherited));
        assert!(model.parent_vars.is_empty());
        assert_eq!(model.required_vars.len(), 2);
    }

    #[test]
    fn flattening_without_all_of_is_noop() {
        let mut model = GeneratedModel {
            vars: vec![var("a", true, false)],
            ..Default::default()
        };
        let before = model.clone();
        assert!(!flatten_all_of(&mut model));
        assert_eq!(model, before);
    }

    #[test]
    fn composed_vars_become_optional() {
        let mut model = GeneratedModel {
            one_of: vec!["Cat".into(), "Dog".into()],
            vars: vec![var("name", true, false)],
            all_vars: vec![var("name", true, false)],
            ..Default::default()
        };
        model.rebuild_views();
        assert!(relax_composed_vars(&mut model));
        assert!(model.vars.iter().chain(&model.all_vars).all(|v| !v.required));
        assert!(model.required_vars.is_empty());
        assert_eq!(model.optional_vars.len(), 1);
    }

    #[test]
    fn all_of_alone_keeps_required_flags() {
        let mut model = dog();
        assert!(!relax_composed_vars(&mut model));
        assert!(model.all_vars[0].required);
    }

    #[test]
    fn property_less_model_becomes_alias() {
        let mut model = GeneratedModel {
            name: "Ids".into(),
            parent: Some("kotlin.Array<kotlin.String>".into()),
            is_array: true,
            ..Default::default()
        };
        assert!(mark_type_alias(&mut model, false, false));
        assert_eq!(model.vendor_extensions[VENDOR_EXTENSION_IS_ALIAS], Value::Bool(true));
        assert_eq!(model.data_type.as_deref(), Some("kotlin.Array<kotlin.String>"));
    }

    #[test]
    fn primitive_alias_is_materialized() {
        let mut model = GeneratedModel {
            name: "PetId".into(),
            data_type: Some("kotlin.Long".into()),
            is_alias: true,
            ..Default::default()
        };
        assert!(mark_type_alias(&mut model, true, true));
        assert!(!model.is_alias);
        assert_eq!(model.data_type.as_deref(), Some("kotlin.Long"));
    }

    #[test]
    fn empty_classes_allowed_skips_marker() {
        let mut model = GeneratedModel::default();
        assert!(!mark_type_alias(&mut model, true, false));
        assert!(model.vendor_extensions.is_empty());
    }

    #[test]
    fn base_name_literals_escape_dollar() {
        let mut model = GeneratedModel {
            vars: vec![var("$ref", false, false)],
            all_vars: vec![var("$ref", false, false)],
            ..Default::default()
        };
        model.rebuild_views();
        escape_base_name_literals(&mut model);
        model.for_each_property_mut(|v| {
            assert_eq!(
                v.vendor_extensions[VENDOR_EXTENSION_BASE_NAME_LITERAL],
                Value::String("\\$ref".into())
            );
        });
    }
}
