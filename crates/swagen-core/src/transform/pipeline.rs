use indexmap::IndexMap;
use log::debug;
use serde::Serialize;

use super::convert::Converter;
use super::model_rewriter::ModelRewriter;
use super::name_normalizer::NamingOptions;
use super::post_process::OperationPostProcessor;
use super::schema_rewriter::SchemaRewriter;
use super::type_mapper::TypeMapping;
use crate::error::TransformError;
use crate::model::{GeneratedModel, GeneratedOperation, OperationGroup};
use crate::parse::{OpenApiDocument, RefLookup, SchemaOrRef};

/// Tag for operations that declare none.
pub const DEFAULT_TAG: &str = "default";

/// Which rewrite and post-processing steps a generator variant enables.
///
/// Variants are data: each one is a `const` policy plus templates and a
/// package layout, and the same conversion runs for all of them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VariantPolicy {
    pub coerce_composed_arrays: bool,
    pub repair_nested_items: bool,
    pub flatten_all_of: bool,
    pub relax_composed_vars: bool,
    pub materialize_aliases: bool,
    pub escape_base_name_literals: bool,
    pub filter_operation_params: bool,
    pub detect_multipart: bool,
    pub path_params_first: bool,
    pub strip_leading_slash: bool,
    pub binary_param_type: Option<&'static str>,
}

impl VariantPolicy {
    /// Only empty-schema retyping, which every variant performs.
    pub const MINIMAL: VariantPolicy = VariantPolicy {
        coerce_composed_arrays: false,
        repair_nested_items: false,
        flatten_all_of: false,
        relax_composed_vars: false,
        materialize_aliases: false,
        escape_base_name_literals: false,
        filter_operation_params: false,
        detect_multipart: false,
        path_params_first: false,
        strip_leading_slash: false,
        binary_param_type: None,
    };
}

/// Option values that steer conversion for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionOptions {
    pub allow_empty_data_classes: bool,
    pub composed_array_as_any: bool,
    pub composed_vars_not_required: bool,
    pub generate_primitive_type_alias: bool,
    pub remove_operation_params: Vec<String>,
    pub naming: NamingOptions,
    pub types: TypeMapping,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            allow_empty_data_classes: false,
            composed_array_as_any: true,
            composed_vars_not_required: false,
            generate_primitive_type_alias: false,
            remove_operation_params: Vec::new(),
            naming: NamingOptions::default(),
            types: TypeMapping::default(),
        }
    }
}

/// Models and operation groups ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConvertedDocument {
    pub title: String,
    pub version: String,
    pub description: Option<String>,
    pub base_path: Option<String>,
    pub models: Vec<GeneratedModel>,
    pub operation_groups: Vec<OperationGroup>,
    /// Any operation in the document is multipart.
    pub is_multipart: bool,
}

/// Run the rewriter, the default conversion and the post-processor over a
/// whole document.
pub fn convert_document(
    doc: &OpenApiDocument,
    policy: &VariantPolicy,
    options: &ConversionOptions,
) -> Result<ConvertedDocument, TransformError> {
    let schema_rewriter = SchemaRewriter {
        allow_empty_data_classes: options.allow_empty_data_classes,
        composed_array_as_any: policy.coerce_composed_arrays && options.composed_array_as_any,
        repair_nested_items: policy.repair_nested_items,
    };
    let model_rewriter = ModelRewriter {
        flatten_all_of: policy.flatten_all_of,
        composed_vars_not_required: policy.relax_composed_vars
            && options.composed_vars_not_required,
        materialize_aliases: policy.materialize_aliases,
        allow_empty_data_classes: options.allow_empty_data_classes,
        generate_primitive_type_alias: options.generate_primitive_type_alias,
        escape_base_name_literals: policy.escape_base_name_literals,
    };

    // Rewrites work on a copy; references are resolved against the original.
    let original = RefLookup::new(doc);
    let mut components = doc.components.clone().unwrap_or_default();
    for (name, schema) in components.schemas.iter_mut() {
        if let SchemaOrRef::Schema(schema) = schema {
            schema_rewriter.rewrite(name, schema, &original);
        }
    }

    let converter = Converter::new(
        RefLookup::from_components(Some(&components)),
        &options.types,
        &options.naming,
    );

    let mut models = Vec::with_capacity(components.schemas.len());
    for (name, schema) in &components.schemas {
        let Some(schema) = schema.as_schema() else {
            debug!("Schema: {name} is a bare reference, no model generated");
            continue;
        };
        let mut model = converter.from_model(name, schema);
        model_rewriter.rewrite(&mut model);
        models.push(model);
    }

    let mut grouped: IndexMap<String, Vec<GeneratedOperation>> = IndexMap::new();
    for (path, item) in &doc.paths {
        for (method, op) in item.operations() {
            let operation = converter.from_operation(method, path, op, &item.parameters)?;
            let tag = op
                .tags
                .first()
                .cloned()
                .unwrap_or_else(|| DEFAULT_TAG.to_string());
            grouped.entry(tag).or_default().push(operation);
        }
    }

    let post_processor = OperationPostProcessor {
        remove_params: if policy.filter_operation_params {
            options.remove_operation_params.clone()
        } else {
            Vec::new()
        },
        detect_multipart: policy.detect_multipart,
        path_params_first: policy.path_params_first,
        binary_param_type: policy.binary_param_type.map(String::from),
        strip_leading_slash: policy.strip_leading_slash,
    };

    let mut is_multipart = false;
    let mut operation_groups = Vec::with_capacity(grouped.len());
    for (tag, operations) in grouped {
        let mut group = OperationGroup {
            class_name: options.naming.api_name(&tag),
            tag,
            operations,
            is_multipart: false,
        };
        post_processor.process(&mut group);
        is_multipart |= group.is_multipart;
        operation_groups.push(group);
    }

    Ok(ConvertedDocument {
        title: doc.info.title.clone(),
        version: doc.info.version.clone(),
        description: doc.info.description.clone(),
        base_path: doc.servers.first().map(|s| s.url.clone()),
        models,
        operation_groups,
        is_multipart,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    const DOC: &str = r#"
openapi: 3.0.3
info: {title: Mini, version: "2"}
servers:
  - url: https://api.example.com/v2
paths:
  /things:
    get:
      responses:
        "200": {description: ok}
components:
  schemas:
    Anything:
      description: free form
"#;

    #[test]
    fn untagged_operations_use_default_group() {
        let doc = parse::from_yaml(DOC).unwrap();
        let converted =
            convert_document(&doc, &VariantPolicy::MINIMAL, &ConversionOptions::default()).unwrap();
        assert_eq!(converted.operation_groups.len(), 1);
        assert_eq!(converted.operation_groups[0].class_name, "DefaultApi");
        assert_eq!(converted.operation_groups[0].operations[0].operation_id, "listThings");
        assert_eq!(converted.base_path.as_deref(), Some("https://api.example.com/v2"));
    }

    #[test]
    fn empty_schema_converts_to_string_alias() {
        let doc = parse::from_yaml(DOC).unwrap();
        let converted =
            convert_document(&doc, &VariantPolicy::MINIMAL, &ConversionOptions::default()).unwrap();
        let anything = &converted.models[0];
        assert!(anything.is_alias);
        assert_eq!(anything.data_type.as_deref(), Some("kotlin.String"));
    }

    #[test]
    fn original_document_is_untouched() {
        let doc = parse::from_yaml(DOC).unwrap();
        let before = doc.clone();
        convert_document(&doc, &VariantPolicy::MINIMAL, &ConversionOptions::default()).unwrap();
        assert_eq!(doc, before);
    }
}
