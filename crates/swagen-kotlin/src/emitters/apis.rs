use minijinja::{Environment, Value, context};
use swagen_core::GeneratedFile;
use swagen_core::error::GeneratorError;
use swagen_core::model::{GeneratedOperation, GeneratedParameter, OperationGroup, ParameterKind};
use swagen_core::transform::ConvertedDocument;

use super::models::file_stem;
use super::{package_dir, render};
use crate::options::RunSettings;

const UNIT: &str = "kotlin.Unit";

/// One `<ApiClass>.kt` per operation group under the api package.
pub fn emit_apis(
    env: &Environment<'_>,
    doc: &ConvertedDocument,
    settings: &RunSettings,
) -> Result<Vec<GeneratedFile>, GeneratorError> {
    let dir = package_dir(&settings.source_folder, &settings.layout.api_package);
    doc.operation_groups
        .iter()
        .map(|group| {
            Ok(GeneratedFile {
                path: format!("{dir}/{}.kt", file_stem(&group.class_name)),
                content: render(env, "api.kt.j2", group_context(group, doc, settings))?,
            })
        })
        .collect()
}

pub fn emit_api_docs(
    env: &Environment<'_>,
    doc: &ConvertedDocument,
    settings: &RunSettings,
) -> Result<Vec<GeneratedFile>, GeneratorError> {
    doc.operation_groups
        .iter()
        .map(|group| {
            Ok(GeneratedFile {
                path: format!("docs/{}.md", file_stem(&group.class_name)),
                content: render(env, "api_doc.md.j2", group_context(group, doc, settings))?,
            })
        })
        .collect()
}

fn group_context(group: &OperationGroup, doc: &ConvertedDocument, settings: &RunSettings) -> Value {
    let operations: Vec<Value> = group.operations.iter().map(operation_context).collect();
    context! {
        class_name => group.class_name.clone(),
        tag => group.tag.clone(),
        is_multipart => group.is_multipart,
        operations => operations,
        api_package => settings.layout.api_package.clone(),
        model_package => settings.layout.model_package.clone(),
        base_path => doc.base_path.clone(),
    }
}

fn operation_context(op: &GeneratedOperation) -> Value {
    let params: Vec<Value> = op
        .all_params
        .iter()
        .map(|p| {
            context! {
                base_name => p.base_name.clone(),
                param_name => p.param_name.clone(),
                data_type => p.data_type.clone(),
                description => p.description.clone(),
                kind => Value::from_serialize(p.kind),
                required => p.required,
                has_more => p.has_more,
                annotation => retrofit_annotation(p, op.is_multipart),
            }
        })
        .collect();

    context! {
        nickname => op.nickname.clone(),
        operation_id => op.operation_id.clone(),
        http_method => op.http_method.clone(),
        path => op.path.clone(),
        summary => op.summary.clone(),
        notes => op.notes.clone(),
        params => params,
        consumes => Value::from_serialize(&op.consumes),
        produces => Value::from_serialize(&op.produces),
        is_multipart => op.is_multipart,
        is_form => op.all_params.iter().any(|p| p.kind == ParameterKind::Form),
        is_deprecated => op.is_deprecated,
        return_type => op.return_type.clone().unwrap_or_else(|| UNIT.to_string()),
        has_return_type => op.return_type.is_some(),
    }
}

fn retrofit_annotation(param: &GeneratedParameter, multipart: bool) -> String {
    let name = &param.base_name;
    match param.kind {
        ParameterKind::Path => format!("@Path(\"{name}\")"),
        ParameterKind::Query => format!("@Query(\"{name}\")"),
        ParameterKind::Header => format!("@Header(\"{name}\")"),
        ParameterKind::Cookie => format!("@Header(\"Cookie\") /* {name} */"),
        ParameterKind::Body => "@Body".to_string(),
        ParameterKind::Form if multipart => format!("@Part(\"{name}\")"),
        ParameterKind::Form => format!("@Field(\"{name}\")"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param(name: &str, kind: ParameterKind) -> GeneratedParameter {
        GeneratedParameter {
            base_name: name.into(),
            param_name: name.into(),
            data_type: "kotlin.String".into(),
            base_type: "kotlin.String".into(),
            data_format: None,
            description: None,
            kind,
            required: true,
            has_more: false,
        }
    }

    #[test]
    fn annotations_follow_parameter_location() {
        assert_eq!(
            retrofit_annotation(&param("petId", ParameterKind::Path), false),
            "@Path(\"petId\")"
        );
        assert_eq!(
            retrofit_annotation(&param("X-Request-Id", ParameterKind::Header), false),
            "@Header(\"X-Request-Id\")"
        );
        assert_eq!(retrofit_annotation(&param("pet", ParameterKind::Body), false), "@Body");
        assert_eq!(
            retrofit_annotation(&param("file", ParameterKind::Form), true),
            "@Part(\"file\")"
        );
        assert_eq!(
            retrofit_annotation(&param("name", ParameterKind::Form), false),
            "@Field(\"name\")"
        );
    }
}
