use log::debug;
use minijinja::{Environment, Value, context};
use swagen_core::GeneratedFile;
use swagen_core::error::GeneratorError;
use swagen_core::model::{GeneratedModel, VENDOR_EXTENSION_IS_ALIAS};
use swagen_core::transform::ConvertedDocument;

use super::{package_dir, render};
use crate::options::RunSettings;

/// Models the engine flagged as plain aliases are not rendered; references
/// to them already use the aliased type.
fn rendered_models(doc: &ConvertedDocument) -> impl Iterator<Item = &GeneratedModel> {
    doc.models.iter().filter(|m| {
        if m.is_alias {
            debug!("Model {} is an alias, skipped", m.name);
        }
        !m.is_alias
    })
}

/// One `<ClassName>.kt` per model under the model package.
pub fn emit_models(
    env: &Environment<'_>,
    doc: &ConvertedDocument,
    settings: &RunSettings,
) -> Result<Vec<GeneratedFile>, GeneratorError> {
    let dir = package_dir(&settings.source_folder, &settings.layout.model_package);
    rendered_models(doc)
        .map(|model| {
            Ok(GeneratedFile {
                path: format!("{dir}/{}.kt", file_stem(&model.class_name)),
                content: render(env, "model.kt.j2", model_context(model, settings))?,
            })
        })
        .collect()
}

pub fn emit_model_docs(
    env: &Environment<'_>,
    doc: &ConvertedDocument,
    settings: &RunSettings,
) -> Result<Vec<GeneratedFile>, GeneratorError> {
    rendered_models(doc)
        .map(|model| {
            Ok(GeneratedFile {
                path: format!("docs/{}.md", file_stem(&model.class_name)),
                content: render(env, "model_doc.md.j2", model_context(model, settings))?,
            })
        })
        .collect()
}

fn model_context(model: &GeneratedModel, settings: &RunSettings) -> Value {
    let is_type_alias = model
        .vendor_extensions
        .get(VENDOR_EXTENSION_IS_ALIAS)
        .and_then(serde_json::Value::as_bool)
        .unwrap_or(false);
    let enum_vars: Vec<_> = model.all_vars.iter().filter(|v| v.is_enum).collect();

    context! {
        model => Value::from_serialize(model),
        is_type_alias => is_type_alias,
        vars => Value::from_serialize(&model.all_vars),
        enum_vars => Value::from_serialize(&enum_vars),
        model_package => settings.layout.model_package.clone(),
    }
}

/// Reserved class names are backtick-escaped; file names are not.
pub(crate) fn file_stem(class_name: &str) -> &str {
    class_name.trim_matches('`')
}
