pub mod apis;
pub mod models;
pub mod supporting;

use minijinja::{Environment, Value};
use swagen_core::GeneratedFile;
use swagen_core::engine;
use swagen_core::error::GeneratorError;
use swagen_core::transform::ConvertedDocument;

use crate::options::RunSettings;

/// Render every enabled file class of a converted document.
///
/// The engine's `models`, `apis`, `supportingFiles`, `modelDocs` and
/// `apiDocs` switches are read here; an explicit `"false"` skips that class.
pub fn emit_all(
    doc: &ConvertedDocument,
    settings: &RunSettings,
) -> Result<Vec<GeneratedFile>, GeneratorError> {
    let env = environment(settings);
    let templates = &settings.layout.templates;
    let mut files = Vec::new();

    if templates.model && engine::is_enabled(engine::MODELS) {
        files.extend(models::emit_models(&env, doc, settings)?);
    }
    if templates.model_doc && engine::is_enabled(engine::MODEL_DOCS) {
        files.extend(models::emit_model_docs(&env, doc, settings)?);
    }
    if templates.api && engine::is_enabled(engine::APIS) {
        files.extend(apis::emit_apis(&env, doc, settings)?);
    }
    if templates.api_doc && engine::is_enabled(engine::API_DOCS) {
        files.extend(apis::emit_api_docs(&env, doc, settings)?);
    }
    if engine::is_enabled(engine::SUPPORTING_FILES) {
        files.extend(supporting::emit_supporting(&env, doc, settings)?);
    }
    Ok(files)
}

/// Template environment with every embedded template, the Kotlin filters and
/// the run's template properties as globals.
pub fn environment(settings: &RunSettings) -> Environment<'static> {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.add_filter("remove_minus_text", remove_minus_text);
    env.add_filter("ignore_starting_slash", ignore_starting_slash);
    env.add_filter("kdoc", kdoc);

    for (name, source) in [
        ("model.kt.j2", include_str!("../../templates/model.kt.j2")),
        ("model_doc.md.j2", include_str!("../../templates/model_doc.md.j2")),
        ("api.kt.j2", include_str!("../../templates/api.kt.j2")),
        ("api_doc.md.j2", include_str!("../../templates/api_doc.md.j2")),
        ("README.md.j2", include_str!("../../templates/README.md.j2")),
        ("build.gradle.j2", include_str!("../../templates/build.gradle.j2")),
        ("settings.gradle.j2", include_str!("../../templates/settings.gradle.j2")),
        (
            "infrastructure/ApiAbstractions.kt.j2",
            include_str!("../../templates/infrastructure/ApiAbstractions.kt.j2"),
        ),
        (
            "infrastructure/Serializer.kt.j2",
            include_str!("../../templates/infrastructure/Serializer.kt.j2"),
        ),
    ] {
        env.add_template(name, source)
            .expect("template should be valid");
    }

    for (key, value) in &settings.template_properties {
        env.add_global(key.clone(), Value::from_serialize(value));
    }
    env.add_global("generator_name", settings.variant);
    env.add_global(
        "entity_package",
        Value::from(settings.layout.entity_package),
    );
    env
}

pub(crate) fn render(
    env: &Environment<'_>,
    template: &str,
    ctx: Value,
) -> Result<String, GeneratorError> {
    env.get_template(template)
        .and_then(|t| t.render(ctx))
        .map_err(|e| GeneratorError::Render(format!("{template}: {e}")))
}

/// `com.example.api` under `src/main/kotlin` → `src/main/kotlin/com/example/api`.
pub fn package_dir(source_folder: &str, package: &str) -> String {
    let package_path = package.replace('.', "/");
    if source_folder.is_empty() {
        package_path
    } else {
        format!("{}/{package_path}", source_folder.trim_end_matches('/'))
    }
}

/// Drop every `minus` (any case) from a name.
pub fn remove_minus_text(value: String) -> String {
    const MINUS: &str = "minus";
    let mut out = String::with_capacity(value.len());
    let mut rest = value.as_str();
    while let Some(ch) = rest.chars().next() {
        if rest
            .get(..MINUS.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(MINUS))
        {
            rest = &rest[MINUS.len()..];
        } else {
            out.push(ch);
            rest = &rest[ch.len_utf8()..];
        }
    }
    out
}

/// Strip one leading `/` from an endpoint path.
pub fn ignore_starting_slash(value: String) -> String {
    match value.strip_prefix('/') {
        Some(stripped) => stripped.to_string(),
        None => value,
    }
}

/// Escape `*/` so text cannot close a KDoc block.
pub fn kdoc(value: String) -> String {
    value.replace("*/", "*\\/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minus_text_is_removed_case_insensitively() {
        assert_eq!(remove_minus_text("xMinusRequestMinusId".into()), "xRequestId");
        assert_eq!(remove_minus_text("MINUSvalueminus".into()), "value");
        assert_eq!(remove_minus_text("minuscule".into()), "cule");
        assert_eq!(remove_minus_text("čminus".into()), "č");
    }

    #[test]
    fn only_one_leading_slash_is_stripped() {
        assert_eq!(ignore_starting_slash("/pet/{petId}".into()), "pet/{petId}");
        assert_eq!(ignore_starting_slash("//pet".into()), "/pet");
        assert_eq!(ignore_starting_slash("pet".into()), "pet");
    }

    #[test]
    fn kdoc_escapes_comment_terminators() {
        assert_eq!(kdoc("a */ b".into()), "a *\\/ b");
    }

    #[test]
    fn package_dirs() {
        assert_eq!(
            package_dir("src/main/kotlin", "org.openapitools.client.model"),
            "src/main/kotlin/org/openapitools/client/model"
        );
        assert_eq!(package_dir("", "a.b"), "a/b");
        assert_eq!(package_dir("src/", "a"), "src/a");
    }
}
