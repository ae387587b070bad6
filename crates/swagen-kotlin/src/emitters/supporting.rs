use minijinja::{Environment, Value, context};
use swagen_core::GeneratedFile;
use swagen_core::error::GeneratorError;
use swagen_core::transform::ConvertedDocument;

use super::models::file_stem;
use super::{package_dir, render};
use crate::options::RunSettings;

const INFRASTRUCTURE: &[(&str, &str)] = &[
    ("infrastructure/ApiAbstractions.kt.j2", "ApiAbstractions.kt"),
    ("infrastructure/Serializer.kt.j2", "Serializer.kt"),
];

/// README, Gradle files and, when enabled, the infrastructure package.
pub fn emit_supporting(
    env: &Environment<'_>,
    doc: &ConvertedDocument,
    settings: &RunSettings,
) -> Result<Vec<GeneratedFile>, GeneratorError> {
    let ctx = project_context(doc, settings);
    let mut files = vec![
        GeneratedFile {
            path: "README.md".to_string(),
            content: render(env, "README.md.j2", ctx.clone())?,
        },
        GeneratedFile {
            path: "build.gradle".to_string(),
            content: render(env, "build.gradle.j2", ctx.clone())?,
        },
        GeneratedFile {
            path: "settings.gradle".to_string(),
            content: render(env, "settings.gradle.j2", ctx.clone())?,
        },
    ];

    if settings.generate_infrastructure {
        let dir = format!(
            "{}/infrastructure",
            package_dir(&settings.source_folder, &settings.layout.package_name)
        );
        for (template, file_name) in INFRASTRUCTURE {
            files.push(GeneratedFile {
                path: format!("{dir}/{file_name}"),
                content: render(env, template, ctx.clone())?,
            });
        }
    }
    Ok(files)
}

fn project_context(doc: &ConvertedDocument, settings: &RunSettings) -> Value {
    let apis: Vec<Value> = if settings.layout.templates.api {
        doc.operation_groups
            .iter()
            .map(|g| {
                context! {
                    class_name => file_stem(&g.class_name),
                    operations => g.operations.iter().map(|op| context! {
                        nickname => op.nickname.clone(),
                        http_method => op.http_method.clone(),
                        path => op.path.clone(),
                        summary => op.summary.clone(),
                    }).collect::<Vec<_>>(),
                }
            })
            .collect()
    } else {
        Vec::new()
    };
    let models: Vec<&str> = doc
        .models
        .iter()
        .filter(|m| !m.is_alias)
        .map(|m| file_stem(&m.class_name))
        .collect();

    context! {
        title => doc.title.clone(),
        version => doc.version.clone(),
        description => doc.description.clone(),
        base_path => doc.base_path.clone(),
        apis => apis,
        models => models,
        is_multipart => doc.is_multipart,
        artifact_id => settings.layout.artifact_id.clone(),
        package_name => settings.layout.package_name.clone(),
        api_package => settings.layout.api_package.clone(),
        model_package => settings.layout.model_package.clone(),
        library => settings.layout.library.clone(),
    }
}
