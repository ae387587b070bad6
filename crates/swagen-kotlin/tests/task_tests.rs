use std::fs;

use swagen_core::config::{GenerationConfig, RunDescriptor};
use swagen_core::task::{HostProject, RealFileSystem, register_tasks};
use swagen_kotlin::generator_for;

const PETSTORE: &str = include_str!("fixtures/petstore.yaml");

#[test]
fn two_runs_write_independent_trees() {
    let project = tempfile::tempdir().unwrap();
    let specs = project.path().join("api");
    fs::create_dir_all(&specs).unwrap();
    fs::write(specs.join("petstore.yaml"), PETSTORE).unwrap();

    let output = project.path().join("build/generated");
    // Stale output from an earlier run is removed.
    fs::create_dir_all(output.join("client")).unwrap();
    fs::write(output.join("client/Stale.kt"), "stale").unwrap();

    let config = GenerationConfig {
        source_path: specs,
        output_path: output.clone(),
        generator_name: Some("kotlin-client-v2".into()),
        configs: vec![
            RunDescriptor::new("petstore.yaml").with_output_folder("client"),
            RunDescriptor::new("petstore.yaml")
                .with_output_folder("entities")
                .with_library("room2")
                .with_property("packageName", "com.example.db"),
        ],
        ..Default::default()
    };
    let host = HostProject::new(project.path(), project.path()).with_compile_task("compileKotlin");

    let mut tasks = register_tasks(&config, &host);
    assert_eq!(tasks.len(), 2);
    for task in &mut tasks {
        let generator = generator_for(&task.resolve().unwrap().generator_name).unwrap();
        let written = task.execute(&RealFileSystem, &generator).unwrap();
        assert!(!written.is_empty());
    }

    let client = output.join("client");
    assert!(!client.join("Stale.kt").exists());
    assert!(
        client
            .join("src/main/kotlin/org/openapitools/client/api/PetApi.kt")
            .is_file()
    );
    let settings = fs::read_to_string(client.join("settings.gradle")).unwrap();
    assert!(settings.contains("kotlin-jvm-retrofit2-client"));

    let entities = output.join("entities");
    let pet = fs::read_to_string(entities.join("src/main/kotlin/com/example/db/model/Pet.kt")).unwrap();
    assert!(pet.contains("package com.example.db.model"));
    assert!(pet.contains("@Entity(tableName = \"Pet\")"));
    assert!(!entities.join("src/main/kotlin/com/example/db/api").exists());
}

#[test]
fn output_inside_project_root_is_refused() {
    let project = tempfile::tempdir().unwrap();
    fs::write(project.path().join("petstore.yaml"), PETSTORE).unwrap();
    fs::write(project.path().join("build.gradle"), "keep").unwrap();

    let config = GenerationConfig {
        source_path: project.path().to_path_buf(),
        output_path: project.path().to_path_buf(),
        generator_name: Some("kotlin-client-v2".into()),
        configs: vec![RunDescriptor::new("petstore.yaml")],
        ..Default::default()
    };
    let host = HostProject::new(project.path(), project.path());

    let mut tasks = register_tasks(&config, &host);
    let generator = generator_for("kotlin-client-v2").unwrap();
    assert!(tasks[0].execute(&RealFileSystem, &generator).is_err());
    assert_eq!(
        fs::read_to_string(project.path().join("build.gradle")).unwrap(),
        "keep"
    );
}
