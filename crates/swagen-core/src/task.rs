use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::CodeGenerator;
use crate::config::{DerivedConfig, GenerationConfig, ResolvedRun};
use crate::engine::EngineSession;
use crate::error::{ConfigError, TaskError};
use crate::parse;

pub const TASK_PREFIX: &str = "swagger";
pub const COMPILE_JAVA: &str = "compileJava";
/// Prefix shared by every Kotlin compile task (`compileKotlin`, `compileKotlinJvm`, ...).
pub const COMPILE_KOTLIN: &str = "compileKotlin";

/// Filesystem effects of a task.
pub trait FileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
    fn remove_dir_all(&self, path: &Path) -> io::Result<()>;
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;
    fn write(&self, path: &Path, contents: &str) -> io::Result<()>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        match fs::remove_dir_all(path) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        fs::write(path, contents)
    }
}

/// Language a task is registered for. Only used to keep task names apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Kotlin,
    Java,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Kotlin => "kotlin",
            Language::Java => "java",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The host build the tasks are registered in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostProject {
    pub project_dir: PathBuf,
    pub root_project_dir: PathBuf,
    /// Names of the host's compile tasks.
    pub compile_tasks: Vec<String>,
}

impl HostProject {
    pub fn new(project_dir: impl Into<PathBuf>, root_project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
            root_project_dir: root_project_dir.into(),
            compile_tasks: Vec::new(),
        }
    }

    pub fn with_compile_task(mut self, name: impl Into<String>) -> Self {
        self.compile_tasks.push(name.into());
        self
    }

    fn kotlin_compile_tasks(&self) -> Vec<String> {
        self.compile_tasks
            .iter()
            .filter(|t| t.starts_with(COMPILE_KOTLIN))
            .cloned()
            .collect()
    }

    fn has_java_compile_task(&self) -> bool {
        self.compile_tasks.iter().any(|t| t == COMPILE_JAVA)
    }
}

/// `swagger-<language>[-<outputFolderName>]`
pub fn task_name(language: Language, output_folder: Option<&str>) -> String {
    match output_folder {
        Some(folder) => format!("{TASK_PREFIX}-{language}-{folder}"),
        None => format!("{TASK_PREFIX}-{language}"),
    }
}

/// Create one task per (language, run) pair.
///
/// Kotlin tasks are always created. Java tasks are created when the project
/// compiles Java and either has no Kotlin compile task or `force_java` is set.
pub fn register_tasks(config: &GenerationConfig, project: &HostProject) -> Vec<GenerationTask> {
    let kotlin_hooks = project.kotlin_compile_tasks();
    let java = project.has_java_compile_task() && (kotlin_hooks.is_empty() || config.force_java);

    let mut languages = Vec::with_capacity(2);
    if java {
        languages.push(Language::Java);
    }
    languages.push(Language::Kotlin);

    let mut tasks: Vec<GenerationTask> = Vec::new();
    for language in languages {
        let hooks = match language {
            Language::Java => vec![COMPILE_JAVA.to_string()],
            Language::Kotlin => kotlin_hooks.clone(),
        };
        for run in &config.configs {
            let name = task_name(language, run.output_folder_name());
            if tasks.iter().any(|t| t.name == name) {
                debug!("Task {name} already registered, skipping");
                continue;
            }
            tasks.push(GenerationTask {
                name,
                language,
                derived: config.derive(run),
                project_dir: project.project_dir.clone(),
                root_project_dir: project.root_project_dir.clone(),
                hooked_to: if config.auto_hook { hooks.clone() } else { Vec::new() },
            });
        }
    }

    info!("Java auto-hooked: {}", java && config.auto_hook);
    info!(
        "Kotlin auto-hooked: {}",
        !kotlin_hooks.is_empty() && config.auto_hook
    );
    tasks
}

/// One generation run bound to a host project.
#[derive(Debug, Clone)]
pub struct GenerationTask {
    name: String,
    language: Language,
    derived: DerivedConfig,
    project_dir: PathBuf,
    root_project_dir: PathBuf,
    hooked_to: Vec<String>,
}

impl GenerationTask {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Compile tasks that depend on this task.
    pub fn hooked_to(&self) -> &[String] {
        &self.hooked_to
    }

    pub fn resolve(&mut self) -> Result<&ResolvedRun, ConfigError> {
        self.derived.resolve()
    }

    /// The input spec, for up-to-date checks.
    pub fn inputs(&mut self) -> Result<Vec<PathBuf>, ConfigError> {
        Ok(vec![self.resolve()?.input_spec.clone()])
    }

    /// The output directory, for up-to-date checks.
    pub fn outputs(&mut self) -> Result<Vec<PathBuf>, ConfigError> {
        Ok(vec![self.resolve()?.output_dir.clone()])
    }

    /// Regenerate the output directory. Returns the written paths.
    pub fn execute(
        &mut self,
        fs: &dyn FileSystem,
        generator: &dyn CodeGenerator,
    ) -> Result<Vec<PathBuf>, TaskError> {
        let run = self.derived.resolve()?.clone();

        for guarded in [&self.project_dir, &self.root_project_dir] {
            if run.output_dir.as_path() == guarded.as_path() {
                return Err(TaskError::UnsafeOutputDir(run.output_dir));
            }
        }

        info!("Deleting output directory {}", run.output_dir.display());
        fs.remove_dir_all(&run.output_dir)
            .map_err(|source| io_error(&run.output_dir, source))?;

        let _session = EngineSession::acquire(&run.global_properties);

        let input = fs
            .read_to_string(&run.input_spec)
            .map_err(|source| io_error(&run.input_spec, source))?;
        let spec = parse::from_path_contents(&run.input_spec, &input)?;
        let files = generator.generate(&spec, &run)?;

        let mut written = Vec::with_capacity(files.len());
        for file in &files {
            let path = run.output_dir.join(&file.path);
            if let Some(parent) = path.parent() {
                fs.create_dir_all(parent)
                    .map_err(|source| io_error(parent, source))?;
            }
            fs.write(&path, &file.content)
                .map_err(|source| io_error(&path, source))?;
            written.push(path);
        }
        info!("{}: wrote {} files", self.name, written.len());
        Ok(written)
    }
}

fn io_error(path: &Path, source: io::Error) -> TaskError {
    TaskError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunDescriptor;

    fn config(runs: Vec<RunDescriptor>) -> GenerationConfig {
        GenerationConfig {
            generator_name: Some("kotlin-client-v2".into()),
            configs: runs,
            ..Default::default()
        }
    }

    fn names(tasks: &[GenerationTask]) -> Vec<&str> {
        tasks.iter().map(GenerationTask::name).collect()
    }

    #[test]
    fn task_names() {
        assert_eq!(task_name(Language::Kotlin, Some("v1")), "swagger-kotlin-v1");
        assert_eq!(task_name(Language::Java, None), "swagger-java");
    }

    #[test]
    fn kotlin_project_gets_kotlin_tasks_only() {
        let project = HostProject::new("/p", "/p")
            .with_compile_task("compileJava")
            .with_compile_task("compileKotlin")
            .with_compile_task("compileKotlinJvm");
        let tasks = register_tasks(&config(vec![RunDescriptor::new("a.yaml").with_output_folder("a")]), &project);
        assert_eq!(names(&tasks), vec!["swagger-kotlin-a"]);
        assert_eq!(tasks[0].hooked_to(), ["compileKotlin", "compileKotlinJvm"]);
    }

    #[test]
    fn java_only_project_gets_both_languages() {
        let project = HostProject::new("/p", "/p").with_compile_task("compileJava");
        let tasks = register_tasks(&config(vec![RunDescriptor::new("a.yaml").with_output_folder("a")]), &project);
        assert_eq!(names(&tasks), vec!["swagger-java-a", "swagger-kotlin-a"]);
        assert_eq!(tasks[0].hooked_to(), ["compileJava"]);
        assert!(tasks[1].hooked_to().is_empty());
    }

    #[test]
    fn force_java_adds_java_tasks() {
        let project = HostProject::new("/p", "/p")
            .with_compile_task("compileJava")
            .with_compile_task("compileKotlin");
        let mut cfg = config(vec![RunDescriptor::new("a.yaml")]);
        cfg.force_java = true;
        let tasks = register_tasks(&cfg, &project);
        assert_eq!(names(&tasks), vec!["swagger-java", "swagger-kotlin"]);
    }

    #[test]
    fn duplicate_names_are_skipped() {
        let cfg = config(vec![
            RunDescriptor::new("a.yaml").with_output_folder("api"),
            RunDescriptor::new("b.yaml").with_output_folder("api"),
        ]);
        let tasks = register_tasks(&cfg, &HostProject::new("/p", "/p"));
        assert_eq!(names(&tasks), vec!["swagger-kotlin-api"]);
    }

    #[test]
    fn auto_hook_off_registers_unhooked_tasks() {
        let project = HostProject::new("/p", "/p").with_compile_task("compileKotlin");
        let mut cfg = config(vec![RunDescriptor::new("a.yaml")]);
        cfg.auto_hook = false;
        let tasks = register_tasks(&cfg, &project);
        assert_eq!(tasks.len(), 1);
        assert!(tasks[0].hooked_to().is_empty());
    }

    #[test]
    fn inputs_and_outputs_are_resolved_paths() {
        let mut cfg = config(vec![RunDescriptor::new("pets.yaml").with_output_folder("pets")]);
        cfg.source_path = PathBuf::from("/p/api");
        cfg.output_path = PathBuf::from("/p/build");
        let mut tasks = register_tasks(&cfg, &HostProject::new("/p", "/"));
        assert_eq!(tasks[0].inputs().unwrap(), vec![PathBuf::from("/p/api/pets.yaml")]);
        assert_eq!(tasks[0].outputs().unwrap(), vec![PathBuf::from("/p/build/pets")]);
    }
}
