use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::options::{AdditionalProperties, PropertyValue};

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".swagen.yaml";

/// Base configuration shared by every run, loaded from `.swagen.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Directory holding the input specs.
    pub source_path: PathBuf,
    /// Directory the per-run output folders are created in.
    pub output_path: PathBuf,
    pub generator_name: Option<String>,
    /// Library used by runs that do not choose one.
    pub library: Option<String>,
    pub additional_properties: AdditionalProperties,
    /// Engine keys set for the duration of each run.
    pub global_properties: IndexMap<String, String>,
    pub configs: Vec<RunDescriptor>,
    /// Hook generation tasks into the host's compile tasks.
    pub auto_hook: bool,
    /// Register Java tasks even when the project compiles Kotlin.
    pub force_java: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            source_path: PathBuf::from("./"),
            output_path: PathBuf::from("./"),
            generator_name: None,
            library: None,
            additional_properties: AdditionalProperties::new(),
            global_properties: IndexMap::new(),
            configs: Vec::new(),
            auto_hook: true,
            force_java: false,
        }
    }
}

impl GenerationConfig {
    /// Clone this configuration and bind `run` to the copy.
    ///
    /// Never fails; problems surface when the copy is first resolved.
    pub fn derive(&self, run: &RunDescriptor) -> DerivedConfig {
        DerivedConfig {
            base: self.clone(),
            run: run.clone(),
            resolved: None,
        }
    }

    /// One derived configuration per configured run.
    pub fn derive_all(&self) -> Vec<DerivedConfig> {
        self.configs.iter().map(|run| self.derive(run)).collect()
    }
}

/// One unit of generation work. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunDescriptor {
    #[serde(default)]
    input_file_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    output_folder_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    library: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    additional_properties: AdditionalProperties,
}

impl RunDescriptor {
    pub fn new(input_file_name: impl Into<String>) -> Self {
        Self {
            input_file_name: input_file_name.into(),
            ..Default::default()
        }
    }

    pub fn with_output_folder(mut self, name: impl Into<String>) -> Self {
        self.output_folder_name = Some(name.into());
        self
    }

    pub fn with_library(mut self, library: impl Into<String>) -> Self {
        self.library = Some(library.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.additional_properties.insert(key.into(), value.into());
        self
    }

    pub fn input_file_name(&self) -> &str {
        &self.input_file_name
    }

    pub fn output_folder_name(&self) -> Option<&str> {
        self.output_folder_name.as_deref()
    }

    pub fn library(&self) -> Option<&str> {
        self.library.as_deref()
    }

    pub fn additional_properties(&self) -> &AdditionalProperties {
        &self.additional_properties
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.input_file_name.trim().is_empty() {
            return Err(ConfigError::MalformedRun(
                "`inputFileName` must not be empty".to_string(),
            ));
        }
        if self.output_folder_name.as_deref().is_some_and(|f| f.trim().is_empty()) {
            return Err(ConfigError::MalformedRun(format!(
                "`outputFolderName` of run `{}` must not be blank",
                self.input_file_name
            )));
        }
        Ok(())
    }
}

/// Fully resolved settings of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRun {
    pub input_spec: PathBuf,
    pub output_dir: PathBuf,
    pub generator_name: String,
    /// `None` means the variant's default library.
    pub library: Option<String>,
    pub additional_properties: AdditionalProperties,
    pub global_properties: IndexMap<String, String>,
}

/// A private copy of the base configuration bound to one run.
#[derive(Debug, Clone)]
pub struct DerivedConfig {
    base: GenerationConfig,
    run: RunDescriptor,
    resolved: Option<ResolvedRun>,
}

impl DerivedConfig {
    pub fn base(&self) -> &GenerationConfig {
        &self.base
    }

    pub fn run(&self) -> &RunDescriptor {
        &self.run
    }

    /// Resolve paths, library and properties on first use.
    pub fn resolve(&mut self) -> Result<&ResolvedRun, ConfigError> {
        self.resolved_mut().map(|r| &*r)
    }

    pub fn resolved_mut(&mut self) -> Result<&mut ResolvedRun, ConfigError> {
        let resolved = match self.resolved.take() {
            Some(resolved) => resolved,
            None => resolve_run(&self.base, &self.run)?,
        };
        Ok(self.resolved.insert(resolved))
    }
}

fn resolve_run(base: &GenerationConfig, run: &RunDescriptor) -> Result<ResolvedRun, ConfigError> {
    run.validate()?;

    let generator_name = base
        .generator_name
        .clone()
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingGenerator {
            input: run.input_file_name.clone(),
        })?;

    let output_dir = match &run.output_folder_name {
        Some(folder) => base.output_path.join(folder),
        None => base.output_path.clone(),
    };

    let mut additional_properties = base.additional_properties.clone();
    for (key, value) in &run.additional_properties {
        additional_properties.shift_remove(key);
        additional_properties.insert(key.clone(), value.clone());
    }

    Ok(ResolvedRun {
        input_spec: base.source_path.join(&run.input_file_name),
        output_dir,
        generator_name,
        library: run.library.clone().or_else(|| base.library.clone()),
        additional_properties,
        global_properties: base.global_properties.clone(),
    })
}

/// Load config from a YAML file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<GenerationConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: GenerationConfig =
        serde_yaml_ng::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(Some(config))
}

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r#"# swagen configuration
sourcePath: ./api             # directory holding the OpenAPI specs
outputPath: ./build/generated # each run writes to <outputPath>/<outputFolderName>
generatorName: kotlin-client-v2
# library: jvm-retrofit2      # multiplatform | jvm-okhttp4 | jvm-retrofit2 | room | room2

autoHook: true      # hook generation into compileKotlin / compileJava
forceJava: false    # also register Java tasks in Kotlin projects

additionalProperties:
  dateLibrary: java8            # java8 | threetenbp | string | millis
  collectionType: array         # array | list
  enumPropertyNaming: camelCase # original | camelCase | PascalCase | snake_case | UPPERCASE
  # removeOperationParams: [X-Request-Id]

globalProperties: {}
  # models: "true"
  # apis: "false"

configs:
  - inputFileName: petstore.yaml
    outputFolderName: petstore
    # library: room2
    # additionalProperties:
    #   dateLibrary: string
"#
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> GenerationConfig {
        let mut config = GenerationConfig {
            source_path: PathBuf::from("/spec"),
            output_path: PathBuf::from("/out"),
            generator_name: Some("kotlin-client-v2".into()),
            library: Some("jvm-retrofit2".into()),
            ..Default::default()
        };
        config
            .additional_properties
            .insert("dateLibrary".into(), "java8".into());
        config
            .additional_properties
            .insert("collectionType".into(), "array".into());
        config
    }

    #[test]
    fn test_default_config() {
        let config = GenerationConfig::default();
        assert_eq!(config.source_path, PathBuf::from("./"));
        assert_eq!(config.output_path, PathBuf::from("./"));
        assert!(config.auto_hook);
        assert!(!config.force_java);
        assert!(config.configs.is_empty());
    }

    #[test]
    fn test_parse_config_yaml() {
        let yaml = r#"
sourcePath: /spec
outputPath: /out
generatorName: kotlin-room
forceJava: true
additionalProperties:
  emptyDataClasses: true
globalProperties:
  models: "true"
configs:
  - inputFileName: petstore.yaml
    outputFolderName: v1
    library: room2
    additionalProperties:
      dateLibrary: string
  - inputFileName: users.json
"#;
        let config: GenerationConfig = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(config.generator_name.as_deref(), Some("kotlin-room"));
        assert!(config.force_java);
        assert!(config.auto_hook);
        assert_eq!(config.global_properties["models"], "true");
        assert_eq!(config.configs.len(), 2);
        assert_eq!(config.configs[0].library(), Some("room2"));
        assert_eq!(config.configs[1].output_folder_name(), None);
    }

    #[test]
    fn test_default_config_content_parses() {
        let config: GenerationConfig = serde_yaml_ng::from_str(default_config_content()).unwrap();
        assert_eq!(config.generator_name.as_deref(), Some("kotlin-client-v2"));
        assert_eq!(config.configs.len(), 1);
    }

    #[test]
    fn paths_are_joined() {
        let run = RunDescriptor::new("petstore.yaml").with_output_folder("v1");
        let mut derived = base().derive(&run);
        let resolved = derived.resolve().unwrap();
        assert_eq!(resolved.input_spec, PathBuf::from("/spec/petstore.yaml"));
        assert_eq!(resolved.output_dir, PathBuf::from("/out/v1"));
    }

    #[test]
    fn overrides_win_and_move_last() {
        let run = RunDescriptor::new("petstore.yaml")
            .with_property("dateLibrary", "string")
            .with_property("generateInfrastructure", true);
        let mut derived = base().derive(&run);
        let resolved = derived.resolve().unwrap();
        assert_eq!(resolved.additional_properties["dateLibrary"], PropertyValue::from("string"));
        let keys: Vec<_> = resolved.additional_properties.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["collectionType", "dateLibrary", "generateInfrastructure"]);
    }

    #[test]
    fn run_library_falls_back_to_base() {
        let mut with_own = base().derive(&RunDescriptor::new("a.yaml").with_library("room"));
        assert_eq!(with_own.resolve().unwrap().library.as_deref(), Some("room"));

        let mut inherited = base().derive(&RunDescriptor::new("a.yaml"));
        assert_eq!(inherited.resolve().unwrap().library.as_deref(), Some("jvm-retrofit2"));
    }

    #[test]
    fn derived_configs_are_independent() {
        let mut config = base();
        config.configs = vec![
            RunDescriptor::new("a.yaml").with_output_folder("a"),
            RunDescriptor::new("b.yaml").with_output_folder("b"),
            RunDescriptor::new("c.yaml").with_output_folder("c"),
        ];
        let mut derived = config.derive_all();

        derived[0]
            .resolved_mut()
            .unwrap()
            .additional_properties
            .insert("x".into(), true.into());

        for other in &mut derived[1..] {
            assert!(!other.resolve().unwrap().additional_properties.contains_key("x"));
        }
        assert!(!config.additional_properties.contains_key("x"));
        assert!(derived[0].resolve().unwrap().additional_properties.contains_key("x"));
        assert_eq!(derived[2].resolve().unwrap().output_dir, PathBuf::from("/out/c"));
    }

    #[test]
    fn missing_generator_fails_on_first_use() {
        let config = GenerationConfig::default();
        let mut derived = config.derive(&RunDescriptor::new("petstore.yaml"));
        assert!(matches!(
            derived.resolve(),
            Err(ConfigError::MissingGenerator { input }) if input == "petstore.yaml"
        ));
    }

    #[test]
    fn malformed_runs_are_rejected() {
        let mut empty_input = base().derive(&RunDescriptor::default());
        assert!(matches!(empty_input.resolve(), Err(ConfigError::MalformedRun(_))));

        let mut blank_folder = base().derive(&RunDescriptor::new("a.yaml").with_output_folder(" "));
        assert!(matches!(blank_folder.resolve(), Err(ConfigError::MalformedRun(_))));
    }

    #[test]
    fn load_missing_config_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(&dir.path().join(CONFIG_FILE_NAME)).unwrap().is_none());
    }

    #[test]
    fn load_reports_parse_errors_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "configs: 12").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains(CONFIG_FILE_NAME));
    }
}
