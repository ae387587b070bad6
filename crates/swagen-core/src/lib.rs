pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod options;
pub mod parse;
pub mod task;
pub mod transform;

/// A generated file with a path relative to the run's output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: String,
    pub content: String,
}

/// A generator variant that renders files for one resolved run.
pub trait CodeGenerator {
    fn generate(
        &self,
        spec: &parse::OpenApiDocument,
        run: &config::ResolvedRun,
    ) -> Result<Vec<GeneratedFile>, error::GeneratorError>;
}
