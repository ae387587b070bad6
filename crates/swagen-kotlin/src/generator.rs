use log::{debug, info};
use swagen_core::config::ResolvedRun;
use swagen_core::error::GeneratorError;
use swagen_core::parse::OpenApiDocument;
use swagen_core::transform::convert_document;
use swagen_core::{CodeGenerator, GeneratedFile};

use crate::emitters;
use crate::options::process_options;
use crate::registry::{Variant, find_variant};

/// Kotlin code generator for one registered variant.
#[derive(Debug, Clone, Copy)]
pub struct KotlinGenerator {
    variant: &'static Variant,
}

impl KotlinGenerator {
    pub fn new(variant: &'static Variant) -> Self {
        Self { variant }
    }

    pub fn variant(&self) -> &'static Variant {
        self.variant
    }
}

/// Look up a generator by variant name.
pub fn generator_for(name: &str) -> Result<KotlinGenerator, GeneratorError> {
    find_variant(name).map(KotlinGenerator::new)
}

impl CodeGenerator for KotlinGenerator {
    fn generate(
        &self,
        spec: &OpenApiDocument,
        run: &ResolvedRun,
    ) -> Result<Vec<GeneratedFile>, GeneratorError> {
        let settings = process_options(self.variant, run)?;
        info!(
            "Generating {} ({}) into {}",
            self.variant.name,
            settings.layout.library.as_deref().unwrap_or("no library"),
            run.output_dir.display()
        );

        let doc = convert_document(spec, &settings.policy, &settings.conversion)?;
        debug!(
            "Converted {} models and {} operation groups",
            doc.models.len(),
            doc.operation_groups.len()
        );
        emitters::emit_all(&doc, &settings)
    }
}
