pub mod classify;
pub mod convert;
pub mod model_rewriter;
pub mod name_normalizer;
pub mod pipeline;
pub mod post_process;
pub mod schema_rewriter;
pub mod type_mapper;

pub use classify::{SchemaClass, classify};
pub use name_normalizer::{EnumPropertyNaming, NamingOptions};
pub use pipeline::{ConversionOptions, ConvertedDocument, VariantPolicy, convert_document};
pub use type_mapper::{CollectionType, DateLibrary, TypeMapping};
