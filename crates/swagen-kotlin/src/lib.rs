pub mod emitters;
pub mod generator;
pub mod options;
pub mod registry;

pub use generator::{KotlinGenerator, generator_for};
pub use registry::{VARIANTS, Variant, find_variant};
