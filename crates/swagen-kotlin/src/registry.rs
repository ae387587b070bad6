//! Generator variants as static data.
//!
//! A variant bundles a conversion policy, a template set, a package layout
//! and the options it understands. Variants are looked up by name; switching
//! the library of a variant re-derives its layout.

use log::info;
use swagen_core::error::GeneratorError;
use swagen_core::options::{CliOption, keys};
use swagen_core::transform::VariantPolicy;

pub const DEFAULT_PACKAGE: &str = "org.openapitools.client";
pub const DEFAULT_SOURCE_FOLDER: &str = "src/main/kotlin";

pub const MULTIPLATFORM: &str = "multiplatform";
pub const JVM_OKHTTP4: &str = "jvm-okhttp4";
pub const JVM_RETROFIT2: &str = "jvm-retrofit2";
pub const ROOM: &str = "room";
pub const ROOM2: &str = "room2";

/// Streaming upload type of the Ktor client.
pub const KTOR_INPUT_PROVIDER: &str = "io.ktor.client.request.forms.InputProvider";

const ANDROID_ROOM_V1: &str = "android.arch.persistence.room";
const ANDROID_ROOM_V2: &str = "androidx.room";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Library {
    pub name: &'static str,
    pub description: &'static str,
    /// Package of the Room annotations when models are persistence entities.
    pub entity_package: Option<&'static str>,
}

/// How a variant derives its artifact id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactNaming {
    Fixed(&'static str),
    /// `kotlin-<library>-client`, or `kotlin-client` without a library.
    PerLibrary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Variant {
    pub name: &'static str,
    pub help: &'static str,
    pub libraries: &'static [Library],
    pub default_library: Option<&'static str>,
    pub artifact: ArtifactNaming,
    /// Last segment of the model package.
    pub model_package_segment: &'static str,
    pub api_templates: bool,
    pub model_name_suffix: &'static str,
    pub api_name_suffix: &'static str,
    pub infrastructure_by_default: bool,
    pub entity_package: Option<&'static str>,
    pub policy: VariantPolicy,
    pub options: &'static [CliOption],
}

/// Which templates a run renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateSet {
    pub model: bool,
    pub model_doc: bool,
    pub api: bool,
    pub api_doc: bool,
}

/// Package and template layout for one selected library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub library: Option<String>,
    pub artifact_id: String,
    pub package_name: String,
    pub api_package: String,
    pub model_package: String,
    pub output_folder: String,
    pub templates: TemplateSet,
    pub entity_package: Option<&'static str>,
}

impl Variant {
    pub fn library(&self, name: &str) -> Option<&'static Library> {
        self.libraries.iter().find(|l| l.name == name)
    }

    pub fn option(&self, key: &str) -> Option<&'static CliOption> {
        self.options.iter().find(|o| o.key == key)
    }

    /// Whether the variant reads `key` from the run's properties.
    pub fn declares(&self, key: &str) -> bool {
        self.option(key).is_some()
    }

    /// Select `library` (or the variant default) and derive the layout for it.
    pub fn select_library(&self, library: Option<&str>) -> Result<Layout, GeneratorError> {
        let library = library.or(self.default_library);
        let selected = match library {
            Some(name) => Some(self.library(name).ok_or_else(|| {
                GeneratorError::UnsupportedLibrary {
                    variant: self.name.to_string(),
                    library: name.to_string(),
                    supported: self.supported_libraries(),
                }
            })?),
            None => None,
        };
        if let Some(lib) = selected {
            info!("Setting library: {}", lib.name);
        }

        let artifact_id = match self.artifact {
            ArtifactNaming::Fixed(id) => id.to_string(),
            ArtifactNaming::PerLibrary => match selected {
                Some(lib) => format!("kotlin-{}-client", lib.name),
                None => "kotlin-client".to_string(),
            },
        };
        let entity_package = selected
            .and_then(|l| l.entity_package)
            .or(self.entity_package);

        let api = self.api_templates && entity_package.is_none();
        if self.api_templates {
            if api {
                info!("Adding API template files");
            } else {
                info!("Removing API template files");
            }
        }

        Ok(Layout {
            library: selected.map(|l| l.name.to_string()),
            output_folder: format!("generated-code/{artifact_id}"),
            artifact_id,
            package_name: DEFAULT_PACKAGE.to_string(),
            api_package: format!("{DEFAULT_PACKAGE}.api"),
            model_package: format!("{DEFAULT_PACKAGE}.{}", self.model_package_segment),
            templates: TemplateSet {
                model: true,
                model_doc: true,
                api,
                api_doc: api,
            },
            entity_package,
        })
    }

    /// The variant policy, adjusted for the selected library.
    pub fn policy_for(&self, library: Option<&str>) -> VariantPolicy {
        let mut policy = self.policy;
        if library == Some(MULTIPLATFORM) {
            policy.path_params_first = true;
            policy.binary_param_type = Some(KTOR_INPUT_PROVIDER);
        }
        policy
    }

    pub fn supported_libraries(&self) -> String {
        if self.libraries.is_empty() {
            return "none".to_string();
        }
        let names: Vec<&str> = self.libraries.iter().map(|l| l.name).collect();
        names.join(", ")
    }
}

const LIBRARIES: &[Library] = &[
    Library {
        name: MULTIPLATFORM,
        description: "Platform: Kotlin multiplatform. HTTP client: Ktor 1.2.4. JSON processing: Kotlinx Serialization: 0.12.0.",
        entity_package: None,
    },
    Library {
        name: JVM_OKHTTP4,
        description: "Platform: Java Virtual Machine. HTTP client: OkHttp 4.2.0 (Android 5.0+ and Java 8+). JSON processing: Moshi 1.8.0.",
        entity_package: None,
    },
    Library {
        name: JVM_RETROFIT2,
        description: "Platform: Java Virtual Machine. HTTP client: Retrofit 2.6.2.",
        entity_package: None,
    },
    Library {
        name: ROOM,
        description: "Platform: Room v1. JSON processing: Moshi 1.9.2.",
        entity_package: Some(ANDROID_ROOM_V1),
    },
    Library {
        name: ROOM2,
        description: "Platform: Room v2 (androidx). JSON processing: Moshi 1.9.2.",
        entity_package: Some(ANDROID_ROOM_V2),
    },
];

const DATE_LIBRARY_VALUES: &[(&str, &str)] = &[
    ("threetenbp", "Threetenbp"),
    ("string", "String"),
    ("java8", "Java 8 native JSR310"),
    ("millis", "Date Time as Long"),
];

const COLLECTION_TYPE_VALUES: &[(&str, &str)] = &[
    ("array", "kotlin.Array"),
    ("list", "kotlin.collections.List"),
];

const LIBRARY_VALUES: &[(&str, &str)] = &[
    (MULTIPLATFORM, "Kotlin multiplatform (Ktor)"),
    (JVM_OKHTTP4, "JVM with OkHttp 4"),
    (JVM_RETROFIT2, "JVM with Retrofit 2"),
    (ROOM, "Room v1 entities"),
    (ROOM2, "Room v2 (androidx) entities"),
];

const ENUM_PROPERTY_NAMING_VALUES: &[(&str, &str)] = &[
    ("original", "Keep the value as written"),
    ("camelCase", "camelCase"),
    ("PascalCase", "PascalCase"),
    ("snake_case", "snake_case"),
    ("UPPERCASE", "UPPER_SNAKE_CASE"),
];

const DATE_LIBRARY: CliOption = CliOption::new(
    keys::DATE_LIBRARY,
    "Option to change Date library to use (default: java8).",
)
.with_default("java8")
.with_values(DATE_LIBRARY_VALUES);

const COLLECTION_TYPE: CliOption = CliOption::new(
    keys::COLLECTION_TYPE,
    "Option to change Collection type to use (default: array).",
)
.with_default("array")
.with_values(COLLECTION_TYPE_VALUES);

const EMPTY_DATA_CLASSES: CliOption = CliOption::boolean(
    keys::EMPTY_DATA_CLASSES,
    "Option to allow empty data classes (default: false).",
    false,
);

const PACKAGE_NAME: CliOption =
    CliOption::new(keys::PACKAGE_NAME, "Generated code package name").with_default(DEFAULT_PACKAGE);
const MODEL_PACKAGE: CliOption = CliOption::new(keys::MODEL_PACKAGE, "Package for generated models");
const API_PACKAGE: CliOption = CliOption::new(keys::API_PACKAGE, "Package for generated APIs");
const SOURCE_FOLDER: CliOption =
    CliOption::new(keys::SOURCE_FOLDER, "Source folder for generated code").with_default(DEFAULT_SOURCE_FOLDER);

const CLIENT_V2_OPTIONS: &[CliOption] = &[
    DATE_LIBRARY,
    COLLECTION_TYPE,
    CliOption::new(keys::GENERATE_INFRASTRUCTURE, "Option to add infrastructure package").with_values(&[
        ("infrastructure", "Generate Infrastructure API"),
        ("api", "Generate API"),
        (
            keys::IGNORE_ENDPOINT_STARTING_SLASH,
            "Option to ignore a starting slash of an endpoint definition",
        ),
    ]),
    CliOption::new(keys::HEADERS, "Options for header parameters").with_values(&[(
        keys::REMOVE_MINUS_TEXT_IN_HEADER_PROPERTY,
        "Remove the text minus from header property names",
    )]),
    EMPTY_DATA_CLASSES,
    CliOption::boolean(
        keys::COMPOSED_ARRAY_AS_ANY,
        "Option to cast array of composed schema (Array<OneOf...>) to array of kotlin.Any (Array<kotlin.Any>).",
        true,
    ),
    CliOption::boolean(
        keys::COMPOSED_VARS_NOT_REQUIRED,
        "Option to mark every variable of a oneOf/anyOf model as not required.",
        false,
    ),
    CliOption::boolean(
        keys::GENERATE_PRIMITIVE_TYPE_ALIAS,
        "Option to generate typealias for primitives.",
        false,
    ),
    CliOption::new(
        keys::REMOVE_OPERATION_PARAMS,
        "Parameters (by wire name) to remove from every API operation.",
    ),
    CliOption::new(keys::ENUM_PROPERTY_NAMING, "Naming convention for enum constants")
        .with_default("camelCase")
        .with_values(ENUM_PROPERTY_NAMING_VALUES),
    CliOption::new(keys::MODEL_NAME_PREFIX, "Prefix added to every model name"),
    CliOption::new(keys::MODEL_NAME_SUFFIX, "Suffix added to every model name"),
    CliOption::new(keys::API_NAME_SUFFIX, "Suffix added to every API class name"),
    CliOption::new(keys::LIBRARY, "Library template (sub-template) to use")
        .with_default(JVM_RETROFIT2)
        .with_values(LIBRARY_VALUES),
    CliOption::new(
        keys::REQUEST_DATE_CONVERTER,
        "JVM-Option. Defines in how to handle date-time objects that are used for a request (as query or parameter)",
    )
    .with_default("toString")
    .with_values(&[
        (
            "toString",
            "[DEFAULT] Use the 'toString'-method of the date-time object to retrieve the related string representation.",
        ),
        ("toJson", "Date formater option using a json converter."),
    ]),
    PACKAGE_NAME,
    API_PACKAGE,
    MODEL_PACKAGE,
    SOURCE_FOLDER,
];

const ROOM_OPTIONS: &[CliOption] = &[
    DATE_LIBRARY,
    COLLECTION_TYPE,
    EMPTY_DATA_CLASSES,
    PACKAGE_NAME,
    MODEL_PACKAGE,
    SOURCE_FOLDER,
];

const RETROFIT_OPTIONS: &[CliOption] = &[
    DATE_LIBRARY,
    CliOption::boolean(
        keys::GENERATE_INFRASTRUCTURE,
        "Option to add infrastructure package",
        true,
    ),
    PACKAGE_NAME,
    API_PACKAGE,
    MODEL_PACKAGE,
    SOURCE_FOLDER,
];

pub const KOTLIN_CLIENT_V2: Variant = Variant {
    name: "kotlin-client-v2",
    help: "Generates a Kotlin classes for specific library.",
    libraries: LIBRARIES,
    default_library: Some(JVM_RETROFIT2),
    artifact: ArtifactNaming::PerLibrary,
    model_package_segment: "model",
    api_templates: true,
    model_name_suffix: "",
    api_name_suffix: "",
    infrastructure_by_default: false,
    entity_package: None,
    policy: VariantPolicy {
        coerce_composed_arrays: true,
        repair_nested_items: true,
        flatten_all_of: true,
        relax_composed_vars: true,
        materialize_aliases: true,
        escape_base_name_literals: true,
        filter_operation_params: true,
        detect_multipart: true,
        ..VariantPolicy::MINIMAL
    },
    options: CLIENT_V2_OPTIONS,
};

pub const KOTLIN_ROOM: Variant = Variant {
    name: "kotlin-room",
    help: "Generates a Kotlin Room classes.",
    libraries: &[],
    default_library: None,
    artifact: ArtifactNaming::Fixed("kotlin-room"),
    model_package_segment: "models",
    api_templates: false,
    model_name_suffix: "Entity",
    api_name_suffix: "",
    infrastructure_by_default: false,
    entity_package: Some(ANDROID_ROOM_V2),
    policy: VariantPolicy::MINIMAL,
    options: ROOM_OPTIONS,
};

pub const KOTLIN_RETROFIT_CLIENT: Variant = Variant {
    name: "kotlin-retrofit-client",
    help: "Generates a Kotlin Retrofit client.",
    libraries: &[],
    default_library: None,
    artifact: ArtifactNaming::Fixed("kotlin-retrofit-client"),
    model_package_segment: "model",
    api_templates: true,
    model_name_suffix: "",
    api_name_suffix: "Service",
    infrastructure_by_default: true,
    entity_package: None,
    policy: VariantPolicy {
        strip_leading_slash: true,
        ..VariantPolicy::MINIMAL
    },
    options: RETROFIT_OPTIONS,
};

pub static VARIANTS: &[Variant] = &[KOTLIN_CLIENT_V2, KOTLIN_ROOM, KOTLIN_RETROFIT_CLIENT];

pub fn find_variant(name: &str) -> Result<&'static Variant, GeneratorError> {
    VARIANTS
        .iter()
        .find(|v| v.name == name)
        .ok_or_else(|| GeneratorError::UnknownVariant(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_name() {
        assert_eq!(find_variant("kotlin-room").unwrap().model_name_suffix, "Entity");
        assert!(matches!(
            find_variant("kotlin-client"),
            Err(GeneratorError::UnknownVariant(name)) if name == "kotlin-client"
        ));
    }

    #[test]
    fn default_library_layout() {
        let layout = KOTLIN_CLIENT_V2.select_library(None).unwrap();
        assert_eq!(layout.library.as_deref(), Some(JVM_RETROFIT2));
        assert_eq!(layout.artifact_id, "kotlin-jvm-retrofit2-client");
        assert_eq!(layout.output_folder, "generated-code/kotlin-jvm-retrofit2-client");
        assert_eq!(layout.api_package, "org.openapitools.client.api");
        assert_eq!(layout.model_package, "org.openapitools.client.model");
        assert!(layout.templates.api && layout.templates.api_doc);
    }

    #[test]
    fn room_libraries_drop_api_templates() {
        for library in [ROOM, ROOM2] {
            let layout = KOTLIN_CLIENT_V2.select_library(Some(library)).unwrap();
            assert!(!layout.templates.api);
            assert!(!layout.templates.api_doc);
            assert!(layout.templates.model && layout.templates.model_doc);
            assert_eq!(layout.artifact_id, format!("kotlin-{library}-client"));
        }
        let room = KOTLIN_CLIENT_V2.select_library(Some(ROOM)).unwrap();
        assert_eq!(room.entity_package, Some("android.arch.persistence.room"));
    }

    #[test]
    fn switching_back_restores_api_templates() {
        let room = KOTLIN_CLIENT_V2.select_library(Some(ROOM2)).unwrap();
        let http = KOTLIN_CLIENT_V2.select_library(Some(JVM_OKHTTP4)).unwrap();
        assert!(!room.templates.api);
        assert!(http.templates.api);
        assert_eq!(http.entity_package, None);
    }

    #[test]
    fn unsupported_library_lists_alternatives() {
        let err = KOTLIN_CLIENT_V2.select_library(Some("ktor")).unwrap_err();
        assert!(err.to_string().contains("multiplatform, jvm-okhttp4, jvm-retrofit2, room, room2"));

        let err = KOTLIN_ROOM.select_library(Some(ROOM2)).unwrap_err();
        assert!(matches!(err, GeneratorError::UnsupportedLibrary { ref supported, .. } if supported == "none"));
    }

    #[test]
    fn legacy_layouts() {
        let room = KOTLIN_ROOM.select_library(None).unwrap();
        assert_eq!(room.artifact_id, "kotlin-room");
        assert_eq!(room.model_package, "org.openapitools.client.models");
        assert!(!room.templates.api);

        let retrofit = KOTLIN_RETROFIT_CLIENT.select_library(None).unwrap();
        assert_eq!(retrofit.library, None);
        assert!(retrofit.templates.api);
        assert!(KOTLIN_RETROFIT_CLIENT.policy.strip_leading_slash);
    }

    #[test]
    fn multiplatform_policy() {
        let policy = KOTLIN_CLIENT_V2.policy_for(Some(MULTIPLATFORM));
        assert!(policy.path_params_first);
        assert_eq!(policy.binary_param_type, Some(KTOR_INPUT_PROVIDER));

        let jvm = KOTLIN_CLIENT_V2.policy_for(Some(JVM_RETROFIT2));
        assert!(!jvm.path_params_first);
        assert_eq!(jvm.binary_param_type, None);
    }

    #[test]
    fn option_descriptors() {
        let option = KOTLIN_CLIENT_V2.option("composedArrayAsAny").unwrap();
        assert_eq!(option.default, Some("true"));
        assert!(KOTLIN_CLIENT_V2.option("library").unwrap().accepts("room2"));
        assert!(!KOTLIN_ROOM.declares("removeOperationParams"));
        assert_eq!(
            KOTLIN_RETROFIT_CLIENT.option("generateInfrastructure").unwrap().default,
            Some("true")
        );
    }
}
