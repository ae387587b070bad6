use log::{debug, warn};
use swagen_core::config::ResolvedRun;
use swagen_core::error::GeneratorError;
use swagen_core::options::{AdditionalProperties, PropertyValue, bool_and_write_back, keys};
use swagen_core::transform::{
    CollectionType, ConversionOptions, DateLibrary, EnumPropertyNaming, VariantPolicy,
};

use crate::registry::{DEFAULT_SOURCE_FOLDER, Layout, Variant};

/// Everything a variant derives from one run's options.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub variant: &'static str,
    pub layout: Layout,
    pub policy: VariantPolicy,
    pub conversion: ConversionOptions,
    pub generate_infrastructure: bool,
    pub source_folder: String,
    /// Properties handed to the templates, including written-back flags.
    pub template_properties: AdditionalProperties,
}

/// Read the run's additional properties the way `variant` understands them.
///
/// Values the templates depend on are written back in normalized form:
/// booleans become real booleans, the selected library and date library
/// become flags, and the package layout is filled in.
pub fn process_options(
    variant: &'static Variant,
    run: &ResolvedRun,
) -> Result<RunSettings, GeneratorError> {
    let mut props = run.additional_properties.clone();

    let requested_library = run
        .library
        .clone()
        .or_else(|| string_option(&props, keys::LIBRARY));
    let mut layout = variant.select_library(requested_library.as_deref())?;
    for library in variant.libraries {
        let selected = layout.library.as_deref() == Some(library.name);
        props.insert(library.name.to_string(), PropertyValue::Bool(selected));
    }
    if let Some(library) = &layout.library {
        props.insert(keys::LIBRARY.to_string(), library.as_str().into());
    }

    let mut conversion = ConversionOptions::default();
    conversion.naming.model_name_suffix = variant.model_name_suffix.to_string();
    conversion.naming.api_name_suffix = variant.api_name_suffix.to_string();

    if variant.declares(keys::DATE_LIBRARY) {
        let date_library = match string_option(&props, keys::DATE_LIBRARY) {
            Some(value) => conversion.types.apply_date_library_option(&value),
            None => Some(DateLibrary::default()),
        };
        match date_library {
            Some(DateLibrary::Java8) => {
                props.insert("java8".to_string(), PropertyValue::Bool(true));
            }
            Some(DateLibrary::ThreeTenBp) => {
                props.insert("threetenbp".to_string(), PropertyValue::Bool(true));
            }
            _ => {}
        }
    }

    if variant.declares(keys::COLLECTION_TYPE) {
        if let Some(value) = string_option(&props, keys::COLLECTION_TYPE) {
            match CollectionType::parse(&value) {
                Some(collection) => {
                    conversion.types.apply_collection_type(collection);
                    if collection == CollectionType::List {
                        props.insert(keys::IS_LIST.to_string(), PropertyValue::Bool(true));
                    }
                }
                None => warn!("Unknown collectionType '{value}', keeping arrays"),
            }
        }
    }

    if variant.declares(keys::EMPTY_DATA_CLASSES) {
        if let Some(value) = bool_and_write_back(&mut props, keys::EMPTY_DATA_CLASSES) {
            conversion.allow_empty_data_classes = value;
        }
    }
    if variant.declares(keys::COMPOSED_ARRAY_AS_ANY) {
        if let Some(value) = bool_and_write_back(&mut props, keys::COMPOSED_ARRAY_AS_ANY) {
            conversion.composed_array_as_any = value;
        }
    }
    if variant.declares(keys::COMPOSED_VARS_NOT_REQUIRED) {
        if let Some(value) = bool_and_write_back(&mut props, keys::COMPOSED_VARS_NOT_REQUIRED) {
            conversion.composed_vars_not_required = value;
        }
    }
    if variant.declares(keys::GENERATE_PRIMITIVE_TYPE_ALIAS) {
        if let Some(value) = bool_and_write_back(&mut props, keys::GENERATE_PRIMITIVE_TYPE_ALIAS) {
            conversion.generate_primitive_type_alias = value;
        }
    }
    if variant.declares(keys::REMOVE_OPERATION_PARAMS) {
        if let Some(value) = props.get(keys::REMOVE_OPERATION_PARAMS) {
            conversion.remove_operation_params = value.as_string_list();
            debug!(
                "Removing operation params: {:?}",
                conversion.remove_operation_params
            );
        }
    }
    if variant.declares(keys::ENUM_PROPERTY_NAMING) {
        if let Some(value) = string_option(&props, keys::ENUM_PROPERTY_NAMING) {
            conversion.naming.enum_property_naming = EnumPropertyNaming::parse(&value)?;
        }
    }
    if variant.declares(keys::REQUEST_DATE_CONVERTER) {
        if let (Some(value), Some(option)) = (
            string_option(&props, keys::REQUEST_DATE_CONVERTER),
            variant.option(keys::REQUEST_DATE_CONVERTER),
        ) {
            if !option.accepts(&value) {
                return Err(GeneratorError::InvalidOption {
                    key: option.key.to_string(),
                    value,
                    allowed: option.allowed_values(),
                });
            }
        }
    }
    for (key, target) in [
        (keys::MODEL_NAME_PREFIX, &mut conversion.naming.model_name_prefix),
        (keys::MODEL_NAME_SUFFIX, &mut conversion.naming.model_name_suffix),
        (keys::API_NAME_SUFFIX, &mut conversion.naming.api_name_suffix),
    ] {
        if variant.declares(key) {
            if let Some(value) = string_option(&props, key) {
                *target = value;
            }
        }
    }

    let generate_infrastructure = if variant.declares(keys::GENERATE_INFRASTRUCTURE) {
        bool_and_write_back(&mut props, keys::GENERATE_INFRASTRUCTURE)
            .unwrap_or(variant.infrastructure_by_default)
    } else {
        variant.infrastructure_by_default
    };
    for flag in [
        keys::REMOVE_MINUS_TEXT_IN_HEADER_PROPERTY,
        keys::IGNORE_ENDPOINT_STARTING_SLASH,
    ] {
        bool_and_write_back(&mut props, flag);
    }

    apply_packages(&mut layout, &props);
    let source_folder = string_option(&props, keys::SOURCE_FOLDER)
        .unwrap_or_else(|| DEFAULT_SOURCE_FOLDER.to_string());
    if let Some(artifact_id) = string_option(&props, keys::ARTIFACT_ID) {
        layout.artifact_id = artifact_id;
    }
    for (key, value) in [
        (keys::PACKAGE_NAME, &layout.package_name),
        (keys::API_PACKAGE, &layout.api_package),
        (keys::MODEL_PACKAGE, &layout.model_package),
        (keys::ARTIFACT_ID, &layout.artifact_id),
        (keys::SOURCE_FOLDER, &source_folder),
    ] {
        props.insert(key.to_string(), value.as_str().into());
    }

    Ok(RunSettings {
        variant: variant.name,
        policy: variant.policy_for(layout.library.as_deref()),
        layout,
        conversion,
        generate_infrastructure,
        source_folder,
        template_properties: props,
    })
}

/// A custom `packageName` moves the api and model packages along with it
/// unless they are set explicitly.
fn apply_packages(layout: &mut Layout, props: &AdditionalProperties) {
    if let Some(package) = string_option(props, keys::PACKAGE_NAME) {
        layout.api_package = layout.api_package.replacen(&layout.package_name, &package, 1);
        layout.model_package = layout
            .model_package
            .replacen(&layout.package_name, &package, 1);
        layout.package_name = package;
    }
    if let Some(package) = string_option(props, keys::API_PACKAGE) {
        layout.api_package = package;
    }
    if let Some(package) = string_option(props, keys::MODEL_PACKAGE) {
        layout.model_package = package;
    }
}

fn string_option(props: &AdditionalProperties, key: &str) -> Option<String> {
    props.get(key).and_then(PropertyValue::as_str).map(String::from)
}
