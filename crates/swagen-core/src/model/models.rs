use serde::Serialize;

use super::VendorExtensions;

/// One constant of a generated enum.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumValue {
    /// Target-language constant name.
    pub name: String,
    /// Wire value as written in the document.
    pub value: String,
    pub is_string: bool,
}

/// A property of a generated model.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GeneratedProperty {
    /// Target-language identifier.
    pub name: String,
    /// Wire name as declared in the schema.
    pub base_name: String,
    pub data_type: String,
    /// Element type for containers, otherwise the data type.
    pub base_type: String,
    pub description: Option<String>,
    pub default_value: Option<String>,
    pub required: bool,
    pub is_read_only: bool,
    pub is_inherited: bool,
    pub is_container: bool,
    pub is_enum: bool,
    pub enum_values: Vec<EnumValue>,
    pub vendor_extensions: VendorExtensions,
}

/// A model produced by converting one component schema.
///
/// The property lists are overlapping views of the same variables. `vars`
/// holds the model's own variables; `all_vars` additionally holds the ones
/// inherited from `parent`. The required/optional/read-only/read-write views
/// are derived from `vars` by [`GeneratedModel::rebuild_views`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GeneratedModel {
    /// Schema name as declared under `components.schemas`.
    pub name: String,
    pub class_name: String,
    pub description: Option<String>,

    pub vars: Vec<GeneratedProperty>,
    pub all_vars: Vec<GeneratedProperty>,
    pub required_vars: Vec<GeneratedProperty>,
    pub optional_vars: Vec<GeneratedProperty>,
    pub read_only_vars: Vec<GeneratedProperty>,
    pub read_write_vars: Vec<GeneratedProperty>,
    pub parent_vars: Vec<GeneratedProperty>,

    pub parent: Option<String>,
    pub all_of: Vec<String>,
    pub one_of: Vec<String>,
    pub any_of: Vec<String>,

    /// Aliased type, for models that are another name for an existing type.
    pub data_type: Option<String>,
    pub is_alias: bool,
    pub is_array: bool,
    pub is_map: bool,
    pub is_enum: bool,
    pub enum_values: Vec<EnumValue>,

    pub vendor_extensions: VendorExtensions,
}

impl GeneratedModel {
    /// Recompute the derived views from `vars`.
    pub fn rebuild_views(&mut self) {
        let (required, optional): (Vec<_>, Vec<_>) =
            self.vars.iter().cloned().partition(|v| v.required);
        let (read_only, read_write): (Vec<_>, Vec<_>) =
            self.vars.iter().cloned().partition(|v| v.is_read_only);
        self.required_vars = required;
        self.optional_vars = optional;
        self.read_only_vars = read_only;
        self.read_write_vars = read_write;
    }

    /// Total entries across every property view.
    pub fn property_view_count(&self) -> usize {
        self.vars.len()
            + self.all_vars.len()
            + self.required_vars.len()
            + self.optional_vars.len()
            + self.read_only_vars.len()
            + self.read_write_vars.len()
            + self.parent_vars.len()
    }

    /// Apply `f` to every entry of every property view.
    pub fn for_each_property_mut(&mut self, mut f: impl FnMut(&mut GeneratedProperty)) {
        for view in [
            &mut self.vars,
            &mut self.all_vars,
            &mut self.required_vars,
            &mut self.optional_vars,
            &mut self.read_only_vars,
            &mut self.read_write_vars,
            &mut self.parent_vars,
        ] {
            view.iter_mut().for_each(&mut f);
        }
    }

    pub fn has_composed_members(&self) -> bool {
        !self.one_of.is_empty() || !self.any_of.is_empty()
    }
}
