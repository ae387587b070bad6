use log::debug;

use crate::model::{
    GeneratedParameter, MEDIA_TYPE_KEY, MULTIPART_FORM_DATA, MediaTypeEntry, OperationGroup,
    recompute_has_more,
};

/// Operation rewrites run on each API group after conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationPostProcessor {
    /// Wire names of parameters to drop.
    pub remove_params: Vec<String>,
    pub detect_multipart: bool,
    pub path_params_first: bool,
    /// Replacement type for `binary` parameters.
    pub binary_param_type: Option<String>,
    pub strip_leading_slash: bool,
}

impl OperationPostProcessor {
    pub fn process(&self, group: &mut OperationGroup) {
        for op in &mut group.operations {
            filter_params(&mut op.all_params, &self.remove_params);

            if self.detect_multipart && op.has_consumes && is_multipart(&op.consumes) {
                op.is_multipart = true;
                group.is_multipart = true;
            }

            if self.path_params_first {
                path_params_first(&mut op.all_params);
            }

            if let Some(provider) = &self.binary_param_type {
                remap_binary_params(&mut op.all_params, provider);
            }

            if self.strip_leading_slash {
                strip_leading_slash(&mut op.path);
            }
        }
    }
}

/// Drop parameters named in `remove` and clear `has_more` on the new last
/// parameter. An emptied list is left as it is.
pub fn filter_params(params: &mut Vec<GeneratedParameter>, remove: &[String]) -> usize {
    if remove.is_empty() {
        return 0;
    }
    let before = params.len();
    params.retain(|p| !remove.contains(&p.base_name));
    let removed = before - params.len();
    if removed > 0 {
        debug!("Removed {removed} operation parameter(s)");
    }
    if let Some(last) = params.last_mut() {
        last.has_more = false;
    }
    removed
}

/// Only the first consumes entry is inspected.
pub fn is_multipart(consumes: &[MediaTypeEntry]) -> bool {
    consumes
        .first()
        .and_then(|entry| entry.get(MEDIA_TYPE_KEY))
        .is_some_and(|media_type| media_type == MULTIPART_FORM_DATA)
}

/// Stable reorder putting path parameters first.
pub fn path_params_first(params: &mut [GeneratedParameter]) {
    params.sort_by_key(|p| !p.is_path_param());
    recompute_has_more(params);
}

pub fn remap_binary_params(params: &mut [GeneratedParameter], provider_type: &str) -> usize {
    let mut remapped = 0;
    for param in params
        .iter_mut()
        .filter(|p| p.data_format.as_deref() == Some("binary"))
    {
        param.data_type = provider_type.to_string();
        param.base_type = provider_type.to_string();
        remapped += 1;
    }
    remapped
}

pub fn strip_leading_slash(path: &mut String) {
    if path.starts_with('/') {
        path.remove(0);
    }
}
