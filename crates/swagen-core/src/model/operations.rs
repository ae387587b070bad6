use indexmap::IndexMap;
use serde::Serialize;

use super::VendorExtensions;

/// A `{ "mediaType": ... }` entry of an operation's consumes/produces list.
pub type MediaTypeEntry = IndexMap<String, String>;

pub const MEDIA_TYPE_KEY: &str = "mediaType";
pub const MULTIPART_FORM_DATA: &str = "multipart/form-data";
pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

pub fn media_type_entry(media_type: &str) -> MediaTypeEntry {
    let mut entry = IndexMap::new();
    entry.insert(MEDIA_TYPE_KEY.to_string(), media_type.to_string());
    entry
}

/// Where a parameter travels in the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterKind {
    Path,
    Query,
    Header,
    Cookie,
    Body,
    Form,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedParameter {
    /// Wire name.
    pub base_name: String,
    /// Target-language identifier.
    pub param_name: String,
    pub data_type: String,
    pub base_type: String,
    pub data_format: Option<String>,
    pub description: Option<String>,
    pub kind: ParameterKind,
    pub required: bool,
    /// Another parameter follows this one in the signature.
    pub has_more: bool,
}

impl GeneratedParameter {
    pub fn is_path_param(&self) -> bool {
        self.kind == ParameterKind::Path
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedOperation {
    pub operation_id: String,
    pub nickname: String,
    pub http_method: String,
    pub path: String,
    pub summary: Option<String>,
    pub notes: Option<String>,
    pub tags: Vec<String>,
    pub all_params: Vec<GeneratedParameter>,
    pub consumes: Vec<MediaTypeEntry>,
    pub produces: Vec<MediaTypeEntry>,
    pub has_consumes: bool,
    pub is_multipart: bool,
    pub return_type: Option<String>,
    pub is_deprecated: bool,
    pub vendor_extensions: VendorExtensions,
}

/// Operations rendered into one API class.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationGroup {
    pub tag: String,
    pub class_name: String,
    pub operations: Vec<GeneratedOperation>,
    /// Any operation in the group is multipart.
    pub is_multipart: bool,
}

/// Set `has_more` on every parameter except the last.
pub fn recompute_has_more(params: &mut [GeneratedParameter]) {
    let last = params.len().saturating_sub(1);
    for (i, p) in params.iter_mut().enumerate() {
        p.has_more = i < last;
    }
}
