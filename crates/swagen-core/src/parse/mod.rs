pub mod document;
pub mod ref_lookup;
pub mod schema;

pub use document::*;
pub use ref_lookup::{RefLookup, schema_ref_name};
pub use schema::*;

use crate::error::ParseError;

/// Parse an OpenAPI document from YAML.
pub fn from_yaml(input: &str) -> Result<OpenApiDocument, ParseError> {
    let doc: OpenApiDocument = serde_yaml_ng::from_str(input)?;
    validate_version(&doc)?;
    Ok(doc)
}

/// Parse an OpenAPI document from JSON.
pub fn from_json(input: &str) -> Result<OpenApiDocument, ParseError> {
    let doc: OpenApiDocument = serde_json::from_str(input)?;
    validate_version(&doc)?;
    Ok(doc)
}

/// Parse by file extension: `.json` as JSON, anything else as YAML.
pub fn from_path_contents(
    path: &std::path::Path,
    input: &str,
) -> Result<OpenApiDocument, ParseError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => from_json(input),
        _ => from_yaml(input),
    }
}

fn validate_version(doc: &OpenApiDocument) -> Result<(), ParseError> {
    if !doc.openapi.starts_with("3.") {
        return Err(ParseError::UnsupportedVersion(doc.openapi.clone()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_swagger_2() {
        let err = from_yaml("openapi: '2.0'\ninfo: {title: t, version: '1'}\n").unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedVersion(v) if v == "2.0"));
    }

    #[test]
    fn json_by_extension() {
        let doc = from_path_contents(
            std::path::Path::new("api.json"),
            r#"{"openapi":"3.0.3","info":{"title":"T","version":"1"}}"#,
        )
        .unwrap();
        assert_eq!(doc.info.title, "T");
    }
}
