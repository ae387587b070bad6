use std::collections::HashSet;

use super::document::{
    Components, OpenApiDocument, Parameter, ParameterOrRef, RequestBody, RequestBodyOrRef,
    Response, ResponseOrRef,
};
use super::schema::{Schema, SchemaOrRef};
use crate::error::ResolveError;

/// Lazy, read-only lookup of `#/components/...` references.
///
/// Unlike a whole-document resolver, nothing is inlined up front: callers ask
/// for a target when they need it and keep working with the reference
/// otherwise, so generated code can still name the referenced model.
#[derive(Debug, Clone, Copy)]
pub struct RefLookup<'a> {
    components: Option<&'a Components>,
}

impl<'a> RefLookup<'a> {
    pub fn new(doc: &'a OpenApiDocument) -> Self {
        Self {
            components: doc.components.as_ref(),
        }
    }

    pub fn from_components(components: Option<&'a Components>) -> Self {
        Self { components }
    }

    /// Follow a schema reference (and any reference chain) to its definition.
    pub fn schema(&self, ref_path: &str) -> Result<&'a Schema, ResolveError> {
        let mut visited = HashSet::new();
        let mut current = ref_path;
        loop {
            if !visited.insert(current.to_string()) {
                return Err(ResolveError::CircularRef(ref_path.to_string()));
            }
            let name = parse_ref_name(current, "schemas")?;
            match self.components.and_then(|c| c.schemas.get(name)) {
                Some(SchemaOrRef::Schema(schema)) => return Ok(schema.as_ref()),
                Some(SchemaOrRef::Ref { ref_path: next }) => current = next,
                None => return Err(ResolveError::RefTargetNotFound(ref_path.to_string())),
            }
        }
    }

    /// Resolve a schema-or-reference to its definition.
    pub fn resolve<'s>(&self, schema: &'s SchemaOrRef) -> Result<&'s Schema, ResolveError>
    where
        'a: 's,
    {
        match schema {
            SchemaOrRef::Schema(s) => Ok(s.as_ref()),
            SchemaOrRef::Ref { ref_path } => self.schema(ref_path),
        }
    }

    pub fn parameter<'s>(&self, param: &'s ParameterOrRef) -> Result<&'s Parameter, ResolveError>
    where
        'a: 's,
    {
        match param {
            ParameterOrRef::Parameter(p) => Ok(p),
            ParameterOrRef::Ref { ref_path } => {
                let name = parse_ref_name(ref_path, "parameters")?;
                match self.components.and_then(|c| c.parameters.get(name)) {
                    Some(ParameterOrRef::Parameter(p)) => Ok(p),
                    _ => Err(ResolveError::RefTargetNotFound(ref_path.clone())),
                }
            }
        }
    }

    pub fn request_body<'s>(
        &self,
        body: &'s RequestBodyOrRef,
    ) -> Result<&'s RequestBody, ResolveError>
    where
        'a: 's,
    {
        match body {
            RequestBodyOrRef::RequestBody(b) => Ok(b),
            RequestBodyOrRef::Ref { ref_path } => {
                let name = parse_ref_name(ref_path, "requestBodies")?;
                match self.components.and_then(|c| c.request_bodies.get(name)) {
                    Some(RequestBodyOrRef::RequestBody(b)) => Ok(b),
                    _ => Err(ResolveError::RefTargetNotFound(ref_path.clone())),
                }
            }
        }
    }

    pub fn response<'s>(&self, response: &'s ResponseOrRef) -> Result<&'s Response, ResolveError>
    where
        'a: 's,
    {
        match response {
            ResponseOrRef::Response(r) => Ok(r),
            ResponseOrRef::Ref { ref_path } => {
                let name = parse_ref_name(ref_path, "responses")?;
                match self.components.and_then(|c| c.responses.get(name)) {
                    Some(ResponseOrRef::Response(r)) => Ok(r),
                    _ => Err(ResolveError::RefTargetNotFound(ref_path.clone())),
                }
            }
        }
    }
}

/// The schema name at the end of a `#/components/schemas/<Name>` reference.
pub fn schema_ref_name(ref_path: &str) -> &str {
    ref_path.rsplit('/').next().unwrap_or(ref_path)
}

fn parse_ref_name<'p>(
    ref_path: &'p str,
    expected_section: &str,
) -> Result<&'p str, ResolveError> {
    let stripped = ref_path
        .strip_prefix("#/components/")
        .ok_or_else(|| ResolveError::InvalidRefFormat(ref_path.to_string()))?;
    let (section, name) = stripped
        .split_once('/')
        .ok_or_else(|| ResolveError::InvalidRefFormat(ref_path.to_string()))?;
    if section != expected_section {
        return Err(ResolveError::InvalidRefFormat(format!(
            "expected section '{expected_section}', got '{section}' in {ref_path}"
        )));
    }
    Ok(name)
}
