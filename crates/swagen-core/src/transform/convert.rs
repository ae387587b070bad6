use log::warn;

use super::classify::is_type_alias;
use super::name_normalizer::{NamingOptions, route_to_name, to_var_name};
use super::type_mapper::TypeMapping;
use crate::error::TransformError;
use crate::model::{
    EnumValue, FORM_URLENCODED, GeneratedModel, GeneratedOperation, GeneratedParameter,
    GeneratedProperty, MULTIPART_FORM_DATA, ParameterKind, media_type_entry, recompute_has_more,
};
use crate::parse::{
    Operation, Parameter, ParameterLocation, ParameterOrRef, RefLookup, Schema, SchemaKind,
    SchemaOrRef, schema_ref_name,
};

/// allOf/oneOf chains deeper than this are not followed.
const MAX_COMPOSITION_DEPTH: usize = 16;

/// Default schema-to-model and operation conversion.
pub struct Converter<'a> {
    lookup: RefLookup<'a>,
    types: &'a TypeMapping,
    naming: &'a NamingOptions,
}

impl<'a> Converter<'a> {
    pub fn new(lookup: RefLookup<'a>, types: &'a TypeMapping, naming: &'a NamingOptions) -> Self {
        Self {
            lookup,
            types,
            naming,
        }
    }

    // --- Types ---

    /// Kotlin type declaration for a schema or reference.
    pub fn type_declaration(&self, schema: &SchemaOrRef) -> String {
        match schema {
            SchemaOrRef::Ref { ref_path } => match self.lookup.schema(ref_path) {
                Ok(target) if is_type_alias(target) => self.types.primitive(target).to_string(),
                _ => self.naming.model_name(schema_ref_name(ref_path)),
            },
            SchemaOrRef::Schema(inline) => self.inline_declaration(inline),
        }
    }

    fn inline_declaration(&self, schema: &Schema) -> String {
        match schema.kind() {
            SchemaKind::Array => {
                let inner = schema
                    .items
                    .as_deref()
                    .map(|items| self.type_declaration(items))
                    .unwrap_or_else(|| self.types.get("object").to_string());
                format!("{}<{inner}>", self.types.get("array"))
            }
            SchemaKind::Map => {
                let inner = schema
                    .map_values()
                    .map(|values| self.type_declaration(values))
                    .unwrap_or_else(|| self.types.get("object").to_string());
                format!("{}<kotlin.String, {inner}>", self.types.get("map"))
            }
            SchemaKind::Composed => match single_all_of_member(schema) {
                Some(member) => self.type_declaration(member),
                None => self.types.get("object").to_string(),
            },
            SchemaKind::Primitive | SchemaKind::Object => self.types.primitive(schema).to_string(),
        }
    }

    /// Innermost element type of a container declaration.
    fn element_type(&self, schema: &SchemaOrRef) -> String {
        match schema.as_schema() {
            Some(inline) if inline.kind() == SchemaKind::Array => match inline.items.as_deref() {
                Some(items) => self.element_type(items),
                None => self.types.get("object").to_string(),
            },
            Some(inline) if inline.kind() == SchemaKind::Map => match inline.map_values() {
                Some(values) => self.element_type(values),
                None => self.types.get("object").to_string(),
            },
            _ => self.type_declaration(schema),
        }
    }

    fn enum_values(&self, schema: &Schema, data_type: &str) -> Vec<EnumValue> {
        schema
            .enum_values
            .iter()
            .filter(|value| !value.is_null())
            .map(|value| {
                let raw = match value.as_str() {
                    Some(s) => s.to_string(),
                    None => value.to_string(),
                };
                EnumValue {
                    name: self.naming.enum_var_name(&raw, data_type),
                    value: raw,
                    is_string: value.is_string(),
                }
            })
            .collect()
    }

    // --- Models ---

    /// Convert one component schema into a model.
    pub fn from_model(&self, name: &str, schema: &Schema) -> GeneratedModel {
        let mut model = GeneratedModel {
            name: name.to_string(),
            class_name: self.naming.model_name(name),
            description: schema.description.clone(),
            ..Default::default()
        };

        match schema.kind() {
            SchemaKind::Array => {
                model.is_array = true;
                model.parent = Some(self.inline_declaration(schema));
            }
            SchemaKind::Map => {
                model.is_map = true;
                model.parent = Some(self.inline_declaration(schema));
            }
            SchemaKind::Primitive => {
                let data_type = self.types.primitive(schema).to_string();
                if schema.enum_values.is_empty() {
                    model.is_alias = true;
                } else {
                    model.is_enum = true;
                    model.enum_values = self.enum_values(schema, &data_type);
                }
                model.data_type = Some(data_type);
            }
            SchemaKind::Composed | SchemaKind::Object => {
                self.collect_vars(&mut model, schema);
                if model.has_composed_members() || (schema.properties.is_empty() && model.all_vars.is_empty()) {
                    model.data_type = Some(self.types.get("object").to_string());
                }
            }
        }

        model.rebuild_views();
        model
    }

    fn collect_vars(&self, model: &mut GeneratedModel, schema: &Schema) {
        let mut inherited: Vec<GeneratedProperty> = Vec::new();
        let mut own: Vec<GeneratedProperty> = Vec::new();

        for member in &schema.all_of {
            match member {
                SchemaOrRef::Ref { ref_path } => {
                    let parent_name = self.naming.model_name(schema_ref_name(ref_path));
                    model.all_of.push(parent_name.clone());
                    let props = self.member_properties(member, 0);
                    if model.parent.is_none() {
                        model.parent = Some(parent_name);
                        inherited.extend(props.into_iter().map(|mut p| {
                            p.is_inherited = true;
                            p
                        }));
                    } else {
                        own.extend(props);
                    }
                }
                SchemaOrRef::Schema(_) => own.extend(self.member_properties(member, 0)),
            }
        }

        own.extend(self.own_properties(schema));

        for member in &schema.one_of {
            model.one_of.push(self.type_declaration(member));
            own.extend(self.member_properties(member, 0));
        }
        for member in &schema.any_of {
            model.any_of.push(self.type_declaration(member));
            own.extend(self.member_properties(member, 0));
        }

        let mut seen: Vec<String> = inherited.iter().map(|p| p.base_name.clone()).collect();
        own.retain(|p| {
            if seen.contains(&p.base_name) {
                false
            } else {
                seen.push(p.base_name.clone());
                true
            }
        });

        model.parent_vars = inherited.clone();
        model.all_vars = inherited.into_iter().chain(own.iter().cloned()).collect();
        model.vars = own;
    }

    fn own_properties(&self, schema: &Schema) -> Vec<GeneratedProperty> {
        schema
            .properties
            .iter()
            .map(|(name, prop)| self.from_property(name, prop, schema.is_required(name)))
            .collect()
    }

    /// Properties contributed by a composition member, following nested allOf.
    fn member_properties(&self, member: &SchemaOrRef, depth: usize) -> Vec<GeneratedProperty> {
        if depth > MAX_COMPOSITION_DEPTH {
            warn!("Composition nested deeper than {MAX_COMPOSITION_DEPTH} levels, stopping");
            return Vec::new();
        }
        let schema = match self.lookup.resolve(member) {
            Ok(schema) => schema,
            Err(err) => {
                warn!("Skipping composition member: {err}");
                return Vec::new();
            }
        };
        let mut props: Vec<GeneratedProperty> = schema
            .all_of
            .iter()
            .flat_map(|nested| self.member_properties(nested, depth + 1))
            .collect();
        props.extend(self.own_properties(schema));
        props
    }

    pub fn from_property(&self, base_name: &str, schema: &SchemaOrRef, required: bool) -> GeneratedProperty {
        let data_type = self.type_declaration(schema);
        let inline = schema.as_schema();
        let resolved = self.lookup.resolve(schema).ok();
        let is_container =
            inline.is_some_and(|s| matches!(s.kind(), SchemaKind::Array | SchemaKind::Map));
        let base_type = if is_container {
            self.element_type(schema)
        } else {
            data_type.clone()
        };
        let enum_values = match inline {
            Some(s) if !s.enum_values.is_empty() => self.enum_values(s, &data_type),
            _ => Vec::new(),
        };

        GeneratedProperty {
            name: to_var_name(base_name),
            base_name: base_name.to_string(),
            base_type,
            description: resolved.and_then(|s| s.description.clone()),
            default_value: inline
                .and_then(|s| s.default_value.as_ref())
                .map(|value| match value.as_str() {
                    Some(s) => s.to_string(),
                    None => value.to_string(),
                }),
            required,
            is_read_only: resolved.and_then(|s| s.read_only).unwrap_or(false),
            is_inherited: false,
            is_container,
            is_enum: !enum_values.is_empty(),
            enum_values,
            data_type,
            vendor_extensions: Default::default(),
        }
    }

    // --- Operations ---

    pub fn from_operation(
        &self,
        method: &str,
        path: &str,
        op: &Operation,
        path_params: &[ParameterOrRef],
    ) -> Result<GeneratedOperation, TransformError> {
        let operation_id = op
            .operation_id
            .clone()
            .unwrap_or_else(|| route_to_name(method, path));

        let mut declared: Vec<&Parameter> = Vec::new();
        for param in path_params {
            declared.push(self.lookup.parameter(param)?);
        }
        for param in &op.parameters {
            let param = self.lookup.parameter(param)?;
            declared.retain(|d| !(d.name == param.name && d.location == param.location));
            declared.push(param);
        }
        let mut all_params: Vec<GeneratedParameter> =
            declared.into_iter().map(|p| self.from_parameter(p)).collect();

        let mut consumes = Vec::new();
        if let Some(body) = &op.request_body {
            let body = self.lookup.request_body(body)?;
            consumes = body.content.keys().map(|m| media_type_entry(m)).collect();
            let first = body
                .content
                .first()
                .and_then(|(media_type, content)| content.schema.as_ref().map(|s| (media_type, s)));
            if let Some((media_type, schema)) = first {
                if media_type == MULTIPART_FORM_DATA || media_type == FORM_URLENCODED {
                    all_params.extend(self.form_params(schema)?);
                } else {
                    all_params.push(self.body_param(schema, body.required));
                }
            }
        }
        recompute_has_more(&mut all_params);

        let (return_type, produces) = self.success_response(op)?;

        Ok(GeneratedOperation {
            nickname: to_var_name(&operation_id),
            operation_id,
            http_method: method.to_uppercase(),
            path: path.to_string(),
            summary: op.summary.clone(),
            notes: op.description.clone(),
            tags: op.tags.clone(),
            all_params,
            has_consumes: !consumes.is_empty(),
            consumes,
            produces,
            is_multipart: false,
            return_type,
            is_deprecated: op.deprecated.unwrap_or(false),
            vendor_extensions: Default::default(),
        })
    }

    fn from_parameter(&self, param: &Parameter) -> GeneratedParameter {
        let (data_type, base_type, data_format) = match &param.schema {
            Some(schema) => (
                self.type_declaration(schema),
                self.element_type(schema),
                self.lookup.resolve(schema).ok().and_then(|s| s.format.clone()),
            ),
            None => {
                let string = self.types.get("string").to_string();
                (string.clone(), string, None)
            }
        };
        let kind = match param.location {
            ParameterLocation::Path => ParameterKind::Path,
            ParameterLocation::Query => ParameterKind::Query,
            ParameterLocation::Header => ParameterKind::Header,
            ParameterLocation::Cookie => ParameterKind::Cookie,
        };
        GeneratedParameter {
            base_name: param.name.clone(),
            param_name: to_var_name(&param.name),
            data_type,
            base_type,
            data_format,
            description: param.description.clone(),
            kind,
            required: param.required || kind == ParameterKind::Path,
            has_more: false,
        }
    }

    fn form_params(&self, schema: &SchemaOrRef) -> Result<Vec<GeneratedParameter>, TransformError> {
        let form = self.lookup.resolve(schema)?;
        Ok(form
            .properties
            .iter()
            .map(|(name, prop)| GeneratedParameter {
                base_name: name.clone(),
                param_name: to_var_name(name),
                data_type: self.type_declaration(prop),
                base_type: self.element_type(prop),
                data_format: self.lookup.resolve(prop).ok().and_then(|s| s.format.clone()),
                description: self.lookup.resolve(prop).ok().and_then(|s| s.description.clone()),
                kind: ParameterKind::Form,
                required: form.is_required(name),
                has_more: false,
            })
            .collect())
    }

    fn body_param(&self, schema: &SchemaOrRef, required: bool) -> GeneratedParameter {
        let base_name = match schema.ref_path() {
            Some(ref_path) => schema_ref_name(ref_path).to_string(),
            None => "body".to_string(),
        };
        GeneratedParameter {
            param_name: to_var_name(&base_name),
            base_name,
            data_type: self.type_declaration(schema),
            base_type: self.element_type(schema),
            data_format: None,
            description: None,
            kind: ParameterKind::Body,
            required,
            has_more: false,
        }
    }

    /// Return type and produced media types of the first 2xx response.
    fn success_response(
        &self,
        op: &Operation,
    ) -> Result<(Option<String>, Vec<crate::model::MediaTypeEntry>), TransformError> {
        let Some((_, response)) = op
            .responses
            .iter()
            .find(|(status, _)| status.starts_with('2'))
        else {
            return Ok((None, Vec::new()));
        };
        let response = self.lookup.response(response)?;
        let produces = response.content.keys().map(|m| media_type_entry(m)).collect();
        let return_type = response
            .content
            .values()
            .find_map(|media| media.schema.as_ref())
            .map(|schema| self.type_declaration(schema));
        Ok((return_type, produces))
    }
}

fn single_all_of_member(schema: &Schema) -> Option<&SchemaOrRef> {
    match schema.all_of.as_slice() {
        [member] if schema.one_of.is_empty() && schema.any_of.is_empty() => Some(member),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::{self, OpenApiDocument};

    const DOC: &str = r#"
openapi: 3.0.3
info: {title: Zoo, version: "1"}
paths:
  /pets/{petId}:
    parameters:
      - {name: petId, in: path, required: true, schema: {type: integer, format: int64}}
    get:
      operationId: getPet
      tags: [pet]
      parameters:
        - {name: verbose, in: query, schema: {type: boolean}}
      responses:
        "200":
          description: ok
          content:
            application/json:
              schema: {$ref: '#/components/schemas/Pet'}
  /pets/{petId}/photo:
    post:
      tags: [pet]
      parameters:
        - {name: petId, in: path, required: true, schema: {type: integer}}
      requestBody:
        content:
          multipart/form-data:
            schema:
              type: object
              required: [file]
              properties:
                caption: {type: string}
                file: {type: string, format: binary}
      responses:
        "204": {description: stored}
components:
  schemas:
    PetId:
      type: integer
      format: int64
    Animal:
      type: object
      required: [name]
      properties:
        name: {type: string}
    Pet:
      allOf:
        - $ref: '#/components/schemas/Animal'
        - type: object
          properties:
            id: {$ref: '#/components/schemas/PetId'}
            tags:
              type: array
              items: {type: string}
            status:
              type: string
              enum: [available, sold-out]
    Shape:
      oneOf:
        - $ref: '#/components/schemas/Circle'
        - $ref: '#/components/schemas/Square'
    Circle:
      type: object
      required: [radius]
      properties:
        radius: {type: number}
    Square:
      type: object
      properties:
        side: {type: number}
        radius: {type: number}
    Level:
      type: integer
      enum: [-1, 0, 1]
    Labels:
      type: object
      additionalProperties:
        type: array
        items: {type: string}
"#;

    fn doc() -> OpenApiDocument {
        parse::from_yaml(DOC).unwrap()
    }

    fn with<R>(f: impl FnOnce(&Converter<'_>, &OpenApiDocument) -> R) -> R {
        let doc = doc();
        let types = TypeMapping::default();
        let naming = NamingOptions::default();
        let converter = Converter::new(RefLookup::new(&doc), &types, &naming);
        f(&converter, &doc)
    }

    fn component<'d>(doc: &'d OpenApiDocument, name: &str) -> &'d Schema {
        doc.components.as_ref().unwrap().schemas[name].as_schema().unwrap()
    }

    #[test]
    fn all_of_first_reference_is_parent() {
        with(|c, doc| {
            let pet = c.from_model("Pet", component(doc, "Pet"));
            assert_eq!(pet.parent.as_deref(), Some("Animal"));
            assert_eq!(pet.all_of, vec!["Animal".to_string()]);
            let own: Vec<_> = pet.vars.iter().map(|v| v.name.as_str()).collect();
            assert_eq!(own, vec!["id", "tags", "status"]);
            assert_eq!(pet.all_vars.len(), 4);
            assert!(pet.parent_vars[0].is_inherited);
            assert!(pet.parent_vars[0].required);
        });
    }

    #[test]
    fn property_types() {
        with(|c, doc| {
            let pet = c.from_model("Pet", component(doc, "Pet"));
            let id = &pet.vars[0];
            assert_eq!(id.data_type, "kotlin.Long");
            let tags = &pet.vars[1];
            assert_eq!(tags.data_type, "kotlin.Array<kotlin.String>");
            assert_eq!(tags.base_type, "kotlin.String");
            assert!(tags.is_container);
            let status = &pet.vars[2];
            assert!(status.is_enum);
            assert_eq!(status.enum_values[1].name, "soldMinusout");
            assert_eq!(status.enum_values[1].value, "sold-out");
        });
    }

    #[test]
    fn one_of_members_contribute_deduplicated_properties() {
        with(|c, doc| {
            let shape = c.from_model("Shape", component(doc, "Shape"));
            assert_eq!(shape.one_of, vec!["Circle".to_string(), "Square".to_string()]);
            let names: Vec<_> = shape.vars.iter().map(|v| v.base_name.as_str()).collect();
            assert_eq!(names, vec!["radius", "side"]);
            assert!(shape.vars[0].required);
            assert_eq!(shape.data_type.as_deref(), Some("kotlin.Any"));
        });
    }

    #[test]
    fn primitive_components() {
        with(|c, doc| {
            let id = c.from_model("PetId", component(doc, "PetId"));
            assert!(id.is_alias);
            assert_eq!(id.data_type.as_deref(), Some("kotlin.Long"));

            let level = c.from_model("Level", component(doc, "Level"));
            assert!(level.is_enum);
            let names: Vec<_> = level.enum_values.iter().map(|e| e.name.as_str()).collect();
            assert_eq!(names, vec!["NUMBERMINUS_1", "NUMBER0", "NUMBER1"]);
        });
    }

    #[test]
    fn map_component_is_container_alias() {
        with(|c, doc| {
            let labels = c.from_model("Labels", component(doc, "Labels"));
            assert!(labels.is_map);
            assert_eq!(
                labels.parent.as_deref(),
                Some("kotlin.collections.Map<kotlin.String, kotlin.Array<kotlin.String>>")
            );
            assert_eq!(labels.property_view_count(), 0);
        });
    }

    #[test]
    fn operation_parameters_and_response() {
        with(|c, doc| {
            let item = &doc.paths["/pets/{petId}"];
            let op = c
                .from_operation("GET", "/pets/{petId}", item.get.as_ref().unwrap(), &item.parameters)
                .unwrap();
            assert_eq!(op.nickname, "getPet");
            let params: Vec<_> = op.all_params.iter().map(|p| (p.param_name.as_str(), p.has_more)).collect();
            assert_eq!(params, vec![("petId", true), ("verbose", false)]);
            assert_eq!(op.all_params[0].data_type, "kotlin.Long");
            assert_eq!(op.return_type.as_deref(), Some("Pet"));
            assert!(!op.has_consumes);
        });
    }

    #[test]
    fn multipart_body_becomes_form_params() {
        with(|c, doc| {
            let item = &doc.paths["/pets/{petId}/photo"];
            let op = c
                .from_operation("POST", "/pets/{petId}/photo", item.post.as_ref().unwrap(), &item.parameters)
                .unwrap();
            assert_eq!(op.operation_id, "createPetsPhoto");
            assert!(op.has_consumes);
            let file = op.all_params.iter().find(|p| p.base_name == "file").unwrap();
            assert_eq!(file.kind, ParameterKind::Form);
            assert_eq!(file.data_format.as_deref(), Some("binary"));
            assert!(file.required);
            assert_eq!(op.return_type, None);
        });
    }
}
