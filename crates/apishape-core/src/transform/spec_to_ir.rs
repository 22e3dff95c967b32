use std::collections::HashSet;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::config::{NamingStrategy, ShapeOptions};
use crate::error::TransformError;
use crate::ir::*;
use crate::parse::content::{RequestBody, RequestBodyOrRef, ResponseOrRef};
use crate::parse::operation::{Operation, PathItem};
use crate::parse::parameter::{Parameter, ParameterLocation, ParameterOrRef};
use crate::parse::ref_resolve::RefResolver;
use crate::parse::schema::{Schema, SchemaOrRef};
use crate::parse::spec::OpenApiSpec;
use crate::parse::{extension, extension_str};

use super::name_normalizer::{normalize_name, route_to_name};
use super::schema_resolver::{
    constraints_of, enum_strings, schema_or_ref_to_ir_model, schema_or_ref_to_ir_type,
};

const DEFAULT_BODY_NAME: &str = "body";

/// Options controlling how the transform phase resolves operation names.
#[derive(Debug, Clone, Default)]
pub struct TransformOptions {
    pub naming_strategy: NamingStrategy,
    pub aliases: IndexMap<String, String>,
}

impl From<&ShapeOptions> for TransformOptions {
    fn from(options: &ShapeOptions) -> Self {
        Self {
            naming_strategy: options.naming,
            aliases: options.aliases.clone(),
        }
    }
}

/// Transform a parsed OpenAPI spec into the fully resolved IR.
pub fn transform(spec: &OpenApiSpec) -> Result<IrSpec, TransformError> {
    transform_with_options(spec, &TransformOptions::default())
}

/// Transform with explicit naming options.
pub fn transform_with_options(
    spec: &OpenApiSpec,
    options: &TransformOptions,
) -> Result<IrSpec, TransformError> {
    // Phase 1: Inline parameter, request body and response references
    let resolver = RefResolver::new(spec);
    let resolved = resolver.resolve_spec(spec)?;

    // Phase 2: Convert component schemas to models
    let models = resolve_models(&resolved);

    // Phase 3: Convert operations
    let operations = resolve_operations(&resolved, options)?;

    let info = IrInfo {
        title: resolved.info.title.clone(),
        description: resolved.info.description.clone(),
        version: resolved.info.version.clone(),
        short_name: extension_str(&resolved.info.extensions, "x-short-name").map(str::to_string),
    };

    log::debug!(
        "lowered {} models and {} operations",
        models.len(),
        operations.len()
    );

    Ok(IrSpec {
        info,
        models,
        operations,
    })
}

fn resolve_models(spec: &OpenApiSpec) -> IndexMap<String, IrModel> {
    let mut models = IndexMap::new();
    if let Some(ref components) = spec.components {
        for (name, schema_or_ref) in &components.schemas {
            let model = schema_or_ref_to_ir_model(name, schema_or_ref, &components.schemas);
            models.insert(name.clone(), model);
        }
    }
    models
}

fn resolve_operations(
    spec: &OpenApiSpec,
    options: &TransformOptions,
) -> Result<Vec<IrOperation>, TransformError> {
    let mut operations = Vec::new();
    let mut seen_ids = HashSet::new();

    for (path, path_item) in &spec.paths {
        collect_operations(path, path_item, options, &mut operations);
    }

    for op in &operations {
        if !seen_ids.insert(op.operation_id.as_str()) {
            return Err(TransformError::DuplicateOperationId {
                id: op.operation_id.clone(),
                method: op.method.to_string(),
                path: op.path.clone(),
            });
        }
    }

    Ok(operations)
}

fn collect_operations(
    path: &str,
    item: &PathItem,
    options: &TransformOptions,
    out: &mut Vec<IrOperation>,
) {
    macro_rules! add_op {
        ($method:expr, $op:expr) => {
            if let Some(ref op) = $op {
                out.push(build_operation($method, path, op, &item.parameters, options));
            }
        };
    }

    add_op!(HttpMethod::Get, item.get);
    add_op!(HttpMethod::Post, item.post);
    add_op!(HttpMethod::Put, item.put);
    add_op!(HttpMethod::Delete, item.delete);
    add_op!(HttpMethod::Patch, item.patch);
    add_op!(HttpMethod::Options, item.options);
    add_op!(HttpMethod::Head, item.head);
    add_op!(HttpMethod::Trace, item.trace);
}

fn build_operation(
    method: HttpMethod,
    path: &str,
    op: &Operation,
    path_params: &[ParameterOrRef],
    options: &TransformOptions,
) -> IrOperation {
    let raw_name = match options.naming_strategy {
        NamingStrategy::Auto => op
            .operation_id
            .clone()
            .unwrap_or_else(|| route_to_name(method.as_str(), path)),
        NamingStrategy::Path => route_to_name(method.as_str(), path),
    };

    // Apply aliases: if the raw name matches an alias key, use the alias value
    let name = options.aliases.get(&raw_name).unwrap_or(&raw_name);

    let mut ir_op = IrOperation::new(raw_name.clone(), normalize_name(name), method, path);
    ir_op.summary = op.summary.clone();
    ir_op.description = op.description.clone();
    ir_op.tags = op.tags.clone();
    ir_op.client_group = extension_str(&op.extensions, "x-client-group").map(str::to_string);
    ir_op.deprecated = op.deprecated.unwrap_or(false);
    ir_op.parameters = merge_parameters(path_params, &op.parameters);

    if let Some(RequestBodyOrRef::RequestBody(body)) = &op.request_body {
        ir_op.consumes = body.content.keys().cloned().collect();
        let body_name =
            extension_str(&op.extensions, "x-codegen-request-body-name").unwrap_or(DEFAULT_BODY_NAME);
        ir_op.parameters.push(body_parameter(body_name, body));
    }

    for (status, response) in &op.responses {
        let ResponseOrRef::Response(response) = response else {
            continue;
        };
        for media_type in response.content.keys() {
            if !ir_op.produces.contains(media_type) {
                ir_op.produces.push(media_type.clone());
            }
        }
        let response_type = response.schema().map(schema_or_ref_to_ir_type);
        ir_op.responses.push(IrResponse {
            status: status.clone(),
            description: response.description.clone(),
            response_type,
        });
    }
    ir_op.return_type = success_response(&ir_op.responses).and_then(|r| r.response_type.clone());
    ir_op
}

/// The lowest 2xx response, falling back to `default`.
fn success_response(responses: &[IrResponse]) -> Option<&IrResponse> {
    responses
        .iter()
        .filter(|r| r.status.starts_with('2'))
        .min_by(|a, b| a.status.cmp(&b.status))
        .or_else(|| responses.iter().find(|r| r.status == "default"))
}

/// Path-level parameters followed by operation parameters. An operation
/// parameter replaces a path-level one with the same name and location.
fn merge_parameters(
    path_params: &[ParameterOrRef],
    op_params: &[ParameterOrRef],
) -> Vec<IrParameter> {
    let mut merged: Vec<IrParameter> = Vec::new();
    for param in path_params.iter().chain(op_params) {
        let ParameterOrRef::Parameter(param) = param else {
            continue; // Already resolved
        };
        let lowered = lower_parameter(param);
        match merged.iter_mut().find(|p| {
            p.original_name == lowered.original_name && p.location == lowered.location
        }) {
            Some(existing) => *existing = lowered,
            None => merged.push(lowered),
        }
    }
    merged
}

fn lower_parameter(param: &Parameter) -> IrParameter {
    let location = match param.location {
        ParameterLocation::Path => IrParameterLocation::Path,
        ParameterLocation::Query => IrParameterLocation::Query,
        ParameterLocation::Header => IrParameterLocation::Header,
        ParameterLocation::Cookie => IrParameterLocation::Cookie,
    };
    let param_type = param
        .schema
        .as_ref()
        .map(schema_or_ref_to_ir_type)
        .unwrap_or(IrType::Any);

    let mut ir_param = IrParameter::new(normalize_name(&param.name), &param.name, location, param_type);
    ir_param.required = param.required || location == IrParameterLocation::Path;
    ir_param.description = param.description.clone();

    let schema = param.schema.as_ref().and_then(SchemaOrRef::as_schema);
    let items = schema
        .and_then(|s| s.items.as_deref())
        .and_then(SchemaOrRef::as_schema);
    if let Some(schema) = schema {
        ir_param.constraints = constraints_of(schema);
        ir_param.enum_values = enum_strings(&schema.enum_values);
    }
    if let Some(items) = items {
        ir_param.item_enum_values = enum_strings(&items.enum_values);
    }
    ir_param.binding = parameter_binding(param, schema, items);
    ir_param
}

/// The `x-complex-type` declaration as written.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawComplexType {
    #[serde(rename = "ref")]
    reference: String,
    base_property: String,
    #[serde(default)]
    properties: IndexMap<String, String>,
}

fn parameter_binding(
    param: &Parameter,
    schema: Option<&Schema>,
    items: Option<&Schema>,
) -> ParameterBinding {
    if let Some(value) = extension(&param.extensions, "x-complex-type") {
        match serde_json::from_value::<RawComplexType>(value.clone()) {
            Ok(raw) => {
                return ParameterBinding::ComplexType(ComplexTypeRef {
                    reference: raw.reference,
                    base_property: raw.base_property,
                    properties: raw.properties,
                });
            }
            Err(e) => log::warn!("ignoring malformed x-complex-type on '{}': {e}", param.name),
        }
    }

    let enum_reference = extension_str(&param.extensions, "x-ref")
        .or_else(|| schema.and_then(|s| extension_str(&s.extensions, "x-ref")));
    if let (Some(target), Some(schema)) = (enum_reference, schema)
        && !schema.enum_values.is_empty()
    {
        return ParameterBinding::EnumReference {
            target: target.to_string(),
            on_items: false,
        };
    }

    if let Some(items) = items
        && !items.enum_values.is_empty()
        && let Some(target) = extension_str(&items.extensions, "x-ref")
    {
        return ParameterBinding::EnumReference {
            target: target.to_string(),
            on_items: true,
        };
    }

    ParameterBinding::None
}

fn body_parameter(name: &str, body: &RequestBody) -> IrParameter {
    let schema_or_ref = body.schema();
    let param_type = schema_or_ref
        .map(schema_or_ref_to_ir_type)
        .unwrap_or(IrType::Any);

    let mut param = IrParameter::new(normalize_name(name), name, IrParameterLocation::Body, param_type);
    param.required = body.required;
    param.description = body.description.clone();
    if let Some(schema) = schema_or_ref.and_then(SchemaOrRef::as_schema) {
        param.constraints = constraints_of(schema);
    }
    param
}
