use indexmap::IndexMap;

use crate::ir::{Constraints, IrModel, IrProperty, IrType, ModelKind, WrapperExtension};
use crate::parse::schema::{AdditionalProperties, Schema, SchemaOrRef, SchemaType, TypeSet};
use crate::parse::{Extensions, extension, extension_str};

use super::name_normalizer::normalize_name;

/// Nested `allOf` references are followed at most this deep.
const MAX_ALL_OF_DEPTH: usize = 8;

/// Convert a parsed `SchemaOrRef` to an `IrType`.
pub fn schema_or_ref_to_ir_type(schema_or_ref: &SchemaOrRef) -> IrType {
    match schema_or_ref {
        SchemaOrRef::Ref { ref_path } => IrType::Ref(ref_target(ref_path).to_string()),
        SchemaOrRef::Schema(schema) => schema_to_ir_type(schema),
    }
}

/// Convert a parsed `Schema` to an `IrType`. Inline objects and unions have
/// no structural representation and become `Any`.
pub fn schema_to_ir_type(schema: &Schema) -> IrType {
    if let [single] = schema.all_of.as_slice() {
        return schema_or_ref_to_ir_type(single);
    }
    if !schema.all_of.is_empty() || !schema.one_of.is_empty() || !schema.any_of.is_empty() {
        return IrType::Any;
    }

    let primary = schema.schema_type.as_ref().and_then(|t| t.primary().0);
    match primary {
        Some(SchemaType::String) => match schema.format.as_deref() {
            Some("date") => IrType::Date,
            Some("date-time") => IrType::DateTime,
            Some("binary" | "byte") => IrType::Binary,
            _ => IrType::String,
        },
        Some(SchemaType::Integer) => match schema.format.as_deref() {
            Some("int64") => IrType::Long,
            _ => IrType::Integer,
        },
        Some(SchemaType::Number) => match schema.format.as_deref() {
            Some("float") => IrType::Float,
            Some("double") => IrType::Double,
            _ => IrType::Decimal,
        },
        Some(SchemaType::Boolean) => IrType::Boolean,
        Some(SchemaType::Array) => array_type(schema),
        Some(SchemaType::Object) => object_type(schema),
        Some(SchemaType::Null) => IrType::Any,
        None if schema.items.is_some() => array_type(schema),
        None if schema.additional_properties.is_some() => object_type(schema),
        None => IrType::Any,
    }
}

fn array_type(schema: &Schema) -> IrType {
    match &schema.items {
        Some(items) => IrType::Array(Box::new(schema_or_ref_to_ir_type(items))),
        None => IrType::Array(Box::new(IrType::Any)),
    }
}

fn object_type(schema: &Schema) -> IrType {
    if !schema.properties.is_empty() {
        return IrType::Any;
    }
    match &schema.additional_properties {
        Some(AdditionalProperties::Schema(s)) => IrType::Map(Box::new(schema_or_ref_to_ir_type(s))),
        Some(AdditionalProperties::Bool(true)) => IrType::Map(Box::new(IrType::Any)),
        Some(AdditionalProperties::Bool(false)) | None => IrType::Any,
    }
}

/// The model key a schema reference points at.
pub fn ref_target(ref_path: &str) -> &str {
    ref_path.rsplit('/').next().unwrap_or(ref_path)
}

/// Validation constraints declared on a schema.
pub fn constraints_of(schema: &Schema) -> Constraints {
    Constraints {
        minimum: schema.minimum,
        maximum: schema.maximum,
        min_length: schema.min_length,
        max_length: schema.max_length,
        min_items: schema.min_items,
        max_items: schema.max_items,
        pattern: schema.pattern.clone(),
    }
}

/// Enum values as strings. Non-string literals keep their JSON spelling.
pub fn enum_strings(values: &[serde_json::Value]) -> Vec<String> {
    values
        .iter()
        .map(|v| match v {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect()
}

/// Whether a flag-style extension is set. Presence counts unless the value
/// is literally `false`.
pub fn extension_flag(extensions: &Extensions, key: &str) -> bool {
    extension(extensions, key).is_some_and(|v| v.as_bool() != Some(false))
}

/// The "already wrapped" marker on a schema, if any.
pub fn wrapper_extension(extensions: &Extensions) -> Option<WrapperExtension> {
    if extension(extensions, "x-enumeration").is_some() {
        return Some(WrapperExtension::Enumeration);
    }
    if let Some(target) = extension_str(extensions, "x-ref") {
        return Some(WrapperExtension::Reference(target.to_string()));
    }
    if extension(extensions, "x-complexType").is_some() {
        return Some(WrapperExtension::ComplexType);
    }
    None
}

/// Convert a named component schema to an `IrModel`. `schemas` is the full
/// component dictionary, used to merge `allOf` parents.
pub fn schema_or_ref_to_ir_model(
    name: &str,
    schema_or_ref: &SchemaOrRef,
    schemas: &IndexMap<String, SchemaOrRef>,
) -> IrModel {
    match schema_or_ref {
        SchemaOrRef::Ref { ref_path } => IrModel::new(
            normalize_name(name),
            ModelKind::Primitive {
                target: IrType::Ref(ref_target(ref_path).to_string()),
            },
        ),
        SchemaOrRef::Schema(schema) => schema_to_ir_model(name, schema, schemas),
    }
}

/// Convert a named `Schema` to an `IrModel`.
pub fn schema_to_ir_model(
    name: &str,
    schema: &Schema,
    schemas: &IndexMap<String, SchemaOrRef>,
) -> IrModel {
    let wrapper = wrapper_extension(&schema.extensions);
    let is_object = !schema.properties.is_empty()
        || !schema.all_of.is_empty()
        || (matches!(
            schema.schema_type,
            Some(TypeSet::Single(SchemaType::Object))
        ) && schema.additional_properties.is_none());

    let kind = if is_object && wrapper != Some(WrapperExtension::Enumeration) {
        ModelKind::Object
    } else if !schema.enum_values.is_empty() && wrapper.is_none() {
        ModelKind::Enum {
            base: schema_to_ir_type(schema),
            variants: enum_strings(&schema.enum_values),
        }
    } else {
        match schema_to_ir_type(schema) {
            IrType::Array(items) if wrapper.is_none() => ModelKind::Array { items: *items },
            IrType::Map(values) if wrapper.is_none() => ModelKind::Map { values: *values },
            target => ModelKind::Primitive { target },
        }
    };

    let mut model = IrModel::new(normalize_name(name), kind);
    model.description = schema.description.clone();
    model.wrapper = wrapper;

    if model.kind == ModelKind::Object {
        let mut properties = IndexMap::new();
        let mut required = Vec::new();
        collect_all_of(&schema.all_of, schemas, 0, &mut properties, &mut required);
        for (prop_name, prop) in &schema.properties {
            properties.insert(prop_name.clone(), prop.clone());
        }
        required.extend(schema.required.iter().cloned());
        model.properties = build_properties(&properties, &required);
    }
    model
}

fn collect_all_of(
    all_of: &[SchemaOrRef],
    schemas: &IndexMap<String, SchemaOrRef>,
    depth: usize,
    properties: &mut IndexMap<String, SchemaOrRef>,
    required: &mut Vec<String>,
) {
    if depth > MAX_ALL_OF_DEPTH {
        log::warn!("allOf nesting deeper than {MAX_ALL_OF_DEPTH} levels, ignoring the rest");
        return;
    }
    for part in all_of {
        let schema = match part {
            SchemaOrRef::Schema(schema) => &**schema,
            SchemaOrRef::Ref { ref_path } => {
                match schemas.get(ref_target(ref_path)).and_then(SchemaOrRef::as_schema) {
                    Some(schema) => schema,
                    None => continue,
                }
            }
        };
        collect_all_of(&schema.all_of, schemas, depth + 1, properties, required);
        for (name, prop) in &schema.properties {
            properties.insert(name.clone(), prop.clone());
        }
        required.extend(schema.required.iter().cloned());
    }
}

fn build_properties(
    properties: &IndexMap<String, SchemaOrRef>,
    required: &[String],
) -> Vec<IrProperty> {
    properties
        .iter()
        .map(|(name, prop)| {
            let mut property =
                IrProperty::new(normalize_name(name), name, schema_or_ref_to_ir_type(prop));
            property.required = required.contains(name);
            if let SchemaOrRef::Schema(s) = prop {
                property.description = s.description.clone();
                property.nullable = s.nullable.unwrap_or(false)
                    || s.schema_type.as_ref().is_some_and(|t| t.primary().1);
                property.constraints = constraints_of(s);
                property.enum_values = enum_strings(&s.enum_values);
                property.use_offset_date_time =
                    extension_flag(&s.extensions, "x-use-offset-date-time");
            }
            property
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(yaml: &str) -> Schema {
        serde_yaml_ng::from_str(yaml).unwrap()
    }

    #[test]
    fn test_numeric_formats() {
        assert_eq!(schema_to_ir_type(&schema("type: integer")), IrType::Integer);
        assert_eq!(
            schema_to_ir_type(&schema("{type: integer, format: int64}")),
            IrType::Long
        );
        assert_eq!(schema_to_ir_type(&schema("type: number")), IrType::Decimal);
        assert_eq!(
            schema_to_ir_type(&schema("{type: number, format: float}")),
            IrType::Float
        );
        assert_eq!(
            schema_to_ir_type(&schema("{type: [string, 'null'], format: date}")),
            IrType::Date
        );
    }

    #[test]
    fn test_containers() {
        let t = schema_to_ir_type(&schema(
            "{type: array, items: {$ref: '#/components/schemas/Pet'}}",
        ));
        assert_eq!(t, IrType::Array(Box::new(IrType::Ref("Pet".into()))));
        let t = schema_to_ir_type(&schema(
            "{type: object, additionalProperties: {type: integer}}",
        ));
        assert_eq!(t, IrType::Map(Box::new(IrType::Integer)));
    }

    #[test]
    fn test_model_kinds() {
        let schemas = IndexMap::new();
        let alias = schema_to_ir_model("Score", &schema("type: integer"), &schemas);
        assert_eq!(alias.alias_target(), Some(&IrType::Integer));

        let wrapped = schema_to_ir_model(
            "Currency",
            &schema("{type: string, x-enumeration: true}"),
            &schemas,
        );
        assert_eq!(wrapped.wrapper, Some(WrapperExtension::Enumeration));
        assert_eq!(wrapped.alias_target(), None);

        let color = schema_to_ir_model("Color", &schema("{type: string, enum: [red, green]}"), &schemas);
        assert!(color.is_enum());
    }

    #[test]
    fn test_container_models() {
        let schemas = IndexMap::new();
        let pets = schema_to_ir_model(
            "Pets",
            &schema("{type: array, items: {$ref: '#/components/schemas/Pet'}}"),
            &schemas,
        );
        assert_eq!(
            pets.kind,
            ModelKind::Array {
                items: IrType::Ref("Pet".into())
            }
        );
        assert_eq!(pets.alias_target(), None);

        let labels = schema_to_ir_model(
            "Labels",
            &schema("{type: object, additionalProperties: {type: string}}"),
            &schemas,
        );
        assert_eq!(labels.kind, ModelKind::Map { values: IrType::String });

        let day = schema_to_ir_model("Day", &schema("{type: string, format: date}"), &schemas);
        assert_eq!(day.kind, ModelKind::Primitive { target: IrType::Date });
        assert_eq!(day.alias_target(), None);
    }

    #[test]
    fn test_all_of_merges_parent_properties() {
        let mut schemas = IndexMap::new();
        schemas.insert(
            "Base".to_string(),
            SchemaOrRef::Schema(Box::new(schema(
                "{type: object, required: [id], properties: {id: {type: integer}}}",
            ))),
        );
        let model = schema_to_ir_model(
            "Dog",
            &schema(
                "{allOf: [{$ref: '#/components/schemas/Base'}, {properties: {bark: {type: boolean}}}]}",
            ),
            &schemas,
        );
        assert_eq!(model.kind, ModelKind::Object);
        let names: Vec<_> = model.properties.iter().map(|p| p.original_name.as_str()).collect();
        assert_eq!(names, vec!["id", "bark"]);
        assert!(model.property("id").unwrap().required);
    }

    #[test]
    fn test_property_details() {
        let model = schema_to_ir_model(
            "Event",
            &schema(
                r#"
type: object
required: [name]
properties:
  name: {type: string, minLength: 1, pattern: "^[a-z]+$"}
  at: {type: string, format: date-time, x-use-offset-date-time: true}
"#,
            ),
            &IndexMap::new(),
        );
        let name = model.property("name").unwrap();
        assert!(name.required);
        assert!(name.constraints.has_size());
        assert_eq!(name.constraints.pattern.as_deref(), Some("^[a-z]+$"));
        assert!(model.property("at").unwrap().use_offset_date_time);
    }
}
