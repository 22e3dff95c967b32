//! Derivation of capability tags from constraints and structural types.
//!
//! Each `*_capabilities` function is pure: it reads one entity and returns
//! the tags it needs. The `apply_*` functions also record the derived
//! fields (display types, constant names, hash seeds) on the entity.

use indexmap::IndexMap;

use crate::config::ShapeOptions;
use crate::error::ResolveError;
use crate::ir::{
    BoundProperty, Capability, CapabilitySet, ComplexTypeBinding, ComplexTypeRef, Constraints,
    HashSeeds, IrModel, IrOperation, IrParameter, IrProperty, IrType, ModelKind,
    ParameterBinding, WrapperExtension,
};

use super::name_normalizer::{constant_name, java_string_hash, normalize_name};

/// Prefix of generated property-name constants.
const PROPERTY_CONSTANT_PREFIX: &str = "PN_";

fn constraint_capabilities(ty: &IrType, constraints: &Constraints, set: &mut CapabilitySet) {
    if constraints.pattern.is_some() {
        set.insert(Capability::PatternValidation);
    }
    if let Some(kind) = ty.numeric_kind() {
        if constraints.minimum.is_some() {
            set.insert(Capability::MinValidation(kind));
        }
        if constraints.maximum.is_some() {
            set.insert(Capability::MaxValidation(kind));
        }
    }
}

fn finish(mut set: CapabilitySet, options: &ShapeOptions) -> CapabilitySet {
    if !options.validation {
        set = set.iter().filter(|c| !c.is_validation()).cloned().collect();
    }
    set
}

/// Tags a model property needs.
pub fn property_capabilities(property: &IrProperty, options: &ShapeOptions) -> CapabilitySet {
    let ty = &property.property_type;
    let mut set = CapabilitySet::default();

    if ty.is_date() {
        set.insert(Capability::DateFormat);
        if options.date_library.omits_time_zone() {
            set.insert(Capability::OmitTimeZone);
        }
    }
    constraint_capabilities(ty, &property.constraints, &mut set);
    if property.required {
        set.insert(Capability::NotNullValidation);
    }
    if property.constraints.has_size() {
        set.insert(Capability::SizeValidation);
    }
    if !ty.is_primitive() && !ty.is_floating() && !ty.is_date() {
        set.insert(Capability::NestedValidation);
    }
    if property.use_offset_date_time {
        set.insert(Capability::OffsetDateTime);
    }

    finish(set, options)
}

/// Tags a parameter needs, before any binding is resolved.
pub fn parameter_capabilities(param: &IrParameter, options: &ShapeOptions) -> CapabilitySet {
    let mut set = CapabilitySet::default();

    if param.is_enum() || !param.item_enum_values.is_empty() {
        set.insert(Capability::EnumSerialization);
    }
    constraint_capabilities(&param.param_type, &param.constraints, &mut set);
    if param.required && !param.is_body() {
        set.insert(Capability::NotNullValidation);
    }
    if param.constraints.has_size() {
        set.insert(Capability::SizeValidation);
    }
    if param.is_body() {
        set.insert(Capability::NestedValidation);
        set.insert(Capability::NotNullValidation);
    }

    finish(set, options)
}

/// Stable odd seeds for generated equality and hash support, derived from
/// the model name and its file name.
pub fn hash_seeds(model: &IrModel) -> HashSeeds {
    let seed = |text: &str, modulus: i32| (java_string_hash(text) % modulus).unsigned_abs() * 2 + 1;
    HashSeeds {
        initial: seed(&model.name.original, 57),
        multiplier: seed(&model.name.pascal_case, 61),
    }
}

/// Whether values of `ty` are model instances that need a deep copy.
fn cloneable(ty: &IrType, models: &IndexMap<String, IrModel>) -> bool {
    match ty {
        IrType::Ref(name) => models.get(name.as_str()).is_some_and(|m| !m.is_enum()),
        _ => false,
    }
}

/// Derive a property's tags, constant name and cloneability. `x-use-offset-date-time`
/// swaps the type after the date tags are derived.
pub fn apply_property(
    property: &mut IrProperty,
    models: &IndexMap<String, IrModel>,
    options: &ShapeOptions,
) {
    property.capabilities = property_capabilities(property, options);
    if property.use_offset_date_time {
        property.property_type = IrType::OffsetDateTime;
    }
    property.constant_name = format!(
        "{PROPERTY_CONSTANT_PREFIX}{}",
        constant_name(&property.name.camel_case)
    );
    property.cloneable = !property.is_enum() && cloneable(&property.property_type, models);
    property.items_cloneable = property
        .property_type
        .items()
        .map(|items| cloneable(items, models));
}

/// Derive a model's tags and support data. Alias models are rendered as
/// their primitive and get nothing.
pub fn apply_model(model: &mut IrModel, models: &IndexMap<String, IrModel>, options: &ShapeOptions) {
    let mut set = CapabilitySet::default();

    match (&model.kind, &model.wrapper) {
        (ModelKind::Primitive { .. }, Some(WrapperExtension::Enumeration)) => {
            set.insert(Capability::EnumCreator);
            set.insert(Capability::EnumSerialization);
            model.is_alias = false;
        }
        (ModelKind::Enum { .. }, _) => {
            set.insert(Capability::EnumSerialization);
        }
        _ if model.is_alias => {}
        _ => {
            set.insert(Capability::PropertyBinding(options.serialization()));
            if model.properties.iter().any(IrProperty::is_enum) {
                set.insert(Capability::EnumSerialization);
            }
            set.insert(Capability::ValueObjectSupport);
            model.hash_seeds = Some(hash_seeds(model));
            for property in &mut model.properties {
                apply_property(property, models, options);
            }
            model.simple = model.properties.len() == 1;
        }
    }

    if options.serializable_model && !model.is_alias {
        set.insert(Capability::Serializable);
    }
    for property in &model.properties {
        set.union_with(&property.capabilities);
    }
    model.capabilities = set;
}

fn referenced_property_type(
    reference: &str,
    property: &str,
    models: &IndexMap<String, IrModel>,
) -> Result<IrType, ResolveError> {
    let model = models
        .get(reference)
        .ok_or_else(|| ResolveError::UnknownModel(reference.to_string()))?;
    model
        .property(property)
        .map(|p| p.property_type.clone())
        .ok_or_else(|| ResolveError::UnknownProperty {
            model: reference.to_string(),
            property: property.to_string(),
        })
}

/// Resolve every property named by an `x-complex-type` declaration against
/// the model dictionary.
pub fn resolve_complex_type(
    complex: &ComplexTypeRef,
    models: &IndexMap<String, IrModel>,
) -> Result<ComplexTypeBinding, ResolveError> {
    let properties = complex
        .properties
        .iter()
        .map(|(key, property)| {
            Ok(BoundProperty {
                key: key.clone(),
                property: normalize_name(property),
                property_type: referenced_property_type(&complex.reference, property, models)?,
            })
        })
        .collect::<Result<Vec<_>, ResolveError>>()?;

    Ok(ComplexTypeBinding {
        reference: complex.reference.clone(),
        base_property: normalize_name(&complex.base_property),
        base_property_type: referenced_property_type(
            &complex.reference,
            &complex.base_property,
            models,
        )?,
        properties,
    })
}

/// Derive a parameter's tags and resolve its binding. Returns whether the
/// parameter is a matrix parameter.
pub fn apply_parameter(
    param: &mut IrParameter,
    models: &IndexMap<String, IrModel>,
    options: &ShapeOptions,
) -> Result<bool, ResolveError> {
    let mut set = parameter_capabilities(param, options);
    let mut matrix = false;

    match &param.binding {
        ParameterBinding::None => {}
        ParameterBinding::EnumReference { target, on_items } => {
            let target_type = IrType::Ref(target.clone());
            param.display_type = Some(if *on_items {
                IrType::Array(Box::new(target_type))
            } else {
                target_type
            });
            param.enum_name = Some(target.clone());
            set.insert(Capability::ModelReference(target.clone()));
        }
        ParameterBinding::ComplexType(complex) => {
            let binding = resolve_complex_type(complex, models)?;
            set.insert(Capability::MatrixParameter);
            set.insert(Capability::ModelReference(binding.reference.clone()));
            param.complex_type = Some(binding);
            matrix = true;
        }
    }

    param.capabilities = set;
    Ok(matrix)
}

/// Tags an operation needs on its own, excluding those of its parameters.
pub fn operation_capabilities(op: &IrOperation, options: &ShapeOptions) -> CapabilitySet {
    let mut set = CapabilitySet::default();
    if options.library.needs_http_method() {
        set.insert(Capability::HttpMethod(op.method));
    }
    set
}

/// Derive parameter and operation tags. Parameter tags are unioned into the
/// operation. Returns whether any parameter is a matrix parameter.
pub fn apply_operation(
    op: &mut IrOperation,
    models: &IndexMap<String, IrModel>,
    options: &ShapeOptions,
) -> Result<bool, ResolveError> {
    let mut set = operation_capabilities(op, options);
    let mut matrix = false;
    for param in &mut op.parameters {
        matrix |= apply_parameter(param, models, options)?;
        set.union_with(&param.capabilities);
    }
    op.capabilities = set;
    Ok(matrix)
}
