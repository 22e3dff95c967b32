use indexmap::IndexMap;

use crate::error::ResolveError;
use crate::ir::{IrModel, IrSpec, IrType};

/// Models that stand for a bare primitive and may be replaced by it,
/// keyed like `IrSpec::models`.
pub fn alias_table(models: &IndexMap<String, IrModel>) -> IndexMap<String, IrType> {
    models
        .iter()
        .filter_map(|(key, model)| {
            model
                .alias_target()
                .map(|target| (key.clone(), target.clone()))
        })
        .collect()
}

/// Replace references to alias models inside `ty`, looking through arrays
/// and maps. Only one level is dereferenced: an alias is only replaced by
/// its own primitive target. Returns whether anything was replaced.
pub fn unwrap_aliases(
    ty: &mut IrType,
    models: &IndexMap<String, IrModel>,
    aliases: &IndexMap<String, IrType>,
) -> Result<bool, ResolveError> {
    match ty {
        IrType::Ref(name) => {
            if !models.contains_key(name.as_str()) {
                return Err(ResolveError::UnknownModel(name.clone()));
            }
            match aliases.get(name.as_str()) {
                Some(target) => {
                    *ty = target.clone();
                    Ok(true)
                }
                None => Ok(false),
            }
        }
        IrType::Array(inner) | IrType::Map(inner) => unwrap_aliases(inner, models, aliases),
        _ => Ok(false),
    }
}

/// Mark alias models and substitute their primitive wherever they are used:
/// return and response types, parameter types and property types. Runs
/// before any capability is derived.
pub fn resolve_aliases(ir: &mut IrSpec) -> Result<(), ResolveError> {
    let aliases = alias_table(&ir.models);

    for model in ir.models.values_mut() {
        model.is_alias = model.alias_target().is_some();
    }

    // Property types are rewritten on a copy so lookups see the original
    // dictionary.
    let models = ir.models.clone();
    for model in ir.models.values_mut() {
        for property in &mut model.properties {
            unwrap_aliases(&mut property.property_type, &models, &aliases)?;
        }
    }

    for op in &mut ir.operations {
        if let Some(return_type) = op.return_type.as_mut()
            && unwrap_aliases(return_type, &models, &aliases)?
        {
            op.return_type_is_primitive = return_type.is_unwrappable_primitive();
        }
        for response in &mut op.responses {
            if let Some(response_type) = response.response_type.as_mut() {
                unwrap_aliases(response_type, &models, &aliases)?;
            }
        }
        for param in &mut op.parameters {
            unwrap_aliases(&mut param.param_type, &models, &aliases)?;
        }
    }

    log::debug!("resolved {} alias models", aliases.len());
    Ok(())
}
