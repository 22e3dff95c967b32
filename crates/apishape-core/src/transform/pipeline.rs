use indexmap::IndexMap;
use serde::Serialize;

use crate::config::{Diagnostic, GeneratorSettings, MediaTypeStrategy, ShapeOptions};
use crate::error::TransformError;
use crate::ir::grouping::group_operations;
use crate::ir::{IrInfo, IrModel, IrOperation, IrSpec, MediaTypeEntry, OperationGroup};
use crate::parse::spec::OpenApiSpec;

use super::aliases::resolve_aliases;
use super::capabilities::{apply_model, apply_operation};
use super::media_types::{is_multipart, prioritize_entries};
use super::name_normalizer::{capitalize, short_app_name};
use super::spec_to_ir::{TransformOptions, transform_with_options};

/// The shaped API description handed to renderers.
#[derive(Debug, Clone, Serialize)]
pub struct ShapedApi {
    pub info: IrInfo,
    pub short_app_name: String,
    pub options: ShapeOptions,
    pub models: IndexMap<String, IrModel>,
    pub operations: Vec<IrOperation>,
    pub groups: IndexMap<String, OperationGroup>,
    /// Whether any operation takes an `x-complex-type` matrix parameter.
    pub matrix_parameters: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

impl ShapedApi {
    /// Operations of a group, in group order.
    pub fn group_operations<'a>(
        &'a self,
        group: &'a OperationGroup,
    ) -> impl Iterator<Item = &'a IrOperation> + 'a {
        group
            .operation_indices
            .iter()
            .filter_map(|&i| self.operations.get(i))
    }
}

/// Run every post-processing pass over a lowered description.
///
/// Aliases are resolved first so that capability derivation sees the
/// unwrapped types. Grouping runs last.
pub fn shape(mut ir: IrSpec, options: &ShapeOptions) -> Result<ShapedApi, TransformError> {
    // Phase 1: Alias models
    resolve_aliases(&mut ir)?;
    let IrSpec {
        info,
        mut models,
        mut operations,
    } = ir;

    // Phase 2: Models. Lookups read the dictionary as it was after alias
    // resolution.
    let snapshot = models.clone();
    for model in models.values_mut() {
        apply_model(model, &snapshot, options);
    }

    // Phase 3: Operations
    let mut matrix_parameters = false;
    for op in &mut operations {
        shape_consumes(op, options.media_types);
        matrix_parameters |= apply_operation(op, &models, options)?;
        if options.library.strips_leading_slash()
            && let Some(stripped) = op.path.strip_prefix('/')
        {
            op.path = stripped.to_string();
        }
    }

    // Phase 4: Grouping
    let short_app_name = short_app_name(
        options.service_name.as_deref(),
        info.short_name.as_deref(),
        &info.title,
    );
    let groups = group_operations(&mut operations, options.grouping, &capitalize(&short_app_name));

    log::debug!(
        "shaped {} operations into {} groups",
        operations.len(),
        groups.len()
    );

    Ok(ShapedApi {
        info,
        short_app_name,
        options: options.clone(),
        models,
        operations,
        groups,
        matrix_parameters,
        diagnostics: Vec::new(),
    })
}

fn shape_consumes(op: &mut IrOperation, strategy: MediaTypeStrategy) {
    op.is_multipart = is_multipart(&op.consumes);
    op.prioritized_consumes = if op.is_multipart || strategy == MediaTypeStrategy::Declared {
        MediaTypeEntry::sequence(&op.consumes)
    } else {
        prioritize_entries(&op.consumes)
    };
}

/// Resolve `settings`, lower `spec` and shape it. Configuration diagnostics
/// are carried on the result.
pub fn shape_document(
    spec: &OpenApiSpec,
    settings: &GeneratorSettings,
) -> Result<ShapedApi, TransformError> {
    let (options, diagnostics) = settings.resolve();
    let ir = transform_with_options(spec, &TransformOptions::from(&options))?;
    let mut shaped = shape(ir, &options)?;
    shaped.diagnostics = diagnostics;
    Ok(shaped)
}
