use indexmap::IndexMap;

use super::content::{RequestBody, RequestBodyOrRef, Response, ResponseOrRef};
use super::operation::{Operation, PathItem};
use super::parameter::{Parameter, ParameterOrRef};
use super::spec::{Components, OpenApiSpec};
use crate::error::ResolveError;

/// Inlines `$ref` pointers to reusable parameters, request bodies and
/// responses. Schema references are left untouched: they name models, and
/// the transform needs the names to resolve aliases and bindings.
pub struct RefResolver<'a> {
    components: Option<&'a Components>,
}

impl<'a> RefResolver<'a> {
    pub fn new(spec: &'a OpenApiSpec) -> Self {
        Self {
            components: spec.components.as_ref(),
        }
    }

    /// Resolve the whole spec, returning a copy with no parameter, request
    /// body or response references.
    pub fn resolve_spec(&self, spec: &OpenApiSpec) -> Result<OpenApiSpec, ResolveError> {
        let mut resolved = spec.clone();
        for item in resolved.paths.values_mut() {
            self.resolve_path_item(item)?;
        }
        Ok(resolved)
    }

    fn resolve_path_item(&self, item: &mut PathItem) -> Result<(), ResolveError> {
        item.parameters = self.resolve_parameters(&item.parameters)?;

        macro_rules! resolve_op {
            ($op:expr) => {
                if let Some(ref mut op) = $op {
                    self.resolve_operation(op)?;
                }
            };
        }
        resolve_op!(item.get);
        resolve_op!(item.post);
        resolve_op!(item.put);
        resolve_op!(item.delete);
        resolve_op!(item.patch);
        resolve_op!(item.options);
        resolve_op!(item.head);
        resolve_op!(item.trace);
        Ok(())
    }

    fn resolve_operation(&self, op: &mut Operation) -> Result<(), ResolveError> {
        op.parameters = self.resolve_parameters(&op.parameters)?;

        if let Some(RequestBodyOrRef::Ref { ref_path }) = &op.request_body {
            let body = self.lookup_request_body(ref_path)?;
            op.request_body = Some(RequestBodyOrRef::RequestBody(body));
        }

        let mut resolved_responses = IndexMap::with_capacity(op.responses.len());
        for (status, resp) in &op.responses {
            let resolved = match resp {
                ResponseOrRef::Ref { ref_path } => {
                    ResponseOrRef::Response(self.lookup_response(ref_path)?)
                }
                inline => inline.clone(),
            };
            resolved_responses.insert(status.clone(), resolved);
        }
        op.responses = resolved_responses;

        Ok(())
    }

    fn resolve_parameters(
        &self,
        params: &[ParameterOrRef],
    ) -> Result<Vec<ParameterOrRef>, ResolveError> {
        params
            .iter()
            .map(|p| match p {
                ParameterOrRef::Ref { ref_path } => {
                    self.lookup_parameter(ref_path).map(ParameterOrRef::Parameter)
                }
                inline => Ok(inline.clone()),
            })
            .collect()
    }

    // Lookup helpers

    fn lookup_parameter(&self, ref_path: &str) -> Result<Parameter, ResolveError> {
        let name = parse_ref_name(ref_path, "parameters")?;
        self.components
            .and_then(|c| c.parameters.get(name))
            .and_then(|p| match p {
                ParameterOrRef::Parameter(param) => Some(param.clone()),
                _ => None,
            })
            .ok_or_else(|| ResolveError::RefTargetNotFound(ref_path.to_string()))
    }

    fn lookup_request_body(&self, ref_path: &str) -> Result<RequestBody, ResolveError> {
        let name = parse_ref_name(ref_path, "requestBodies")?;
        self.components
            .and_then(|c| c.request_bodies.get(name))
            .and_then(|rb| match rb {
                RequestBodyOrRef::RequestBody(body) => Some(body.clone()),
                _ => None,
            })
            .ok_or_else(|| ResolveError::RefTargetNotFound(ref_path.to_string()))
    }

    fn lookup_response(&self, ref_path: &str) -> Result<Response, ResolveError> {
        let name = parse_ref_name(ref_path, "responses")?;
        self.components
            .and_then(|c| c.responses.get(name))
            .and_then(|r| match r {
                ResponseOrRef::Response(resp) => Some(resp.clone()),
                _ => None,
            })
            .ok_or_else(|| ResolveError::RefTargetNotFound(ref_path.to_string()))
    }
}

/// Parse a `$ref` path like `#/components/schemas/Foo` and extract the name.
pub fn parse_ref_name<'a>(
    ref_path: &'a str,
    expected_section: &str,
) -> Result<&'a str, ResolveError> {
    let stripped = ref_path
        .strip_prefix("#/components/")
        .ok_or_else(|| ResolveError::InvalidRefFormat(ref_path.to_string()))?;
    let (section, name) = stripped
        .split_once('/')
        .ok_or_else(|| ResolveError::InvalidRefFormat(ref_path.to_string()))?;
    if section != expected_section {
        return Err(ResolveError::InvalidRefFormat(format!(
            "expected section '{}', got '{}' in {}",
            expected_section, section, ref_path
        )));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ref_name() {
        assert_eq!(
            parse_ref_name("#/components/schemas/Pet", "schemas").unwrap(),
            "Pet"
        );
        assert!(matches!(
            parse_ref_name("#/definitions/Pet", "schemas"),
            Err(ResolveError::InvalidRefFormat(_))
        ));
        assert!(matches!(
            parse_ref_name("#/components/parameters/limit", "schemas"),
            Err(ResolveError::InvalidRefFormat(_))
        ));
    }
}
