pub mod content;
pub mod operation;
pub mod parameter;
pub mod ref_resolve;
pub mod schema;
pub mod spec;

use indexmap::IndexMap;

use crate::error::ParseError;
use spec::OpenApiSpec;

/// Unknown keys of an object. Only `x-` prefixed entries are meaningful.
pub type Extensions = IndexMap<String, serde_json::Value>;

/// Look up a vendor extension by its full key (e.g. `x-client-group`).
pub fn extension<'a>(extensions: &'a Extensions, key: &str) -> Option<&'a serde_json::Value> {
    extensions.get(key)
}

/// Look up a string-valued vendor extension.
pub fn extension_str<'a>(extensions: &'a Extensions, key: &str) -> Option<&'a str> {
    extension(extensions, key).and_then(|v| v.as_str())
}

/// Parse an OpenAPI spec from YAML.
pub fn from_yaml(input: &str) -> Result<OpenApiSpec, ParseError> {
    let spec: OpenApiSpec = serde_yaml_ng::from_str(input)?;
    validate_version(&spec)?;
    Ok(spec)
}

/// Parse an OpenAPI spec from JSON.
pub fn from_json(input: &str) -> Result<OpenApiSpec, ParseError> {
    let spec: OpenApiSpec = serde_json::from_str(input)?;
    validate_version(&spec)?;
    Ok(spec)
}

fn validate_version(spec: &OpenApiSpec) -> Result<(), ParseError> {
    if !spec.openapi.starts_with("3.") {
        return Err(ParseError::UnsupportedVersion(spec.openapi.clone()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extensions_are_captured() {
        let yaml = r#"
openapi: "3.0.3"
info:
  title: Test
  version: "1"
  x-short-name: Short Name
paths: {}
"#;
        let spec = from_yaml(yaml).unwrap();
        assert_eq!(
            extension_str(&spec.info.extensions, "x-short-name"),
            Some("Short Name")
        );
        assert!(extension(&spec.info.extensions, "x-missing").is_none());
    }

    #[test]
    fn test_rejects_swagger_2() {
        let json = r#"{"openapi": "2.0", "info": {"title": "T", "version": "1"}}"#;
        assert!(matches!(
            from_json(json),
            Err(ParseError::UnsupportedVersion(v)) if v == "2.0"
        ));
    }
}
