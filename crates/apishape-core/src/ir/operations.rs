use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use super::capability::CapabilitySet;
use super::schemas::{Constraints, IrType};
use super::types::NormalizedName;

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
    Trace,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Trace => "TRACE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of an ordered media-type list. `has_more` is a rendering aid:
/// it is false only on the last entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaTypeEntry {
    pub media_type: String,
    pub has_more: bool,
}

impl MediaTypeEntry {
    /// Build entries for a declared list, marking every entry but the last.
    pub fn sequence<S: AsRef<str>>(media_types: &[S]) -> Vec<MediaTypeEntry> {
        let last = media_types.len().saturating_sub(1);
        media_types
            .iter()
            .enumerate()
            .map(|(i, mt)| MediaTypeEntry {
                media_type: mt.as_ref().to_string(),
                has_more: i < last,
            })
            .collect()
    }
}

/// A fully resolved API operation.
#[derive(Debug, Clone, Serialize)]
pub struct IrOperation {
    /// Identifier, unique within the description.
    pub operation_id: String,
    pub name: NormalizedName,
    pub method: HttpMethod,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub tags: Vec<String>,
    /// `x-client-group`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_group: Option<String>,
    pub consumes: Vec<String>,
    pub produces: Vec<String>,
    pub parameters: Vec<IrParameter>,
    pub responses: Vec<IrResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_type: Option<IrType>,
    pub deprecated: bool,

    // Derived during post-processing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_name: Option<String>,
    pub subresource: bool,
    pub is_multipart: bool,
    pub prioritized_consumes: Vec<MediaTypeEntry>,
    pub return_type_is_primitive: bool,
    pub capabilities: CapabilitySet,
}

impl IrOperation {
    pub fn new(operation_id: String, name: NormalizedName, method: HttpMethod, path: &str) -> Self {
        Self {
            operation_id,
            name,
            method,
            path: path.to_string(),
            summary: None,
            description: None,
            tags: Vec::new(),
            client_group: None,
            consumes: Vec::new(),
            produces: Vec::new(),
            parameters: Vec::new(),
            responses: Vec::new(),
            return_type: None,
            deprecated: false,
            group_key: None,
            base_name: None,
            subresource: false,
            is_multipart: false,
            prioritized_consumes: Vec::new(),
            return_type_is_primitive: false,
            capabilities: CapabilitySet::default(),
        }
    }
}

/// A declared response.
#[derive(Debug, Clone, Serialize)]
pub struct IrResponse {
    pub status: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_type: Option<IrType>,
}

/// Parameter location. A request body is lowered to a `Body` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IrParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
    Body,
}

/// Structured vendor data attached to a parameter.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ParameterBinding {
    #[default]
    None,
    /// `x-ref`: bind the enumeration to an externally defined enum type,
    /// either on the parameter itself or on its array items.
    EnumReference { target: String, on_items: bool },
    /// `x-complex-type`: a matrix parameter that maps segment keys onto
    /// properties of a referenced model.
    ComplexType(ComplexTypeRef),
}

/// The unresolved `x-complex-type` declaration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplexTypeRef {
    pub reference: String,
    pub base_property: String,
    /// Segment key to property name.
    pub properties: IndexMap<String, String>,
}

/// A matrix parameter property after resolution against its model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundProperty {
    pub key: String,
    pub property: NormalizedName,
    pub property_type: IrType,
}

/// `x-complex-type` after resolution: every property type is known.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplexTypeBinding {
    pub reference: String,
    pub base_property: NormalizedName,
    pub base_property_type: IrType,
    pub properties: Vec<BoundProperty>,
}

/// A resolved path/query/header/cookie/body parameter.
#[derive(Debug, Clone, Serialize)]
pub struct IrParameter {
    pub name: NormalizedName,
    pub original_name: String,
    pub location: IrParameterLocation,
    pub param_type: IrType,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub constraints: Constraints,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub item_enum_values: Vec<String>,
    pub binding: ParameterBinding,

    // Derived during post-processing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_type: Option<IrType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complex_type: Option<ComplexTypeBinding>,
    pub capabilities: CapabilitySet,
}

impl IrParameter {
    pub fn new(
        name: NormalizedName,
        original_name: &str,
        location: IrParameterLocation,
        param_type: IrType,
    ) -> Self {
        Self {
            name,
            original_name: original_name.to_string(),
            location,
            param_type,
            required: false,
            description: None,
            constraints: Constraints::default(),
            enum_values: Vec::new(),
            item_enum_values: Vec::new(),
            binding: ParameterBinding::None,
            enum_name: None,
            display_type: None,
            complex_type: None,
            capabilities: CapabilitySet::default(),
        }
    }

    pub fn is_body(&self) -> bool {
        self.location == IrParameterLocation::Body
    }

    pub fn is_enum(&self) -> bool {
        !self.enum_values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_sequence() {
        let entries = MediaTypeEntry::sequence(&["application/json", "text/plain"]);
        assert!(entries[0].has_more);
        assert!(!entries[1].has_more);
        assert!(MediaTypeEntry::sequence::<&str>(&[]).is_empty());
    }
}
