use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use super::operations::IrOperation;
use super::schemas::IrModel;

/// A fully resolved API description, ready for post-processing.
#[derive(Debug, Clone, Serialize)]
pub struct IrSpec {
    pub info: IrInfo,
    /// Models keyed by their name in the source document.
    pub models: IndexMap<String, IrModel>,
    pub operations: Vec<IrOperation>,
}

/// API metadata.
#[derive(Debug, Clone, Serialize)]
pub struct IrInfo {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub version: String,
    /// The `x-short-name` extension, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
}

/// A name with multiple casing variants pre-computed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct NormalizedName {
    pub original: String,
    pub pascal_case: String,
    pub camel_case: String,
    pub snake_case: String,
    pub screaming_snake: String,
}

impl fmt::Display for NormalizedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.original)
    }
}
