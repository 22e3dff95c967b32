//! Request and response payloads.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::Extensions;
use super::schema::SchemaOrRef;

/// One entry of a `content` map. Only the schema matters here; examples and
/// encodings are ignored.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MediaType {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaOrRef>,
}

/// Keys of `content` keep their declaration order; for a request body that
/// order is what the operation consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub content: IndexMap<String, MediaType>,

    #[serde(default)]
    pub required: bool,

    #[serde(flatten)]
    pub extensions: Extensions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestBodyOrRef {
    Ref {
        #[serde(rename = "$ref")]
        ref_path: String,
    },
    RequestBody(RequestBody),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub description: String,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub content: IndexMap<String, MediaType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseOrRef {
    Ref {
        #[serde(rename = "$ref")]
        ref_path: String,
    },
    Response(Response),
}

impl Response {
    /// The first declared schema, whatever its media type.
    pub fn schema(&self) -> Option<&SchemaOrRef> {
        self.content.values().find_map(|mt| mt.schema.as_ref())
    }
}

impl RequestBody {
    /// The first declared schema, whatever its media type.
    pub fn schema(&self) -> Option<&SchemaOrRef> {
        self.content.values().find_map(|mt| mt.schema.as_ref())
    }
}
