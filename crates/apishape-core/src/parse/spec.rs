use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::Extensions;
use super::content::{RequestBodyOrRef, ResponseOrRef};
use super::operation::PathItem;
use super::parameter::ParameterOrRef;
use super::schema::SchemaOrRef;

/// An OpenAPI 3.x document. Only the parts that feed operations and models
/// are kept; servers, security and tags are dropped on parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApiSpec {
    pub openapi: String,

    pub info: Info,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub paths: IndexMap<String, PathItem>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Components>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub version: String,

    /// Carries `x-short-name`.
    #[serde(flatten)]
    pub extensions: Extensions,
}

/// Reusable definitions. `schemas` become models; the rest is inlined by
/// [`RefResolver`](super::ref_resolve::RefResolver).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Components {
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub schemas: IndexMap<String, SchemaOrRef>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub parameters: IndexMap<String, ParameterOrRef>,

    #[serde(
        rename = "requestBodies",
        default,
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub request_bodies: IndexMap<String, RequestBodyOrRef>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub responses: IndexMap<String, ResponseOrRef>,
}
