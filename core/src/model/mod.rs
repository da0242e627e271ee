#![deny(missing_docs)]

//! # IR Data Model
//!
//! - **schema**: JSON Schema 2020-12 node representation.
//! - **entities**: reusable OpenAPI objects (parameters, responses, ...).
//! - **document**: document roots and top-level metadata.
//!
//! Every entity position that may carry a `$ref` is modeled as the tagged
//! union [`RefOr`] rather than an inline-with-nullable-ref-field pattern, so
//! the "resolved entities carry no unresolved reference" invariant is visible
//! in the types.

pub mod document;
pub mod entities;
pub mod schema;

pub use document::{Document, ExternalDocs, Info, OpenApiDefinition, Paths, Server, Tag, Webhooks};
pub use entities::{
    Callback, ExampleObject, Header, Link, MediaTypeObject, Operation, Parameter, PathItem,
    RequestBody, Response, SecurityScheme,
};
pub use schema::{
    AdditionalProperties, Composition, Discriminator, Schema, SchemaObject, SchemaType, Type,
};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A Reference Object: a `$ref` pointer plus optional sibling overrides.
///
/// Sibling `summary`/`description` take precedence over the resolved
/// target's own values but never replace any other target field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    /// The reference pointer (fragment, optionally prefixed by a base URI).
    #[serde(rename = "$ref")]
    pub ref_location: String,
    /// Override for the target's summary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Override for the target's description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Referencing-site extensions, overlaid onto the target's on merge.
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
}

impl Reference {
    /// Builds a bare reference to the given location.
    pub fn new(ref_location: impl Into<String>) -> Self {
        Self {
            ref_location: ref_location.into(),
            summary: None,
            description: None,
            extensions: BTreeMap::new(),
        }
    }
}

/// A value that is either a `$ref` stub or an inline payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RefOr<T> {
    /// An unresolved (or deliberately kept) reference.
    Ref(Reference),
    /// A concrete inline value.
    Inline(T),
}

impl<T> RefOr<T> {
    /// Whether this is a reference stub.
    pub fn is_ref(&self) -> bool {
        matches!(self, RefOr::Ref(_))
    }

    /// Returns the inline payload, if any.
    pub fn as_inline(&self) -> Option<&T> {
        match self {
            RefOr::Inline(value) => Some(value),
            RefOr::Ref(_) => None,
        }
    }

    /// Returns the reference, if any.
    pub fn as_ref_obj(&self) -> Option<&Reference> {
        match self {
            RefOr::Ref(reference) => Some(reference),
            RefOr::Inline(_) => None,
        }
    }
}

/// The component bucket a `$ref` resolves within.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// `#/components/schemas/...`
    Schema,
    /// `#/components/responses/...`
    Response,
    /// `#/components/parameters/...`
    Parameter,
    /// `#/components/requestBodies/...`
    RequestBody,
    /// `#/components/headers/...`
    Header,
    /// `#/components/securitySchemes/...`
    SecurityScheme,
    /// `#/components/examples/...`
    Example,
    /// `#/components/links/...`
    Link,
    /// `#/components/callbacks/...`
    Callback,
    /// `#/components/pathItems/...`
    PathItem,
    /// `#/components/mediaTypes/...`
    MediaType,
}

impl ComponentKind {
    /// The components-object section name for this kind.
    pub fn section(self) -> &'static str {
        match self {
            ComponentKind::Schema => "schemas",
            ComponentKind::Response => "responses",
            ComponentKind::Parameter => "parameters",
            ComponentKind::RequestBody => "requestBodies",
            ComponentKind::Header => "headers",
            ComponentKind::SecurityScheme => "securitySchemes",
            ComponentKind::Example => "examples",
            ComponentKind::Link => "links",
            ComponentKind::Callback => "callbacks",
            ComponentKind::PathItem => "pathItems",
            ComponentKind::MediaType => "mediaTypes",
        }
    }
}

/// The Components Object: one named map per component kind.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Components {
    /// Reusable schemas.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub schemas: IndexMap<String, RefOr<Schema>>,
    /// Reusable responses.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub responses: IndexMap<String, RefOr<Response>>,
    /// Reusable parameters.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub parameters: IndexMap<String, RefOr<Parameter>>,
    /// Reusable request bodies.
    #[serde(
        rename = "requestBodies",
        default,
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub request_bodies: IndexMap<String, RefOr<RequestBody>>,
    /// Reusable headers.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, RefOr<Header>>,
    /// Reusable security schemes.
    #[serde(
        rename = "securitySchemes",
        default,
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub security_schemes: IndexMap<String, RefOr<SecurityScheme>>,
    /// Reusable examples.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub examples: IndexMap<String, RefOr<ExampleObject>>,
    /// Reusable links.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub links: IndexMap<String, RefOr<Link>>,
    /// Reusable callbacks.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub callbacks: IndexMap<String, RefOr<Callback>>,
    /// Reusable path items (OAS 3.1+).
    #[serde(
        rename = "pathItems",
        default,
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub path_items: IndexMap<String, RefOr<PathItem>>,
    /// Reusable media types (OAS 3.2).
    #[serde(
        rename = "mediaTypes",
        default,
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub media_types: IndexMap<String, RefOr<MediaTypeObject>>,
    /// Specification extensions (`x-...`).
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
}

impl Components {
    /// Whether no component of any kind is present.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
            && self.responses.is_empty()
            && self.parameters.is_empty()
            && self.request_bodies.is_empty()
            && self.headers.is_empty()
            && self.security_schemes.is_empty()
            && self.examples.is_empty()
            && self.links.is_empty()
            && self.callbacks.is_empty()
            && self.path_items.is_empty()
            && self.media_types.is_empty()
    }
}
