#![deny(missing_docs)]

//! # Reusable OpenAPI Entities
//!
//! Typed structures for every component kind. Fields map directly to the
//! OpenAPI JSON/YAML objects; unknown `x-` keys land in flattened extension
//! maps so they survive a round trip.

use super::document::{ExternalDocs, Server};
use super::schema::Schema;
use super::{RefOr, Reference};
use indexmap::IndexMap;
use serde::de::Error as DeError;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;

fn is_false(flag: &bool) -> bool {
    !*flag
}

/// Prefix of the placeholder description carried by an unresolved response.
const UNRESOLVED_RESPONSE_PREFIX: &str = "ref:";

/// A Parameter Object (OAS 3.x).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Parameter {
    /// Name of the parameter.
    #[serde(default)]
    pub name: String,
    /// Location of the parameter (query, path, header, cookie, querystring).
    #[serde(rename = "in", default)]
    pub location: String,
    /// A brief description of the parameter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the parameter is required.
    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,
    /// Whether the parameter is deprecated.
    #[serde(default, skip_serializing_if = "is_false")]
    pub deprecated: bool,
    /// Allow empty values for query parameters (deprecated).
    #[serde(
        rename = "allowEmptyValue",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub allow_empty_value: Option<bool>,
    /// Serialization style.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    /// Explode modifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explode: Option<bool>,
    /// Allow reserved characters.
    #[serde(
        rename = "allowReserved",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub allow_reserved: Option<bool>,
    /// Schema definition. Mutually exclusive with `content`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<RefOr<Schema>>,
    /// Single example value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    /// Named example values.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub examples: IndexMap<String, RefOr<ExampleObject>>,
    /// Content map (complex parameter serialization).
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub content: IndexMap<String, RefOr<MediaTypeObject>>,
    /// Specification extensions (`x-...`).
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
}

/// A Response Object.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Response {
    /// A description of the response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Response headers.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, RefOr<Header>>,
    /// Response content keyed by media type.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub content: IndexMap<String, RefOr<MediaTypeObject>>,
    /// Response links.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub links: IndexMap<String, RefOr<Link>>,
    /// Specification extensions (`x-...`).
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
}

impl Response {
    /// Builds the placeholder stub used when a response ref cannot be
    /// resolved: the description carries the `ref:<ref>` sentinel.
    pub fn unresolved_stub(reference: &Reference) -> Self {
        let mut stub = Response {
            description: Some(format!(
                "{}{}",
                UNRESOLVED_RESPONSE_PREFIX, reference.ref_location
            )),
            ..Response::default()
        };
        if let Some(desc) = &reference.description {
            stub.description = Some(desc.clone());
        }
        stub.extensions = reference
            .extensions
            .iter()
            .filter(|(k, _)| k.starts_with("x-"))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        stub
    }

    /// Recognizes the `ref:<ref>` sentinel so consumers that find a real
    /// description elsewhere can discard the placeholder.
    pub fn is_unresolved_stub(&self) -> bool {
        self.description
            .as_deref()
            .map(|d| d.starts_with(UNRESOLVED_RESPONSE_PREFIX))
            .unwrap_or(false)
            && self.content.is_empty()
            && self.headers.is_empty()
            && self.links.is_empty()
    }
}

/// A Request Body Object.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RequestBody {
    /// A brief description of the request body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the body is required.
    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,
    /// Body content keyed by media type.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub content: IndexMap<String, RefOr<MediaTypeObject>>,
    /// Specification extensions (`x-...`).
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
}

/// A Header Object (a parameter without `name`/`in`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Header {
    /// A brief description of the header.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the header is required.
    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,
    /// Whether the header is deprecated.
    #[serde(default, skip_serializing_if = "is_false")]
    pub deprecated: bool,
    /// Serialization style (`simple` for headers).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    /// Explode modifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explode: Option<bool>,
    /// Schema definition. Mutually exclusive with `content`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<RefOr<Schema>>,
    /// Single example value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    /// Named example values.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub examples: IndexMap<String, RefOr<ExampleObject>>,
    /// Content map.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub content: IndexMap<String, RefOr<MediaTypeObject>>,
    /// Specification extensions (`x-...`).
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
}

/// A Link Object.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Link {
    /// Relative or absolute URI reference to an operation.
    #[serde(
        rename = "operationRef",
        skip_serializing_if = "Option::is_none"
    )]
    pub operation_ref: Option<String>,
    /// The name of an existing operation.
    #[serde(rename = "operationId", skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    /// Parameter values or runtime expressions to pass.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub parameters: IndexMap<String, Value>,
    /// A literal value or runtime expression for the request body.
    #[serde(rename = "requestBody", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<Value>,
    /// A description of the link.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// A server object to be used by the target operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<Server>,
    /// Specification extensions (`x-...`).
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
}

/// An Example Object.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExampleObject {
    /// Short summary of the example.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Long description of the example.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Embedded literal example value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// A URI pointing to the literal example.
    #[serde(
        rename = "externalValue",
        skip_serializing_if = "Option::is_none"
    )]
    pub external_value: Option<String>,
    /// Specification extensions (`x-...`).
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
}

/// A Media Type Object: one entry of a content map.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MediaTypeObject {
    /// Schema defining the content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<RefOr<Schema>>,
    /// Per-item schema for sequential media types (OAS 3.2).
    #[serde(rename = "itemSchema", skip_serializing_if = "Option::is_none")]
    pub item_schema: Option<RefOr<Schema>>,
    /// Single example value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    /// Named example values.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub examples: IndexMap<String, RefOr<ExampleObject>>,
    /// Encoding definitions, kept raw.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<Value>,
    /// Specification extensions (`x-...`).
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
}

/// A Security Scheme Object, flattened over all scheme types.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SecurityScheme {
    /// Scheme type (apiKey, http, oauth2, openIdConnect, mutualTLS).
    #[serde(rename = "type", default)]
    pub scheme_type: String,
    /// A description of the scheme.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Parameter name (apiKey).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Location (apiKey: query, header, cookie).
    #[serde(rename = "in", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// HTTP authorization scheme (http).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    /// Bearer token format hint (http bearer).
    #[serde(rename = "bearerFormat", skip_serializing_if = "Option::is_none")]
    pub bearer_format: Option<String>,
    /// OAuth2 flow definitions, kept raw.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flows: Option<Value>,
    /// OpenID Connect discovery URL.
    #[serde(
        rename = "openIdConnectUrl",
        skip_serializing_if = "Option::is_none"
    )]
    pub open_id_connect_url: Option<String>,
    /// Specification extensions (`x-...`).
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
}

/// A Callback Object: runtime expressions mapped to path items, with
/// support for specification extensions.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Callback {
    /// Path items keyed by runtime expression.
    pub expressions: IndexMap<String, RefOr<PathItem>>,
    /// Spec extensions attached to the Callback Object (x-...).
    pub extensions: BTreeMap<String, Value>,
}

impl<'de> Deserialize<'de> for Callback {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = IndexMap::<String, Value>::deserialize(deserializer)?;
        let mut expressions = IndexMap::new();
        let mut extensions = BTreeMap::new();

        for (key, value) in raw {
            if key.starts_with("x-") {
                extensions.insert(key, value);
                continue;
            }
            let item = serde_json::from_value::<RefOr<PathItem>>(value).map_err(|e| {
                DeError::custom(format!("Failed to parse callback expression '{}': {}", key, e))
            })?;
            expressions.insert(key, item);
        }

        Ok(Self {
            expressions,
            extensions,
        })
    }
}

impl Serialize for Callback {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map =
            serializer.serialize_map(Some(self.expressions.len() + self.extensions.len()))?;
        for (key, value) in &self.expressions {
            map.serialize_entry(key, value)?;
        }
        for (key, value) in &self.extensions {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// A Path Item containing operations for a specific URL template.
///
/// Path items are the one place OpenAPI allows `$ref` alongside siblings,
/// so the reference lives inline here instead of through [`RefOr`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PathItem {
    /// Allows for a referenced definition of this path item.
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub ref_location: Option<String>,
    /// Optional summary for all operations in this path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Optional description for all operations in this path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Alternative server array for this path item.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servers: Option<Vec<Server>>,
    /// Parameters common to all operations in this path.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<RefOr<Parameter>>,
    /// GET operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    /// PUT operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    /// POST operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    /// DELETE operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    /// OPTIONS operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
    /// HEAD operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
    /// PATCH operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    /// TRACE operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<Operation>,
    /// QUERY operation (OAS 3.2+).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<Operation>,
    /// Map of additional operations keyed by custom HTTP methods.
    #[serde(
        rename = "additionalOperations",
        default,
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub additional_operations: IndexMap<String, Operation>,
    /// Specification extensions (`x-...`).
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
}

impl PathItem {
    /// Iterates over the fixed-method operations that are present.
    pub fn operations(&self) -> impl Iterator<Item = (&'static str, &Operation)> {
        [
            ("get", self.get.as_ref()),
            ("put", self.put.as_ref()),
            ("post", self.post.as_ref()),
            ("delete", self.delete.as_ref()),
            ("options", self.options.as_ref()),
            ("head", self.head.as_ref()),
            ("patch", self.patch.as_ref()),
            ("trace", self.trace.as_ref()),
            ("query", self.query.as_ref()),
        ]
        .into_iter()
        .filter_map(|(method, op)| op.map(|op| (method, op)))
    }
}

/// An Operation Object.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Operation {
    /// Grouping tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Short summary of the operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Long description of the operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Additional external documentation.
    #[serde(rename = "externalDocs", skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<ExternalDocs>,
    /// Unique operation identifier.
    #[serde(rename = "operationId", skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    /// Operation parameters.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<RefOr<Parameter>>,
    /// The request body.
    #[serde(rename = "requestBody", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RefOr<RequestBody>>,
    /// Responses keyed by status code or range.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub responses: IndexMap<String, RefOr<Response>>,
    /// Out-of-band callbacks keyed by name.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub callbacks: IndexMap<String, RefOr<Callback>>,
    /// Whether the operation is deprecated.
    #[serde(default, skip_serializing_if = "is_false")]
    pub deprecated: bool,
    /// Operation-level security requirements.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<Value>>,
    /// Alternative servers for this operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servers: Option<Vec<Server>>,
    /// Specification extensions (`x-...`).
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
}
