#![deny(missing_docs)]

//! # Document Roots
//!
//! Top-level OpenAPI document structure plus the [`Document`] union stored
//! by the registry. Paths and webhooks use custom (de)serialization so that
//! `x-` extensions living beside path templates survive a round trip.

use super::entities::PathItem;
use super::schema::Schema;
use super::{Components, RefOr};
use indexmap::IndexMap;
use serde::de::Error as DeError;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// A registered document: an OpenAPI root or a standalone schema.
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    /// A full OpenAPI document.
    OpenApi(Box<OpenApiDefinition>),
    /// A standalone JSON Schema document.
    Schema(Box<Schema>),
}

impl Document {
    /// Narrows to an OpenAPI definition.
    pub fn as_openapi(&self) -> Option<&OpenApiDefinition> {
        match self {
            Document::OpenApi(def) => Some(def),
            Document::Schema(_) => None,
        }
    }

    /// Narrows to a standalone schema.
    pub fn as_schema(&self) -> Option<&Schema> {
        match self {
            Document::Schema(schema) => Some(schema),
            Document::OpenApi(_) => None,
        }
    }

    /// The document's own declared identity (`$self` or `$id`), if any.
    pub fn declared_identity(&self) -> Option<&str> {
        match self {
            Document::OpenApi(def) => def.self_uri.as_deref(),
            Document::Schema(schema) => schema.as_object().and_then(|obj| obj.id.as_deref()),
        }
    }
}

/// The Paths Object with support for specification extensions.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Paths {
    /// Parsed path items keyed by path template.
    pub items: IndexMap<String, PathItem>,
    /// Spec extensions attached to the Paths Object (x-...).
    pub extensions: BTreeMap<String, Value>,
}

impl Paths {
    /// Returns true when no concrete path items are present.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<'de> Deserialize<'de> for Paths {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = IndexMap::<String, Value>::deserialize(deserializer)?;
        let mut items = IndexMap::new();
        let mut extensions = BTreeMap::new();

        for (key, value) in raw {
            if key.starts_with("x-") {
                extensions.insert(key, value);
                continue;
            }
            let path_item = serde_json::from_value::<PathItem>(value).map_err(|e| {
                DeError::custom(format!("Failed to parse path item '{}': {}", key, e))
            })?;
            items.insert(key, path_item);
        }

        Ok(Self { items, extensions })
    }
}

impl Serialize for Paths {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.items.len() + self.extensions.len()))?;
        for (key, value) in &self.items {
            map.serialize_entry(key, value)?;
        }
        for (key, value) in &self.extensions {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// The Webhooks Object with support for specification extensions.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Webhooks {
    /// Parsed webhook path items keyed by name.
    pub items: IndexMap<String, RefOr<PathItem>>,
    /// Spec extensions attached to the Webhooks Object (x-...).
    pub extensions: BTreeMap<String, Value>,
}

impl<'de> Deserialize<'de> for Webhooks {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = IndexMap::<String, Value>::deserialize(deserializer)?;
        let mut items = IndexMap::new();
        let mut extensions = BTreeMap::new();

        for (key, value) in raw {
            if key.starts_with("x-") {
                extensions.insert(key, value);
                continue;
            }
            let item = serde_json::from_value::<RefOr<PathItem>>(value).map_err(|e| {
                DeError::custom(format!("Failed to parse webhook '{}': {}", key, e))
            })?;
            items.insert(key, item);
        }

        Ok(Self { items, extensions })
    }
}

impl Serialize for Webhooks {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.items.len() + self.extensions.len()))?;
        for (key, value) in &self.items {
            map.serialize_entry(key, value)?;
        }
        for (key, value) in &self.extensions {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// The root of an OpenAPI document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OpenApiDefinition {
    /// OpenAPI version (e.g. "3.1.0"). Required in OAS 3.x.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openapi: Option<String>,
    /// Swagger version (e.g. "2.0") for legacy detection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swagger: Option<String>,
    /// The `$self` keyword (OAS 3.2+): the document's canonical identity.
    #[serde(rename = "$self", skip_serializing_if = "Option::is_none")]
    pub self_uri: Option<String>,
    /// Metadata about the API. Required in OAS 3.x.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<Info>,
    /// Default JSON Schema dialect for Schema Objects (OAS 3.1+).
    #[serde(
        rename = "jsonSchemaDialect",
        skip_serializing_if = "Option::is_none"
    )]
    pub json_schema_dialect: Option<String>,
    /// Server configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servers: Option<Vec<Server>>,
    /// Path items.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paths: Option<Paths>,
    /// Webhook items.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhooks: Option<Webhooks>,
    /// Reusable components.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Components>,
    /// Global security requirements.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<Value>>,
    /// Tags used by the specification with additional metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Tag>>,
    /// External documentation.
    #[serde(rename = "externalDocs", skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<ExternalDocs>,
    /// Specification extensions (x-...).
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
}

impl OpenApiDefinition {
    /// Re-emits the definition as a generic value tree. Kept references
    /// serialize as `$ref` objects, distinct from inlined entities.
    pub fn to_value(&self) -> crate::error::AppResult<Value> {
        serde_json::to_value(self)
            .map_err(|e| crate::error::AppError::General(format!("Serialization failed: {}", e)))
    }
}

/// Metadata about the API (Info Object).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Info {
    /// The title of the API.
    #[serde(default)]
    pub title: String,
    /// A short summary of the API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// A description of the API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// A URL to the Terms of Service for the API.
    #[serde(rename = "termsOfService", skip_serializing_if = "Option::is_none")]
    pub terms_of_service: Option<String>,
    /// The contact information for the exposed API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
    /// The license information for the exposed API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<License>,
    /// The version of the API document.
    #[serde(default)]
    pub version: String,
    /// Specification extensions (x-...).
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
}

/// Contact information for the exposed API.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Contact {
    /// The identifying name of the contact person/organization.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// The URL pointing to the contact information.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// The email address of the contact person/organization.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Specification extensions (x-...).
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
}

/// License information for the exposed API.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct License {
    /// The license name used for the API.
    #[serde(default)]
    pub name: String,
    /// An SPDX license expression for the API (OAS 3.1+).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    /// A URL to the license used for the API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Specification extensions (x-...).
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
}

/// An object representing a Server.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Server {
    /// A URL to the target host.
    #[serde(default)]
    pub url: String,
    /// An optional string describing the host.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// An optional unique string to refer to the host.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// A map between a variable name and its value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<BTreeMap<String, ServerVariable>>,
    /// Specification extensions (x-...).
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
}

/// An object representing a Server Variable.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ServerVariable {
    /// An enumeration of string values for the substitution options.
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    /// The default value to use for substitution.
    #[serde(default)]
    pub default: String,
    /// An optional description for the server variable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Specification extensions (x-...).
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
}

/// Allows referencing an external resource for extended documentation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExternalDocs {
    /// A description of the target documentation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// The URL for the target documentation.
    #[serde(default)]
    pub url: String,
    /// Specification extensions (x-...).
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
}

/// Adds metadata to a single tag used by operations.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Tag {
    /// The name of the tag.
    #[serde(default)]
    pub name: String,
    /// A short summary of the tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// A description for the tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Additional external documentation for this tag.
    #[serde(rename = "externalDocs", skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<ExternalDocs>,
    /// The parent tag name for nesting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// The tag kind (e.g. nav, badge, audience).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Specification extensions (x-...).
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_paths_splits_extensions() {
        let value = json!({
            "x-paths-meta": { "owner": "api" },
            "/users": { "get": { "responses": { "200": { "description": "ok" } } } }
        });
        let paths: Paths = serde_json::from_value(value).unwrap();
        assert_eq!(paths.items.len(), 1);
        assert!(paths.items.contains_key("/users"));
        assert!(paths.extensions.contains_key("x-paths-meta"));
    }

    #[test]
    fn test_webhooks_accepts_refs() {
        let value = json!({
            "userCreated": { "$ref": "#/components/pathItems/UserCreated" }
        });
        let webhooks: Webhooks = serde_json::from_value(value).unwrap();
        assert!(webhooks.items.get("userCreated").unwrap().is_ref());
    }

    #[test]
    fn test_document_declared_identity() {
        let def = OpenApiDefinition {
            self_uri: Some("https://example.com/openapi.yaml".into()),
            ..OpenApiDefinition::default()
        };
        let doc = Document::OpenApi(Box::new(def));
        assert_eq!(
            doc.declared_identity(),
            Some("https://example.com/openapi.yaml")
        );
    }
}
