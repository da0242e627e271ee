#![deny(missing_docs)]

//! # Document Registry
//!
//! Holds all pre-loaded documents for cross-document resolution. The
//! registry never fetches anything: every document a `$ref` may target must
//! be registered up front under its retrieval URI.
//!
//! Each entry is indexed both by its normalized retrieval URI and by its
//! declared identity (`$self` for OpenAPI roots, `$id` for standalone
//! schemas), so a `$ref` can address a document by either name. Registration
//! under an already-known URI is idempotent: the newer document wins.

use crate::error::{AppError, AppResult};
use crate::model::{Document, OpenApiDefinition, Schema};
use crate::schema::build_schema;
use crate::uri::{compute_base_uri, normalize_base_uri, parse_base_url};
use crate::validation::validate_openapi_root;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, warn};
use url::Url;

/// One registered document with its resolution context.
#[derive(Debug, Clone)]
pub struct DocumentEntry {
    /// The URI the document was registered under.
    pub retrieval_uri: String,
    /// The effective base URI (declared identity resolved against the
    /// retrieval URI), parsed for relative-reference joins.
    pub base_uri: Option<Url>,
    /// The parsed document.
    pub document: Document,
}

/// The multi-document store backing cross-document `$ref` resolution.
#[derive(Debug, Clone, Default)]
pub struct DocumentRegistry {
    docs: Vec<DocumentEntry>,
    index: HashMap<String, usize>,
}

impl DocumentRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered documents.
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    /// Whether the registry holds no documents.
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Parses and registers an OpenAPI document from YAML (JSON is a YAML
    /// subset, so JSON text is accepted too).
    pub fn register_openapi_yaml(&mut self, content: &str, retrieval_uri: &str) -> AppResult<()> {
        let raw: Value = serde_yaml::from_str(content)
            .map_err(|e| AppError::InvalidDocument(format!("YAML parse error: {}", e)))?;
        self.register_openapi_value(&raw, retrieval_uri)
    }

    /// Parses and registers an OpenAPI document from JSON.
    pub fn register_openapi_json(&mut self, content: &str, retrieval_uri: &str) -> AppResult<()> {
        let raw: Value = serde_json::from_str(content)
            .map_err(|e| AppError::InvalidDocument(format!("JSON parse error: {}", e)))?;
        self.register_openapi_value(&raw, retrieval_uri)
    }

    /// Registers an OpenAPI document from an already-decoded value tree.
    pub fn register_openapi_value(&mut self, raw: &Value, retrieval_uri: &str) -> AppResult<()> {
        validate_openapi_root(raw)?;
        let definition: OpenApiDefinition = serde_json::from_value(raw.clone())
            .map_err(|e| AppError::InvalidDocument(format!("Malformed OpenAPI root: {}", e)))?;
        self.register_document(retrieval_uri, Document::OpenApi(Box::new(definition)));
        Ok(())
    }

    /// Parses and registers a standalone JSON Schema document from YAML.
    pub fn register_schema_yaml(&mut self, content: &str, retrieval_uri: &str) -> AppResult<()> {
        let raw: Value = serde_yaml::from_str(content)
            .map_err(|e| AppError::InvalidDocument(format!("YAML parse error: {}", e)))?;
        self.register_schema_value(&raw, retrieval_uri)
    }

    /// Parses and registers a standalone JSON Schema document from JSON.
    pub fn register_schema_json(&mut self, content: &str, retrieval_uri: &str) -> AppResult<()> {
        let raw: Value = serde_json::from_str(content)
            .map_err(|e| AppError::InvalidDocument(format!("JSON parse error: {}", e)))?;
        self.register_schema_value(&raw, retrieval_uri)
    }

    /// Registers a standalone schema from an already-decoded value tree.
    pub fn register_schema_value(&mut self, raw: &Value, retrieval_uri: &str) -> AppResult<()> {
        let schema = build_schema(raw)?;
        self.register_document(retrieval_uri, Document::Schema(Box::new(schema)));
        Ok(())
    }

    /// Registers a parsed document under its retrieval URI and declared
    /// identity. Re-registering a known URI replaces the previous document.
    pub fn register_document(&mut self, retrieval_uri: &str, document: Document) {
        let retrieval_key = normalize_base_uri(retrieval_uri);
        let base_str = compute_base_uri(retrieval_uri, document.declared_identity());
        let base_uri = parse_base_url(&base_str);

        let entry = DocumentEntry {
            retrieval_uri: retrieval_key.clone(),
            base_uri,
            document,
        };

        let idx = match self.index.get(&retrieval_key).copied() {
            Some(existing) => {
                warn!(uri = %retrieval_key, "Replacing previously registered document");
                // drop the replaced document's aliases so an identity the
                // new document never declared stops resolving to its slot
                self.index.retain(|_, slot| *slot != existing);
                self.docs[existing] = entry;
                existing
            }
            None => {
                self.docs.push(entry);
                self.docs.len() - 1
            }
        };

        self.index.insert(retrieval_key.clone(), idx);
        if base_str != retrieval_key {
            debug!(uri = %retrieval_key, identity = %base_str, "Indexing document identity alias");
            self.index.insert(base_str, idx);
        }
    }

    /// Looks up a document entry by (normalized) URI.
    pub fn resolve(&self, uri: &str) -> Option<&DocumentEntry> {
        let key = normalize_base_uri(uri);
        self.index.get(&key).map(|idx| &self.docs[*idx])
    }

    /// Looks up an OpenAPI document by URI.
    pub fn resolve_openapi(&self, uri: &str) -> Option<&OpenApiDefinition> {
        self.resolve(uri)
            .and_then(|entry| entry.document.as_openapi())
    }

    /// Looks up a standalone schema document by URI.
    pub fn resolve_schema(&self, uri: &str) -> Option<&Schema> {
        self.resolve(uri)
            .and_then(|entry| entry.document.as_schema())
    }

    /// Iterates over all registered entries in registration order.
    pub fn entries(&self) -> impl Iterator<Item = &DocumentEntry> {
        self.docs.iter()
    }
}
