#![deny(missing_docs)]

//! # oaslink-core
//!
//! A multi-document OpenAPI 3.x / JSON Schema 2020-12 linking engine.
//!
//! Documents are parsed from YAML or JSON into a typed representation,
//! registered in a [`registry::DocumentRegistry`] under their retrieval URI
//! and declared identity, then run through a resolution pass that replaces
//! structural `$ref`s with their targets across document boundaries.
//!
//! Resolution is total: malformed references, missing targets and cycles
//! degrade locally (kept refs or placeholder stubs) instead of failing the
//! document.
//!
//! ## Quick start
//!
//! ```
//! use oaslink_core::document::parse_openapi_document;
//!
//! let resolved = parse_openapi_document(r##"
//! openapi: 3.1.0
//! info: { title: Pets, version: "1.0.0" }
//! paths:
//!   /pets:
//!     get:
//!       responses:
//!         "200":
//!           $ref: "#/components/responses/PetList"
//! components:
//!   responses:
//!     PetList: { description: a list of pets }
//! "##).unwrap();
//!
//! let pets = &resolved.paths.as_ref().unwrap().items["/pets"];
//! let ok = pets.get.as_ref().unwrap().responses["200"].as_inline().unwrap();
//! assert_eq!(ok.description.as_deref(), Some("a list of pets"));
//! ```

pub mod document;
pub mod error;
pub mod model;
pub mod registry;
pub mod resolver;
pub mod schema;
pub mod uri;
pub mod validation;

pub use document::{
    parse_openapi_document, parse_openapi_document_with_registry, parse_schema_document,
    resolve_document,
};
pub use error::{AppError, AppResult};
pub use model::{Document, OpenApiDefinition, RefOr, Reference, Schema};
pub use registry::DocumentRegistry;
pub use resolver::{resolve_component, resolve_schema_ref, ResolveContext};
pub use validation::{validate, Severity, ValidationIssue};
