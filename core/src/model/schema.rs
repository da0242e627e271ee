#![deny(missing_docs)]

//! # Schema IR
//!
//! Typed representation of JSON Schema 2020-12 nodes as used inside OpenAPI
//! documents. Boolean schemas are first-class; structured schemas keep an
//! open custom-keyword bag so unrecognized keywords survive a round trip.
//!
//! (De)serialization for these types is implemented by the schema assembler
//! (`crate::schema`), which also performs implicit type inference.

use super::{RefOr, Reference};
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::BTreeMap;

/// A schema node: boolean form or structured object form.
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    /// `true` (accept anything) or `false` (accept nothing).
    Bool(bool),
    /// A structured schema object.
    Object(Box<SchemaObject>),
}

impl Schema {
    /// Returns the structured form, if any.
    pub fn as_object(&self) -> Option<&SchemaObject> {
        match self {
            Schema::Object(obj) => Some(obj),
            Schema::Bool(_) => None,
        }
    }

    /// Builds an empty structured schema with the given single type.
    pub fn with_type(ty: Type) -> Self {
        Schema::Object(Box::new(SchemaObject {
            schema_type: Some(SchemaType::Single(ty)),
            ..SchemaObject::default()
        }))
    }
}

impl Default for Schema {
    fn default() -> Self {
        Schema::Object(Box::default())
    }
}

/// The primitive type names of JSON Schema 2020-12.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    /// `"null"`
    Null,
    /// `"boolean"`
    Boolean,
    /// `"object"`
    Object,
    /// `"array"`
    Array,
    /// `"number"`
    Number,
    /// `"integer"`
    Integer,
    /// `"string"`
    String,
}

impl Type {
    /// The keyword spelling of the type.
    pub fn as_str(self) -> &'static str {
        match self {
            Type::Null => "null",
            Type::Boolean => "boolean",
            Type::Object => "object",
            Type::Array => "array",
            Type::Number => "number",
            Type::Integer => "integer",
            Type::String => "string",
        }
    }

    /// Parses a type keyword.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "null" => Some(Type::Null),
            "boolean" => Some(Type::Boolean),
            "object" => Some(Type::Object),
            "array" => Some(Type::Array),
            "number" => Some(Type::Number),
            "integer" => Some(Type::Integer),
            "string" => Some(Type::String),
            _ => None,
        }
    }
}

/// A type set: a single type or a multi-valued union (nullability included).
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaType {
    /// `type: string`
    Single(Type),
    /// `type: [string, "null"]`
    Multi(Vec<Type>),
}

impl SchemaType {
    /// Whether the set contains the given type.
    pub fn contains(&self, ty: Type) -> bool {
        match self {
            SchemaType::Single(t) => *t == ty,
            SchemaType::Multi(ts) => ts.contains(&ty),
        }
    }

    /// Adds `"null"` to the set, idempotently.
    pub fn with_null(self) -> Self {
        if self.contains(Type::Null) {
            return self;
        }
        match self {
            SchemaType::Single(t) => SchemaType::Multi(vec![t, Type::Null]),
            SchemaType::Multi(mut ts) => {
                ts.push(Type::Null);
                SchemaType::Multi(ts)
            }
        }
    }
}

/// `additionalProperties`: a boolean policy or a schema.
#[derive(Debug, Clone, PartialEq)]
pub enum AdditionalProperties {
    /// `additionalProperties: true | false`
    Allowed(bool),
    /// `additionalProperties: {...}` or a `$ref`.
    Schema(RefOr<Schema>),
}

/// One composition group (`oneOf` / `anyOf` / `allOf`), split into reference
/// tokens and inline schema nodes.
///
/// The interleaving order between the two lists is not preserved; references
/// serialize before inline schemas.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Composition {
    /// Entries that are exactly a `$ref`.
    pub references: Vec<Reference>,
    /// Inline schema entries.
    pub schemas: Vec<Schema>,
}

impl Composition {
    /// Whether the group is empty.
    pub fn is_empty(&self) -> bool {
        self.references.is_empty() && self.schemas.is_empty()
    }
}

/// Discriminator object for polymorphic composition.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Discriminator {
    /// The property whose value selects a variant.
    pub property_name: String,
    /// Optional mapping of property values to schema names or refs.
    pub mapping: IndexMap<String, String>,
    /// Specification extensions (`x-...`).
    pub extensions: BTreeMap<String, Value>,
}

/// A structured schema object.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SchemaObject {
    /// `$schema` dialect declaration.
    pub dialect: Option<String>,
    /// `$id` — the schema's own identity URI.
    pub id: Option<String>,
    /// `$anchor` — plain-name fragment target.
    pub anchor: Option<String>,
    /// `$comment`.
    pub comment: Option<String>,

    /// The (possibly inferred) type set.
    pub schema_type: Option<SchemaType>,
    /// `format` modifier.
    pub format: Option<String>,
    /// `enum` values.
    pub enum_values: Vec<Value>,

    // string constraints
    /// `minLength`.
    pub min_length: Option<u64>,
    /// `maxLength`.
    pub max_length: Option<u64>,
    /// `pattern`.
    pub pattern: Option<String>,
    /// `contentEncoding`.
    pub content_encoding: Option<String>,
    /// `contentMediaType`.
    pub content_media_type: Option<String>,

    // numeric constraints
    /// `minimum`.
    pub minimum: Option<Value>,
    /// `maximum`.
    pub maximum: Option<Value>,
    /// `exclusiveMinimum`.
    pub exclusive_minimum: Option<Value>,
    /// `exclusiveMaximum`.
    pub exclusive_maximum: Option<Value>,
    /// `multipleOf`.
    pub multiple_of: Option<Value>,

    // array shape
    /// `items`.
    pub items: Option<Box<RefOr<Schema>>>,
    /// `prefixItems`.
    pub prefix_items: Vec<RefOr<Schema>>,
    /// `contains`.
    pub contains: Option<Box<RefOr<Schema>>>,
    /// `minItems`.
    pub min_items: Option<u64>,
    /// `maxItems`.
    pub max_items: Option<u64>,
    /// `uniqueItems`.
    pub unique_items: Option<bool>,

    // object shape
    /// `properties`.
    pub properties: IndexMap<String, RefOr<Schema>>,
    /// `patternProperties`.
    pub pattern_properties: IndexMap<String, RefOr<Schema>>,
    /// `additionalProperties`.
    pub additional_properties: Option<Box<AdditionalProperties>>,
    /// `propertyNames`.
    pub property_names: Option<Box<RefOr<Schema>>>,
    /// `dependentSchemas`.
    pub dependent_schemas: IndexMap<String, RefOr<Schema>>,
    /// `required` property names.
    pub required: Vec<String>,
    /// `minProperties`.
    pub min_properties: Option<u64>,
    /// `maxProperties`.
    pub max_properties: Option<u64>,
    /// `$defs` embedded definitions.
    pub defs: IndexMap<String, RefOr<Schema>>,

    // composition
    /// `oneOf` group.
    pub one_of: Option<Composition>,
    /// `anyOf` group.
    pub any_of: Option<Composition>,
    /// `allOf` group.
    pub all_of: Option<Composition>,
    /// `not`.
    pub not: Option<Box<RefOr<Schema>>>,

    // conditionals
    /// `if`.
    pub if_schema: Option<Box<RefOr<Schema>>>,
    /// `then`.
    pub then_schema: Option<Box<RefOr<Schema>>>,
    /// `else`.
    pub else_schema: Option<Box<RefOr<Schema>>>,

    // metadata
    /// `title`.
    pub title: Option<String>,
    /// `description`.
    pub description: Option<String>,
    /// `default`.
    pub default: Option<Value>,
    /// `examples` (2020-12 array form).
    pub examples: Vec<Value>,
    /// `example` (legacy single form).
    pub example: Option<Value>,
    /// `deprecated`.
    pub deprecated: Option<bool>,
    /// `readOnly`.
    pub read_only: Option<bool>,
    /// `writeOnly`.
    pub write_only: Option<bool>,
    /// `discriminator`.
    pub discriminator: Option<Discriminator>,
    /// `xml` metadata, kept raw.
    pub xml: Option<Value>,

    /// Unrecognized non-extension keywords, preserved verbatim.
    pub custom: BTreeMap<String, Value>,
    /// Specification extensions (`x-...`).
    pub extensions: BTreeMap<String, Value>,
}

impl SchemaObject {
    /// Whether the type set includes `"null"`.
    pub fn is_nullable(&self) -> bool {
        self.schema_type
            .as_ref()
            .map(|t| t.contains(Type::Null))
            .unwrap_or(false)
    }
}
