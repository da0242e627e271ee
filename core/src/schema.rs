#![deny(missing_docs)]

//! # Schema Assembler
//!
//! Builds [`Schema`] nodes from a generic decoded value tree and re-emits
//! them. Assembly performs the normalization the rest of the engine relies
//! on:
//!
//! - explicit/implicit type resolution (enum value kinds, then structural
//!   keyword priority: array > object > numeric > string, defaulting to
//!   `object`),
//! - legacy `nullable` / `x-nullable` folding into the type set,
//! - `const` rewriting into a single-value `enum`,
//! - `oneOf`/`anyOf`/`allOf` partitioning into ref tokens vs inline nodes,
//! - verbatim capture of unrecognized keywords and `x-` extensions.
//!
//! `Serialize`/`Deserialize` for [`Schema`] delegate here so schemas embed
//! naturally in the serde-driven entity shims.

use crate::error::{AppError, AppResult};
use crate::model::{
    AdditionalProperties, Composition, Discriminator, RefOr, Reference, Schema, SchemaObject,
    SchemaType, Type,
};
use indexmap::IndexMap;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Builds a schema node from a decoded value.
///
/// Only a root that is neither an object nor a boolean is a hard failure;
/// malformed nested keywords are preserved verbatim in the custom bag
/// instead of aborting the parse.
pub fn build_schema(value: &Value) -> AppResult<Schema> {
    match value {
        Value::Bool(flag) => Ok(Schema::Bool(*flag)),
        Value::Object(map) => Ok(Schema::Object(Box::new(build_schema_object(map)))),
        other => Err(AppError::InvalidDocument(format!(
            "Schema must be an object or boolean, found {}",
            value_kind_name(other)
        ))),
    }
}

/// Builds a ref-or-schema node: objects carrying `$ref` become references
/// with their sibling `summary`/`description` overrides captured.
pub fn build_ref_or_schema(value: &Value) -> AppResult<RefOr<Schema>> {
    if let Some(reference) = reference_from_value(value) {
        return Ok(RefOr::Ref(reference));
    }
    Ok(RefOr::Inline(build_schema(value)?))
}

/// Extracts a Reference Object from a value if it carries `$ref`.
pub(crate) fn reference_from_value(value: &Value) -> Option<Reference> {
    let map = value.as_object()?;
    let ref_location = map.get("$ref")?.as_str()?.to_string();

    let mut reference = Reference::new(ref_location);
    reference.summary = map
        .get("summary")
        .and_then(|v| v.as_str())
        .map(str::to_string);
    reference.description = map
        .get("description")
        .and_then(|v| v.as_str())
        .map(str::to_string);
    reference.extensions = map
        .iter()
        .filter(|(k, _)| k.starts_with("x-"))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    Some(reference)
}

fn build_schema_object(map: &Map<String, Value>) -> SchemaObject {
    let mut out = SchemaObject::default();
    let mut nullable = false;
    let mut const_value: Option<Value> = None;

    for (key, value) in map {
        match key.as_str() {
            "$schema" => out.dialect = as_string(value),
            "$id" => out.id = as_string(value),
            "$anchor" => out.anchor = as_string(value),
            "$comment" => out.comment = as_string(value),

            "type" => out.schema_type = parse_explicit_type(value),
            "format" => out.format = as_string(value),
            "enum" => {
                if let Some(values) = value.as_array() {
                    out.enum_values = values.clone();
                }
            }
            "const" => const_value = Some(value.clone()),
            "nullable" => nullable = value.as_bool().unwrap_or(false) || nullable,

            "minLength" => out.min_length = value.as_u64(),
            "maxLength" => out.max_length = value.as_u64(),
            "pattern" => out.pattern = as_string(value),
            "contentEncoding" => out.content_encoding = as_string(value),
            "contentMediaType" => out.content_media_type = as_string(value),

            "minimum" => out.minimum = Some(value.clone()),
            "maximum" => out.maximum = Some(value.clone()),
            "exclusiveMinimum" => out.exclusive_minimum = Some(value.clone()),
            "exclusiveMaximum" => out.exclusive_maximum = Some(value.clone()),
            "multipleOf" => out.multiple_of = Some(value.clone()),

            "items" => assign_child(&mut out.items, &mut out.custom, key, value),
            "prefixItems" => {
                out.prefix_items = build_child_list(value, &mut out.custom, key);
            }
            "contains" => assign_child(&mut out.contains, &mut out.custom, key, value),
            "minItems" => out.min_items = value.as_u64(),
            "maxItems" => out.max_items = value.as_u64(),
            "uniqueItems" => out.unique_items = value.as_bool(),

            "properties" => out.properties = build_child_map(value, &mut out.custom, key),
            "patternProperties" => {
                out.pattern_properties = build_child_map(value, &mut out.custom, key);
            }
            "additionalProperties" => match value {
                Value::Bool(flag) => {
                    out.additional_properties =
                        Some(Box::new(AdditionalProperties::Allowed(*flag)));
                }
                _ => match build_ref_or_schema(value) {
                    Ok(node) => {
                        out.additional_properties =
                            Some(Box::new(AdditionalProperties::Schema(node)));
                    }
                    Err(_) => {
                        out.custom.insert(key.clone(), value.clone());
                    }
                },
            },
            "propertyNames" => assign_child(&mut out.property_names, &mut out.custom, key, value),
            "dependentSchemas" => {
                out.dependent_schemas = build_child_map(value, &mut out.custom, key);
            }
            "required" => {
                if let Some(names) = value.as_array() {
                    out.required = names
                        .iter()
                        .filter_map(|v| v.as_str().map(str::to_string))
                        .collect();
                }
            }
            "minProperties" => out.min_properties = value.as_u64(),
            "maxProperties" => out.max_properties = value.as_u64(),
            "$defs" => out.defs = build_child_map(value, &mut out.custom, key),

            "oneOf" => out.one_of = build_composition(value, &mut out.custom, key),
            "anyOf" => out.any_of = build_composition(value, &mut out.custom, key),
            "allOf" => out.all_of = build_composition(value, &mut out.custom, key),
            "not" => assign_child(&mut out.not, &mut out.custom, key, value),

            "if" => assign_child(&mut out.if_schema, &mut out.custom, key, value),
            "then" => assign_child(&mut out.then_schema, &mut out.custom, key, value),
            "else" => assign_child(&mut out.else_schema, &mut out.custom, key, value),

            "title" => out.title = as_string(value),
            "description" => out.description = as_string(value),
            "default" => out.default = Some(value.clone()),
            "examples" => {
                if let Some(values) = value.as_array() {
                    out.examples = values.clone();
                }
            }
            "example" => out.example = Some(value.clone()),
            "deprecated" => out.deprecated = value.as_bool(),
            "readOnly" => out.read_only = value.as_bool(),
            "writeOnly" => out.write_only = value.as_bool(),
            "discriminator" => out.discriminator = build_discriminator(value),
            "xml" => out.xml = Some(value.clone()),

            "x-nullable" => nullable = value.as_bool().unwrap_or(false) || nullable,
            _ if key.starts_with("x-") => {
                out.extensions.insert(key.clone(), value.clone());
            }
            _ => {
                out.custom.insert(key.clone(), value.clone());
            }
        }
    }

    // const collapses into a single-value enum when none is declared
    if let Some(const_val) = const_value {
        if out.enum_values.is_empty() {
            out.enum_values = vec![const_val];
        }
    }

    if out.schema_type.is_none() {
        out.schema_type = Some(infer_schema_type(map, &out.enum_values));
    }
    if nullable {
        out.schema_type = out.schema_type.take().map(SchemaType::with_null);
    }

    out
}

/// Resolves the implicit type of a schema without an explicit `type`.
///
/// Priorities: homogeneous (or null-augmented) enum value kinds, then
/// structural keyword presence (array > object > numeric > string), then
/// `object`.
fn infer_schema_type(map: &Map<String, Value>, enum_values: &[Value]) -> SchemaType {
    if let Some(ty) = infer_from_enum(enum_values) {
        return ty;
    }

    const ARRAY_KEYWORDS: [&str; 6] = [
        "items",
        "prefixItems",
        "contains",
        "minItems",
        "maxItems",
        "uniqueItems",
    ];
    const OBJECT_KEYWORDS: [&str; 8] = [
        "properties",
        "additionalProperties",
        "patternProperties",
        "propertyNames",
        "dependentSchemas",
        "required",
        "minProperties",
        "maxProperties",
    ];
    const NUMERIC_KEYWORDS: [&str; 5] = [
        "minimum",
        "maximum",
        "exclusiveMinimum",
        "exclusiveMaximum",
        "multipleOf",
    ];
    const STRING_KEYWORDS: [&str; 6] = [
        "minLength",
        "maxLength",
        "pattern",
        "contentEncoding",
        "contentMediaType",
        "format",
    ];

    if ARRAY_KEYWORDS.iter().any(|k| map.contains_key(*k)) {
        return SchemaType::Single(Type::Array);
    }
    if OBJECT_KEYWORDS.iter().any(|k| map.contains_key(*k)) {
        return SchemaType::Single(Type::Object);
    }
    if NUMERIC_KEYWORDS.iter().any(|k| map.contains_key(*k)) {
        return SchemaType::Single(Type::Number);
    }
    if STRING_KEYWORDS.iter().any(|k| map.contains_key(*k)) {
        return SchemaType::Single(Type::String);
    }

    SchemaType::Single(Type::Object)
}

fn infer_from_enum(enum_values: &[Value]) -> Option<SchemaType> {
    if enum_values.is_empty() {
        return None;
    }

    let mut kind: Option<Type> = None;
    let mut has_null = false;
    for value in enum_values {
        let value_kind = match value {
            Value::Null => {
                has_null = true;
                continue;
            }
            Value::Bool(_) => Type::Boolean,
            Value::Number(_) => Type::Number,
            Value::String(_) => Type::String,
            Value::Array(_) => Type::Array,
            Value::Object(_) => Type::Object,
        };
        match kind {
            None => kind = Some(value_kind),
            Some(seen) if seen == value_kind => {}
            // heterogeneous enum: give up, fall back to structural inference
            Some(_) => return None,
        }
    }

    match (kind, has_null) {
        (Some(ty), false) => Some(SchemaType::Single(ty)),
        (Some(ty), true) => Some(SchemaType::Single(ty).with_null()),
        (None, true) => Some(SchemaType::Single(Type::Null)),
        (None, false) => None,
    }
}

fn parse_explicit_type(value: &Value) -> Option<SchemaType> {
    match value {
        Value::String(s) => Type::parse(s).map(SchemaType::Single),
        Value::Array(entries) => {
            let types: Vec<Type> = entries
                .iter()
                .filter_map(|v| v.as_str().and_then(Type::parse))
                .collect();
            if types.is_empty() {
                None
            } else {
                Some(SchemaType::Multi(types))
            }
        }
        _ => None,
    }
}

fn build_discriminator(value: &Value) -> Option<Discriminator> {
    let map = value.as_object()?;
    let property_name = map.get("propertyName")?.as_str()?.to_string();
    let mapping = map
        .get("mapping")
        .and_then(|v| v.as_object())
        .map(|m| {
            m.iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                .collect()
        })
        .unwrap_or_default();
    let extensions = map
        .iter()
        .filter(|(k, _)| k.starts_with("x-"))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    Some(Discriminator {
        property_name,
        mapping,
        extensions,
    })
}

fn build_composition(
    value: &Value,
    custom: &mut BTreeMap<String, Value>,
    key: &str,
) -> Option<Composition> {
    let Some(entries) = value.as_array() else {
        custom.insert(key.to_string(), value.clone());
        return None;
    };

    let mut composition = Composition::default();
    for entry in entries {
        if let Some(reference) = reference_from_value(entry) {
            composition.references.push(reference);
            continue;
        }
        match build_schema(entry) {
            Ok(schema) => composition.schemas.push(schema),
            Err(_) => {
                // one malformed entry disqualifies the group; keeping the
                // whole array verbatim means re-emission loses nothing
                custom.insert(key.to_string(), value.clone());
                return None;
            }
        }
    }
    Some(composition)
}

fn assign_child(
    slot: &mut Option<Box<RefOr<Schema>>>,
    custom: &mut BTreeMap<String, Value>,
    key: &str,
    value: &Value,
) {
    match build_ref_or_schema(value) {
        Ok(node) => *slot = Some(Box::new(node)),
        Err(_) => {
            custom.insert(key.to_string(), value.clone());
        }
    }
}

fn build_child_list(
    value: &Value,
    custom: &mut BTreeMap<String, Value>,
    key: &str,
) -> Vec<RefOr<Schema>> {
    let Some(entries) = value.as_array() else {
        custom.insert(key.to_string(), value.clone());
        return Vec::new();
    };
    entries
        .iter()
        .filter_map(|entry| build_ref_or_schema(entry).ok())
        .collect()
}

fn build_child_map(
    value: &Value,
    custom: &mut BTreeMap<String, Value>,
    key: &str,
) -> IndexMap<String, RefOr<Schema>> {
    let Some(map) = value.as_object() else {
        custom.insert(key.to_string(), value.clone());
        return IndexMap::new();
    };
    map.iter()
        .filter_map(|(name, entry)| {
            build_ref_or_schema(entry)
                .ok()
                .map(|node| (name.clone(), node))
        })
        .collect()
}

fn as_string(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

fn value_kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ---------------------------------------------------------------------------
// Re-emission
// ---------------------------------------------------------------------------

/// Re-emits a schema node as a generic value tree.
///
/// Inferred types are written explicitly, so assembling the emitted tree
/// yields an equal IR. Composition groups serialize references before
/// inline schemas (the documented order loss).
pub fn schema_to_value(schema: &Schema) -> Value {
    match schema {
        Schema::Bool(flag) => Value::Bool(*flag),
        Schema::Object(obj) => Value::Object(schema_object_to_map(obj)),
    }
}

/// Re-emits a ref-or-schema node.
pub fn ref_or_schema_to_value(node: &RefOr<Schema>) -> Value {
    match node {
        RefOr::Ref(reference) => serde_json::to_value(reference).unwrap_or(Value::Null),
        RefOr::Inline(schema) => schema_to_value(schema),
    }
}

fn schema_object_to_map(obj: &SchemaObject) -> Map<String, Value> {
    let mut map = Map::new();

    insert_str(&mut map, "$schema", &obj.dialect);
    insert_str(&mut map, "$id", &obj.id);
    insert_str(&mut map, "$anchor", &obj.anchor);
    insert_str(&mut map, "$comment", &obj.comment);

    if let Some(schema_type) = &obj.schema_type {
        let value = match schema_type {
            SchemaType::Single(ty) => Value::String(ty.as_str().to_string()),
            SchemaType::Multi(types) => Value::Array(
                types
                    .iter()
                    .map(|ty| Value::String(ty.as_str().to_string()))
                    .collect(),
            ),
        };
        map.insert("type".to_string(), value);
    }
    insert_str(&mut map, "format", &obj.format);
    if !obj.enum_values.is_empty() {
        map.insert("enum".to_string(), Value::Array(obj.enum_values.clone()));
    }

    insert_u64(&mut map, "minLength", obj.min_length);
    insert_u64(&mut map, "maxLength", obj.max_length);
    insert_str(&mut map, "pattern", &obj.pattern);
    insert_str(&mut map, "contentEncoding", &obj.content_encoding);
    insert_str(&mut map, "contentMediaType", &obj.content_media_type);

    insert_value(&mut map, "minimum", &obj.minimum);
    insert_value(&mut map, "maximum", &obj.maximum);
    insert_value(&mut map, "exclusiveMinimum", &obj.exclusive_minimum);
    insert_value(&mut map, "exclusiveMaximum", &obj.exclusive_maximum);
    insert_value(&mut map, "multipleOf", &obj.multiple_of);

    if let Some(items) = &obj.items {
        map.insert("items".to_string(), ref_or_schema_to_value(items));
    }
    if !obj.prefix_items.is_empty() {
        map.insert(
            "prefixItems".to_string(),
            Value::Array(obj.prefix_items.iter().map(ref_or_schema_to_value).collect()),
        );
    }
    if let Some(contains) = &obj.contains {
        map.insert("contains".to_string(), ref_or_schema_to_value(contains));
    }
    insert_u64(&mut map, "minItems", obj.min_items);
    insert_u64(&mut map, "maxItems", obj.max_items);
    if let Some(unique) = obj.unique_items {
        map.insert("uniqueItems".to_string(), Value::Bool(unique));
    }

    insert_child_map(&mut map, "properties", &obj.properties);
    insert_child_map(&mut map, "patternProperties", &obj.pattern_properties);
    if let Some(additional) = &obj.additional_properties {
        let value = match additional.as_ref() {
            AdditionalProperties::Allowed(flag) => Value::Bool(*flag),
            AdditionalProperties::Schema(node) => ref_or_schema_to_value(node),
        };
        map.insert("additionalProperties".to_string(), value);
    }
    if let Some(property_names) = &obj.property_names {
        map.insert(
            "propertyNames".to_string(),
            ref_or_schema_to_value(property_names),
        );
    }
    insert_child_map(&mut map, "dependentSchemas", &obj.dependent_schemas);
    if !obj.required.is_empty() {
        map.insert(
            "required".to_string(),
            Value::Array(
                obj.required
                    .iter()
                    .map(|name| Value::String(name.clone()))
                    .collect(),
            ),
        );
    }
    insert_u64(&mut map, "minProperties", obj.min_properties);
    insert_u64(&mut map, "maxProperties", obj.max_properties);
    insert_child_map(&mut map, "$defs", &obj.defs);

    insert_composition(&mut map, "oneOf", &obj.one_of);
    insert_composition(&mut map, "anyOf", &obj.any_of);
    insert_composition(&mut map, "allOf", &obj.all_of);
    if let Some(not) = &obj.not {
        map.insert("not".to_string(), ref_or_schema_to_value(not));
    }

    if let Some(if_schema) = &obj.if_schema {
        map.insert("if".to_string(), ref_or_schema_to_value(if_schema));
    }
    if let Some(then_schema) = &obj.then_schema {
        map.insert("then".to_string(), ref_or_schema_to_value(then_schema));
    }
    if let Some(else_schema) = &obj.else_schema {
        map.insert("else".to_string(), ref_or_schema_to_value(else_schema));
    }

    insert_str(&mut map, "title", &obj.title);
    insert_str(&mut map, "description", &obj.description);
    insert_value(&mut map, "default", &obj.default);
    if !obj.examples.is_empty() {
        map.insert("examples".to_string(), Value::Array(obj.examples.clone()));
    }
    insert_value(&mut map, "example", &obj.example);
    if let Some(deprecated) = obj.deprecated {
        map.insert("deprecated".to_string(), Value::Bool(deprecated));
    }
    if let Some(read_only) = obj.read_only {
        map.insert("readOnly".to_string(), Value::Bool(read_only));
    }
    if let Some(write_only) = obj.write_only {
        map.insert("writeOnly".to_string(), Value::Bool(write_only));
    }
    if let Some(discriminator) = &obj.discriminator {
        let mut disc = Map::new();
        disc.insert(
            "propertyName".to_string(),
            Value::String(discriminator.property_name.clone()),
        );
        if !discriminator.mapping.is_empty() {
            disc.insert(
                "mapping".to_string(),
                Value::Object(
                    discriminator
                        .mapping
                        .iter()
                        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                        .collect(),
                ),
            );
        }
        for (k, v) in &discriminator.extensions {
            disc.insert(k.clone(), v.clone());
        }
        map.insert("discriminator".to_string(), Value::Object(disc));
    }
    insert_value(&mut map, "xml", &obj.xml);

    for (key, value) in &obj.custom {
        map.insert(key.clone(), value.clone());
    }
    for (key, value) in &obj.extensions {
        map.insert(key.clone(), value.clone());
    }

    map
}

fn insert_composition(map: &mut Map<String, Value>, key: &str, group: &Option<Composition>) {
    let Some(group) = group else {
        return;
    };
    if group.is_empty() {
        map.insert(key.to_string(), Value::Array(Vec::new()));
        return;
    }
    let mut entries: Vec<Value> = group
        .references
        .iter()
        .map(|r| serde_json::to_value(r).unwrap_or(Value::Null))
        .collect();
    entries.extend(group.schemas.iter().map(schema_to_value));
    map.insert(key.to_string(), Value::Array(entries));
}

fn insert_child_map(
    map: &mut Map<String, Value>,
    key: &str,
    children: &IndexMap<String, RefOr<Schema>>,
) {
    if children.is_empty() {
        return;
    }
    map.insert(
        key.to_string(),
        Value::Object(
            children
                .iter()
                .map(|(name, node)| (name.clone(), ref_or_schema_to_value(node)))
                .collect(),
        ),
    );
}

fn insert_str(map: &mut Map<String, Value>, key: &str, value: &Option<String>) {
    if let Some(value) = value {
        map.insert(key.to_string(), Value::String(value.clone()));
    }
}

fn insert_u64(map: &mut Map<String, Value>, key: &str, value: Option<u64>) {
    if let Some(value) = value {
        map.insert(key.to_string(), Value::Number(value.into()));
    }
}

fn insert_value(map: &mut Map<String, Value>, key: &str, value: &Option<Value>) {
    if let Some(value) = value {
        map.insert(key.to_string(), value.clone());
    }
}

impl Serialize for Schema {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        schema_to_value(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Schema {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        build_schema(&raw).map_err(|e| DeError::custom(format!("{}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_explicit_type_wins_over_structure() {
        let schema = build_schema(&json!({ "type": "string", "properties": { "x": {} } })).unwrap();
        let obj = schema.as_object().unwrap();
        assert_eq!(obj.schema_type, Some(SchemaType::Single(Type::String)));
    }

    #[test]
    fn test_enum_infers_number() {
        let schema = build_schema(&json!({ "enum": [1, 2, 3] })).unwrap();
        let obj = schema.as_object().unwrap();
        assert_eq!(obj.schema_type, Some(SchemaType::Single(Type::Number)));
    }

    #[test]
    fn test_enum_infers_null_augmented_string() {
        let schema = build_schema(&json!({ "enum": ["a", null] })).unwrap();
        let obj = schema.as_object().unwrap();
        assert_eq!(
            obj.schema_type,
            Some(SchemaType::Multi(vec![Type::String, Type::Null]))
        );
    }

    #[test]
    fn test_properties_infer_object() {
        let schema = build_schema(&json!({ "properties": { "x": {} } })).unwrap();
        let obj = schema.as_object().unwrap();
        assert_eq!(obj.schema_type, Some(SchemaType::Single(Type::Object)));
        assert!(obj.properties.contains_key("x"));
    }

    #[test]
    fn test_empty_schema_defaults_to_object() {
        let schema = build_schema(&json!({})).unwrap();
        let obj = schema.as_object().unwrap();
        assert_eq!(obj.schema_type, Some(SchemaType::Single(Type::Object)));
    }

    #[test]
    fn test_structural_priority_array_over_string() {
        let schema = build_schema(&json!({ "minItems": 1, "pattern": "a" })).unwrap();
        let obj = schema.as_object().unwrap();
        assert_eq!(obj.schema_type, Some(SchemaType::Single(Type::Array)));
    }

    #[test]
    fn test_legacy_nullable_extends_type_set() {
        let schema = build_schema(&json!({ "type": "string", "nullable": true })).unwrap();
        let obj = schema.as_object().unwrap();
        assert_eq!(
            obj.schema_type,
            Some(SchemaType::Multi(vec![Type::String, Type::Null]))
        );
    }

    #[test]
    fn test_nullable_is_idempotent() {
        // a type array that already carries null does not get a second one
        let schema = build_schema(&json!({
            "type": ["string", "null"],
            "x-nullable": true
        }))
        .unwrap();
        let obj = schema.as_object().unwrap();
        assert_eq!(
            obj.schema_type,
            Some(SchemaType::Multi(vec![Type::String, Type::Null]))
        );
    }

    #[test]
    fn test_const_collapses_into_enum() {
        let schema = build_schema(&json!({ "const": "fixed" })).unwrap();
        let obj = schema.as_object().unwrap();
        assert_eq!(obj.enum_values, vec![json!("fixed")]);
        assert_eq!(obj.schema_type, Some(SchemaType::Single(Type::String)));
    }

    #[test]
    fn test_composition_partitions_refs_and_inline() {
        let schema = build_schema(&json!({
            "oneOf": [
                { "$ref": "#/components/schemas/Cat" },
                { "type": "string" },
                { "$ref": "#/components/schemas/Dog" }
            ]
        }))
        .unwrap();
        let obj = schema.as_object().unwrap();
        let one_of = obj.one_of.as_ref().unwrap();
        assert_eq!(one_of.references.len(), 2);
        assert_eq!(one_of.schemas.len(), 1);
    }

    #[test]
    fn test_composition_with_malformed_entry_kept_verbatim() {
        let raw = json!({
            "oneOf": [
                { "type": "string" },
                42
            ]
        });
        let schema = build_schema(&raw).unwrap();
        let obj = schema.as_object().unwrap();
        assert!(obj.one_of.is_none());
        assert_eq!(obj.custom.get("oneOf"), raw.get("oneOf"));
        // re-emission reproduces the array, valid entries included
        assert_eq!(schema_to_value(&schema).get("oneOf"), raw.get("oneOf"));
    }

    #[test]
    fn test_custom_keywords_survive_round_trip() {
        let raw = json!({
            "type": "string",
            "futureKeyword": { "anything": [1, 2] },
            "x-vendor": true
        });
        let schema = build_schema(&raw).unwrap();
        let obj = schema.as_object().unwrap();
        assert!(obj.custom.contains_key("futureKeyword"));
        assert!(obj.extensions.contains_key("x-vendor"));

        let emitted = schema_to_value(&schema);
        assert_eq!(emitted.get("futureKeyword"), raw.get("futureKeyword"));
        assert_eq!(emitted.get("x-vendor"), raw.get("x-vendor"));
    }

    #[test]
    fn test_boolean_schemas_are_first_class() {
        assert_eq!(build_schema(&json!(true)).unwrap(), Schema::Bool(true));
        assert_eq!(build_schema(&json!(false)).unwrap(), Schema::Bool(false));
        assert_eq!(schema_to_value(&Schema::Bool(true)), json!(true));
    }

    #[test]
    fn test_non_object_root_is_hard_failure() {
        assert!(build_schema(&json!("nope")).is_err());
        assert!(build_schema(&json!(42)).is_err());
    }

    #[test]
    fn test_ref_with_sibling_overrides() {
        let node = build_ref_or_schema(&json!({
            "$ref": "#/components/schemas/User",
            "description": "local override",
            "x-site": 1
        }))
        .unwrap();
        let reference = node.as_ref_obj().unwrap();
        assert_eq!(reference.ref_location, "#/components/schemas/User");
        assert_eq!(reference.description.as_deref(), Some("local override"));
        assert!(reference.extensions.contains_key("x-site"));
    }

    #[test]
    fn test_round_trip_is_stable() {
        let raw = json!({
            "properties": {
                "id": { "type": "string", "format": "uuid" },
                "tags": { "items": { "type": "string" } }
            },
            "required": ["id"]
        });
        let first = build_schema(&raw).unwrap();
        let second = build_schema(&schema_to_value(&first)).unwrap();
        assert_eq!(first, second);
    }
}
