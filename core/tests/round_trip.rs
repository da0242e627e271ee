use oaslink_core::document::parse_openapi_root;
use oaslink_core::model::{OpenApiDefinition, SchemaType, Type};
use oaslink_core::schema::{build_schema, schema_to_value};
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn test_document_round_trip_preserves_extensions_everywhere() {
    let doc = r##"
openapi: 3.1.0
x-root-level: keep me
info:
  title: Round Trip
  version: "1.0.0"
  x-info-level: also kept
paths:
  x-paths-level: and me
  /users/{id}:
    x-path-item-level: true
    get:
      x-operation-level: true
      operationId: getUser
      parameters:
        - name: id
          in: path
          required: true
          schema: { type: string }
          x-parameter-level: "indeed"
      responses:
        "200":
          description: ok
          x-response-level: naturally
components:
  x-components-level: of course
  schemas:
    User:
      type: object
      x-schema-level: certainly
"##;
    let parsed = parse_openapi_root(doc).unwrap();
    let emitted = serde_json::to_value(&parsed).unwrap();
    let reparsed: OpenApiDefinition = serde_json::from_value(emitted).unwrap();
    assert_eq!(parsed, reparsed);

    assert_eq!(parsed.extensions["x-root-level"], json!("keep me"));
    assert_eq!(
        parsed.info.as_ref().unwrap().extensions["x-info-level"],
        json!("also kept")
    );
    let paths = parsed.paths.as_ref().unwrap();
    assert_eq!(paths.extensions["x-paths-level"], json!("and me"));
    let item = &paths.items["/users/{id}"];
    assert_eq!(item.extensions["x-path-item-level"], json!(true));
    let operation = item.get.as_ref().unwrap();
    assert_eq!(operation.extensions["x-operation-level"], json!(true));
}

#[test]
fn test_schema_normalizations_are_stable_under_reemission() {
    // nullable folding, const collapsing and type inference must all be
    // idempotent: emitting and re-assembling yields the identical node
    let raws = [
        json!({ "type": "string", "nullable": true }),
        json!({ "const": 7 }),
        json!({ "enum": ["a", "b", null] }),
        json!({ "properties": { "x": { "minItems": 2 } } }),
        json!({ "minLength": 1, "x-vendor": { "deep": [true] } }),
        json!(false),
    ];
    for raw in raws {
        let first = build_schema(&raw).unwrap();
        let second = build_schema(&schema_to_value(&first)).unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn test_nullable_emits_as_type_array() {
    let schema = build_schema(&json!({ "type": "integer", "nullable": true })).unwrap();
    let emitted = schema_to_value(&schema);
    assert_eq!(emitted["type"], json!(["integer", "null"]));
    assert!(emitted.get("nullable").is_none());
}

#[test]
fn test_const_emits_as_enum() {
    let schema = build_schema(&json!({ "const": "only" })).unwrap();
    let emitted = schema_to_value(&schema);
    assert_eq!(emitted["enum"], json!(["only"]));
    assert!(emitted.get("const").is_none());
}

#[test]
fn test_inferred_type_is_written_explicitly() {
    let schema = build_schema(&json!({ "properties": { "a": {} } })).unwrap();
    let emitted = schema_to_value(&schema);
    assert_eq!(emitted["type"], json!("object"));
}

#[test]
fn test_composition_order_within_groups_is_preserved() {
    let schema = build_schema(&json!({
        "anyOf": [
            { "$ref": "#/components/schemas/B" },
            { "type": "string" },
            { "$ref": "#/components/schemas/A" },
            { "type": "number" }
        ]
    }))
    .unwrap();
    let emitted = schema_to_value(&schema);
    let entries = emitted["anyOf"].as_array().unwrap();
    // refs come first in their original order, then inline schemas in theirs
    assert_eq!(entries[0]["$ref"], json!("#/components/schemas/B"));
    assert_eq!(entries[1]["$ref"], json!("#/components/schemas/A"));
    assert_eq!(entries[2]["type"], json!("string"));
    assert_eq!(entries[3]["type"], json!("number"));
}

#[test]
fn test_unknown_keywords_round_trip_verbatim() {
    let raw = json!({
        "type": "object",
        "unevaluatedProperties": false,
        "$dynamicAnchor": "meta",
        "properties": { "x": { "type": "string" } }
    });
    let schema = build_schema(&raw).unwrap();
    let emitted = schema_to_value(&schema);
    assert_eq!(emitted["unevaluatedProperties"], json!(false));
    assert_eq!(emitted["$dynamicAnchor"], json!("meta"));
}

#[test]
fn test_multi_type_declaration_survives() {
    let schema = build_schema(&json!({ "type": ["string", "integer"] })).unwrap();
    assert_eq!(
        schema.as_object().unwrap().schema_type,
        Some(SchemaType::Multi(vec![Type::String, Type::Integer]))
    );
    let emitted = schema_to_value(&schema);
    assert_eq!(emitted["type"], json!(["string", "integer"]));
}
