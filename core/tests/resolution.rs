use oaslink_core::document::{parse_openapi_document, parse_openapi_document_with_registry};
use oaslink_core::model::{RefOr, Reference, Response};
use oaslink_core::registry::DocumentRegistry;
use oaslink_core::resolver::{resolve_component, ResolveContext};
use oaslink_core::validation::{validate, Severity};
use pretty_assertions::assert_eq;
use std::fmt::Write as _;

#[test]
fn test_long_acyclic_chain_is_cut_at_depth_ceiling() {
    // 1000 hops: termination matters more than the answer
    let mut components = String::from("components:\n  responses:\n");
    for i in 0..1000 {
        let _ = writeln!(components, "    R{}:", i);
        let _ = writeln!(components, "      $ref: \"#/components/responses/R{}\"", i + 1);
    }
    components.push_str("    R1000:\n      description: the end\n");

    let doc = format!(
        "openapi: 3.1.0\ninfo: {{ title: T, version: \"1\" }}\npaths:\n  /x:\n    get:\n      responses:\n        \"200\":\n          $ref: \"#/components/responses/R0\"\n{}",
        components
    );
    let resolved = parse_openapi_document(&doc).unwrap();
    let response = resolved.paths.as_ref().unwrap().items["/x"]
        .get
        .as_ref()
        .unwrap()
        .responses["200"]
        .as_inline()
        .unwrap();
    // beyond the depth ceiling the ref degrades to a stub
    assert!(response.is_unresolved_stub());
}

#[test]
fn test_two_document_cycle_terminates() {
    let doc_a = r##"
openapi: 3.1.0
info: { title: A, version: "1" }
paths: {}
components:
  responses:
    Ping:
      $ref: "https://example.com/b.yaml#/components/responses/Pong"
"##;
    let doc_b = r##"
openapi: 3.1.0
info: { title: B, version: "1" }
paths: {}
components:
  responses:
    Pong:
      $ref: "https://example.com/a.yaml#/components/responses/Ping"
"##;
    let mut registry = DocumentRegistry::new();
    registry
        .register_openapi_yaml(doc_a, "https://example.com/a.yaml")
        .unwrap();
    registry
        .register_openapi_yaml(doc_b, "https://example.com/b.yaml")
        .unwrap();

    let entry = registry.resolve("https://example.com/a.yaml").unwrap();
    let definition = entry.document.as_openapi().unwrap();
    let ctx = ResolveContext {
        base: entry.base_uri.as_ref(),
        registry: Some(&registry),
    };
    let reference = Reference::new("#/components/responses/Ping");
    let resolved: RefOr<Response> =
        resolve_component(&reference, definition.components.as_ref(), ctx).unwrap();
    // the cycle is cut; the entity comes back as found, still a reference
    assert!(resolved.is_ref());
}

#[test]
fn test_self_identity_used_for_relative_resolution() {
    // the document is registered under a mirror URI but declares $self;
    // relative refs must resolve against the declared identity
    let shared = r##"
openapi: 3.1.0
info: { title: Shared, version: "1" }
paths: {}
components:
  responses:
    Ok: { description: from canonical location }
"##;
    let main = r##"
openapi: 3.2.0
$self: https://api.example.com/v2/main.yaml
info: { title: Main, version: "1" }
paths:
  /thing:
    get:
      responses:
        "200":
          $ref: "./shared.yaml#/components/responses/Ok"
"##;
    let mut registry = DocumentRegistry::new();
    registry
        .register_openapi_yaml(shared, "https://api.example.com/v2/shared.yaml")
        .unwrap();
    let resolved = parse_openapi_document_with_registry(
        main,
        "https://mirror.example.net/elsewhere/main.yaml",
        &mut registry,
    )
    .unwrap();
    let response = resolved.paths.as_ref().unwrap().items["/thing"]
        .get
        .as_ref()
        .unwrap()
        .responses["200"]
        .as_inline()
        .unwrap();
    assert_eq!(
        response.description.as_deref(),
        Some("from canonical location")
    );
}

#[test]
fn test_relative_and_absolute_refs_resolve_identically() {
    let shared = r##"
openapi: 3.1.0
info: { title: Shared, version: "1" }
paths: {}
components:
  parameters:
    Limit: { name: limit, in: query }
"##;
    let main = r##"
openapi: 3.1.0
info: { title: Main, version: "1" }
paths:
  /a:
    get:
      parameters:
        - $ref: "./shared.yaml#/components/parameters/Limit"
      responses:
        "200": { description: ok }
  /b:
    get:
      parameters:
        - $ref: "https://example.com/specs/shared.yaml#/components/parameters/Limit"
      responses:
        "200": { description: ok }
"##;
    let mut registry = DocumentRegistry::new();
    registry
        .register_openapi_yaml(shared, "https://example.com/specs/shared.yaml")
        .unwrap();
    let resolved = parse_openapi_document_with_registry(
        main,
        "https://example.com/specs/main.yaml",
        &mut registry,
    )
    .unwrap();
    let paths = &resolved.paths.as_ref().unwrap().items;
    let via_relative = &paths["/a"].get.as_ref().unwrap().parameters[0];
    let via_absolute = &paths["/b"].get.as_ref().unwrap().parameters[0];
    assert_eq!(via_relative, via_absolute);
    assert_eq!(via_relative.as_inline().unwrap().name, "limit");
}

#[test]
fn test_unregistered_document_ref_kept_unresolved() {
    let main = r##"
openapi: 3.1.0
info: { title: Main, version: "1" }
paths:
  /a:
    get:
      parameters:
        - $ref: "./never-registered.yaml#/components/parameters/Limit"
      responses:
        "200": { description: ok }
"##;
    let mut registry = DocumentRegistry::new();
    let resolved = parse_openapi_document_with_registry(
        main,
        "https://example.com/main.yaml",
        &mut registry,
    )
    .unwrap();
    let parameter = &resolved.paths.as_ref().unwrap().items["/a"]
        .get
        .as_ref()
        .unwrap()
        .parameters[0];
    assert!(parameter.is_ref());
}

#[test]
fn test_sibling_summary_and_description_override() {
    let doc = r##"
openapi: 3.1.0
info: { title: T, version: "1" }
paths: {}
components:
  examples:
    Shared:
      summary: target summary
      description: target description
      value: 42
    Borrowed:
      $ref: "#/components/examples/Shared"
      summary: site summary
"##;
    let resolved = parse_openapi_document(doc).unwrap();
    let components = resolved.components.as_ref().unwrap();
    // components tables themselves are left unresolved by the pass
    assert!(components.examples["Borrowed"].is_ref());

    // but resolving the position on demand applies the overrides
    let reference = Reference::new("#/components/examples/Borrowed");
    let resolved_example: RefOr<oaslink_core::model::ExampleObject> =
        resolve_component(&reference, Some(components), ResolveContext::default()).unwrap();
    let example = resolved_example.as_inline().unwrap();
    assert_eq!(example.summary.as_deref(), Some("site summary"));
    assert_eq!(example.description.as_deref(), Some("target description"));
    assert_eq!(example.value, Some(serde_json::json!(42)));
}

#[test]
fn test_last_registration_wins() {
    let v1 = r##"
openapi: 3.1.0
info: { title: T, version: "1" }
paths: {}
components:
  responses:
    Ok: { description: first }
"##;
    let v2 = r##"
openapi: 3.1.0
info: { title: T, version: "1" }
paths: {}
components:
  responses:
    Ok: { description: second }
"##;
    let main = r##"
openapi: 3.1.0
info: { title: Main, version: "1" }
paths:
  /x:
    get:
      responses:
        "200":
          $ref: "https://example.com/shared.yaml#/components/responses/Ok"
"##;
    let mut registry = DocumentRegistry::new();
    registry
        .register_openapi_yaml(v1, "https://example.com/shared.yaml")
        .unwrap();
    registry
        .register_openapi_yaml(v2, "https://example.com/shared.yaml")
        .unwrap();
    let resolved = parse_openapi_document_with_registry(
        main,
        "https://example.com/main.yaml",
        &mut registry,
    )
    .unwrap();
    let response = resolved.paths.as_ref().unwrap().items["/x"]
        .get
        .as_ref()
        .unwrap()
        .responses["200"]
        .as_inline()
        .unwrap();
    assert_eq!(response.description.as_deref(), Some("second"));
}

#[test]
fn test_validation_reports_stubbed_responses() {
    let doc = r##"
openapi: 3.1.0
info: { title: T, version: "1" }
paths:
  /x:
    get:
      responses:
        "200":
          $ref: "#/components/responses/Gone"
"##;
    let resolved = parse_openapi_document(doc).unwrap();
    let issues = validate(&resolved);
    assert!(issues
        .iter()
        .any(|i| i.severity == Severity::Warning && i.message.contains("could not be resolved")));
}
