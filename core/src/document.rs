#![deny(missing_docs)]

//! # Document Assembly
//!
//! The top-level entry points: parse a document and run the resolution pass
//! over it. The pass produces a resolved copy of the definition in which
//! every structural `$ref` (path items, parameters, request bodies,
//! responses, headers, links, examples, callbacks, media types) has been
//! replaced by its target, with sibling overrides applied.
//!
//! Schema `$ref`s are deliberately left intact: inlining them would lose
//! identity and explode cyclic graphs. They remain resolvable on demand
//! through [`crate::resolver::resolve_schema_ref`].
//!
//! An unresolvable response ref degrades to a placeholder stub; any other
//! unresolvable ref is kept as-is. Nothing in this pass fails.

use crate::error::{AppError, AppResult};
use crate::model::{
    Callback, Components, ExampleObject, Header, Link, MediaTypeObject, OpenApiDefinition,
    Operation, Parameter, PathItem, Paths, RefOr, Response, Schema, Webhooks,
};
use crate::registry::DocumentRegistry;
use crate::resolver::{
    resolve_component, resolve_path_item_ref, resolve_ref_or, ResolveContext,
};
use crate::schema::build_schema;
use crate::validation::validate_openapi_root;
use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

/// Parses and resolves a self-contained OpenAPI document (YAML or JSON
/// text). Cross-document refs are kept unresolved since no registry is in
/// scope.
pub fn parse_openapi_document(content: &str) -> AppResult<OpenApiDefinition> {
    let definition = parse_openapi_root(content)?;
    let resolved = resolve_document(&definition, ResolveContext::default());
    Ok(resolved)
}

/// Parses an OpenAPI document, registers it under `retrieval_uri`, and
/// resolves it with the registry in scope so cross-document refs land.
pub fn parse_openapi_document_with_registry(
    content: &str,
    retrieval_uri: &str,
    registry: &mut DocumentRegistry,
) -> AppResult<OpenApiDefinition> {
    registry.register_openapi_yaml(content, retrieval_uri)?;
    let registry = &*registry;
    let entry = registry.resolve(retrieval_uri).ok_or_else(|| {
        AppError::General(format!("Document '{}' vanished after registration", retrieval_uri))
    })?;
    let definition = entry.document.as_openapi().ok_or_else(|| {
        AppError::General(format!("Document '{}' is not an OpenAPI root", retrieval_uri))
    })?;
    let ctx = ResolveContext {
        base: entry.base_uri.as_ref(),
        registry: Some(registry),
    };
    Ok(resolve_document(definition, ctx))
}

/// Parses a standalone JSON Schema document (YAML or JSON text).
pub fn parse_schema_document(content: &str) -> AppResult<Schema> {
    let raw: Value = serde_yaml::from_str(content)
        .map_err(|e| AppError::InvalidDocument(format!("YAML parse error: {}", e)))?;
    build_schema(&raw)
}

/// Parses an OpenAPI root without resolving anything.
pub fn parse_openapi_root(content: &str) -> AppResult<OpenApiDefinition> {
    let raw: Value = serde_yaml::from_str(content)
        .map_err(|e| AppError::InvalidDocument(format!("YAML parse error: {}", e)))?;
    validate_openapi_root(&raw)?;
    serde_json::from_value(raw)
        .map_err(|e| AppError::InvalidDocument(format!("Malformed OpenAPI root: {}", e)))
}

/// Runs the resolution pass, producing a resolved copy of the definition.
pub fn resolve_document(
    definition: &OpenApiDefinition,
    ctx: ResolveContext<'_>,
) -> OpenApiDefinition {
    let components = definition.components.as_ref();
    let mut resolved = definition.clone();

    if let Some(paths) = &definition.paths {
        let mut items = IndexMap::with_capacity(paths.items.len());
        for (template, item) in &paths.items {
            items.insert(template.clone(), resolve_path_item(item, components, ctx));
        }
        resolved.paths = Some(Paths {
            items,
            extensions: paths.extensions.clone(),
        });
    }

    if let Some(webhooks) = &definition.webhooks {
        let mut items = IndexMap::with_capacity(webhooks.items.len());
        for (name, node) in &webhooks.items {
            let node = match resolve_ref_or(node, components, ctx) {
                Some(RefOr::Inline(item)) => {
                    RefOr::Inline(resolve_path_item(&item, components, ctx))
                }
                Some(kept @ RefOr::Ref(_)) => kept,
                None => node.clone(),
            };
            items.insert(name.clone(), node);
        }
        resolved.webhooks = Some(Webhooks {
            items,
            extensions: webhooks.extensions.clone(),
        });
    }

    resolved
}

/// Resolves a path item: an item-level `$ref` is fetched and merged (the
/// referencing item's own fields win), then every operation is resolved in
/// the scope the target item came from.
fn resolve_path_item(
    item: &PathItem,
    components: Option<&Components>,
    ctx: ResolveContext<'_>,
) -> PathItem {
    let Some(ref_location) = &item.ref_location else {
        return resolve_path_item_fields(item, components, ctx);
    };

    let Some(resolution) = resolve_path_item_ref(ref_location, components, ctx) else {
        debug!(r#ref = %ref_location, "Path item reference not resolvable, kept as-is");
        return item.clone();
    };

    let merged = merge_path_items(&resolution.item, item);
    let target_ctx = ResolveContext {
        base: resolution.base.as_ref(),
        registry: ctx.registry,
    };
    resolve_path_item_fields(&merged, resolution.components.as_ref(), target_ctx)
}

/// Overlays the referencing path item onto the resolved target. The
/// referencing site wins wherever it says anything.
fn merge_path_items(target: &PathItem, site: &PathItem) -> PathItem {
    let mut merged = target.clone();
    merged.ref_location = None;

    if site.summary.is_some() {
        merged.summary = site.summary.clone();
    }
    if site.description.is_some() {
        merged.description = site.description.clone();
    }
    if site.servers.is_some() {
        merged.servers = site.servers.clone();
    }
    if !site.parameters.is_empty() {
        merged.parameters = site.parameters.clone();
    }
    macro_rules! overlay {
        ($($field:ident),*) => {
            $(if site.$field.is_some() {
                merged.$field = site.$field.clone();
            })*
        };
    }
    overlay!(get, put, post, delete, options, head, patch, trace, query);
    for (method, operation) in &site.additional_operations {
        merged
            .additional_operations
            .insert(method.clone(), operation.clone());
    }
    for (key, value) in &site.extensions {
        merged.extensions.insert(key.clone(), value.clone());
    }
    merged
}

fn resolve_path_item_fields(
    item: &PathItem,
    components: Option<&Components>,
    ctx: ResolveContext<'_>,
) -> PathItem {
    let mut resolved = item.clone();
    resolved.parameters = resolve_parameters(&item.parameters, components, ctx);

    macro_rules! resolve_ops {
        ($($field:ident),*) => {
            $(if let Some(operation) = &item.$field {
                resolved.$field = Some(resolve_operation(operation, components, ctx));
            })*
        };
    }
    resolve_ops!(get, put, post, delete, options, head, patch, trace, query);
    resolved.additional_operations = item
        .additional_operations
        .iter()
        .map(|(method, op)| (method.clone(), resolve_operation(op, components, ctx)))
        .collect();

    resolved
}

fn resolve_operation(
    operation: &Operation,
    components: Option<&Components>,
    ctx: ResolveContext<'_>,
) -> Operation {
    let mut resolved = operation.clone();
    resolved.parameters = resolve_parameters(&operation.parameters, components, ctx);

    if let Some(body) = &operation.request_body {
        resolved.request_body = Some(match resolve_ref_or(body, components, ctx) {
            Some(RefOr::Inline(mut body)) => {
                body.content = resolve_content(&body.content, components, ctx);
                RefOr::Inline(body)
            }
            Some(kept @ RefOr::Ref(_)) => kept,
            None => body.clone(),
        });
    }

    resolved.responses = operation
        .responses
        .iter()
        .map(|(status, node)| (status.clone(), resolve_response(node, components, ctx)))
        .collect();

    resolved.callbacks = operation
        .callbacks
        .iter()
        .map(|(name, node)| {
            let node = match resolve_ref_or(node, components, ctx) {
                Some(RefOr::Inline(callback)) => {
                    RefOr::Inline(resolve_callback(&callback, components, ctx))
                }
                Some(kept @ RefOr::Ref(_)) => kept,
                None => node.clone(),
            };
            (name.clone(), node)
        })
        .collect();

    resolved
}

fn resolve_parameters(
    parameters: &[RefOr<Parameter>],
    components: Option<&Components>,
    ctx: ResolveContext<'_>,
) -> Vec<RefOr<Parameter>> {
    parameters
        .iter()
        .map(|node| match resolve_ref_or(node, components, ctx) {
            Some(RefOr::Inline(mut parameter)) => {
                parameter.examples = resolve_examples(&parameter.examples, components, ctx);
                parameter.content = resolve_content(&parameter.content, components, ctx);
                RefOr::Inline(parameter)
            }
            Some(kept @ RefOr::Ref(_)) => kept,
            None => node.clone(),
        })
        .collect()
}

/// Resolves a response position. An unresolvable response ref degrades to
/// the placeholder stub so the responses map always holds real entries.
fn resolve_response(
    node: &RefOr<Response>,
    components: Option<&Components>,
    ctx: ResolveContext<'_>,
) -> RefOr<Response> {
    let resolved = match node {
        RefOr::Inline(response) => Some(response.clone()),
        RefOr::Ref(reference) => {
            match resolve_component::<Response>(reference, components, ctx) {
                Some(RefOr::Inline(response)) => Some(response),
                Some(RefOr::Ref(_)) | None => {
                    debug!(r#ref = %reference.ref_location, "Stubbing unresolved response");
                    Some(Response::unresolved_stub(reference))
                }
            }
        }
    };

    match resolved {
        Some(mut response) => {
            response.headers = resolve_headers(&response.headers, components, ctx);
            response.content = resolve_content(&response.content, components, ctx);
            response.links = resolve_links(&response.links, components, ctx);
            RefOr::Inline(response)
        }
        None => node.clone(),
    }
}

fn resolve_headers(
    headers: &IndexMap<String, RefOr<Header>>,
    components: Option<&Components>,
    ctx: ResolveContext<'_>,
) -> IndexMap<String, RefOr<Header>> {
    headers
        .iter()
        .map(|(name, node)| {
            let node = match resolve_ref_or(node, components, ctx) {
                Some(RefOr::Inline(mut header)) => {
                    header.examples = resolve_examples(&header.examples, components, ctx);
                    header.content = resolve_content(&header.content, components, ctx);
                    RefOr::Inline(header)
                }
                Some(kept @ RefOr::Ref(_)) => kept,
                None => node.clone(),
            };
            (name.clone(), node)
        })
        .collect()
}

fn resolve_links(
    links: &IndexMap<String, RefOr<Link>>,
    components: Option<&Components>,
    ctx: ResolveContext<'_>,
) -> IndexMap<String, RefOr<Link>> {
    links
        .iter()
        .map(|(name, node)| {
            let node = resolve_ref_or(node, components, ctx).unwrap_or_else(|| node.clone());
            (name.clone(), node)
        })
        .collect()
}

fn resolve_examples(
    examples: &IndexMap<String, RefOr<ExampleObject>>,
    components: Option<&Components>,
    ctx: ResolveContext<'_>,
) -> IndexMap<String, RefOr<ExampleObject>> {
    examples
        .iter()
        .map(|(name, node)| {
            let node = resolve_ref_or(node, components, ctx).unwrap_or_else(|| node.clone());
            (name.clone(), node)
        })
        .collect()
}

fn resolve_content(
    content: &IndexMap<String, RefOr<MediaTypeObject>>,
    components: Option<&Components>,
    ctx: ResolveContext<'_>,
) -> IndexMap<String, RefOr<MediaTypeObject>> {
    content
        .iter()
        .map(|(media_type, node)| {
            let node = match resolve_ref_or(node, components, ctx) {
                Some(RefOr::Inline(mut media)) => {
                    media.examples = resolve_examples(&media.examples, components, ctx);
                    RefOr::Inline(media)
                }
                Some(kept @ RefOr::Ref(_)) => kept,
                None => node.clone(),
            };
            (media_type.clone(), node)
        })
        .collect()
}

fn resolve_callback(
    callback: &Callback,
    components: Option<&Components>,
    ctx: ResolveContext<'_>,
) -> Callback {
    let expressions = callback
        .expressions
        .iter()
        .map(|(expression, node)| {
            let node = match resolve_ref_or(node, components, ctx) {
                Some(RefOr::Inline(item)) => {
                    RefOr::Inline(resolve_path_item(&item, components, ctx))
                }
                Some(kept @ RefOr::Ref(_)) => kept,
                None => node.clone(),
            };
            (expression.clone(), node)
        })
        .collect();
    Callback {
        expressions,
        extensions: callback.extensions.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_resolves_parameter_refs() {
        let doc = r##"
openapi: 3.1.0
info: { title: T, version: "1" }
paths:
  /users:
    get:
      parameters:
        - $ref: "#/components/parameters/Page"
      responses:
        "200": { description: ok }
components:
  parameters:
    Page:
      name: page
      in: query
      schema: { type: integer }
"##;
        let resolved = parse_openapi_document(doc).unwrap();
        let item = &resolved.paths.as_ref().unwrap().items["/users"];
        let parameter = item.get.as_ref().unwrap().parameters[0]
            .as_inline()
            .unwrap();
        assert_eq!(parameter.name, "page");
        assert_eq!(parameter.location, "query");
    }

    #[test]
    fn test_dangling_response_ref_becomes_stub() {
        let doc = r##"
openapi: 3.1.0
info: { title: T, version: "1" }
paths:
  /users:
    get:
      responses:
        "404":
          $ref: "#/components/responses/Missing"
"##;
        let resolved = parse_openapi_document(doc).unwrap();
        let item = &resolved.paths.as_ref().unwrap().items["/users"];
        let response = item.get.as_ref().unwrap().responses["404"]
            .as_inline()
            .unwrap();
        assert!(response.is_unresolved_stub());
        assert_eq!(
            response.description.as_deref(),
            Some("ref:#/components/responses/Missing")
        );
    }

    #[test]
    fn test_response_ref_with_description_override() {
        let doc = r##"
openapi: 3.1.0
info: { title: T, version: "1" }
paths:
  /users:
    get:
      responses:
        "404":
          $ref: "#/components/responses/NotFound"
          description: user not found
components:
  responses:
    NotFound:
      description: generic not found
      content:
        application/json:
          schema: { type: object }
"##;
        let resolved = parse_openapi_document(doc).unwrap();
        let item = &resolved.paths.as_ref().unwrap().items["/users"];
        let response = item.get.as_ref().unwrap().responses["404"]
            .as_inline()
            .unwrap();
        assert_eq!(response.description.as_deref(), Some("user not found"));
        // the target's content is intact
        assert!(response.content.contains_key("application/json"));
    }

    #[test]
    fn test_schema_refs_are_left_intact() {
        let doc = r##"
openapi: 3.1.0
info: { title: T, version: "1" }
paths:
  /users:
    get:
      responses:
        "200":
          description: ok
          content:
            application/json:
              schema:
                $ref: "#/components/schemas/User"
components:
  schemas:
    User: { type: object }
"##;
        let resolved = parse_openapi_document(doc).unwrap();
        let item = &resolved.paths.as_ref().unwrap().items["/users"];
        let response = item.get.as_ref().unwrap().responses["200"]
            .as_inline()
            .unwrap();
        let media = response.content["application/json"].as_inline().unwrap();
        assert!(media.schema.as_ref().unwrap().is_ref());
    }

    #[test]
    fn test_path_item_component_ref_merges_site_fields() {
        let doc = r##"
openapi: 3.1.0
info: { title: T, version: "1" }
paths:
  /shared:
    $ref: "#/components/pathItems/Shared"
    summary: overridden at the site
components:
  pathItems:
    Shared:
      summary: target summary
      get:
        responses:
          "200": { description: ok }
"##;
        let resolved = parse_openapi_document(doc).unwrap();
        let item = &resolved.paths.as_ref().unwrap().items["/shared"];
        assert!(item.ref_location.is_none());
        assert_eq!(item.summary.as_deref(), Some("overridden at the site"));
        assert!(item.get.is_some());
    }

    #[test]
    fn test_cross_document_path_item_resolves_in_target_scope() {
        let common = r##"
openapi: 3.1.0
info: { title: Common, version: "1" }
paths:
  /pets:
    get:
      responses:
        "200":
          $ref: "#/components/responses/PetList"
components:
  responses:
    PetList:
      description: a list of pets
"##;
        let main = r##"
openapi: 3.1.0
info: { title: Main, version: "1" }
paths:
  /animals:
    $ref: "./common.yaml#/paths/~1pets"
"##;
        let mut registry = DocumentRegistry::new();
        registry
            .register_openapi_yaml(common, "https://example.com/common.yaml")
            .unwrap();
        let resolved = parse_openapi_document_with_registry(
            main,
            "https://example.com/main.yaml",
            &mut registry,
        )
        .unwrap();
        let item = &resolved.paths.as_ref().unwrap().items["/animals"];
        let response = item.get.as_ref().unwrap().responses["200"]
            .as_inline()
            .unwrap();
        // the nested ref resolved against the *target* document's components
        assert_eq!(response.description.as_deref(), Some("a list of pets"));
    }

    #[test]
    fn test_cross_document_path_item_component_resolves_in_target_scope() {
        let target = r##"
openapi: 3.1.0
info: { title: Target, version: "1" }
paths: {}
components:
  pathItems:
    Shared:
      get:
        responses:
          "200":
            $ref: "#/components/responses/Ok"
  responses:
    Ok:
      description: resolved in target scope
"##;
        let main = r##"
openapi: 3.1.0
info: { title: Main, version: "1" }
paths:
  /shared:
    $ref: "https://example.com/target.yaml#/components/pathItems/Shared"
"##;
        let mut registry = DocumentRegistry::new();
        registry
            .register_openapi_yaml(target, "https://example.com/target.yaml")
            .unwrap();
        let resolved = parse_openapi_document_with_registry(
            main,
            "https://example.com/main.yaml",
            &mut registry,
        )
        .unwrap();
        let item = &resolved.paths.as_ref().unwrap().items["/shared"];
        let response = item.get.as_ref().unwrap().responses["200"]
            .as_inline()
            .unwrap();
        // the nested ref is scoped to the document the item lives in
        assert!(!response.is_unresolved_stub());
        assert_eq!(
            response.description.as_deref(),
            Some("resolved in target scope")
        );
    }

    #[test]
    fn test_webhook_refs_resolve() {
        let doc = r##"
openapi: 3.1.0
info: { title: T, version: "1" }
webhooks:
  userCreated:
    $ref: "#/components/pathItems/UserCreated"
components:
  pathItems:
    UserCreated:
      post:
        responses:
          "202": { description: accepted }
"##;
        let resolved = parse_openapi_document(doc).unwrap();
        let webhook = resolved.webhooks.as_ref().unwrap().items["userCreated"]
            .as_inline()
            .unwrap();
        assert!(webhook.post.is_some());
    }

    #[test]
    fn test_callback_expressions_resolve() {
        let doc = r##"
openapi: 3.1.0
info: { title: T, version: "1" }
paths:
  /subscribe:
    post:
      responses:
        "201": { description: created }
      callbacks:
        onEvent:
          $ref: "#/components/callbacks/Event"
components:
  callbacks:
    Event:
      "{$request.body#/url}":
        post:
          responses:
            "200": { description: received }
"##;
        let resolved = parse_openapi_document(doc).unwrap();
        let item = &resolved.paths.as_ref().unwrap().items["/subscribe"];
        let callback = item.post.as_ref().unwrap().callbacks["onEvent"]
            .as_inline()
            .unwrap();
        assert!(callback.expressions.contains_key("{$request.body#/url}"));
    }

    #[test]
    fn test_root_extensions_survive() {
        let doc = r##"
openapi: 3.1.0
info: { title: T, version: "1" }
x-internal-id: abc-123
paths: {}
"##;
        let resolved = parse_openapi_document(doc).unwrap();
        assert_eq!(
            resolved.extensions.get("x-internal-id"),
            Some(&serde_json::json!("abc-123"))
        );
    }

    #[test]
    fn test_invalid_root_fails() {
        assert!(parse_openapi_document("[]").is_err());
        assert!(parse_openapi_document("openapi: 3.1.0").is_err());
    }

    #[test]
    fn test_parse_schema_document_boolean_root() {
        assert_eq!(parse_schema_document("true").unwrap(), Schema::Bool(true));
    }

    #[test]
    fn test_request_body_ref_resolves() {
        let doc = r##"
openapi: 3.1.0
info: { title: T, version: "1" }
paths:
  /users:
    post:
      requestBody:
        $ref: "#/components/requestBodies/NewUser"
      responses:
        "201": { description: created }
components:
  requestBodies:
    NewUser:
      required: true
      content:
        application/json:
          schema: { type: object }
"##;
        let resolved = parse_openapi_document(doc).unwrap();
        let item = &resolved.paths.as_ref().unwrap().items["/users"];
        let body = item.post.as_ref().unwrap().request_body.as_ref().unwrap();
        assert!(body.as_inline().unwrap().required);
    }
}
