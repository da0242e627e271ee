#![deny(missing_docs)]

//! # Reference Resolution Engine
//!
//! Resolves `$ref` chains across component tables and registered documents.
//!
//! Resolution is best-effort and total: a malformed pointer, a missing
//! document, a missing key or a cycle never aborts anything. Failures yield
//! `None` (callers keep or stub the reference) and cycles return the entity
//! as found at the point of revisit, still unresolved.
//!
//! Sibling `summary`/`description` on a Reference Object override the
//! resolved target's values as the chain unwinds, so the outermost
//! referencing site wins. Referencing-site `x-` extensions are overlaid onto
//! the target's on the same schedule.

pub mod media;

use crate::model::{
    Callback, ComponentKind, Components, ExampleObject, Header, Link, MediaTypeObject, Parameter,
    PathItem, Reference, RefOr, RequestBody, Response, Schema, SecurityScheme,
};
use crate::registry::DocumentRegistry;
use crate::uri::{decode_pointer_segment, parse_reference, resolve_doc_uri, split_component_ref};
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};
use url::Url;

/// Ceiling on reference-chain length. The visited set already terminates
/// cycles; this bounds pathological acyclic chains.
const MAX_REF_DEPTH: usize = 64;

/// The scope a resolution runs in: the current document's base URI plus the
/// registry of other documents, when available.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveContext<'a> {
    /// Base URI of the document whose refs are being resolved.
    pub base: Option<&'a Url>,
    /// Registry for cross-document hops. `None` confines resolution to the
    /// local components table.
    pub registry: Option<&'a DocumentRegistry>,
}

/// An entity that lives in a named components table and can be targeted by
/// a component-shaped `$ref`.
pub trait ComponentEntity: Clone {
    /// The components section this entity resolves within.
    const KIND: ComponentKind;

    /// The entity's table within a Components Object.
    fn table(components: &Components) -> &IndexMap<String, RefOr<Self>>
    where
        Self: Sized;

    /// Merges a referencing site's sibling overrides into the resolved
    /// entity. Overrides win when present and never erase target values.
    fn apply_overrides(&mut self, reference: &Reference);
}

/// Overlays referencing-site `x-` extensions onto the target's.
fn merge_extensions(target: &mut BTreeMap<String, Value>, reference: &Reference) {
    for (key, value) in &reference.extensions {
        if key.starts_with("x-") {
            target.insert(key.clone(), value.clone());
        }
    }
}

macro_rules! component_entity {
    ($ty:ty, $kind:expr, $table:ident, summary, description) => {
        impl ComponentEntity for $ty {
            const KIND: ComponentKind = $kind;

            fn table(components: &Components) -> &IndexMap<String, RefOr<Self>> {
                &components.$table
            }

            fn apply_overrides(&mut self, reference: &Reference) {
                if let Some(summary) = &reference.summary {
                    self.summary = Some(summary.clone());
                }
                if let Some(description) = &reference.description {
                    self.description = Some(description.clone());
                }
                merge_extensions(&mut self.extensions, reference);
            }
        }
    };
    ($ty:ty, $kind:expr, $table:ident, description) => {
        impl ComponentEntity for $ty {
            const KIND: ComponentKind = $kind;

            fn table(components: &Components) -> &IndexMap<String, RefOr<Self>> {
                &components.$table
            }

            fn apply_overrides(&mut self, reference: &Reference) {
                if let Some(description) = &reference.description {
                    self.description = Some(description.clone());
                }
                merge_extensions(&mut self.extensions, reference);
            }
        }
    };
    ($ty:ty, $kind:expr, $table:ident) => {
        impl ComponentEntity for $ty {
            const KIND: ComponentKind = $kind;

            fn table(components: &Components) -> &IndexMap<String, RefOr<Self>> {
                &components.$table
            }

            fn apply_overrides(&mut self, reference: &Reference) {
                merge_extensions(&mut self.extensions, reference);
            }
        }
    };
}

component_entity!(Response, ComponentKind::Response, responses, description);
component_entity!(Parameter, ComponentKind::Parameter, parameters, description);
component_entity!(
    RequestBody,
    ComponentKind::RequestBody,
    request_bodies,
    description
);
component_entity!(Header, ComponentKind::Header, headers, description);
component_entity!(Link, ComponentKind::Link, links, description);
component_entity!(
    ExampleObject,
    ComponentKind::Example,
    examples,
    summary,
    description
);
component_entity!(
    SecurityScheme,
    ComponentKind::SecurityScheme,
    security_schemes,
    description
);
component_entity!(Callback, ComponentKind::Callback, callbacks);
component_entity!(MediaTypeObject, ComponentKind::MediaType, media_types);
component_entity!(
    PathItem,
    ComponentKind::PathItem,
    path_items,
    summary,
    description
);

impl ComponentEntity for Schema {
    const KIND: ComponentKind = ComponentKind::Schema;

    fn table(components: &Components) -> &IndexMap<String, RefOr<Self>> {
        &components.schemas
    }

    fn apply_overrides(&mut self, reference: &Reference) {
        if let Schema::Object(obj) = self {
            if let Some(description) = &reference.description {
                obj.description = Some(description.clone());
            }
            merge_extensions(&mut obj.extensions, reference);
        }
    }
}

/// Resolves a Reference Object to a concrete entity.
///
/// Returns:
/// - `Some(RefOr::Inline(entity))` with sibling overrides applied,
/// - `Some(RefOr::Ref(..))` when a cycle was cut (the entity as found),
/// - `None` when the reference cannot be resolved at all.
pub fn resolve_component<T: ComponentEntity>(
    reference: &Reference,
    components: Option<&Components>,
    ctx: ResolveContext<'_>,
) -> Option<RefOr<T>> {
    let mut visited = HashSet::new();
    let resolved = resolve_inner::<T>(
        &reference.ref_location,
        components,
        ctx.base,
        ctx.registry,
        &mut visited,
        0,
    )?;
    Some(match resolved {
        RefOr::Inline(mut entity) => {
            entity.apply_overrides(reference);
            RefOr::Inline(entity)
        }
        kept @ RefOr::Ref(_) => kept,
    })
}

/// Convenience form: resolves a [`RefOr`] in place, passing inline values
/// through untouched.
pub fn resolve_ref_or<T: ComponentEntity>(
    node: &RefOr<T>,
    components: Option<&Components>,
    ctx: ResolveContext<'_>,
) -> Option<RefOr<T>> {
    match node {
        RefOr::Inline(value) => Some(RefOr::Inline(value.clone())),
        RefOr::Ref(reference) => resolve_component(reference, components, ctx),
    }
}

fn resolve_inner<T: ComponentEntity>(
    ref_str: &str,
    components: Option<&Components>,
    base: Option<&Url>,
    registry: Option<&DocumentRegistry>,
    visited: &mut HashSet<(String, String)>,
    depth: usize,
) -> Option<RefOr<T>> {
    if depth > MAX_REF_DEPTH {
        warn!(r#ref = %ref_str, depth, "Reference chain exceeds depth ceiling");
        return None;
    }

    let (doc_part, key) = split_component_ref(ref_str, T::KIND.section())?;

    // Rescope to the target document for cross-document refs.
    let (scope, target_components, target_base) = if doc_part.is_empty() {
        (
            base.map(|u| u.to_string()).unwrap_or_default(),
            components?,
            base,
        )
    } else {
        let uri = resolve_doc_uri(doc_part, base)?;
        if base.map(|b| b.as_str() == uri).unwrap_or(false) {
            // the ref spells the current document's own base absolutely
            (uri, components?, base)
        } else {
            let entry = registry?.resolve(&uri)?;
            let definition = entry.document.as_openapi()?;
            (
                uri,
                definition.components.as_ref()?,
                entry.base_uri.as_ref(),
            )
        }
    };

    let entry = T::table(target_components).get(&key)?;

    if !visited.insert((scope.clone(), key.clone())) {
        debug!(r#ref = %ref_str, "Reference cycle detected, returning entity as found");
        return Some(entry.clone());
    }

    match entry {
        RefOr::Inline(value) => Some(RefOr::Inline(value.clone())),
        RefOr::Ref(next) => {
            let resolved = resolve_inner::<T>(
                &next.ref_location,
                Some(target_components),
                target_base,
                registry,
                visited,
                depth + 1,
            );
            match resolved {
                Some(RefOr::Inline(mut value)) => {
                    value.apply_overrides(next);
                    Some(RefOr::Inline(value))
                }
                other => other,
            }
        }
    }
}

/// Resolves a schema `$ref`, additionally supporting whole-document targets:
/// a `$ref` whose fragment is absent or empty may point at a standalone
/// schema document registered under that URI (or its `$id`).
pub fn resolve_schema_ref(
    reference: &Reference,
    components: Option<&Components>,
    ctx: ResolveContext<'_>,
) -> Option<RefOr<Schema>> {
    let parsed = parse_reference(&reference.ref_location);
    if parsed.fragment.unwrap_or("").is_empty() && !parsed.document.is_empty() {
        let uri = resolve_doc_uri(parsed.document, ctx.base)?;
        let mut schema = ctx.registry?.resolve_schema(&uri)?.clone();
        schema.apply_overrides(reference);
        return Some(RefOr::Inline(schema));
    }
    resolve_component(reference, components, ctx)
}

/// A path item resolved across document boundaries, bundled with the scope
/// needed to resolve the refs nested inside it.
#[derive(Debug, Clone)]
pub struct PathItemResolution {
    /// The resolved path item.
    pub item: PathItem,
    /// Components of the document the item was found in.
    pub components: Option<Components>,
    /// Base URI of the document the item was found in.
    pub base: Option<Url>,
}

/// Resolves a path-item `$ref`, which may target either a reusable
/// component (`#/components/pathItems/Name`) or a paths-object entry
/// (`doc.yaml#/paths/~1pets`).
pub fn resolve_path_item_ref(
    ref_str: &str,
    components: Option<&Components>,
    ctx: ResolveContext<'_>,
) -> Option<PathItemResolution> {
    if let Some((doc_part, _)) = split_component_ref(ref_str, ComponentKind::PathItem.section()) {
        // The scope nested refs inside the item resolve in is the document
        // the item actually lives in, not the referencing site's.
        let is_foreign = !doc_part.is_empty()
            && !ctx
                .base
                .map(|b| resolve_doc_uri(doc_part, ctx.base).as_deref() == Some(b.as_str()))
                .unwrap_or(false);
        let (target_components, target_base) = if is_foreign {
            let uri = resolve_doc_uri(doc_part, ctx.base)?;
            let entry = ctx.registry?.resolve(&uri)?;
            let definition = entry.document.as_openapi()?;
            (definition.components.clone(), entry.base_uri.clone())
        } else {
            (components.cloned(), ctx.base.cloned())
        };
        let reference = Reference::new(ref_str);
        return match resolve_component::<PathItem>(&reference, components, ctx)? {
            RefOr::Inline(item) => Some(PathItemResolution {
                item,
                components: target_components,
                base: target_base,
            }),
            RefOr::Ref(_) => None,
        };
    }

    // Paths-object pointer: split around "#/paths/".
    const PATHS_MARKER: &str = "#/paths/";
    let pos = ref_str.find(PATHS_MARKER)?;
    let doc_part = &ref_str[..pos];
    let raw_template = &ref_str[pos + PATHS_MARKER.len()..];
    if raw_template.is_empty() || raw_template.contains('/') {
        return None;
    }
    let template = decode_pointer_segment(raw_template);

    if doc_part.is_empty() {
        debug!(r#ref = %ref_str, "Local paths pointer requires the enclosing document");
        return None;
    }

    let uri = resolve_doc_uri(doc_part, ctx.base)?;
    let entry = ctx.registry?.resolve(&uri)?;
    let definition = entry.document.as_openapi()?;
    let item = definition.paths.as_ref()?.items.get(&template)?.clone();
    Some(PathItemResolution {
        item,
        components: definition.components.clone(),
        base: entry.base_uri.clone(),
    })
}

impl DocumentRegistry {
    /// Registry-scoped form of [`resolve_path_item_ref`] for
    /// document-qualified refs (`doc.yaml#/paths/~1pets`,
    /// `doc.yaml#/components/pathItems/Name`).
    pub fn resolve_path_item(&self, ref_str: &str, base: Option<&Url>) -> Option<PathItemResolution> {
        let ctx = ResolveContext {
            base,
            registry: Some(self),
        };
        resolve_path_item_ref(ref_str, None, ctx)
    }
}
