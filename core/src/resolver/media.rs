#![deny(missing_docs)]

//! # Media-Type Selection
//!
//! Picks the most useful entry of a content map and derives a representative
//! schema for it. Selection is deterministic: concrete types beat wildcard
//! ranges, JSON-family types beat everything else at equal specificity, and
//! remaining ties go to the lexicographically earlier key.
//!
//! When the winning entry carries no schema at all, a placeholder is
//! synthesized from the media type family so downstream consumers always
//! have a schema to work with.

use super::{resolve_ref_or, ResolveContext};
use crate::model::{Components, MediaTypeObject, RefOr, Schema, SchemaObject, SchemaType, Type};
use indexmap::IndexMap;
use tracing::debug;

/// The winning entry of a content map.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedMedia {
    /// The selected media-type key (e.g. `application/json`).
    pub media_type: String,
    /// The resolved Media Type Object.
    pub media: MediaTypeObject,
}

/// Splits a media-type key into its type and subtype (parameters dropped).
fn split_media_type(key: &str) -> (&str, &str) {
    let essence = key.split(';').next().unwrap_or(key).trim();
    match essence.split_once('/') {
        Some((ty, subtype)) => (ty, subtype),
        None => (essence, ""),
    }
}

/// Whether the media type carries JSON (the `json` subtype or a `+json`
/// structured-syntax suffix).
fn is_json_family(key: &str) -> bool {
    let (_, subtype) = split_media_type(key);
    subtype == "json" || subtype.ends_with("+json")
}

/// Specificity score: concrete type and subtype beat wildcard ranges; a
/// suffix range (`*+json`) sits between a full wildcard and a concrete
/// subtype.
fn specificity(key: &str) -> u32 {
    let (ty, subtype) = split_media_type(key);
    let type_score = if ty == "*" { 0 } else { 10 };
    let subtype_score = if subtype == "*" {
        0
    } else if subtype.starts_with("*+") {
        1
    } else {
        2
    };
    type_score + subtype_score
}

fn score(key: &str) -> (u32, bool, usize) {
    (specificity(key), is_json_family(key), key.len())
}

/// Selects the preferred entry of a content map.
pub fn select_media_type(
    content: &IndexMap<String, RefOr<MediaTypeObject>>,
) -> Option<(&String, &RefOr<MediaTypeObject>)> {
    content.iter().max_by(|(a, _), (b, _)| {
        score(a)
            .cmp(&score(b))
            // equal scores: earlier key wins
            .then_with(|| b.as_str().cmp(a.as_str()))
    })
}

/// Selects the preferred content entry and resolves it to a concrete
/// Media Type Object with a representative schema guaranteed present.
pub fn select_representative(
    content: &IndexMap<String, RefOr<MediaTypeObject>>,
    components: Option<&Components>,
    ctx: ResolveContext<'_>,
) -> Option<SelectedMedia> {
    let (key, node) = select_media_type(content)?;

    let mut media = match resolve_ref_or(node, components, ctx) {
        Some(RefOr::Inline(media)) => media,
        Some(RefOr::Ref(_)) | None => {
            debug!(media_type = %key, "Media type object not resolvable, synthesizing");
            MediaTypeObject::default()
        }
    };

    if media.schema.is_none() {
        media.schema = representative_schema(key, &media);
    }

    Some(SelectedMedia {
        media_type: key.clone(),
        media,
    })
}

/// Derives the representative schema of a media-type entry.
///
/// Preference order: the declared `schema`; an `itemSchema` wrapped as an
/// array over its items; a placeholder synthesized from the media type
/// family. A schema-less wildcard range yields nothing: there is no
/// concrete type to synthesize from.
pub fn representative_schema(media_type: &str, media: &MediaTypeObject) -> Option<RefOr<Schema>> {
    if let Some(schema) = &media.schema {
        return Some(schema.clone());
    }

    if let Some(item_schema) = &media.item_schema {
        let wrapper = SchemaObject {
            schema_type: Some(SchemaType::Single(Type::Array)),
            items: Some(Box::new(item_schema.clone())),
            ..SchemaObject::default()
        };
        return Some(RefOr::Inline(Schema::Object(Box::new(wrapper))));
    }

    let (ty, subtype) = split_media_type(media_type);
    if ty == "*" || subtype.contains('*') {
        return None;
    }
    Some(RefOr::Inline(synthesize_placeholder(media_type)))
}

/// Placeholder schema for a media type that declared none.
fn synthesize_placeholder(media_type: &str) -> Schema {
    if is_json_family(media_type) {
        // any JSON value
        return Schema::Bool(true);
    }

    let (ty, subtype) = split_media_type(media_type);
    let textual = ty == "text"
        || subtype == "xml"
        || subtype.ends_with("+xml")
        || media_type == "application/x-www-form-urlencoded";
    if textual {
        return Schema::with_type(Type::String);
    }

    // opaque payload: a string tagged with its media type
    let mut obj = SchemaObject {
        schema_type: Some(SchemaType::Single(Type::String)),
        ..SchemaObject::default()
    };
    obj.content_media_type = Some(media_type.to_string());
    Schema::Object(Box::new(obj))
}
