#![deny(missing_docs)]

//! # URI & Pointer Utilities
//!
//! Shared helpers for base-URI normalization, RFC 3986 relative resolution,
//! and JSON Pointer token decoding.
//!
//! These utilities are intentionally lightweight: they never fetch external
//! documents. Non-absolute bases (bare paths, absolute-path references) are
//! anchored against an opaque dummy origin so that relative resolution still
//! follows RFC 3986 semantics.

use percent_encoding::percent_decode_str;
use url::Url;

/// Opaque origin used to anchor non-absolute base URIs.
const DUMMY_BASE: &str = "http://example.invalid/";

/// How a `$ref` relates to the current document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    /// Fragment-only reference (`#/components/...`, `#anchor`).
    Local,
    /// Relative document reference (`./other.yaml#/...`).
    Relative,
    /// Absolute document reference (`https://...#/...`).
    Remote,
}

/// A `$ref` split into its document and fragment parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedReference<'a> {
    /// Text before the `#` (may be empty for local refs).
    pub document: &'a str,
    /// Text after the `#`, without the marker itself.
    pub fragment: Option<&'a str>,
    /// Locality classification of the reference.
    pub kind: ReferenceKind,
}

/// Splits a `$ref` string into document and fragment parts.
pub fn parse_reference(ref_str: &str) -> ParsedReference<'_> {
    let (document, fragment) = match ref_str.find('#') {
        Some(pos) => (&ref_str[..pos], Some(&ref_str[pos + 1..])),
        None => (ref_str, None),
    };

    let kind = if document.is_empty() {
        ReferenceKind::Local
    } else if Url::parse(document).is_ok() {
        ReferenceKind::Remote
    } else {
        ReferenceKind::Relative
    };

    ParsedReference {
        document,
        fragment,
        kind,
    }
}

/// Normalizes a base URI for registry lookups: trims surrounding whitespace
/// and strips any fragment.
pub fn normalize_base_uri(uri: &str) -> String {
    let trimmed = uri.trim();
    match trimmed.find('#') {
        Some(pos) => trimmed[..pos].to_string(),
        None => trimmed.to_string(),
    }
}

/// Parses a base URI, anchoring non-absolute forms against a dummy origin.
pub fn parse_base_url(base_str: &str) -> Option<Url> {
    if let Ok(url) = Url::parse(base_str) {
        return Some(url);
    }
    let dummy = Url::parse(DUMMY_BASE).ok()?;
    dummy.join(base_str).ok()
}

/// Resolves a document reference against an optional base, returning the
/// normalized absolute URI string.
pub fn resolve_doc_uri(doc: &str, base: Option<&Url>) -> Option<String> {
    if let Ok(url) = Url::parse(doc) {
        return Some(url.to_string());
    }
    let base = base?;
    base.join(doc).ok().map(|u| u.to_string())
}

/// Computes the effective base URI of a document from its retrieval URI and
/// optional `$self` / `$id` declaration (possibly relative).
pub fn compute_base_uri(retrieval_uri: &str, self_uri: Option<&str>) -> String {
    let Some(self_val) = self_uri else {
        return normalize_base_uri(retrieval_uri);
    };

    if Url::parse(self_val).is_ok() {
        return normalize_base_uri(self_val);
    }

    if let Some(retrieval) = parse_base_url(retrieval_uri.trim()) {
        if let Ok(joined) = retrieval.join(self_val) {
            return normalize_base_uri(joined.as_str());
        }
    }

    normalize_base_uri(self_val)
}

/// Decodes a JSON Pointer segment (handles `~1`, `~0`, percent-encoding).
pub fn decode_pointer_segment(segment: &str) -> String {
    let decoded = segment.replace("~1", "/").replace("~0", "~");
    percent_decode_str(&decoded)
        .decode_utf8_lossy()
        .into_owned()
}

/// Splits a component-style `$ref` around the `#/components/{section}/`
/// marker, returning the document part and the decoded component key.
///
/// Returns `None` when the marker is absent or the key is empty or contains
/// an undecoded `/` (a deeper pointer than a component name).
pub fn split_component_ref<'a>(ref_str: &'a str, section: &str) -> Option<(&'a str, String)> {
    let marker = format!("#/components/{}/", section);
    let pos = ref_str.find(&marker)?;
    let document = &ref_str[..pos];
    let raw_key = &ref_str[pos + marker.len()..];
    if raw_key.is_empty() || raw_key.contains('/') {
        return None;
    }
    let key = decode_pointer_segment(raw_key);
    if key.is_empty() {
        return None;
    }
    Some((document, key))
}

/// Derives a best-effort display name from the trailing pointer segment of a
/// `$ref` that did not match the component marker shape.
pub fn reference_display_name(ref_str: &str) -> String {
    let tail = ref_str
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or(ref_str);
    decode_pointer_segment(tail.trim_start_matches('#'))
}
