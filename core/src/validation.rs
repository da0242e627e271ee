#![deny(missing_docs)]

//! # Document Validation
//!
//! Two layers: the hard structural gate applied before a document enters
//! the registry ([`validate_openapi_root`]), and a read-only lint pass over
//! a parsed definition ([`validate`]) that reports issues without mutating
//! or rejecting anything.

use crate::error::{AppError, AppResult};
use crate::model::{OpenApiDefinition, Operation, PathItem, RefOr};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;

/// How serious a reported issue is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The document violates the specification.
    Error,
    /// The document is legal but suspicious or degraded.
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// One finding of the lint pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationIssue {
    /// Issue severity.
    pub severity: Severity,
    /// Dotted location of the offending element.
    pub path: String,
    /// Human-readable explanation.
    pub message: String,
}

impl ValidationIssue {
    fn error(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            path: path.into(),
            message: message.into(),
        }
    }

    fn warning(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Structural gate for OpenAPI document roots. Anything that passes here is
/// representable; everything else is rejected before registration.
pub fn validate_openapi_root(raw: &Value) -> AppResult<()> {
    let map = raw.as_object().ok_or_else(|| {
        AppError::InvalidDocument("OpenAPI document root must be an object".to_string())
    })?;

    let has_version = map.get("openapi").map(Value::is_string).unwrap_or(false)
        || map.get("swagger").map(Value::is_string).unwrap_or(false);
    if !has_version {
        return Err(AppError::InvalidDocument(
            "Missing 'openapi' (or legacy 'swagger') version field".to_string(),
        ));
    }

    if !map.get("info").map(Value::is_object).unwrap_or(false) {
        return Err(AppError::InvalidDocument(
            "Missing mandatory 'info' object".to_string(),
        ));
    }

    Ok(())
}

const PARAMETER_LOCATIONS: [&str; 5] = ["query", "header", "path", "cookie", "querystring"];

/// Lints a parsed definition. Never mutates, never fails: every finding is
/// reported as an issue, errors and warnings alike.
pub fn validate(definition: &OpenApiDefinition) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    check_version(definition, &mut issues);
    check_info(definition, &mut issues);
    check_surface(definition, &mut issues);

    let mut seen_operation_ids = HashSet::new();
    if let Some(paths) = &definition.paths {
        for (template, item) in &paths.items {
            let base = format!("paths.{}", template);
            check_path_item(template, item, &base, &mut seen_operation_ids, &mut issues);
        }
    }
    if let Some(webhooks) = &definition.webhooks {
        for (name, item) in &webhooks.items {
            if let RefOr::Inline(item) = item {
                let base = format!("webhooks.{}", name);
                check_path_item(name, item, &base, &mut seen_operation_ids, &mut issues);
            }
        }
    }

    issues
}

fn check_version(definition: &OpenApiDefinition, issues: &mut Vec<ValidationIssue>) {
    match (&definition.openapi, &definition.swagger) {
        (Some(version), _) if !version.starts_with("3.") => {
            issues.push(ValidationIssue::warning(
                "openapi",
                format!("Unsupported OpenAPI version '{}'", version),
            ));
        }
        (None, Some(version)) => {
            issues.push(ValidationIssue::warning(
                "swagger",
                format!("Legacy Swagger {} document, treated best-effort", version),
            ));
        }
        _ => {}
    }
}

fn check_info(definition: &OpenApiDefinition, issues: &mut Vec<ValidationIssue>) {
    if let Some(info) = &definition.info {
        if info.title.is_empty() {
            issues.push(ValidationIssue::warning("info.title", "Title is empty"));
        }
        if info.version.is_empty() {
            issues.push(ValidationIssue::warning(
                "info.version",
                "Document version is empty",
            ));
        }
    }
}

fn check_surface(definition: &OpenApiDefinition, issues: &mut Vec<ValidationIssue>) {
    let has_paths = definition
        .paths
        .as_ref()
        .map(|p| !p.is_empty())
        .unwrap_or(false);
    let has_webhooks = definition
        .webhooks
        .as_ref()
        .map(|w| !w.items.is_empty())
        .unwrap_or(false);
    let has_components = definition
        .components
        .as_ref()
        .map(|c| !c.is_empty())
        .unwrap_or(false);
    if !has_paths && !has_webhooks && !has_components {
        issues.push(ValidationIssue::warning(
            "",
            "Document defines no paths, webhooks or components",
        ));
    }
}

fn check_path_item(
    template: &str,
    item: &PathItem,
    base: &str,
    seen_operation_ids: &mut HashSet<String>,
    issues: &mut Vec<ValidationIssue>,
) {
    for node in &item.parameters {
        check_parameter(node, &format!("{}.parameters", base), issues);
    }

    for (method, operation) in item.operations() {
        let op_path = format!("{}.{}", base, method);
        check_operation(template, operation, &op_path, seen_operation_ids, issues);
    }
    for (method, operation) in &item.additional_operations {
        let op_path = format!("{}.{}", base, method);
        check_operation(template, operation, &op_path, seen_operation_ids, issues);
    }
}

fn check_operation(
    template: &str,
    operation: &Operation,
    op_path: &str,
    seen_operation_ids: &mut HashSet<String>,
    issues: &mut Vec<ValidationIssue>,
) {
    if let Some(id) = &operation.operation_id {
        if !seen_operation_ids.insert(id.clone()) {
            issues.push(ValidationIssue::error(
                format!("{}.operationId", op_path),
                format!("Duplicate operationId '{}'", id),
            ));
        }
    }

    if operation.responses.is_empty() {
        issues.push(ValidationIssue::warning(
            format!("{}.responses", op_path),
            "Operation declares no responses",
        ));
    }

    for node in &operation.parameters {
        check_parameter(node, &format!("{}.parameters", op_path), issues);
    }

    // every template variable should be covered by a path parameter
    for variable in template_variables(template) {
        let covered = operation.parameters.iter().any(|node| {
            node.as_inline()
                .map(|p| p.location == "path" && p.name == variable)
                .unwrap_or(true) // unresolved ref: benefit of the doubt
        });
        if !covered {
            issues.push(ValidationIssue::warning(
                format!("{}.parameters", op_path),
                format!("Path variable '{{{}}}' has no path parameter", variable),
            ));
        }
    }

    for (status, node) in &operation.responses {
        if let RefOr::Inline(response) = node {
            if response.is_unresolved_stub() {
                issues.push(ValidationIssue::warning(
                    format!("{}.responses.{}", op_path, status),
                    "Response reference could not be resolved",
                ));
            }
        }
    }
}

fn check_parameter(
    node: &RefOr<crate::model::Parameter>,
    path: &str,
    issues: &mut Vec<ValidationIssue>,
) {
    let Some(parameter) = node.as_inline() else {
        return;
    };
    if !PARAMETER_LOCATIONS.contains(&parameter.location.as_str()) {
        issues.push(ValidationIssue::error(
            format!("{}.{}", path, parameter.name),
            format!("Unknown parameter location '{}'", parameter.location),
        ));
    }
    if parameter.location == "path" && !parameter.required {
        issues.push(ValidationIssue::error(
            format!("{}.{}", path, parameter.name),
            "Path parameters must be required",
        ));
    }
}

fn template_variables(template: &str) -> Vec<String> {
    let mut variables = Vec::new();
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let Some(close) = rest[open..].find('}') else {
            break;
        };
        variables.push(rest[open + 1..open + close].to_string());
        rest = &rest[open + close + 1..];
    }
    variables
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn definition(yaml: &str) -> OpenApiDefinition {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_root_gate_rejects_non_object() {
        assert!(validate_openapi_root(&json!("nope")).is_err());
        assert!(validate_openapi_root(&json!([1, 2])).is_err());
    }

    #[test]
    fn test_root_gate_requires_version_and_info() {
        assert!(validate_openapi_root(&json!({ "info": { "title": "t" } })).is_err());
        assert!(validate_openapi_root(&json!({ "openapi": "3.1.0" })).is_err());
        assert!(validate_openapi_root(
            &json!({ "openapi": "3.1.0", "info": { "title": "t", "version": "1" } })
        )
        .is_ok());
    }

    #[test]
    fn test_root_gate_accepts_legacy_swagger() {
        assert!(validate_openapi_root(
            &json!({ "swagger": "2.0", "info": { "title": "t", "version": "1" } })
        )
        .is_ok());
    }

    #[test]
    fn test_duplicate_operation_ids_flagged() {
        let def = definition(
            r##"
openapi: 3.1.0
info: { title: T, version: "1" }
paths:
  /a:
    get:
      operationId: dup
      responses: { "200": { description: ok } }
  /b:
    get:
      operationId: dup
      responses: { "200": { description: ok } }
"##,
        );
        let issues = validate(&def);
        assert!(issues
            .iter()
            .any(|i| i.severity == Severity::Error && i.message.contains("dup")));
    }

    #[test]
    fn test_optional_path_parameter_flagged() {
        let def = definition(
            r##"
openapi: 3.1.0
info: { title: T, version: "1" }
paths:
  /users/{id}:
    get:
      parameters:
        - name: id
          in: path
          required: false
      responses: { "200": { description: ok } }
"##,
        );
        let issues = validate(&def);
        assert!(issues
            .iter()
            .any(|i| i.severity == Severity::Error && i.message.contains("must be required")));
    }

    #[test]
    fn test_uncovered_template_variable_warned() {
        let def = definition(
            r##"
openapi: 3.1.0
info: { title: T, version: "1" }
paths:
  /users/{id}:
    get:
      responses: { "200": { description: ok } }
"##,
        );
        let issues = validate(&def);
        assert!(issues
            .iter()
            .any(|i| i.severity == Severity::Warning && i.message.contains("'{id}'")));
    }

    #[test]
    fn test_empty_document_warned_not_rejected() {
        let def = definition(
            r##"
openapi: 3.1.0
info: { title: T, version: "1" }
paths: {}
"##,
        );
        let issues = validate(&def);
        assert!(issues
            .iter()
            .all(|i| i.severity == Severity::Warning));
        assert!(!issues.is_empty());
    }

    #[test]
    fn test_clean_document_has_no_issues() {
        let def = definition(
            r##"
openapi: 3.1.0
info: { title: T, version: "1" }
paths:
  /users:
    get:
      operationId: listUsers
      responses: { "200": { description: ok } }
"##,
        );
        assert!(validate(&def).is_empty());
    }
}
