//! JSON Schema validation
//!
//! Supports the draft-07 keywords the suite's schemas use: `type`,
//! `properties`, `required`, `additionalProperties`, `items`,
//! `minItems`/`maxItems`, `minLength`/`maxLength`, `pattern`,
//! `minimum`/`maximum` and their exclusive forms, `enum`, `const` and
//! `format: email`. Unknown keywords are ignored.

use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{E2eError, E2eResult};
use crate::expect::validate_email;

/// Result of validating one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub valid: bool,
    /// One entry per violation, in evaluation order. Properties are visited
    /// in key order.
    pub errors: Vec<String>,
}

impl ValidationOutcome {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    fn failed(detail: impl std::fmt::Display) -> Self {
        Self {
            valid: false,
            errors: vec![format!("Schema validation failed: {}", detail)],
        }
    }

    /// All violations joined with `; `.
    pub fn summary(&self) -> String {
        self.errors.join("; ")
    }
}

/// Validate `json` against `schema`. Never fails: unparsable input of either
/// kind becomes a single error entry.
pub fn validate(json: &str, schema: &str) -> ValidationOutcome {
    let schema: Value = match serde_json::from_str(schema) {
        Ok(schema) => schema,
        Err(e) => return ValidationOutcome::failed(format!("invalid schema: {}", e)),
    };
    let instance: Value = match serde_json::from_str(json) {
        Ok(instance) => instance,
        Err(e) => return ValidationOutcome::failed(format!("invalid JSON: {}", e)),
    };
    if !matches!(schema, Value::Object(_) | Value::Bool(_)) {
        return ValidationOutcome::failed("schema must be an object or a boolean");
    }
    ValidationOutcome::from_errors(validate_value(&instance, &schema))
}

/// Violations of `schema` by an already parsed `instance`.
pub fn validate_value(instance: &Value, schema: &Value) -> Vec<String> {
    let mut errors = Vec::new();
    check(instance, schema, "", &mut errors);
    errors
}

fn location(pointer: &str) -> &str {
    if pointer.is_empty() {
        "/"
    } else {
        pointer
    }
}

fn check(instance: &Value, schema: &Value, pointer: &str, errors: &mut Vec<String>) {
    let schema = match schema {
        Value::Bool(true) => return,
        Value::Bool(false) => {
            errors.push(format!("{}: no value is allowed here", location(pointer)));
            return;
        }
        Value::Object(schema) => schema,
        _ => return,
    };

    if let Some(expected) = schema.get("type") {
        if !matches_type(instance, expected) {
            errors.push(format!(
                "{}: expected type {}, found {}",
                location(pointer),
                describe_type(expected),
                type_name(instance)
            ));
            // Remaining keywords assume the declared type.
            return;
        }
    }

    if let Some(allowed) = schema.get("enum").and_then(Value::as_array) {
        if !allowed.contains(instance) {
            errors.push(format!("{}: value {} is not one of {}", location(pointer), instance, Value::Array(allowed.clone())));
        }
    }
    if let Some(expected) = schema.get("const") {
        if expected != instance {
            errors.push(format!("{}: expected constant {}, found {}", location(pointer), expected, instance));
        }
    }

    match instance {
        Value::Object(object) => check_object(object, schema, pointer, errors),
        Value::Array(items) => check_array(items, schema, pointer, errors),
        Value::String(text) => check_string(text, schema, pointer, errors),
        Value::Number(_) => check_number(instance, schema, pointer, errors),
        _ => {}
    }
}

fn check_object(object: &Map<String, Value>, schema: &Map<String, Value>, pointer: &str, errors: &mut Vec<String>) {
    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for name in required.iter().filter_map(Value::as_str) {
            if !object.contains_key(name) {
                errors.push(format!("{}: missing required property '{}'", location(pointer), name));
            }
        }
    }

    let properties = schema.get("properties").and_then(Value::as_object);
    if let Some(properties) = properties {
        for (name, property_schema) in properties {
            if let Some(value) = object.get(name) {
                check(value, property_schema, &child(pointer, name), errors);
            }
        }
    }

    if let Some(additional) = schema.get("additionalProperties") {
        let extras = object
            .iter()
            .filter(|(name, _)| !properties.is_some_and(|p| p.contains_key(name.as_str())));
        for (name, value) in extras {
            match additional {
                Value::Bool(false) => errors.push(format!(
                    "{}: additional property '{}' is not allowed",
                    location(pointer),
                    name
                )),
                other => check(value, other, &child(pointer, name), errors),
            }
        }
    }
}

fn check_array(items: &[Value], schema: &Map<String, Value>, pointer: &str, errors: &mut Vec<String>) {
    if let Some(min) = schema.get("minItems").and_then(Value::as_u64) {
        if (items.len() as u64) < min {
            errors.push(format!("{}: expected at least {} items, found {}", location(pointer), min, items.len()));
        }
    }
    if let Some(max) = schema.get("maxItems").and_then(Value::as_u64) {
        if (items.len() as u64) > max {
            errors.push(format!("{}: expected at most {} items, found {}", location(pointer), max, items.len()));
        }
    }
    if let Some(item_schema) = schema.get("items") {
        for (index, item) in items.iter().enumerate() {
            check(item, item_schema, &child(pointer, &index.to_string()), errors);
        }
    }
}

fn check_string(text: &str, schema: &Map<String, Value>, pointer: &str, errors: &mut Vec<String>) {
    let length = text.chars().count() as u64;
    if let Some(min) = schema.get("minLength").and_then(Value::as_u64) {
        if length < min {
            errors.push(format!("{}: string is shorter than minLength {}", location(pointer), min));
        }
    }
    if let Some(max) = schema.get("maxLength").and_then(Value::as_u64) {
        if length > max {
            errors.push(format!("{}: string is longer than maxLength {}", location(pointer), max));
        }
    }
    if let Some(pattern) = schema.get("pattern").and_then(Value::as_str) {
        match Regex::new(pattern) {
            Ok(re) if !re.is_match(text) => {
                errors.push(format!("{}: '{}' does not match pattern {}", location(pointer), text, pattern))
            }
            Ok(_) => {}
            Err(e) => errors.push(format!("{}: invalid pattern {}: {}", location(pointer), pattern, e)),
        }
    }
    if schema.get("format").and_then(Value::as_str) == Some("email") && !validate_email(text) {
        errors.push(format!("{}: '{}' is not a valid email", location(pointer), text));
    }
}

fn check_number(instance: &Value, schema: &Map<String, Value>, pointer: &str, errors: &mut Vec<String>) {
    let Some(value) = instance.as_f64() else {
        return;
    };
    let bound = |key: &str| schema.get(key).and_then(Value::as_f64);

    if let Some(min) = bound("minimum") {
        if value < min {
            errors.push(format!("{}: {} is less than minimum {}", location(pointer), instance, min));
        }
    }
    if let Some(max) = bound("maximum") {
        if value > max {
            errors.push(format!("{}: {} is greater than maximum {}", location(pointer), instance, max));
        }
    }
    if let Some(min) = bound("exclusiveMinimum") {
        if value <= min {
            errors.push(format!("{}: {} is not greater than exclusiveMinimum {}", location(pointer), instance, min));
        }
    }
    if let Some(max) = bound("exclusiveMaximum") {
        if value >= max {
            errors.push(format!("{}: {} is not less than exclusiveMaximum {}", location(pointer), instance, max));
        }
    }
}

fn child(pointer: &str, segment: &str) -> String {
    format!("{}/{}", pointer, segment.replace('~', "~0").replace('/', "~1"))
}

fn matches_type(instance: &Value, expected: &Value) -> bool {
    match expected {
        Value::String(name) => is_type(instance, name),
        Value::Array(names) => names.iter().filter_map(Value::as_str).any(|name| is_type(instance, name)),
        _ => true,
    }
}

fn is_type(instance: &Value, name: &str) -> bool {
    match name {
        "object" => instance.is_object(),
        "array" => instance.is_array(),
        "string" => instance.is_string(),
        "boolean" => instance.is_boolean(),
        "null" => instance.is_null(),
        "number" => instance.is_number(),
        "integer" => {
            instance.is_i64()
                || instance.is_u64()
                || instance.as_f64().is_some_and(|f| f.fract() == 0.0)
        }
        _ => false,
    }
}

fn describe_type(expected: &Value) -> String {
    match expected {
        Value::String(name) => name.clone(),
        Value::Array(names) => names
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(" or "),
        other => other.to_string(),
    }
}

fn type_name(instance: &Value) -> &'static str {
    match instance {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Schemas discovered under one directory, keyed by file stem.
#[derive(Debug, Clone, Default)]
pub struct SchemaStore {
    schemas: HashMap<String, String>,
}

impl SchemaStore {
    /// Load every `*.json` file below `dir`.
    pub fn load(dir: &Path) -> E2eResult<Self> {
        let mut schemas = HashMap::new();

        for entry in walkdir::WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.path().extension().map(|ext| ext == "json").unwrap_or(false))
        {
            let Some(stem) = entry.path().file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            debug!("Loaded schema {} from {}", stem, entry.path().display());
            schemas.insert(stem.to_string(), std::fs::read_to_string(entry.path())?);
        }

        Ok(Self { schemas })
    }

    pub fn insert(&mut self, name: impl Into<String>, schema: impl Into<String>) {
        self.schemas.insert(name.into(), schema.into());
    }

    pub fn get(&self, name: &str) -> E2eResult<&str> {
        self.schemas
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| E2eError::SchemaNotFound(name.to_string()))
    }

    /// Validate `json` against the schema called `name`.
    pub fn validate(&self, name: &str, json: &str) -> E2eResult<ValidationOutcome> {
        Ok(validate(json, self.get(name)?))
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.schemas.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Default schema directory bundled with the crate.
pub fn bundled_schema_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("testdata/schemas")
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    const POST_SCHEMA: &str = include_str!("../testdata/schemas/post_schema.json");
    const COMMENT_SCHEMA: &str = include_str!("../testdata/schemas/comment_schema.json");

    #[test_case(r#"{"userId":1,"id":1,"title":"t","body":"b"}"#, true ; "complete post")]
    #[test_case(r#"{"userId":1,"id":101,"title":"foo","body":"bar","extra":true}"#, true ; "extra fields allowed")]
    #[test_case(r#"{"userId":1,"title":"t","body":"b"}"#, false ; "missing id")]
    #[test_case(r#"{"userId":"1","id":1,"title":"t","body":"b"}"#, false ; "string user id")]
    #[test_case(r#"{"userId":0,"id":101,"title":"","body":""}"#, false ; "empty echo of invalid post")]
    #[test_case(r#"[]"#, false ; "array instead of object")]
    fn test_post_schema(json: &str, valid: bool) {
        let outcome = validate(json, POST_SCHEMA);
        assert_eq!(outcome.valid, valid, "{:?}", outcome.errors);
        assert_eq!(outcome.errors.is_empty(), valid);
    }

    #[test_case("Jayne_Kuhic@sydney.com", true ; "valid email")]
    #[test_case("invalid-email", false ; "invalid email")]
    fn test_comment_email_format(email: &str, valid: bool) {
        let json = serde_json::json!({
            "postId": 1, "id": 2, "name": "n", "email": email, "body": "b"
        });
        assert_eq!(validate(&json.to_string(), COMMENT_SCHEMA).valid, valid);
    }

    #[test]
    fn test_unparsable_schema_is_single_error() {
        let outcome = validate("{}", "not a schema");
        assert!(!outcome.valid);
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].starts_with("Schema validation failed: "));
    }

    #[test]
    fn test_unparsable_json_is_single_error() {
        let outcome = validate("{", POST_SCHEMA);
        assert!(!outcome.valid);
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].starts_with("Schema validation failed: "));
    }

    #[test]
    fn test_violations_in_evaluation_order() {
        let outcome = validate(r#"{"userId":0,"title":""}"#, POST_SCHEMA);
        assert_eq!(
            outcome.errors,
            vec![
                "/: missing required property 'id'".to_string(),
                "/: missing required property 'body'".to_string(),
                "/title: string is shorter than minLength 1".to_string(),
                "/userId: 0 is less than minimum 1".to_string(),
            ]
        );
    }

    #[test]
    fn test_nested_items_and_additional_properties() {
        let schema = r#"{
            "type": "object",
            "properties": {"tags": {"type": "array", "items": {"type": "string"}, "minItems": 1}},
            "additionalProperties": false
        }"#;
        let outcome = validate(r#"{"tags":["a",2],"x":1}"#, schema);
        assert_eq!(
            outcome.errors,
            vec![
                "/tags/1: expected type string, found integer".to_string(),
                "/: additional property 'x' is not allowed".to_string(),
            ]
        );
        assert!(validate(r#"{"tags":["a"]}"#, schema).valid);
    }

    #[test]
    fn test_enum_const_and_pattern() {
        let schema = r#"{"properties": {
            "state": {"enum": ["open", "closed"]},
            "kind": {"const": "post"},
            "slug": {"type": "string", "pattern": "^[a-z-]+$"}
        }}"#;
        assert!(validate(r#"{"state":"open","kind":"post","slug":"a-b"}"#, schema).valid);
        let outcome = validate(r#"{"state":"x","kind":"comment","slug":"A"}"#, schema);
        assert_eq!(outcome.errors.len(), 3);
    }

    #[test]
    fn test_store_loads_by_stem() {
        let store = SchemaStore::load(&bundled_schema_dir()).unwrap();
        assert_eq!(store.names(), vec!["comment_schema", "post_schema"]);
        let outcome = store
            .validate("post_schema", r#"{"userId":1,"id":1,"title":"t","body":"b"}"#)
            .unwrap();
        assert!(outcome.valid);
        assert!(matches!(store.get("user_schema"), Err(E2eError::SchemaNotFound(_))));
    }
}
