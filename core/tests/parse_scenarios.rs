use std::sync::Arc;

use runtype_core::check::{gte, lt, min_length, refine, trim};
use runtype_core::{
    En, ExecError, IssueCode, ParseConfig, PathSegment, Ru, Value, array, catch, defaulted,
    discriminated_union, intersection, lazy, literal, number, object, optional, pipe, record,
    safe_parse, safe_parse_with, strict_object, string, transform, union,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn json(v: serde_json::Value) -> Value {
    v.into()
}

fn keys(path: &[PathSegment]) -> Vec<String> {
    path.iter()
        .map(|segment| match segment {
            PathSegment::Key(k) => k.clone(),
            PathSegment::Index(i) => i.to_string(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Idempotence
// ---------------------------------------------------------------------------

#[test]
fn test_reparse_of_valid_output_is_identity() {
    let schema = object([
        ("name", string().check(trim())),
        ("tags", array(string())),
        ("age", optional(number())),
    ]);
    let input = json(serde_json::json!({
        "name": "  Ada  ",
        "tags": ["a", "b"],
    }));

    let first = safe_parse(&schema, input).unwrap();
    assert!(first.success());
    let output = first.data().unwrap().clone();

    let second = safe_parse(&schema, output.clone()).unwrap();
    assert!(second.success());
    assert_eq!(second.data(), Some(&output));
}

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

#[test]
fn test_nested_failure_path() {
    let schema = object([("a", object([("b", number())]))]);
    let outcome = safe_parse(&schema, json(serde_json::json!({"a": {"b": "x"}}))).unwrap();

    let issues = outcome.error().unwrap().issues();
    assert_eq!(issues.len(), 1);
    assert_eq!(keys(&issues[0].path), ["a", "b"]);
    assert!(matches!(issues[0].code, IssueCode::InvalidType { .. }));
}

#[test]
fn test_array_failure_path_is_index() {
    let schema = array(number());
    let outcome = safe_parse(&schema, json(serde_json::json!([1, "x", 3]))).unwrap();

    let issues = outcome.error().unwrap().issues();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].path, [PathSegment::Index(1)]);
    assert!(matches!(issues[0].code, IssueCode::InvalidType { .. }));
}

// ---------------------------------------------------------------------------
// Unions
// ---------------------------------------------------------------------------

#[test]
fn test_union_first_match_wins() {
    // Two options accept the same input; the first one's output is used.
    let schema = union([
        pipe(literal("a"), transform(|_| Value::from("first"))),
        pipe(literal("a"), transform(|_| Value::from("second"))),
    ]);
    let outcome = safe_parse(&schema, Value::from("a")).unwrap();
    assert_eq!(outcome.data(), Some(&Value::from("first")));
}

#[test]
fn test_union_failure_embeds_every_option() {
    let schema = union([string(), number()]);
    let outcome = safe_parse(&schema, Value::Bool(true)).unwrap();

    let issues = outcome.error().unwrap().issues();
    assert_eq!(issues.len(), 1);
    let IssueCode::InvalidUnion { options } = &issues[0].code else {
        panic!("expected invalid_union");
    };
    assert_eq!(options.len(), 2);
}

#[test]
fn test_discriminated_union_checks_only_matching_option() {
    // ObjA requires "payload"; a valid ObjB input must not report it.
    let obj_a = object([("type", literal("x")), ("payload", string())]);
    let obj_b = object([("type", literal("y")), ("count", number())]);
    let schema = discriminated_union("type", [obj_a, obj_b]).unwrap();

    let outcome =
        safe_parse(&schema, json(serde_json::json!({"type": "y", "count": 3}))).unwrap();
    assert!(outcome.success());
}

#[test]
fn test_discriminated_union_reports_unknown_tag_at_discriminator() {
    let obj_a = object([("type", literal("x"))]);
    let obj_b = object([("type", literal("y"))]);
    let schema = discriminated_union("type", [obj_a, obj_b]).unwrap();

    let outcome = safe_parse(&schema, json(serde_json::json!({"type": "z"}))).unwrap();
    let issues = outcome.error().unwrap().issues();
    assert_eq!(issues.len(), 1);
    assert_eq!(keys(&issues[0].path), ["type"]);
    let IssueCode::InvalidValue { values } = &issues[0].code else {
        panic!("expected invalid_value");
    };
    assert_eq!(values.len(), 2);
}

// ---------------------------------------------------------------------------
// Object optionality
// ---------------------------------------------------------------------------

#[test]
fn test_absent_optional_key_stays_absent() {
    let schema = object([("a", optional(string()))]);
    let outcome = safe_parse(&schema, json(serde_json::json!({}))).unwrap();

    let Value::Object(map) = outcome.data().unwrap() else {
        panic!("expected object output");
    };
    assert!(!map.contains_key("a"));
}

#[test]
fn test_present_undefined_key_is_kept() {
    let schema = object([("a", optional(string()))]);
    let mut input = indexmap::IndexMap::new();
    input.insert("a".to_string(), Value::Undefined);

    let outcome = safe_parse(&schema, Value::Object(input)).unwrap();
    let Value::Object(map) = outcome.data().unwrap() else {
        panic!("expected object output");
    };
    assert_eq!(map.get("a"), Some(&Value::Undefined));
}

#[test]
fn test_strict_object_reports_unknown_keys() {
    let schema = strict_object([("a", string())]);
    let outcome =
        safe_parse(&schema, json(serde_json::json!({"a": "x", "b": 1, "c": 2}))).unwrap();

    let issues = outcome.error().unwrap().issues();
    assert_eq!(issues.len(), 1);
    let IssueCode::UnrecognizedKeys { keys } = &issues[0].code else {
        panic!("expected unrecognized_keys");
    };
    assert_eq!(keys, &["b", "c"]);
}

#[test]
fn test_loose_object_drops_unknown_keys() {
    let schema = object([("a", string())]);
    let outcome = safe_parse(&schema, json(serde_json::json!({"a": "x", "b": 1}))).unwrap();

    let Value::Object(map) = outcome.data().unwrap() else {
        panic!("expected object output");
    };
    assert!(outcome.success());
    assert_eq!(map.len(), 1);
}

// ---------------------------------------------------------------------------
// Checks and metadata folding
// ---------------------------------------------------------------------------

#[test]
fn test_tightest_bound_wins() {
    let schema = number().check(lt(10.0)).check(lt(5.0));

    let outcome = safe_parse(&schema, Value::Number(7.0)).unwrap();
    let issues = outcome.error().unwrap().issues();
    assert_eq!(issues.len(), 1);
    let IssueCode::TooBig { maximum, inclusive } = issues[0].code else {
        panic!("expected too_big");
    };
    assert_eq!(maximum, 5.0);
    assert!(!inclusive);

    assert!(safe_parse(&schema, Value::Number(4.0)).unwrap().success());
}

#[test]
fn test_negative_age_scenario() {
    let schema = object([("name", string()), ("age", number().check(gte(0.0)))]);
    let outcome =
        safe_parse(&schema, json(serde_json::json!({"name": "Al", "age": -1}))).unwrap();

    assert!(!outcome.success());
    let issues = outcome.error().unwrap().issues();
    assert_eq!(issues.len(), 1);
    assert_eq!(keys(&issues[0].path), ["age"]);
    let IssueCode::TooSmall { minimum, inclusive } = issues[0].code else {
        panic!("expected too_small");
    };
    assert_eq!(minimum, 0.0);
    assert!(inclusive);
}

#[test]
fn test_aborting_check_stops_later_checks() {
    let schema = string()
        .check(min_length(5).aborting())
        .check(refine("never", |_| false));

    let outcome = safe_parse(&schema, Value::from("ok")).unwrap();
    // Only the aborting length failure; the refine never ran.
    assert_eq!(outcome.error().unwrap().issues().len(), 1);
}

// ---------------------------------------------------------------------------
// Intersection
// ---------------------------------------------------------------------------

#[test]
fn test_intersection_merges_disjoint_objects() {
    let schema = intersection(object([("a", string())]), object([("b", number())]));
    let outcome = safe_parse(&schema, json(serde_json::json!({"a": "x", "b": 1}))).unwrap();

    assert!(outcome.success());
    assert_eq!(
        outcome.data().unwrap(),
        &json(serde_json::json!({"a": "x", "b": 1.0}))
    );
}

#[test]
fn test_intersection_conflict_is_contract_error() {
    // Both sides accept any value but produce different outputs for the
    // same primitive input, which cannot be merged.
    let schema = intersection(
        transform(|_| Value::Number(1.0)),
        transform(|_| Value::Number(2.0)),
    );
    let err = safe_parse(&schema, Value::Null).unwrap_err();
    assert!(matches!(err, ExecError::IntersectionConflict(_)));
}

// ---------------------------------------------------------------------------
// Record, defaults, catch, coercion
// ---------------------------------------------------------------------------

#[test]
fn test_record_closed_domain_flags_unknown_keys() {
    let key = runtype_core::enumeration([Value::from("a"), Value::from("b")]);
    let schema = record(key, number());

    let outcome =
        safe_parse(&schema, json(serde_json::json!({"a": 1, "b": 2, "zzz": 3}))).unwrap();
    let issues = outcome.error().unwrap().issues();
    assert_eq!(issues.len(), 1);
    assert!(matches!(issues[0].code, IssueCode::UnrecognizedKeys { .. }));
}

#[test]
fn test_record_open_domain_reports_invalid_key() {
    let schema = record(string().check(min_length(3)), number());
    let outcome = safe_parse(&schema, json(serde_json::json!({"ab": 1}))).unwrap();

    let issues = outcome.error().unwrap().issues();
    assert_eq!(issues.len(), 1);
    assert!(matches!(issues[0].code, IssueCode::InvalidKey { .. }));
    assert_eq!(keys(&issues[0].path), ["ab"]);
}

#[test]
fn test_default_substitutes_without_validating() {
    // The default value deliberately violates the inner schema; it is
    // trusted, not validated.
    let schema = object([("n", defaulted(number().check(gte(10.0)), 0.0))]);
    let outcome = safe_parse(&schema, json(serde_json::json!({}))).unwrap();
    assert!(outcome.success());
    assert_eq!(
        outcome.data().unwrap(),
        &json(serde_json::json!({"n": 0.0}))
    );
}

#[test]
fn test_catch_recovers_with_fallback() {
    let schema = catch(number(), |_input, issues| {
        Value::Number(issues.len() as f64)
    });
    let outcome = safe_parse(&schema, Value::from("nope")).unwrap();
    assert!(outcome.success());
    assert_eq!(outcome.data(), Some(&Value::Number(1.0)));
}

#[test]
fn test_string_coercion() {
    let schema = number().coerce();
    let outcome = safe_parse(&schema, Value::from("  4.5 ")).unwrap();
    assert_eq!(outcome.data(), Some(&Value::Number(4.5)));
}

// ---------------------------------------------------------------------------
// Recursive schemas
// ---------------------------------------------------------------------------

#[test]
fn test_recursive_tree_parses() {
    let (node_ref, slot) = lazy();
    let node = Arc::new(object([
        ("label", string()),
        ("children", optional(array(node_ref))),
    ]));
    slot.resolve(node.clone()).unwrap();

    let input = json(serde_json::json!({
        "label": "root",
        "children": [
            {"label": "a"},
            {"label": "b", "children": [{"label": "c"}]},
        ],
    }));
    assert!(safe_parse(&node, input).unwrap().success());

    let bad = json(serde_json::json!({
        "label": "root",
        "children": [{"label": 1}],
    }));
    let outcome = safe_parse(&node, bad).unwrap();
    let issues = outcome.error().unwrap().issues();
    assert_eq!(keys(&issues[0].path), ["children", "0", "label"]);
}

#[test]
fn test_unresolved_lazy_is_contract_error() {
    let (node_ref, _slot) = lazy();
    let err = safe_parse(&node_ref, Value::Null).unwrap_err();
    assert!(matches!(err, ExecError::UnresolvedLazy));
}

// ---------------------------------------------------------------------------
// Localization and message overrides
// ---------------------------------------------------------------------------

#[test]
fn test_locale_selects_message_language() {
    let schema = number();

    let en = safe_parse_with(&schema, Value::from("x"), &ParseConfig::default().with_locale(En))
        .unwrap();
    let message = en.error().unwrap().issues()[0].message.clone().unwrap();
    assert!(message.contains("expected number"));

    let ru = safe_parse_with(&schema, Value::from("x"), &ParseConfig::default().with_locale(Ru))
        .unwrap();
    let message = ru.error().unwrap().issues()[0].message.clone().unwrap();
    assert!(message.contains("неверный тип"));
}

#[test]
fn test_check_message_override_beats_locale() {
    let schema = number().check(gte(18.0).message("adults only"));
    let outcome = safe_parse(&schema, Value::Number(3.0)).unwrap();
    assert_eq!(
        outcome.error().unwrap().issues()[0].message.as_deref(),
        Some("adults only")
    );
}

#[test]
fn test_per_call_error_map_wins_over_locale() {
    let config = ParseConfig::default()
        .with_error_map(|issue| match issue.code {
            IssueCode::InvalidType { .. } => Some("type mismatch".to_string()),
            _ => None,
        });
    let outcome = safe_parse_with(&number(), Value::from("x"), &config).unwrap();
    assert_eq!(
        outcome.error().unwrap().issues()[0].message.as_deref(),
        Some("type mismatch")
    );
}
