use std::sync::Arc;

use runtype_core::check::{format, gt, lte, min_length, pattern};
use runtype_core::formats::StringFormat;
use runtype_core::registry::{Registry, RegistryEntry};
use runtype_core::{
    array, defaulted, lazy, map_of, nullable, number, object, optional, string, union,
};
use runtype_jsonschema::{
    ExportError, ExportOptions, ReusePolicy, UnrepresentableBehavior, registry_to_json_schema,
    to_json_schema,
};

fn export(schema: &Arc<runtype_core::Schema>) -> serde_json::Value {
    to_json_schema(schema, &ExportOptions::default()).unwrap()
}

// ---------------------------------------------------------------------------
// Keyword mapping
// ---------------------------------------------------------------------------

#[test]
fn test_constraints_fold_into_keywords() {
    let schema = Arc::new(object([
        (
            "name",
            string().check(min_length(1)).check(pattern("^[a-z]+$").unwrap()),
        ),
        ("age", number().check(gt(0.0)).check(lte(150.0))),
        ("email", optional(string().check(format(StringFormat::Email)))),
    ]));
    let doc = export(&schema);

    assert_eq!(doc["type"], "object");
    assert_eq!(doc["properties"]["name"]["minLength"], 1);
    assert_eq!(doc["properties"]["name"]["pattern"], "^[a-z]+$");
    assert_eq!(doc["properties"]["age"]["exclusiveMinimum"], 0.0);
    assert_eq!(doc["properties"]["age"]["maximum"], 150.0);
    assert_eq!(doc["properties"]["email"]["format"], "email");
    assert_eq!(doc["required"], serde_json::json!(["name", "age"]));
}

#[test]
fn test_union_nullable_default() {
    let schema = Arc::new(object([
        ("kind", union([string(), number()])),
        ("note", nullable(string())),
        ("retries", defaulted(number(), 3.0)),
    ]));
    let doc = export(&schema);

    assert!(doc["properties"]["kind"]["anyOf"].is_array());
    assert_eq!(
        doc["properties"]["note"]["anyOf"][1],
        serde_json::json!({"type": "null"})
    );
    assert_eq!(doc["properties"]["retries"]["default"], 3.0);
}

// ---------------------------------------------------------------------------
// Unrepresentable kinds
// ---------------------------------------------------------------------------

#[test]
fn test_map_is_unrepresentable_by_default() {
    let schema = Arc::new(map_of(string(), number()));
    let err = to_json_schema(&schema, &ExportOptions::default()).unwrap_err();
    assert!(matches!(err, ExportError::Unrepresentable("map")));
}

#[test]
fn test_unrepresentable_any_emits_empty_schema() {
    let schema = Arc::new(map_of(string(), number()));
    let options = ExportOptions {
        unrepresentable: UnrepresentableBehavior::Any,
        ..Default::default()
    };
    assert_eq!(to_json_schema(&schema, &options).unwrap(), serde_json::json!({}));
}

// ---------------------------------------------------------------------------
// Cycles and reuse
// ---------------------------------------------------------------------------

#[test]
fn test_cyclic_schema_lands_in_defs() {
    let (node_ref, slot) = lazy();
    let node = Arc::new(object([
        ("label", string()),
        ("children", optional(array(node_ref))),
    ]));
    slot.resolve(node.clone()).unwrap();

    let doc = export(&node);
    let defs = doc["$defs"].as_object().unwrap();
    assert_eq!(defs.len(), 1);
    let (name, body) = defs.iter().next().unwrap();
    let reference = format!("#/$defs/{name}");
    assert_eq!(doc["$ref"], reference);
    assert_eq!(
        body["properties"]["children"]["items"]["$ref"],
        reference
    );
}

#[test]
fn test_shared_subschema_inlined_once_per_site() {
    let address = Arc::new(object([("street", string())]));
    let schema = Arc::new(object([
        ("home", address.clone()),
        ("work", address.clone()),
    ]));

    let doc = export(&schema);
    // Plain reuse is not a cycle: both sites are inlined, no $defs.
    assert!(doc.get("$defs").is_none());
    assert_eq!(doc["properties"]["home"], doc["properties"]["work"]);
}

#[test]
fn test_ref_policy_extracts_id_nodes() {
    let address = Arc::new(object([("street", string())]));
    let schema = Arc::new(object([
        ("home", address.clone()),
        ("work", address.clone()),
    ]));

    let mut registry = Registry::new();
    registry.add(
        &address,
        RegistryEntry::new().with_id("address").with_title("Address"),
    );

    let options = ExportOptions {
        registry: Some(&registry),
        reuse: ReusePolicy::Ref,
        ..Default::default()
    };
    let doc = to_json_schema(&schema, &options).unwrap();

    assert_eq!(doc["properties"]["home"]["$ref"], "#/$defs/address");
    assert_eq!(doc["properties"]["work"]["$ref"], "#/$defs/address");
    assert_eq!(doc["$defs"]["address"]["title"], "Address");
}

// ---------------------------------------------------------------------------
// Registry export
// ---------------------------------------------------------------------------

#[test]
fn test_registry_document_cross_references() {
    let address = Arc::new(object([("street", string())]));
    let person = Arc::new(object([
        ("name", Arc::new(string())),
        ("address", address.clone()),
    ]));

    let mut registry = Registry::new();
    registry.add(&address, RegistryEntry::new().with_id("address"));
    registry.add(
        &person,
        RegistryEntry::new()
            .with_id("person")
            .with_description("a person"),
    );

    let doc = registry_to_json_schema(&registry, &ExportOptions::default()).unwrap();
    let defs = doc["$defs"].as_object().unwrap();
    assert_eq!(defs.len(), 2);
    assert_eq!(
        defs["person"]["properties"]["address"]["$ref"],
        "#/$defs/address"
    );
    assert_eq!(defs["person"]["description"], "a person");
}
