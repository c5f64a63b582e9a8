use runtype_core::check::{gte, refine_async};
use runtype_core::{
    ExecError, Value, number, object, pipe, safe_parse, safe_parse_async, string, transform,
    transform_async,
};

fn json(v: serde_json::Value) -> Value {
    v.into()
}

fn double_async() -> runtype_core::Schema {
    pipe(
        number(),
        transform_async(|value| {
            Box::pin(async move {
                match value {
                    Value::Number(n) => Value::Number(n * 2.0),
                    other => other,
                }
            })
        }),
    )
}

#[tokio::test]
async fn test_async_transform_runs_under_async_parse() {
    let schema = double_async();
    let outcome = safe_parse_async(&schema, Value::Number(21.0)).await.unwrap();
    assert_eq!(outcome.data(), Some(&Value::Number(42.0)));
}

#[tokio::test]
async fn test_async_matches_sync_ordering() {
    // The async engine awaits children in declaration order, so a schema
    // with async transforms must produce the same output and the same
    // issue ordering as its synchronous equivalent.
    let async_schema = object([
        ("a", double_async()),
        ("b", double_async()),
        ("c", number().check(gte(0.0))),
    ]);
    let sync_schema = object([
        (
            "a",
            pipe(
                number(),
                transform(|value| match value {
                    Value::Number(n) => Value::Number(n * 2.0),
                    other => other,
                }),
            ),
        ),
        (
            "b",
            pipe(
                number(),
                transform(|value| match value {
                    Value::Number(n) => Value::Number(n * 2.0),
                    other => other,
                }),
            ),
        ),
        ("c", number().check(gte(0.0))),
    ]);

    let good = serde_json::json!({"a": 1, "b": 2, "c": 3});
    let async_out = safe_parse_async(&async_schema, json(good.clone())).await.unwrap();
    let sync_out = safe_parse(&sync_schema, json(good)).unwrap();
    assert_eq!(async_out.data(), sync_out.data());

    let bad = serde_json::json!({"a": "x", "b": "y", "c": -1});
    let async_err = safe_parse_async(&async_schema, json(bad.clone())).await.unwrap();
    let sync_err = safe_parse(&sync_schema, json(bad)).unwrap();

    let async_issues = async_err.error().unwrap().issues();
    let sync_issues = sync_err.error().unwrap().issues();
    assert_eq!(async_issues.len(), sync_issues.len());
    for (a, s) in async_issues.iter().zip(sync_issues) {
        assert_eq!(a.path, s.path);
        assert_eq!(a.code.tag(), s.code.tag());
    }
}

#[tokio::test]
async fn test_async_refinement() {
    let schema = string().check(refine_async("not-taken", |value| {
        Box::pin(async move { !matches!(&value, Value::String(s) if s == "taken") })
    }));

    assert!(
        safe_parse_async(&schema, Value::from("free"))
            .await
            .unwrap()
            .success()
    );

    let outcome = safe_parse_async(&schema, Value::from("taken")).await.unwrap();
    assert!(!outcome.success());
}

#[tokio::test]
async fn test_sync_schema_runs_under_async_parse() {
    let schema = object([("n", number())]);
    let outcome = safe_parse_async(&schema, json(serde_json::json!({"n": 1})))
        .await
        .unwrap();
    assert!(outcome.success());
}

#[test]
fn test_async_transform_rejected_by_sync_parse() {
    let schema = double_async();
    let err = safe_parse(&schema, Value::Number(1.0)).unwrap_err();
    assert!(matches!(err, ExecError::AsyncInSyncContext));
}
