//! Binding validated documents into application structs.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use schemata::{
    record_target, ArraySchema, BooleanSchema, DateTimeSchema, DurationSchema, IntegerSchema,
    MapError, MapSchema, ObjectSchema, Schema, StringEnumSchema, StringSchema, UriSchema,
};
use serde_json::{json, Value};
use url::Url;

#[derive(Debug, Default)]
struct Endpoint {
    url: Option<Url>,
    timeout: Option<Duration>,
}

record_target!(Endpoint {
    "url" => url,
    "timeout" => timeout,
});

#[derive(Debug, Default)]
struct Service {
    name: String,
    replicas: u8,
    tier: String,
    enabled: Option<bool>,
    created: Option<DateTime<Utc>>,
    endpoints: Vec<Endpoint>,
    labels: BTreeMap<String, String>,
    extra: Value,
}

record_target!(Service {
    "name" => name,
    "replicas" => replicas,
    "tier" => tier,
    "enabled" => enabled,
    "created" => created,
    "endpoints" => endpoints,
    "labels" => labels,
    "x-extra" => extra,
});

fn service_schema() -> Schema {
    let endpoint = ObjectSchema::new()
        .property("url", UriSchema::default())
        .property("timeout", DurationSchema::default())
        .require("url");
    ObjectSchema::new()
        .property("name", StringSchema::default().with_length(1, 63))
        .property("replicas", IntegerSchema::new(0, 200))
        .property(
            "tier",
            StringEnumSchema::new(["frontend", "backend"]).expect("non-empty enum"),
        )
        .property("enabled", BooleanSchema::default())
        .property("created", DateTimeSchema::default())
        .property("endpoints", ArraySchema::new(endpoint))
        .property("labels", MapSchema::new(StringSchema::default()))
        .property("x-extra", ObjectSchema::new().allow_additional())
        .require("name")
        .require("replicas")
        .into()
}

fn document() -> Value {
    json!({
        "name": "billing",
        "replicas": 3,
        "tier": "backend",
        "created": "2026-02-01T08:30:00+01:00",
        "endpoints": [
            {"url": "https://billing.internal/api", "timeout": "1m"},
            {"url": "https://billing.internal/health"},
        ],
        "labels": {"team": "payments", "cost-center": "42"},
        "x-extra": {"anything": [1, 2, 3]},
    })
}

#[test]
fn full_document_binds_every_field() {
    let mut service = Service::default();
    service_schema()
        .map(&document(), &mut service)
        .expect("document maps");

    assert_eq!(service.name, "billing");
    assert_eq!(service.replicas, 3);
    assert_eq!(service.tier, "backend");
    assert_eq!(service.enabled, None);
    assert_eq!(
        service.created.map(|t| t.to_rfc3339()),
        Some("2026-02-01T07:30:00+00:00".to_string())
    );
    assert_eq!(service.endpoints.len(), 2);
    assert_eq!(
        service.endpoints[0].url.as_ref().map(Url::as_str),
        Some("https://billing.internal/api")
    );
    assert_eq!(service.endpoints[0].timeout, Some(Duration::minutes(1)));
    assert_eq!(service.endpoints[1].timeout, None);
    assert_eq!(service.labels["cost-center"], "42");
    assert_eq!(service.extra, json!({"anything": [1, 2, 3]}));
}

#[test]
fn invalid_document_reports_every_issue_with_paths() {
    let mut doc = document();
    doc["replicas"] = json!(500);
    doc["endpoints"][1]["url"] = json!("not a url");
    doc["labels"]["cost-center"] = json!(42);
    doc["unknown"] = json!(true);

    let mut service = Service::default();
    let err = match service_schema().map(&doc, &mut service) {
        Err(MapError::Validation(e)) => e,
        other => panic!("expected validation failure, got {other:?}"),
    };
    let paths: Vec<String> = err
        .issues("service")
        .iter()
        .map(|issue| issue.path().to_string())
        .collect();
    assert_eq!(
        paths,
        vec![
            "service.endpoints[1].url",
            "service.labels[\"cost-center\"]",
            "service.replicas",
            "service.unknown",
        ]
    );
    assert_eq!(service.name, "", "invalid input leaves the target untouched");
}

#[test]
fn narrow_field_is_a_type_mismatch() {
    #[derive(Debug, Default)]
    struct Narrow {
        name: String,
        replicas: i8,
    }

    record_target!(Narrow {
        "name" => name,
        "replicas" => replicas,
    });

    let schema: Schema = ObjectSchema::new()
        .property("name", StringSchema::default())
        .property("replicas", IntegerSchema::new(0, 200))
        .into();
    let mut target = Narrow::default();
    let err = schema
        .map(&json!({"name": "a", "replicas": 1}), &mut target)
        .unwrap_err();
    assert!(err.is_type_mismatch());
    assert_eq!(target.name, "", "mismatch is found before any field is written");

    let err = schema.map(&json!({"name": "a"}), &mut target).unwrap_err();
    assert!(err.is_type_mismatch(), "absent properties still need a fitting field");
}

#[test]
fn failed_sequence_binding_leaves_previous_contents() {
    #[derive(Debug, Default)]
    struct Holder {
        values: Vec<u8>,
    }

    record_target!(Holder { "values" => values });

    let schema: Schema = ObjectSchema::new()
        .property("values", ArraySchema::new(IntegerSchema::new(-1, 10)))
        .into();
    let mut target = Holder {
        values: vec![7, 7],
    };
    let err = schema
        .map(&json!({"values": [1, 2]}), &mut target)
        .unwrap_err();
    assert!(err.is_type_mismatch());
    assert_eq!(target.values, vec![7, 7]);
}
