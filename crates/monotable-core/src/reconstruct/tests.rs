use super::*;
use crate::{config::CodecConfig, error::ErrorClass, registry::CodecRegistry};
use monotable_primitives::ScalarKind;
use monotable_schema::node::{EntitySchema, Property, PropertyKind, RelationshipDescriptor};
use std::sync::Arc;

fn wire(pairs: &[(&str, WireValue)]) -> WireRecord {
    pairs
        .iter()
        .map(|(name, value)| ((*name).to_string(), value.clone()))
        .collect()
}

fn order() -> EntitySchema {
    EntitySchema::builder("Order")
        .property(Property::text("pk").partition_key())
        .property(Property::text("sk").sort_key())
        .property(Property::scalar("total", ScalarKind::Int))
        .build()
        .expect("order schema")
}

fn customer() -> EntitySchema {
    EntitySchema::builder("Customer")
        .property(Property::text("pk").partition_key())
        .property(Property::text("sk").sort_key())
        .property(Property::text("name").nullable())
        .property(Property::new("tags", PropertyKind::List(ScalarKind::Text)))
        .property(Property::new("labels", PropertyKind::Set(ScalarKind::Text)))
        .property(Property::new("orders", PropertyKind::Related))
        .property(Property::new("profile", PropertyKind::Related))
        .relationship(RelationshipDescriptor::many("orders", "ORDER#*").schema("Order"))
        .relationship(RelationshipDescriptor::one("profile", "PROFILE"))
        .build()
        .expect("customer schema")
}

fn codec() -> Arc<EntityCodec> {
    let mut registry = CodecRegistry::new();
    registry
        .register(order(), CodecConfig::default())
        .expect("order");

    registry
        .register(customer(), CodecConfig::default())
        .expect("customer")
}

fn head(name: &str) -> WireRecord {
    wire(&[
        ("pk", WireValue::string("CUST#1")),
        ("sk", WireValue::string("CUSTOMER")),
        ("name", WireValue::string(name)),
    ])
}

#[test]
fn collection_items_accumulate_in_batch_order() {
    let codec = codec();
    let batch = vec![
        wire(&[
            ("pk", WireValue::string("CUST#1")),
            ("sk", WireValue::string("TAG#1")),
            ("tags", WireValue::string("red")),
        ]),
        wire(&[
            ("pk", WireValue::string("CUST#1")),
            ("sk", WireValue::string("TAG#2")),
            ("tags", WireValue::string("green")),
        ]),
        wire(&[
            ("pk", WireValue::string("CUST#1")),
            ("sk", WireValue::string("TAG#3")),
            ("tags", WireValue::string("blue")),
        ]),
    ];

    let record = reconstruct(&codec, &batch).expect("reconstruct");

    assert_eq!(
        record.field::<Vec<String>>("tags").expect("tags"),
        ["red", "green", "blue"]
    );
}

#[test]
fn list_encoded_contributions_are_flattened() {
    let codec = codec();
    let mut first = head("Ada");
    first.insert(
        "tags".into(),
        WireValue::List(vec![WireValue::string("a"), WireValue::string("b")]),
    );
    let second = wire(&[("tags", WireValue::string("c"))]);

    let record = reconstruct(&codec, &[first, second]).expect("reconstruct");

    assert_eq!(
        record.field::<Vec<String>>("tags").expect("tags"),
        ["a", "b", "c"]
    );
}

#[test]
fn set_contributions_are_merged_and_deduplicated() {
    let codec = codec();
    let batch = vec![
        wire(&[("labels", WireValue::string_set(["y", "x"]))]),
        wire(&[("labels", WireValue::string_set(["z", "y"]))]),
    ];

    let record = reconstruct(&codec, &batch).expect("reconstruct");

    assert_eq!(
        record.get("labels"),
        Some(&Value::set(["x", "y", "z"].map(Value::text)))
    );
}

#[test]
fn empty_contributions_leave_collections_unset() {
    let codec = codec();
    let mut first = head("Ada");
    first.insert("tags".into(), WireValue::List(Vec::new()));
    let second = wire(&[("labels", WireValue::StringSet(Default::default()))]);

    let record = reconstruct(&codec, &[first, second]).expect("reconstruct");

    assert!(!record.contains("tags"));
    assert!(!record.contains("labels"));
}

#[test]
fn first_record_holding_a_scalar_wins() {
    let codec = codec();
    let batch = vec![head("Ada"), head("Bob")];

    let record = reconstruct(&codec, &batch).expect("reconstruct");

    assert_eq!(record.field::<String>("name").expect("name"), "Ada");
    assert!(!record.contains("tags"));
}

#[test]
fn related_records_are_matched_by_sort_key() {
    let codec = codec();
    let batch = vec![
        head("Ada"),
        wire(&[
            ("pk", WireValue::string("CUST#1")),
            ("sk", WireValue::string("ORDER#2")),
            ("total", WireValue::number(20)),
        ]),
        wire(&[
            ("pk", WireValue::string("CUST#1")),
            ("sk", WireValue::string("PROFILE")),
            ("bio", WireValue::string("hello")),
        ]),
        wire(&[
            ("pk", WireValue::string("CUST#1")),
            ("sk", WireValue::string("ORDER#1")),
            ("total", WireValue::number(10)),
        ]),
    ];

    let record = reconstruct(&codec, &batch).expect("reconstruct");

    let Some(Value::List(orders)) = record.get("orders") else {
        panic!("orders should be a list: {record:?}");
    };
    let totals: Vec<i64> = orders
        .iter()
        .map(|order| match order {
            Value::Record(order) => order.field::<i64>("total").expect("total"),
            other => panic!("expected a record, found {other:?}"),
        })
        .collect();
    assert_eq!(totals, [20, 10]);

    let Some(Value::Map(profile)) = record.get("profile") else {
        panic!("profile should be an untyped map: {record:?}");
    };
    assert_eq!(profile.get("bio"), Some(&Value::text("hello")));
}

#[test]
fn related_records_that_do_not_match_the_related_schema_are_skipped() {
    let codec = codec();
    let batch = vec![
        head("Ada"),
        // no total: not an Order
        wire(&[
            ("pk", WireValue::string("CUST#1")),
            ("sk", WireValue::string("ORDER#9")),
        ]),
    ];

    let record = reconstruct(&codec, &batch).expect("reconstruct");

    assert!(!record.contains("orders"));
}

#[test]
fn empty_batch_is_a_reconstruction_error() {
    let err = reconstruct(&codec(), &[]).expect_err("empty batch");

    assert_eq!(err.class(), ErrorClass::Reconstruction);
    assert_eq!(err.entity(), "Customer");
}

#[test]
fn decode_failures_name_the_batch() {
    let codec = codec();
    let mut bad = head("Ada");
    bad.insert("name".into(), WireValue::number(5));

    let err = reconstruct(&codec, &[bad]).expect_err("N is not text");

    let CodecError::Reconstruction { record, source, .. } = &err else {
        panic!("expected reconstruction error, found {err:?}");
    };
    assert_eq!(record, "CUST#1/CUSTOMER");
    assert_eq!(
        source.as_deref().map(CodecError::class),
        Some(ErrorClass::Conversion)
    );
}

#[test]
fn sync_reconstruct_refuses_async_related_schemas() {
    let secret = EntitySchema::builder("Secret")
        .property(Property::text("pk").partition_key())
        .property(Property::new("pin", PropertyKind::Encrypted(ScalarKind::Text)))
        .build()
        .expect("secret schema");
    let owner = EntitySchema::builder("Owner")
        .property(Property::text("pk").partition_key())
        .property(Property::text("sk").sort_key())
        .property(Property::new("secret", PropertyKind::Related))
        .relationship(RelationshipDescriptor::one("secret", "SECRET").schema("Secret"))
        .build()
        .expect("owner schema");

    let mut registry = CodecRegistry::new();
    registry
        .register(secret, CodecConfig::default())
        .expect("secret");
    let codec = registry
        .register(owner, CodecConfig::default())
        .expect("owner");

    assert!(!codec.requires_async());

    let err = reconstruct(&codec, &[head("Ada")]).expect_err("related codec needs async");
    assert!(
        matches!(&err, CodecError::AsyncRequired { property, .. } if property == "secret"),
        "{err:?}"
    );
}
