use crate::prelude::*;

fn user_builder() -> EntitySchemaBuilder {
    EntitySchema::builder("User")
        .property(Property::text("tenant"))
        .property(Property::text("id"))
        .property(
            Property::new(
                "pk",
                PropertyKind::ComputedKey(ComputedKeyFormula::joined(["tenant", "id"], "#")),
            )
            .partition_key(),
        )
}

fn expect_invalid(builder: EntitySchemaBuilder, needle: &str) {
    let err = builder.build().expect_err("schema should be rejected");
    assert!(
        err.errors().contains(needle),
        "expected '{needle}' in:\n{}",
        err.errors()
    );
}

#[test]
fn valid_schema_builds() {
    let schema = user_builder()
        .property(Property::scalar("age", ScalarKind::Uint).nullable())
        .discriminator(&DiscriminatorSpec::legacy("USER"))
        .build()
        .expect("schema should validate");

    assert_eq!(schema.wire_mapped_count(), 4);
    assert_eq!(schema.partition_key().map(|p| p.name.as_str()), Some("pk"));
}

#[test]
fn duplicate_wire_names_are_rejected() {
    expect_invalid(
        user_builder().property(Property::text("email").wire("tenant")),
        "wire name 'tenant' is already used",
    );
}

#[test]
fn duplicate_property_names_are_rejected() {
    expect_invalid(
        user_builder().property(Property::text("id").wire("id2")),
        "duplicate property name 'id'",
    );
}

#[test]
fn extracted_keys_do_not_claim_wire_names() {
    let schema = user_builder()
        .property(Property::new(
            "tenant_copy",
            PropertyKind::ExtractedKey(ExtractedKeyRule::new("pk", "#", 0)),
        ))
        .build()
        .expect("extracted keys are not wire-mapped");

    assert_eq!(schema.wire_mapped_count(), 3);
}

#[test]
fn forward_computed_key_reference_is_rejected() {
    let builder = EntitySchema::builder("Order")
        .property(Property::text("id"))
        .property(
            Property::new(
                "pk",
                PropertyKind::ComputedKey(ComputedKeyFormula::joined(["sk", "id"], "#")),
            )
            .partition_key(),
        )
        .property(
            Property::new(
                "sk",
                PropertyKind::ComputedKey(ComputedKeyFormula::joined(["id"], "#")),
            )
            .sort_key(),
        );

    expect_invalid(builder, "forward or cyclic reference");
}

#[test]
fn self_referencing_computed_key_is_rejected() {
    let builder = EntitySchema::builder("Loop").property(
        Property::new(
            "pk",
            PropertyKind::ComputedKey(ComputedKeyFormula::joined(["pk"], "#")),
        )
        .partition_key(),
    );

    expect_invalid(builder, "forward or cyclic reference");
}

#[test]
fn earlier_computed_key_may_feed_a_later_one() {
    EntitySchema::builder("Order")
        .property(Property::text("tenant"))
        .property(Property::new(
            "scope",
            PropertyKind::ComputedKey(ComputedKeyFormula::joined(["tenant"], "#")),
        ))
        .property(
            Property::new(
                "pk",
                PropertyKind::ComputedKey(ComputedKeyFormula::template(["scope"], "ORG#{0}")),
            )
            .partition_key(),
        )
        .build()
        .expect("backward references are allowed");
}

#[test]
fn template_placeholder_out_of_range_is_rejected() {
    let builder = EntitySchema::builder("T")
        .property(Property::text("a"))
        .property(Property::new(
            "pk",
            PropertyKind::ComputedKey(ComputedKeyFormula::template(["a"], "{0}#{3}")),
        ));

    expect_invalid(builder, "placeholder {3}");
}

#[test]
fn missing_formula_source_is_rejected() {
    let builder = EntitySchema::builder("T").property(Property::new(
        "pk",
        PropertyKind::ComputedKey(ComputedKeyFormula::joined(["ghost"], "#")),
    ));

    expect_invalid(builder, "source 'ghost' is not a property");
}

#[test]
fn multiple_partition_keys_are_rejected() {
    expect_invalid(
        user_builder().property(Property::text("other").partition_key()),
        "multiple partition keys",
    );
}

#[test]
fn non_keyable_key_property_is_rejected() {
    let builder = EntitySchema::builder("T")
        .property(Property::scalar("flag", ScalarKind::Bool).partition_key());

    expect_invalid(builder, "non-keyable kind");
}

#[test]
fn index_keys_must_resolve() {
    expect_invalid(
        user_builder().index(IndexDescriptor::new("gsi1", "missing")),
        "index key 'missing' is not a property",
    );
}

#[test]
fn relationships_require_related_property_and_sort_key() {
    let builder = user_builder()
        .property(Property::new("orders", PropertyKind::Related))
        .relationship(RelationshipDescriptor::many("orders", "ORDER#*"));

    expect_invalid(builder, "relationships require a sort key");
}

#[test]
fn related_property_without_descriptor_is_rejected() {
    expect_invalid(
        user_builder().property(Property::new("orders", PropertyKind::Related)),
        "no relationship descriptor",
    );
}

#[test]
fn discriminator_on_non_text_property_is_rejected() {
    let builder = user_builder()
        .property(Property::scalar("version", ScalarKind::Int))
        .discriminator(&DiscriminatorSpec::literal("version", "1"));

    expect_invalid(builder, "expected text");
}

#[test]
fn every_problem_is_reported_at_once() {
    let err = EntitySchema::builder("")
        .property(Property::text("a").partition_key().nullable())
        .property(Property::text("a"))
        .build()
        .expect_err("schema is invalid");

    assert!(err.errors().len() >= 3, "{}", err.errors());
}

#[test]
fn schema_round_trips_through_json() {
    let schema = user_builder()
        .property(Property::new("tags", PropertyKind::Set(ScalarKind::Text)).nullable())
        .discriminator(&DiscriminatorSpec::pattern("entity_type", "USER#*"))
        .index(IndexDescriptor::new("by_tenant", "tenant").project(["id"]))
        .build()
        .expect("schema should validate");

    let json = serde_json::to_string(&schema).expect("serialize schema");
    let back: EntitySchema = serde_json::from_str(&json).expect("deserialize schema");
    let back = back.validated().expect("deserialized schema should validate");

    assert_eq!(back, schema);
}

#[test]
fn index_discriminator_overrides_entity_level() {
    let schema = user_builder()
        .discriminator(&DiscriminatorSpec::legacy("USER"))
        .index(
            IndexDescriptor::new("by_tenant", "tenant")
                .discriminator(&DiscriminatorSpec::pattern("gsi_type", "USER#*")),
        )
        .index(IndexDescriptor::new("by_id", "id"))
        .build()
        .expect("schema should validate");

    let scoped = schema.discriminator_for(Some("by_tenant")).expect("scoped");
    assert_eq!(scoped.property, "gsi_type");

    let fallback = schema.discriminator_for(Some("by_id")).expect("fallback");
    assert_eq!(fallback.property, "entity_type");

    let unscoped = schema.discriminator_for(None).expect("entity level");
    assert_eq!(unscoped.literal, "USER");
}
