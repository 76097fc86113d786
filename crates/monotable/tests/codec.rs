use monotable::{
    core::testing::MemoryBlobStore,
    prelude::*,
};
use std::sync::Arc;

const ORDER_JSON: &str = r#"{
    "name": "Order",
    "properties": [
        { "name": "customer", "wire_name": "customer", "kind": { "Scalar": "Text" } },
        { "name": "number", "wire_name": "number", "kind": { "Scalar": "Uint" } },
        {
            "name": "pk",
            "wire_name": "PK",
            "kind": {
                "ComputedKey": { "sources": ["customer"], "format": { "Template": "CUSTOMER#{0}" } }
            },
            "partition_key": true
        },
        {
            "name": "sk",
            "wire_name": "SK",
            "kind": {
                "ComputedKey": { "sources": ["number"], "format": { "Template": "ORDER#{0}" } }
            },
            "sort_key": true
        },
        { "name": "entity_type", "wire_name": "entity_type", "kind": { "Scalar": "Text" } },
        { "name": "notes", "wire_name": "notes", "kind": { "Scalar": "Text" }, "nullable": true }
    ],
    "discriminator": { "property": "entity_type", "value": "order" }
}"#;

fn order_codec() -> Arc<EntityCodec> {
    let schema: EntitySchema = serde_json::from_str(ORDER_JSON).expect("order json");

    CodecRegistry::new()
        .register(schema, CodecConfig::default())
        .expect("register order")
}

#[test]
fn json_authored_schema_compiles_and_round_trips() {
    let codec = order_codec();
    let record = Record::new()
        .with("customer", "c7".to_string())
        .with("number", 3_u64)
        .with("entity_type", "order".to_string());

    let wire = codec.to_wire(&record).expect("encode");
    assert_eq!(wire.get("PK"), Some(&WireValue::string("CUSTOMER#c7")));
    assert_eq!(wire.get("SK"), Some(&WireValue::string("ORDER#3")));
    assert!(codec.matches_entity(&wire));

    let back = codec.from_wire(&wire).expect("decode");
    assert_eq!(back.field::<u64>("number").expect("number"), 3);
    assert_eq!(back.field::<Option<String>>("notes").expect("notes"), None);
}

#[test]
fn invalid_json_schema_is_rejected_at_compile() {
    let json = ORDER_JSON.replace(r#""wire_name": "notes""#, r#""wire_name": "customer""#);
    let schema: EntitySchema = serde_json::from_str(&json).expect("order json");

    let err = CodecRegistry::new()
        .register(schema, CodecConfig::default())
        .expect_err("duplicate wire name");

    assert_eq!(err.class(), ErrorClass::Configuration);
    assert!(err.to_string().contains("wire name 'customer'"), "{err}");
}

//
// Typed entities
//

#[derive(Debug, PartialEq)]
struct Document {
    id: String,
    title: String,
    body: String,
}

impl EntityKind for Document {
    fn schema() -> EntitySchema {
        EntitySchema::builder("Document")
            .property(Property::text("id").wire("PK").partition_key())
            .property(Property::text("title"))
            .property(Property::new(
                "body",
                PropertyKind::ExternalBlob(BlobPayload::Text),
            ))
            .build()
            .expect("document schema")
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("id", self.id.clone())
            .with("title", self.title.clone())
            .with("body", self.body.clone())
    }

    fn from_record(record: &Record) -> Result<Self, monotable::core::value::RecordError> {
        Ok(Self {
            id: record.field("id")?,
            title: record.field("title")?,
            body: record.field("body")?,
        })
    }
}

#[tokio::test]
async fn typed_entities_use_the_blob_store() {
    let store = Arc::new(MemoryBlobStore::new());
    let mut registry = CodecRegistry::new();
    let codec = TypedCodec::<Document>::register(
        &mut registry,
        CodecConfig::default().with_blob_store(Arc::clone(&store) as _),
    )
    .expect("register document");
    let cancel = CancellationToken::new();
    let document = Document {
        id: "d1".into(),
        title: "Notes".into(),
        body: "a body too large to keep inline".into(),
    };

    let err = codec.to_wire(&document).expect_err("blob store needs async");
    assert!(matches!(err, CodecError::AsyncRequired { .. }), "{err:?}");

    let wire = codec
        .to_wire_async(&document, &cancel)
        .await
        .expect("encode");
    assert_eq!(store.store_calls(), 1);

    let back = codec
        .from_wire_async(&wire, &cancel)
        .await
        .expect("decode");
    assert_eq!(back, document);
}
