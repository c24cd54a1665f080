//! Task document vocabulary and JSON shaping.
//!
//! A task is a schemaless document. The service reserves four fields
//! (`_id`, `userEmail`, `deadline`, `bids`) and round-trips everything else
//! opaquely. All identifier parsing and response shaping lives here so every
//! route treats tasks the same way.

use mongodb::bson::oid::ObjectId;
use mongodb::bson::{self, Bson, Document};
use serde_json::Value;

/// Parse a path identifier into an `ObjectId`.
///
/// Purely syntactic: accepts exactly the 24-character hex rendering and
/// rejects everything else, so malformed identifiers never reach the store.
pub fn parse_task_id(id: &str) -> Option<ObjectId> {
    ObjectId::parse_str(id).ok()
}

/// Convert a JSON request body into a storable document.
///
/// The body must be a JSON object. The `_id` field is dropped so the
/// store-generated identifier stays immutable regardless of what the client
/// sends.
pub fn document_from_body(body: &Value) -> Option<Document> {
    let map = body.as_object()?;
    let mut document = Document::new();
    for (key, value) in map {
        if key == "_id" {
            continue;
        }
        document.insert(key.clone(), bson::to_bson(value).ok()?);
    }
    Some(document)
}

/// Render a stored task as response JSON.
///
/// The identifier is normalized to its 24-character hex string on every
/// route; the remaining fields pass through relaxed extended JSON, which
/// leaves strings, numbers, booleans and nested values as plain JSON.
pub fn render_task(mut document: Document) -> Value {
    let id = document.remove("_id");
    let mut rendered = Bson::Document(document).into_relaxed_extjson();
    if let (Value::Object(map), Some(id)) = (&mut rendered, id) {
        let id = match id {
            Bson::ObjectId(oid) => Value::String(oid.to_hex()),
            other => other.into_relaxed_extjson(),
        };
        map.insert("_id".to_string(), id);
    }
    rendered
}

/// Read the bid counter off a stored task; an absent field counts as zero.
pub fn bid_count(document: &Document) -> i64 {
    match document.get("bids") {
        Some(Bson::Int32(n)) => i64::from(*n),
        Some(Bson::Int64(n)) => *n,
        Some(Bson::Double(n)) => *n as i64,
        _ => 0,
    }
}
