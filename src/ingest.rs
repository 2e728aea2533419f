//! Record Ingestion Module
//!
//! Shapes raw social-media records (JSON documents) into the pieces the
//! state layer consumes: the id that keys the cache, the hashtag batch that
//! feeds the trending tracker, and a slimmed document worth caching.
//! Storage clients stay with the caller; nothing here talks to a database.

use serde_json::Value;

// == Volatile Keys ==
/// Top-level keys dropped from stored records: derivable or noisy fields
/// the query layer never reads back.
const VOLATILE_KEYS: [&str; 6] = [
    "id",
    "geo",
    "favorited",
    "retweeted",
    "filter_level",
    "quoted_status_id",
];

// == Record Id ==
/// Returns the record's string identifier, if present.
///
/// Records carry both a numeric `id` and a string `id_str`; only the
/// string form is precise enough to key on.
pub fn record_id(record: &Value) -> Option<&str> {
    record.get("id_str").and_then(Value::as_str)
}

// == Extract Hashtags ==
/// Collects the hashtag texts mentioned in a record.
///
/// Reads `entities.hashtags[*].text`; entries without a text field are
/// skipped. Case folding is left to the tracker. Records without hashtags
/// yield an empty batch.
pub fn extract_hashtags(record: &Value) -> Vec<String> {
    let Some(hashtags) = record
        .get("entities")
        .and_then(|entities| entities.get("hashtags"))
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };

    hashtags
        .iter()
        .filter_map(|hashtag| hashtag.get("text").and_then(Value::as_str))
        .map(str::to_string)
        .collect()
}

// == Prepare Record ==
/// Slims a raw record down to the document worth storing and caching.
///
/// Drops the volatile top-level keys and flattens the embedded author
/// object to its `id_str`, since full author profiles live elsewhere.
/// Non-object records pass through unchanged.
pub fn prepare_record(mut record: Value) -> Value {
    let Some(map) = record.as_object_mut() else {
        return record;
    };

    for key in VOLATILE_KEYS {
        map.remove(key);
    }

    let author_id = map
        .get("user")
        .and_then(|user| user.get("id_str"))
        .and_then(Value::as_str)
        .map(str::to_string);
    if let Some(id) = author_id {
        map.insert("user".to_string(), Value::String(id));
    }

    record
}
