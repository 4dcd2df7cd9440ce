//! Document encoding and decoding.
//!
//! The on-disk form is a pretty-printed JSON object with a `posts` and a
//! `users` mapping. Keys are decimal strings (JSON object keys) that must
//! match the `id` of the record they hold.

use crate::document::Document;
use crate::error::{CodecError, RecordKind};
use serde::de::{self, Deserialize, Deserializer, MapAccess, Visitor};
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

/// Parse a document from its on-disk bytes.
///
/// A missing `posts` or `users` mapping decodes as empty. Posts stored under
/// the older `chirps` key are accepted. Unknown top-level keys are ignored.
///
/// # Errors
///
/// Returns [`CodecError::Json`] if the bytes are not a JSON document object,
/// if both `posts` and `chirps` are present, or if a mapping repeats a key.
/// Returns a key error if a record is filed under the wrong id.
pub fn decode(bytes: &[u8]) -> Result<Document, CodecError> {
    let document: Document = serde_json::from_slice(bytes)?;
    check_keys(RecordKind::Post, &document.posts, |post| post.id)?;
    check_keys(RecordKind::User, &document.users, |user| user.id)?;
    Ok(document)
}

/// Serialize a document to its on-disk bytes.
///
/// Both mappings are always written, even when empty. Output ends with a
/// newline.
///
/// # Errors
///
/// Returns [`CodecError::Json`] if serialization fails.
pub fn encode(document: &Document) -> Result<Vec<u8>, CodecError> {
    let mut bytes = serde_json::to_vec_pretty(document)?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Deserialize an id-keyed mapping, rejecting repeated keys.
///
/// A plain `BTreeMap` keeps the last of two equal keys, which would drop a
/// record without any error.
pub(crate) fn unique_keys<'de, D, V>(deserializer: D) -> Result<BTreeMap<u64, V>, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de>,
{
    struct UniqueKeys<V>(PhantomData<V>);

    impl<'de, V: Deserialize<'de>> Visitor<'de> for UniqueKeys<V> {
        type Value = BTreeMap<u64, V>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map of record ids to records")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
            let mut records = BTreeMap::new();
            while let Some((key, record)) = access.next_entry::<u64, V>()? {
                if records.insert(key, record).is_some() {
                    return Err(de::Error::custom(format_args!("duplicate record id {key}")));
                }
            }
            Ok(records)
        }
    }

    deserializer.deserialize_map(UniqueKeys(PhantomData))
}

fn check_keys<V>(
    kind: RecordKind,
    records: &BTreeMap<u64, V>,
    id_of: impl Fn(&V) -> u64,
) -> Result<(), CodecError> {
    for (&key, record) in records {
        let id = id_of(record);
        if key != id {
            return Err(CodecError::KeyMismatch { kind, key, id });
        }
        if id == 0 {
            return Err(CodecError::ZeroId { kind });
        }
    }
    Ok(())
}
