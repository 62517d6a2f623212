//! Building blocks shared by every entity: the raw-body holder, the list
//! envelope and the `Notes` mapping.
//!
//! # Design
//! The API sends an empty collection as `[]` where a populated one is an
//! object (`notes`, payment-link `reminders`). Decoding dispatches on the
//! structural token the deserializer reports: a map is decoded, a sequence
//! or `null` means "empty". No trial-and-error parsing is involved.

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

use serde::de::{self, DeserializeOwned, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};

/// Sink for a successful response.
///
/// The decoder calls `set_body` with the raw bytes first and `decode` after,
/// so the raw payload is kept even when typed decoding fails.
pub trait ResponseHolder {
    fn set_body(&mut self, body: Vec<u8>);

    fn decode(&mut self, body: &[u8]) -> serde_json::Result<()>;
}

/// Raw response body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    pub body: Vec<u8>,
}

impl ResponseHolder for Response {
    fn set_body(&mut self, body: Vec<u8>) {
        self.body = body;
    }

    fn decode(&mut self, body: &[u8]) -> serde_json::Result<()> {
        serde_json::from_slice::<IgnoredAny>(body).map(|_| ())
    }
}

/// Implements `ResponseHolder` for entity types carrying a
/// `#[serde(skip)] response: Response` field.
macro_rules! impl_response_holder {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::types::ResponseHolder for $ty {
                fn set_body(&mut self, body: Vec<u8>) {
                    self.response.body = body;
                }

                fn decode(&mut self, body: &[u8]) -> serde_json::Result<()> {
                    let decoded: $ty = serde_json::from_slice(body)?;
                    let response = std::mem::take(&mut self.response);
                    *self = decoded;
                    self.response = response;
                    Ok(())
                }
            }
        )+
    };
}
pub(crate) use impl_response_holder;

/// A page of entities.
///
/// Most list endpoints put the entities under `items`; payment links use
/// `payment_links`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Collection<T> {
    #[serde(skip)]
    pub response: Response,
    #[serde(default)]
    pub entity: String,
    #[serde(default)]
    pub count: i64,
    #[serde(default = "Vec::new", alias = "payment_links")]
    pub items: Vec<T>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            response: Response::default(),
            entity: String::new(),
            count: 0,
            items: Vec::new(),
        }
    }
}

impl<T: DeserializeOwned> ResponseHolder for Collection<T> {
    fn set_body(&mut self, body: Vec<u8>) {
        self.response.body = body;
    }

    fn decode(&mut self, body: &[u8]) -> serde_json::Result<()> {
        let decoded: Collection<T> = serde_json::from_slice(body)?;
        self.entity = decoded.entity;
        self.count = decoded.count;
        self.items = decoded.items;
        Ok(())
    }
}

/// Free-form key/value metadata attached to most entities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Notes(BTreeMap<String, String>);

impl Notes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.0
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Notes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<'de> Deserialize<'de> for Notes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(object_or_empty::<D, BTreeMap<String, String>>(deserializer)?
            .map(Notes)
            .unwrap_or_default())
    }
}

/// Decode a value the API sends as an object when populated and as `[]`
/// (or `null`) when empty. Use with `#[serde(deserialize_with)]`.
pub fn object_or_empty<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    deserializer.deserialize_any(ObjectOrEmpty(PhantomData))
}

/// Decode an explicit `null` as `T::default()`. `#[serde(default)]` alone
/// only covers a missing key.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

struct ObjectOrEmpty<T>(PhantomData<T>);

impl<'de, T: Deserialize<'de>> Visitor<'de> for ObjectOrEmpty<T> {
    type Value = Option<T>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object, a list, a scalar or null")
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
        T::deserialize(de::value::MapAccessDeserializer::new(map)).map(Some)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(None)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_str<E: de::Error>(self, _: &str) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_i64<E: de::Error>(self, _: i64) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_u64<E: de::Error>(self, _: u64) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_f64<E: de::Error>(self, _: f64) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, Deserialize)]
    struct WithNotes {
        #[serde(default)]
        notes: Notes,
    }

    #[test]
    fn notes_roundtrip_object() {
        let notes: Notes = [("a", "1"), ("b", "2")].into_iter().collect();
        let json = serde_json::to_string(&notes).unwrap();
        assert_eq!(json, r#"{"a":"1","b":"2"}"#);
        let back: Notes = serde_json::from_str(&json).unwrap();
        assert_eq!(back, notes);
    }

    #[test]
    fn notes_empty_list_decodes_to_empty() {
        let holder: WithNotes = serde_json::from_str(r#"{"notes":[]}"#).unwrap();
        assert!(holder.notes.is_empty());
    }

    #[test]
    fn notes_null_and_missing_decode_to_empty() {
        let holder: WithNotes = serde_json::from_str(r#"{"notes":null}"#).unwrap();
        assert!(holder.notes.is_empty());
        let holder: WithNotes = serde_json::from_str("{}").unwrap();
        assert!(holder.notes.is_empty());
    }

    #[test]
    fn notes_with_non_string_values_fail() {
        let result: Result<WithNotes, _> = serde_json::from_str(r#"{"notes":{"n":1}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn notes_scalar_decodes_to_empty() {
        for raw in [r#"{"notes":"x"}"#, r#"{"notes":7}"#, r#"{"notes":-1.5}"#, r#"{"notes":true}"#] {
            let holder: WithNotes = serde_json::from_str(raw).unwrap();
            assert!(holder.notes.is_empty(), "{raw}");
        }
    }

    #[test]
    fn null_as_default_maps_null_and_keeps_values() {
        #[derive(Debug, Deserialize)]
        struct Meta {
            #[serde(default, deserialize_with = "null_as_default")]
            metadata: BTreeMap<String, String>,
        }

        let meta: Meta = serde_json::from_str(r#"{"metadata":null}"#).unwrap();
        assert!(meta.metadata.is_empty());
        let meta: Meta = serde_json::from_str("{}").unwrap();
        assert!(meta.metadata.is_empty());
        let meta: Meta = serde_json::from_str(r#"{"metadata":{"k":"v"}}"#).unwrap();
        assert_eq!(meta.metadata.get("k").map(String::as_str), Some("v"));
    }

    #[test]
    fn object_or_empty_decodes_struct() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Inner {
            status: String,
        }
        #[derive(Debug, Deserialize)]
        struct Outer {
            #[serde(default, deserialize_with = "object_or_empty")]
            inner: Option<Inner>,
        }

        let outer: Outer = serde_json::from_str(r#"{"inner":{"status":"completed"}}"#).unwrap();
        assert_eq!(
            outer.inner,
            Some(Inner {
                status: "completed".to_string()
            })
        );
        let outer: Outer = serde_json::from_str(r#"{"inner":[]}"#).unwrap();
        assert_eq!(outer.inner, None);
    }

    #[test]
    fn collection_accepts_items_or_payment_links() {
        let mut list: Collection<serde_json::Value> = Collection::default();
        let body = br#"{"entity":"collection","count":1,"items":[{"id":"order_1"}]}"#;
        list.set_body(body.to_vec());
        list.decode(body).unwrap();
        assert_eq!(list.count, 1);
        assert_eq!(list.items[0]["id"], "order_1");
        assert_eq!(list.response.body, body);

        let list: Collection<serde_json::Value> =
            serde_json::from_str(r#"{"payment_links":[{"id":"plink_1"},{"id":"plink_2"}]}"#)
                .unwrap();
        assert_eq!(list.items.len(), 2);
        assert_eq!(list.count, 0);
    }

    #[test]
    fn raw_response_holder_keeps_body_and_checks_json() {
        let mut holder = Response::default();
        holder.set_body(b"not json".to_vec());
        assert!(holder.decode(b"not json").is_err());
        assert_eq!(holder.body, b"not json");
        assert!(holder.decode(br#"{"ok":true}"#).is_ok());
    }
}
