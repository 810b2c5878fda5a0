//! Form payloads: the opaque key/value data an item carries downstream.

use serde::{Deserialize, Serialize};

use crate::error::DeferralError;

/// Ordered multimap of string to string.
///
/// Design:
/// - Duplicate keys are allowed (`tag=a&tag=b`).
/// - Field order is the order the caller submitted, so the downstream
///   receives the values of a key in the same order.
/// - Encodes to / decodes from `application/x-www-form-urlencoded`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormPayload {
    fields: Vec<(String, String)>,
}

impl FormPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Decode a urlencoded form body.
    pub fn decode(body: &str) -> Result<Self, DeferralError> {
        let fields: Vec<(String, String)> = serde_urlencoded::from_str(body)
            .map_err(|e| DeferralError::InvalidForm(e.to_string()))?;
        Ok(Self { fields })
    }

    /// Encode as a urlencoded form body, fields in submission order.
    pub fn encode(&self) -> Result<String, serde_urlencoded::ser::Error> {
        serde_urlencoded::to_string(&self.fields)
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.push((key.into(), value.into()));
    }

    /// First value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// All values for `key`, in submission order.
    pub fn get_all<'a>(&'a self, key: &str) -> impl Iterator<Item = &'a str> {
        self.fields
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_keeps_duplicates_in_order() {
        let payload = FormPayload::decode("tag=b&name=Ada&tag=a").unwrap();
        assert_eq!(payload.len(), 3);
        assert_eq!(payload.get("tag"), Some("b"));
        assert_eq!(payload.get_all("tag").collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(payload.get("missing"), None);
    }

    #[test]
    fn values_outlive_the_lookup_key() {
        let payload = FormPayload::from_pairs([("name", "Ada"), ("tag", "x"), ("tag", "y")]);
        let first = {
            let key = String::from("name");
            payload.get(&key)
        };
        let tags: Vec<&str> = {
            let key = String::from("tag");
            payload.get_all(&key).collect()
        };
        assert_eq!(first, Some("Ada"));
        assert_eq!(tags, vec!["x", "y"]);
    }

    #[test]
    fn decode_handles_escapes() {
        let payload = FormPayload::decode("schedule_time=2024-05-01+09%3A30%3A00&note=a%26b").unwrap();
        assert_eq!(payload.get("schedule_time"), Some("2024-05-01 09:30:00"));
        assert_eq!(payload.get("note"), Some("a&b"));
    }

    #[test]
    fn encode_preserves_submission_order() {
        let payload = FormPayload::from_pairs([("z", "1"), ("a", "two words"), ("z", "3")]);
        assert_eq!(payload.encode().unwrap(), "z=1&a=two+words&z=3");
    }

    #[test]
    fn empty_body_is_an_empty_payload() {
        let payload = FormPayload::decode("").unwrap();
        assert!(payload.is_empty());
    }

    #[test]
    fn serializes_as_list_of_pairs() {
        let payload = FormPayload::from_pairs([("k", "v")]);
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json, serde_json::json!([["k", "v"]]));
    }
}
