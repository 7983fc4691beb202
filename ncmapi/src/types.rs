//! Call arguments sent to the gateway.
//!
//! Every endpoint takes its parameters as URL query arguments. [`Args`] is the
//! single mapping type used for all of them: required parameters are inserted
//! by the endpoint method, anything else the caller puts in is forwarded
//! untouched.
//!
//! Values are [`Scalar`]s and serialize in their natural string form:
//!
//! | Scalar          | Wire form        |
//! |-----------------|------------------|
//! | `Int(42)`       | `42`             |
//! | `Bool(true)`    | `true`           |
//! | `Str("a b")`    | `a%20b`          |

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single query parameter value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Int(i64),
    Bool(bool),
    Str(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<i32> for Scalar {
    fn from(n: i32) -> Self {
        Self::Int(n.into())
    }
}

impl From<u32> for Scalar {
    fn from(n: u32) -> Self {
        Self::Int(n.into())
    }
}

impl From<u64> for Scalar {
    fn from(n: u64) -> Self {
        // Ids above i64::MAX do not occur in practice, but keep them exact.
        i64::try_from(n).map_or_else(|_| Self::Str(n.to_string()), Self::Int)
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Self::Str(s.to_owned())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<&String> for Scalar {
    fn from(s: &String) -> Self {
        Self::Str(s.clone())
    }
}

impl From<Ids> for Scalar {
    fn from(ids: Ids) -> Self {
        Self::Str(ids.to_string())
    }
}

/// Parameter set for one API call.
///
/// Keys are unique; inserting an existing key replaces its value. Iteration
/// and serialization are in key order so the query string is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Args(BTreeMap<String, Scalar>);

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert a value, returning the previous one for that key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Scalar>) -> Option<Scalar> {
        self.0.insert(key.into(), value.into())
    }

    /// Insert only when `value` is `Some`. The gateway treats a missing key
    /// differently from an empty one, so `None` must not be sent.
    pub fn insert_opt<V: Into<Scalar>>(&mut self, key: impl Into<String>, value: Option<V>) {
        if let Some(v) = value {
            self.insert(key, v);
        }
    }

    pub fn get(&self, key: &str) -> Option<&Scalar> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Scalar> {
        self.0.remove(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Scalar)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Key/value pairs in their wire (string) form, before percent-encoding.
    pub fn pairs(&self) -> Vec<(String, String)> {
        self.iter().map(|(k, v)| (k.to_owned(), v.to_string())).collect()
    }

    /// Serialize as an `application/x-www-form-urlencoded` query string
    /// (without the leading `?`).
    pub fn to_query_string(&self) -> String {
        self.iter()
            .map(|(k, v)| {
                format!(
                    "{}={}",
                    urlencoding::encode(k),
                    urlencoding::encode(&v.to_string())
                )
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl<K: Into<String>, V: Into<Scalar>> FromIterator<(K, V)> for Args {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut args = Self::new();
        args.extend(iter);
        args
    }
}

impl<K: Into<String>, V: Into<Scalar>> Extend<(K, V)> for Args {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

/// Parse a query string back into decoded key/value pairs.
///
/// Accepts an optional leading `?`. `+` is read as a space. Pairs whose
/// percent-encoding is not valid UTF-8 are decoded lossily.
pub fn parse_query(query: &str) -> Vec<(String, String)> {
    let query = query.strip_prefix('?').unwrap_or(query);
    query
        .split('&')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let (k, v) = part.split_once('=').unwrap_or((part, ""));
            (decode_component(k), decode_component(v))
        })
        .collect()
}

fn decode_component(s: &str) -> String {
    let s = s.replace('+', " ");
    match urlencoding::decode(&s) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => String::from_utf8_lossy(&urlencoding::decode_binary(s.as_bytes())).into_owned(),
    }
}

/// One numeric id or a collection of them.
///
/// The gateway expects `ids=1,2,3` for both singular and plural calls, so a
/// single id and a one-element collection serialize identically.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Ids(Vec<u64>);

impl Ids {
    pub fn as_slice(&self) -> &[u64] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Ids {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, id) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{id}")?;
        }
        Ok(())
    }
}

impl From<u64> for Ids {
    fn from(id: u64) -> Self {
        Self(vec![id])
    }
}

impl From<Vec<u64>> for Ids {
    fn from(ids: Vec<u64>) -> Self {
        Self(ids)
    }
}

impl From<&Vec<u64>> for Ids {
    fn from(ids: &Vec<u64>) -> Self {
        Self(ids.clone())
    }
}

impl From<&[u64]> for Ids {
    fn from(ids: &[u64]) -> Self {
        Self(ids.to_vec())
    }
}

impl<const N: usize> From<[u64; N]> for Ids {
    fn from(ids: [u64; N]) -> Self {
        Self(ids.to_vec())
    }
}

impl FromIterator<u64> for Ids {
    fn from_iter<I: IntoIterator<Item = u64>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_roundtrip_mixed_scalars() {
        let args = Args::new()
            .with("id", 347_230_i64)
            .with("neg", -1_i32)
            .with("qrimg", true)
            .with("off", false)
            .with("keywords", "海阔天空 & friends=ok?+1")
            .with("empty", "");
        let query = args.to_query_string();
        assert_eq!(parse_query(&query), args.pairs());
    }

    #[test]
    fn scalars_use_natural_string_form() {
        let args = Args::new().with("a", 10_u32).with("b", true).with("c", "x");
        assert_eq!(args.to_query_string(), "a=10&b=true&c=x");
    }

    #[test]
    fn insert_opt_skips_none() {
        let mut args = Args::new();
        args.insert_opt::<u32>("countrycode", None);
        assert!(!args.contains_key("countrycode"));
        args.insert_opt("countrycode", Some(1_u32));
        assert_eq!(args.get("countrycode"), Some(&Scalar::Int(1)));
    }

    #[test]
    fn single_id_and_singleton_collection_match() {
        let one: Scalar = Ids::from(123_u64).into();
        let many: Scalar = Ids::from(vec![123_u64]).into();
        assert_eq!(one, many);
        assert_eq!(Ids::from([1_u64, 2, 3]).to_string(), "1,2,3");
    }

    #[test]
    fn parse_query_tolerates_prefix_and_bare_keys() {
        let pairs = parse_query("?a=1&flag&&b=x+y");
        assert_eq!(
            pairs,
            vec![
                ("a".to_owned(), "1".to_owned()),
                ("flag".to_owned(), String::new()),
                ("b".to_owned(), "x y".to_owned()),
            ]
        );
    }

    #[test]
    fn args_deserialize_from_json_object() {
        let args: Args = serde_json::from_str(r#"{"limit":30,"cat":"华语","raw":true}"#).unwrap();
        assert_eq!(args.get("limit"), Some(&Scalar::Int(30)));
        assert_eq!(args.get("cat"), Some(&Scalar::Str("华语".into())));
        assert_eq!(args.get("raw"), Some(&Scalar::Bool(true)));
    }
}
