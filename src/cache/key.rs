//! Cache Key Module
//!
//! Deterministic key derivation for memoized calls.
//!
//! A key has the shape `namespace[:segment]*`. Scalar arguments appear
//! verbatim, structured arguments (arrays, objects) are replaced by a
//! 128-bit content digest of their canonical JSON, and keyword arguments are
//! sorted by name and hashed together into one trailing segment.

use std::collections::BTreeMap;
use std::fmt::{Debug, Display};

use serde::Serialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// Separator between key segments
pub const KEY_SEPARATOR: &str = ":";

/// Digest bytes kept per hashed segment (128 bits)
const DIGEST_BYTES: usize = 16;

// == Call Args ==
/// Positional and keyword arguments of a memoized call.
///
/// Values are held in their JSON form so they can be hashed canonically.
/// Types that cannot be serialized fall back to their string form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArgs {
    positional: Vec<Value>,
    keyword: BTreeMap<String, Value>,
}

impl CallArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a positional argument.
    pub fn arg<T: Serialize + Debug>(mut self, value: T) -> Self {
        self.positional.push(to_arg_value(&value));
        self
    }

    /// Appends a positional argument by its `Display` form.
    pub fn arg_display<T: Display>(mut self, value: T) -> Self {
        self.positional.push(Value::String(value.to_string()));
        self
    }

    /// Sets a keyword argument, replacing any previous value for `name`.
    pub fn kwarg<T: Serialize + Debug>(mut self, name: impl Into<String>, value: T) -> Self {
        self.keyword.insert(name.into(), to_arg_value(&value));
        self
    }

    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    pub fn keyword(&self) -> &BTreeMap<String, Value> {
        &self.keyword
    }

    /// Positional argument at `index`.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.positional.get(index)
    }

    /// Keyword argument by name.
    pub fn get_kwarg(&self, name: &str) -> Option<&Value> {
        self.keyword.get(name)
    }
}

fn to_arg_value<T: Serialize + Debug>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_else(|_| Value::String(format!("{:?}", value)))
}

// == Key Codec ==
/// Derives stable cache keys from a namespace and call arguments.
pub struct KeyCodec;

impl KeyCodec {
    /// Builds `namespace[:arg]*[:kwargs-digest]`.
    ///
    /// Keyword arguments are sorted by name first, so call-site ordering
    /// never changes the key. The digest is SHA-256 truncated to 128 bits,
    /// stable across processes.
    ///
    /// String arguments are not escaped: `"a:b"` and the pair `"a"`, `"b"`
    /// both yield `ns:a:b`. Pass values that may contain [`KEY_SEPARATOR`]
    /// inside an array or object to get a digest segment instead.
    pub fn derive<'a, I>(namespace: &str, args: &[Value], kwargs: I) -> String
    where
        I: IntoIterator<Item = (&'a str, &'a Value)>,
    {
        let mut parts = Vec::with_capacity(args.len() + 2);
        parts.push(namespace.to_string());
        parts.extend(args.iter().map(segment));

        let mut kwargs: Vec<(&str, &Value)> = kwargs.into_iter().collect();
        if !kwargs.is_empty() {
            kwargs.sort_by(|a, b| a.0.cmp(b.0));
            let pairs: Vec<Value> = kwargs
                .into_iter()
                .map(|(name, value)| {
                    Value::Array(vec![Value::String(name.to_string()), canonicalize(value)])
                })
                .collect();
            parts.push(digest(&Value::Array(pairs).to_string()));
        }

        parts.join(KEY_SEPARATOR)
    }

    /// Derives a key from a `CallArgs` bundle.
    pub fn derive_call(namespace: &str, call: &CallArgs) -> String {
        Self::derive(
            namespace,
            call.positional(),
            call.keyword().iter().map(|(k, v)| (k.as_str(), v)),
        )
    }
}

/// Scalar values verbatim, structured values as a content digest.
fn segment(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(_) | Value::Object(_) => digest(&canonicalize(value).to_string()),
    }
}

/// Rebuilds objects with keys in sorted order, recursively.
fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let mut sorted = Map::new();
            for (key, value) in entries {
                sorted.insert(key.clone(), canonicalize(value));
            }
            Value::Object(sorted)
        }
        scalar => scalar.clone(),
    }
}

fn digest(text: &str) -> String {
    let hash = Sha256::digest(text.as_bytes());
    hex::encode(&hash[..DIGEST_BYTES])
}
