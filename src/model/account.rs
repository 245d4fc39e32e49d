use std::fmt;

use getset::Getters;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

static RESERVED_KEYS: &[&str] = &["type", "user"];

/// Stored identity for one remote service.
///
/// Everything except `type` and `user` in the raw record is kept as an
/// opaque payload that only the adapter for `kind` knows how to read.
#[derive(Serialize, Deserialize, Getters, Debug, Clone, PartialEq, Eq)]
pub struct Account {
    #[serde(rename = "type")]
    #[get = "pub"]
    kind: String,
    #[get = "pub"]
    user: String,
    #[serde(flatten)]
    #[get = "pub"]
    payload: Map<String, Value>,
}

impl Account {
    pub fn new(kind: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            user: user.into(),
            payload: Map::new(),
        }
    }

    /// Replaces the payload. Entries named `type` or `user` are dropped.
    pub fn with_payload(mut self, mut payload: Map<String, Value>) -> Self {
        for key in RESERVED_KEYS {
            payload.remove(*key);
        }
        self.payload = payload;
        self
    }

    /// Adds one payload entry. Entries named `type` or `user` are ignored.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        if !RESERVED_KEYS.contains(&key.as_str()) {
            self.payload.insert(key, value.into());
        }
        self
    }

    pub fn key(&self) -> AccountKey {
        AccountKey::new(&self.kind, &self.user)
    }

    /// Exact comparison on both fields, as stored.
    pub fn matches(&self, kind: &str, user: &str) -> bool {
        self.kind == kind && self.user == user
    }

    pub fn matches_key(&self, key: &AccountKey) -> bool {
        self.matches(&key.kind, &key.user)
    }

    pub fn payload_str(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(Value::as_str)
    }
}

/// The `(type, user)` pair that identifies an account within a session.
#[derive(Getters, Debug, Clone, PartialEq, Eq, Hash)]
#[get = "pub"]
pub struct AccountKey {
    kind: String,
    user: String,
}

impl AccountKey {
    pub fn new(kind: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            user: user.into(),
        }
    }
}

impl fmt::Display for AccountKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}@{}", self.user, self.kind)
    }
}
