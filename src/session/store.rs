use std::cell::{Ref, RefCell, RefMut};
use std::collections::BTreeMap;
use std::rc::Rc;

use anyhow::Context as _;
use log::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::Result;

/// Handle to the bookkeeping object of one service type.
///
/// Clones share the same object, so an adapter can keep its handle and
/// whatever it writes is saved with the session.
#[derive(Debug, Clone, Default)]
pub struct DataBag(Rc<RefCell<Map<String, Value>>>);

impl DataBag {
    fn from_map(map: Map<String, Value>) -> Self {
        Self(Rc::new(RefCell::new(map)))
    }

    pub fn borrow(&self) -> Ref<'_, Map<String, Value>> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, Map<String, Value>> {
        self.0.borrow_mut()
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        self.borrow()
            .get(key)
            .map(|value| {
                T::deserialize(value).with_context(|| format!("Could not read adapter data `{}`", key))
            })
            .transpose()
    }

    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let value = serde_json::to_value(value)
            .with_context(|| format!("Could not write adapter data `{}`", key))?;
        self.borrow_mut().insert(key.to_owned(), value);
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        self.borrow_mut().remove(key)
    }

    pub fn is_empty(&self) -> bool {
        self.borrow().is_empty()
    }
}

impl PartialEq for DataBag {
    fn eq(&self, other: &Self) -> bool {
        *self.borrow() == *other.borrow()
    }
}

impl Serialize for DataBag {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.borrow().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for DataBag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Object(map) => Ok(Self::from_map(map)),
            Value::Null => Ok(Self::default()),
            other => {
                warn!("Replaced malformed adapter data with an empty object: {}", other);
                Ok(Self::default())
            }
        }
    }
}

/// Per-service-type bookkeeping keyed by lowercase type.
///
/// Bags are created on first access and never removed.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct AdapterDataStore(BTreeMap<String, DataBag>);

impl AdapterDataStore {
    pub fn get_or_create(&mut self, kind: &str) -> DataBag {
        self.0.entry(kind.to_lowercase()).or_default().clone()
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Copies every bag so the result shares nothing with `self`.
    pub fn deep_clone(&self) -> Self {
        Self(
            self.0
                .iter()
                .map(|(kind, bag)| (kind.clone(), DataBag::from_map(bag.borrow().clone())))
                .collect(),
        )
    }
}
