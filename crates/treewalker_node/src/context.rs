//! Inherited, level-scoped context.
//!
//! A [`Context`] carries two things down the tree: legacy key/value entries
//! contributed by ancestors' child context, and the provider bindings active
//! at that point.

use std::sync::Arc;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::{ContextObject, ProvidedValues};

/// Key/value state inherited from ancestors by their descendants.
///
/// A `Context` is never mutated in place. A level that contributes entries
/// produces a new context with [`Context::extend`]; every other level passes
/// the same (shared) map down unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    entries: Arc<Map<String, Value>>,
    provided: ProvidedValues,
}

impl Context {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a single entry.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Returns `true` if the context has an entry for `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the entries as a JSON map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.entries
    }

    /// Returns a new context holding the union of `self` and `contribution`.
    ///
    /// Entries in `contribution` win on key collisions. An empty contribution
    /// shares the parent's map instead of copying it.
    pub fn extend(&self, contribution: Map<String, Value>) -> Self {
        if contribution.is_empty() {
            return self.clone();
        }

        let mut entries = Map::clone(&self.entries);
        for (key, value) in contribution {
            entries.insert(key, value);
        }
        Self {
            entries: Arc::new(entries),
            provided: self.provided.clone(),
        }
    }

    /// Returns a new context in which `object` is bound to `value`.
    pub fn provide(&self, object: &ContextObject, value: Value) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            provided: self.provided.bind(object, value),
        }
    }

    /// The innermost value provided for `object`, or its default value.
    pub fn consume<'a>(&'a self, object: &'a ContextObject) -> &'a Value {
        self.provided.value_of(object)
    }

    /// Provider bindings active in this context.
    pub fn provided(&self) -> &ProvidedValues {
        &self.provided
    }

    /// Returns `true` if both contexts share the same underlying map.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries)
    }
}

impl Serialize for Context {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.entries.as_ref().serialize(serializer)
    }
}

impl From<Map<String, Value>> for Context {
    fn from(entries: Map<String, Value>) -> Self {
        Self {
            entries: Arc::new(entries),
            provided: ProvidedValues::new(),
        }
    }
}

impl FromIterator<(String, Value)> for Context {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Map<String, Value>>())
    }
}
