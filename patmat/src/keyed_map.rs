use crate::value::Value;

/// An insertion-ordered mapping from arbitrary values to values.
///
/// Keys are compared with [`Value::identical`]. The `set`, `delete` and
/// `merge` operations leave `self` untouched and return a new map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyedMap {
    entries: Vec<(Value, Value)>,
}

impl KeyedMap {
    pub fn new() -> Self {
        KeyedMap::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries
            .iter()
            .find_map(|(k, v)| k.identical(key).then_some(v))
    }

    pub fn contains_key(&self, key: &Value) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(k, _)| k)
    }

    /// A copy with `key` set. An existing key keeps its position.
    pub fn set(&self, key: Value, value: Value) -> KeyedMap {
        let mut map = self.clone();
        map.insert(key, value);
        map
    }

    /// A copy without any of `keys`.
    pub fn delete<'a>(&self, keys: impl IntoIterator<Item = &'a Value>) -> KeyedMap {
        let keys: Vec<&Value> = keys.into_iter().collect();
        KeyedMap {
            entries: self
                .entries
                .iter()
                .filter(|(k, _)| !keys.iter().any(|removed| k.identical(removed)))
                .cloned()
                .collect(),
        }
    }

    /// A copy with every entry of `other` applied on top, in order.
    pub fn merge(&self, other: &KeyedMap) -> KeyedMap {
        let mut map = self.clone();
        for (key, value) in other.iter() {
            map.insert(key.clone(), value.clone());
        }
        map
    }

    fn insert(&mut self, key: Value, value: Value) {
        match self.entries.iter_mut().find(|(k, _)| k.identical(&key)) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
    }
}

impl FromIterator<(Value, Value)> for KeyedMap {
    fn from_iter<I: IntoIterator<Item = (Value, Value)>>(iter: I) -> Self {
        let mut map = KeyedMap::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}
