use std::ops::Index;

use im::OrdMap;

use crate::value::Value;

/// The name to value associations produced by a successful match.
///
/// Treated as an immutable value: `set`, `remove` and `merge` return a new
/// set and leave the receiver as it was, so a binding set handed to a
/// sub-pattern can never be changed behind the caller's back.
///
/// Backed by `im::OrdMap`, so clones share structure and cost O(1).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    values: OrdMap<String, Value>,
}

impl Bindings {
    pub fn new() -> Self {
        Bindings::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn set(&self, name: impl Into<String>, value: Value) -> Bindings {
        let mut values = self.values.clone();
        values.insert(name.into(), value);
        Bindings { values }
    }

    pub fn remove(&self, name: &str) -> Bindings {
        let mut values = self.values.clone();
        values.remove(name);
        Bindings { values }
    }

    /// Union of both sets; on a shared name the value from `other` wins.
    pub fn merge(&self, other: &Bindings) -> Bindings {
        let mut merged = self.clone();
        merged.absorb(other);
        merged
    }

    /// In-place `set`, for sets the caller owns outright.
    pub(crate) fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    /// In-place `merge`, for sets the caller owns outright.
    pub(crate) fn absorb(&mut self, other: &Bindings) {
        for (name, value) in other.values.iter() {
            self.values.insert(name.clone(), value.clone());
        }
    }

    /// False if some name is bound in both sets to values that are not
    /// identical.
    pub fn is_consistent_with(&self, other: &Bindings) -> bool {
        other.iter().all(|(name, value)| {
            self.get(name)
                .is_none_or(|existing| existing.identical(value))
        })
    }

    /// Union of both sets, or `None` if they disagree on a shared name.
    pub fn merge_consistent(&self, other: &Bindings) -> Option<Bindings> {
        self.is_consistent_with(other).then(|| self.merge(other))
    }
}

impl Index<&str> for Bindings {
    type Output = Value;

    fn index(&self, name: &str) -> &Value {
        match self.values.get(name) {
            Some(value) => value,
            None => panic!("no binding named `{}`", name),
        }
    }
}

impl IntoIterator for Bindings {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.values
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect::<Vec<_>>()
            .into_iter()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Bindings {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Bindings {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_remove_leave_original_untouched() {
        let base = Bindings::new().set("x", Value::from(1));
        let more = base.set("y", Value::from(2));
        let less = more.remove("x");

        assert_eq!(base.names().collect::<Vec<_>>(), vec!["x"]);
        assert_eq!(more.names().collect::<Vec<_>>(), vec!["x", "y"]);
        assert_eq!(less.names().collect::<Vec<_>>(), vec!["y"]);
    }

    #[test]
    fn merge_prefers_the_right_side() {
        let left = Bindings::new().set("x", Value::from(1));
        let right = Bindings::new().set("x", Value::from(2));
        assert_eq!(left.merge(&right)["x"], Value::from(2));
    }

    #[test]
    fn merge_consistent_rejects_conflicts() {
        let left = Bindings::new().set("x", Value::from(1));
        let same = Bindings::new().set("x", Value::from(1));
        let other = Bindings::new().set("x", Value::from(2));

        assert_eq!(left.merge_consistent(&same), Some(left.clone()));
        assert_eq!(left.merge_consistent(&other), None);
    }

    #[test]
    fn absorb_leaves_earlier_clones_alone() {
        let mut scope = Bindings::new().set("x", Value::from(1));
        let snapshot = scope.clone();
        scope.absorb(&Bindings::new().set("y", Value::from(2)));
        scope.insert("z", Value::from(3));

        assert_eq!(snapshot.names().collect::<Vec<_>>(), vec!["x"]);
        assert_eq!(scope.names().collect::<Vec<_>>(), vec!["x", "y", "z"]);
    }
}
