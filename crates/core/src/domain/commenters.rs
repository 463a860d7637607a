use std::collections::BTreeSet;

use serde::Serialize;

/// Unique commenter names accumulated over a session.
///
/// Names are compared exactly; no case folding or trimming happens here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CommenterSet {
    names: BTreeSet<String>,
}

impl CommenterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unions `names` into the set and returns how many were not present yet.
    pub fn merge<I>(&mut self, names: I) -> usize
    where
        I: IntoIterator<Item = String>,
    {
        let mut added = 0;
        for name in names {
            if self.names.insert(name) {
                added += 1;
            }
        }
        added
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.names.iter()
    }

    /// Removes every name and returns how many were dropped.
    pub fn clear(&mut self) -> usize {
        let removed = self.names.len();
        self.names.clear();
        removed
    }
}

impl FromIterator<String> for CommenterSet {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        Self {
            names: iter.into_iter().collect(),
        }
    }
}
