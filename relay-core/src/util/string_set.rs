//! Unordered set of unique strings
//!
//! Used to track name sets (enabled joints, seen tags) without duplicates.
//! A set built from nothing stays unallocated until the first insert, and
//! that state is observable through [`StringSet::is_initialized`].

use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringSet {
    members: Option<HashSet<String>>,
}

impl StringSet {
    /// Creates an absent set. Nothing is allocated.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from an initial list
    ///
    /// An empty list yields an absent set rather than an allocated empty one.
    pub fn of<I, S>(strings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let members: HashSet<String> = strings.into_iter().map(Into::into).collect();
        if members.is_empty() {
            return Self::new();
        }
        Self {
            members: Some(members),
        }
    }

    /// Whether backing storage has been allocated
    pub fn is_initialized(&self) -> bool {
        self.members.is_some()
    }

    /// Inserts `s`; no-op if already present
    pub fn add(&mut self, s: impl Into<String>) {
        self.members.get_or_insert_with(HashSet::new).insert(s.into());
    }

    /// Removes `s` if present
    pub fn remove(&mut self, s: &str) {
        if let Some(members) = self.members.as_mut() {
            members.remove(s);
        }
    }

    pub fn count(&self) -> usize {
        self.members.as_ref().map_or(0, HashSet::len)
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    pub fn has(&self, s: &str) -> bool {
        self.members
            .as_ref()
            .is_some_and(|members| members.contains(s))
    }

    /// Iterates members in no particular order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.members.iter().flatten().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for StringSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::of(iter)
    }
}

impl<S: Into<String>> Extend<S> for StringSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for s in iter {
            self.add(s);
        }
    }
}
