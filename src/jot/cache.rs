//! In-memory set of active note names.
//!
//! The cache answers "does this name exist" without touching disk. It is
//! seeded from the path index when a store opens and kept in step by every
//! save, delete and sweep. The name generator also parks freshly generated
//! names here so two concurrent requests never receive the same one.

use dashmap::DashSet;

#[derive(Debug, Default)]
pub struct ExistenceCache {
    names: DashSet<String>,
}

impl ExistenceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exists(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn add(&self, name: &str) {
        self.names.insert(name.to_string());
    }

    pub fn remove(&self, name: &str) {
        self.names.remove(name);
    }

    /// Inserts `name` if absent. Returns `true` when this call inserted it.
    ///
    /// Check and insert happen under the same shard lock, which is what makes
    /// generated names unique across threads.
    pub fn reserve(&self, name: &str) -> bool {
        self.names.insert(name.to_string())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.names.iter().map(|n| n.key().clone()).collect()
    }

    pub fn extend<I, S>(&self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            self.names.insert(name.into());
        }
    }
}
