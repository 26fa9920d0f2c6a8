//! Swappable handle to the current knowledge index.

use std::sync::{Arc, RwLock};

use super::knowledge::KnowledgeIndex;

/// The live index, replaceable without blocking readers for longer than a
/// pointer clone.
///
/// Readers take a [`snapshot`](Self::snapshot) and keep using it for the
/// whole request, so a concurrent [`replace`](Self::replace) never mixes two
/// indexes within one request.
#[derive(Debug)]
pub struct SharedIndex {
    current: RwLock<Arc<KnowledgeIndex>>,
}

impl SharedIndex {
    pub fn new(index: KnowledgeIndex) -> Self {
        Self {
            current: RwLock::new(Arc::new(index)),
        }
    }

    /// The index as of now.
    pub fn snapshot(&self) -> Arc<KnowledgeIndex> {
        // The lock only guards a pointer swap, so a poisoned lock still
        // holds a complete index.
        match self.current.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Install a fully built index. Returns the previous one.
    pub fn replace(&self, index: KnowledgeIndex) -> Arc<KnowledgeIndex> {
        let next = Arc::new(index);
        let mut guard = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        std::mem::replace(&mut *guard, next)
    }
}
