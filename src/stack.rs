//! The metadata stack: an append-only collection of metadata fragments, each
//! scoped to a directory or file, with a lookup that merges every fragment
//! in scope for a given path.
//!
//! The stack has two phases. A [`StackBuilder`] only accepts fragments; a
//! [`Stack`] only answers queries. The one-way [`StackBuilder::finish`]
//! conversion is the boundary between the gather and transform passes, so
//! nothing can query metadata that is still being collected.

use crate::value::{merge, Mapping};
use std::path::{Path, PathBuf};

/// A unit of metadata tied to a single scope path.
#[derive(Clone, Debug)]
struct Fragment {
    /// Path relative to the source root. The empty path is the root scope.
    scope: PathBuf,
    metadata: Mapping,
}

impl Fragment {
    fn depth(&self) -> usize {
        self.scope.components().count()
    }

    fn applies_to(&self, path: &Path) -> bool {
        // component-wise, so `blog` covers `blog/a.md` but not `blog2/a.md`
        path.starts_with(&self.scope)
    }
}

/// The write phase of the metadata stack.
#[derive(Debug, Default)]
pub struct StackBuilder {
    fragments: Vec<Fragment>,
}

impl StackBuilder {
    pub fn new() -> StackBuilder {
        StackBuilder::default()
    }

    /// Appends a fragment at `scope`. Fragments are never overwritten; if
    /// several share a scope, the most recently added wins on conflicting
    /// keys at query time.
    pub fn add<P: Into<PathBuf>>(&mut self, scope: P, metadata: Mapping) {
        self.fragments.push(Fragment {
            scope: scope.into(),
            metadata,
        });
    }

    /// Closes the write phase.
    pub fn finish(self) -> Stack {
        Stack {
            fragments: self.fragments,
        }
    }
}

/// The read phase of the metadata stack.
#[derive(Debug)]
pub struct Stack {
    fragments: Vec<Fragment>,
}

impl Stack {
    /// Computes the effective metadata for `path` (relative to the source
    /// root): every fragment scoped to `path` or one of its ancestor
    /// directories, deep-merged from least to most specific. Returns an empty
    /// mapping when nothing applies.
    pub fn get(&self, path: &Path) -> Mapping {
        let mut applicable: Vec<&Fragment> =
            self.fragments.iter().filter(|f| f.applies_to(path)).collect();

        // stable, so fragments sharing a scope keep insertion order
        applicable.sort_by_key(|f| f.depth());

        let mut effective = Mapping::new();
        for fragment in applicable {
            merge(&mut effective, &fragment.metadata);
        }
        effective
    }

    /// The number of fragments in the stack.
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}
