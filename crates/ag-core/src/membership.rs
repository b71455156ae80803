//! Create-or-update classification for imports.

use std::collections::HashSet;

use crate::config::ExistingPolicy;

/// Names of the entities that already exist remotely.
///
/// Built once from a listing before an import is dispatched and only read
/// afterwards, so workers can share it without locking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipSet {
    names: HashSet<String>,
}

impl MembershipSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `name` exists remotely.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Number of known names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if nothing exists remotely.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Decides what an import should do with the entity called `name`.
    ///
    /// `updatable` is false for kinds that have no update operation; existing
    /// entities of such kinds are skipped.
    #[must_use]
    pub fn classify(&self, name: &str, updatable: bool, existing: ExistingPolicy) -> UpsertAction {
        if !self.contains(name) {
            return UpsertAction::Create;
        }
        match existing {
            ExistingPolicy::Update if updatable => UpsertAction::Update,
            _ => UpsertAction::Skip,
        }
    }
}

impl<S: Into<String>> FromIterator<S> for MembershipSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Operation chosen for one import job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpsertAction {
    /// `POST` to the collection.
    Create,
    /// Update the entity in place.
    Update,
    /// Leave the existing entity untouched.
    Skip,
}

impl std::fmt::Display for UpsertAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Create => f.write_str("create"),
            Self::Update => f.write_str("update"),
            Self::Skip => f.write_str("skip"),
        }
    }
}
