//! Entity identity and first-seen deduplication.

use std::collections::HashSet;

use super::{EntityRef, TaskRecord};

/// Identity of a discovered entity.
///
/// Derived from the first available identifier in a fixed precedence chain:
/// entity id, notice id, detail URL, then a composite of name, forename,
/// date of birth, and sex. The derivation only looks at the summary itself,
/// so it does not depend on discovery order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DedupKey {
    /// `entity_id` (or `id`).
    Entity(String),
    /// `notice_id`.
    Notice(String),
    /// Detail URL.
    Url(String),
    /// `name|forename|date_of_birth|sex_id`.
    Composite(String),
}

impl DedupKey {
    /// Derives the key for an entity reference.
    #[must_use]
    pub fn of(entity: &EntityRef) -> Self {
        if !entity.entity_id.is_empty() {
            return Self::Entity(entity.entity_id.clone());
        }
        let notice_id = entity.summary.notice_id();
        if !notice_id.is_empty() {
            return Self::Notice(notice_id);
        }
        if !entity.detail_url.is_empty() {
            return Self::Url(entity.detail_url.clone());
        }
        let summary = &entity.summary;
        Self::Composite(format!(
            "{}|{}|{}|{}",
            summary.text("name").trim(),
            summary.text("forename").trim(),
            summary.text("date_of_birth").trim(),
            summary.text("sex_id").trim(),
        ))
    }
}

/// Keys admitted so far during one collection run.
///
/// Owned by the single-threaded collection stage; the only way to obtain a
/// [`TaskRecord`] is through [`SeenSet::admit`].
#[derive(Debug, Default)]
pub struct SeenSet {
    keys: HashSet<DedupKey>,
}

impl SeenSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Admits `entity` as a task unless its key was already seen.
    pub fn admit(&mut self, entity: EntityRef) -> Option<TaskRecord> {
        self.keys
            .insert(DedupKey::of(&entity))
            .then(|| TaskRecord::new(entity))
    }

    /// Returns true if `key` was already admitted.
    #[must_use]
    pub fn contains(&self, key: &DedupKey) -> bool {
        self.keys.contains(key)
    }

    /// Number of distinct keys admitted.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns true if nothing was admitted yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
