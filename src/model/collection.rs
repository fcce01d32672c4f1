//! Ordered, name-keyed collections with case-insensitive uniqueness.

use std::cmp::Ordering;
use std::fmt;

use thiserror::Error;

use super::EntityKind;

/// Errors raised by collection operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// An entity with the same name (ignoring case) already exists.
    #[error("{kind} '{name}' already exists in {scope}")]
    DuplicateName {
        kind: EntityKind,
        name: String,
        scope: String,
    },

    /// No entity with the given name exists.
    #[error("{kind} '{name}' not found in {scope}")]
    NotFound {
        kind: EntityKind,
        name: String,
        scope: String,
    },
}

pub type ModelResult<T> = Result<T, ModelError>;

/// An entity addressed by name within its parent.
pub trait Named {
    /// The kind reported in errors.
    const KIND: EntityKind;

    fn name(&self) -> &str;
}

/// Name mutation is reserved to the owning collection.
pub(crate) trait Rename: Named {
    fn set_name(&mut self, name: String);
}

/// Case-insensitive name equality (Unicode lowercase folding).
#[must_use]
pub fn names_equal(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

/// Case-insensitive name ordering, ties broken by the exact spelling so the
/// order is total.
#[must_use]
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// An ordered collection of named entities.
///
/// Iteration order is insertion order until [`NamedCollection::sort_by_name`]
/// is called. Lookups ignore case.
#[derive(Clone, PartialEq)]
pub struct NamedCollection<T> {
    scope: String,
    items: Vec<T>,
}

impl<T: Named> NamedCollection<T> {
    /// Create an empty collection. `scope` names the owner in error messages
    /// (e.g. `table 'Sales'`).
    pub fn new(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            items: Vec::new(),
        }
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub(crate) fn set_scope(&mut self, scope: impl Into<String>) {
        self.scope = scope.into();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append an entity, failing if its name is already taken.
    pub fn add(&mut self, item: T) -> ModelResult<&mut T> {
        if self.contains(item.name()) {
            return Err(self.duplicate(item.name()));
        }
        self.items.push(item);
        let last = self.items.len() - 1;
        Ok(&mut self.items[last])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.items.iter().position(|i| names_equal(i.name(), name))
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.position(name).map(|idx| &self.items[idx])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut T> {
        match self.position(name) {
            Some(idx) => Some(&mut self.items[idx]),
            None => None,
        }
    }

    /// Look up an entity, reporting `NotFound` with this collection's scope.
    pub fn require(&self, name: &str) -> ModelResult<&T> {
        self.get(name).ok_or_else(|| self.not_found(name))
    }

    pub fn require_mut(&mut self, name: &str) -> ModelResult<&mut T> {
        match self.position(name) {
            Some(idx) => Ok(&mut self.items[idx]),
            None => Err(self.not_found(name)),
        }
    }

    pub fn remove(&mut self, name: &str) -> ModelResult<T> {
        match self.position(name) {
            Some(idx) => Ok(self.items.remove(idx)),
            None => Err(self.not_found(name)),
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    pub fn names(&self) -> Vec<&str> {
        self.items.iter().map(Named::name).collect()
    }

    /// Stable sort by case-insensitive name.
    pub fn sort_by_name(&mut self) {
        self.items.sort_by(|a, b| compare_names(a.name(), b.name()));
    }

    /// Check that `old` exists and `new` would not collide with a sibling.
    ///
    /// Renaming an entity to a different casing of its own name is allowed.
    pub fn check_rename(&self, old: &str, new: &str) -> ModelResult<usize> {
        let idx = self.position(old).ok_or_else(|| self.not_found(old))?;
        if let Some(other) = self.position(new) {
            if other != idx {
                return Err(self.duplicate(new));
            }
        }
        Ok(idx)
    }

    pub(crate) fn rename(&mut self, old: &str, new: &str) -> ModelResult<&mut T>
    where
        T: Rename,
    {
        let idx = self.check_rename(old, new)?;
        self.items[idx].set_name(new.to_string());
        Ok(&mut self.items[idx])
    }

    pub(crate) fn duplicate(&self, name: &str) -> ModelError {
        ModelError::DuplicateName {
            kind: T::KIND,
            name: name.to_string(),
            scope: self.scope.clone(),
        }
    }

    pub(crate) fn not_found(&self, name: &str) -> ModelError {
        ModelError::NotFound {
            kind: T::KIND,
            name: name.to_string(),
            scope: self.scope.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for NamedCollection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items.iter()).finish()
    }
}

impl<'a, T> IntoIterator for &'a NamedCollection<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut NamedCollection<T> {
    type Item = &'a mut T;
    type IntoIter = std::slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter_mut()
    }
}
