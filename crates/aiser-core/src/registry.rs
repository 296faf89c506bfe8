//! Id-keyed registries of agents and knowledge bases.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::{Agent, Error, KnowledgeBase, Result};

/// Something addressable by a stable string id.
pub trait Identifiable {
    /// Returns the stable identifier.
    fn id(&self) -> &str;

    /// Returns `true` if this entity answers to the given id.
    ///
    /// Defaults to exact equality with [`Identifiable::id`].
    fn accepts_id(&self, id: &str) -> bool {
        self.id() == id
    }
}

/// Registry of agents keyed by id.
pub type AgentRegistry = Registry<dyn Agent>;

/// Registry of knowledge bases keyed by id.
pub type KnowledgeBaseRegistry = Registry<dyn KnowledgeBase>;

/// Immutable, id-keyed collection of shared entities.
///
/// Built once at startup and shared read-only afterwards. Registration order
/// is preserved by [`Registry::ids`] and [`Registry::iter`].
pub struct Registry<T: ?Sized + Identifiable> {
    entries: Vec<Arc<T>>,
    index: HashMap<String, usize>,
    entity: &'static str,
}

impl<T: ?Sized + Identifiable> Registry<T> {
    /// Creates a new registry for the given entity name.
    ///
    /// The entity name is used in error messages, e.g. `"agent"`.
    ///
    /// # Errors
    ///
    /// Returns a duplicate-id error if two entries share an id.
    pub fn new(entity: &'static str, entries: Vec<Arc<T>>) -> Result<Self> {
        let mut index = HashMap::with_capacity(entries.len());
        for (position, entry) in entries.iter().enumerate() {
            if index.insert(entry.id().to_owned(), position).is_some() {
                return Err(Error::duplicate_id(entity, entry.id()));
            }
        }

        Ok(Self {
            entries,
            index,
            entity,
        })
    }

    /// Creates an empty registry.
    pub fn empty(entity: &'static str) -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
            entity,
        }
    }

    /// Resolves the entry that accepts the given id.
    ///
    /// Exact id matches are looked up first; otherwise the first entry whose
    /// [`Identifiable::accepts_id`] returns `true` wins.
    ///
    /// # Errors
    ///
    /// Returns a not-found error if no entry accepts the id.
    pub fn resolve(&self, id: &str) -> Result<Arc<T>> {
        if let Some(&position) = self.index.get(id) {
            return Ok(Arc::clone(&self.entries[position]));
        }

        self.entries
            .iter()
            .find(|entry| entry.accepts_id(id))
            .cloned()
            .ok_or_else(|| Error::not_found(self.entity, id))
    }

    /// Returns `true` if some entry accepts the given id.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id) || self.entries.iter().any(|entry| entry.accepts_id(id))
    }

    /// Returns the registered ids in registration order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.id())
    }

    /// Returns the registered entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<T>> {
        self.entries.iter()
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the registry holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: ?Sized + Identifiable> fmt::Debug for Registry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("entity", &self.entity)
            .field("ids", &self.ids().collect::<Vec<_>>())
            .finish()
    }
}
