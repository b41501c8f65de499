//! In-memory repository over a caller-chosen container.
//!
//! # Responsibility
//! - Provide a reference implementation of the repository contracts backed
//!   by an in-process container.
//! - Let the container type decide duplicate and ordering semantics.
//!
//! # Invariants
//! - Reads clone entities out; the container is never exposed mutably.
//! - Equality is the entity type's `PartialEq`/`Eq`/`Ord`.
//! - Filtering is a single pass in container iteration order.
//! - No internal synchronization: mutation requires `&mut self`.

use crate::model::pagination::PaginationData;
use crate::repo::{
    Filter, FilteredRepository, PaginatedRepository, RepoError, RepoResult, Repository,
};
use indexmap::IndexSet;
use log::debug;
use std::collections::BTreeSet;
use std::hash::Hash;

/// Container abstraction behind [`CollectionRepository`].
pub trait EntityStore<V> {
    /// Inserts a value. Set-like stores ignore a value equal to a stored one.
    fn insert(&mut self, entity: V);
    /// Removes the first stored value equal to `entity`.
    fn remove_first(&mut self, entity: &V) -> bool;
    fn contains(&self, entity: &V) -> bool;
    /// Replaces the first stored value equal to `entity`, keeping its position.
    fn replace(&mut self, entity: V) -> bool;
    fn iter<'a>(&'a self) -> impl Iterator<Item = &'a V> + 'a
    where
        V: 'a;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Duplicate-tolerant, insertion ordered.
impl<V: PartialEq> EntityStore<V> for Vec<V> {
    fn insert(&mut self, entity: V) {
        self.push(entity);
    }

    fn remove_first(&mut self, entity: &V) -> bool {
        let position = <[V]>::iter(self).position(|stored| stored == entity);
        match position {
            Some(index) => {
                Vec::remove(self, index);
                true
            }
            None => false,
        }
    }

    fn contains(&self, entity: &V) -> bool {
        <[V]>::contains(self, entity)
    }

    fn replace(&mut self, entity: V) -> bool {
        match self.iter_mut().find(|stored| **stored == entity) {
            Some(slot) => {
                *slot = entity;
                true
            }
            None => false,
        }
    }

    fn iter<'a>(&'a self) -> impl Iterator<Item = &'a V> + 'a
    where
        V: 'a,
    {
        <[V]>::iter(self)
    }

    fn len(&self) -> usize {
        Vec::len(self)
    }
}

/// Unique, insertion ordered.
impl<V: Hash + Eq> EntityStore<V> for IndexSet<V> {
    fn insert(&mut self, entity: V) {
        IndexSet::insert(self, entity);
    }

    fn remove_first(&mut self, entity: &V) -> bool {
        self.shift_remove(entity)
    }

    fn contains(&self, entity: &V) -> bool {
        IndexSet::contains(self, entity)
    }

    fn replace(&mut self, entity: V) -> bool {
        if !IndexSet::contains(self, &entity) {
            return false;
        }
        IndexSet::replace(self, entity);
        true
    }

    fn iter<'a>(&'a self) -> impl Iterator<Item = &'a V> + 'a
    where
        V: 'a,
    {
        IndexSet::iter(self)
    }

    fn len(&self) -> usize {
        IndexSet::len(self)
    }
}

/// Unique, sorted.
impl<V: Ord> EntityStore<V> for BTreeSet<V> {
    fn insert(&mut self, entity: V) {
        BTreeSet::insert(self, entity);
    }

    fn remove_first(&mut self, entity: &V) -> bool {
        BTreeSet::remove(self, entity)
    }

    fn contains(&self, entity: &V) -> bool {
        BTreeSet::contains(self, entity)
    }

    fn replace(&mut self, entity: V) -> bool {
        if !BTreeSet::contains(self, &entity) {
            return false;
        }
        BTreeSet::replace(self, entity);
        true
    }

    fn iter<'a>(&'a self) -> impl Iterator<Item = &'a V> + 'a
    where
        V: 'a,
    {
        BTreeSet::iter(self)
    }

    fn len(&self) -> usize {
        BTreeSet::len(self)
    }
}

/// Repository keeping its entities in an in-process container.
///
/// The default container is a `Vec`: duplicates allowed, insertion ordered.
#[derive(Debug, Clone)]
pub struct CollectionRepository<V, S = Vec<V>> {
    data: S,
    _entity: std::marker::PhantomData<fn() -> V>,
}

impl<V: PartialEq> CollectionRepository<V> {
    pub fn new() -> Self {
        Self::with_store(Vec::new())
    }
}

impl<V: PartialEq> Default for CollectionRepository<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, S: EntityStore<V>> CollectionRepository<V, S> {
    /// Wraps a caller-supplied container, keeping whatever it already holds.
    pub fn with_store(store: S) -> Self {
        Self {
            data: store,
            _entity: std::marker::PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_inner(self) -> S {
        self.data
    }

    fn matching<'s>(
        &'s self,
        filter: &'s Filter<'_, V>,
    ) -> RepoResult<Box<dyn Iterator<Item = &'s V> + 's>>
    where
        V: 's,
    {
        match filter {
            Filter::Predicate(predicate) => Ok(Box::new(
                self.data.iter().filter(move |entity| predicate(*entity)),
            )),
            Filter::Query(_) => Err(RepoError::UnsupportedFilter {
                repository: "collection",
                filter: filter.kind(),
            }),
        }
    }
}

impl<V: Clone, S: EntityStore<V>> Repository<V> for CollectionRepository<V, S> {
    fn add(&mut self, entity: &mut V) -> RepoResult<()> {
        self.data.insert(entity.clone());
        debug!(
            "event=repo_add module=repo repository=collection status=ok size={}",
            self.data.len()
        );
        Ok(())
    }

    fn remove(&mut self, entity: &V) -> RepoResult<()> {
        let removed = self.data.remove_first(entity);
        debug!(
            "event=repo_remove module=repo repository=collection status=ok removed={}",
            removed
        );
        Ok(())
    }

    fn update(&mut self, entity: &mut V) -> RepoResult<()> {
        let replaced = self.data.replace(entity.clone());
        debug!(
            "event=repo_update module=repo repository=collection status=ok replaced={}",
            replaced
        );
        Ok(())
    }

    fn upsert(&mut self, entity: &mut V) -> RepoResult<()> {
        if self.data.contains(entity) {
            self.update(entity)
        } else {
            self.add(entity)
        }
    }

    fn get_all(&self) -> RepoResult<Vec<V>> {
        Ok(self.data.iter().cloned().collect())
    }
}

impl<V: Clone, S: EntityStore<V>> FilteredRepository<V> for CollectionRepository<V, S> {
    fn get_collection(&self, filter: &Filter<'_, V>) -> RepoResult<Vec<V>> {
        Ok(self.matching(filter)?.cloned().collect())
    }

    fn get_entity(&self, filter: &Filter<'_, V>) -> RepoResult<Option<V>> {
        Ok(self.matching(filter)?.next().cloned())
    }
}

impl<V: Clone, S: EntityStore<V>> PaginatedRepository<V> for CollectionRepository<V, S> {
    fn get_all_paged(&self, pagination: &PaginationData) -> RepoResult<Vec<V>> {
        Ok(pagination.paginate(self.data.iter().cloned()))
    }

    fn get_collection_paged(
        &self,
        filter: &Filter<'_, V>,
        pagination: &PaginationData,
    ) -> RepoResult<Vec<V>> {
        Ok(pagination.paginate(self.matching(filter)?.cloned()))
    }
}
