//! Metamorphic relation interface and an explicit relation registry.
//!
//! Relations only construct follow-up inputs here. Judging whether a
//! relation held for a given execution belongs to the experiment driver.

use crate::catalog::Catalog;
use crate::error::{Result, SamplingError};
use crate::model::{PairedSample, SampleInput};
use rand::RngCore;
use std::fmt;

/// Pair-construction side of a metamorphic relation.
pub trait MetamorphicRelation<T> {
    /// Identifier such as `"MR1"`; matches the catalog's relation names.
    fn id(&self) -> &str;

    fn description(&self) -> &str;

    /// Whether follow-ups can be built from `source`.
    fn is_applicable(&self, source: &SampleInput<T>) -> bool;

    /// Follow-up inputs derived from `source`. May be empty.
    fn follow_ups(&self, source: &SampleInput<T>, rng: &mut dyn RngCore) -> Vec<SampleInput<T>>;

    /// One group per follow-up.
    fn create_groups(&self, source: &SampleInput<T>, rng: &mut dyn RngCore) -> Vec<PairedSample<T>>
    where
        T: Clone,
    {
        self.follow_ups(source, rng)
            .into_iter()
            .map(|follow_up| {
                PairedSample::new(self.id(), self.description(), source.clone(), follow_up)
            })
            .collect()
    }
}

type BoxedRelation<T> = Box<dyn MetamorphicRelation<T> + Send + Sync>;

/// An ordered set of relations, passed to whatever needs relation lookup.
pub struct RelationRegistry<T> {
    relations: Vec<BoxedRelation<T>>,
}

impl<T> Default for RelationRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RelationRegistry<T> {
    pub fn new() -> Self {
        RelationRegistry {
            relations: Vec::new(),
        }
    }

    /// Add a relation. Ids must be unique.
    pub fn register<R>(&mut self, relation: R) -> Result<&mut Self>
    where
        R: MetamorphicRelation<T> + Send + Sync + 'static,
    {
        if self.get(relation.id()).is_some() {
            return Err(SamplingError::config(format!(
                "relation {} registered twice",
                relation.id()
            )));
        }
        self.relations.push(Box::new(relation));
        Ok(self)
    }

    /// Builder-style `register`.
    pub fn with<R>(mut self, relation: R) -> Result<Self>
    where
        R: MetamorphicRelation<T> + Send + Sync + 'static,
    {
        self.register(relation)?;
        Ok(self)
    }

    pub fn get(&self, id: &str) -> Option<&(dyn MetamorphicRelation<T> + Send + Sync)> {
        self.relations
            .iter()
            .find(|relation| relation.id() == id)
            .map(|relation| &**relation)
    }

    pub fn ids(&self) -> Vec<&str> {
        self.relations.iter().map(|relation| relation.id()).collect()
    }

    pub fn len(&self) -> usize {
        self.relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    /// Relations applicable to `source`, in registration order.
    pub fn applicable<'r>(
        &'r self,
        source: &'r SampleInput<T>,
    ) -> impl Iterator<Item = &'r (dyn MetamorphicRelation<T> + Send + Sync)> + 'r {
        self.relations
            .iter()
            .map(|relation| &**relation)
            .filter(move |relation| relation.is_applicable(source))
    }

    /// Every group any applicable relation builds from `source`.
    pub fn groups_for(&self, source: &SampleInput<T>, rng: &mut dyn RngCore) -> Vec<PairedSample<T>>
    where
        T: Clone,
    {
        let mut groups = Vec::new();
        for relation in self.applicable(source) {
            groups.extend(relation.create_groups(source, rng));
        }
        groups
    }

    /// Fail when the catalog names a relation this registry lacks.
    pub fn ensure_covers(&self, catalog: &Catalog) -> Result<()> {
        let missing: Vec<&str> = catalog
            .relation_names()
            .filter(|name| self.get(name).is_none())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(SamplingError::config(format!(
                "catalog names unregistered relations: {}",
                missing.join(", ")
            )))
        }
    }
}

impl<T> fmt::Debug for RelationRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelationRegistry")
            .field("relations", &self.ids())
            .finish()
    }
}
