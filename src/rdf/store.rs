//! Insertion-ordered triple set
//!
//! Both mapping directions materialize the whole graph in a `TripleSet`
//! before doing any work. Iteration follows insertion order, which is what
//! lets multi-valued list properties keep their element order through a
//! write/parse/read cycle. Identical triples are stored once.

use super::types::{RdfObject, RdfPredicate, RdfSubject, Triple};
use indexmap::IndexSet;

/// Ordered, de-duplicating set of triples
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TripleSet {
    triples: IndexSet<Triple>,
}

impl TripleSet {
    /// Create a new empty triple set
    pub fn new() -> Self {
        Self {
            triples: IndexSet::new(),
        }
    }

    /// Insert a triple. Returns `false` if it was already present.
    pub fn insert(&mut self, triple: Triple) -> bool {
        self.triples.insert(triple)
    }

    /// Build and insert a triple from its parts
    pub fn add(
        &mut self,
        subject: impl Into<RdfSubject>,
        predicate: impl Into<RdfPredicate>,
        object: impl Into<RdfObject>,
    ) -> bool {
        self.insert(Triple::new(subject.into(), predicate.into(), object.into()))
    }

    /// Check if a triple exists in the set
    pub fn contains(&self, triple: &Triple) -> bool {
        self.triples.contains(triple)
    }

    /// Get the total number of triples
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    /// Check if the set is empty
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Iterate in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    /// Objects of all `(subject, predicate, *)` triples, in insertion order
    pub fn objects(&self, subject: &RdfSubject, predicate: &RdfPredicate) -> Vec<&RdfObject> {
        self.triples
            .iter()
            .filter(|triple| &triple.subject == subject && &triple.predicate == predicate)
            .map(|triple| &triple.object)
            .collect()
    }
}

impl<'a> IntoIterator for &'a TripleSet {
    type Item = &'a Triple;
    type IntoIter = indexmap::set::Iter<'a, Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.iter()
    }
}

impl IntoIterator for TripleSet {
    type Item = Triple;
    type IntoIter = indexmap::set::IntoIter<Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.into_iter()
    }
}

impl FromIterator<Triple> for TripleSet {
    fn from_iter<I: IntoIterator<Item = Triple>>(iter: I) -> Self {
        Self {
            triples: iter.into_iter().collect(),
        }
    }
}

impl Extend<Triple> for TripleSet {
    fn extend<I: IntoIterator<Item = Triple>>(&mut self, iter: I) {
        self.triples.extend(iter);
    }
}
