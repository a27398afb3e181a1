//! Batches of lookups
//!
//! A [`Batch`] is sent as one physical request. Its order is the lookup
//! order and the result order.

use std::ops::{Index, IndexMut};

use crate::{Error, Lookup, Result};

/// Default and usual maximum number of lookups per batch
pub const MAX_BATCH_SIZE: usize = 100;

/// Bounded, ordered collection of lookups
///
/// # Examples
/// ```
/// use lookup_client::{Batch, Error, Lookup};
///
/// let mut batch: Batch<()> = Batch::with_capacity(1);
/// batch.add(Lookup::new().field("zipcode", "84604")).unwrap();
///
/// let err = batch.add(Lookup::new()).unwrap_err();
/// assert!(matches!(err, Error::BatchFull { capacity: 1 }));
/// assert_eq!(batch.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Batch<R> {
    lookups: Vec<Lookup<R>>,
    capacity: usize,
}

impl<R> Default for Batch<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> Batch<R> {
    /// Create an empty batch holding up to [`MAX_BATCH_SIZE`] lookups
    pub fn new() -> Self {
        Self::with_capacity(MAX_BATCH_SIZE)
    }

    /// Create an empty batch with a custom capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            lookups: Vec::new(),
            capacity,
        }
    }

    /// Append a lookup
    ///
    /// Fails with [`Error::BatchFull`] and leaves the batch untouched when it
    /// is already at capacity.
    pub fn add(&mut self, lookup: Lookup<R>) -> Result<()> {
        if self.is_full() {
            return Err(Error::BatchFull {
                capacity: self.capacity,
            });
        }
        self.lookups.push(lookup);
        Ok(())
    }

    /// Get the number of lookups
    pub fn len(&self) -> usize {
        self.lookups.len()
    }

    /// Check if the batch has no lookups
    pub fn is_empty(&self) -> bool {
        self.lookups.is_empty()
    }

    /// Check if the batch is at capacity
    pub fn is_full(&self) -> bool {
        self.lookups.len() >= self.capacity
    }

    /// Get the maximum number of lookups
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get a lookup by position
    pub fn get(&self, index: usize) -> Option<&Lookup<R>> {
        self.lookups.get(index)
    }

    /// Get a lookup by position, mutably
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Lookup<R>> {
        self.lookups.get_mut(index)
    }

    /// Get the first lookup whose `input_id` field matches
    pub fn get_by_input_id(&self, input_id: &str) -> Option<&Lookup<R>> {
        self.lookups
            .iter()
            .find(|lookup| lookup.input_id() == Some(input_id))
    }

    /// Get all lookups in order
    pub fn lookups(&self) -> &[Lookup<R>] {
        &self.lookups
    }

    /// Iterate over the lookups in order
    pub fn iter(&self) -> std::slice::Iter<'_, Lookup<R>> {
        self.lookups.iter()
    }

    /// Iterate mutably over the lookups in order
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Lookup<R>> {
        self.lookups.iter_mut()
    }

    /// Remove every lookup, keeping the capacity
    pub fn clear(&mut self) {
        self.lookups.clear();
    }
}

impl<R> Index<usize> for Batch<R> {
    type Output = Lookup<R>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.lookups[index]
    }
}

impl<R> IndexMut<usize> for Batch<R> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.lookups[index]
    }
}

impl<'a, R> IntoIterator for &'a Batch<R> {
    type Item = &'a Lookup<R>;
    type IntoIter = std::slice::Iter<'a, Lookup<R>>;

    fn into_iter(self) -> Self::IntoIter {
        self.lookups.iter()
    }
}
