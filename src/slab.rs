//! Slot arena backing the node storage.
//!
//! Freed slots are kept on an intrusive free list and reused by later
//! insertions, so a [`NodeId`] stays valid exactly as long as the entry it
//! was issued for. The arena does not track generations; whoever holds an
//! id of a removed entry may observe an unrelated value that was inserted
//! into the recycled slot.

use std::iter::FusedIterator;
use std::ops::{Index, IndexMut};

use crate::NodeId;

/// A slab arena managing [`NodeId`]-addressed slots.
#[derive(Debug)]
pub(crate) struct Slab<V> {
    data: Vec<Entry<V>>,
    free: usize,
    len: usize,
}

#[derive(Debug)]
enum Entry<V> {
    Free(usize),
    Full(V),
}

impl<V> Slab<V> {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            free: 0,
            len: 0,
        }
    }

    /// Creates an empty arena with preallocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            free: 0,
            len: 0,
        }
    }

    /// Returns the number of stored values.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns whether there is no stored value.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns whether the arena has a value at `key`.
    #[inline]
    pub fn contains(&self, key: NodeId) -> bool {
        matches!(self.data.get(key.index()), Some(Entry::Full(_)))
    }

    /// Stores a value, reusing a freed slot when one is available.
    pub fn insert(&mut self, value: V) -> NodeId {
        let index = self.free;

        if index == self.data.len() {
            self.data.push(Entry::Full(value));
            self.free += 1;
        } else {
            let Entry::Free(next) = self.data[index] else {
                unreachable!()
            };
            self.free = next;
            self.data[index] = Entry::Full(value);
        }

        self.len += 1;

        NodeId::new(index)
    }

    /// Removes the value at `key`, putting the slot on the free list.
    ///
    /// Returns `None` when the slot is already free or out of range.
    pub fn remove(&mut self, key: NodeId) -> Option<V> {
        let index = key.index();
        let entry = self.data.get_mut(index)?;

        let entry_data = std::mem::replace(entry, Entry::Free(self.free));

        match entry_data {
            Entry::Free(_) => {
                *entry = entry_data;
                None
            }
            Entry::Full(value) => {
                self.free = index;
                self.len -= 1;
                Some(value)
            }
        }
    }

    pub fn get(&self, key: NodeId) -> Option<&V> {
        match self.data.get(key.index()) {
            Some(Entry::Full(value)) => Some(value),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, key: NodeId) -> Option<&mut V> {
        match self.data.get_mut(key.index()) {
            Some(Entry::Full(value)) => Some(value),
            _ => None,
        }
    }

    pub fn clear(&mut self) {
        self.data.clear();
        self.free = 0;
        self.len = 0;
    }

    /// Iterates over the occupied slots in index order.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            entries: self.data.iter().enumerate(),
            len: self.len,
        }
    }

    /// Mutable variant of [`Slab::iter`].
    pub fn iter_mut(&mut self) -> IterMut<'_, V> {
        IterMut {
            entries: self.data.iter_mut().enumerate(),
            len: self.len,
        }
    }

    /// Shrinks the backing buffer to fit the occupied slots.
    pub fn shrink_to_fit(&mut self) {
        self.data.shrink_to_fit()
    }

    /// Compacts the arena by moving all values to the front, preserving
    /// their relative order.
    ///
    /// Calls `rekey` with the value and its old and new key for every
    /// surviving entry.
    pub fn compact<F>(&mut self, mut rekey: F)
    where
        F: FnMut(&mut V, NodeId, NodeId),
    {
        let mut old_index = 0;
        let mut new_index = 0;

        self.data.retain_mut(|entry| match entry {
            Entry::Free(_) => {
                old_index += 1;
                false
            }
            Entry::Full(value) => {
                rekey(value, NodeId::new(old_index), NodeId::new(new_index));
                old_index += 1;
                new_index += 1;
                true
            }
        });

        self.free = self.data.len();
    }
}

impl<V> Default for Slab<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Index<NodeId> for Slab<V> {
    type Output = V;

    fn index(&self, key: NodeId) -> &Self::Output {
        self.get(key).expect("invalid node id")
    }
}

impl<V> IndexMut<NodeId> for Slab<V> {
    fn index_mut(&mut self, key: NodeId) -> &mut Self::Output {
        self.get_mut(key).expect("invalid node id")
    }
}

pub(crate) struct Iter<'a, V> {
    entries: std::iter::Enumerate<std::slice::Iter<'a, Entry<V>>>,
    len: usize,
}

impl<'a, V> Clone for Iter<'a, V> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            len: self.len,
        }
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (NodeId, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        for (index, entry) in self.entries.by_ref() {
            if let Entry::Full(value) = entry {
                self.len -= 1;
                return Some((NodeId::new(index), value));
            }
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<'a, V> ExactSizeIterator for Iter<'a, V> {
    fn len(&self) -> usize {
        self.len
    }
}

impl<'a, V> FusedIterator for Iter<'a, V> {}

pub(crate) struct IterMut<'a, V> {
    entries: std::iter::Enumerate<std::slice::IterMut<'a, Entry<V>>>,
    len: usize,
}

impl<'a, V> Iterator for IterMut<'a, V> {
    type Item = (NodeId, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        for (index, entry) in self.entries.by_ref() {
            if let Entry::Full(value) = entry {
                self.len -= 1;
                return Some((NodeId::new(index), value));
            }
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<'a, V> ExactSizeIterator for IterMut<'a, V> {
    fn len(&self) -> usize {
        self.len
    }
}

impl<'a, V> FusedIterator for IterMut<'a, V> {}
