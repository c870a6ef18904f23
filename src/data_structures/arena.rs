use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

/// Implemented by the handle types that index into an [Arena].
///
/// The conversions are deliberately verbose so handles don't get built out of thin air.
pub trait ArenaIndex: Copy {
    /// Returns a handle for slot `i`.
    fn from_slot(i: usize) -> Self;
    /// Returns the slot this handle points at.
    fn slot(self) -> usize;
}

/// Append-only storage for items of the same type addressed by typed handles.
///
/// Nothing is ever removed, so a handle handed out by [Arena::insert] stays valid for the
/// lifetime of the arena and iteration order is insertion order.
///
/// # Example
///
/// ```
/// # use logicgraph::data_structures::Arena;
/// # use logicgraph::NodeId;
/// let mut a: Arena<NodeId, &str> = Arena::new();
///
/// let first = a.insert("first");
/// let second = a.insert("second");
///
/// assert_eq!(a.get(first), Some(&"first"));
/// assert_eq!(a[second], "second");
/// assert_eq!(a.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Arena<I, T> {
    data: Vec<T>,
    _index: PhantomData<I>,
}

impl<I: ArenaIndex, T> Arena<I, T> {
    /// Returns an empty [Arena].
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            _index: PhantomData,
        }
    }

    /// Inserts an item into the arena and returns its handle.
    pub fn insert(&mut self, item: T) -> I {
        let index = I::from_slot(self.data.len());
        self.data.push(item);
        index
    }

    /// Returns the handle the next [Arena::insert] will return.
    pub fn next_index(&self) -> I {
        I::from_slot(self.data.len())
    }

    /// Returns a reference to the item at `index`, [None] if it is out of bounds.
    pub fn get(&self, index: I) -> Option<&T> {
        self.data.get(index.slot())
    }

    /// Returns a mutable reference to the item at `index`, [None] if it is out of bounds.
    pub fn get_mut(&mut self, index: I) -> Option<&mut T> {
        self.data.get_mut(index.slot())
    }

    /// Returns the number of items in the arena.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the arena holds no items.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns an iterator over pairs of `(handle, &item)` in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (I, &T)> + '_ {
        self.data
            .iter()
            .enumerate()
            .map(|(i, item)| (I::from_slot(i), item))
    }

    /// Returns an iterator over pairs of `(handle, &mut item)` in insertion order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (I, &mut T)> + '_ {
        self.data
            .iter_mut()
            .enumerate()
            .map(|(i, item)| (I::from_slot(i), item))
    }

    /// Returns an iterator over the items in insertion order.
    pub fn values_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.data.iter_mut()
    }
}

impl<I: ArenaIndex, T> Default for Arena<I, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: ArenaIndex, T> Index<I> for Arena<I, T> {
    type Output = T;
    fn index(&self, index: I) -> &T {
        &self.data[index.slot()]
    }
}

impl<I: ArenaIndex, T> IndexMut<I> for Arena<I, T> {
    fn index_mut(&mut self, index: I) -> &mut T {
        &mut self.data[index.slot()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Idx(usize);
    impl ArenaIndex for Idx {
        fn from_slot(i: usize) -> Self {
            Idx(i)
        }
        fn slot(self) -> usize {
            self.0
        }
    }

    #[test]
    fn test_insert_get() {
        let mut a: Arena<Idx, u8> = Arena::new();
        assert!(a.is_empty());
        assert_eq!(a.get(Idx(0)), None);

        for i in 0..10 {
            assert_eq!(a.next_index(), Idx(i as usize));
            let index = a.insert(i);
            assert_eq!(a.get(index), Some(&i));
        }
        assert_eq!(a.len(), 10);
        assert_eq!(a.get(Idx(10)), None);
    }

    #[test]
    fn test_get_mut() {
        let mut a: Arena<Idx, u8> = Arena::new();
        let index = a.insert(3);
        *a.get_mut(index).unwrap() += 1;
        a[index] += 1;
        assert_eq!(a[index], 5);
    }

    #[test]
    fn test_iter_in_insertion_order() {
        let mut a: Arena<Idx, char> = Arena::new();
        for c in "logic".chars() {
            a.insert(c);
        }
        let collected: String = a.iter().map(|(_, c)| *c).collect();
        assert_eq!(collected, "logic");

        for (i, c) in a.iter_mut() {
            if i.0 == 0 {
                *c = 'L';
            }
        }
        assert_eq!(a[Idx(0)], 'L');
        assert_eq!(a.iter().last().map(|(i, _)| i), Some(Idx(4)));
    }
}
