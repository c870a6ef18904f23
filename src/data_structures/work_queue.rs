use indexmap::IndexSet;
use std::collections::VecDeque;
use std::hash::Hash;
use std::iter::FromIterator;

/// Data structure consisting of a read queue and a pending set. Write operations go into the pending set,
/// read operations are performed on the read queue and calling [WorkQueue::swap] moves the pending set into
/// the read queue.
///
/// The pending set ignores items it already holds and keeps first-insertion order, so one drain of the read
/// queue visits every item at most once and always in the same order.
///
/// # Example
/// ```
/// # use logicgraph::data_structures::WorkQueue;
/// let mut queue = WorkQueue::new();
///
/// queue.push(1);
/// queue.push(2);
/// queue.push(1);
///
/// assert_eq!(queue.pop(), None);
///
/// queue.swap();
///
/// assert_eq!(queue.pop(), Some(1));
/// assert_eq!(queue.pop(), Some(2));
/// assert_eq!(queue.pop(), None);
/// ```
#[derive(Debug, Clone)]
pub struct WorkQueue<T: Hash + Eq> {
    read_queue: VecDeque<T>,
    pending: IndexSet<T>,
}

impl<T: Hash + Eq> WorkQueue<T> {
    /// Returns an empty [WorkQueue].
    pub fn new() -> Self {
        Self {
            read_queue: Default::default(),
            pending: Default::default(),
        }
    }

    /// Pops an item from the front of the read queue and returns it.
    /// If the read queue is empty, returns None.
    #[inline(always)]
    pub fn pop(&mut self) -> Option<T> {
        self.read_queue.pop_front()
    }

    /// Adds an item to the pending set.
    #[inline(always)]
    pub fn push(&mut self, v: T) {
        self.pending.insert(v);
    }

    /// Adds all the items in the iterator to the pending set.
    #[inline(always)]
    pub fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.pending.extend(iter)
    }

    /// Moves the pending set into the read queue, after calling this method you can [pop](WorkQueue::pop)
    /// items that you had previously [pushed](WorkQueue::push).
    #[inline(always)]
    pub fn swap(&mut self) {
        debug_assert!(
            self.read_queue.is_empty(),
            "Tried to swap while the read queue is not empty"
        );
        self.read_queue.extend(self.pending.drain(..));
    }

    /// Returns the number of items waiting in the pending set.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Returns the number of items in the read queue and the pending set.
    pub fn len(&self) -> usize {
        self.read_queue.len() + self.pending.len()
    }

    /// Returns true if both the read queue and the pending set are empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every queued and pending item.
    pub fn clear(&mut self) {
        self.read_queue.clear();
        self.pending.clear();
    }
}

impl<T: Hash + Eq> Default for WorkQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Hash + Eq> FromIterator<T> for WorkQueue<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            read_queue: Default::default(),
            pending: iter.into_iter().collect(),
        }
    }
}
