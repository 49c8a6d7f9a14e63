//! LRU List Module
//!
//! Arena-backed doubly-linked list that keeps items in recency order.

/// Link value marking the end of the list.
const NIL: usize = usize::MAX;

#[derive(Debug)]
struct Slot<T> {
    item: Option<T>,
    prev: usize,
    next: usize,
}

// == LRU List ==
/// Recency-ordered list of items stored in a `Vec` arena.
///
/// - Front = Most recently used
/// - Back = Least recently used
///
/// Every pushed item gets a `usize` handle that stays valid until the item is
/// removed. Freed slots are recycled through an intrusive free list, so no
/// operation other than growth allocates.
#[derive(Debug)]
pub struct LruList<T> {
    slots: Vec<Slot<T>>,
    head: usize,
    tail: usize,
    free: usize,
    len: usize,
}

impl<T> Default for LruList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LruList<T> {
    // == Constructor ==
    /// Creates a new empty list.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates a new empty list with room for `capacity` items.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            head: NIL,
            tail: NIL,
            free: NIL,
            len: 0,
        }
    }

    // == Push Front ==
    /// Inserts an item as most recently used and returns its handle.
    pub fn push_front(&mut self, item: T) -> usize {
        let idx = if self.free != NIL {
            let idx = self.free;
            self.free = self.slots[idx].next;
            self.slots[idx] = Slot {
                item: Some(item),
                prev: NIL,
                next: NIL,
            };
            idx
        } else {
            self.slots.push(Slot {
                item: Some(item),
                prev: NIL,
                next: NIL,
            });
            self.slots.len() - 1
        };

        self.link_front(idx);
        self.len += 1;
        idx
    }

    // == Move To Front ==
    /// Marks the item behind `handle` as most recently used.
    pub fn move_to_front(&mut self, handle: usize) {
        if self.head == handle || !self.is_live(handle) {
            return;
        }
        self.unlink(handle);
        self.link_front(handle);
    }

    // == Remove ==
    /// Removes the item behind `handle` and returns it.
    ///
    /// Returns None if the handle does not refer to a live item.
    pub fn remove(&mut self, handle: usize) -> Option<T> {
        if !self.is_live(handle) {
            return None;
        }
        self.unlink(handle);
        let item = self.slots[handle].item.take();
        self.slots[handle].next = self.free;
        self.free = handle;
        self.len -= 1;
        item
    }

    // == Pop Back ==
    /// Removes and returns the least recently used item.
    pub fn pop_back(&mut self) -> Option<T> {
        self.back().and_then(|handle| self.remove(handle))
    }

    // == Back ==
    /// Returns the handle of the least recently used item.
    pub fn back(&self) -> Option<usize> {
        (self.tail != NIL).then_some(self.tail)
    }

    /// Returns the handle of the most recently used item.
    pub fn front(&self) -> Option<usize> {
        (self.head != NIL).then_some(self.head)
    }

    // == Access ==
    pub fn get(&self, handle: usize) -> Option<&T> {
        self.slots.get(handle).and_then(|slot| slot.item.as_ref())
    }

    pub fn get_mut(&mut self, handle: usize) -> Option<&mut T> {
        self.slots.get_mut(handle).and_then(|slot| slot.item.as_mut())
    }

    // == Length ==
    /// Returns the number of live items.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    // == Clear ==
    /// Drops every item and releases all handles.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.head = NIL;
        self.tail = NIL;
        self.free = NIL;
        self.len = 0;
    }

    /// Iterates from most recently used to least recently used.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            current: self.head,
        }
    }

    fn is_live(&self, handle: usize) -> bool {
        self.slots
            .get(handle)
            .map(|slot| slot.item.is_some())
            .unwrap_or(false)
    }

    fn link_front(&mut self, idx: usize) {
        self.slots[idx].prev = NIL;
        self.slots[idx].next = self.head;
        if self.head != NIL {
            self.slots[self.head].prev = idx;
        }
        self.head = idx;
        if self.tail == NIL {
            self.tail = idx;
        }
    }

    fn unlink(&mut self, idx: usize) {
        let prev = self.slots[idx].prev;
        let next = self.slots[idx].next;

        if prev != NIL {
            self.slots[prev].next = next;
        } else {
            self.head = next;
        }

        if next != NIL {
            self.slots[next].prev = prev;
        } else {
            self.tail = prev;
        }

        self.slots[idx].prev = NIL;
        self.slots[idx].next = NIL;
    }
}

// == Iterator ==
/// Iterator over items from most recently used to least recently used.
pub struct Iter<'a, T> {
    list: &'a LruList<T>,
    current: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current == NIL {
            return None;
        }
        let slot = &self.list.slots[self.current];
        self.current = slot.next;
        slot.item.as_ref()
    }
}
