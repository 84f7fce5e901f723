//! Type-safe handles for simulation entities
//!
//! Handles reference entries in a [`HandleMap`] without borrowing it. They use
//! generational indices, so a handle to a despawned entity never resolves to
//! whatever entity later reuses the same slot.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// A type-safe handle to a value of type T
pub struct Handle<T> {
    index: u32,
    generation: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    /// Create a new handle from index and generation
    #[inline]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self {
            index,
            generation,
            _marker: PhantomData,
        }
    }

    /// Create an invalid/null handle
    #[inline]
    pub const fn null() -> Self {
        Self::new(u32::MAX, u32::MAX)
    }

    /// Check if this handle is null
    #[inline]
    pub const fn is_null(&self) -> bool {
        self.index == u32::MAX && self.generation == u32::MAX
    }

    /// Get the index portion
    #[inline]
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// Get the generation portion
    #[inline]
    pub const fn generation(&self) -> u32 {
        self.generation
    }

    /// Pack into raw bits (generation in the upper half)
    #[inline]
    pub const fn to_bits(&self) -> u64 {
        (self.generation as u64) << 32 | self.index as u64
    }

    /// Unpack from raw bits
    #[inline]
    pub const fn from_bits(bits: u64) -> Self {
        Self::new(bits as u32, (bits >> 32) as u32)
    }
}

// Manual trait implementations to avoid T bounds
impl<T> Clone for Handle<T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_bits().hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "Handle(null)")
        } else {
            write!(f, "Handle({}v{})", self.index, self.generation)
        }
    }
}

impl<T> fmt::Display for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

impl<T> Default for Handle<T> {
    fn default() -> Self {
        Self::null()
    }
}

/// Allocates handles with generation tracking
pub struct HandleAllocator<T> {
    /// Generations for each slot
    generations: Vec<u32>,
    /// Free list of available indices
    free_list: Vec<u32>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> HandleAllocator<T> {
    /// Create a new handle allocator
    pub fn new() -> Self {
        Self::with_capacity(64)
    }

    /// Create with specific initial capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            generations: Vec::with_capacity(capacity),
            free_list: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Allocate a new handle
    pub fn allocate(&mut self) -> Handle<T> {
        if let Some(index) = self.free_list.pop() {
            Handle::new(index, self.generations[index as usize])
        } else {
            let index = self.generations.len() as u32;
            debug_assert!(index < u32::MAX, "handle allocator exhausted");
            self.generations.push(0);
            Handle::new(index, 0)
        }
    }

    /// Free a handle, making its index available for reuse
    pub fn free(&mut self, handle: Handle<T>) -> bool {
        if !self.is_valid(handle) {
            return false;
        }

        let gen = &mut self.generations[handle.index() as usize];
        *gen = gen.wrapping_add(1);
        self.free_list.push(handle.index());
        true
    }

    /// Check if a handle is still valid
    pub fn is_valid(&self, handle: Handle<T>) -> bool {
        if handle.is_null() {
            return false;
        }
        self.generations
            .get(handle.index() as usize)
            .map(|gen| *gen == handle.generation())
            .unwrap_or(false)
    }

    /// Get the number of allocated handles
    pub fn len(&self) -> usize {
        self.generations.len() - self.free_list.len()
    }

    /// Check if no handles are allocated
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current generation stored for a slot
    fn generation_of(&self, index: usize) -> u32 {
        self.generations[index]
    }
}

impl<T> Default for HandleAllocator<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Dense storage addressed by generational handles
///
/// Iteration always visits slots in index order, which keeps every pass over
/// the map deterministic.
pub struct HandleMap<T> {
    allocator: HandleAllocator<T>,
    values: Vec<Option<T>>,
}

impl<T> HandleMap<T> {
    /// Create a new handle map
    pub fn new() -> Self {
        Self {
            allocator: HandleAllocator::new(),
            values: Vec::new(),
        }
    }

    /// Insert a value and get a handle to it
    pub fn insert(&mut self, value: T) -> Handle<T> {
        let handle = self.allocator.allocate();
        let index = handle.index() as usize;

        if index >= self.values.len() {
            self.values.resize_with(index + 1, || None);
        }
        self.values[index] = Some(value);
        handle
    }

    /// Remove a value by its handle
    pub fn remove(&mut self, handle: Handle<T>) -> Option<T> {
        if !self.allocator.free(handle) {
            return None;
        }
        self.values[handle.index() as usize].take()
    }

    /// Get a reference to a value by its handle
    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        if !self.allocator.is_valid(handle) {
            return None;
        }
        self.values.get(handle.index() as usize)?.as_ref()
    }

    /// Get a mutable reference to a value by its handle
    pub fn get_mut(&mut self, handle: Handle<T>) -> Option<&mut T> {
        if !self.allocator.is_valid(handle) {
            return None;
        }
        self.values.get_mut(handle.index() as usize)?.as_mut()
    }

    /// Get mutable references to two distinct values at once
    pub fn get_pair_mut(&mut self, a: Handle<T>, b: Handle<T>) -> Option<(&mut T, &mut T)> {
        if a.index() == b.index() || !self.allocator.is_valid(a) || !self.allocator.is_valid(b) {
            return None;
        }

        let (ia, ib) = (a.index() as usize, b.index() as usize);
        let (low, high) = if ia < ib { (ia, ib) } else { (ib, ia) };
        let (head, tail) = self.values.split_at_mut(high);
        let low_ref = head[low].as_mut()?;
        let high_ref = tail[0].as_mut()?;

        if ia < ib {
            Some((low_ref, high_ref))
        } else {
            Some((high_ref, low_ref))
        }
    }

    /// Check if a handle is valid
    pub fn contains(&self, handle: Handle<T>) -> bool {
        self.allocator.is_valid(handle)
    }

    /// Get the number of values
    pub fn len(&self) -> usize {
        self.allocator.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.allocator.is_empty()
    }

    /// Handles of all live values, in slot order
    pub fn handles(&self) -> Vec<Handle<T>> {
        self.iter().map(|(handle, _)| handle).collect()
    }

    /// Iterate over all valid handles and values
    pub fn iter(&self) -> impl Iterator<Item = (Handle<T>, &T)> {
        let allocator = &self.allocator;
        self.values.iter().enumerate().filter_map(move |(i, opt)| {
            opt.as_ref()
                .map(|v| (Handle::new(i as u32, allocator.generation_of(i)), v))
        })
    }

    /// Iterate over all valid handles and mutable values
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Handle<T>, &mut T)> {
        let allocator = &self.allocator;
        self.values.iter_mut().enumerate().filter_map(move |(i, opt)| {
            opt.as_mut()
                .map(|v| (Handle::new(i as u32, allocator.generation_of(i)), v))
        })
    }

    /// Remove every value for which the predicate returns false
    ///
    /// Returns the handles that were removed.
    pub fn retain<F>(&mut self, mut keep: F) -> Vec<Handle<T>>
    where
        F: FnMut(&T) -> bool,
    {
        let doomed: Vec<Handle<T>> = self
            .iter()
            .filter(|(_, value)| !keep(value))
            .map(|(handle, _)| handle)
            .collect();

        for handle in &doomed {
            self.remove(*handle);
        }
        doomed
    }
}

impl<T> Default for HandleMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_allocation() {
        let mut alloc: HandleAllocator<i32> = HandleAllocator::new();
        let h1 = alloc.allocate();
        let h2 = alloc.allocate();

        assert!(alloc.is_valid(h1));
        assert!(alloc.is_valid(h2));
        assert_ne!(h1, h2);

        alloc.free(h1);
        assert!(!alloc.is_valid(h1));

        let h3 = alloc.allocate();
        assert_eq!(h3.index(), h1.index());
        assert_ne!(h3.generation(), h1.generation());
    }

    #[test]
    fn test_handle_map() {
        let mut map: HandleMap<String> = HandleMap::new();
        let h1 = map.insert("hello".to_string());
        let h2 = map.insert("world".to_string());

        assert_eq!(map.get(h1), Some(&"hello".to_string()));
        assert_eq!(map.get(h2), Some(&"world".to_string()));

        map.remove(h1);
        assert_eq!(map.get(h1), None);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_stale_handle_after_reuse() {
        let mut map: HandleMap<u32> = HandleMap::new();
        let old = map.insert(1);
        map.remove(old);
        let new = map.insert(2);

        assert_eq!(old.index(), new.index());
        assert_eq!(map.get(old), None);
        assert_eq!(map.get(new), Some(&2));
    }

    #[test]
    fn test_pair_mut() {
        let mut map: HandleMap<u32> = HandleMap::new();
        let a = map.insert(1);
        let b = map.insert(2);

        {
            let (va, vb) = map.get_pair_mut(b, a).unwrap();
            assert_eq!(*va, 2);
            assert_eq!(*vb, 1);
            *va += 10;
            *vb += 20;
        }

        assert_eq!(map.get(a), Some(&21));
        assert_eq!(map.get(b), Some(&12));
        assert!(map.get_pair_mut(a, a).is_none());
    }

    #[test]
    fn test_retain_keeps_slot_order() {
        let mut map: HandleMap<u32> = HandleMap::new();
        let handles: Vec<_> = (0..5).map(|i| map.insert(i)).collect();

        let removed = map.retain(|v| v % 2 == 0);

        assert_eq!(removed, vec![handles[1], handles[3]]);
        let remaining: Vec<u32> = map.iter().map(|(_, v)| *v).collect();
        assert_eq!(remaining, vec![0, 2, 4]);
    }

    #[test]
    fn test_bits_roundtrip() {
        let h: Handle<()> = Handle::new(7, 3);
        assert_eq!(Handle::<()>::from_bits(h.to_bits()), h);
        assert!(Handle::<()>::null().is_null());
    }
}
