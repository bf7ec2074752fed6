use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;

use crate::DefaultHashBuilder;
use crate::error::SuppressedError;
use crate::hash_table::DEFAULT_CAPACITY;
use crate::hash_table::DEFAULT_LOAD_FACTOR;
use crate::hash_table::Entry;
use crate::hash_table::HashTable;

/// A hash set implemented using the open-addressing [`HashTable`] as the
/// underlying storage.
///
/// `HashSet<T, S>` stores values of type `T` where `T` implements `Hash + Eq`
/// and uses a configurable hasher builder `S` to hash values.
///
/// The set deliberately has no `contains`: presence is observed through the
/// results of [`insert`](Self::insert) and [`remove`](Self::remove) and
/// through traversal. It is meant for bookkeeping of live handles that are
/// added, removed, and finally released in bulk with
/// [`clear_with`](Self::clear_with) or [`clear_suppress`](Self::clear_suppress).
///
/// # Performance Characteristics
///
/// - **Memory**: `size_of::<Option<T>>()` per slot, no per-entry metadata.
#[derive(Clone)]
pub struct HashSet<T, S = DefaultHashBuilder> {
    table: HashTable<T>,
    hash_builder: S,
}

impl<T, S> PartialEq for HashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.iter().all(|v| {
            other
                .table
                .find(other.hash_builder.hash_one(v), |o| o == v)
                .is_some()
        })
    }
}

impl<T, S> Eq for HashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
}

impl<T, S> Debug for HashSet<T, S>
where
    T: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.table.iter()).finish()
    }
}

impl<T, S> HashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    /// Creates a new hash set with 16 slots and the given hasher builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(feature = "std")]
    /// # {
    /// use std::hash::RandomState;
    ///
    /// use open_hash_set::HashSet;
    ///
    /// let set: HashSet<i32, _> = HashSet::with_hasher(RandomState::new());
    /// assert!(set.is_empty());
    /// assert_eq!(set.capacity(), 16);
    /// # }
    /// ```
    pub fn with_hasher(hash_builder: S) -> Self {
        Self::with_capacity_and_hasher(DEFAULT_CAPACITY, hash_builder)
    }

    /// Creates a new hash set with at least `capacity` slots and the given
    /// hasher builder.
    ///
    /// The slot count is rounded up to the next power of two.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(feature = "std")]
    /// # {
    /// use std::hash::RandomState;
    ///
    /// use open_hash_set::HashSet;
    ///
    /// let set: HashSet<i32, _> = HashSet::with_capacity_and_hasher(100, RandomState::new());
    /// assert_eq!(set.capacity(), 128);
    /// # }
    /// ```
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        Self::with_capacity_load_factor_and_hasher(capacity, DEFAULT_LOAD_FACTOR, hash_builder)
    }

    /// Creates a new hash set with at least `capacity` slots that doubles
    /// once `floor(load_factor * capacity)` values are stored.
    ///
    /// # Panics
    ///
    /// Panics if `load_factor` is not in `(0, 1]`.
    pub fn with_capacity_load_factor_and_hasher(
        capacity: usize,
        load_factor: f32,
        hash_builder: S,
    ) -> Self {
        Self {
            table: HashTable::with_capacity_and_load_factor(capacity, load_factor),
            hash_builder,
        }
    }

    /// Returns the number of elements in the set.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use open_hash_set::HashSet;
    ///
    /// let mut set: HashSet<i32> = HashSet::new();
    /// assert_eq!(set.len(), 0);
    /// set.insert(1);
    /// assert_eq!(set.len(), 1);
    /// # }
    /// ```
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the set contains no elements.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use open_hash_set::HashSet;
    ///
    /// let mut set: HashSet<i32> = HashSet::new();
    /// assert!(set.is_empty());
    /// set.insert(1);
    /// assert!(!set.is_empty());
    /// # }
    /// ```
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the number of slots backing the set. Always a power of two.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns the element count at which the next insert doubles the set.
    pub fn growth_threshold(&self) -> usize {
        self.table.growth_threshold()
    }

    /// Returns the load factor the set was constructed with.
    pub fn load_factor(&self) -> f32 {
        self.table.load_factor()
    }

    /// Returns a reference to the set's hasher builder.
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Adds a value to the set.
    ///
    /// Returns whether the value was newly inserted. That is:
    ///
    /// - If the set did not previously contain this value, `true` is returned.
    /// - If the set already contained this value, `false` is returned and
    ///   `value` is dropped.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use open_hash_set::HashSet;
    ///
    /// let mut set: HashSet<i32> = HashSet::new();
    /// assert_eq!(set.insert(37), true);
    /// assert_eq!(set.insert(37), false);
    /// assert_eq!(set.len(), 1);
    /// # }
    /// ```
    pub fn insert(&mut self, value: T) -> bool {
        let hash = self.hash_builder.hash_one(&value);
        match self
            .table
            .entry(hash, |v| v == &value, |v| self.hash_builder.hash_one(v))
        {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(value);
                true
            }
        }
    }

    /// Removes a value from the set. Returns whether the value was
    /// present in the set.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use open_hash_set::HashSet;
    ///
    /// let mut set: HashSet<i32> = HashSet::new();
    /// set.insert(1);
    /// assert_eq!(set.remove(&1), true);
    /// assert_eq!(set.remove(&1), false);
    /// # }
    /// ```
    pub fn remove(&mut self, value: &T) -> bool {
        self.take(value).is_some()
    }

    /// Removes and returns the value in the set, if any, that is equal to the
    /// given one.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use open_hash_set::HashSet;
    ///
    /// let mut set: HashSet<i32> = HashSet::new();
    /// set.insert(1);
    /// assert_eq!(set.take(&1), Some(1));
    /// assert_eq!(set.take(&1), None);
    /// # }
    /// ```
    pub fn take(&mut self, value: &T) -> Option<T> {
        let hash = self.hash_builder.hash_one(value);
        self.table
            .remove(hash, |v| v == value, |v| self.hash_builder.hash_one(v))
    }

    /// Returns an iterator over the values of the set, in no particular
    /// order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use open_hash_set::HashSet;
    ///
    /// let mut set: HashSet<i32> = HashSet::new();
    /// set.insert(1);
    /// set.insert(2);
    ///
    /// let mut values: Vec<i32> = set.iter().copied().collect();
    /// values.sort();
    /// assert_eq!(values, [1, 2]);
    /// # }
    /// ```
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Returns an iterator that removes and yields all values from the
    /// set.
    ///
    /// The set is empty once the iterator is dropped, even if it was not
    /// fully consumed.
    pub fn drain(&mut self) -> Drain<'_, T> {
        Drain {
            inner: self.table.drain(),
        }
    }

    /// Removes all elements from the set, dropping them.
    ///
    /// This operation preserves the set's allocated capacity.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Calls `visit` on every element, stopping at and returning the first
    /// error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use open_hash_set::HashSet;
    ///
    /// let set: HashSet<u32> = (1..=4).collect();
    /// let mut total = 0;
    /// let result: Result<(), &str> = set.try_for_each(|v| {
    ///     total += v;
    ///     Ok(())
    /// });
    /// assert!(result.is_ok());
    /// assert_eq!(total, 10);
    /// # }
    /// ```
    pub fn try_for_each<E>(&self, visit: impl FnMut(&T) -> Result<(), E>) -> Result<(), E> {
        self.table.try_for_each(visit)
    }

    /// Calls `visit` on every element even if some calls fail.
    ///
    /// Returns `Ok(())` when nothing failed, [`SuppressedError::Single`] with
    /// the error itself when exactly one call failed, and
    /// [`SuppressedError::Composite`] with every error in visitation order
    /// otherwise.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use open_hash_set::HashSet;
    /// use open_hash_set::SuppressedError;
    ///
    /// let set: HashSet<u32> = (1..=6).collect();
    /// let mut visited = 0;
    /// let result = set.for_each_suppress(|&v| {
    ///     visited += 1;
    ///     if v == 4 { Err(v) } else { Ok(()) }
    /// });
    /// assert_eq!(visited, 6);
    /// assert_eq!(result, Err(SuppressedError::Single(4)));
    /// # }
    /// ```
    pub fn for_each_suppress<E>(
        &self,
        visit: impl FnMut(&T) -> Result<(), E>,
    ) -> Result<(), SuppressedError<E>> {
        self.table.for_each_suppress(visit)
    }

    /// Empties the set, handing each element by value to `cleanup`.
    ///
    /// Does nothing on an empty set. The first error stops further cleanup
    /// calls and is returned; elements not yet handed out are dropped. The
    /// set is empty afterwards either way and can be reused as if newly
    /// constructed, keeping its capacity.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use open_hash_set::HashSet;
    ///
    /// let mut set: HashSet<u32> = (0..3).collect();
    /// let mut released = Vec::new();
    /// let result: Result<(), &str> = set.clear_with(|handle| {
    ///     released.push(handle);
    ///     Ok(())
    /// });
    /// assert!(result.is_ok());
    /// assert_eq!(released.len(), 3);
    /// assert!(set.is_empty());
    /// # }
    /// ```
    pub fn clear_with<E>(&mut self, cleanup: impl FnMut(T) -> Result<(), E>) -> Result<(), E> {
        self.table.clear_with(cleanup)
    }

    /// Empties the set, handing every element by value to `cleanup` even if
    /// some calls fail. Errors are reported as in
    /// [`for_each_suppress`](Self::for_each_suppress).
    pub fn clear_suppress<E>(
        &mut self,
        cleanup: impl FnMut(T) -> Result<(), E>,
    ) -> Result<(), SuppressedError<E>> {
        self.table.clear_suppress(cleanup)
    }

    /// Computes a histogram of element displacements from their home slots.
    #[cfg(any(test, feature = "stats"))]
    pub fn probe_histogram(&self) -> crate::hash_table::ProbeHistogram {
        self.table
            .probe_histogram(|v| self.hash_builder.hash_one(v))
    }

    /// Returns detailed utilization statistics for debugging.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> crate::hash_table::DebugStats {
        self.table.debug_stats(|v| self.hash_builder.hash_one(v))
    }
}

impl<T, S> HashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
{
    /// Creates a new hash set with 16 slots using the default hasher
    /// builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use open_hash_set::HashSet;
    ///
    /// let set: HashSet<i32> = HashSet::new();
    /// assert!(set.is_empty());
    /// assert_eq!(set.capacity(), 16);
    /// assert_eq!(set.growth_threshold(), 12);
    /// # }
    /// ```
    pub fn new() -> Self {
        Self::with_hasher(S::default())
    }

    /// Creates a new hash set with at least `capacity` slots using the
    /// default hasher builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use open_hash_set::HashSet;
    ///
    /// let set: HashSet<i32> = HashSet::with_capacity(100);
    /// assert_eq!(set.capacity(), 128);
    /// # }
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, S::default())
    }

    /// Creates a new hash set with at least `capacity` slots and a custom
    /// load factor, using the default hasher builder.
    ///
    /// # Panics
    ///
    /// Panics if `load_factor` is not in `(0, 1]`.
    pub fn with_capacity_and_load_factor(capacity: usize, load_factor: f32) -> Self {
        Self::with_capacity_load_factor_and_hasher(capacity, load_factor, S::default())
    }
}

impl<T, S> Default for HashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

/// An iterator over the values of a `HashSet`.
pub struct Iter<'a, T> {
    inner: crate::hash_table::Iter<'a, T>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

/// A draining iterator over the values of a `HashSet`.
pub struct Drain<'a, T> {
    inner: crate::hash_table::Drain<'a, T>,
}

impl<T> Iterator for Drain<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for Drain<'_, T> {}

/// A consuming iterator over the values of a `HashSet`.
pub struct IntoIter<T> {
    inner: crate::hash_table::IntoIter<T>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T, S> IntoIterator for HashSet<T, S> {
    type IntoIter = IntoIter<T>;
    type Item = T;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.table.into_iter(),
        }
    }
}

impl<'a, T, S> IntoIterator for &'a HashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    type IntoIter = Iter<'a, T>;
    type Item = &'a T;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T, S> FromIterator<T> for HashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = HashSet::new();
        set.extend(iter);
        set
    }
}

impl<T, S> Extend<T> for HashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<'a, T, S> Extend<&'a T> for HashSet<T, S>
where
    T: Hash + Eq + Copy + 'a,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

#[cfg(test)]
mod tests {
    use alloc::collections::BTreeSet;
    use alloc::string::String;
    use alloc::string::ToString;
    use alloc::vec;
    use alloc::vec::Vec;
    use core::cell::Cell;
    use core::fmt::Display;
    use core::hash::BuildHasher;
    use core::hash::Hasher;

    use rand::TryRngCore;
    use rand::rngs::OsRng;
    use siphasher::sip::SipHasher;

    use super::*;

    #[derive(Clone)]
    struct SipHashBuilder {
        k1: u64,
        k2: u64,
    }

    impl BuildHasher for SipHashBuilder {
        type Hasher = SipHasher;

        fn build_hasher(&self) -> Self::Hasher {
            SipHasher::new_with_keys(self.k1, self.k2)
        }
    }

    impl Default for SipHashBuilder {
        fn default() -> Self {
            Self {
                k1: OsRng.try_next_u64().unwrap_or(0),
                k2: OsRng.try_next_u64().unwrap_or(0),
            }
        }
    }

    /// Passes a written `u64` through unchanged, so tests can pick home
    /// slots.
    #[derive(Default)]
    struct PassThroughHasher(u64);

    impl Hasher for PassThroughHasher {
        fn finish(&self) -> u64 {
            self.0
        }

        fn write(&mut self, bytes: &[u8]) {
            for byte in bytes {
                self.0 = self.0.rotate_left(8) ^ u64::from(*byte);
            }
        }

        fn write_u64(&mut self, i: u64) {
            self.0 = i;
        }
    }

    #[derive(Clone, Default)]
    struct PassThroughBuilder;

    impl BuildHasher for PassThroughBuilder {
        type Hasher = PassThroughHasher;

        fn build_hasher(&self) -> Self::Hasher {
            PassThroughHasher::default()
        }
    }

    /// A resource handle whose hash is only its `bucket`, so distinct
    /// handles can be forced onto the same home slot.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    struct Handle {
        id: u32,
        bucket: u64,
    }

    impl Hash for Handle {
        fn hash<H: Hasher>(&self, state: &mut H) {
            state.write_u64(self.bucket);
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct ReleaseError {
        id: u32,
    }

    impl Display for ReleaseError {
        fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
            write!(f, "could not release handle {}", self.id)
        }
    }

    impl core::error::Error for ReleaseError {}

    fn assert_set_invariants<T, S>(set: &HashSet<T, S>)
    where
        T: Hash + Eq + Debug,
        S: BuildHasher,
    {
        set.table
            .assert_invariants(|v| set.hash_builder.hash_one(v));
    }

    #[test]
    fn test_new_and_with_hasher() {
        let set: HashSet<i32, SipHashBuilder> = HashSet::new();
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
        assert_eq!(set.capacity(), 16);
        assert_eq!(set.growth_threshold(), 12);
        assert_eq!(set.load_factor(), 0.75);

        let set2 = HashSet::<i32, _>::with_hasher(SipHashBuilder::default());
        assert!(set2.is_empty());
        assert_eq!(set2.len(), 0);
    }

    #[test]
    fn test_with_capacity() {
        let set: HashSet<i32, SipHashBuilder> = HashSet::with_capacity(100);
        assert_eq!(set.capacity(), 128);
        assert!(set.is_empty());

        let set2 = HashSet::<i32, _>::with_capacity_and_hasher(0, SipHashBuilder::default());
        assert_eq!(set2.capacity(), 1);

        let set3: HashSet<i32, SipHashBuilder> = HashSet::with_capacity_and_load_factor(64, 0.5);
        assert_eq!(set3.capacity(), 64);
        assert_eq!(set3.growth_threshold(), 32);
    }

    #[test]
    fn test_insert_uniqueness() {
        let mut set = HashSet::with_hasher(SipHashBuilder::default());

        assert!(set.insert(1));
        assert_eq!(set.len(), 1);
        assert!(!set.is_empty());

        assert!(!set.insert(1));
        assert_eq!(set.len(), 1);

        assert!(set.insert(2));
        assert_eq!(set.len(), 2);
        assert!(!set.insert(2));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_remove() {
        let mut set = HashSet::with_hasher(SipHashBuilder::default());
        set.insert(1);
        set.insert(2);
        set.insert(3);

        assert!(set.remove(&2));
        assert_eq!(set.len(), 2);
        assert!(!set.remove(&2));
        assert!(!set.remove(&4));
        assert_eq!(set.len(), 2);

        let remaining: BTreeSet<i32> = set.iter().copied().collect();
        assert_eq!(remaining, BTreeSet::from([1, 3]));
        assert!(!set.insert(1));
        assert!(!set.insert(3));
    }

    #[test]
    fn test_take() {
        let mut set = HashSet::with_hasher(SipHashBuilder::default());
        set.insert(1);
        set.insert(2);

        assert_eq!(set.take(&1), Some(1));
        assert_eq!(set.len(), 1);
        assert_eq!(set.take(&1), None);
        assert_eq!(set.take(&3), None);
    }

    #[test]
    fn test_insert_after_remove() {
        let mut set = HashSet::with_hasher(SipHashBuilder::default());
        assert!(set.insert("handle"));
        assert!(set.remove(&"handle"));
        assert!(set.insert("handle"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_growth_scenario() {
        let mut set = HashSet::with_capacity_load_factor_and_hasher(
            16,
            0.75,
            SipHashBuilder::default(),
        );
        for i in 0..11 {
            assert!(set.insert(i));
        }
        assert_eq!(set.capacity(), 16);

        assert!(set.insert(11));
        assert_eq!(set.capacity(), 32);
        assert_eq!(set.growth_threshold(), 24);
        assert_set_invariants(&set);

        for i in 0..12 {
            assert!(set.remove(&i), "{i} lost after growth: {set:?}");
        }
        assert!(set.is_empty());
    }

    #[test]
    fn test_capacity_invariant() {
        let mut set = HashSet::with_hasher(SipHashBuilder::default());
        for i in 0..5000u32 {
            set.insert(i);
            assert!(set.capacity().is_power_of_two());
            assert!(set.len() <= set.growth_threshold());
        }
        assert_set_invariants(&set);
    }

    #[test]
    fn test_collision_scenario() {
        let a = Handle { id: 1, bucket: 42 };
        let b = Handle { id: 2, bucket: 42 };
        let c = Handle { id: 3, bucket: 42 };

        let mut set = HashSet::with_hasher(PassThroughBuilder);
        assert!(set.insert(a));
        assert!(set.insert(b));
        assert!(set.insert(c));
        assert_eq!(set.probe_histogram().counts(), &[1, 1, 1]);

        assert!(set.remove(&a));
        assert_set_invariants(&set);
        assert_eq!(set.probe_histogram().counts(), &[1, 1]);

        assert!(!set.insert(b));
        assert!(!set.insert(c));
        assert!(set.remove(&c));
        assert!(set.remove(&b));
        assert!(set.is_empty());
    }

    #[test]
    fn test_collisions_on_two_homes() {
        let mut set = HashSet::with_capacity_and_hasher(8, PassThroughBuilder);
        let handles: Vec<Handle> = (0..5)
            .map(|id| Handle {
                id,
                bucket: u64::from(id % 2),
            })
            .collect();
        for handle in &handles {
            assert!(set.insert(*handle));
        }
        assert_set_invariants(&set);

        for (removed, handle) in handles.iter().enumerate() {
            assert!(set.remove(handle));
            assert_set_invariants(&set);
            for other in &handles[removed + 1..] {
                assert!(!set.insert(*other), "{other:?} unreachable: {set:?}");
            }
        }
        assert!(set.is_empty());
    }

    #[test]
    fn test_removals_keep_others_reachable() {
        let mut set = HashSet::with_hasher(SipHashBuilder::default());
        for i in 0..200u32 {
            set.insert(i);
        }
        for i in (0..200u32).step_by(3) {
            assert!(set.remove(&i));
        }
        assert_set_invariants(&set);

        let expected: BTreeSet<u32> = (0..200).filter(|i| i % 3 != 0).collect();
        let seen: BTreeSet<u32> = set.iter().copied().collect();
        assert_eq!(seen, expected);
        for i in &expected {
            assert!(!set.insert(*i));
        }
    }

    #[test]
    fn test_clear_with_scenario() {
        let mut set = HashSet::with_hasher(SipHashBuilder::default());
        for id in 0..3 {
            set.insert(Handle { id, bucket: u64::from(id) * 7 });
        }

        let mut released = Vec::new();
        let result: Result<(), ReleaseError> = set.clear_with(|handle| {
            released.push(handle);
            Ok(())
        });
        assert!(result.is_ok());
        released.sort();
        assert_eq!(
            released.iter().map(|h| h.id).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        assert!(set.is_empty());

        assert!(set.insert(Handle { id: 0, bucket: 0 }));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_clear_with_failure_still_empties() {
        let mut set: HashSet<u32, SipHashBuilder> = (0..8).collect();
        let calls = Cell::new(0);
        let result = set.clear_with(|id| {
            calls.set(calls.get() + 1);
            if calls.get() == 2 {
                Err(ReleaseError { id })
            } else {
                Ok(())
            }
        });
        assert!(result.is_err());
        assert_eq!(calls.get(), 2);
        assert!(set.is_empty());
        assert!(set.insert(3));
    }

    #[test]
    fn test_clear_with_empty_set_is_noop() {
        let mut set: HashSet<u32, SipHashBuilder> = HashSet::new();
        let result: Result<(), ReleaseError> = set.clear_with(|_| panic!("nothing to release"));
        assert!(result.is_ok());
    }

    #[test]
    fn test_try_for_each_fails_fast() {
        let set: HashSet<u32, SipHashBuilder> = (0..10).collect();
        let mut visited = 0;
        let result = set.try_for_each(|&id| {
            visited += 1;
            Err(ReleaseError { id })
        });
        assert!(result.is_err());
        assert_eq!(visited, 1);
        assert_eq!(set.len(), 10);
    }

    #[test]
    fn test_for_each_suppress_no_failures() {
        let set: HashSet<u32, SipHashBuilder> = (0..10).collect();
        let mut visited = 0;
        let result = set.for_each_suppress(|_| {
            visited += 1;
            Ok::<(), ReleaseError>(())
        });
        assert_eq!(result, Ok(()));
        assert_eq!(visited, 10);
    }

    #[test]
    fn test_for_each_suppress_single_failure_is_unwrapped() {
        let set: HashSet<u32, SipHashBuilder> = (0..10).collect();
        let mut visited = 0;
        let result = set.for_each_suppress(|&id| {
            visited += 1;
            if id == 7 { Err(ReleaseError { id }) } else { Ok(()) }
        });
        assert_eq!(visited, 10);
        match result {
            Err(SuppressedError::Single(error)) => assert_eq!(error, ReleaseError { id: 7 }),
            other => panic!("expected a single failure, got {other:?}"),
        }
    }

    #[test]
    fn test_for_each_suppress_aggregates_in_visit_order() {
        let set: HashSet<u32, SipHashBuilder> = (0..10).collect();
        let mut order = Vec::new();
        let result = set.for_each_suppress(|&id| {
            order.push(id);
            if id % 3 == 0 { Err(ReleaseError { id }) } else { Ok(()) }
        });
        assert_eq!(order.len(), 10);

        let expected: Vec<ReleaseError> = order
            .iter()
            .filter(|id| *id % 3 == 0)
            .map(|&id| ReleaseError { id })
            .collect();
        match result {
            Err(SuppressedError::Composite(composite)) => {
                assert_eq!(composite.len(), 4);
                assert_eq!(composite.errors(), expected.as_slice());
            }
            other => panic!("expected a composite failure, got {other:?}"),
        }
    }

    #[test]
    fn test_clear_suppress_releases_everything() {
        let mut set: HashSet<u32, SipHashBuilder> = (0..10).collect();
        let mut released = BTreeSet::new();
        let result = set.clear_suppress(|id| {
            released.insert(id);
            if id < 2 { Err(ReleaseError { id }) } else { Ok(()) }
        });
        assert_eq!(released, (0..10).collect());
        assert!(set.is_empty());

        let error = result.unwrap_err();
        assert_eq!(error.len(), 2);
        let mut ids: Vec<u32> = error.into_errors().into_iter().map(|e| e.id).collect();
        ids.sort();
        assert_eq!(ids, vec![0, 1]);
    }

    #[test]
    fn test_clear() {
        let mut set = HashSet::with_hasher(SipHashBuilder::default());
        set.insert(1);
        set.insert(2);
        set.insert(3);

        assert_eq!(set.len(), 3);
        set.clear();
        assert_eq!(set.len(), 0);
        assert!(set.is_empty());
        assert!(set.insert(1));
    }

    #[test]
    fn test_iter() {
        let mut set = HashSet::with_hasher(SipHashBuilder::default());
        set.insert(1);
        set.insert(2);
        set.insert(3);

        let iter = set.iter();
        assert_eq!(iter.len(), 3);
        let values: BTreeSet<i32> = iter.copied().collect();
        assert_eq!(values, BTreeSet::from([1, 2, 3]));
    }

    #[test]
    fn test_into_iterator() {
        let mut set = HashSet::with_hasher(SipHashBuilder::default());
        set.insert(1);
        set.insert(2);
        set.insert(3);

        let borrowed: BTreeSet<i32> = (&set).into_iter().copied().collect();
        assert_eq!(borrowed, BTreeSet::from([1, 2, 3]));

        let owned: BTreeSet<i32> = set.into_iter().collect();
        assert_eq!(owned, BTreeSet::from([1, 2, 3]));
    }

    #[test]
    fn test_drain() {
        let mut set = HashSet::with_hasher(SipHashBuilder::default());
        set.insert(1);
        set.insert(2);
        set.insert(3);

        let drained: BTreeSet<i32> = set.drain().collect();
        assert_eq!(drained, BTreeSet::from([1, 2, 3]));
        assert!(set.is_empty());
    }

    #[test]
    fn test_string_values() {
        let mut set = HashSet::with_hasher(SipHashBuilder::default());
        assert!(set.insert("hello".to_string()));
        assert!(set.insert("world".to_string()));
        assert!(!set.insert(String::from("hello")));
        assert!(set.remove(&"hello".to_string()));
        assert!(!set.remove(&"hello".to_string()));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_equality() {
        let a: HashSet<u32, SipHashBuilder> = (0..50).collect();
        let mut b: HashSet<u32, SipHashBuilder> = (0..50).rev().collect();
        assert_eq!(a, b);

        b.remove(&10);
        assert_ne!(a, b);
        b.insert(99);
        assert_ne!(a, b);
    }

    #[test]
    fn test_extend_and_clone() {
        let mut set: HashSet<u32, SipHashBuilder> = HashSet::new();
        set.extend([1, 2, 3]);
        set.extend(&[3, 4]);
        assert_eq!(set.len(), 4);

        let mut cloned = set.clone();
        assert!(cloned.remove(&1));
        assert_eq!(set.len(), 4);
        assert_eq!(cloned.len(), 3);
    }

    #[test]
    fn test_debug_output() {
        let mut set = HashSet::with_hasher(SipHashBuilder::default());
        set.insert(5);
        assert_eq!(alloc::format!("{set:?}"), "{5}");
    }

    #[test]
    fn test_insert_remove_cycle() {
        let mut set = HashSet::with_capacity_and_hasher(4, SipHashBuilder::default());
        for round in 0..20u32 {
            for i in 0..64 {
                assert!(set.insert(round * 1000 + i));
            }
            for i in 0..64 {
                assert!(set.remove(&(round * 1000 + i)));
            }
            assert!(set.is_empty());
        }
        assert_set_invariants(&set);
    }

    #[test]
    fn test_debug_stats() {
        let set: HashSet<u64, SipHashBuilder> = (0..100).collect();
        let stats = set.debug_stats();
        assert_eq!(stats.populated, 100);
        assert_eq!(stats.capacity, set.capacity());
        assert!(stats.occupancy < 0.75);
        assert_eq!(
            set.probe_histogram().counts().iter().sum::<usize>(),
            100
        );
    }
}
