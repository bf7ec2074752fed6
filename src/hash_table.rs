//! The raw open-addressing table backing [`HashSet`](crate::HashSet).
//!
//! Elements live directly in one flat array of `Option<V>` slots whose length
//! is always a power of two. Collisions are resolved by linear probing and
//! removals are repaired with backward-shift deletion, so the table never
//! carries tombstones.
//!
//! The table does not know how to hash its values. Every operation takes a
//! precomputed `u64` hash and an equality predicate, and the operations that
//! move *other* elements around (growth on insert, backward shift on remove)
//! take a `hasher` closure as well.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt::Debug;

use crate::error::SuppressedError;

/// Slot count used by the default constructors.
pub const DEFAULT_CAPACITY: usize = 16;

/// Fraction of slots that may be occupied before the table doubles.
pub const DEFAULT_LOAD_FACTOR: f32 = 0.75;

/// 2^64 divided by the golden ratio, forced odd.
const GOLDEN_RATIO_64: u64 = 0x9E37_79B9_7F4A_7C15;

/// Spreads the raw hash so that hashers with poor low-order bits do not
/// cluster under a plain mask.
#[inline(always)]
fn mix(hash: u64) -> u64 {
    let h = hash.wrapping_mul(GOLDEN_RATIO_64);
    h ^ (h >> 32)
}

#[inline(always)]
fn home_slot(hash: u64, mask: usize) -> usize {
    mix(hash) as usize & mask
}

/// Returns `true` if `index` lies in the cyclic half-open range
/// `(start, end]` of slot indices.
///
/// During backward shift, an element at `end` whose home slot is in
/// `(gap, end]` must stay put: moving it to `gap` would place it before its
/// home.
#[inline(always)]
fn in_cyclic_range(start: usize, index: usize, end: usize) -> bool {
    if start <= end {
        start < index && index <= end
    } else {
        start < index || index <= end
    }
}

#[inline(always)]
fn max_populated(capacity: usize, load_factor: f32) -> usize {
    (capacity as f64 * load_factor as f64) as usize
}

fn empty_slots<V>(capacity: usize) -> Box<[Option<V>]> {
    core::iter::repeat_with(|| None).take(capacity).collect()
}

enum Probe {
    Occupied(usize),
    Vacant(usize),
}

/// Probe-length statistics for hash table analysis.
///
/// `counts()[d]` is the number of elements stored `d` slots past their home
/// slot.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeHistogram {
    counts: Vec<usize>,
}

#[cfg(any(test, feature = "stats"))]
impl ProbeHistogram {
    /// Element counts indexed by displacement from the home slot.
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// Largest displacement of any element, or `0` for an empty table.
    pub fn max_displacement(&self) -> usize {
        self.counts.len().saturating_sub(1)
    }

    /// Mean displacement over all elements.
    pub fn mean_displacement(&self) -> f64 {
        let total: usize = self.counts.iter().sum();
        if total == 0 {
            return 0.0;
        }
        let weighted: usize = self
            .counts
            .iter()
            .enumerate()
            .map(|(distance, count)| distance * count)
            .sum();
        weighted as f64 / total as f64
    }

    /// Pretty-prints the histogram as a horizontal bar chart.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        let max = self.counts.iter().copied().max().unwrap_or(0);
        if max == 0 {
            println!("probe histogram: empty");
            return;
        }

        let max_bar = 60usize;
        println!(
            "probe histogram ({} entries):",
            self.counts.iter().sum::<usize>()
        );
        for (distance, count) in self.counts.iter().enumerate() {
            let width = (*count * max_bar).div_ceil(max);
            println!("{distance:>4} | {:<max_bar$} {count}", "█".repeat(width));
        }
    }
}

/// Debug statistics for hash table analysis.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone)]
pub struct DebugStats {
    /// Number of elements currently in the table
    pub populated: usize,
    /// Total number of slots allocated
    pub capacity: usize,
    /// Element count at which the next insert grows the table
    pub growth_threshold: usize,
    /// Configured load factor
    pub load_factor: f32,
    /// Slot utilization (populated / capacity)
    pub occupancy: f64,
    /// Largest distance of any element from its home slot
    pub max_displacement: usize,
    /// Mean distance of elements from their home slot
    pub mean_displacement: f64,
    /// Total memory in bytes used by the slot array
    pub total_bytes: usize,
    /// Bytes held by empty slots
    pub wasted_bytes: usize,
}

#[cfg(any(test, feature = "stats"))]
impl DebugStats {
    /// Pretty-print the debug statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Hash Table Debug Statistics ===");
        println!(
            "Population: {}/{} slots ({:.2}% occupancy, load factor {:.2}, grows at {})",
            self.populated,
            self.capacity,
            self.occupancy * 100.0,
            self.load_factor,
            self.growth_threshold
        );
        println!(
            "Displacement: max {}, mean {:.3}",
            self.max_displacement, self.mean_displacement
        );
        println!("Total Allocated: {} bytes", self.total_bytes);
        println!(
            "Memory: {} bytes wasted ({:.02}%)",
            self.wasted_bytes,
            if self.total_bytes == 0 {
                0.0
            } else {
                (self.wasted_bytes as f64 / self.total_bytes as f64) * 100.0
            }
        );
    }
}

/// An open-addressing hash table using linear probing and backward-shift
/// deletion.
///
/// `HashTable<V>` stores values of type `V`. Like hashbrown's raw table, it
/// requires you to provide the hash value and an equality predicate for each
/// operation.
///
/// ## Performance Characteristics
///
/// - **Memory**: `size_of::<Option<V>>()` per slot, no per-entry metadata.
/// - **Removal**: amortized O(1) under a well-spread hash; worst case O(n)
///   when the whole table is one probe run.
///
/// ## Example
///
/// ```rust
/// # use core::hash::Hash;
/// # use core::hash::Hasher;
/// #
/// # use open_hash_set::hash_table::Entry;
/// # use open_hash_set::hash_table::HashTable;
/// # use siphasher::sip::SipHasher;
/// #
/// # fn hash_u64(n: u64) -> u64 {
/// #     let mut hasher = SipHasher::new();
/// #     n.hash(&mut hasher);
/// #     hasher.finish()
/// # }
/// #
/// let mut table: HashTable<u64> = HashTable::with_capacity(16);
///
/// match table.entry(hash_u64(7), |&v| v == 7, |&v| hash_u64(v)) {
///     Entry::Vacant(entry) => {
///         entry.insert(7);
///     }
///     Entry::Occupied(_) => unreachable!(),
/// }
///
/// assert_eq!(table.len(), 1);
/// assert_eq!(table.remove(hash_u64(7), |&v| v == 7, |&v| hash_u64(v)), Some(7));
/// assert!(table.is_empty());
/// ```
#[derive(Clone)]
pub struct HashTable<V> {
    slots: Box<[Option<V>]>,

    populated: usize,
    max_pop: usize,
    mask: usize,

    load_factor: f32,
}

impl<V> Debug for HashTable<V>
where
    V: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        struct Slots<'a, V>(&'a [Option<V>]);

        impl<V: Debug> Debug for Slots<'_, V> {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.debug_map()
                    .entries(
                        self.0
                            .iter()
                            .enumerate()
                            .filter_map(|(index, slot)| slot.as_ref().map(|v| (index, v))),
                    )
                    .finish()
            }
        }

        f.debug_struct("HashTable")
            .field("slots", &Slots(&self.slots))
            .field("populated", &self.populated)
            .field("capacity", &self.slots.len())
            .field("growth_threshold", &self.max_pop)
            .finish()
    }
}

impl<V> Default for HashTable<V> {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl<V> HashTable<V> {
    /// Creates a new hash table with at least `capacity` slots and the
    /// default load factor of 0.75.
    ///
    /// The slot count is rounded up to the next power of two, and `0` is
    /// treated as `1`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use open_hash_set::hash_table::HashTable;
    /// #
    /// let table: HashTable<String> = HashTable::with_capacity(100);
    /// assert_eq!(table.capacity(), 128);
    /// assert_eq!(table.growth_threshold(), 96);
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_load_factor(capacity, DEFAULT_LOAD_FACTOR)
    }

    /// Creates a new hash table with at least `capacity` slots that doubles
    /// once `floor(load_factor * capacity)` elements are stored.
    ///
    /// # Panics
    ///
    /// Panics if `load_factor` is not in `(0, 1]`, if it is so small that
    /// even the largest table would grow before holding one element, or if
    /// the rounded capacity overflows `usize`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use open_hash_set::hash_table::HashTable;
    /// #
    /// let table: HashTable<u32> = HashTable::with_capacity_and_load_factor(10, 0.5);
    /// assert_eq!(table.capacity(), 16);
    /// assert_eq!(table.growth_threshold(), 8);
    /// ```
    pub fn with_capacity_and_load_factor(capacity: usize, load_factor: f32) -> Self {
        assert!(
            load_factor > 0.0 && load_factor <= 1.0,
            "load factor must be in (0, 1], got {load_factor}"
        );
        assert!(
            max_populated(1 << (usize::BITS - 1), load_factor) > 1,
            "load factor {load_factor} is too small to hold any element"
        );
        let capacity = capacity
            .max(1)
            .checked_next_power_of_two()
            .expect("capacity overflow");

        Self {
            slots: empty_slots(capacity),
            populated: 0,
            max_pop: max_populated(capacity, load_factor),
            mask: capacity - 1,
            load_factor,
        }
    }

    /// Returns the number of elements in the table.
    pub fn len(&self) -> usize {
        self.populated
    }

    /// Returns `true` if the table contains no elements.
    pub fn is_empty(&self) -> bool {
        self.populated == 0
    }

    /// Returns the number of slots in the table. Always a power of two.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the element count at which the next insert doubles the table,
    /// `floor(load_factor * capacity)`.
    pub fn growth_threshold(&self) -> usize {
        self.max_pop
    }

    /// Returns the load factor the table was constructed with.
    pub fn load_factor(&self) -> f32 {
        self.load_factor
    }

    /// Gets the entry for the value matching `eq` under `hash`.
    ///
    /// `hasher` must agree with the hashes previously used for the stored
    /// values; it is called to re-home elements when inserting through the
    /// returned entry grows the table, or when removing through it shifts
    /// later elements back.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use open_hash_set::hash_table::Entry;
    /// # use open_hash_set::hash_table::HashTable;
    /// #
    /// let hasher = |v: &u64| v.wrapping_mul(31);
    /// let mut table: HashTable<u64> = HashTable::with_capacity(4);
    ///
    /// if let Entry::Vacant(entry) = table.entry(hasher(&3), |&v| v == 3, hasher) {
    ///     entry.insert(3);
    /// }
    /// assert!(matches!(
    ///     table.entry(hasher(&3), |&v| v == 3, hasher),
    ///     Entry::Occupied(_)
    /// ));
    /// ```
    pub fn entry<H>(&mut self, hash: u64, eq: impl Fn(&V) -> bool, hasher: H) -> Entry<'_, V, H>
    where
        H: Fn(&V) -> u64,
    {
        match self.probe(hash, eq) {
            Probe::Occupied(index) => Entry::Occupied(OccupiedEntry {
                table: self,
                index,
                hasher,
            }),
            Probe::Vacant(index) => Entry::Vacant(VacantEntry {
                table: self,
                index,
                hasher,
            }),
        }
    }

    /// Removes and returns the value matching `eq` under `hash`, if any.
    ///
    /// Elements further along the probe run are shifted back to close the
    /// gap; `hasher` computes their home slots.
    ///
    /// # Panics
    ///
    /// If `hasher` panics while the run is being shifted, the value is still
    /// removed and `len` stays accurate, but later elements of the run may
    /// no longer be found by lookups. They are still visited by iteration
    /// and released by the clearing methods.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use open_hash_set::hash_table::Entry;
    /// # use open_hash_set::hash_table::HashTable;
    /// #
    /// let hasher = |v: &u64| *v;
    /// let mut table: HashTable<u64> = HashTable::with_capacity(8);
    /// for v in [1u64, 2, 3] {
    ///     if let Entry::Vacant(entry) = table.entry(v, |&x| x == v, hasher) {
    ///         entry.insert(v);
    ///     }
    /// }
    ///
    /// assert_eq!(table.remove(2, |&x| x == 2, hasher), Some(2));
    /// assert_eq!(table.remove(2, |&x| x == 2, hasher), None);
    /// assert_eq!(table.len(), 2);
    /// ```
    pub fn remove(
        &mut self,
        hash: u64,
        eq: impl Fn(&V) -> bool,
        hasher: impl Fn(&V) -> u64,
    ) -> Option<V> {
        match self.probe(hash, eq) {
            Probe::Occupied(index) => Some(self.remove_at(index, hasher)),
            Probe::Vacant(_) => None,
        }
    }

    /// Lookup used by set comparisons. Not part of the public surface: the
    /// container reports presence only through insert/remove results and
    /// traversal.
    pub(crate) fn find(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&V> {
        match self.probe(hash, eq) {
            Probe::Occupied(index) => self.slots[index].as_ref(),
            Probe::Vacant(_) => None,
        }
    }

    /// Returns an iterator over the values in raw slot order.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            inner: self.slots.iter(),
            remaining: self.populated,
        }
    }

    /// Returns an iterator that removes and yields every value. Values not
    /// consumed before the iterator is dropped are dropped with it; the table
    /// is empty afterwards either way.
    pub fn drain(&mut self) -> Drain<'_, V> {
        Drain {
            table: self,
            index: 0,
        }
    }

    /// Removes all values, keeping the allocated slots.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use open_hash_set::hash_table::Entry;
    /// # use open_hash_set::hash_table::HashTable;
    /// #
    /// let hasher = |v: &u64| *v;
    /// let mut table: HashTable<u64> = HashTable::with_capacity(8);
    /// if let Entry::Vacant(entry) = table.entry(1, |&x| x == 1, hasher) {
    ///     entry.insert(1);
    /// }
    ///
    /// table.clear();
    /// assert!(table.is_empty());
    /// assert_eq!(table.capacity(), 8);
    /// ```
    pub fn clear(&mut self) {
        if self.populated == 0 {
            return;
        }
        self.slots.fill_with(|| None);
        self.populated = 0;
    }

    /// Calls `visit` on every value in raw slot order, stopping at the first
    /// error and returning it.
    pub fn try_for_each<E>(&self, mut visit: impl FnMut(&V) -> Result<(), E>) -> Result<(), E> {
        for value in self.iter() {
            visit(value)?;
        }
        Ok(())
    }

    /// Calls `visit` on every value in raw slot order, even after failures.
    ///
    /// Returns `Ok(())` if every call succeeded, the lone error if exactly
    /// one call failed, or a [`CompositeError`](crate::CompositeError) of all
    /// errors in visitation order otherwise.
    pub fn for_each_suppress<E>(
        &self,
        mut visit: impl FnMut(&V) -> Result<(), E>,
    ) -> Result<(), SuppressedError<E>> {
        let mut errors = Vec::new();
        for value in self.iter() {
            if let Err(error) = visit(value) {
                errors.push(error);
            }
        }

        if !errors.is_empty() {
            log::debug!(
                "suppressed {} failures while visiting {} elements",
                errors.len(),
                self.populated
            );
        }
        SuppressedError::collapse(errors)
    }

    /// Empties the table, handing each value to `cleanup` in raw slot order.
    ///
    /// Does nothing on an empty table. The first error stops the cleanup
    /// calls and is returned; the values not yet visited are dropped. Every
    /// slot is empty afterwards regardless of the outcome.
    pub fn clear_with<E>(&mut self, cleanup: impl FnMut(V) -> Result<(), E>) -> Result<(), E> {
        if self.populated == 0 {
            return Ok(());
        }
        self.drain().try_for_each(cleanup)
    }

    /// Empties the table, handing every value to `cleanup` even after
    /// failures. Errors are collapsed as in
    /// [`for_each_suppress`](Self::for_each_suppress).
    pub fn clear_suppress<E>(
        &mut self,
        mut cleanup: impl FnMut(V) -> Result<(), E>,
    ) -> Result<(), SuppressedError<E>> {
        let visited = self.populated;
        let mut errors = Vec::new();
        for value in self.drain() {
            if let Err(error) = cleanup(value) {
                errors.push(error);
            }
        }

        if !errors.is_empty() {
            log::debug!(
                "suppressed {} failures while cleaning up {} elements",
                errors.len(),
                visited
            );
        }
        SuppressedError::collapse(errors)
    }

    /// Computes a histogram of element displacements from their home slots.
    ///
    /// Available under `cfg(test)` or with the `stats` feature.
    #[cfg(any(test, feature = "stats"))]
    pub fn probe_histogram(&self, hasher: impl Fn(&V) -> u64) -> ProbeHistogram {
        let mut counts = Vec::new();
        for (index, slot) in self.slots.iter().enumerate() {
            let Some(value) = slot else {
                continue;
            };
            let distance = index.wrapping_sub(home_slot(hasher(value), self.mask)) & self.mask;
            if counts.len() <= distance {
                counts.resize(distance + 1, 0);
            }
            counts[distance] += 1;
        }
        ProbeHistogram { counts }
    }

    /// Returns detailed utilization statistics for debugging.
    ///
    /// Available under `cfg(test)` or with the `stats` feature.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self, hasher: impl Fn(&V) -> u64) -> DebugStats {
        let histogram = self.probe_histogram(hasher);
        let slot_bytes = core::mem::size_of::<Option<V>>();
        let capacity = self.slots.len();

        DebugStats {
            populated: self.populated,
            capacity,
            growth_threshold: self.max_pop,
            load_factor: self.load_factor,
            occupancy: self.populated as f64 / capacity as f64,
            max_displacement: histogram.max_displacement(),
            mean_displacement: histogram.mean_displacement(),
            total_bytes: capacity * slot_bytes,
            wasted_bytes: (capacity - self.populated) * slot_bytes,
        }
    }

    /// Panics unless every structural invariant holds: power-of-two
    /// capacity, an accurate element count, at least one empty slot, no
    /// duplicates, and every element reachable from its home slot without
    /// crossing an empty slot.
    #[cfg(test)]
    pub(crate) fn assert_invariants(&self, hasher: impl Fn(&V) -> u64)
    where
        V: Debug + Eq,
    {
        let capacity = self.slots.len();
        assert!(capacity.is_power_of_two(), "{self:#?}");
        assert_eq!(self.mask, capacity - 1);

        let occupied = self.slots.iter().filter(|s| s.is_some()).count();
        assert_eq!(occupied, self.populated, "{self:#?}");
        assert!(self.populated < capacity, "no empty slot: {self:#?}");

        for (index, slot) in self.slots.iter().enumerate() {
            let Some(value) = slot else {
                continue;
            };
            let mut probe = home_slot(hasher(value), self.mask);
            while probe != index {
                assert!(
                    self.slots[probe].is_some(),
                    "gap at {probe} before {value:?} at {index}: {self:#?}"
                );
                assert_ne!(self.slots[probe].as_ref(), Some(value), "{self:#?}");
                probe = (probe + 1) & self.mask;
            }
        }
    }

    /// Scans from the home slot of `hash` until an equal value or an empty
    /// slot. Terminates because at least one slot is always empty.
    #[inline]
    fn probe(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Probe {
        let mut index = home_slot(hash, self.mask);
        loop {
            match &self.slots[index] {
                None => return Probe::Vacant(index),
                Some(value) if eq(value) => return Probe::Occupied(index),
                Some(_) => index = (index + 1) & self.mask,
            }
        }
    }

    /// Stores `value` in the vacant slot `index`, growing first if the store
    /// would reach the threshold. Returns the slot the value ends up in.
    fn insert_at(&mut self, mut index: usize, value: V, hasher: impl Fn(&V) -> u64) -> usize {
        debug_assert!(self.slots[index].is_none());
        if self.populated + 1 >= self.max_pop {
            self.grow(self.populated + 1, &hasher);
            index = home_slot(hasher(&value), self.mask);
            while self.slots[index].is_some() {
                index = (index + 1) & self.mask;
            }
        }
        self.slots[index] = Some(value);
        self.populated += 1;
        index
    }

    fn remove_at(&mut self, index: usize, hasher: impl Fn(&V) -> u64) -> V {
        let Some(removed) = self.slots[index].take() else {
            unreachable!("remove_at called on empty slot {index}");
        };
        self.populated -= 1;
        self.close_gap(index, hasher);
        removed
    }

    /// Backward-shift deletion: walks the probe run after the emptied slot
    /// `gap`, pulling back every element whose home slot does not lie in
    /// `(gap, index]`, until an empty slot ends the run.
    fn close_gap(&mut self, mut gap: usize, hasher: impl Fn(&V) -> u64) {
        let mut index = (gap + 1) & self.mask;
        while let Some(value) = &self.slots[index] {
            let home = home_slot(hasher(value), self.mask);
            if !in_cyclic_range(gap, home, index) {
                self.slots[gap] = self.slots[index].take();
                gap = index;
            }
            index = (index + 1) & self.mask;
        }
    }

    /// Doubles the slot array until `required` elements stay below the
    /// threshold, then re-places every element.
    ///
    /// All home slots are computed before any value moves, so a panicking
    /// `hasher` leaves the table unchanged.
    #[cold]
    fn grow(&mut self, required: usize, hasher: impl Fn(&V) -> u64) {
        let old_capacity = self.slots.len();
        let mut capacity = old_capacity.checked_mul(2).expect("capacity overflow");
        // Tiny tables with small load factors can need more than one doubling
        // before a free slot remains under the threshold.
        while max_populated(capacity, self.load_factor) <= required {
            capacity = capacity.checked_mul(2).expect("capacity overflow");
        }

        let mask = capacity - 1;
        let homes: Vec<usize> = self
            .slots
            .iter()
            .flatten()
            .map(|value| home_slot(hasher(value), mask))
            .collect();

        let mut slots = empty_slots(capacity);
        let values = self.slots.iter_mut().filter_map(Option::take);
        for (home, value) in homes.into_iter().zip(values) {
            let mut index = home;
            while slots[index].is_some() {
                index = (index + 1) & mask;
            }
            slots[index] = Some(value);
        }

        log::trace!(
            "grew hash table from {old_capacity} to {capacity} slots with {} elements",
            self.populated
        );

        self.slots = slots;
        self.mask = mask;
        self.max_pop = max_populated(capacity, self.load_factor);
    }
}

/// A view into a single slot of a [`HashTable`], either holding a matching
/// value or vacant.
pub enum Entry<'a, V, H> {
    /// The slot holds a value matching the lookup.
    Occupied(OccupiedEntry<'a, V, H>),
    /// No matching value exists; inserting fills this slot.
    Vacant(VacantEntry<'a, V, H>),
}

impl<V: Debug, H> Debug for Entry<'_, V, H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Entry::Occupied(entry) => f.debug_tuple("Occupied").field(entry.get()).finish(),
            Entry::Vacant(_) => f.write_str("Vacant"),
        }
    }
}

/// An occupied entry of a [`HashTable`].
pub struct OccupiedEntry<'a, V, H> {
    table: &'a mut HashTable<V>,
    index: usize,
    hasher: H,
}

impl<V, H> OccupiedEntry<'_, V, H> {
    /// Returns a reference to the stored value.
    pub fn get(&self) -> &V {
        match &self.table.slots[self.index] {
            Some(value) => value,
            None => unreachable!("occupied entry points at empty slot {}", self.index),
        }
    }
}

impl<V, H> OccupiedEntry<'_, V, H>
where
    H: Fn(&V) -> u64,
{
    /// Removes the stored value, shifting later elements of its probe run
    /// back as needed. A panicking hasher has the same effect as in
    /// [`HashTable::remove`].
    pub fn remove(self) -> V {
        self.table.remove_at(self.index, self.hasher)
    }
}

/// A vacant entry of a [`HashTable`].
pub struct VacantEntry<'a, V, H> {
    table: &'a mut HashTable<V>,
    index: usize,
    hasher: H,
}

impl<'a, V, H> VacantEntry<'a, V, H>
where
    H: Fn(&V) -> u64,
{
    /// Inserts `value`, growing the table if this reaches the growth
    /// threshold, and returns a reference to the stored value.
    ///
    /// The value must hash to the hash this entry was looked up with.
    pub fn insert(self, value: V) -> &'a V {
        let table = self.table;
        let index = table.insert_at(self.index, value, self.hasher);
        match &table.slots[index] {
            Some(value) => value,
            None => unreachable!("inserted value missing from slot {index}"),
        }
    }
}

/// An iterator over the values of a [`HashTable`].
pub struct Iter<'a, V> {
    inner: core::slice::Iter<'a, Option<V>>,
    remaining: usize,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        for slot in self.inner.by_ref() {
            if let Some(value) = slot {
                self.remaining -= 1;
                return Some(value);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

impl<V> Clone for Iter<'_, V> {
    fn clone(&self) -> Self {
        Iter {
            inner: self.inner.clone(),
            remaining: self.remaining,
        }
    }
}

/// A draining iterator over the values of a [`HashTable`].
pub struct Drain<'a, V> {
    table: &'a mut HashTable<V>,
    index: usize,
}

impl<V> Iterator for Drain<'_, V> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        while self.table.populated > 0 && self.index < self.table.slots.len() {
            let slot = &mut self.table.slots[self.index];
            self.index += 1;
            if let Some(value) = slot.take() {
                self.table.populated -= 1;
                return Some(value);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.table.populated, Some(self.table.populated))
    }
}

impl<V> ExactSizeIterator for Drain<'_, V> {}

impl<V> Drop for Drain<'_, V> {
    fn drop(&mut self) {
        for _ in &mut *self {}
    }
}

/// A consuming iterator over the values of a [`HashTable`].
pub struct IntoIter<V> {
    inner: alloc::vec::IntoIter<Option<V>>,
    remaining: usize,
}

impl<V> Iterator for IntoIter<V> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        for slot in self.inner.by_ref() {
            if let Some(value) = slot {
                self.remaining -= 1;
                return Some(value);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for IntoIter<V> {}

impl<V> IntoIterator for HashTable<V> {
    type IntoIter = IntoIter<V>;
    type Item = V;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            remaining: self.populated,
            inner: self.slots.into_vec().into_iter(),
        }
    }
}

impl<'a, V> IntoIterator for &'a HashTable<V> {
    type IntoIter = Iter<'a, V>;
    type Item = &'a V;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
