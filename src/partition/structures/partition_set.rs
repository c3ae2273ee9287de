/// PartitionSet maintains a total assignment of elements to sets, with O(1) move/find.
///
/// One set is the "home" set that every element starts in and returns to on `clear`.
#[derive(Debug, Clone)]
pub(crate) struct PartitionSet {
    sets: Vec<Vec<usize>>,  // sets[s] = elements currently in set s
    index: Vec<usize>,      // index[e] = s when e is in sets[s]
    position: Vec<usize>,   // position[e] = i when sets[s][i] is e
    home: usize,
}

impl PartitionSet {
    /// Create a PartitionSet with `num_sets` sets and `num_elems` elements,
    /// initially assigning all elements to set `home`.
    pub(crate) fn new(num_sets: usize, num_elems: usize, home: usize) -> Self {
        assert!(home < num_sets, "home set {home} out of range [0, {num_sets})");
        let capacity = (num_elems / num_sets).isqrt().saturating_add(1);
        let mut sets = (0..num_sets)
            .map(|_| Vec::with_capacity(capacity))
            .collect::<Vec<_>>();
        sets[home] = (0..num_elems).collect();

        Self { sets, index: vec![home; num_elems], position: (0..num_elems).collect(), home }
    }

    /// Number of sets.
    #[inline] pub(crate) fn num_sets(&self) -> usize { self.sets.len() }

    /// Universe size (number of elements addressable by index).
    #[inline] pub(crate) fn num_elems(&self) -> usize { self.index.len() }

    /// Return the set that `elem` is currently in.
    #[inline]
    pub(crate) fn find(&self, elem: usize) -> usize {
        debug_assert!(elem < self.index.len(), "element out of range");
        self.index[elem]
    }

    /// Returns a reference to the elements currently in `set`.
    #[inline]
    pub(crate) fn get(&self, set: usize) -> &[usize] {
        debug_assert!(set < self.sets.len(), "set out of range");
        &self.sets[set]
    }

    /// Get a complete vector of assignments for each element.
    #[inline] pub(crate) fn assignments(&self) -> &[usize] { &self.index }

    /// Remove all elements from all sets, placing them in the home set.
    pub(crate) fn clear(&mut self) {
        self.sets.iter_mut().for_each(|v| v.clear());
        self.sets[self.home] = (0..self.num_elems()).collect();
        self.index.fill(self.home);
        self.position = (0..self.num_elems()).collect();
    }

    /// Rebuild partition from a complete slice of assignments.
    pub(crate) fn rebuild(&mut self, assignments: &[usize]) {
        assert!(assignments.len() == self.num_elems(), "assignments length mismatch");

        self.sets.iter_mut().for_each(|v| v.clear());
        for (elem, &set) in assignments.iter().enumerate() {
            assert!(set < self.num_sets(), "set out of range");
            self.index[elem] = set;
            self.position[elem] = self.sets[set].len();
            self.sets[set].push(elem);
        }
    }

    /// Move `elem` to `set`. Panics in debug if out of range.
    pub(crate) fn move_to(&mut self, elem: usize, set: usize) {
        debug_assert!(elem < self.index.len(), "element out of range");
        debug_assert!(set < self.sets.len(), "set out of range");

        let (prev, pos) = (self.index[elem], self.position[elem]);
        if prev == set { return }

        // Remove from previous set by swapping with last element.
        self.sets[prev].swap_remove(pos);
        if let Some(&moved) = self.sets[prev].get(pos) {
            self.position[moved] = pos;
        }

        self.index[elem] = set;
        self.position[elem] = self.sets[set].len();
        self.sets[set].push(elem);
    }
}
