use std::ops::Range;

/// BucketSet tracks an optional bucket per element with O(1) place/remove/lookup.
///
/// Used for boundary units (bucketed by district) and boundary half-edges
/// (bucketed by source district).
#[derive(Debug, Clone)]
pub(crate) struct BucketSet {
    buckets: Vec<Vec<usize>>,
    index: Vec<Option<(usize, usize)>>, // index[e] = Some((bucket, pos)) if e is in buckets[bucket] @ pos
}

impl BucketSet {
    /// Create empty buckets over a universe of `num_elems` elements.
    pub(crate) fn new(num_buckets: usize, num_elems: usize) -> Self {
        let capacity = (num_elems / num_buckets.max(1)).isqrt().saturating_add(1);
        Self {
            buckets: (0..num_buckets).map(|_| Vec::with_capacity(capacity)).collect(),
            index: vec![None; num_elems],
        }
    }

    #[inline] pub(crate) fn num_buckets(&self) -> usize { self.buckets.len() }

    #[inline] pub(crate) fn num_elems(&self) -> usize { self.index.len() }

    /// Empty every bucket (O(total_size)).
    pub(crate) fn clear(&mut self) {
        self.buckets.iter_mut().for_each(Vec::clear);
        self.index.fill(None);
    }

    /// Rebuild from `(elem, bucket)` pairs. Elements not mentioned end up in no bucket.
    pub(crate) fn rebuild_from(&mut self, pairs: impl IntoIterator<Item = (usize, usize)>) {
        self.clear();
        for (elem, bucket) in pairs {
            debug_assert!(self.index[elem].is_none(), "element listed multiple times in rebuild");
            self.push(elem, bucket);
        }
    }

    /// The bucket holding `elem`, if any.
    #[inline]
    pub(crate) fn bucket_of(&self, elem: usize) -> Option<usize> {
        debug_assert!(elem < self.index.len(), "element out of range");
        self.index[elem].map(|(bucket, _)| bucket)
    }

    #[inline] pub(crate) fn contains(&self, elem: usize) -> bool { self.bucket_of(elem).is_some() }

    /// Read-only view of the elements in `bucket`, in no particular order.
    #[inline]
    pub(crate) fn get(&self, bucket: usize) -> &[usize] {
        debug_assert!(bucket < self.buckets.len(), "bucket out of range");
        &self.buckets[bucket]
    }

    /// Place `elem` in `bucket`, moving it if needed, or take it out of every bucket on `None`.
    pub(crate) fn set(&mut self, elem: usize, bucket: Option<usize>) {
        debug_assert!(elem < self.index.len(), "element out of range");
        match (self.index[elem], bucket) {
            (Some((current, _)), Some(target)) if current == target => {}
            (Some(_), target) => {
                self.take(elem);
                if let Some(target) = target { self.push(elem, target) }
            }
            (None, Some(target)) => self.push(elem, target),
            (None, None) => {}
        }
    }

    /// Total number of elements across a range of buckets.
    pub(crate) fn count_in(&self, buckets: Range<usize>) -> usize {
        self.buckets[buckets].iter().map(Vec::len).sum()
    }

    /// The `k`-th element when the buckets in `buckets` are laid end to end.
    pub(crate) fn nth_in(&self, buckets: Range<usize>, mut k: usize) -> Option<usize> {
        for bucket in &self.buckets[buckets] {
            if k < bucket.len() { return Some(bucket[k]) }
            k -= bucket.len();
        }
        None
    }

    fn push(&mut self, elem: usize, bucket: usize) {
        debug_assert!(bucket < self.buckets.len(), "bucket out of range");
        let vec = &mut self.buckets[bucket];
        self.index[elem] = Some((bucket, vec.len()));
        vec.push(elem);
    }

    fn take(&mut self, elem: usize) {
        if let Some((bucket, pos)) = self.index[elem].take() {
            let vec = &mut self.buckets[bucket];
            vec.swap_remove(pos);
            if let Some(&moved) = vec.get(pos) {
                self.index[moved] = Some((bucket, pos));
            }
        }
    }
}
