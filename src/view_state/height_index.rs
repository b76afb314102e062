//! HeightIndex - O(log n) row offsets via a Fenwick tree
//!
//! Maps row indices to pixel offsets and pixel offsets back to rows, while
//! individual row heights change as rows get measured.
//!
//! # Complexity
//!
//! - `set`: O(log n)
//! - `prefix_sum` / `offset_of`: O(log n)
//! - `lower_bound`: O(log² n)
//! - `push`: amortized O(log n)
//! - `height` / `len`: O(1)

/// Row heights with prefix sums.
///
/// # Invariants
/// - `tree` is the Fenwick tree of `heights` zero-padded to `tree.len()`.
/// - `heights.len() <= tree.len()`.
#[derive(Debug, Clone, Default)]
pub struct HeightIndex {
    /// Fenwick tree backing storage (capacity-sized, zero beyond `heights`).
    tree: Vec<isize>,
    /// Height of each row in pixels.
    heights: Vec<usize>,
}

impl HeightIndex {
    /// Creates an empty index with room for `capacity` rows.
    ///
    /// # Examples
    ///
    /// ```
    /// # use viewsync::view_state::HeightIndex;
    /// let index = HeightIndex::new(100);
    /// assert_eq!(index.len(), 0);
    /// assert_eq!(index.total(), 0);
    /// ```
    pub fn new(capacity: usize) -> Self {
        Self {
            tree: vec![0; capacity],
            heights: Vec::with_capacity(capacity),
        }
    }

    /// Creates an index of `len` rows that all have `height`.
    pub fn from_uniform(len: usize, height: usize) -> Self {
        let mut index = Self::new(len);
        index.resize(len, height);
        index
    }

    /// Sets the height of row `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use viewsync::view_state::HeightIndex;
    /// let mut index = HeightIndex::from_uniform(3, 20);
    /// index.set(1, 50);
    /// assert_eq!(index.total(), 90);
    /// ```
    pub fn set(&mut self, index: usize, height: usize) {
        assert!(
            index < self.len(),
            "index {} out of bounds (len: {})",
            index,
            self.len()
        );

        let delta = height as isize - self.heights[index] as isize;
        if delta != 0 {
            self.heights[index] = height;
            fenwick::array::update(&mut self.tree, index, delta);
        }
    }

    /// Height of row `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn height(&self, index: usize) -> usize {
        self.heights[index]
    }

    /// Cumulative height of rows `0..=index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn prefix_sum(&self, index: usize) -> usize {
        assert!(
            index < self.len(),
            "index {} out of bounds (len: {})",
            index,
            self.len()
        );

        let sum = fenwick::array::prefix_sum(&self.tree, index);
        sum.max(0) as usize
    }

    /// Offset of the top edge of row `index`; `offset_of(len())` is the total.
    ///
    /// # Examples
    ///
    /// ```
    /// # use viewsync::view_state::HeightIndex;
    /// let index = HeightIndex::from_uniform(4, 10);
    /// assert_eq!(index.offset_of(0), 0);
    /// assert_eq!(index.offset_of(2), 20);
    /// assert_eq!(index.offset_of(4), 40);
    /// ```
    pub fn offset_of(&self, index: usize) -> usize {
        match index.min(self.len()) {
            0 => 0,
            i => self.prefix_sum(i - 1),
        }
    }

    /// First row whose bottom edge lies below `value`, i.e. the row that
    /// contains pixel offset `value`.
    ///
    /// Returns `None` when `value >= total()` or the index is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// # use viewsync::view_state::HeightIndex;
    /// let mut index = HeightIndex::new(3);
    /// index.push(10);  // [0..10)
    /// index.push(20);  // [10..30)
    /// index.push(15);  // [30..45)
    ///
    /// assert_eq!(index.lower_bound(0), Some(0));
    /// assert_eq!(index.lower_bound(10), Some(1));
    /// assert_eq!(index.lower_bound(30), Some(2));
    /// assert_eq!(index.lower_bound(45), None);
    /// ```
    pub fn lower_bound(&self, value: usize) -> Option<usize> {
        let mut left = 0;
        let mut right = self.len();

        while left < right {
            let mid = left + (right - left) / 2;
            if self.prefix_sum(mid) > value {
                right = mid;
            } else {
                left = mid + 1;
            }
        }

        (left < self.len()).then_some(left)
    }

    /// Total height of all rows.
    pub fn total(&self) -> usize {
        self.offset_of(self.len())
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.heights.len()
    }

    /// Returns true if there are no rows.
    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    /// Appends a row.
    ///
    /// # Examples
    ///
    /// ```
    /// # use viewsync::view_state::HeightIndex;
    /// let mut index = HeightIndex::new(1);
    /// index.push(5);
    /// index.push(3);
    /// assert_eq!(index.len(), 2);
    /// assert_eq!(index.total(), 8);
    /// ```
    pub fn push(&mut self, height: usize) {
        if self.len() >= self.tree.len() {
            self.grow((self.tree.len().max(1)) * 2);
        }

        let idx = self.len();
        self.heights.push(height);
        fenwick::array::update(&mut self.tree, idx, height as isize);
    }

    /// Grows or shrinks to `len` rows. New rows get `height`; surviving rows
    /// keep theirs.
    pub fn resize(&mut self, len: usize, height: usize) {
        if len < self.len() {
            for idx in len..self.len() {
                let old = self.heights[idx] as isize;
                if old != 0 {
                    fenwick::array::update(&mut self.tree, idx, -old);
                }
            }
            self.heights.truncate(len);
            return;
        }

        if len > self.tree.len() {
            self.grow(len);
        }
        for _ in self.len()..len {
            self.push(height);
        }
    }

    /// Removes every row, keeping capacity.
    pub fn clear(&mut self) {
        self.tree.iter_mut().for_each(|node| *node = 0);
        self.heights.clear();
    }

    /// Rebuild the tree with `capacity` slots.
    fn grow(&mut self, capacity: usize) {
        self.tree.clear();
        self.tree.resize(capacity, 0);
        for (idx, &height) in self.heights.iter().enumerate() {
            if height != 0 {
                fenwick::array::update(&mut self.tree, idx, height as isize);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn naive_offset(heights: &[usize], index: usize) -> usize {
        heights[..index].iter().sum()
    }

    #[test]
    fn test_empty_index() {
        let index = HeightIndex::new(10);
        assert_eq!(index.len(), 0);
        assert_eq!(index.total(), 0);
        assert!(index.is_empty());
        assert_eq!(index.lower_bound(0), None);
    }

    #[test]
    fn test_set_updates_height() {
        let mut index = HeightIndex::new(3);
        index.push(3);
        index.push(4);
        index.push(5);

        index.set(1, 10);

        assert_eq!(index.height(1), 10);
        assert_eq!(index.prefix_sum(1), 13);
        assert_eq!(index.total(), 18);
    }

    #[test]
    fn test_lower_bound_boundaries() {
        let index = HeightIndex::from_uniform(3, 5);

        assert_eq!(index.lower_bound(0), Some(0));
        assert_eq!(index.lower_bound(4), Some(0));
        assert_eq!(index.lower_bound(5), Some(1));
        assert_eq!(index.lower_bound(14), Some(2));
        assert_eq!(index.lower_bound(15), None);
    }

    #[test]
    fn test_push_past_capacity_keeps_sums() {
        let mut index = HeightIndex::new(1);
        for h in 1..=20 {
            index.push(h);
        }
        assert_eq!(index.total(), 210);
        assert_eq!(index.offset_of(10), 55);
    }

    #[test]
    fn test_resize_shrink_then_grow() {
        let mut index = HeightIndex::from_uniform(10, 10);
        index.set(2, 50);

        index.resize(3, 10);
        assert_eq!(index.total(), 70);

        index.resize(5, 7);
        assert_eq!(index.height(2), 50);
        assert_eq!(index.height(4), 7);
        assert_eq!(index.total(), 84);
    }

    #[test]
    fn test_clear_and_reuse() {
        let mut index = HeightIndex::from_uniform(8, 5);
        index.clear();
        assert_eq!(index.total(), 0);

        index.push(10);
        assert_eq!(index.len(), 1);
        assert_eq!(index.total(), 10);
    }

    proptest! {
        #[test]
        fn prop_offsets_match_naive_sums(heights in prop::collection::vec(0usize..=100, 0..60)) {
            let mut index = HeightIndex::new(2);
            for &h in &heights {
                index.push(h);
            }
            for i in 0..=heights.len() {
                prop_assert_eq!(index.offset_of(i), naive_offset(&heights, i));
            }
        }

        #[test]
        fn prop_lower_bound_contains_offset(
            heights in prop::collection::vec(1usize..=100, 1..60),
            probe in 0usize..6_000,
        ) {
            let index = {
                let mut index = HeightIndex::new(heights.len());
                heights.iter().for_each(|&h| index.push(h));
                index
            };
            match index.lower_bound(probe) {
                Some(row) => {
                    prop_assert!(index.offset_of(row) <= probe);
                    prop_assert!(probe < index.offset_of(row + 1));
                }
                None => prop_assert!(probe >= index.total()),
            }
        }

        #[test]
        fn prop_resize_matches_naive(
            initial in 0usize..40,
            target in 0usize..80,
            fill in 1usize..50,
        ) {
            let mut index = HeightIndex::from_uniform(initial, 10);
            index.resize(target, fill);

            let expected: usize = (0..target).map(|i| if i < initial { 10 } else { fill }).sum();
            prop_assert_eq!(index.len(), target);
            prop_assert_eq!(index.total(), expected);
        }
    }
}
