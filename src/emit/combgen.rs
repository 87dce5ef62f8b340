// src/emit/combgen.rs
//! Enumerates every subset of `{0..n-1}` in the canonical order: the
//! empty set first, then subsets by ascending size, lexicographically
//! within a size.

use smallvec::SmallVec;

/// Total number of subsets of an `n`-element set.
pub fn n_subsets(n: usize) -> u64 {
    1u64 << n
}

/// Subset enumerator.
///
/// [`SubsetGen::indices`] returns a view into the enumerator's own
/// buffer; copy it to retain a subset across calls to
/// [`SubsetGen::advance`].
pub struct SubsetGen {
    n: usize,
    idxs: SmallVec<[usize; 8]>,
    started: bool,
}

impl SubsetGen {
    pub fn new(n: usize) -> Self {
        Self {
            n,
            idxs: SmallVec::new(),
            started: false,
        }
    }

    /// Step to the next subset; false once the sequence is exhausted.
    pub fn advance(&mut self) -> bool {
        if self.idxs.len() > self.n {
            return false;
        }
        if !self.started {
            self.started = true;
            return true;
        }
        // Advance the rightmost index that has room, resetting everything
        // to its right to consecutive successors.
        let len = self.idxs.len();
        let mut i = len as i64 - 1;
        let mut limit = self.n as i64 - 1;
        while i >= 0 {
            let at = i as usize;
            if (self.idxs[at] as i64) < limit {
                self.idxs[at] += 1;
                for right in at + 1..len {
                    self.idxs[right] = self.idxs[at] + (right - at);
                }
                return true;
            }
            i -= 1;
            limit -= 1;
        }
        // This size is exhausted; grow by one and restart at 0,1,..,k.
        self.idxs.push(0);
        if self.idxs.len() > self.n {
            return false;
        }
        for (pos, idx) in self.idxs.iter_mut().enumerate() {
            *idx = pos;
        }
        true
    }

    /// The current subset as ascending indices.
    pub fn indices(&self) -> &[usize] {
        &self.idxs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashSet;

    #[test]
    fn subset_counts() {
        for (n, count) in [
            (0usize, 1u64),
            (1, 2),
            (2, 4),
            (3, 8),
            (4, 16),
            (5, 32),
            (6, 64),
            (7, 128),
            (8, 256),
            (9, 512),
            (10, 1024),
        ] {
            assert_eq!(n_subsets(n), count, "n_subsets({n})");
        }
    }

    fn collect(n: usize) -> Vec<String> {
        let mut gen = SubsetGen::new(n);
        let mut out = Vec::new();
        while gen.advance() {
            let s: String = gen
                .indices()
                .iter()
                .map(|idx| idx.to_string())
                .collect();
            out.push(s);
        }
        out
    }

    #[test]
    fn enumeration_order() {
        let cases: Vec<(usize, Vec<&str>)> = vec![
            (0, vec![""]),
            (1, vec!["", "0"]),
            (2, vec!["", "0", "1", "01"]),
            (3, vec!["", "0", "1", "2", "01", "02", "12", "012"]),
            (
                4,
                vec![
                    "", "0", "1", "2", "3", "01", "02", "03", "12", "13", "23", "012", "013",
                    "023", "123", "0123",
                ],
            ),
            (
                5,
                vec![
                    "", "0", "1", "2", "3", "4", "01", "02", "03", "04", "12", "13", "14", "23",
                    "24", "34", "012", "013", "014", "023", "024", "034", "123", "124", "134",
                    "234", "0123", "0124", "0134", "0234", "1234", "01234",
                ],
            ),
        ];
        for (n, expected) in cases {
            let got = collect(n);
            assert_eq!(got.len(), expected.len(), "count for n={n}");
            assert_eq!(got, expected, "order for n={n}");
        }
    }

    #[test]
    fn subsets_are_distinct_up_to_ten() {
        for n in 0..=10 {
            let got = collect(n);
            assert_eq!(got.len(), n_subsets(n) as usize);
            let set: FxHashSet<&String> = got.iter().collect();
            assert_eq!(set.len(), got.len(), "duplicates for n={n}");
        }
    }

    #[test]
    fn sizes_are_non_decreasing() {
        for n in 0..=8usize {
            let mut gen = SubsetGen::new(n);
            let mut last_size = 0;
            while gen.advance() {
                let size = gen.indices().len();
                assert!(size >= last_size);
                last_size = size;
            }
        }
    }

    #[test]
    fn specific_positions_for_four() {
        let got = collect(4);
        assert_eq!(got.last().unwrap(), "0123");
        assert_eq!(got[4], "3");
        assert_eq!(got[5], "01");
    }

    #[test]
    fn advance_stays_false_after_exhaustion() {
        let mut gen = SubsetGen::new(1);
        assert!(gen.advance());
        assert!(gen.advance());
        assert!(!gen.advance());
        assert!(!gen.advance());
    }
}
