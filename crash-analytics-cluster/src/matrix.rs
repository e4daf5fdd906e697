use rayon::prelude::*;

use crash_analytics_stacktrace::Thread;

use crate::distance::{distance, DistanceType};

/// A symmetric `n x n` distance matrix stored as its upper triangle only
/// (`i < j`), row-major within that triangle.
///
/// `get(i, j)` returns `0.0` on the diagonal and transparently swaps out-of-
/// range-order arguments, so callers never need to know about the storage
/// layout.
#[derive(Clone, Debug)]
pub struct DistanceMatrix {
    n: usize,
    dist_type: DistanceType,
    values: Vec<f64>,
}

/// Describes one contiguous slab of a [`DistanceMatrix`] computed
/// independently, so several slabs can be computed in parallel and merged
/// back together with a checksum guarding against a dropped or duplicated
/// slab.
#[derive(Clone, Debug, PartialEq)]
pub struct Part {
    pub m: usize,
    pub n: usize,
    pub m_begin: usize,
    pub n_begin: usize,
    pub len: usize,
    pub dist_type: DistanceType,
    pub checksum: u64,
    pub values: Vec<f64>,
}

impl DistanceMatrix {
    /// Index of the flattened upper-triangle cell for `i < j` in an `n x n`
    /// matrix.
    fn flat_index(n: usize, i: usize, j: usize) -> usize {
        // Row i contributes (n - 1 - i) entries for columns i+1..n;
        // offset within the row is (j - i - 1).
        let row_start: usize = (0..i).map(|r| n - 1 - r).sum();
        row_start + (j - i - 1)
    }

    /// Computes the full matrix for `threads` sequentially, in row-major
    /// upper-triangle order.
    pub fn compute(threads: &[Thread], dist_type: DistanceType) -> DistanceMatrix {
        let n = threads.len();
        let mut values = Vec::with_capacity(n.saturating_sub(1) * n / 2);
        for i in 0..n {
            for j in (i + 1)..n {
                values.push(distance(dist_type, &threads[i], &threads[j]));
            }
        }
        DistanceMatrix { n, dist_type, values }
    }

    /// Computes the matrix by splitting the threads into `rayon`-parallel
    /// row bands, then merging the resulting [`Part`]s.
    ///
    /// Splits on row boundaries: each part owns the rows in `[m_begin, m)`
    /// against all columns `[n_begin, n)` in the upper triangle.
    pub fn compute_parallel(threads: &[Thread], dist_type: DistanceType) -> DistanceMatrix {
        let n = threads.len();
        if n < 2 {
            return DistanceMatrix { n, dist_type, values: Vec::new() };
        }

        let parts: Vec<Part> = (0..n)
            .into_par_iter()
            .map(|i| {
                let mut values = Vec::with_capacity(n - i - 1);
                for j in (i + 1)..n {
                    values.push(distance(dist_type, &threads[i], &threads[j]));
                }
                Part {
                    m: i + 1,
                    n,
                    m_begin: i,
                    n_begin: i + 1,
                    len: values.len(),
                    dist_type,
                    checksum: checksum(&values),
                    values,
                }
            })
            .collect();

        Self::merge(n, dist_type, parts).expect("parallel row split always produces a valid merge")
    }

    /// Reassembles a matrix from row-ordered [`Part`]s, verifying each
    /// part's checksum and that rows arrive contiguously and in order.
    pub fn merge(n: usize, dist_type: DistanceType, parts: Vec<Part>) -> Result<DistanceMatrix, MergeError> {
        let mut parts = parts;
        parts.sort_by_key(|p| p.m_begin);

        let mut values = Vec::with_capacity(n.saturating_sub(1) * n / 2);
        let mut expected_row = 0usize;
        for part in &parts {
            if part.dist_type != dist_type || part.n != n {
                return Err(MergeError::Mismatched);
            }
            if part.m_begin != expected_row {
                return Err(MergeError::Gap { expected: expected_row, found: part.m_begin });
            }
            if part.values.len() != part.len || checksum(&part.values) != part.checksum {
                return Err(MergeError::ChecksumFailed { row: part.m_begin });
            }
            values.extend_from_slice(&part.values);
            expected_row = part.m;
        }
        if expected_row != n {
            return Err(MergeError::Incomplete { expected: n, found: expected_row });
        }

        Ok(DistanceMatrix { n, dist_type, values })
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    pub fn dist_type(&self) -> DistanceType {
        self.dist_type
    }

    /// The distance between threads `i` and `j`. `0.0` when `i == j`;
    /// arguments are swapped transparently when `i > j`.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        if i == j {
            return 0.0;
        }
        let (lo, hi) = if i < j { (i, j) } else { (j, i) };
        self.values[Self::flat_index(self.n, lo, hi)]
    }
}

fn checksum(values: &[f64]) -> u64 {
    values.iter().fold(0u64, |acc, v| acc.wrapping_mul(31).wrapping_add(v.to_bits()))
}

/// Failures while reassembling a [`DistanceMatrix`] from [`Part`]s.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum MergeError {
    #[error("part covers a different matrix size or distance type")]
    Mismatched,
    #[error("expected the next part to start at row {expected}, found row {found}")]
    Gap { expected: usize, found: usize },
    #[error("checksum mismatch for part starting at row {row}")]
    ChecksumFailed { row: usize },
    #[error("parts covered rows up to {found}, expected {expected}")]
    Incomplete { expected: usize, found: usize },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crash_analytics_stacktrace::{Dialect, Frame};

    fn thread_with(names: &[&str]) -> Thread {
        let mut t = Thread::new(Dialect::Core);
        t.frames = names
            .iter()
            .map(|n| {
                Frame::Core(crash_analytics_stacktrace::CoreFrame {
                    function_name: Some(n.to_string()),
                    ..Default::default()
                })
            })
            .collect();
        t
    }

    #[test]
    fn get_is_symmetric_and_zero_on_diagonal() {
        let threads = vec![thread_with(&["a"]), thread_with(&["b"]), thread_with(&["a", "b"])];
        let m = DistanceMatrix::compute(&threads, DistanceType::Jaccard);
        assert_eq!(m.get(0, 0), 0.0);
        assert_eq!(m.get(0, 1), m.get(1, 0));
        assert_eq!(m.get(1, 2), m.get(2, 1));
    }

    #[test]
    fn parallel_matches_sequential() {
        let threads = vec![
            thread_with(&["a", "b"]),
            thread_with(&["a", "c"]),
            thread_with(&["x"]),
            thread_with(&["a", "b", "c"]),
        ];
        let seq = DistanceMatrix::compute(&threads, DistanceType::Levenshtein);
        let par = DistanceMatrix::compute_parallel(&threads, DistanceType::Levenshtein);
        for i in 0..threads.len() {
            for j in 0..threads.len() {
                assert!((seq.get(i, j) - par.get(i, j)).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn merge_rejects_checksum_mismatch() {
        let part = Part {
            m: 1,
            n: 2,
            m_begin: 0,
            n_begin: 1,
            len: 1,
            dist_type: DistanceType::Jaccard,
            checksum: 42,
            values: vec![0.5],
        };
        let err = DistanceMatrix::merge(2, DistanceType::Jaccard, vec![part]).unwrap_err();
        assert_eq!(err, MergeError::ChecksumFailed { row: 0 });
    }
}
