use crate::matrix::DistanceMatrix;

/// Which linkage criterion to use when merging two clusters' distances to a
/// third. Only average linkage is exposed by default; `Max`/`Min` exist for
/// callers built with the `linkage-variants` feature.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Linkage {
    /// `d(new, x) = (d(a, x) * |a| + d(b, x) * |x|) / (|a| + |b|)`.
    Average,
    /// `d(new, x) = max(d(a, x), d(b, x))`.
    #[cfg(feature = "linkage-variants")]
    Max,
    /// `d(new, x) = min(d(a, x), d(b, x))`.
    #[cfg(feature = "linkage-variants")]
    Min,
}

/// An agglomerative clustering of the `n` items behind a [`DistanceMatrix`].
///
/// `order` is a permutation of `0..n` giving a leaf ordering under which
/// every merge is of two adjacent runs; `merge_levels[k]` is the level at
/// which `order[k]` and `order[k + 1]` first joined the same cluster. This
/// is the classic dendrogram representation: cutting at a level is just
/// scanning `merge_levels` for the first threshold crossing.
#[derive(Clone, Debug, PartialEq)]
pub struct Dendrogram {
    pub order: Vec<usize>,
    pub merge_levels: Vec<f64>,
}

/// A cluster under construction: its members in final-order-so-far, plus
/// the merge level already fixed between each adjacent pair of them. Both
/// vectors are reversed together whenever a merge picks this side's
/// reversed orientation, so `levels[k]` always describes the boundary
/// between `members[k]` and `members[k + 1]`.
struct Cluster {
    members: Vec<usize>,
    levels: Vec<f64>,
}

impl Dendrogram {
    /// Builds a dendrogram over `matrix` using `linkage`, via repeated
    /// nearest-pair merging (average-linkage agglomerative clustering).
    ///
    /// `merge_levels[k]` is not the chronological merge order: it is the
    /// level at which `order[k]` and `order[k + 1]` first ended up in the
    /// same cluster, i.e. the cophenetic distance between those two
    /// adjacent final leaves. A merge only ever creates one new adjacency
    /// (at the junction of the two runs being concatenated), so each
    /// merge's distance is recorded at that junction, not appended in the
    /// order merges happened.
    pub fn build(matrix: &DistanceMatrix, linkage: Linkage) -> Dendrogram {
        let n = matrix.len();
        if n == 0 {
            return Dendrogram { order: Vec::new(), merge_levels: Vec::new() };
        }
        if n == 1 {
            return Dendrogram { order: vec![0], merge_levels: Vec::new() };
        }

        let mut clusters: Vec<Cluster> =
            (0..n).map(|i| Cluster { members: vec![i], levels: Vec::new() }).collect();
        // dist[a][b] tracks the current inter-cluster distance, indexed by
        // position in `clusters` (not original item index).
        let mut dist: Vec<Vec<f64>> = (0..n)
            .map(|i| (0..n).map(|j| matrix.get(i, j)).collect())
            .collect();

        while clusters.len() > 1 {
            let (mut a, mut b, mut best) = (0, 1, f64::INFINITY);
            for i in 0..clusters.len() {
                for j in (i + 1)..clusters.len() {
                    if dist[i][j] < best {
                        best = dist[i][j];
                        a = i;
                        b = j;
                    }
                }
            }

            let (merged_members, merged_levels) =
                merge_orientation(&clusters[a], &clusters[b], best, matrix);
            let size_a = clusters[a].members.len();
            let size_b = clusters[b].members.len();

            let mut new_row = Vec::with_capacity(clusters.len());
            for k in 0..clusters.len() {
                if k == a || k == b {
                    new_row.push(0.0);
                    continue;
                }
                let value = match linkage {
                    Linkage::Average => {
                        (dist[a][k] * size_a as f64 + dist[b][k] * size_b as f64) / (size_a + size_b) as f64
                    }
                    #[cfg(feature = "linkage-variants")]
                    Linkage::Max => dist[a][k].max(dist[b][k]),
                    #[cfg(feature = "linkage-variants")]
                    Linkage::Min => dist[a][k].min(dist[b][k]),
                };
                new_row.push(value);
            }

            // Remove b first (it has the larger index), then a, keeping
            // indices stable; the merged cluster is pushed to the end.
            clusters.remove(b);
            clusters.remove(a);
            for row in dist.iter_mut() {
                row.remove(b);
                row.remove(a);
            }
            dist.remove(b);
            dist.remove(a);

            let mut final_row = new_row;
            final_row.remove(b);
            final_row.remove(a);
            final_row.push(0.0);
            for (row, value) in dist.iter_mut().zip(final_row.iter()) {
                row.push(*value);
            }
            dist.push(final_row);

            clusters.push(Cluster { members: merged_members, levels: merged_levels });
        }

        let final_cluster = clusters.into_iter().next().expect("exactly one cluster remains");
        tracing::debug!(items = n, merges = final_cluster.levels.len(), "built dendrogram");
        Dendrogram { order: final_cluster.members, merge_levels: final_cluster.levels }
    }

    /// Cuts the dendrogram at `level`: walks `order`, starting a new run
    /// whenever the next merge level exceeds `level`, and emits every run
    /// with at least `min_size` members as a cluster.
    pub fn cut(&self, level: f64, min_size: usize) -> Vec<Vec<usize>> {
        let mut clusters = Vec::new();
        let mut current = Vec::new();

        for (idx, &item) in self.order.iter().enumerate() {
            current.push(item);
            let at_boundary = idx == self.order.len() - 1 || self.merge_levels[idx] > level;
            if at_boundary {
                if current.len() >= min_size {
                    clusters.push(std::mem::take(&mut current));
                } else {
                    current.clear();
                }
            }
        }

        clusters
    }
}

/// Picks the concatenation order for two merging clusters that minimizes
/// the distance at the new adjacency boundary, and assembles the merged
/// member/level vectors: both sides' internal levels carry over (reversed
/// along with their members, if that side was flipped), with `merge_level`
/// inserted as the single new boundary value at the junction.
fn merge_orientation(a: &Cluster, b: &Cluster, merge_level: f64, matrix: &DistanceMatrix) -> (Vec<usize>, Vec<f64>) {
    let a_first_b_first = matrix.get(*a.members.last().unwrap(), *b.members.first().unwrap());
    let a_first_b_rev = matrix.get(*a.members.last().unwrap(), *b.members.last().unwrap());
    let a_rev_b_first = matrix.get(*a.members.first().unwrap(), *b.members.first().unwrap());
    let a_rev_b_rev = matrix.get(*a.members.first().unwrap(), *b.members.last().unwrap());

    let mut best = a_first_b_first;
    let mut orientation = 0u8;
    for (candidate, tag) in [(a_first_b_rev, 1u8), (a_rev_b_first, 2u8), (a_rev_b_rev, 3u8)] {
        if candidate < best {
            best = candidate;
            orientation = tag;
        }
    }

    let (a_members, a_levels, b_members, b_levels): (Vec<usize>, Vec<f64>, Vec<usize>, Vec<f64>) =
        match orientation {
            0 => (
                a.members.clone(),
                a.levels.clone(),
                b.members.clone(),
                b.levels.clone(),
            ),
            1 => (
                a.members.clone(),
                a.levels.clone(),
                b.members.iter().rev().copied().collect(),
                b.levels.iter().rev().copied().collect(),
            ),
            2 => (
                a.members.iter().rev().copied().collect(),
                a.levels.iter().rev().copied().collect(),
                b.members.clone(),
                b.levels.clone(),
            ),
            _ => (
                a.members.iter().rev().copied().collect(),
                a.levels.iter().rev().copied().collect(),
                b.members.iter().rev().copied().collect(),
                b.levels.iter().rev().copied().collect(),
            ),
        };

    let mut members = a_members;
    members.extend(b_members);

    let mut levels = a_levels;
    levels.push(merge_level);
    levels.extend(b_levels);

    (members, levels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::DistanceType;
    use crash_analytics_stacktrace::{CoreFrame, Dialect, Frame, Thread};

    fn thread_with(names: &[&str]) -> Thread {
        let mut t = Thread::new(Dialect::Core);
        t.frames = names
            .iter()
            .map(|n| {
                Frame::Core(CoreFrame { function_name: Some(n.to_string()), ..Default::default() })
            })
            .collect();
        t
    }

    #[test]
    fn identical_pair_ends_up_adjacent_at_level_zero() {
        let threads = vec![
            thread_with(&["a", "b"]),
            thread_with(&["a", "b"]),
            thread_with(&["x", "y"]),
            thread_with(&["x", "y", "z"]),
        ];
        let matrix = DistanceMatrix::compute(&threads, DistanceType::Jaccard);
        let dendrogram = Dendrogram::build(&matrix, Linkage::Average);

        assert_eq!(dendrogram.order.len(), 4);
        assert_eq!(dendrogram.merge_levels.len(), 3);
        // Threads 0 and 1 are identical, so wherever they land in the final
        // order, they must be adjacent with a merge level of exactly 0.
        let pos0 = dendrogram.order.iter().position(|&x| x == 0).unwrap();
        let pos1 = dendrogram.order.iter().position(|&x| x == 1).unwrap();
        assert_eq!(pos0.abs_diff(pos1), 1);
        let boundary = pos0.min(pos1);
        assert_eq!(dendrogram.merge_levels[boundary], 0.0);
    }

    #[test]
    fn matches_worked_four_item_example() {
        // d(0,1)=1.0 d(0,2)=0.5 d(0,3)=0.0 d(1,2)=0.1 d(1,3)=0.3 d(2,3)=0.7
        let part = crate::matrix::Part {
            m: 4,
            n: 4,
            m_begin: 0,
            n_begin: 0,
            len: 6,
            dist_type: DistanceType::Jaccard,
            checksum: 0,
            values: vec![1.0, 0.5, 0.0, 0.1, 0.3, 0.7],
        };
        // Bypass checksum verification by computing it the same way `merge`
        // does, then constructing the matrix through the public API.
        let checksum = part
            .values
            .iter()
            .fold(0u64, |acc, v| acc.wrapping_mul(31).wrapping_add(v.to_bits()));
        let part = crate::matrix::Part { checksum, ..part };
        let matrix = DistanceMatrix::merge(4, DistanceType::Jaccard, vec![part]).unwrap();

        let dendrogram = Dendrogram::build(&matrix, Linkage::Average);
        assert_eq!(dendrogram.order, vec![0, 3, 1, 2]);
        assert_eq!(dendrogram.merge_levels, vec![0.0, 0.625, 0.1]);
    }

    #[test]
    fn cut_splits_runs_at_threshold() {
        let threads = vec![
            thread_with(&["a", "b"]),
            thread_with(&["a", "b"]),
            thread_with(&["x", "y"]),
            thread_with(&["x", "y"]),
        ];
        let matrix = DistanceMatrix::compute(&threads, DistanceType::Jaccard);
        let dendrogram = Dendrogram::build(&matrix, Linkage::Average);

        let clusters = dendrogram.cut(0.0, 1);
        assert_eq!(clusters.len(), 2);
        assert!(clusters.iter().all(|c| c.len() == 2));
    }

    #[test]
    fn cut_drops_runs_smaller_than_min_size() {
        let threads = vec![thread_with(&["a"]), thread_with(&["b"]), thread_with(&["c"])];
        let matrix = DistanceMatrix::compute(&threads, DistanceType::Jaccard);
        let dendrogram = Dendrogram::build(&matrix, Linkage::Average);

        let clusters = dendrogram.cut(0.0, 2);
        assert!(clusters.iter().all(|c| c.len() >= 2));
    }

    #[test]
    fn cut_at_infinity_and_negative_infinity_are_the_two_extremes() {
        let threads =
            vec![thread_with(&["a"]), thread_with(&["b"]), thread_with(&["c"]), thread_with(&["d"])];
        let matrix = DistanceMatrix::compute(&threads, DistanceType::Jaccard);
        let dendrogram = Dendrogram::build(&matrix, Linkage::Average);

        let one_cluster = dendrogram.cut(f64::INFINITY, 1);
        assert_eq!(one_cluster.len(), 1);
        assert_eq!(one_cluster[0].len(), 4);

        let singletons = dendrogram.cut(f64::NEG_INFINITY, 1);
        assert_eq!(singletons.len(), 4);
        assert!(singletons.iter().all(|c| c.len() == 1));
    }

    #[test]
    fn single_item_has_no_merges() {
        let threads = vec![thread_with(&["a"])];
        let matrix = DistanceMatrix::compute(&threads, DistanceType::Jaccard);
        let dendrogram = Dendrogram::build(&matrix, Linkage::Average);
        assert_eq!(dendrogram.order, vec![0]);
        assert!(dendrogram.merge_levels.is_empty());
    }
}
