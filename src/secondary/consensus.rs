use std::ops::RangeInclusive;
use ndarray::Array2;
use rand::rngs::StdRng;
use super::hierarchy::Dendrogram;
/// A partitioning algorithm taking part in the consensus vote.
pub trait Clusterer {
    fn name(&self) -> &'static str;
    /// One label per row of `points`, in `0..k`.
    fn cluster(&self, points: &Array2<f64>, k: usize, rng: &mut StdRng) -> Vec<usize>;
}
/// How often each pair of points landed in the same cluster.
#[derive(Clone, Debug)]
pub struct CoAssociation {
    together: Array2<f64>,
    runs: usize,
}
impl CoAssociation {
    pub fn new(points: usize) -> Self {
        Self {
            together: Array2::zeros((points, points)),
            runs: 0,
        }
    }
    pub fn add(&mut self, labels: &[usize]) {
        for (i, a) in labels.iter().enumerate() {
            for (j, b) in labels.iter().enumerate().skip(i) {
                if a == b {
                    self.together[[i, j]] += 1.0;
                    if i != j {
                        self.together[[j, i]] += 1.0;
                    }
                }
            }
        }
        self.runs += 1;
    }
    pub fn runs(&self) -> usize {
        self.runs
    }
    /// Fraction of runs in which each pair was clustered together.
    pub fn matrix(&self) -> Array2<f64> {
        let runs = self.runs.max(1) as f64;
        self.together.mapv(|c| c / runs)
    }
    /// `1 - co-association`.
    pub fn distances(&self) -> Array2<f64> {
        self.matrix().mapv(|c| 1.0 - c)
    }
}
/// Runs every clusterer `runs_per_k` times for each candidate count, then cuts
/// the average-linkage tree of the co-association distances at `cutoff`.
/// `on_candidate` is told about each finished candidate count.
pub fn consensus_cluster_count(
    points: &Array2<f64>,
    clusterers: &[&dyn Clusterer],
    candidates: RangeInclusive<usize>,
    runs_per_k: usize,
    cutoff: f64,
    rng: &mut StdRng,
    mut on_candidate: impl FnMut(usize),
) -> usize {
    let n = points.nrows();
    let mut votes = CoAssociation::new(n);
    for k in candidates {
        if k > n {
            break;
        }
        for _ in 0..runs_per_k {
            for clusterer in clusterers {
                let labels = clusterer.cluster(points, k, rng);
                log::trace!("{} k={k}: {} labels", clusterer.name(), labels.len());
                votes.add(&labels);
            }
        }
        on_candidate(k);
    }
    if votes.runs() == 0 {
        return 1;
    }
    Dendrogram::average_linkage(&votes.distances()).cluster_count(cutoff)
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::secondary::kmeans::KMeans;
    use crate::secondary::spectral::SpectralClustering;
    use rand::SeedableRng;
    #[test]
    fn co_association_counts_pairs() {
        let mut votes = CoAssociation::new(3);
        votes.add(&[0, 0, 1]);
        votes.add(&[1, 0, 0]);
        let m = votes.matrix();
        assert_eq!(m[[0, 0]], 1.0);
        assert_eq!(m[[0, 1]], 0.5);
        assert_eq!(m[[1, 2]], 0.5);
        assert_eq!(m[[0, 2]], 0.0);
        assert_eq!(votes.distances()[[0, 2]], 1.0);
    }
    #[test]
    fn three_groups_are_found() {
        let points = Array2::from_shape_fn((45, 2), |(i, j)| {
            let centre = [(0.0, 0.0), (20.0, 0.0), (0.0, 20.0)][i / 15];
            let base = if j == 0 { centre.0 } else { centre.1 };
            base + ((i * 5 + j) % 7) as f64 * 0.1
        });
        let kmeans = KMeans::default();
        let spectral = SpectralClustering::default();
        let mut seen = Vec::new();
        let count = consensus_cluster_count(
            &points,
            &[&kmeans, &spectral],
            2..=6,
            3,
            0.7,
            &mut StdRng::seed_from_u64(11),
            |k| seen.push(k),
        );
        assert_eq!(count, 3);
        assert_eq!(seen, vec![2, 3, 4, 5, 6]);
    }
}
