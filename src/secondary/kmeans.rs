use ndarray::{Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::Rng;
use super::consensus::Clusterer;
/// Lloyd's k-means with k-means++ seeding.
#[derive(Clone, Debug)]
pub struct KMeans {
    pub max_iterations: usize,
}
impl Default for KMeans {
    fn default() -> Self {
        Self { max_iterations: 100 }
    }
}
impl Clusterer for KMeans {
    fn name(&self) -> &'static str {
        "kmeans"
    }
    fn cluster(&self, points: &Array2<f64>, k: usize, rng: &mut StdRng) -> Vec<usize> {
        let centroids = plus_plus_centroids(points, k, rng);
        lloyd(points, centroids, self.max_iterations).0
    }
}
fn squared_distance(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}
/// k-means++: each new centroid is drawn with probability proportional to the
/// squared distance to the nearest centroid chosen so far.
pub fn plus_plus_centroids(points: &Array2<f64>, k: usize, rng: &mut StdRng) -> Array2<f64> {
    let n = points.nrows();
    let k = k.min(n).max(1);
    let mut centroids = Array2::zeros((k, points.ncols()));
    if n == 0 {
        return centroids;
    }
    let first = rng.gen_range(0..n);
    centroids.row_mut(0).assign(&points.row(first));
    let mut nearest: Vec<f64> = (0..n)
        .map(|i| squared_distance(points.row(i), points.row(first)))
        .collect();
    for c in 1..k {
        let total: f64 = nearest.iter().sum();
        let chosen = if total > 0.0 {
            let mut target = rng.gen::<f64>() * total;
            let mut chosen = n - 1;
            for (i, d) in nearest.iter().enumerate() {
                if target < *d {
                    chosen = i;
                    break;
                }
                target -= d;
            }
            chosen
        } else {
            rng.gen_range(0..n)
        };
        centroids.row_mut(c).assign(&points.row(chosen));
        for (i, d) in nearest.iter_mut().enumerate() {
            *d = d.min(squared_distance(points.row(i), points.row(chosen)));
        }
    }
    centroids
}
/// Runs Lloyd iterations from `centroids`; returns labels and final centroids.
/// An emptied cluster keeps its previous centroid.
pub fn lloyd(
    points: &Array2<f64>,
    mut centroids: Array2<f64>,
    max_iterations: usize,
) -> (Vec<usize>, Array2<f64>) {
    let n = points.nrows();
    let k = centroids.nrows();
    let mut labels = vec![usize::MAX; n];
    for _ in 0..max_iterations.max(1) {
        let mut changed = false;
        for (i, label) in labels.iter_mut().enumerate() {
            let best = nearest_centroid(points.row(i), &centroids);
            if *label != best {
                *label = best;
                changed = true;
            }
        }
        if !changed {
            break;
        }
        let mut sums = Array2::<f64>::zeros(centroids.dim());
        let mut counts = vec![0usize; k];
        for (i, &label) in labels.iter().enumerate() {
            let mut row = sums.row_mut(label);
            row += &points.row(i);
            counts[label] += 1;
        }
        for (c, &count) in counts.iter().enumerate() {
            if count > 0 {
                let mean = &sums.row(c) / count as f64;
                centroids.row_mut(c).assign(&mean);
            }
        }
    }
    (labels, centroids)
}
pub fn nearest_centroid(point: ArrayView1<f64>, centroids: &Array2<f64>) -> usize {
    let mut best = 0;
    let mut best_distance = f64::INFINITY;
    for (c, centroid) in centroids.outer_iter().enumerate() {
        let d = squared_distance(point, centroid);
        if d < best_distance {
            best_distance = d;
            best = c;
        }
    }
    best
}
