use ndarray::Array2;
/// One agglomeration step: clusters `a` and `b` joined at `distance`.
/// Leaves are `0..n`; the cluster created by merge `m` is `n + m`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Merge {
    pub a: usize,
    pub b: usize,
    pub distance: f64,
    pub size: usize,
}
/// Average-linkage (UPGMA) agglomerative clustering.
#[derive(Clone, Debug)]
pub struct Dendrogram {
    leaves: usize,
    merges: Vec<Merge>,
}
impl Dendrogram {
    /// Builds the full tree from a symmetric distance matrix.
    pub fn average_linkage(distances: &Array2<f64>) -> Self {
        let n = distances.nrows();
        let mut d = distances.clone();
        let mut active: Vec<bool> = vec![true; n];
        let mut ids: Vec<usize> = (0..n).collect();
        let mut sizes: Vec<usize> = vec![1; n];
        let mut merges = Vec::with_capacity(n.saturating_sub(1));
        for step in 0..n.saturating_sub(1) {
            let mut best = (usize::MAX, usize::MAX, f64::INFINITY);
            for i in 0..n {
                if !active[i] {
                    continue;
                }
                for j in i + 1..n {
                    if active[j] && d[[i, j]] < best.2 {
                        best = (i, j, d[[i, j]]);
                    }
                }
            }
            let (i, j, distance) = best;
            if i == usize::MAX {
                break;
            }
            let merged = sizes[i] + sizes[j];
            for k in 0..n {
                if active[k] && k != i && k != j {
                    let value = (d[[i, k]] * sizes[i] as f64 + d[[j, k]] * sizes[j] as f64)
                        / merged as f64;
                    d[[i, k]] = value;
                    d[[k, i]] = value;
                }
            }
            merges.push(Merge {
                a: ids[i].min(ids[j]),
                b: ids[i].max(ids[j]),
                distance,
                size: merged,
            });
            active[j] = false;
            sizes[i] = merged;
            ids[i] = n + step;
        }
        Self { leaves: n, merges }
    }
    pub fn merges(&self) -> &[Merge] {
        &self.merges
    }
    /// Flat labels after applying every merge at or below `cutoff`.
    pub fn cut(&self, cutoff: f64) -> Vec<usize> {
        let n = self.leaves;
        let mut parent: Vec<usize> = (0..n + self.merges.len()).collect();
        for (m, merge) in self.merges.iter().enumerate() {
            if merge.distance <= cutoff {
                parent[merge.a] = n + m;
                parent[merge.b] = n + m;
            }
        }
        let root = |mut node: usize| {
            while parent[node] != node {
                node = parent[node];
            }
            node
        };
        let mut labels = Vec::with_capacity(n);
        let mut roots: Vec<usize> = Vec::new();
        for leaf in 0..n {
            let r = root(leaf);
            let label = match roots.iter().position(|&x| x == r) {
                Some(label) => label,
                None => {
                    roots.push(r);
                    roots.len() - 1
                }
            };
            labels.push(label);
        }
        labels
    }
    pub fn cluster_count(&self, cutoff: f64) -> usize {
        self.cut(cutoff).into_iter().max().map_or(0, |m| m + 1)
    }
}
