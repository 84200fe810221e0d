//! Dense symmetric linear algebra on `ndarray` matrices.
use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::Rng;
/// Eigenvalues in descending order with matching eigenvector columns.
#[derive(Clone, Debug)]
pub struct SymmetricEigen {
    pub values: Array1<f64>,
    pub vectors: Array2<f64>,
}
const JACOBI_SWEEPS: usize = 64;
/// Cyclic Jacobi eigendecomposition of a symmetric matrix.
pub fn symmetric_eigen(matrix: &Array2<f64>) -> SymmetricEigen {
    let n = matrix.nrows();
    let mut a = matrix.clone();
    let mut v = Array2::<f64>::eye(n);
    let scale = a.iter().map(|x| x * x).sum::<f64>().sqrt().max(f64::MIN_POSITIVE);
    for _ in 0..JACOBI_SWEEPS {
        let mut off = 0.0;
        for p in 0..n {
            for q in p + 1..n {
                off += a[[p, q]] * a[[p, q]];
            }
        }
        if off.sqrt() <= 1e-14 * scale {
            break;
        }
        for p in 0..n {
            for q in p + 1..n {
                let apq = a[[p, q]];
                if apq.abs() <= f64::MIN_POSITIVE {
                    continue;
                }
                let theta = (a[[q, q]] - a[[p, p]]) / (2.0 * apq);
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;
                for k in 0..n {
                    let akp = a[[k, p]];
                    let akq = a[[k, q]];
                    a[[k, p]] = c * akp - s * akq;
                    a[[k, q]] = s * akp + c * akq;
                }
                for k in 0..n {
                    let apk = a[[p, k]];
                    let aqk = a[[q, k]];
                    a[[p, k]] = c * apk - s * aqk;
                    a[[q, k]] = s * apk + c * aqk;
                }
                for k in 0..n {
                    let vkp = v[[k, p]];
                    let vkq = v[[k, q]];
                    v[[k, p]] = c * vkp - s * vkq;
                    v[[k, q]] = s * vkp + c * vkq;
                }
            }
        }
    }
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| a[[j, j]].total_cmp(&a[[i, i]]));
    let values = order.iter().map(|&i| a[[i, i]]).collect();
    let vectors = v.select(Axis(1), &order);
    SymmetricEigen { values, vectors }
}
/// Lower Cholesky factor, or `None` when the matrix is not positive definite.
pub fn cholesky(matrix: &Array2<f64>) -> Option<Array2<f64>> {
    let n = matrix.nrows();
    let mut l = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in 0..=i {
            let mut sum = matrix[[i, j]];
            for k in 0..j {
                sum -= l[[i, k]] * l[[j, k]];
            }
            if i == j {
                if !(sum > 0.0) || !sum.is_finite() {
                    return None;
                }
                l[[i, i]] = sum.sqrt();
            } else {
                l[[i, j]] = sum / l[[j, j]];
            }
        }
    }
    Some(l)
}
/// Solves `L y = b` for lower-triangular `L`.
pub fn forward_substitute(l: &Array2<f64>, b: &[f64]) -> Vec<f64> {
    let n = b.len();
    let mut y = vec![0.0; n];
    for i in 0..n {
        let mut sum = b[i];
        for k in 0..i {
            sum -= l[[i, k]] * y[k];
        }
        y[i] = sum / l[[i, i]];
    }
    y
}
/// Gram-Schmidt on the columns of `q`, in place. Columns that collapse are
/// replaced by the matching unit vector.
pub fn orthonormalize_columns(q: &mut Array2<f64>) {
    let cols = q.ncols();
    for j in 0..cols {
        for _ in 0..2 {
            for i in 0..j {
                let dot = q.column(i).dot(&q.column(j));
                let prev = q.column(i).to_owned();
                q.column_mut(j).scaled_add(-dot, &prev);
            }
        }
        let norm = q.column(j).dot(&q.column(j)).sqrt();
        if norm > 1e-12 {
            q.column_mut(j).mapv_inplace(|x| x / norm);
        } else {
            q.column_mut(j).fill(0.0);
            if j < q.nrows() {
                q[[j, j]] = 1.0;
            }
        }
    }
}
/// The `k` leading eigenvectors of a symmetric positive semi-definite matrix by
/// subspace iteration from a random start, refined with a Rayleigh-Ritz step.
pub fn leading_eigenvectors(
    matrix: &Array2<f64>,
    k: usize,
    iterations: usize,
    rng: &mut StdRng,
) -> Array2<f64> {
    let n = matrix.nrows();
    let k = k.min(n);
    let mut q = Array2::from_shape_fn((n, k), |_| rng.gen::<f64>() - 0.5);
    orthonormalize_columns(&mut q);
    for _ in 0..iterations {
        let mut next = matrix.dot(&q);
        orthonormalize_columns(&mut next);
        let settled = (&next - &q).iter().all(|d| d.abs() < 1e-10);
        q = next;
        if settled {
            break;
        }
    }
    let projected = q.t().dot(&matrix.dot(&q));
    let ritz = symmetric_eigen(&projected);
    q.dot(&ritz.vectors)
}
#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::SeedableRng;
    #[test]
    fn eigen_of_known_matrix() {
        let m = array![[2.0, 1.0, 0.0], [1.0, 2.0, 0.0], [0.0, 0.0, 5.0]];
        let eig = symmetric_eigen(&m);
        let expected = [5.0, 3.0, 1.0];
        for (value, want) in eig.values.iter().zip(expected) {
            assert!((value - want).abs() < 1e-10);
        }
        for j in 0..3 {
            let v = eig.vectors.column(j).to_owned();
            let mv = m.dot(&v);
            for i in 0..3 {
                assert!((mv[i] - eig.values[j] * v[i]).abs() < 1e-9);
            }
        }
    }
    #[test]
    fn cholesky_reconstructs_matrix() {
        let m = array![[4.0, 2.0], [2.0, 3.0]];
        let l = cholesky(&m).unwrap();
        let back = l.dot(&l.t());
        for (a, b) in back.iter().zip(m.iter()) {
            assert!((a - b).abs() < 1e-12);
        }
        assert!(cholesky(&array![[1.0, 2.0], [2.0, 1.0]]).is_none());
        let y = forward_substitute(&l, &[2.0, 1.0]);
        assert!((y[0] - 1.0).abs() < 1e-12);
    }
    #[test]
    fn subspace_iteration_matches_jacobi() {
        let m = array![
            [4.0, 1.0, 0.0, 0.0],
            [1.0, 3.0, 0.5, 0.0],
            [0.0, 0.5, 1.0, 0.2],
            [0.0, 0.0, 0.2, 0.5]
        ];
        let full = symmetric_eigen(&m);
        let mut rng = StdRng::seed_from_u64(7);
        let top = leading_eigenvectors(&m, 2, 500, &mut rng);
        for j in 0..2 {
            let dot = top.column(j).dot(&full.vectors.column(j)).abs();
            assert!((dot - 1.0).abs() < 1e-6, "column {j}: {dot}");
        }
    }
}
