//! Dense linear algebra for small covariance matrices.

/// Column means of row-major data.
pub fn column_means(rows: &[Vec<f64>], n_cols: usize) -> Vec<f64> {
    let n = rows.len() as f64;
    let mut means = vec![0.0; n_cols];
    for row in rows {
        for (m, v) in means.iter_mut().zip(row) {
            *m += v;
        }
    }
    means.iter_mut().for_each(|m| *m /= n);
    means
}

/// Sample covariance matrix (n - 1 denominator).
pub fn covariance(rows: &[Vec<f64>], means: &[f64]) -> Vec<Vec<f64>> {
    let p = means.len();
    let denom = rows.len() as f64 - 1.0;
    let mut cov = vec![vec![0.0; p]; p];
    for row in rows {
        for i in 0..p {
            let di = row[i] - means[i];
            for j in i..p {
                cov[i][j] += di * (row[j] - means[j]);
            }
        }
    }
    for i in 0..p {
        for j in i..p {
            cov[i][j] /= denom;
            cov[j][i] = cov[i][j];
        }
    }
    cov
}

/// Inverse and determinant by Gauss-Jordan elimination with partial pivoting.
///
/// Returns `None` when a pivot is numerically zero relative to the matrix
/// scale (the matrix is singular).
pub fn invert(matrix: &[Vec<f64>]) -> Option<(Vec<Vec<f64>>, f64)> {
    let n = matrix.len();
    let scale = matrix
        .iter()
        .flatten()
        .fold(0.0_f64, |acc, v| acc.max(v.abs()));
    if n == 0 || scale == 0.0 || !scale.is_finite() {
        return None;
    }
    let tolerance = scale * 1e-12;

    let mut a: Vec<Vec<f64>> = matrix.to_vec();
    let mut inv: Vec<Vec<f64>> = (0..n)
        .map(|i| (0..n).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
        .collect();
    let mut det = 1.0;

    for col in 0..n {
        let pivot_row = (col..n).max_by(|&x, &y| a[x][col].abs().total_cmp(&a[y][col].abs()))?;
        let pivot = a[pivot_row][col];
        if pivot.abs() <= tolerance {
            return None;
        }
        if pivot_row != col {
            a.swap(pivot_row, col);
            inv.swap(pivot_row, col);
            det = -det;
        }
        det *= pivot;

        for j in 0..n {
            a[col][j] /= pivot;
            inv[col][j] /= pivot;
        }
        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = a[row][col];
            if factor == 0.0 {
                continue;
            }
            for j in 0..n {
                a[row][j] -= factor * a[col][j];
                inv[row][j] -= factor * inv[col][j];
            }
        }
    }

    (det.is_finite() && det != 0.0).then_some((inv, det))
}

/// Inverse and determinant of a covariance matrix.
///
/// Σ is rescaled to its correlation matrix before elimination so the
/// singularity test does not depend on the units of each variable.
/// A zero or non-finite variance makes Σ singular.
pub fn invert_covariance(cov: &[Vec<f64>]) -> Option<(Vec<Vec<f64>>, f64)> {
    let sd: Vec<f64> = cov
        .iter()
        .enumerate()
        .map(|(i, row)| row.get(i).copied().unwrap_or(0.0).sqrt())
        .collect();
    if sd.iter().any(|s| !(s.is_finite() && *s > 0.0)) {
        return None;
    }
    let corr: Vec<Vec<f64>> = cov
        .iter()
        .enumerate()
        .map(|(i, row)| row.iter().enumerate().map(|(j, v)| v / (sd[i] * sd[j])).collect())
        .collect();
    let (corr_inv, corr_det) = invert(&corr)?;
    let inverse = corr_inv
        .iter()
        .enumerate()
        .map(|(i, row)| row.iter().enumerate().map(|(j, v)| v / (sd[i] * sd[j])).collect())
        .collect();
    let det = corr_det * sd.iter().map(|s| s * s).product::<f64>();
    Some((inverse, det))
}

/// xᵀ M x for a square matrix `m`.
pub fn quadratic_form(m: &[Vec<f64>], x: &[f64]) -> f64 {
    m.iter()
        .zip(x)
        .map(|(row, xi)| xi * row.iter().zip(x).map(|(mij, xj)| mij * xj).sum::<f64>())
        .sum()
}

pub fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum::<f64>().sqrt()
}
