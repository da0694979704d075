//! Shapiro-Wilk W test (Royston 1992/1995 approximation, AS R94).
//!
//! Exact p-value for n = 3; polynomial approximations otherwise.

use statrs::distribution::{ContinuousCDF, Normal};

/// W statistic and p-value.
#[derive(Debug, Clone, Copy)]
pub struct ShapiroWilkResult {
    /// 0 < W ≤ 1; values near 1 suggest normality.
    pub w: f64,
    pub p_value: f64,
}

// Royston polynomial coefficients
const C1: [f64; 6] = [0.0, 0.221157, -0.147981, -2.07119, 4.434685, -2.706056];
const C2: [f64; 6] = [0.0, 0.042981, -0.293762, -1.752461, 5.682633, -3.582633];
const C3: [f64; 4] = [0.544, -0.39978, 0.025054, -6.714e-4];
const C4: [f64; 4] = [1.3822, -0.77857, 0.062767, -0.0020322];
const C5: [f64; 4] = [-1.5861, -0.31082, -0.083751, 0.0038915];
const C6: [f64; 3] = [-0.4803, -0.082676, 0.0030302];
const G: [f64; 2] = [-2.273, 0.459];

/// Run the test on finite values.
///
/// Returns `None` for n < 3, n > 5000, or a sample without spread.
pub fn test(values: &[f64]) -> Option<ShapiroWilkResult> {
    let n = values.len();
    if !(3..=5000).contains(&n) {
        return None;
    }

    let mut x = values.to_vec();
    x.sort_by(|a, b| a.total_cmp(b));
    if x[n - 1] - x[0] < 1e-300 {
        return None;
    }

    let normal = Normal::new(0.0, 1.0).ok()?;

    if n == 3 {
        return Some(exact_n3(&x));
    }

    let half = n / 2;
    let a = coefficients(n, half, &normal)?;

    let mean = x.iter().sum::<f64>() / n as f64;
    let ss: f64 = x.iter().map(|v| (v - mean).powi(2)).sum();
    let sa: f64 = (0..half).map(|i| a[i] * (x[n - 1 - i] - x[i])).sum();
    let w = (sa * sa) / ss;
    if !(0.0..=1.0 + 1e-10).contains(&w) {
        return None;
    }
    let w = w.min(1.0);

    Some(ShapiroWilkResult {
        w,
        p_value: p_value(w, n, &normal).clamp(0.0, 1.0),
    })
}

fn exact_n3(x: &[f64]) -> ShapiroWilkResult {
    let mean = (x[0] + x[1] + x[2]) / 3.0;
    let ss: f64 = x.iter().map(|v| (v - mean).powi(2)).sum();
    let numerator = std::f64::consts::FRAC_1_SQRT_2 * (x[2] - x[0]);
    let w = (numerator * numerator / ss).clamp(0.75, 1.0);
    let p = 1.0 - (6.0 / std::f64::consts::PI) * w.sqrt().acos();
    ShapiroWilkResult {
        w,
        p_value: p.clamp(0.0, 1.0),
    }
}

/// c[0] + c[1]·x + c[2]·x² + ... by Horner's method.
fn poly(c: &[f64], x: f64) -> f64 {
    c.iter().rev().fold(0.0, |acc, &ci| acc * x + ci)
}

/// Coefficients a_1..a_{n/2} from Blom's approximation of normal order statistics.
fn coefficients(n: usize, half: usize, normal: &Normal) -> Option<Vec<f64>> {
    let m: Vec<f64> = (0..half)
        .map(|i| normal.inverse_cdf((i as f64 + 1.0 - 0.375) / (n as f64 + 0.25)))
        .collect();
    let summ2 = 2.0 * m.iter().map(|v| v * v).sum::<f64>();
    let ssumm2 = summ2.sqrt();
    let rsn = 1.0 / (n as f64).sqrt();

    let mut a = vec![0.0; half];
    let a1 = poly(&C1, rsn) - m[0] / ssumm2;

    let (corrected, fac_sq, one_minus) = if n <= 5 {
        (1, summ2 - 2.0 * m[0] * m[0], 1.0 - 2.0 * a1 * a1)
    } else {
        let a2 = -m[1] / ssumm2 + poly(&C2, rsn);
        a[1] = a2;
        (
            2,
            summ2 - 2.0 * m[0] * m[0] - 2.0 * m[1] * m[1],
            1.0 - 2.0 * a1 * a1 - 2.0 * a2 * a2,
        )
    };
    if fac_sq <= 0.0 || one_minus <= 0.0 {
        return None;
    }
    a[0] = a1;
    let fac = (fac_sq / one_minus).sqrt();
    for i in corrected..half {
        a[i] = -m[i] / fac;
    }
    Some(a)
}

fn p_value(w: f64, n: usize, normal: &Normal) -> f64 {
    let nf = n as f64;
    let w1 = 1.0 - w;
    if w1 <= 0.0 {
        return 1.0;
    }
    let y = w1.ln();

    let z = if n <= 11 {
        let gamma = poly(&G, nf);
        if y >= gamma {
            return 0.0;
        }
        let y2 = -(gamma - y).ln();
        let m = poly(&C3, nf);
        let s = poly(&C4, nf).exp();
        (y2 - m) / s
    } else {
        let ln_n = nf.ln();
        let m = poly(&C5, ln_n);
        let s = poly(&C6, ln_n).exp();
        (y - m) / s
    };
    1.0 - normal.cdf(z)
}
