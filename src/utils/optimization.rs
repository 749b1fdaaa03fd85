//! Derivative-free minimization for ARIMA parameter estimation.

use std::cmp::Ordering;

/// Result of Nelder-Mead optimization.
#[derive(Debug, Clone)]
pub struct NelderMeadResult {
    /// The optimal point found.
    pub optimal_point: Vec<f64>,
    /// The objective function value at the optimal point.
    pub optimal_value: f64,
    /// Number of iterations performed.
    pub iterations: usize,
    /// Number of objective evaluations.
    pub evaluations: usize,
    /// Whether the algorithm converged.
    pub converged: bool,
}

/// Configuration for Nelder-Mead optimization.
#[derive(Debug, Clone)]
pub struct NelderMeadConfig {
    /// Maximum number of iterations.
    pub max_iter: usize,
    /// Convergence tolerance on both objective spread and simplex size.
    pub tolerance: f64,
    /// Reflection coefficient (default: 1.0).
    pub alpha: f64,
    /// Expansion coefficient (default: 2.0).
    pub gamma: f64,
    /// Contraction coefficient (default: 0.5).
    pub rho: f64,
    /// Shrinkage coefficient (default: 0.5).
    pub sigma: f64,
    /// Initial simplex step size, relative to non-zero coordinates (default: 0.05).
    pub initial_step: f64,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            tolerance: 1e-8,
            alpha: 1.0,
            gamma: 2.0,
            rho: 0.5,
            sigma: 0.5,
            initial_step: 0.05,
        }
    }
}

impl NelderMeadConfig {
    /// Set the iteration budget.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set the convergence tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }
}

/// Box constraints, one `(min, max)` pair per leading coordinate.
struct Bounds<'a>(Option<&'a [(f64, f64)]>);

impl Bounds<'_> {
    fn clamp(&self, mut point: Vec<f64>) -> Vec<f64> {
        if let Some(bounds) = self.0 {
            for (x, &(lo, hi)) in point.iter_mut().zip(bounds.iter()) {
                *x = x.clamp(lo, hi);
            }
        }
        point
    }
}

/// A simplex vertex and its objective value.
#[derive(Debug, Clone)]
struct Vertex {
    point: Vec<f64>,
    value: f64,
}

/// Counts objective evaluations and maps NaN to +inf so that invalid
/// parameter regions are never preferred.
struct Objective<F> {
    f: F,
    evaluations: usize,
}

impl<F: Fn(&[f64]) -> f64> Objective<F> {
    fn vertex(&mut self, point: Vec<f64>) -> Vertex {
        self.evaluations += 1;
        let value = (self.f)(&point);
        Vertex {
            point,
            value: if value.is_nan() { f64::INFINITY } else { value },
        }
    }
}

/// Point on the line through `from` and `to`: `from + t * (to - from)`.
fn along(from: &[f64], to: &[f64], t: f64) -> Vec<f64> {
    from.iter().zip(to.iter()).map(|(a, b)| a + t * (b - a)).collect()
}

/// Minimize `objective` from `initial` with the Nelder-Mead simplex method.
///
/// `bounds` clamps the leading coordinates of every trial point; coordinates
/// past the end of `bounds` are free. NaN objective values count as `+inf`.
///
/// ```
/// use calendar_arimax::utils::optimization::{nelder_mead, NelderMeadConfig};
///
/// // The second coordinate is free, the first is held inside [-1, 1].
/// let result = nelder_mead(
///     |x| (x[0] - 2.0).powi(2) + (x[1] - 3.0).powi(2),
///     &[0.0, 0.0],
///     Some(&[(-1.0, 1.0)]),
///     NelderMeadConfig::default(),
/// );
///
/// assert!((result.optimal_point[0] - 1.0).abs() < 0.01);
/// assert!((result.optimal_point[1] - 3.0).abs() < 0.01);
/// ```
pub fn nelder_mead<F>(
    objective: F,
    initial: &[f64],
    bounds: Option<&[(f64, f64)]>,
    config: NelderMeadConfig,
) -> NelderMeadResult
where
    F: Fn(&[f64]) -> f64,
{
    let n = initial.len();
    if n == 0 {
        return NelderMeadResult {
            optimal_point: vec![],
            optimal_value: f64::NAN,
            iterations: 0,
            evaluations: 0,
            converged: false,
        };
    }

    let bounds = Bounds(bounds);
    let mut objective = Objective {
        f: objective,
        evaluations: 0,
    };

    let mut simplex: Vec<Vertex> = Vec::with_capacity(n + 1);
    simplex.push(objective.vertex(bounds.clamp(initial.to_vec())));
    for i in 0..n {
        let mut point = initial.to_vec();
        point[i] += if initial[i].abs() > 1e-10 {
            config.initial_step * initial[i].abs()
        } else {
            config.initial_step
        };
        simplex.push(objective.vertex(bounds.clamp(point)));
    }

    let by_value = |a: &Vertex, b: &Vertex| a.value.partial_cmp(&b.value).unwrap_or(Ordering::Equal);

    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iter {
        iterations += 1;
        simplex.sort_by(by_value);

        let best = simplex[0].value;
        let second_worst = simplex[n - 1].value;
        let worst = simplex[n].value;

        if worst - best < config.tolerance {
            converged = true;
            break;
        }

        let mut centroid = vec![0.0; n];
        for vertex in &simplex[..n] {
            for (c, x) in centroid.iter_mut().zip(vertex.point.iter()) {
                *c += x / n as f64;
            }
        }

        let spread = simplex
            .iter()
            .map(|v| {
                v.point
                    .iter()
                    .zip(centroid.iter())
                    .map(|(x, c)| (x - c).powi(2))
                    .sum::<f64>()
                    .sqrt()
            })
            .fold(0.0, f64::max);
        if spread < config.tolerance {
            converged = true;
            break;
        }

        let reflected =
            objective.vertex(bounds.clamp(along(&centroid, &simplex[n].point, -config.alpha)));

        if reflected.value < best {
            let expanded =
                objective.vertex(bounds.clamp(along(&centroid, &reflected.point, config.gamma)));
            simplex[n] = if expanded.value < reflected.value {
                expanded
            } else {
                reflected
            };
            continue;
        }

        if reflected.value < second_worst {
            simplex[n] = reflected;
            continue;
        }

        let contracted = if reflected.value < worst {
            let outside =
                objective.vertex(bounds.clamp(along(&centroid, &reflected.point, config.rho)));
            (outside.value <= reflected.value).then_some(outside)
        } else {
            let inside =
                objective.vertex(bounds.clamp(along(&centroid, &simplex[n].point, config.rho)));
            (inside.value < worst).then_some(inside)
        };

        if let Some(vertex) = contracted {
            simplex[n] = vertex;
            continue;
        }

        let anchor = simplex[0].point.clone();
        for vertex in simplex.iter_mut().skip(1) {
            let point = bounds.clamp(along(&anchor, &vertex.point, config.sigma));
            *vertex = objective.vertex(point);
        }
    }

    simplex.sort_by(by_value);
    let best = simplex.swap_remove(0);

    NelderMeadResult {
        optimal_point: best.point,
        optimal_value: best.value,
        iterations,
        evaluations: objective.evaluations,
        converged,
    }
}
