//! Ordinary Least Squares (OLS) regression on ordered, named regressors.
//!
//! Used to estimate the regression part of a regression-with-ARIMA-errors
//! model. Column order is part of the fitted model: prediction requires the
//! same names in the same order.

use crate::error::{ForecastError, Result};

/// Named regressor columns with a fixed order and a common row count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Regressors {
    rows: usize,
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
}

impl Regressors {
    /// Empty set of columns for `rows` observations.
    pub fn with_rows(rows: usize) -> Self {
        Self {
            rows,
            names: Vec::new(),
            columns: Vec::new(),
        }
    }

    /// Append a column. Names must be unique and lengths must match.
    pub fn push(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<()> {
        let name = name.into();
        if values.len() != self.rows {
            return Err(ForecastError::DimensionMismatch {
                expected: self.rows,
                got: values.len(),
            });
        }
        if self.names.contains(&name) {
            return Err(ForecastError::InvalidParameter(format!(
                "duplicate regressor '{name}'"
            )));
        }
        self.names.push(name);
        self.columns.push(values);
        Ok(())
    }

    /// Number of observations.
    pub fn num_rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column names in order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Column values by name.
    pub fn get(&self, name: &str) -> Option<&[f64]> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.columns[i].as_slice())
    }

    /// The same columns minus those named in `dropped`, order preserved.
    pub fn without(&self, dropped: &[String]) -> Regressors {
        let (names, columns) = self
            .names
            .iter()
            .zip(self.columns.iter())
            .filter(|(n, _)| !dropped.contains(*n))
            .map(|(n, c)| (n.clone(), c.clone()))
            .unzip();
        Regressors {
            rows: self.rows,
            names,
            columns,
        }
    }

    /// Iterate `(name, values)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.names
            .iter()
            .zip(self.columns.iter())
            .map(|(n, c)| (n.as_str(), c.as_slice()))
    }
}

/// OLS regression coefficients and intercept.
#[derive(Debug, Clone)]
pub struct OLSResult {
    /// Regression coefficients (one per regressor).
    pub coefficients: Vec<f64>,
    /// Intercept term.
    pub intercept: f64,
    /// Names of regressors in order.
    pub regressor_names: Vec<String>,
}

impl OLSResult {
    /// Predict `intercept + X @ coefficients` for new regressor values.
    ///
    /// # Errors
    /// [`ForecastError::SchemaMismatch`] when the column names or their order
    /// differ from the ones used for fitting.
    pub fn predict(&self, regressors: &Regressors) -> Result<Vec<f64>> {
        if regressors.names() != self.regressor_names.as_slice() {
            return Err(ForecastError::SchemaMismatch {
                expected: self.regressor_names.join(", "),
                got: regressors.names().join(", "),
            });
        }

        let mut predictions = vec![self.intercept; regressors.num_rows()];
        for (coef, (_, values)) in self.coefficients.iter().zip(regressors.iter()) {
            for (pred, x) in predictions.iter_mut().zip(values.iter()) {
                *pred += coef * x;
            }
        }

        Ok(predictions)
    }

    /// Get the number of regressors.
    pub fn num_regressors(&self) -> usize {
        self.coefficients.len()
    }

    /// Coefficient for a named regressor.
    pub fn coefficient(&self, name: &str) -> Option<f64> {
        self.regressor_names
            .iter()
            .position(|n| n == name)
            .map(|i| self.coefficients[i])
    }
}

/// Fit OLS regression: y = intercept + X @ coefficients
///
/// Uses Cholesky decomposition to solve the normal equations. A small ridge
/// term keeps the system solvable when an indicator column is all zeros
/// (a category absent from the training window); its coefficient then
/// shrinks to zero. Columns whose sum reproduces the intercept are not
/// identified and must be removed by the caller.
pub fn ols_fit(y: &[f64], regressors: &Regressors) -> Result<OLSResult> {
    let n = y.len();

    if n == 0 {
        return Err(ForecastError::InsufficientData { needed: 1, got: 0 });
    }

    if regressors.num_rows() != n {
        return Err(ForecastError::DimensionMismatch {
            expected: n,
            got: regressors.num_rows(),
        });
    }

    if regressors.is_empty() {
        let intercept = y.iter().sum::<f64>() / n as f64;
        return Ok(OLSResult {
            coefficients: vec![],
            intercept,
            regressor_names: vec![],
        });
    }

    let k = regressors.num_columns();
    let num_params = k + 1;

    // Normal equations over the design [1, x1, x2, ...]
    let mut xtx = vec![vec![0.0; num_params]; num_params];
    let mut xty = vec![0.0; num_params];

    let x_cols: Vec<&[f64]> = regressors.iter().map(|(_, c)| c).collect();

    for obs in 0..n {
        let y_obs = y[obs];

        xtx[0][0] += 1.0;
        for j in 0..k {
            let xj = x_cols[j][obs];
            xtx[0][j + 1] += xj;
            xtx[j + 1][0] += xj;
        }
        for i in 0..k {
            let xi = x_cols[i][obs];
            if xi == 0.0 {
                continue;
            }
            for j in 0..k {
                xtx[i + 1][j + 1] += xi * x_cols[j][obs];
            }
        }

        xty[0] += y_obs;
        for i in 0..k {
            xty[i + 1] += x_cols[i][obs] * y_obs;
        }
    }

    for i in 0..num_params {
        xtx[i][i] += 1e-8;
    }

    let beta = solve_symmetric(&xtx, &xty).ok_or_else(|| {
        ForecastError::ComputationError(
            "OLS regression failed: matrix not positive definite".into(),
        )
    })?;

    Ok(OLSResult {
        intercept: beta[0],
        coefficients: beta[1..].to_vec(),
        regressor_names: regressors.names().to_vec(),
    })
}

/// Solve symmetric positive definite system using Cholesky decomposition.
///
/// Solves A @ x = b where A is symmetric positive definite.
fn solve_symmetric(a: &[Vec<f64>], b: &[f64]) -> Option<Vec<f64>> {
    let n = b.len();
    if n == 0 || a.len() != n {
        return None;
    }

    // A = L @ L'
    let mut l = vec![vec![0.0; n]; n];

    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[i][j];
            for k in 0..j {
                sum -= l[i][k] * l[j][k];
            }

            if i == j {
                if sum <= 0.0 {
                    return None;
                }
                l[i][j] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }

    // L @ y = b
    let mut y = vec![0.0; n];
    for i in 0..n {
        let mut sum = b[i];
        for j in 0..i {
            sum -= l[i][j] * y[j];
        }
        y[i] = sum / l[i][i];
    }

    // L' @ x = y
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = y[i];
        for j in (i + 1)..n {
            sum -= l[j][i] * x[j];
        }
        x[i] = sum / l[i][i];
    }

    Some(x)
}

/// Compute residuals after removing OLS fit (y - y_hat).
pub fn ols_residuals(y: &[f64], ols_result: &OLSResult, regressors: &Regressors) -> Result<Vec<f64>> {
    let predictions = ols_result.predict(regressors)?;

    if predictions.len() != y.len() {
        return Err(ForecastError::DimensionMismatch {
            expected: y.len(),
            got: predictions.len(),
        });
    }

    Ok(y.iter()
        .zip(predictions.iter())
        .map(|(yi, pi)| yi - pi)
        .collect())
}
