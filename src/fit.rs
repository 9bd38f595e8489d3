use thiserror::Error;

/// Why a data set cannot support a line fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Insufficiency {
    #[error("need at least two points, got {0}")]
    TooFewPoints(usize),
    #[error("all x values are equal")]
    ZeroVariance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FitError {
    #[error("insufficient data: {0}")]
    InsufficientData(#[from] Insufficiency),
    #[error("x has {x} values but y has {y}")]
    LengthMismatch { x: usize, y: usize },
}

/// Result of an ordinary least-squares line fit `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Pearson correlation coefficient. Zero when y is constant.
    pub r: f64,
}

impl LinearFit {
    #[must_use]
    pub fn r_squared(&self) -> f64 {
        self.r * self.r
    }

    #[must_use]
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    /// x where the fitted line crosses zero, `None` for a horizontal line.
    #[must_use]
    pub fn x_intercept(&self) -> Option<f64> {
        if self.slope == 0.0 {
            return None;
        }
        Some(-self.intercept / self.slope)
    }
}

/// Fit `y = slope * x + intercept` minimising the squared vertical residuals.
pub fn linear_fit(x: &[f64], y: &[f64]) -> Result<LinearFit, FitError> {
    if x.len() != y.len() {
        return Err(FitError::LengthMismatch {
            x: x.len(),
            y: y.len(),
        });
    }
    let n = x.len();
    if n < 2 {
        return Err(Insufficiency::TooFewPoints(n).into());
    }

    // Centred sums keep the normal equations well conditioned for
    // x ~ 1e14 (optical frequencies).
    let x_mean = x.iter().sum::<f64>() / n as f64;
    let y_mean = y.iter().sum::<f64>() / n as f64;
    let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
    for (&xi, &yi) in x.iter().zip(y) {
        let dx = xi - x_mean;
        let dy = yi - y_mean;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }

    // Equal x values that are not exactly representable leave a rounding
    // residue in the centred sum instead of an exact zero.
    let round_off = (f64::EPSILON * x_mean.abs()).powi(2) * n as f64;
    if x.iter().all(|&v| v == x[0]) || sxx <= round_off {
        return Err(Insufficiency::ZeroVariance.into());
    }

    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;
    let r = if syy == 0.0 {
        0.0
    } else {
        (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0)
    };
    Ok(LinearFit {
        slope,
        intercept,
        r,
    })
}

/// Arithmetic mean, `None` for an empty slice.
#[must_use]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}
