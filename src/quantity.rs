use std::fmt;

/// Marker printed (and written to CSV) for a quantity that is not defined.
pub const UNDEFINED_MARKER: &str = "N/A";

// ---------------------------------------------------------------------------
// Derived – a computed scalar that may be undefined
// ---------------------------------------------------------------------------

/// A derived physical scalar, or the reason it cannot be computed.
///
/// Reducers never produce NaN or infinities: anything non-finite is turned
/// into `Undefined` by [`Derived::from_finite`].
#[derive(Debug, Clone, PartialEq)]
pub enum Derived {
    Value(f64),
    Undefined { reason: String },
}

impl Derived {
    pub fn undefined(reason: impl Into<String>) -> Self {
        Derived::Undefined {
            reason: reason.into(),
        }
    }

    /// Wrap `value`, or mark it undefined if it is NaN or infinite.
    pub fn from_finite(value: f64, what: &str) -> Self {
        if value.is_finite() {
            Derived::Value(value)
        } else {
            Derived::undefined(format!("{what} is not finite ({value})"))
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Derived::Value(v) => Some(*v),
            Derived::Undefined { .. } => None,
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, Derived::Value(_))
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Derived::Value(_) => None,
            Derived::Undefined { reason } => Some(reason),
        }
    }

    /// Apply `f` to a defined value; the result is re-checked for finiteness.
    pub fn map(self, what: &str, f: impl FnOnce(f64) -> f64) -> Self {
        match self {
            Derived::Value(v) => Derived::from_finite(f(v), what),
            undefined => undefined,
        }
    }

    /// Chain a computation that can itself be undefined.
    pub fn and_then(self, f: impl FnOnce(f64) -> Derived) -> Self {
        match self {
            Derived::Value(v) => f(v),
            undefined => undefined,
        }
    }

    /// Render with a fixed format, or the undefined marker.
    pub fn format_with(&self, f: impl Fn(f64) -> String) -> String {
        match self {
            Derived::Value(v) => f(*v),
            Derived::Undefined { .. } => UNDEFINED_MARKER.to_string(),
        }
    }
}

impl<E: fmt::Display> From<Result<f64, E>> for Derived {
    fn from(result: Result<f64, E>) -> Self {
        match result {
            Ok(v) => Derived::from_finite(v, "value"),
            Err(e) => Derived::undefined(e.to_string()),
        }
    }
}

impl fmt::Display for Derived {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Derived::Value(v) => match f.precision() {
                Some(p) => write!(f, "{v:.p$}"),
                None => write!(f, "{v}"),
            },
            Derived::Undefined { .. } => f.write_str(UNDEFINED_MARKER),
        }
    }
}

// ---------------------------------------------------------------------------
// Quantity – a named derived value for reporting
// ---------------------------------------------------------------------------

/// How a quantity is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notation {
    Fixed(usize),
    Scientific(usize),
}

/// A named, unit-carrying derived quantity.
#[derive(Debug, Clone, PartialEq)]
pub struct Quantity {
    pub name: String,
    pub unit: &'static str,
    pub value: Derived,
    pub notation: Notation,
}

impl Quantity {
    pub fn new(name: impl Into<String>, unit: &'static str, value: Derived) -> Self {
        Quantity {
            name: name.into(),
            unit,
            value,
            notation: Notation::Fixed(4),
        }
    }

    pub fn scientific(mut self, digits: usize) -> Self {
        self.notation = Notation::Scientific(digits);
        self
    }

    pub fn fixed(mut self, digits: usize) -> Self {
        self.notation = Notation::Fixed(digits);
        self
    }

    /// The value with its unit, e.g. `6.63e-34 J·s`, or `N/A (reason)`.
    pub fn formatted_value(&self) -> String {
        match &self.value {
            Derived::Value(v) => {
                let number = match self.notation {
                    Notation::Fixed(p) => format!("{v:.p$}"),
                    Notation::Scientific(p) => format!("{v:.p$e}"),
                };
                if self.unit.is_empty() {
                    number
                } else {
                    format!("{number} {}", self.unit)
                }
            }
            Derived::Undefined { reason } => format!("{UNDEFINED_MARKER} ({reason})"),
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.formatted_value())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::fit::{linear_fit, FitError};

    #[test]
    fn test_from_finite_rejects_nan() {
        assert!(!Derived::from_finite(f64::NAN, "x").is_defined());
        assert!(!Derived::from_finite(f64::INFINITY, "x").is_defined());
        assert_eq!(Derived::from_finite(2.0, "x").value(), Some(2.0));
    }

    #[test]
    fn test_map_and_then_propagate_undefined() {
        let d = Derived::undefined("no data").map("y", |v| v * 2.0);
        assert_eq!(d.reason(), Some("no data"));

        let d = Derived::Value(0.0).map("inverse", |v| 1.0 / v);
        assert!(!d.is_defined());

        let d = Derived::Value(4.0).and_then(|v| Derived::Value(v.sqrt()));
        assert_eq!(d.value(), Some(2.0));
    }

    #[test]
    fn test_from_fit_error() {
        let result: Result<f64, FitError> = linear_fit(&[1.0], &[1.0]).map(|f| f.slope);
        let d = Derived::from(result);
        assert!(d.reason().unwrap().contains("insufficient data"));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{:.3}", Derived::Value(1.23456)), "1.235");
        assert_eq!(format!("{:.3}", Derived::undefined("x")), "N/A");
    }

    #[test]
    fn test_quantity_formatting() {
        let h = Quantity::new("Planck's constant (h)", "J·s", Derived::Value(6.62e-34))
            .scientific(2);
        assert_eq!(h.to_string(), "Planck's constant (h): 6.62e-34 J·s");

        let g = Quantity::new("gamma", "", Derived::undefined("P2 <= P0")).fixed(4);
        assert_eq!(g.to_string(), "gamma: N/A (P2 <= P0)");
    }
}
