use std::fmt;

use crate::figure::Figure;
use crate::quantity::Quantity;

/// The output of one reduction: console text plus an optional figure.
pub trait Report: fmt::Display {
    fn figure(&self) -> Option<Figure>;
}

/// Write a titled block of quantities, one per line.
pub fn write_section(f: &mut fmt::Formatter<'_>, title: &str, quantities: &[Quantity]) -> fmt::Result {
    writeln!(f, "\n--- {title} ---")?;
    for q in quantities {
        writeln!(f, "{q}")?;
    }
    Ok(())
}

/// Annotation text for a figure panel: `name: value` lines.
pub fn annotation(quantities: &[Quantity]) -> String {
    quantities
        .iter()
        .map(|q| q.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
