use std::fmt;

// ---------------------------------------------------------------------------
// Cell – a single interpreted CSV cell
// ---------------------------------------------------------------------------

/// A CSV cell interpreted on demand. The raw text stays in the [`Table`] so a
/// file can be written back byte-for-byte apart from added columns.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Number(f64),
    Text(String),
    Empty,
}

impl Cell {
    /// Interpret raw cell text. Surrounding whitespace is ignored.
    pub fn parse(raw: &str) -> Self {
        let s = raw.trim();
        if s.is_empty() {
            return Cell::Empty;
        }
        match s.parse::<f64>() {
            Ok(v) => Cell::Number(v),
            Err(_) => Cell::Text(s.to_string()),
        }
    }

    /// The numeric value, if the cell holds a finite number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(v) if v.is_finite() => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Number(v) => write!(f, "{v}"),
            Cell::Text(s) => write!(f, "{s}"),
            Cell::Empty => write!(f, "<empty>"),
        }
    }
}

// ---------------------------------------------------------------------------
// Table – the complete loaded CSV
// ---------------------------------------------------------------------------

/// An in-memory CSV table: header names plus raw string rows.
///
/// Rows may be ragged; a missing trailing cell reads as [`Cell::Empty`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Table { headers, rows }
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the column whose trimmed header equals `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name)
    }

    /// `(index, header)` of every column whose header contains `needle`,
    /// in file order.
    pub fn columns_containing(&self, needle: &str) -> Vec<(usize, &str)> {
        self.headers
            .iter()
            .enumerate()
            .filter(|(_, h)| h.contains(needle))
            .map(|(i, h)| (i, h.as_str()))
            .collect()
    }

    /// Raw text of a cell, `""` when the row is too short.
    pub fn raw(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Interpreted cell.
    pub fn cell(&self, row: usize, col: usize) -> Cell {
        Cell::parse(self.raw(row, col))
    }

    /// Rows whose cells in `cols` are all numeric, as `(row_index, values)`.
    ///
    /// Any other row is skipped with a warning naming the offending column;
    /// a bad row never aborts the load.
    pub fn numeric_rows(&self, cols: &[usize]) -> Vec<(usize, Vec<f64>)> {
        let mut out = Vec::with_capacity(self.rows.len());
        'rows: for row in 0..self.rows.len() {
            let mut values = Vec::with_capacity(cols.len());
            for &col in cols {
                let cell = self.cell(row, col);
                match cell.as_f64() {
                    Some(v) => values.push(v),
                    None => {
                        log::warn!(
                            "Skipping row {}: column '{}' holds {cell}, expected a number",
                            row + 1,
                            self.header_name(col)
                        );
                        continue 'rows;
                    }
                }
            }
            out.push((row, values));
        }
        out
    }

    /// Numeric values of one column with empty cells dropped.
    ///
    /// Empty cells are expected (columns of unequal length) and dropped
    /// silently; text cells are skipped with a warning.
    pub fn numeric_column(&self, col: usize) -> Vec<f64> {
        let mut out = Vec::new();
        for row in 0..self.rows.len() {
            match self.cell(row, col) {
                Cell::Empty => {}
                cell => match cell.as_f64() {
                    Some(v) => out.push(v),
                    None => log::warn!(
                        "Skipping row {} of column '{}': {cell} is not a number",
                        row + 1,
                        self.header_name(col)
                    ),
                },
            }
        }
        out
    }

    /// Return the table with `values` stored under `name`.
    ///
    /// An existing column of that name is overwritten in place; otherwise the
    /// column is appended. Short rows are padded with empty cells first.
    pub fn with_column(mut self, name: &str, values: Vec<String>) -> Self {
        let idx = match self.column_index(name) {
            Some(i) => i,
            None => {
                self.headers.push(name.to_string());
                self.headers.len() - 1
            }
        };
        let width = self.headers.len();
        for (row, value) in self.rows.iter_mut().zip(values) {
            if row.len() < width {
                row.resize(width, String::new());
            }
            row[idx] = value;
        }
        self
    }

    fn header_name(&self, col: usize) -> &str {
        self.headers.get(col).map(String::as_str).unwrap_or("?")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> Table {
        Table::new(
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn test_cell_parse() {
        assert_eq!(Cell::parse(" 1.5 "), Cell::Number(1.5));
        assert_eq!(Cell::parse(""), Cell::Empty);
        assert_eq!(Cell::parse("abc"), Cell::Text("abc".to_string()));
        assert_eq!(Cell::parse("NaN").as_f64(), None);
    }

    #[test]
    fn test_numeric_rows_skips_bad_row() {
        let t = table(&["x", "y"], &[&["0", "1"], &["1", "oops"], &["2", "5"]]);
        let rows = t.numeric_rows(&[0, 1]);
        assert_eq!(rows, vec![(0, vec![0.0, 1.0]), (2, vec![2.0, 5.0])]);
    }

    #[test]
    fn test_numeric_column_drops_empty_and_text() {
        let t = table(&["A1", "B1"], &[&["1.0", "2.0"], &["", "3.0"], &["x", "4.0"]]);
        assert_eq!(t.numeric_column(0), vec![1.0]);
        assert_eq!(t.numeric_column(1), vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_columns_containing() {
        let t = table(&["U(V) 365nm", "I (10^-12 A) 365nm", "U(V) 405nm"], &[]);
        let found: Vec<usize> = t.columns_containing("U(V)").iter().map(|c| c.0).collect();
        assert_eq!(found, vec![0, 2]);
    }

    #[test]
    fn test_with_column_appends_then_replaces() {
        let t = table(&["a"], &[&["1"], &["2"]]);
        let t = t.with_column("G", vec!["x".into(), "y".into()]);
        assert_eq!(t.headers, vec!["a", "G"]);
        assert_eq!(t.raw(1, 1), "y");

        let t = t.with_column("G", vec!["p".into(), "q".into()]);
        assert_eq!(t.headers.len(), 2);
        assert_eq!(t.raw(0, 1), "p");
    }

    #[test]
    fn test_with_column_pads_ragged_rows() {
        let t = table(&["a", "b"], &[&["1"]]);
        let t = t.with_column("c", vec!["z".into()]);
        assert_eq!(t.rows[0], vec!["1", "", "z"]);
    }
}
