//! Dense row-major matrix value.

use std::fmt;

/// A dense matrix of `f64` stored in row-major order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Creates a `rows` x `cols` matrix from row-major `data`.
    ///
    /// `data` is truncated or zero-padded to `rows * cols` elements.
    pub fn new(rows: usize, cols: usize, mut data: Vec<f64>) -> Self {
        data.resize(rows * cols, 0.0);
        Self { rows, cols, data }
    }

    /// Creates a matrix from a list of rows.
    ///
    /// Returns `None` if the rows do not all have the same length.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdl_core::Matrix;
    ///
    /// let m = Matrix::from_rows(vec![vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap();
    /// assert_eq!(m.get(1, 1), Some(1.0));
    /// assert!(Matrix::from_rows(vec![vec![1.0], vec![1.0, 2.0]]).is_none());
    /// ```
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Option<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|row| row.len() != cols) {
            return None;
        }
        let n_rows = rows.len();
        let data = rows.into_iter().flatten().collect();
        Some(Self {
            rows: n_rows,
            cols,
            data,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns the element at `(row, col)`, if in range.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.rows && col < self.cols {
            self.data.get(row * self.cols + col).copied()
        } else {
            None
        }
    }

    /// Returns row `row` as a slice, if in range.
    pub fn row(&self, row: usize) -> Option<&[f64]> {
        if row < self.rows {
            self.data.get(row * self.cols..(row + 1) * self.cols)
        } else {
            None
        }
    }

    /// Returns the elements in row-major order.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for r in 0..self.rows {
            if r > 0 {
                write!(f, " ")?;
            }
            write!(f, "(")?;
            for (c, value) in self.row(r).unwrap_or_default().iter().enumerate() {
                if c > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{value}")?;
            }
            write!(f, ")")?;
        }
        write!(f, ")")
    }
}
