//! CSR (Compressed Sparse Row) storage for large-chain operators.
//!
//! Full-space operators on an L-site chain have dimension 2^L; beyond the
//! dense threshold they are kept in CSR form. Operators built from
//! single-site generators stay extremely sparse (one Pauli factor gives
//! 2^L non-zeros), so Kronecker products and sums are assembled row-wise
//! without ever materializing a dense matrix.

use geon_math::{C64, CMat, CVec};

/// Sparse complex matrix in Compressed Sparse Row format.
///
/// Row entries are kept sorted by column index with duplicates merged.
#[derive(Debug, Clone)]
pub struct CsrMatrix {
    pub nrows: usize,
    pub ncols: usize,
    pub row_ptr: Vec<usize>,
    pub col_indices: Vec<usize>,
    pub values: Vec<C64>,
}

impl CsrMatrix {
    /// Number of non-zero entries.
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// n×n all-zero matrix.
    pub fn zeros(n: usize) -> Self {
        Self {
            nrows: n,
            ncols: n,
            row_ptr: vec![0; n + 1],
            col_indices: Vec::new(),
            values: Vec::new(),
        }
    }

    /// n×n identity.
    pub fn identity(n: usize) -> Self {
        Self {
            nrows: n,
            ncols: n,
            row_ptr: (0..=n).collect(),
            col_indices: (0..n).collect(),
            values: vec![C64::new(1.0, 0.0); n],
        }
    }

    /// Convert a dense matrix, dropping exact zeros.
    pub fn from_dense(m: &CMat) -> Self {
        let mut rows: Vec<Vec<(usize, C64)>> = vec![Vec::new(); m.nrows()];
        for i in 0..m.nrows() {
            for j in 0..m.ncols() {
                let v = m[(i, j)];
                if v.norm_sqr() > 0.0 {
                    rows[i].push((j, v));
                }
            }
        }
        Self::from_rows(m.nrows(), m.ncols(), rows)
    }

    /// Assemble from per-row (col, value) lists. Rows are sorted and
    /// duplicate columns merged; negligible entries are kept (callers
    /// decide what to feed in).
    fn from_rows(nrows: usize, ncols: usize, mut rows: Vec<Vec<(usize, C64)>>) -> Self {
        let mut row_ptr = Vec::with_capacity(nrows + 1);
        let mut col_indices = Vec::new();
        let mut values = Vec::new();

        row_ptr.push(0);
        for row in &mut rows {
            row.sort_by_key(|&(col, _)| col);

            let mut merged: Vec<(usize, C64)> = Vec::with_capacity(row.len());
            for &(col, val) in row.iter() {
                if let Some(last) = merged.last_mut() {
                    if last.0 == col {
                        last.1 += val;
                        continue;
                    }
                }
                merged.push((col, val));
            }

            for (col, val) in merged {
                col_indices.push(col);
                values.push(val);
            }
            row_ptr.push(col_indices.len());
        }

        Self {
            nrows,
            ncols,
            row_ptr,
            col_indices,
            values,
        }
    }

    /// Kronecker product self ⊗ other.
    ///
    /// Row ia·rb + ib of the product combines row ia of self with row ib
    /// of other; with both operand rows sorted the output is sorted too.
    pub fn kron(&self, other: &CsrMatrix) -> CsrMatrix {
        let nrows = self.nrows * other.nrows;
        let ncols = self.ncols * other.ncols;
        let mut rows: Vec<Vec<(usize, C64)>> = Vec::with_capacity(nrows);

        for ia in 0..self.nrows {
            let a_start = self.row_ptr[ia];
            let a_end = self.row_ptr[ia + 1];
            for ib in 0..other.nrows {
                let b_start = other.row_ptr[ib];
                let b_end = other.row_ptr[ib + 1];
                let mut row = Vec::with_capacity((a_end - a_start) * (b_end - b_start));
                for a_idx in a_start..a_end {
                    let ja = self.col_indices[a_idx];
                    let va = self.values[a_idx];
                    for b_idx in b_start..b_end {
                        let jb = other.col_indices[b_idx];
                        let vb = other.values[b_idx];
                        row.push((ja * other.ncols + jb, va * vb));
                    }
                }
                rows.push(row);
            }
        }

        Self::from_rows(nrows, ncols, rows)
    }

    /// self + c·other, same shape.
    pub fn add_scaled(&self, other: &CsrMatrix, c: C64) -> CsrMatrix {
        assert_eq!(self.nrows, other.nrows, "add_scaled: row mismatch");
        assert_eq!(self.ncols, other.ncols, "add_scaled: col mismatch");

        let mut rows: Vec<Vec<(usize, C64)>> = Vec::with_capacity(self.nrows);
        for i in 0..self.nrows {
            let mut row = Vec::new();
            for idx in self.row_ptr[i]..self.row_ptr[i + 1] {
                row.push((self.col_indices[idx], self.values[idx]));
            }
            for idx in other.row_ptr[i]..other.row_ptr[i + 1] {
                row.push((other.col_indices[idx], c * other.values[idx]));
            }
            rows.push(row);
        }
        Self::from_rows(self.nrows, self.ncols, rows)
    }

    /// Conjugate transpose, by counting-sort over columns.
    pub fn adjoint(&self) -> CsrMatrix {
        let mut counts = vec![0usize; self.ncols + 1];
        for &j in &self.col_indices {
            counts[j + 1] += 1;
        }
        for j in 0..self.ncols {
            counts[j + 1] += counts[j];
        }

        let mut row_ptr = counts.clone();
        let mut col_indices = vec![0usize; self.nnz()];
        let mut values = vec![C64::new(0.0, 0.0); self.nnz()];
        let mut cursor = counts;

        for i in 0..self.nrows {
            for idx in self.row_ptr[i]..self.row_ptr[i + 1] {
                let j = self.col_indices[idx];
                let pos = cursor[j];
                cursor[j] += 1;
                col_indices[pos] = i;
                values[pos] = self.values[idx].conj();
            }
        }
        row_ptr.truncate(self.ncols + 1);

        CsrMatrix {
            nrows: self.ncols,
            ncols: self.nrows,
            row_ptr,
            col_indices,
            values,
        }
    }

    /// y = A·x.
    pub fn matvec(&self, x: &CVec) -> CVec {
        assert_eq!(x.len(), self.ncols, "matvec: dimension mismatch");
        let mut y = CVec::zeros(self.nrows);
        for i in 0..self.nrows {
            let mut sum = C64::new(0.0, 0.0);
            for idx in self.row_ptr[i]..self.row_ptr[i + 1] {
                sum += self.values[idx] * x[self.col_indices[idx]];
            }
            y[i] = sum;
        }
        y
    }

    /// Frobenius norm.
    pub fn norm(&self) -> f64 {
        self.values.iter().map(|v| v.norm_sqr()).sum::<f64>().sqrt()
    }

    /// Densify (test/support use; guarded by callers for large dims).
    pub fn to_dense(&self) -> CMat {
        let mut m = CMat::zeros(self.nrows, self.ncols);
        for i in 0..self.nrows {
            for idx in self.row_ptr[i]..self.row_ptr[i + 1] {
                m[(i, self.col_indices[idx])] += self.values[idx];
            }
        }
        m
    }
}
