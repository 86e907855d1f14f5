use strata_error::{StrataResult, strata_bail, strata_err};

use crate::RowVec;

/// A row-sparse in-core matrix.
///
/// Every row stores only its explicit entries; absent rows read as all-zero.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseMatrix {
    nrow: usize,
    ncol: usize,
    rows: Vec<Vec<(usize, f64)>>,
}

impl SparseMatrix {
    pub fn zeros(nrow: usize, ncol: usize) -> Self {
        Self {
            nrow,
            ncol,
            rows: vec![Vec::new(); nrow],
        }
    }

    pub fn nrow(&self) -> usize {
        self.nrow
    }

    pub fn ncol(&self) -> usize {
        self.ncol
    }

    pub fn set_row(&mut self, index: usize, row: &RowVec) -> StrataResult<()> {
        if index >= self.nrow {
            return Err(strata_err!(OutOfBounds: index, 0, self.nrow));
        }
        if row.dense_len() > self.ncol {
            strata_bail!(
                "row of length {} does not fit into {} columns",
                row.dense_len(),
                self.ncol
            );
        }
        self.rows[index] = row.iter_stored().filter(|&(_, v)| v != 0.0).collect();
        Ok(())
    }

    pub fn row(&self, index: usize) -> StrataResult<RowVec> {
        if index >= self.nrow {
            return Err(strata_err!(OutOfBounds: index, 0, self.nrow));
        }
        RowVec::sparse(self.ncol, self.rows[index].clone())
    }

    pub fn get(&self, row: usize, col: usize) -> StrataResult<f64> {
        if row >= self.nrow {
            return Err(strata_err!(OutOfBounds: row, 0, self.nrow));
        }
        if col >= self.ncol {
            return Err(strata_err!(OutOfBounds: col, 0, self.ncol));
        }
        Ok(self.rows[row]
            .binary_search_by_key(&col, |&(i, _)| i)
            .map(|pos| self.rows[row][pos].1)
            .unwrap_or(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_read_back_sparse() {
        let mut m = SparseMatrix::zeros(2, 4);
        m.set_row(1, &RowVec::sparse(4, vec![(2, 3.0)]).unwrap())
            .unwrap();
        let row = m.row(1).unwrap();
        assert!(!row.is_dense());
        assert_eq!(row.get(2), Some(3.0));
        assert_eq!(m.row(0).unwrap().stored_len(), 0);
    }

    #[test]
    fn dense_rows_drop_zeros_when_assigned() {
        let mut m = SparseMatrix::zeros(1, 3);
        m.set_row(0, &RowVec::dense(vec![0.0, 5.0, 0.0])).unwrap();
        assert_eq!(m.row(0).unwrap().stored_len(), 1);
        assert_eq!(m.get(0, 1).unwrap(), 5.0);
    }

    #[test]
    fn out_of_bounds_access_fails() {
        let m = SparseMatrix::zeros(1, 1);
        assert!(m.get(1, 0).is_err());
        assert!(m.get(0, 1).is_err());
        assert!(m.row(1).is_err());
    }
}
