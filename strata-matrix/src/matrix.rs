use std::fmt::{Display, Formatter};

use strata_error::StrataResult;

use crate::{DenseMatrix, RowLabels, RowVec, SparseMatrix};

#[derive(Debug, Clone, PartialEq)]
enum Repr {
    Dense(DenseMatrix),
    Sparse(SparseMatrix),
}

/// An in-core matrix with either a dense or a row-sparse backing, plus
/// optional row-label metadata.
///
/// The backing is chosen once at construction; mixed dense/sparse row storage
/// inside one matrix is not supported.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    repr: Repr,
    labels: Option<RowLabels>,
}

impl Matrix {
    pub fn dense(nrow: usize, ncol: usize) -> Self {
        Self {
            repr: Repr::Dense(DenseMatrix::zeros(nrow, ncol)),
            labels: None,
        }
    }

    pub fn sparse(nrow: usize, ncol: usize) -> Self {
        Self {
            repr: Repr::Sparse(SparseMatrix::zeros(nrow, ncol)),
            labels: None,
        }
    }

    pub fn is_dense(&self) -> bool {
        matches!(self.repr, Repr::Dense(_))
    }

    pub fn nrow(&self) -> usize {
        match &self.repr {
            Repr::Dense(m) => m.nrow(),
            Repr::Sparse(m) => m.nrow(),
        }
    }

    pub fn ncol(&self) -> usize {
        match &self.repr {
            Repr::Dense(m) => m.ncol(),
            Repr::Sparse(m) => m.ncol(),
        }
    }

    pub fn set_row(&mut self, index: usize, row: &RowVec) -> StrataResult<()> {
        match &mut self.repr {
            Repr::Dense(m) => m.set_row(index, row),
            Repr::Sparse(m) => m.set_row(index, row),
        }
    }

    pub fn row(&self, index: usize) -> StrataResult<RowVec> {
        match &self.repr {
            Repr::Dense(m) => m.row(index),
            Repr::Sparse(m) => m.row(index),
        }
    }

    pub fn get(&self, row: usize, col: usize) -> StrataResult<f64> {
        match &self.repr {
            Repr::Dense(m) => m.get(row, col),
            Repr::Sparse(m) => m.get(row, col),
        }
    }

    /// Attach row-label bindings, replacing any existing ones.
    pub fn set_labels(&mut self, labels: RowLabels) {
        self.labels = Some(labels);
    }

    pub fn labels(&self) -> Option<&RowLabels> {
        self.labels.as_ref()
    }

    /// Look up a row by its label binding.
    pub fn row_by_label(&self, label: &str) -> Option<StrataResult<RowVec>> {
        self.labels
            .as_ref()
            .and_then(|labels| labels.index_of(label))
            .map(|idx| self.row(idx))
    }
}

impl Display for Matrix {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let kind = if self.is_dense() { "dense" } else { "sparse" };
        write!(f, "{}x{} {} matrix", self.nrow(), self.ncol(), kind)
    }
}
