use std::fmt::{Display, Formatter};

use itertools::Itertools;
use strata_error::{StrataResult, strata_bail, strata_err};

/// A single matrix row, either densely or sparsely stored.
///
/// A sparse row declares its dimension explicitly; entries are sorted by
/// column index and unique. Two rows of the same matrix may declare different
/// dimensions, so a column count can only be derived by folding
/// [`RowVec::dense_len`] over every row.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RowVec {
    Dense(Vec<f64>),
    Sparse {
        dim: usize,
        entries: Vec<(usize, f64)>,
    },
}

impl RowVec {
    pub fn dense(values: Vec<f64>) -> Self {
        RowVec::Dense(values)
    }

    /// Build a sparse row of dimension `dim` from `(column, value)` entries.
    ///
    /// Entries must be sorted by column, unique, and in bounds.
    pub fn sparse(dim: usize, entries: Vec<(usize, f64)>) -> StrataResult<Self> {
        for ((a, _), (b, _)) in entries.iter().tuple_windows() {
            if a >= b {
                strata_bail!("sparse row entries must be sorted and unique, got {a} then {b}");
            }
        }
        if let Some(&(last, _)) = entries.last() {
            if last >= dim {
                return Err(strata_err!(OutOfBounds: last, 0, dim));
            }
        }
        Ok(RowVec::Sparse { dim, entries })
    }

    /// Whether this row is densely stored.
    pub fn is_dense(&self) -> bool {
        matches!(self, RowVec::Dense(_))
    }

    /// The declared dense length of this row.
    ///
    /// For a sparse row this is the declared dimension, which may undercount
    /// the column count of the enclosing matrix.
    pub fn dense_len(&self) -> usize {
        match self {
            RowVec::Dense(values) => values.len(),
            RowVec::Sparse { dim, .. } => *dim,
        }
    }

    /// The value at `index`, or `None` past the declared length.
    pub fn get(&self, index: usize) -> Option<f64> {
        match self {
            RowVec::Dense(values) => values.get(index).copied(),
            RowVec::Sparse { dim, entries } => (index < *dim).then(|| {
                entries
                    .binary_search_by_key(&index, |&(i, _)| i)
                    .map(|pos| entries[pos].1)
                    .unwrap_or(0.0)
            }),
        }
    }

    /// Number of explicitly stored entries.
    pub fn stored_len(&self) -> usize {
        match self {
            RowVec::Dense(values) => values.len(),
            RowVec::Sparse { entries, .. } => entries.len(),
        }
    }

    pub fn iter_stored(&self) -> Box<dyn Iterator<Item = (usize, f64)> + '_> {
        match self {
            RowVec::Dense(values) => Box::new(values.iter().copied().enumerate()),
            RowVec::Sparse { entries, .. } => Box::new(entries.iter().copied()),
        }
    }

    /// Apply `f` to every element of the row, implicit zeros included.
    ///
    /// A sparse row stays sparse when `f` maps zero to zero; otherwise the
    /// implicit zeros take on `f(0.0)` and the result densifies.
    pub fn map_values<F: Fn(f64) -> f64>(&self, f: F) -> RowVec {
        match self {
            RowVec::Dense(values) => RowVec::Dense(values.iter().map(|&v| f(v)).collect()),
            RowVec::Sparse { dim, entries } => {
                if f(0.0) == 0.0 {
                    RowVec::Sparse {
                        dim: *dim,
                        entries: entries.iter().map(|&(i, v)| (i, f(v))).collect(),
                    }
                } else {
                    RowVec::Dense(self.to_dense(*dim).into_iter().map(&f).collect())
                }
            }
        }
    }

    /// Copy into a dense vector of length `len`, zero-filling past the
    /// declared length.
    pub fn to_dense(&self, len: usize) -> Vec<f64> {
        let mut out = vec![0.0; len];
        match self {
            RowVec::Dense(values) => {
                let n = values.len().min(len);
                out[..n].copy_from_slice(&values[..n]);
            }
            RowVec::Sparse { entries, .. } => {
                for &(i, v) in entries {
                    if i < len {
                        out[i] = v;
                    }
                }
            }
        }
        out
    }
}

impl Display for RowVec {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RowVec::Dense(values) => write!(f, "dense[{}]", values.len()),
            RowVec::Sparse { dim, entries } => write!(f, "sparse[{};{}]", dim, entries.len()),
        }
    }
}

impl From<Vec<f64>> for RowVec {
    fn from(values: Vec<f64>) -> Self {
        RowVec::Dense(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sparse_rejects_unsorted_entries() {
        assert!(RowVec::sparse(4, vec![(2, 1.0), (1, 2.0)]).is_err());
        assert!(RowVec::sparse(4, vec![(1, 1.0), (1, 2.0)]).is_err());
    }

    #[test]
    fn sparse_rejects_out_of_bounds() {
        assert!(RowVec::sparse(3, vec![(3, 1.0)]).is_err());
        assert!(RowVec::sparse(3, vec![(0, 1.0), (2, 2.0)]).is_ok());
    }

    #[test]
    fn get_fills_implicit_zeros() {
        let row = RowVec::sparse(5, vec![(1, 2.0), (3, 4.0)]).unwrap();
        assert_eq!(row.get(0), Some(0.0));
        assert_eq!(row.get(1), Some(2.0));
        assert_eq!(row.get(3), Some(4.0));
        assert_eq!(row.get(5), None);
    }

    #[test]
    fn map_values_keeps_zero_preserving_sparse() {
        let row = RowVec::sparse(4, vec![(1, 2.0)]).unwrap();
        let doubled = row.map_values(|v| v * 2.0);
        assert!(!doubled.is_dense());
        assert_eq!(doubled.get(1), Some(4.0));
        assert_eq!(doubled.get(0), Some(0.0));
    }

    #[test]
    fn map_values_densifies_when_zero_moves() {
        let row = RowVec::sparse(3, vec![(1, 2.0)]).unwrap();
        let shifted = row.map_values(|v| v + 1.0);
        assert!(shifted.is_dense());
        assert_eq!(shifted.to_dense(3), vec![1.0, 3.0, 1.0]);
    }

    #[test]
    fn to_dense_pads_and_truncates() {
        let row = RowVec::dense(vec![1.0, 2.0]);
        assert_eq!(row.to_dense(4), vec![1.0, 2.0, 0.0, 0.0]);
        assert_eq!(row.to_dense(1), vec![1.0]);
    }
}
