use log::debug;
use strata_engine::{KeyKind, RowCollection, RowKey};
use strata_error::{StrataExpect as _, StrataResult, strata_bail, strata_err};
use strata_matrix::{Matrix, RowLabels};

use crate::CheckpointedMatrix;

impl<K: RowKey, C: RowCollection<K>> CheckpointedMatrix<K, C> {
    /// Gather every row into one in-core matrix.
    ///
    /// The caller must have memory for roughly twice the row data: the
    /// gathered copy and the consolidated matrix are briefly resident
    /// together. The backing is dense only when every gathered row is densely
    /// stored.
    ///
    /// Integer keys place rows positionally; any other key kind assigns
    /// sequential indices in gather order, which is not reproducible across
    /// calls, and binds each key's label to its index in the result's
    /// metadata.
    pub fn collect(&self) -> StrataResult<Matrix> {
        let nrow_u64 = self.nrow()?;
        let nrow = usize::try_from(nrow_u64).map_err(|_| {
            strata_err!(DimensionOverflow:
                "row count {nrow_u64} exceeds the host addressable range")
        })?;
        let ncol = usize::try_from(self.ncol()?)
            .map_err(|_| strata_err!(DimensionOverflow: "column count exceeds the host range"))?;
        if nrow.checked_mul(ncol).is_none() {
            strata_bail!(DimensionOverflow:
                "{nrow}x{ncol} cells exceed the host addressable range");
        }

        let pairs = self.rows().collect_rows()?;
        let all_dense = pairs.iter().all(|(_, row)| row.is_dense());
        debug!(
            "collecting {nrow}x{ncol} matrix from {} rows ({})",
            pairs.len(),
            if all_dense { "dense" } else { "sparse" }
        );
        let mut matrix = if all_dense {
            Matrix::dense(nrow, ncol)
        } else {
            Matrix::sparse(nrow, ncol)
        };

        match K::KIND {
            KeyKind::Int => {
                // Duplicate or out-of-range keys are upstream-prevented; the
                // consistency check in shape inference reports them, and this
                // path does not re-validate.
                for (key, row) in &pairs {
                    let index = key
                        .int_key()
                        .strata_expect("int-kind key must carry a row index");
                    let index = usize::try_from(index).map_err(|_| {
                        strata_err!(ComputeError: "negative row key {index} cannot be placed")
                    })?;
                    matrix.set_row(index, row)?;
                }
            }
            KeyKind::Long | KeyKind::Text | KeyKind::Opaque => {
                let mut labels = RowLabels::new();
                for (index, (key, row)) in pairs.iter().enumerate() {
                    matrix.set_row(index, row)?;
                    labels.bind(key.label(), index);
                }
                matrix.set_labels(labels);
            }
        }
        Ok(matrix)
    }
}
