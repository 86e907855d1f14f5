use strata_engine::{RowCollection, RowKey};
use strata_error::{StrataResult, strata_bail};
use strata_expr::ScalarOpKind;

use crate::CheckpointedMatrix;

impl<K: RowKey, C: RowCollection<K>> CheckpointedMatrix<K, C> {
    /// Apply an elementwise matrix-scalar operation, producing a new
    /// checkpointed matrix over the mapped collection.
    ///
    /// This is the physical counterpart of the logical
    /// [`strata_expr::ScalarOp`] node. Keys are untouched, so the result
    /// keeps this matrix's partitioning tag and inherits any shape statistics
    /// already resolved; unresolved ones stay lazy in the result.
    pub fn apply_elementwise(&self, kind: ScalarOpKind, scalar: f64) -> StrataResult<Self> {
        if !scalar.is_finite() {
            strata_bail!("elementwise scalar must be finite, got {scalar}");
        }
        let mapped = self
            .rows()
            .map_rows(|_, row| row.map_values(|v| kind.apply(v, scalar)))?;
        Ok(self.seeded(mapped))
    }
}
