use std::fmt::{Debug, Display, Formatter};
use std::marker::PhantomData;
use std::sync::OnceLock;

use log::debug;
use parking_lot::Mutex;
use strata_engine::{PartitioningTag, RowCollection, RowKey, StorageTier};
use strata_error::StrataResult;
use strata_expr::{ExprRef, MatrixExpr};

use crate::RowShape;

/// A checkpointed distributed row matrix.
///
/// Row and column counts are inferred lazily from the collection and memoized;
/// the integer-key shape statistics come from a single pinned snapshot so the
/// count, max-key and key-sum aggregates are mutually consistent. The matrix
/// owns cache transitions for its collection; other expression nodes may share
/// the collection read-only but must not pin or release it.
pub struct CheckpointedMatrix<K: RowKey, C: RowCollection<K>> {
    rows: C,
    pub(crate) ncol: OnceLock<u32>,
    pub(crate) shape: OnceLock<RowShape>,
    partitioning: PartitioningTag,
    storage_tier: StorageTier,
    cached: Mutex<bool>,
    _key: PhantomData<fn() -> K>,
}

impl<K: RowKey, C: RowCollection<K>> CheckpointedMatrix<K, C> {
    /// Wrap a collection with everything lazy and a fresh partitioning tag.
    pub fn new(rows: C) -> Self {
        Self::with_shape(rows, None, None, PartitioningTag::fresh(), false)
    }

    /// Wrap a collection with compiler-supplied hints.
    ///
    /// A known `nrow` seeds the shape statistics with the supplied
    /// missing-rows flag and a zero fix-up amount; a compiler that knows the
    /// row count is expected to know the flag as well.
    pub fn with_shape(
        rows: C,
        nrow: Option<u64>,
        ncol: Option<u32>,
        partitioning: PartitioningTag,
        can_have_missing_rows: bool,
    ) -> Self {
        let shape = OnceLock::new();
        if let Some(nrow) = nrow {
            let _ = shape.set(RowShape {
                nrow,
                missing: can_have_missing_rows,
                fix_extra: 0,
            });
        }
        let ncol_cell = OnceLock::new();
        if let Some(ncol) = ncol {
            let _ = ncol_cell.set(ncol);
        }
        Self {
            rows,
            ncol: ncol_cell,
            shape,
            partitioning,
            storage_tier: StorageTier::default(),
            cached: Mutex::new(false),
            _key: PhantomData,
        }
    }

    /// Set the storage tier used when the matrix pins its collection.
    pub fn with_storage_tier(mut self, tier: StorageTier) -> Self {
        self.storage_tier = tier;
        self
    }

    pub fn rows(&self) -> &C {
        &self.rows
    }

    pub fn partitioning_tag(&self) -> PartitioningTag {
        self.partitioning
    }

    pub fn storage_tier(&self) -> StorageTier {
        self.storage_tier
    }

    pub fn is_cached(&self) -> bool {
        *self.cached.lock()
    }

    /// Pin the collection in the configured storage tier. Idempotent.
    pub fn cache(&self) -> StrataResult<&Self> {
        let mut cached = self.cached.lock();
        if !*cached {
            self.rows.persist(self.storage_tier)?;
            *cached = true;
            debug!("pinned matrix partitions in {}", self.storage_tier);
        }
        Ok(self)
    }

    /// Release the pinned collection, fire-and-forget. Idempotent; a no-op on
    /// a never-cached matrix.
    pub fn uncache(&self) -> StrataResult<&Self> {
        let mut cached = self.cached.lock();
        if *cached {
            self.rows.unpersist(false)?;
            *cached = false;
            debug!("released matrix partitions");
        }
        Ok(self)
    }

    /// A derived matrix over `rows` that keeps this matrix's partitioning
    /// tag, storage tier, and any already-resolved shape.
    pub(crate) fn seeded(&self, rows: C) -> Self {
        let derived = Self::with_shape(rows, None, None, self.partitioning, false);
        if let Some(&ncol) = self.ncol.get() {
            let _ = derived.ncol.set(ncol);
        }
        if let Some(&shape) = self.shape.get() {
            let _ = derived.shape.set(shape);
        }
        derived.with_storage_tier(self.storage_tier)
    }
}

impl<K: RowKey, C: RowCollection<K>> Drop for CheckpointedMatrix<K, C> {
    fn drop(&mut self) {
        let cached = self.cached.get_mut();
        if *cached {
            // Correctness only needs eventual release.
            if let Err(e) = self.rows.unpersist(false) {
                debug!("failed to release pinned partitions: {e}");
            }
            *cached = false;
        }
    }
}

impl<K: RowKey, C: RowCollection<K>> Debug for CheckpointedMatrix<K, C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckpointedMatrix")
            .field("key_kind", &K::KIND)
            .field("partitions", &self.rows.num_partitions())
            .field("partitioning", &self.partitioning)
            .field("ncol", &self.ncol.get())
            .field("shape", &self.shape.get())
            .field("cached", &self.is_cached())
            .finish()
    }
}

impl<K: RowKey, C: RowCollection<K>> Display for CheckpointedMatrix<K, C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "checkpoint<{}>[{} partitions]",
            K::KIND,
            self.rows.num_partitions()
        )
    }
}

impl<K: RowKey, C: RowCollection<K> + 'static> MatrixExpr for CheckpointedMatrix<K, C> {
    fn nrow(&self) -> StrataResult<u64> {
        CheckpointedMatrix::nrow(self)
    }

    fn ncol(&self) -> StrataResult<u32> {
        CheckpointedMatrix::ncol(self)
    }

    fn partitioning_tag(&self) -> PartitioningTag {
        self.partitioning
    }

    fn can_have_missing_rows(&self) -> StrataResult<bool> {
        CheckpointedMatrix::can_have_missing_rows(self)
    }

    fn children(&self) -> Vec<&ExprRef> {
        vec![]
    }
}
