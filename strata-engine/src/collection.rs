use strata_error::StrataResult;
use strata_matrix::RowVec;

use crate::{RowKey, StorageTier};

/// A distributed collection of unique-key row pairs.
///
/// Every operation is blocking from the caller's perspective: it issues a
/// whole-collection pass to the engine and returns once the aggregate result
/// is available. Implementations own partitioning and scheduling; callers
/// only interpret results.
pub trait RowCollection<K: RowKey>: Clone + Send + Sync {
    /// Total number of rows.
    fn count(&self) -> StrataResult<u64>;

    /// Aggregate every row in one pass: `fold` within a partition, `merge`
    /// across partition results.
    fn fold<A, F, M>(&self, zero: A, fold: F, merge: M) -> StrataResult<A>
    where
        A: Clone + Send + Sync,
        F: Fn(A, (&K, &RowVec)) -> A + Send + Sync,
        M: Fn(A, A) -> A + Send + Sync;

    /// Transform every row, preserving keys and physical partitioning.
    fn map_rows<F>(&self, f: F) -> StrataResult<Self>
    where
        F: Fn(&K, &RowVec) -> RowVec + Send + Sync;

    /// Pin the collection in the given storage tier.
    fn persist(&self, tier: StorageTier) -> StrataResult<()>;

    /// Release a pinned collection. With `blocking = false` the release is
    /// fire-and-forget.
    fn unpersist(&self, blocking: bool) -> StrataResult<()>;

    /// Gather every `(key, row)` pair to the caller. The caller must hold the
    /// full copy in memory; this is the documented scalability boundary of
    /// materialization.
    fn collect_rows(&self) -> StrataResult<Vec<(K, RowVec)>>;

    fn num_partitions(&self) -> usize;
}
