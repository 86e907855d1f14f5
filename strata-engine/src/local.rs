use std::sync::Arc;

use log::trace;
use parking_lot::Mutex;
use rayon::prelude::*;
use strata_error::{StrataResult, strata_bail};
use strata_matrix::RowVec;

use crate::{RowCollection, RowKey, StorageTier};

#[derive(Debug, Default)]
struct PinState {
    pinned: Option<StorageTier>,
    persist_calls: usize,
    unpersist_calls: usize,
}

/// The in-process reference engine: partitions held in memory, partition-level
/// parallelism via rayon.
///
/// Pin bookkeeping is observable so callers can assert cache-lifecycle
/// idempotence in tests.
#[derive(Debug, Clone)]
pub struct LocalCollection<K> {
    partitions: Arc<Vec<Vec<(K, RowVec)>>>,
    pins: Arc<Mutex<PinState>>,
}

impl<K: RowKey> LocalCollection<K> {
    pub fn from_partitions(partitions: Vec<Vec<(K, RowVec)>>) -> Self {
        Self {
            partitions: Arc::new(partitions),
            pins: Arc::new(Mutex::new(PinState::default())),
        }
    }

    /// Split `pairs` into `num_partitions` contiguous chunks.
    pub fn from_pairs(pairs: Vec<(K, RowVec)>, num_partitions: usize) -> StrataResult<Self> {
        if num_partitions == 0 {
            strata_bail!("a collection needs at least one partition");
        }
        let chunk = pairs.len().div_ceil(num_partitions).max(1);
        let mut partitions: Vec<Vec<(K, RowVec)>> = Vec::with_capacity(num_partitions);
        let mut pairs = pairs.into_iter();
        for _ in 0..num_partitions {
            partitions.push(pairs.by_ref().take(chunk).collect());
        }
        Ok(Self::from_partitions(partitions))
    }

    /// How many times `persist` has been called on this collection.
    pub fn persist_calls(&self) -> usize {
        self.pins.lock().persist_calls
    }

    /// How many times `unpersist` has been called on this collection.
    pub fn unpersist_calls(&self) -> usize {
        self.pins.lock().unpersist_calls
    }

    /// The tier this collection is currently pinned in, if any.
    pub fn pinned_tier(&self) -> Option<StorageTier> {
        self.pins.lock().pinned
    }
}

impl<K: RowKey> RowCollection<K> for LocalCollection<K> {
    fn count(&self) -> StrataResult<u64> {
        Ok(self.partitions.iter().map(|p| p.len() as u64).sum())
    }

    fn fold<A, F, M>(&self, zero: A, fold: F, merge: M) -> StrataResult<A>
    where
        A: Clone + Send + Sync,
        F: Fn(A, (&K, &RowVec)) -> A + Send + Sync,
        M: Fn(A, A) -> A + Send + Sync,
    {
        let per_partition: Vec<A> = self
            .partitions
            .par_iter()
            .map(|partition| {
                partition
                    .iter()
                    .fold(zero.clone(), |acc, (k, row)| fold(acc, (k, row)))
            })
            .collect();
        Ok(per_partition.into_iter().fold(zero, merge))
    }

    fn map_rows<F>(&self, f: F) -> StrataResult<Self>
    where
        F: Fn(&K, &RowVec) -> RowVec + Send + Sync,
    {
        let partitions: Vec<Vec<(K, RowVec)>> = self
            .partitions
            .par_iter()
            .map(|partition| {
                partition
                    .iter()
                    .map(|(k, row)| (k.clone(), f(k, row)))
                    .collect()
            })
            .collect();
        Ok(Self::from_partitions(partitions))
    }

    fn persist(&self, tier: StorageTier) -> StrataResult<()> {
        let mut pins = self.pins.lock();
        pins.persist_calls += 1;
        pins.pinned = Some(tier);
        trace!("pinned local collection in {tier}");
        Ok(())
    }

    fn unpersist(&self, blocking: bool) -> StrataResult<()> {
        let mut pins = self.pins.lock();
        pins.unpersist_calls += 1;
        pins.pinned = None;
        trace!("released local collection (blocking={blocking})");
        Ok(())
    }

    fn collect_rows(&self) -> StrataResult<Vec<(K, RowVec)>> {
        Ok(self.partitions.iter().flatten().cloned().collect())
    }

    fn num_partitions(&self) -> usize {
        self.partitions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyed(values: &[(i32, f64)]) -> Vec<(i32, RowVec)> {
        values
            .iter()
            .map(|&(k, v)| (k, RowVec::dense(vec![v])))
            .collect()
    }

    #[test]
    fn from_pairs_splits_into_requested_partitions() {
        let c = LocalCollection::from_pairs(keyed(&[(0, 1.0), (1, 2.0), (2, 3.0)]), 2).unwrap();
        assert_eq!(c.num_partitions(), 2);
        assert_eq!(c.count().unwrap(), 3);
    }

    #[test]
    fn zero_partitions_is_rejected() {
        assert!(LocalCollection::from_pairs(keyed(&[]), 0).is_err());
    }

    #[test]
    fn fold_merges_across_partitions() {
        let c = LocalCollection::from_pairs(keyed(&[(0, 1.0), (1, 2.0), (2, 4.0)]), 3).unwrap();
        let sum = c
            .fold(0.0, |acc, (_, row)| acc + row.get(0).unwrap_or(0.0), |a, b| a + b)
            .unwrap();
        assert_eq!(sum, 7.0);
    }

    #[test]
    fn map_rows_preserves_keys_and_partition_count() {
        let c = LocalCollection::from_pairs(keyed(&[(0, 1.0), (1, 2.0)]), 2).unwrap();
        let mapped = c.map_rows(|_, row| row.map_values(|v| v * 10.0)).unwrap();
        assert_eq!(mapped.num_partitions(), 2);
        let mut rows = mapped.collect_rows().unwrap();
        rows.sort_by_key(|(k, _)| *k);
        assert_eq!(rows[1].1.get(0), Some(20.0));
    }

    #[test]
    fn pin_bookkeeping_is_observable() {
        let c = LocalCollection::from_pairs(keyed(&[(0, 1.0)]), 1).unwrap();
        assert_eq!(c.pinned_tier(), None);
        c.persist(StorageTier::Memory).unwrap();
        assert_eq!(c.persist_calls(), 1);
        assert_eq!(c.pinned_tier(), Some(StorageTier::Memory));
        c.unpersist(false).unwrap();
        assert_eq!(c.pinned_tier(), None);
        assert_eq!(c.unpersist_calls(), 1);
    }

    #[test]
    fn clones_share_pin_state() {
        let c = LocalCollection::from_pairs(keyed(&[(0, 1.0)]), 1).unwrap();
        let other = c.clone();
        c.persist(StorageTier::Disk).unwrap();
        assert_eq!(other.pinned_tier(), Some(StorageTier::Disk));
    }
}
